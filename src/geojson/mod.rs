mod loader;
mod processor;
mod stats;

pub use loader::*;
pub use processor::*;
pub use stats::*;
