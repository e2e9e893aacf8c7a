mod coord;
mod geojson_types;
mod overpass_types;
mod selection_types;

pub use coord::*;
pub use geojson_types::*;
pub use overpass_types::*;
pub use selection_types::*;
