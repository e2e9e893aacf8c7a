//! # Boundary Tool
//!
//! Turns the user's map clicks into the boundary polygon an extraction is cut by.
//!
//! ## Strategies
//! - `AngularSort`: keeps every click, ordered counter-clockwise around their centroid
//! - `ConvexHull`: keeps only the clicks on the hull, always simple
//!
//! Click collection itself lives in [`crate::types::ClickPoints`]; this module only
//! consumes a snapshot of it.

mod polygon;

pub use polygon::*;
