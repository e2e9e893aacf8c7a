//! Extract OpenStreetMap features inside a user-drawn polygon and export them
//! as GeoJSON, OSM XML (plain and JOSM flavoured) or CSV.
//!
//! The host collects clicks in [`types::ClickPoints`], then calls
//! [`extract::extract`] with a snapshot of them. Nothing in here keeps global
//! state, draws anything, or writes export files.

pub mod error;
pub mod export;
pub mod extract;
pub mod geojson;
pub mod overpass;
pub mod settings;
pub mod style;
pub mod tools;
pub mod types;

pub use error::ExtractError;
pub use extract::{Extraction, extract};
pub use settings::Settings;
