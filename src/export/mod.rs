mod csv_writer;
mod geojson_writer;
mod josm_writer;
mod osm_writer;
mod xml;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ExtractError;
use crate::types::FeatureCollection;

pub use csv_writer::*;
pub use geojson_writer::*;
pub use josm_writer::*;
pub use osm_writer::*;
pub use xml::{FALLBACK_TAG, GENERATOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    GeoJson,
    OsmXml,
    JosmXml,
    Csv,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::GeoJson,
        ExportFormat::OsmXml,
        ExportFormat::JosmXml,
        ExportFormat::Csv,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::GeoJson => "osm_data.geojson",
            ExportFormat::OsmXml => "osm_data.osm",
            ExportFormat::JosmXml => "osm_data_josm.osm",
            ExportFormat::Csv => "osm_data.csv",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::GeoJson => "application/json",
            ExportFormat::OsmXml | ExportFormat::JosmXml => "application/xml",
            ExportFormat::Csv => "text/csv",
        }
    }
}

/// Serialized content ready to hand to whatever saves or downloads it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPayload {
    pub format: ExportFormat,
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub content: String,
}

pub fn export(
    format: ExportFormat,
    collection: &FeatureCollection,
    josm: &JosmMetadata,
) -> Result<ExportPayload, ExtractError> {
    let content = match format {
        ExportFormat::GeoJson => to_geojson(collection)?,
        ExportFormat::OsmXml => to_osm_xml(collection)?,
        ExportFormat::JosmXml => to_josm_xml(collection, josm)?,
        ExportFormat::Csv => to_csv(collection)?,
    };
    info!("Exported {} ({} bytes)", format.file_name(), content.len());
    Ok(ExportPayload {
        format,
        file_name: format.file_name(),
        mime_type: format.mime_type(),
        content,
    })
}

pub fn export_all(
    collection: &FeatureCollection,
    josm: &JosmMetadata,
) -> Result<Vec<ExportPayload>, ExtractError> {
    ExportFormat::ALL
        .iter()
        .map(|&format| export(format, collection, josm))
        .collect()
}
