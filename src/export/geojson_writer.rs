use crate::error::ExtractError;
use crate::geojson::to_geojson_feature;
use crate::types::FeatureCollection;

use super::xml::check_finite;

/// Pretty-printed GeoJSON FeatureCollection. Features keep their order; each
/// carries its tags plus the numeric `id` as properties.
pub fn to_geojson(collection: &FeatureCollection) -> Result<String, ExtractError> {
    for feature in &collection.features {
        check_finite(feature.geometry.coords(), feature.id)?;
    }
    let output = geojson::FeatureCollection {
        bbox: None,
        features: collection.features.iter().map(to_geojson_feature).collect(),
        foreign_members: None,
    };
    serde_json::to_string_pretty(&output).map_err(|e| ExtractError::ExportFailure(e.to_string()))
}
