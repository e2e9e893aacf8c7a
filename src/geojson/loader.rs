use std::collections::BTreeMap;

use geojson::{GeoJson, Geometry, Value, feature::Id};
use tracing::debug;

use crate::error::ExtractError;
use crate::types::{Coord, Feature, FeatureGeometry};

/// GeoJSON properties of a feature: its tags plus a numeric `id`, which wins over
/// any tag named `id`.
pub fn feature_properties(feature: &Feature) -> BTreeMap<String, serde_json::Value> {
    let mut properties: BTreeMap<String, serde_json::Value> = feature
        .tags
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
        .collect();
    properties.insert("id".to_string(), serde_json::Value::from(feature.id));
    properties
}

pub fn to_geojson_feature(feature: &Feature) -> geojson::Feature {
    let position = |c: &Coord| vec![c.long, c.lat];
    let value = match &feature.geometry {
        FeatureGeometry::Point(c) => Value::Point(position(c)),
        FeatureGeometry::LineString(coords) => Value::LineString(coords.iter().map(position).collect()),
        FeatureGeometry::Polygon(ring) => Value::Polygon(vec![ring.iter().map(position).collect()]),
    };
    geojson::Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(feature_properties(feature).into_iter().collect()),
        foreign_members: None,
    }
}

/// Reads a GeoJSON FeatureCollection, such as one written by the GeoJSON exporter,
/// back into features. Geometry kinds other than Point, LineString and Polygon are
/// skipped; for polygons only the exterior ring is kept.
pub fn get_map_data(data: &str) -> Result<Vec<Feature>, ExtractError> {
    let geojson: GeoJson = data
        .parse()
        .map_err(|e: geojson::Error| ExtractError::Parse(e.to_string()))?;
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(ExtractError::Parse("expected a FeatureCollection".to_string()));
    };

    let mut features = Vec::new();
    for (index, feature) in collection.features.into_iter().enumerate() {
        let Some(geometry) = feature.geometry else {
            debug!("skipping feature {} without geometry", index);
            continue;
        };
        let geometry = match geometry.value {
            Value::Point(p) => position(&p).map(FeatureGeometry::Point),
            Value::LineString(line) => positions(&line)
                .filter(|coords| coords.len() >= 2)
                .map(FeatureGeometry::LineString),
            Value::Polygon(rings) => rings
                .first()
                .and_then(|ring| positions(ring))
                .filter(|ring| ring.len() >= 4 && ring.first() == ring.last())
                .map(FeatureGeometry::Polygon),
            _ => None,
        };
        let Some(geometry) = geometry else {
            debug!("skipping feature {} with unsupported geometry", index);
            continue;
        };

        let mut properties = feature.properties.unwrap_or_default();
        let id = properties
            .remove("id")
            .and_then(|v| v.as_i64())
            .or(match feature.id {
                Some(Id::Number(n)) => n.as_i64(),
                _ => None,
            })
            .unwrap_or(index as i64);
        let tags = properties
            .into_iter()
            .filter_map(|(k, v)| match v {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some((k, s)),
                other => Some((k, other.to_string())),
            })
            .collect();

        features.push(Feature { id, tags, geometry });
    }
    Ok(features)
}

fn position(p: &[f64]) -> Option<Coord> {
    match p {
        [lon, lat, ..] => Some(Coord::new(*lon, *lat)),
        _ => None,
    }
}

fn positions(ps: &[Vec<f64>]) -> Option<Vec<Coord>> {
    ps.iter().map(|p| position(p)).collect()
}
