use serde::{Deserialize, Serialize};

use crate::types::{BoundaryPolygon, Feature, FeatureCollection};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionStats {
    pub area_km2: f64,
    pub total_features: usize,
    pub road_count: usize,
    pub building_count: usize,
    pub poi_count: usize,
}

/// Area of the boundary plus per-category counts. A feature carrying several of the
/// counted keys is counted once in each, so the counts may overlap.
pub fn summarize(features: &[Feature], boundary: &BoundaryPolygon) -> ExtractionStats {
    let count = |key: &str| features.iter().filter(|f| f.has_tag(key)).count();
    ExtractionStats {
        area_km2: boundary.area_km2(),
        total_features: features.len(),
        road_count: count("highway"),
        building_count: count("building"),
        poi_count: count("amenity"),
    }
}

impl FeatureCollection {
    pub fn stats(&self) -> ExtractionStats {
        summarize(&self.features, &self.boundary)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::types::{Coord, FeatureGeometry};

    fn feature(id: i64, tags: &[(&str, &str)]) -> Feature {
        Feature {
            id,
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            geometry: FeatureGeometry::Point(Coord::new(0.5, 0.5)),
        }
    }

    fn unit_square() -> BoundaryPolygon {
        BoundaryPolygon::from_ring(vec![
            Coord::new(0.0, 0.0),
            Coord::new(0.01, 0.0),
            Coord::new(0.01, 0.01),
            Coord::new(0.0, 0.01),
            Coord::new(0.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn counts_overlap() {
        let features = vec![
            feature(1, &[("highway", "primary")]),
            feature(2, &[("building", "yes"), ("amenity", "school")]),
            feature(3, &[("natural", "tree")]),
        ];
        let stats = summarize(&features, &unit_square());
        assert_eq!(stats.total_features, 3);
        assert_eq!(stats.road_count, 1);
        assert_eq!(stats.building_count, 1);
        assert_eq!(stats.poi_count, 1);
    }

    #[test]
    fn small_square_area() {
        // 0.01 degrees at the equator is about 1.1132 km a side
        let stats = summarize(&[], &unit_square());
        assert!((stats.area_km2 - 1.2392).abs() < 0.005, "area {}", stats.area_km2);
        assert_eq!(stats.total_features, 0);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(summarize(&[], &unit_square())).unwrap();
        assert!(json.get("areaKm2").is_some());
        assert!(json.get("poiCount").is_some());
    }
}
