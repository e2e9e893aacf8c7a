use crate::error::ExtractError;
use crate::geojson::feature_properties;
use crate::types::{Feature, FeatureCollection};

pub const CSV_HEADER: [&str; 8] = ["id", "type", "name", "lat", "lon", "category", "geometry", "tags"];

/// Keys tried in order for the `name` column.
const NAME_KEYS: [&str; 5] = ["name", "amenity", "highway", "building", "natural"];

/// Tag keys in classification priority; the first one present wins.
const CATEGORY_PRIORITY: [&str; 6] = ["highway", "building", "amenity", "natural", "landuse", "waterway"];

pub fn feature_name(feature: &Feature) -> &str {
    NAME_KEYS
        .iter()
        .find_map(|key| feature.tag(key))
        .unwrap_or("")
}

pub fn feature_category(feature: &Feature) -> &'static str {
    CATEGORY_PRIORITY
        .iter()
        .copied()
        .find(|key| feature.has_tag(key))
        .unwrap_or("other")
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Header plus one row per feature, rows joined by `\n`.
///
/// Text columns are double-quoted with inner quotes doubled. `lat` and `lon`
/// are written bare so spreadsheets read them as numbers. The position is the
/// feature's representative point.
pub fn to_csv(collection: &FeatureCollection) -> Result<String, ExtractError> {
    let mut rows = Vec::with_capacity(collection.len() + 1);
    rows.push(CSV_HEADER.iter().map(|h| quote(h)).collect::<Vec<_>>().join(","));

    for feature in &collection.features {
        let point = feature.geometry.representative_point().map_err(|e| {
            ExtractError::ExportFailure(format!("feature {}: {}", feature.id, e))
        })?;
        let tags = serde_json::to_string(&feature_properties(feature))
            .map_err(|e| ExtractError::ExportFailure(e.to_string()))?;
        let geometry = feature.geometry.type_name();
        rows.push(
            [
                quote(&feature.id.to_string()),
                quote(geometry),
                quote(feature_name(feature)),
                point.lat.to_string(),
                point.long.to_string(),
                quote(feature_category(feature)),
                quote(geometry),
                quote(&tags),
            ]
            .join(","),
        );
    }
    Ok(rows.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundaryPolygon, Coord, FeatureGeometry};

    fn feature(id: i64, tags: &[(&str, &str)], geometry: FeatureGeometry) -> Feature {
        Feature {
            id,
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            geometry,
        }
    }

    fn collection(features: Vec<Feature>) -> FeatureCollection {
        let boundary = BoundaryPolygon::from_ring(vec![
            Coord::new(-74.01, 40.71),
            Coord::new(-74.0, 40.7),
            Coord::new(-73.99, 40.71),
            Coord::new(-74.0, 40.72),
            Coord::new(-74.01, 40.71),
        ])
        .unwrap();
        FeatureCollection {
            features,
            boundary,
        }
    }

    #[test]
    fn empty_collection_is_header_only() {
        let csv = to_csv(&collection(vec![])).unwrap();
        assert_eq!(csv, r#""id","type","name","lat","lon","category","geometry","tags""#);
    }

    #[test]
    fn cafe_row() {
        let csv = to_csv(&collection(vec![feature(
            1,
            &[("amenity", "cafe")],
            FeatureGeometry::Point(Coord::new(-74.005, 40.711)),
        )]))
        .unwrap();
        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[1],
            r#""1","Point","cafe",40.711,-74.005,"amenity","Point","{""amenity"":""cafe"",""id"":1}""#
        );
    }

    #[test]
    fn quotes_are_doubled() {
        let csv = to_csv(&collection(vec![feature(
            2,
            &[("name", r#"The "Best" Bar, Ltd"#), ("amenity", "bar")],
            FeatureGeometry::Point(Coord::new(-74.0, 40.71)),
        )]))
        .unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with(r#""2","Point","The ""Best"" Bar, Ltd",40.71,-74,"amenity""#), "{row}");
    }

    #[test]
    fn lines_use_their_middle_vertex() {
        let csv = to_csv(&collection(vec![feature(
            3,
            &[("highway", "residential"), ("building", "yes")],
            FeatureGeometry::LineString(vec![
                Coord::new(-74.004, 40.71),
                Coord::new(-74.003, 40.712),
                Coord::new(-74.002, 40.71),
            ]),
        )]))
        .unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(
            row.starts_with(r#""3","LineString","residential",40.712,-74.003,"highway","LineString""#),
            "{row}"
        );
    }

    #[test]
    fn category_priority_and_name_fallback() {
        let point = FeatureGeometry::Point(Coord::new(0.0, 0.0));
        let f = feature(1, &[("waterway", "river"), ("landuse", "forest")], point.clone());
        assert_eq!(feature_category(&f), "landuse");
        assert_eq!(feature_name(&f), "");
        let f = feature(2, &[("shop", "bakery")], point.clone());
        assert_eq!(feature_category(&f), "other");
        let f = feature(3, &[("natural", "tree"), ("building", "hut")], point);
        assert_eq!(feature_category(&f), "building");
        assert_eq!(feature_name(&f), "hut");
    }
}
