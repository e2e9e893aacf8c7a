use quick_xml::events::BytesStart;

use crate::error::ExtractError;
use crate::types::{FeatureCollection, FeatureGeometry};

use super::xml::{OsmDocument, check_finite, export_tags};

/// One `<node>` per Point feature, keyed by the feature id.
///
/// Lines and areas have no counterpart here and are skipped; use the JOSM
/// export to keep them.
pub fn to_osm_xml(collection: &FeatureCollection) -> Result<String, ExtractError> {
    let mut doc = OsmDocument::new()?;
    for feature in &collection.features {
        let FeatureGeometry::Point(coord) = &feature.geometry else {
            continue;
        };
        check_finite(std::slice::from_ref(coord), feature.id)?;

        let mut node = BytesStart::new("node");
        node.push_attribute(("id", feature.id.to_string().as_str()));
        node.push_attribute(("lat", coord.lat.to_string().as_str()));
        node.push_attribute(("lon", coord.long.to_string().as_str()));
        doc.tagged(node, &export_tags(&feature.tags))?;
    }
    doc.finish()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::export::xml::tests::element_names;
    use crate::types::{BoundaryPolygon, Coord, Feature};

    fn collection(features: Vec<Feature>) -> FeatureCollection {
        let boundary = BoundaryPolygon::from_ring(vec![
            Coord::new(0.0, 0.0),
            Coord::new(1.0, 0.0),
            Coord::new(1.0, 1.0),
            Coord::new(0.0, 0.0),
        ])
        .unwrap();
        FeatureCollection {
            features,
            boundary,
        }
    }

    fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_collection_is_an_empty_osm_document() {
        let xml = to_osm_xml(&collection(vec![])).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert_eq!(element_names(&xml), vec!["osm"]);
    }

    #[test]
    fn only_points_are_written() {
        let xml = to_osm_xml(&collection(vec![
            Feature {
                id: 1,
                tags: tags(&[("amenity", "cafe"), ("id", "1")]),
                geometry: FeatureGeometry::Point(Coord::new(0.5, 0.25)),
            },
            Feature {
                id: 2,
                tags: tags(&[("highway", "path")]),
                geometry: FeatureGeometry::LineString(vec![
                    Coord::new(0.1, 0.1),
                    Coord::new(0.2, 0.1),
                ]),
            },
        ]))
        .unwrap();
        assert_eq!(element_names(&xml), vec!["osm", "node", "tag"]);
        assert!(xml.contains(r#"<node id="1" lat="0.25" lon="0.5">"#), "{xml}");
        assert!(xml.contains(r#"<tag k="amenity" v="cafe"/>"#));
        assert!(!xml.contains(r#"k="id""#));
    }

    #[test]
    fn non_finite_point_fails() {
        let result = to_osm_xml(&collection(vec![Feature {
            id: 3,
            tags: tags(&[("amenity", "bench")]),
            geometry: FeatureGeometry::Point(Coord::new(f64::NAN, 0.0)),
        }]));
        assert!(matches!(result, Err(ExtractError::ExportFailure(_))));
    }
}
