use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// Tag keys offered to the user, in the order the host lists them.
pub const DEFAULT_CATEGORIES: [&str; 10] = [
    "amenity", "highway", "building", "natural", "landuse", "waterway", "leisure", "shop",
    "tourism", "railway",
];

/// Body of an Overpass `[out:json]` answer.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverpassResponse {
    pub version: Option<f64>,
    pub generator: Option<String>,
    #[serde(default)]
    pub elements: Vec<RawElement>,
}

impl OverpassResponse {
    pub fn from_json(data: &str) -> Result<Self, ExtractError> {
        serde_json::from_str(data).map_err(|e| ExtractError::Parse(e.to_string()))
    }
}

/// One element as the upstream service returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RawElement {
    Node {
        id: i64,
        lat: f64,
        lon: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tags: Option<BTreeMap<String, serde_json::Value>>,
    },
    Way {
        id: i64,
        #[serde(default)]
        nodes: Vec<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tags: Option<BTreeMap<String, serde_json::Value>>,
    },
    Relation {
        id: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tags: Option<BTreeMap<String, serde_json::Value>>,
    },
    #[serde(other)]
    Unknown,
}

impl RawElement {
    pub fn node(id: i64, lon: f64, lat: f64, tags: &[(&str, &str)]) -> Self {
        RawElement::Node {
            id,
            lat,
            lon,
            tags: tag_map(tags),
        }
    }

    pub fn way(id: i64, nodes: Vec<i64>, tags: &[(&str, &str)]) -> Self {
        RawElement::Way {
            id,
            nodes,
            tags: tag_map(tags),
        }
    }

    pub fn id(&self) -> Option<i64> {
        match self {
            RawElement::Node { id, .. }
            | RawElement::Way { id, .. }
            | RawElement::Relation { id, .. } => Some(*id),
            RawElement::Unknown => None,
        }
    }

    /// Tags as plain strings. Non-string values are rendered as JSON text.
    pub fn string_tags(&self) -> BTreeMap<String, String> {
        let tags = match self {
            RawElement::Node { tags, .. }
            | RawElement::Way { tags, .. }
            | RawElement::Relation { tags, .. } => tags.as_ref(),
            RawElement::Unknown => None,
        };
        tags.map(|tags| {
            tags.iter()
                .map(|(k, v)| {
                    let value = match v {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), value)
                })
                .collect()
        })
        .unwrap_or_default()
    }
}

fn tag_map(tags: &[(&str, &str)]) -> Option<BTreeMap<String, serde_json::Value>> {
    if tags.is_empty() {
        return None;
    }
    Some(
        tags.iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_elements() {
        let data = r#"{
            "version": 0.6,
            "generator": "Overpass API",
            "osm3s": {"copyright": "odbl"},
            "elements": [
                {"type": "node", "id": 1, "lat": 40.711, "lon": -74.005, "tags": {"amenity": "cafe"}},
                {"type": "node", "id": 2, "lat": 40.7, "lon": -74.0},
                {"type": "way", "id": 10, "nodes": [1, 2], "tags": {"highway": "service", "lanes": 2}},
                {"type": "relation", "id": 20, "members": [], "tags": {"type": "route"}},
                {"type": "area", "id": 30}
            ]
        }"#;
        let response = OverpassResponse::from_json(data).unwrap();
        assert_eq!(response.elements.len(), 5);
        assert_eq!(response.elements[0].string_tags()["amenity"], "cafe");
        assert!(response.elements[1].string_tags().is_empty());
        assert_eq!(response.elements[2].string_tags()["lanes"], "2");
        assert!(matches!(response.elements[3], RawElement::Relation { id: 20, .. }));
        assert_eq!(response.elements[4], RawElement::Unknown);
        assert_eq!(response.elements[4].id(), None);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            OverpassResponse::from_json("<html>busy</html>"),
            Err(ExtractError::Parse(_))
        ));
    }
}
