use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::BytesStart;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ExtractError;
use crate::types::{Coord, FeatureCollection, FeatureGeometry};

use super::xml::{OsmDocument, check_finite, export_tags};

/// Lowest id offset accepted, so exported ids stay clear of live OSM ids.
pub const MIN_JOSM_ID_OFFSET: i64 = 900_000_000;

/// Editor attributes stamped on every JOSM element. None of it is real history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JosmMetadata {
    /// Node and way ids count up from here, well above live OSM ids.
    pub id_offset: i64,
    pub version: u32,
    pub changeset: i64,
    pub timestamp: DateTime<Utc>,
    pub user: String,
    pub uid: i64,
}

impl Default for JosmMetadata {
    fn default() -> Self {
        JosmMetadata {
            id_offset: MIN_JOSM_ID_OFFSET,
            version: 1,
            changeset: 1,
            // 2024-01-01T00:00:00Z
            timestamp: DateTime::from_timestamp(1_704_067_200, 0).unwrap_or_default(),
            user: "map-extract".to_string(),
            uid: 1,
        }
    }
}

struct JosmNode<'a> {
    id: i64,
    coord: Coord,
    tags: Option<&'a BTreeMap<String, String>>,
}

struct JosmWay<'a> {
    id: i64,
    refs: Vec<i64>,
    tags: &'a BTreeMap<String, String>,
}

/// Node table keyed by the exact `lon,lat` text, so only identical coordinates merge.
#[derive(Default)]
struct NodeTable<'a> {
    nodes: Vec<JosmNode<'a>>,
    by_key: HashMap<String, usize>,
}

impl<'a> NodeTable<'a> {
    fn intern(&mut self, coord: Coord, next_id: &mut i64) -> usize {
        if let Some(&index) = self.by_key.get(&coord.key()) {
            return index;
        }
        *next_id += 1;
        self.nodes.push(JosmNode {
            id: *next_id,
            coord,
            tags: None,
        });
        self.by_key.insert(coord.key(), self.nodes.len() - 1);
        self.nodes.len() - 1
    }
}

/// Full OSM document JOSM can open: `<bounds>`, shared nodes, then ways.
///
/// Point features become tagged nodes; when two of them share a coordinate the
/// first one's tags are kept. Lines and areas become ways over untagged nodes.
pub fn to_josm_xml(
    collection: &FeatureCollection,
    metadata: &JosmMetadata,
) -> Result<String, ExtractError> {
    if metadata.id_offset < MIN_JOSM_ID_OFFSET {
        return Err(ExtractError::ExportFailure(format!(
            "JOSM id offset {} is below {}",
            metadata.id_offset, MIN_JOSM_ID_OFFSET
        )));
    }
    let mut table = NodeTable::default();
    let mut ways = Vec::new();
    let mut next_node = metadata.id_offset;
    let mut next_way = metadata.id_offset;

    for feature in &collection.features {
        check_finite(feature.geometry.coords(), feature.id)?;
        match &feature.geometry {
            FeatureGeometry::Point(coord) => {
                let index = table.intern(*coord, &mut next_node);
                let node = &mut table.nodes[index];
                if node.tags.is_none() {
                    node.tags = Some(&feature.tags);
                } else {
                    debug!("feature {} shares node {} with an earlier point", feature.id, node.id);
                }
            }
            FeatureGeometry::LineString(coords) | FeatureGeometry::Polygon(coords) => {
                let refs = coords
                    .iter()
                    .map(|c| {
                        let index = table.intern(*c, &mut next_node);
                        table.nodes[index].id
                    })
                    .collect();
                next_way += 1;
                ways.push(JosmWay {
                    id: next_way,
                    refs,
                    tags: &feature.tags,
                });
            }
        }
    }

    let timestamp = metadata.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true);
    let stamp = |element: &mut BytesStart<'_>, id: i64| {
        element.push_attribute(("id", id.to_string().as_str()));
        element.push_attribute(("visible", "true"));
        element.push_attribute(("version", metadata.version.to_string().as_str()));
        element.push_attribute(("changeset", metadata.changeset.to_string().as_str()));
        element.push_attribute(("timestamp", timestamp.as_str()));
        element.push_attribute(("user", metadata.user.as_str()));
        element.push_attribute(("uid", metadata.uid.to_string().as_str()));
    };

    let mut doc = OsmDocument::new()?;
    let bbox = collection.boundary.bbox();
    let mut bounds = BytesStart::new("bounds");
    bounds.push_attribute(("minlat", bbox.min_lat.to_string().as_str()));
    bounds.push_attribute(("minlon", bbox.min_lng.to_string().as_str()));
    bounds.push_attribute(("maxlat", bbox.max_lat.to_string().as_str()));
    bounds.push_attribute(("maxlon", bbox.max_lng.to_string().as_str()));
    doc.empty(bounds)?;

    for node in &table.nodes {
        let mut element = BytesStart::new("node");
        stamp(&mut element, node.id);
        element.push_attribute(("lat", node.coord.lat.to_string().as_str()));
        element.push_attribute(("lon", node.coord.long.to_string().as_str()));
        match node.tags {
            Some(tags) => doc.tagged(element, &export_tags(tags))?,
            None => doc.empty(element)?,
        }
    }
    for way in &ways {
        let mut element = BytesStart::new("way");
        stamp(&mut element, way.id);
        doc.with_refs(element, &way.refs, &export_tags(way.tags))?;
    }

    debug!("JOSM export: {} nodes, {} ways", table.nodes.len(), ways.len());
    doc.finish()
}
