use std::collections::HashMap;

use rstar::RTree;
use tracing::{debug, info};

use crate::error::{ElementError, PartialDataLoss};
use crate::types::{
    BoundaryPolygon, Coord, Feature, FeatureCollection, FeatureGeometry, IndexedFeature,
    RawElement,
};

/// Bookkeeping for one processing run. Nothing in here is fatal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessReport {
    /// Elements without tags, typically way vertices. Not features by definition.
    pub untagged: usize,
    /// Element types this pipeline does not understand.
    pub unknown: usize,
    /// Features whose representative point fell outside the boundary.
    pub outside: usize,
    /// Tagged elements that could not become features.
    pub loss: PartialDataLoss,
}

/// Turns raw elements into features and keeps those whose representative point lies
/// inside (or on) the boundary. Output order follows input order.
pub fn process_elements(
    elements: &[RawElement],
    boundary: &BoundaryPolygon,
) -> (FeatureCollection, ProcessReport) {
    let mut report = ProcessReport::default();

    let nodes: HashMap<i64, Coord> = elements
        .iter()
        .filter_map(|e| match e {
            RawElement::Node { id, lat, lon, .. } => Some((*id, Coord::new(*lon, *lat))),
            _ => None,
        })
        .collect();

    let mut candidates: Vec<Feature> = Vec::new();
    let mut points: Vec<IndexedFeature> = Vec::new();
    for element in elements {
        let Some(id) = element.id() else {
            report.unknown += 1;
            continue;
        };
        let tags = element.string_tags();
        if tags.is_empty() {
            report.untagged += 1;
            continue;
        }

        let located = element_geometry(element, &nodes).and_then(|geometry| {
            let point = geometry.representative_point()?;
            Ok((geometry, point))
        });
        match located {
            Ok((geometry, point)) => {
                points.push(IndexedFeature {
                    index: candidates.len(),
                    point,
                });
                candidates.push(Feature { id, tags, geometry });
            }
            Err(reason) => report.loss.record(id, reason),
        }
    }

    let tree = RTree::bulk_load(points);
    let mut inside: Vec<usize> = tree
        .locate_in_envelope_intersecting(&boundary.bbox().envelope())
        .filter(|candidate| boundary.contains(&candidate.point))
        .map(|candidate| candidate.index)
        .collect();
    inside.sort_unstable();
    report.outside = candidates.len() - inside.len();

    let mut collection = FeatureCollection::new(boundary.clone());
    let mut keep = inside.into_iter().peekable();
    for (index, feature) in candidates.into_iter().enumerate() {
        if keep.peek() == Some(&index) {
            keep.next();
            collection.features.push(feature);
        } else {
            debug!("feature {} lies outside the boundary", feature.id);
        }
    }

    info!(
        "Kept {} features ({} outside, {} untagged, {} dropped)",
        collection.len(),
        report.outside,
        report.untagged,
        report.loss.len()
    );
    (collection, report)
}

fn element_geometry(
    element: &RawElement,
    nodes: &HashMap<i64, Coord>,
) -> Result<FeatureGeometry, ElementError> {
    match element {
        RawElement::Node { lat, lon, .. } => Ok(FeatureGeometry::Point(Coord::new(*lon, *lat))),
        RawElement::Way { nodes: refs, .. } => {
            // unresolved references are skipped, which may leave too few points
            let coords: Vec<Coord> = refs.iter().filter_map(|r| nodes.get(r).copied()).collect();
            FeatureGeometry::from_way(coords)
        }
        RawElement::Relation { .. } => Err(ElementError::Relation),
        RawElement::Unknown => Err(ElementError::Degenerate),
    }
}
