use std::collections::BTreeMap;

use geo::Centroid;
use rstar::{AABB, RTreeObject};

use crate::error::ElementError;

use super::{BoundaryPolygon, Coord};

/// Geometry of an extracted feature, coordinates in (lon, lat) order.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    Point(Coord),
    /// At least two coordinates.
    LineString(Vec<Coord>),
    /// Closed ring of at least four coordinates.
    Polygon(Vec<Coord>),
}

impl FeatureGeometry {
    /// Classifies a resolved way: closed with four or more points is an area, anything else a line.
    pub fn from_way(coords: Vec<Coord>) -> Result<Self, ElementError> {
        if coords.len() < 2 {
            return Err(ElementError::Unresolved {
                resolved: coords.len(),
            });
        }
        if coords.len() >= 4 && coords.first() == coords.last() {
            Ok(FeatureGeometry::Polygon(coords))
        } else {
            Ok(FeatureGeometry::LineString(coords))
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FeatureGeometry::Point(_) => "Point",
            FeatureGeometry::LineString(_) => "LineString",
            FeatureGeometry::Polygon(_) => "Polygon",
        }
    }

    pub fn coords(&self) -> &[Coord] {
        match self {
            FeatureGeometry::Point(c) => std::slice::from_ref(c),
            FeatureGeometry::LineString(coords) | FeatureGeometry::Polygon(coords) => coords,
        }
    }

    /// The single position used for containment and for tabular exports:
    /// the point itself, the middle vertex of a line, the centroid of an area.
    pub fn representative_point(&self) -> Result<Coord, ElementError> {
        let point = match self {
            FeatureGeometry::Point(c) => *c,
            FeatureGeometry::LineString(coords) => {
                *coords.get(coords.len() / 2).ok_or(ElementError::Degenerate)?
            }
            FeatureGeometry::Polygon(ring) => {
                let polygon = geo::Polygon::new(
                    geo::LineString(ring.iter().map(|&c| geo::Coord::from(c)).collect()),
                    vec![],
                );
                polygon
                    .centroid()
                    .map(Coord::from)
                    .ok_or(ElementError::Degenerate)?
            }
        };
        if point.is_finite() {
            Ok(point)
        } else {
            Err(ElementError::NonFinite)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: i64,
    pub tags: BTreeMap<String, String>,
    pub geometry: FeatureGeometry,
}

impl Feature {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn has_tag(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }
}

/// A feature paired with its representative point, indexed for envelope lookups.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IndexedFeature {
    pub index: usize,
    pub point: Coord,
}

impl RTreeObject for IndexedFeature {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.point.long, self.point.lat])
    }
}

/// Features that survived filtering, in discovery order, with the boundary they were cut by.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
    pub boundary: BoundaryPolygon,
}

impl FeatureCollection {
    pub fn new(boundary: BoundaryPolygon) -> Self {
        Self {
            features: Vec::new(),
            boundary,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
