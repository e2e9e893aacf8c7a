use geo::{Centroid, ChamberlainDuquetteArea, Intersects, Line};
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

use super::{BoundingBox, Coord};

/// Fewest distinct points a boundary can be built from.
pub const MIN_POINTS: usize = 3;
/// The point cap chosen by the host is clamped into this range.
pub const MIN_POINT_CAP: usize = 5;
pub const MAX_POINT_CAP: usize = 10;

/// One user click, numbered from 1 in entry order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClickPoint {
    pub ordinal: usize,
    pub coord: Coord,
}

/// The clicks collected so far. Owned by the host and handed to the core as a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickPoints {
    cap: usize,
    points: Vec<ClickPoint>,
}

impl Default for ClickPoints {
    fn default() -> Self {
        Self::new(MIN_POINT_CAP)
    }
}

impl ClickPoints {
    pub fn new(cap: usize) -> Self {
        Self {
            cap: clamp_cap(cap),
            points: Vec::new(),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Changing the cap throws away every collected point.
    pub fn set_cap(&mut self, cap: usize) {
        self.cap = clamp_cap(cap);
        self.points.clear();
    }

    /// Adds a click. Clicks beyond the cap are rejected, never truncated.
    pub fn push(&mut self, coord: Coord) -> Result<ClickPoint, ExtractError> {
        if self.points.len() >= self.cap {
            return Err(ExtractError::invalid(format!(
                "point cap of {} already reached",
                self.cap
            )));
        }
        if !coord.is_finite() {
            return Err(ExtractError::invalid("click coordinate is not finite"));
        }
        let point = ClickPoint {
            ordinal: self.points.len() + 1,
            coord,
        };
        self.points.push(point);
        Ok(point)
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> &[ClickPoint] {
        &self.points
    }

    pub fn coords(&self) -> Vec<Coord> {
        self.points.iter().map(|p| p.coord).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Enough points to draw a preview boundary.
    pub fn can_preview(&self) -> bool {
        self.points.len() >= MIN_POINTS
    }

    /// Extraction is offered once every point up to the cap has been placed.
    pub fn is_ready(&self) -> bool {
        self.points.len() >= self.cap
    }
}

fn clamp_cap(cap: usize) -> usize {
    cap.clamp(MIN_POINT_CAP, MAX_POINT_CAP)
}

/// A closed ring (first == last) with at least three distinct positions.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryPolygon {
    ring: Vec<Coord>,
    bbox: BoundingBox,
    polygon: geo::Polygon,
}

impl BoundaryPolygon {
    pub fn from_ring(ring: Vec<Coord>) -> Result<Self, ExtractError> {
        if ring.len() < MIN_POINTS + 1 {
            return Err(ExtractError::invalid(format!(
                "a boundary ring needs at least {} points, got {}",
                MIN_POINTS + 1,
                ring.len()
            )));
        }
        if ring.first() != ring.last() {
            return Err(ExtractError::invalid("boundary ring is not closed"));
        }
        if ring.iter().any(|c| !c.is_finite()) {
            return Err(ExtractError::invalid("boundary ring has a non-finite coordinate"));
        }
        let bbox = BoundingBox::from_coords(&ring)
            .ok_or_else(|| ExtractError::invalid("boundary ring is empty"))?;
        let polygon = geo::Polygon::new(
            geo::LineString(ring.iter().map(|&c| geo::Coord::from(c)).collect()),
            vec![],
        );
        Ok(Self {
            ring,
            bbox,
            polygon,
        })
    }

    pub fn ring(&self) -> &[Coord] {
        &self.ring
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    pub fn as_geo(&self) -> &geo::Polygon {
        &self.polygon
    }

    pub fn centroid(&self) -> Option<Coord> {
        self.polygon.centroid().map(Coord::from)
    }

    /// Boundary inclusive point-in-polygon test.
    pub fn contains(&self, coord: &Coord) -> bool {
        if !self.bbox.contains(coord) {
            return false;
        }
        self.polygon
            .intersects(&geo::Point::from(geo::Coord::from(*coord)))
    }

    /// Spherical area on the WGS84 equatorial radius, in square kilometres.
    pub fn area_km2(&self) -> f64 {
        self.polygon.chamberlain_duquette_unsigned_area() / 1_000_000.0
    }

    /// True when no two non-adjacent edges touch or cross.
    pub fn is_simple(&self) -> bool {
        let edges: Vec<Line> = self
            .ring
            .windows(2)
            .map(|w| Line::new(geo::Coord::from(w[0]), geo::Coord::from(w[1])))
            .collect();
        let n = edges.len();
        for i in 0..n {
            for j in (i + 2)..n {
                // first and last edge share the closing vertex
                if i == 0 && j == n - 1 {
                    continue;
                }
                if edges[i].intersects(&edges[j]) {
                    return false;
                }
            }
        }
        true
    }
}
