use serde::{Deserialize, Serialize};

/// A geographic position. Always longitude first, latitude second.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coord {
    pub long: f64,
    pub lat: f64,
}

impl Coord {
    pub const fn new(long: f64, lat: f64) -> Self {
        Self { long, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.long.is_finite() && self.lat.is_finite()
    }

    /// Exact textual key, used where positions are deduplicated by string match.
    pub fn key(&self) -> String {
        format!("{},{}", self.long, self.lat)
    }
}

impl From<[f64; 2]> for Coord {
    fn from(value: [f64; 2]) -> Self {
        Coord::new(value[0], value[1])
    }
}

impl From<Coord> for [f64; 2] {
    fn from(value: Coord) -> Self {
        [value.long, value.lat]
    }
}

impl From<Coord> for geo::Coord {
    fn from(value: Coord) -> Self {
        geo::Coord {
            x: value.long,
            y: value.lat,
        }
    }
}

impl From<geo::Coord> for Coord {
    fn from(value: geo::Coord) -> Self {
        Coord::new(value.x, value.y)
    }
}

impl From<geo::Point> for Coord {
    fn from(value: geo::Point) -> Self {
        Coord::new(value.x(), value.y())
    }
}

/// Axis aligned box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn from_coords<'a>(coords: impl IntoIterator<Item = &'a Coord>) -> Option<Self> {
        let mut iter = coords.into_iter();
        let first = iter.next()?;
        let mut bbox = BoundingBox {
            min_lng: first.long,
            min_lat: first.lat,
            max_lng: first.long,
            max_lat: first.lat,
        };
        for c in iter {
            bbox.min_lng = bbox.min_lng.min(c.long);
            bbox.min_lat = bbox.min_lat.min(c.lat);
            bbox.max_lng = bbox.max_lng.max(c.long);
            bbox.max_lat = bbox.max_lat.max(c.lat);
        }
        Some(bbox)
    }

    pub fn contains(&self, coord: &Coord) -> bool {
        (self.min_lng..=self.max_lng).contains(&coord.long)
            && (self.min_lat..=self.max_lat).contains(&coord.lat)
    }

    pub fn envelope(&self) -> rstar::AABB<[f64; 2]> {
        rstar::AABB::from_corners([self.min_lng, self.min_lat], [self.max_lng, self.max_lat])
    }
}
