use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::types::{BoundingBox, RawElement};

/// What to do once every live endpoint has failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Surface the retrieval failure.
    #[default]
    Fail,
    /// Substitute fabricated elements and report degraded mode.
    Synthetic { seed: u64 },
}

const POI_COUNT: usize = 20;
const ROAD_COUNT: usize = 8;
const BUILDING_COUNT: usize = 12;
const OTHER_COUNT: usize = 5;

const AMENITIES: [&str; 6] = ["cafe", "restaurant", "bank", "pharmacy", "school", "parking"];
const ROADS: [&str; 4] = ["residential", "primary", "secondary", "footway"];

/// Fabricates a plausible element set inside `bbox` for degraded-mode testing.
///
/// Element ids are negative so they can never be mistaken for real OSM ids.
/// The same seed, box and categories always produce the same elements.
pub fn synthesize_elements(bbox: &BoundingBox, categories: &[String], seed: u64) -> Vec<RawElement> {
    let mut generator = SyntheticGenerator {
        rng: StdRng::seed_from_u64(seed),
        bbox: *bbox,
        next_id: -1,
        elements: Vec::new(),
    };

    for category in categories {
        match category.as_str() {
            "amenity" => generator.pois(),
            "highway" => generator.roads(),
            "building" => generator.buildings(),
            other => generator.generic(other),
        }
    }
    generator.elements
}

struct SyntheticGenerator {
    rng: StdRng,
    bbox: BoundingBox,
    next_id: i64,
    elements: Vec<RawElement>,
}

impl SyntheticGenerator {
    fn id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id -= 1;
        id
    }

    fn lerp(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.rng.r#gen::<f64>()
    }

    fn position(&mut self) -> (f64, f64) {
        let lon = self.lerp(self.bbox.min_lng, self.bbox.max_lng);
        let lat = self.lerp(self.bbox.min_lat, self.bbox.max_lat);
        (lon, lat)
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.rng.gen_range(0..items.len())]
    }

    fn node(&mut self, lon: f64, lat: f64, tags: &[(&str, &str)]) -> i64 {
        let id = self.id();
        self.elements.push(RawElement::node(id, lon, lat, tags));
        id
    }

    fn pois(&mut self) {
        for n in 1..=POI_COUNT {
            let (lon, lat) = self.position();
            let amenity = self.pick(&AMENITIES);
            let name = format!("Synthetic {amenity} {n}");
            self.node(lon, lat, &[("amenity", amenity), ("name", name.as_str())]);
        }
    }

    fn roads(&mut self) {
        for n in 1..=ROAD_COUNT {
            let vertices = self.rng.gen_range(3..=5);
            let refs: Vec<i64> = (0..vertices)
                .map(|_| {
                    let (lon, lat) = self.position();
                    self.node(lon, lat, &[])
                })
                .collect();
            let highway = self.pick(&ROADS);
            let name = format!("Synthetic Road {n}");
            let id = self.id();
            self.elements
                .push(RawElement::way(id, refs, &[("highway", highway), ("name", name.as_str())]));
        }
    }

    fn buildings(&mut self) {
        let span_lng = self.bbox.max_lng - self.bbox.min_lng;
        let span_lat = self.bbox.max_lat - self.bbox.min_lat;
        for _ in 0..BUILDING_COUNT {
            let half_w = span_lng * self.lerp(0.01, 0.04);
            let half_h = span_lat * self.lerp(0.01, 0.04);
            let cx = self.lerp(self.bbox.min_lng + 2.0 * half_w, self.bbox.max_lng - 2.0 * half_w);
            let cy = self.lerp(self.bbox.min_lat + 2.0 * half_h, self.bbox.max_lat - 2.0 * half_h);
            let corners = [
                (cx - half_w, cy - half_h),
                (cx + half_w, cy - half_h),
                (cx + half_w, cy + half_h),
                (cx - half_w, cy + half_h),
            ];
            let mut refs: Vec<i64> = corners
                .iter()
                .map(|&(lon, lat)| self.node(lon, lat, &[]))
                .collect();
            refs.push(refs[0]);
            let id = self.id();
            self.elements
                .push(RawElement::way(id, refs, &[("building", "yes")]));
        }
    }

    fn generic(&mut self, key: &str) {
        for _ in 0..OTHER_COUNT {
            let (lon, lat) = self.position();
            self.node(lon, lat, &[(key, "yes")]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coord;

    fn bbox() -> BoundingBox {
        BoundingBox {
            min_lng: -74.01,
            min_lat: 40.70,
            max_lng: -73.99,
            max_lat: 40.72,
        }
    }

    fn cats(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn same_seed_same_data() {
        let a = synthesize_elements(&bbox(), &cats(&["amenity", "highway"]), 7);
        let b = synthesize_elements(&bbox(), &cats(&["amenity", "highway"]), 7);
        let c = synthesize_elements(&bbox(), &cats(&["amenity", "highway"]), 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn everything_lands_inside_the_box_with_negative_ids() {
        let elements = synthesize_elements(
            &bbox(),
            &cats(&["amenity", "highway", "building", "natural"]),
            42,
        );
        assert!(!elements.is_empty());
        for element in &elements {
            assert!(element.id().unwrap() < 0);
            if let RawElement::Node { lon, lat, .. } = element {
                assert!(bbox().contains(&Coord::new(*lon, *lat)));
            }
        }
    }

    #[test]
    fn buildings_are_closed_rectangles() {
        let elements = synthesize_elements(&bbox(), &cats(&["building"]), 1);
        let ways: Vec<_> = elements
            .iter()
            .filter_map(|e| match e {
                RawElement::Way { nodes, .. } => Some(nodes),
                _ => None,
            })
            .collect();
        assert_eq!(ways.len(), BUILDING_COUNT);
        for nodes in ways {
            assert_eq!(nodes.len(), 5);
            assert_eq!(nodes.first(), nodes.last());
        }
    }

    #[test]
    fn unknown_category_gets_tagged_points() {
        let elements = synthesize_elements(&bbox(), &cats(&["shop"]), 3);
        assert_eq!(elements.len(), OTHER_COUNT);
        assert!(elements.iter().all(|e| e.string_tags()["shop"] == "yes"));
    }
}
