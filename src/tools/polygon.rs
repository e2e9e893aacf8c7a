use geo::{Area, ConvexHull, MultiPoint};
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::types::{BoundaryPolygon, Coord, MAX_POINT_CAP, MIN_POINTS};

/// How unordered clicks are turned into a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolygonStrategy {
    /// Keep every click, ordered by angle around the centroid.
    #[default]
    AngularSort,
    /// Keep only the clicks on the convex hull.
    ConvexHull,
}

/// Builds the boundary ring from three to [`MAX_POINT_CAP`] clicks.
///
/// Angular sorting keeps all points and yields a star shaped ring, which is simple
/// for convex click patterns but may cross itself for concave ones. That is left as
/// is; [`BoundaryPolygon::is_simple`] lets the caller check.
pub fn build_boundary(
    points: &[Coord],
    strategy: PolygonStrategy,
) -> Result<BoundaryPolygon, ExtractError> {
    if points.len() < MIN_POINTS {
        return Err(ExtractError::invalid(format!(
            "at least {} points are needed to build a boundary, got {}",
            MIN_POINTS,
            points.len()
        )));
    }
    if points.len() > MAX_POINT_CAP {
        return Err(ExtractError::invalid(format!(
            "at most {} points can define a boundary, got {}",
            MAX_POINT_CAP,
            points.len()
        )));
    }
    if points.iter().any(|p| !p.is_finite()) {
        return Err(ExtractError::invalid("boundary point is not finite"));
    }

    let ring = match strategy {
        PolygonStrategy::AngularSort => angular_ring(points),
        PolygonStrategy::ConvexHull => hull_ring(points)?,
    };
    let boundary = BoundaryPolygon::from_ring(ring)?;
    if !boundary.is_simple() {
        tracing::warn!("boundary ring crosses itself, containment results may be surprising");
    }
    Ok(boundary)
}

/// Mean of the points, summed in coordinate order so any permutation of the
/// same clicks lands on the same centroid bit for bit.
fn centroid(points: &[Coord]) -> Coord {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.long.total_cmp(&b.long).then(a.lat.total_cmp(&b.lat)));
    let n = sorted.len() as f64;
    let (sum_x, sum_y) = sorted
        .iter()
        .fold((0.0, 0.0), |(x, y), p| (x + p.long, y + p.lat));
    Coord::new(sum_x / n, sum_y / n)
}

fn angular_ring(points: &[Coord]) -> Vec<Coord> {
    let center = centroid(points);
    let mut ring: Vec<(f64, Coord)> = points
        .iter()
        .map(|p| ((p.lat - center.lat).atan2(p.long - center.long), *p))
        .collect();
    // sort_by is stable, equal angles keep click order
    ring.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut ring: Vec<Coord> = ring.into_iter().map(|(_, p)| p).collect();
    ring.push(ring[0]);
    ring
}

/// Fails when the hull collapses to a segment or a single point.
fn hull_ring(points: &[Coord]) -> Result<Vec<Coord>, ExtractError> {
    let multi: MultiPoint = points
        .iter()
        .map(|&p| geo::Point::from(geo::Coord::from(p)))
        .collect();
    let hull = multi.convex_hull();
    let ring: Vec<Coord> = hull.exterior().coords().map(|&c| Coord::from(c)).collect();
    if ring.len() < MIN_POINTS + 1 || hull.unsigned_area() == 0.0 {
        return Err(ExtractError::invalid(
            "points are collinear, their convex hull has no area",
        ));
    }
    Ok(ring)
}
