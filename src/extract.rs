use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ExtractError;
use crate::export::{ExportPayload, export_all};
use crate::geojson::{ExtractionStats, ProcessReport, process_elements};
use crate::overpass::{
    CancelToken, DataMode, OverpassClient, Transport, build_overpass_query, normalize_categories,
};
use crate::settings::Settings;
use crate::tools::build_boundary;
use crate::types::{BoundaryPolygon, Coord, FeatureCollection};

/// Everything one extraction produced. Recomputed from scratch on every run.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub id: Uuid,
    pub boundary: BoundaryPolygon,
    pub query: String,
    pub collection: FeatureCollection,
    pub report: ProcessReport,
    pub stats: ExtractionStats,
    pub mode: DataMode,
}

impl Extraction {
    /// True when the features are synthetic rather than retrieved.
    pub fn is_degraded(&self) -> bool {
        matches!(self.mode, DataMode::Synthetic { .. })
    }

    pub fn exports(&self, settings: &Settings) -> Result<Vec<ExportPayload>, ExtractError> {
        export_all(&self.collection, &settings.josm)
    }
}

/// Runs the whole pipeline: boundary, query, retrieval (with the configured
/// fallback), filtering and stats.
pub fn extract<T: Transport>(
    points: &[Coord],
    categories: &[String],
    settings: &Settings,
    client: &OverpassClient<T>,
    cancel: &CancelToken,
) -> Result<Extraction, ExtractError> {
    let id = Uuid::new_v4();
    let boundary = build_boundary(points, settings.polygon_strategy)?;
    let categories = normalize_categories(categories)?;
    let bbox = boundary.bbox();
    let query = build_overpass_query(&bbox, &categories, settings.query_timeout_secs)?;
    info!(
        "[{}] Extracting {} over {} points ({:.3} km2)",
        id,
        categories.join(","),
        points.len(),
        boundary.area_km2()
    );

    let outcome = client.send_overpass_query_or_fallback(
        &query,
        &bbox,
        &categories,
        settings.fallback,
        cancel,
    )?;
    if let DataMode::Synthetic { seed, cause } = &outcome.mode {
        warn!("[{}] Degraded mode: synthetic data (seed {}) after {}", id, seed, cause);
    }

    let (collection, report) = process_elements(&outcome.elements, &boundary);
    let stats = collection.stats();
    info!(
        "[{}] {} features, {} roads, {} buildings, {} POIs",
        id, stats.total_features, stats.road_count, stats.building_count, stats.poi_count
    );

    Ok(Extraction {
        id,
        boundary,
        query,
        collection,
        report,
        stats,
        mode: outcome.mode,
    })
}
