use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ExtractError;
use crate::export::{JosmMetadata, MIN_JOSM_ID_OFFSET};
use crate::overpass::{
    DEFAULT_BACKOFF, DEFAULT_ENDPOINTS, DEFAULT_QUERY_TIMEOUT, FallbackPolicy, OverpassClient,
};
use crate::tools::PolygonStrategy;
use crate::types::{DEFAULT_CATEGORIES, MAX_POINT_CAP, MIN_POINT_CAP};

pub const SETTINGS_FILE: &str = "settings.json";

/// User-tunable knobs. Every field has a default, so a settings file only needs
/// the values being changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Overpass endpoints in the order they are tried.
    pub endpoints: Vec<String>,
    /// Client-side limit for one attempt against one endpoint.
    pub attempt_timeout_secs: u64,
    /// Pause before moving on to the next endpoint.
    pub backoff_ms: u64,
    /// Server-side `[timeout:N]` written into the query.
    pub query_timeout_secs: u64,
    pub point_cap: usize,
    pub categories: Vec<String>,
    pub polygon_strategy: PolygonStrategy,
    pub fallback: FallbackPolicy,
    pub josm: JosmMetadata,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            endpoints: DEFAULT_ENDPOINTS.iter().map(|url| url.to_string()).collect(),
            attempt_timeout_secs: 30,
            backoff_ms: DEFAULT_BACKOFF.as_millis() as u64,
            query_timeout_secs: DEFAULT_QUERY_TIMEOUT,
            point_cap: MIN_POINT_CAP,
            categories: vec!["amenity".to_string()],
            polygon_strategy: PolygonStrategy::default(),
            fallback: FallbackPolicy::default(),
            josm: JosmMetadata::default(),
        }
    }
}

impl Settings {
    /// `settings.json` in the platform config directory, if one can be resolved.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "map-extract", "map-extract")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
    }

    /// Loads from the platform config directory, falling back to defaults when
    /// there is none.
    pub fn load() -> Result<Self, ExtractError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("No config directory available, using default settings");
                Ok(Settings::default())
            }
        }
    }

    /// A missing file yields defaults; a file that is present but malformed is an error.
    pub fn load_from(path: &Path) -> Result<Self, ExtractError> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} not found, using default settings", path.display());
                return Ok(Settings::default());
            }
            Err(e) => return Err(ExtractError::Config(format!("{}: {}", path.display(), e))),
        };
        let settings: Settings = serde_json::from_str(&data)
            .map_err(|e| ExtractError::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded settings from {}", path.display());
        settings.validated()
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ExtractError> {
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| ExtractError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ExtractError::Config(format!("{}: {}", parent.display(), e)))?;
        }
        fs::write(path, data).map_err(|e| ExtractError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Clamps the point cap and rejects settings no extraction could run with.
    pub fn validated(mut self) -> Result<Self, ExtractError> {
        if self.endpoints.iter().all(|e| e.trim().is_empty()) {
            return Err(ExtractError::Config("at least one endpoint is required".to_string()));
        }
        self.endpoints.retain(|e| !e.trim().is_empty());
        let cap = self.point_cap.clamp(MIN_POINT_CAP, MAX_POINT_CAP);
        if cap != self.point_cap {
            warn!("Point cap {} clamped to {}", self.point_cap, cap);
            self.point_cap = cap;
        }
        if self.attempt_timeout_secs == 0 {
            return Err(ExtractError::Config("attempt_timeout_secs must be positive".to_string()));
        }
        if self.josm.id_offset < MIN_JOSM_ID_OFFSET {
            return Err(ExtractError::Config(format!(
                "josm.id_offset must be at least {}, got {}",
                MIN_JOSM_ID_OFFSET, self.josm.id_offset
            )));
        }
        Ok(self)
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    /// An HTTP client configured from these settings.
    pub fn client(&self) -> OverpassClient {
        OverpassClient::new(self.endpoints.clone(), self.attempt_timeout(), self.backoff())
    }

    /// Every category key the host may offer.
    pub fn available_categories() -> Vec<String> {
        DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
    }
}
