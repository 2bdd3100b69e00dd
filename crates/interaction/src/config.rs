//! Data-driven tunables for gestures, overlay, search, lookups and services.
//!
//! Every section is `#[serde(default)]`, so a config file only needs the
//! keys it overrides. Secrets and deployment paths can also come from the
//! environment (see [`InteractionConfig::apply_env`]).

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bevy::prelude::*;
use geodata::Coordinates;
use serde::{Deserialize, Serialize};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "POPI_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "popi.json";

pub const API_KEY_ENV: &str = "LOCATIONIQ_API_KEY";
pub const OSM_URL_ENV: &str = "OSM_API_URL";
pub const WARNINGS_FILE_ENV: &str = "POPI_WARNINGS_FILE";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// A tap must be released strictly before this.
    pub max_tap_duration_ms: u64,
    /// Maximum planar drift in degrees between press and release.
    pub max_tap_distance_deg: f64,
    /// Mouse releases wait this long before the map center is re-sampled.
    pub mouse_settle_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            max_tap_duration_ms: 500,
            max_tap_distance_deg: 0.001,
            mouse_settle_ms: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub close_animation_ms: u64,
    /// Zoom the map flies to when a point is selected.
    pub selection_zoom: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            close_animation_ms: 200,
            selection_zoom: 16.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub debounce_ms: u64,
    pub result_limit: usize,
    /// Half-size of the box around the map center that biases results.
    pub viewbox_half_extent_deg: f64,
    pub fit_max_zoom: f64,
    pub fit_padding_px: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 1500,
            result_limit: 10,
            viewbox_half_extent_deg: 0.1,
            fit_max_zoom: 15.0,
            fit_padding_px: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub nearby_half_extent_deg: f64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            nearby_half_extent_deg: 0.001,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub default_center: Coordinates,
    pub default_zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub flight_ms: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            // London
            default_center: Coordinates::new(51.5074, -0.1276),
            default_zoom: 10.0,
            min_zoom: 1.0,
            max_zoom: 19.0,
            flight_ms: 800,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub geocoder_base_url: String,
    pub geocoder_api_key: Option<String>,
    pub osm_base_url: String,
    /// JSON file of user-submitted warnings; in-memory store when unset.
    pub warnings_file: Option<PathBuf>,
    pub http_timeout_secs: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            geocoder_base_url: "https://us1.locationiq.com".to_string(),
            geocoder_api_key: None,
            osm_base_url: "https://api.openstreetmap.org/".to_string(),
            warnings_file: None,
            http_timeout_secs: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// InteractionConfig
// ---------------------------------------------------------------------------

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub gestures: GestureConfig,
    pub overlay: OverlayConfig,
    pub search: SearchConfig,
    pub lookup: LookupConfig,
    pub map: MapConfig,
    pub services: ServicesConfig,
}

impl InteractionConfig {
    /// Read a JSON config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Path from `POPI_CONFIG`, defaulting to `popi.json` in the working
    /// directory.
    pub fn path_from_env() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Like [`load`](Self::load), but a bad file yields the defaults plus
    /// the error to report once logging is up.
    pub fn load_or_default(path: &Path) -> (Self, Option<ConfigIssue>) {
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(error) => (
                Self::default(),
                Some(ConfigIssue {
                    path: path.to_path_buf(),
                    error,
                }),
            ),
        }
    }

    /// Load from the environment-selected path and apply env overrides.
    pub fn from_env() -> (Self, Option<ConfigIssue>) {
        let (mut config, issue) = Self::load_or_default(&Self::path_from_env());
        config.apply_env();
        (config, issue)
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = get(API_KEY_ENV) {
            self.services.geocoder_api_key = Some(key);
        }
        if let Some(url) = get(OSM_URL_ENV) {
            self.services.osm_base_url = url;
        }
        if let Some(path) = get(WARNINGS_FILE_ENV) {
            self.services.warnings_file = Some(PathBuf::from(path));
        }
    }
}

impl GestureConfig {
    pub fn max_tap_duration(&self) -> Duration {
        Duration::from_millis(self.max_tap_duration_ms)
    }

    pub fn mouse_settle(&self) -> Duration {
        Duration::from_millis(self.mouse_settle_ms)
    }
}

impl OverlayConfig {
    pub fn close_animation(&self) -> Duration {
        Duration::from_millis(self.close_animation_ms)
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl MapConfig {
    pub fn flight(&self) -> Duration {
        Duration::from_millis(self.flight_ms)
    }
}

impl ServicesConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "Invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// A config file that could not be used. Inserted before the app runs and
/// logged by [`report_config_issue`] once `LogPlugin` is installed.
#[derive(Resource, Debug)]
pub struct ConfigIssue {
    pub path: PathBuf,
    pub error: ConfigError,
}

pub fn report_config_issue(mut commands: Commands, issue: Option<Res<ConfigIssue>>) {
    if let Some(issue) = issue {
        warn!("Ignoring config {}: {}, using defaults", issue.path.display(), issue.error);
        commands.remove_resource::<ConfigIssue>();
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
