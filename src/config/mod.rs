//! Configuration: limits, plot defaults, and the weather weight tables used for randomization.

use crate::parser::parse_float;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Maximum size in bytes for a mission file (bound input size).
pub const MAX_MISSION_FILE_BYTES: usize = 8 * 1024 * 1024;

/// Suffix replacing the `.mis` extension of the generated variant.
pub const FOW_SUFFIX: &str = "-fow.mis";

/// Default canvas size for route plots.
pub const DEFAULT_PLOT_WIDTH: u32 = 800;
pub const DEFAULT_PLOT_HEIGHT: u32 = 600;

/// Map units covered by the plot canvas on each axis.
pub const DEFAULT_MAP_EXTENT: f64 = 52_000.0;

/// Built-in cloud type weights, used when no settings file can be read.
pub const DEFAULT_CLOUD_TYPE_WEIGHTS: [(i32, u32); 4] = [(1, 1), (2, 4), (3, 2), (4, 0)];

/// Built-in cloud height weights, used when no settings file can be read.
pub const DEFAULT_CLOUD_HEIGHT_WEIGHTS: [(f64, u32); 4] =
    [(1000.0, 1), (2000.0, 2), (3000.0, 1), (4000.0, 0)];

#[derive(Debug, Clone, Deserialize)]
pub struct PlotConfig {
    #[serde(default = "default_plot_width")]
    pub width: u32,
    #[serde(default = "default_plot_height")]
    pub height: u32,
    /// Map units mapped onto the full canvas width/height.
    #[serde(default = "default_map_extent")]
    pub map_extent: f64,
}

fn default_plot_width() -> u32 {
    DEFAULT_PLOT_WIDTH
}

fn default_plot_height() -> u32 {
    DEFAULT_PLOT_HEIGHT
}

fn default_map_extent() -> f64 {
    DEFAULT_MAP_EXTENT
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_PLOT_WIDTH,
            height: DEFAULT_PLOT_HEIGHT,
            map_extent: DEFAULT_MAP_EXTENT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid TOML settings: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid {table} key: {key:?}")]
    InvalidKey { table: &'static str, key: String },
}

/// On-disk shape. Keys are strings in both JSON and TOML.
#[derive(Debug, Deserialize)]
struct RawWeatherSettings {
    #[serde(rename = "CloudTypeWeights", default)]
    cloud_type_weights: BTreeMap<String, u32>,
    #[serde(rename = "CloudHeightWeights", default)]
    cloud_height_weights: BTreeMap<String, u32>,
}

/// Weight tables for weather randomization, each sorted ascending by value.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSettings {
    pub cloud_type_weights: Vec<(i32, u32)>,
    pub cloud_height_weights: Vec<(f64, u32)>,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            cloud_type_weights: DEFAULT_CLOUD_TYPE_WEIGHTS.to_vec(),
            cloud_height_weights: DEFAULT_CLOUD_HEIGHT_WEIGHTS.to_vec(),
        }
    }
}

/// Result of [`WeatherSettings::load_or_default`]: the tables in use and, if the
/// built-in defaults were substituted, why.
#[derive(Debug)]
pub struct SettingsLoad {
    pub settings: WeatherSettings,
    pub fallback: Option<SettingsError>,
}

impl SettingsLoad {
    pub fn used_defaults(&self) -> bool {
        self.fallback.is_some()
    }
}

impl WeatherSettings {
    /// Read a settings file. `.toml` files are TOML, anything else is JSON.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_toml = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);
        if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    /// Read a settings file, substituting the built-in tables on any failure.
    pub fn load_or_default(path: &Path) -> SettingsLoad {
        match Self::load(path) {
            Ok(settings) => {
                tracing::debug!(
                    "loaded {} cloud type and {} cloud height weight(s) from {}",
                    settings.cloud_type_weights.len(),
                    settings.cloud_height_weights.len(),
                    path.display()
                );
                SettingsLoad {
                    settings,
                    fallback: None,
                }
            }
            Err(e) => SettingsLoad {
                settings: Self::default(),
                fallback: Some(e),
            },
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, SettingsError> {
        let raw: RawWeatherSettings = serde_json::from_str(s)?;
        Self::from_raw(raw)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, SettingsError> {
        let raw: RawWeatherSettings = toml::from_str(s)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawWeatherSettings) -> Result<Self, SettingsError> {
        let mut cloud_type_weights = parse_keys(raw.cloud_type_weights, "CloudTypeWeights", |k| {
            i32::from_str(k).ok()
        })?;
        cloud_type_weights.sort_by_key(|(k, _)| *k);
        let mut cloud_height_weights =
            parse_keys(raw.cloud_height_weights, "CloudHeightWeights", |k| {
                parse_float("CloudHeightWeights", k).ok()
            })?;
        cloud_height_weights.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Self {
            cloud_type_weights,
            cloud_height_weights,
        })
    }
}

fn parse_keys<K>(
    raw: BTreeMap<String, u32>,
    table: &'static str,
    parse: impl Fn(&str) -> Option<K>,
) -> Result<Vec<(K, u32)>, SettingsError> {
    raw.into_iter()
        .map(|(key, weight)| match parse(key.trim()) {
            Some(k) => Ok((k, weight)),
            None => Err(SettingsError::InvalidKey { table, key }),
        })
        .collect()
}
