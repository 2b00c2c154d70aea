//! Dashboard configuration
//!
//! JSON file, every key optional. The path comes from `--config` on the CLI
//! or from `SWING_CONFIG_PATH`; without either, defaults apply.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::data::LoadOptions;
use crate::error::ConfigError;
use crate::models::MetricField;

/// Env var pointing at a JSON config file.
pub const CONFIG_PATH_ENV: &str = "SWING_CONFIG_PATH";

/// Env var overriding `data_path`.
pub const DATA_PATH_ENV: &str = "SWING_DATA_PATH";

/// Default dataset location, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "files/combined_data.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Pitch dataset (.csv, .json or .lz4 snapshot)
    pub data_path: PathBuf,
    /// Directory with the per-count rate JSON files
    pub rates_dir: Option<PathBuf>,
    /// Max auto-complete suggestions
    pub suggestion_limit: usize,
    /// Gauge bounds round up to a multiple of this
    pub scale_round_to: f64,
    /// Gauge max used when a field has no data
    pub scale_max_floor: f64,
    /// Swing path tilt bound when the dataset has no tilt values
    pub tilt_fallback_max: f64,
    /// Drop trailing stance markers from batter names
    pub strip_hand_marker: bool,
    /// Gauges in display order
    pub gauges: Vec<MetricField>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            rates_dir: None,
            suggestion_limit: 10,
            scale_round_to: 10.0,
            scale_max_floor: 1.0,
            tilt_fallback_max: 60.0,
            strip_hand_marker: true,
            gauges: MetricField::ALL.to_vec(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Defaults, then `SWING_CONFIG_PATH`, then `SWING_DATA_PATH`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match env_path(CONFIG_PATH_ENV) {
            Some(path) => Self::from_path(&path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Some(path) = env_path(DATA_PATH_ENV) {
            self.data_path = path;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.scale_round_to.is_finite() && self.scale_round_to > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "scale_round_to must be positive, got {}",
                self.scale_round_to
            )));
        }
        if !(self.scale_max_floor.is_finite() && self.scale_max_floor > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "scale_max_floor must be positive, got {}",
                self.scale_max_floor
            )));
        }
        if !(self.tilt_fallback_max.is_finite() && self.tilt_fallback_max > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "tilt_fallback_max must be positive, got {}",
                self.tilt_fallback_max
            )));
        }
        if self.gauges.is_empty() {
            return Err(ConfigError::Invalid("gauges must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            strip_hand_marker: self.strip_hand_marker,
        }
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    let value = env::var(name).ok()?;
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}
