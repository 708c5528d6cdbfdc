use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::export::domain::export_sink::ExportFormat;
use crate::shared::constants::{
    DEFAULT_CONFIDENCE, DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_TICK_INTERVAL_MS,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    Invalid(String),
}

/// Operator-tunable session settings.
///
/// Every field has a default so partial JSON files load. Canonical resize
/// sizes are not settings; they define identities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub similarity_threshold: f64,
    pub confidence: f64,
    pub tick_interval_ms: u64,
    pub max_idle_ticks: Option<u64>,
    pub export_format: ExportFormat,
    pub model_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            confidence: DEFAULT_CONFIDENCE,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            max_idle_ticks: None,
            export_format: ExportFormat::Jpeg,
            model_path: None,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("FaceTrack").join("settings.json"))
    }

    /// Loads from the platform config directory, or defaults when no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.similarity_threshold > 0.0 && self.similarity_threshold <= 255.0) {
            return Err(ConfigError::Invalid(format!(
                "Similarity threshold must be in (0, 255], got {}",
                self.similarity_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ConfigError::Invalid(format!(
                "Confidence must be between 0.0 and 1.0, got {}",
                self.confidence
            )));
        }
        if self.max_idle_ticks == Some(0) {
            return Err(ConfigError::Invalid(
                "max_idle_ticks must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
