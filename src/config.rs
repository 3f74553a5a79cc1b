//! Predictor configuration, read from a JSON file. Every field has a default.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "SKYCAST_CONFIG_PATH";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Artifact bundle produced by the training job
    pub artifact_path: PathBuf,
    pub prediction: PredictionConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Single threshold for label and verdict; falls back to the bundle's, then 0.5
    pub decision_threshold: Option<f64>,
    /// Fail on any schema difference beyond reference-level indicators
    pub strict_schema: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            artifact_path: PathBuf::from("flight_booking_model.json"),
            prediction: PredictionConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

impl PredictorConfig {
    /// Defaults when the file does not exist; a present but unreadable file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&data)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))
    }

    /// `SKYCAST_CONFIG_PATH`, else `config.json` in the working directory
    pub fn default_path() -> PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.json"))
    }
}
