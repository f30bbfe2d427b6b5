//! Configuration: report coordinates, indicator vocabulary, and options
//!
//! Loaded once at process start from a TOML document. The vocabulary is an
//! array of tables so its order survives parsing — entry order is the
//! matcher's documented tie-break order.

pub mod repository;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::reconcile::excel::NormalizeOptions;
use crate::services::matching::IndicatorVocabulary;

/// Environment variable overriding the config file location
const CONFIG_ENV: &str = "HMIS_CONFIG";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub coordinates: ReportCoordinates,
    #[serde(default)]
    pub vocabulary: IndicatorVocabulary,
    #[serde(default)]
    pub matching: MatchingOptions,
    #[serde(default)]
    pub source: SourceOptions,
    #[serde(default)]
    pub tracker: TrackerOptions,
    #[serde(default)]
    pub api: Option<ApiOptions>,
}

/// Fixed coordinates every submitted value set carries
#[derive(Debug, Clone, Deserialize)]
pub struct ReportCoordinates {
    pub data_set: String,
    pub period: String,
    pub org_unit: String,
    #[serde(default)]
    pub attribute_option_combo: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchingOptions {
    /// Minimum token-overlap score a fuzzy candidate must exceed
    pub fuzzy_threshold: f64,
}

impl Default for MatchingOptions {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceOptions {
    /// Directory the transfer collaborator drops source files into
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerOptions {
    /// SQLite database path; defaults under the platform data dir
    pub db_path: Option<PathBuf>,
    /// Records whose last processing predates this horizon are pruned
    pub retention_days: i64,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            db_path: None,
            retention_days: 30,
        }
    }
}

/// Upload collaborator endpoint; the token comes from the environment
#[derive(Debug, Clone, Deserialize)]
pub struct ApiOptions {
    pub base_url: String,
}

impl Config {
    /// Load from an explicit path, `HMIS_CONFIG`, or the platform default
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match std::env::var(CONFIG_ENV) {
                Ok(p) => PathBuf::from(p),
                Err(_) => default_config_path()?,
            },
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Config::parse(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        if config.vocabulary.is_empty() {
            log::warn!("config has an empty indicator vocabulary; every run will submit nothing");
        }

        Ok(config)
    }

    /// Parse a TOML document
    pub fn parse(text: &str) -> Result<Config> {
        toml::from_str(text).context("Failed to parse config TOML")
    }

    /// Normalizer defaults derived from the report coordinates
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            default_period: self.coordinates.period.clone(),
            default_org_unit: self.coordinates.org_unit.clone(),
        }
    }

    /// Resolved tracker database path
    pub fn tracker_db_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.tracker.db_path {
            return Ok(path.clone());
        }
        let dir = dirs::data_dir().context("Could not determine platform data directory")?;
        Ok(dir.join("hmis-cli").join("tracker.db"))
    }
}

fn default_config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("Could not determine platform config directory")?;
    Ok(dir.join("hmis-cli").join("config.toml"))
}
