//! Census configuration loaded from YAML.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::inactivity::DEFAULT_MIN_INACTIVE_DAYS;
use crate::report::DEFAULT_PREVIEW_ROWS;

fn default_map_path() -> PathBuf {
    PathBuf::from("travian_map.json")
}

fn default_history_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_report_path() -> PathBuf {
    PathBuf::from("inactive_players.csv")
}

fn default_min_inactive_days() -> u32 {
    DEFAULT_MIN_INACTIVE_DAYS
}

fn default_preview_rows() -> usize {
    DEFAULT_PREVIEW_ROWS
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CensusConfig {
    #[serde(default = "default_map_path")]
    pub map_path: PathBuf,
    #[serde(default = "default_history_dir")]
    pub history_dir: PathBuf,
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,
    #[serde(default = "default_min_inactive_days")]
    pub min_inactive_days: u32,
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for CensusConfig {
    fn default() -> Self {
        Self {
            map_path: default_map_path(),
            history_dir: default_history_dir(),
            report_path: default_report_path(),
            min_inactive_days: default_min_inactive_days(),
            preview_rows: default_preview_rows(),
            logging: LoggingConfig::default(),
        }
    }
}

impl CensusConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&data).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
