// Configuration utilities
// Author: Gabriel Demetrios Lafis

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::processing::{FillStrategy, RenameMap, TypeMap};
use crate::validation::RuleSet;
use super::{AppError, AppResult};

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Columns dropped as personally identifying, matched after header normalization
    pub pii_columns: Vec<String>,
    pub rename_map: RenameMap,
    /// Trim whitespace around every text cell before casting
    pub strip_whitespace: bool,
    /// Fill missing numeric cells after casting
    pub fill_missing: Option<FillStrategy>,
    pub type_map: TypeMap,
    pub rules: RuleSet,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Where artifacts are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub state_file: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pii_columns: vec!["email".to_string(), "name".to_string(), "phone".to_string()],
            rename_map: RenameMap::new(),
            strip_whitespace: false,
            fill_missing: None,
            type_map: TypeMap::new(),
            rules: RuleSet::new(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            dir: PathBuf::from("outputs"),
            state_file: PathBuf::from("state/state.json"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a `.json`, `.yaml` or `.yml` file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&contents)
                .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e))),
            Some("yaml") | Some("yml") => serde_yaml::from_str(&contents)
                .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e))),
            _ => Err(AppError::Config(format!(
                "Unsupported config file format: {}",
                path.display()
            ))),
        }
    }

    /// Get the log level filter
    pub fn log_level_filter(&self) -> log::LevelFilter {
        match self.logging.level.to_lowercase().as_str() {
            "off" => log::LevelFilter::Off,
            "error" => log::LevelFilter::Error,
            "warn" => log::LevelFilter::Warn,
            "info" => log::LevelFilter::Info,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            _ => log::LevelFilter::Info,
        }
    }

    /// The configuration as JSON, as stored in the state file
    pub fn to_json(&self) -> AppResult<serde_json::Value> {
        serde_json::to_value(self)
            .map_err(|e| AppError::Config(format!("cannot serialize configuration: {}", e)))
    }
}
