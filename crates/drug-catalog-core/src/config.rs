//! Runtime configuration.
//!
//! Defaults can be overridden by a JSON file and then by `DRUG_CATALOG_*`
//! environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const APP_NAME: &str = "Drug Catalog";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const ENV_DATA_DIR: &str = "DRUG_CATALOG_DATA_DIR";
pub const ENV_EXPIRING_DAYS: &str = "DRUG_CATALOG_EXPIRING_DAYS";
pub const ENV_AUTO_DELETE: &str = "DRUG_CATALOG_AUTO_DELETE";
pub const ENV_CATCH_UP: &str = "DRUG_CATALOG_CATCH_UP";

/// Filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    "drug_catalog_core=info".to_string()
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the JSON data files
    pub data_dir: PathBuf,
    /// Drugs expiring within this many days are flagged as expiring soon
    pub expiring_window_days: u32,
    /// Delete expired drugs when the catalog is opened
    pub auto_delete_expired: bool,
    /// Missed minutes the reminder poller replays after a gap
    pub reminder_catch_up_minutes: u32,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            expiring_window_days: 30,
            auto_delete_expired: false,
            reminder_catch_up_minutes: 5,
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    pub fn with_data_dir<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Read a JSON config file. Missing keys take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `DRUG_CATALOG_*` overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir.trim());
        }
        if let Some(value) = lookup(ENV_EXPIRING_DAYS) {
            self.expiring_window_days = parse_number(ENV_EXPIRING_DAYS, &value)?;
        }
        if let Some(value) = lookup(ENV_AUTO_DELETE) {
            self.auto_delete_expired = parse_flag(ENV_AUTO_DELETE, &value)?;
        }
        if let Some(value) = lookup(ENV_CATCH_UP) {
            self.reminder_catch_up_minutes = parse_number(ENV_CATCH_UP, &value)?;
        }
        Ok(())
    }

    pub fn paths(&self) -> DataPaths {
        DataPaths::new(&self.data_dir)
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_number(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

/// Locations of the per-entity data files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub drugs: PathBuf,
    pub users: PathBuf,
    pub categories: PathBuf,
    pub reminders: PathBuf,
    pub schedules: PathBuf,
}

impl DataPaths {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            drugs: data_dir.join("drugs.json"),
            users: data_dir.join("users.json"),
            categories: data_dir.join("categories.json"),
            reminders: data_dir.join("reminders.json"),
            schedules: data_dir.join("schedules.json"),
        }
    }
}
