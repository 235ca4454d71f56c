//! Runtime configuration from an optional TOML file and environment overrides.
//!
//! # Environment Variables
//!
//! - `NOSHOW_CONFIG`: path to a TOML file (default: `noshow.toml` when present)
//! - `NOSHOW_FEED`: appointment CSV path
//! - `NOSHOW_MODEL`: model artifact path
//! - `NOSHOW_OUTPUT`: `table` | `csv` | `json`

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::OutputFormat;

pub const DEFAULT_CONFIG_FILE: &str = "noshow.toml";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Appointment feed (CSV)
    pub feed_path: PathBuf,
    /// Pre-trained model artifact (JSON)
    pub model_path: PathBuf,
    /// Initial value of the start date field
    pub default_start: String,
    /// Initial value of the end date field
    pub default_end: String,
    /// Feed columns withheld from the classifier (labels)
    pub excluded_columns: Vec<String>,
    /// How results are printed
    pub output_format: OutputFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed_path: PathBuf::from("CHLA_clean_data_2024_Appointments.csv"),
            model_path: PathBuf::from("final_no_show_model.json"),
            default_start: "1/1/2024".to_string(),
            default_end: "1/31/2024".to_string(),
            excluded_columns: vec!["NO_SHOW".to_string()],
            output_format: OutputFormat::Table,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from the process environment.
    pub fn load() -> ConfigResult<Self> {
        let lookup = |key: &str| env::var(key).ok();

        let mut config = match lookup("NOSHOW_CONFIG") {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    /// Read a TOML file. Missing keys keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse TOML text.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply `NOSHOW_*` overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(feed) = lookup("NOSHOW_FEED") {
            self.feed_path = PathBuf::from(feed);
        }
        if let Some(model) = lookup("NOSHOW_MODEL") {
            self.model_path = PathBuf::from(model);
        }
        if let Some(output) = lookup("NOSHOW_OUTPUT") {
            self.output_format = output.parse().map_err(|_| ConfigError::InvalidValue {
                key: "NOSHOW_OUTPUT",
                value: output.clone(),
            })?;
        }
        Ok(())
    }
}
