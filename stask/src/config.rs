//! Configuration for the `stask` binary.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming the storage file
pub const DATA_FILE_VAR: &str = "STASK_DATA_FILE";
/// Environment variable holding the log filter
pub const LOG_VAR: &str = "STASK_LOG";
/// Environment variable holding the initial "show finished" flag
pub const SHOW_FINISHED_VAR: &str = "STASK_SHOW_FINISHED";

/// Errors raised while reading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set to a value that cannot be parsed
    #[error("invalid value `{value}` for {key}")]
    InvalidValue {
        /// Variable name
        key: &'static str,
        /// Offending value
        value: String,
    },
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// JSON file backing the key-value store (default: `stask.json`)
    pub data_file: PathBuf,
    /// `tracing` filter used when `RUST_LOG` is unset (default: `warn`)
    pub log_filter: String,
    /// Whether finished todos are listed at startup (default: `true`)
    pub show_completed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("stask.json"),
            log_filter: "warn".to_string(),
            show_completed: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let show_completed = match non_empty(SHOW_FINISHED_VAR) {
            Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidValue {
                key: SHOW_FINISHED_VAR,
                value,
            })?,
            None => defaults.show_completed,
        };

        Ok(Self {
            data_file: non_empty(DATA_FILE_VAR).map_or(defaults.data_file, PathBuf::from),
            log_filter: non_empty(LOG_VAR).unwrap_or(defaults.log_filter),
            show_completed,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
