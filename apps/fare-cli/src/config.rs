//! CLI configuration.
//!
//! Loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Runtime settings of the `fare` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FareConfig {
    /// SQLite database file (`FARE_DB_PATH`)
    pub db_path: PathBuf,

    /// Pool size (`FARE_DB_MAX_CONNECTIONS`)
    pub db_max_connections: u32,

    /// Actor recorded in configuration logs (`FARE_ACTOR`)
    pub actor: String,

    /// Recorded as `calculated_by` on ride calculations (`FARE_CALCULATED_BY`)
    pub calculated_by: String,
}

impl FareConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_max_connections = match lookup("FARE_DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|max| *max > 0)
                .ok_or_else(|| ConfigError::InvalidValue("FARE_DB_MAX_CONNECTIONS".to_string()))?,
            None => 5,
        };

        let actor = non_blank(lookup("FARE_ACTOR"), "FARE_ACTOR")?.unwrap_or_else(|| "admin".to_string());
        let calculated_by = non_blank(lookup("FARE_CALCULATED_BY"), "FARE_CALCULATED_BY")?
            .unwrap_or_else(|| "cli".to_string());

        Ok(FareConfig {
            db_path: lookup("FARE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./fare.db")),
            db_max_connections,
            actor,
            calculated_by,
        })
    }
}

fn non_blank(value: Option<String>, key: &str) -> Result<Option<String>, ConfigError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ConfigError::InvalidValue(key.to_string())),
        Some(v) => Ok(Some(v.trim().to_string())),
        None => Ok(None),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
