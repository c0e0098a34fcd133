//! # CLI Error Type
//!
//! Unified error type for `fare` commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Command Function  ─── Result<Value, CliError>                          │
//! │         │                                                               │
//! │         ├── CoreError::InvalidInput ──────────► INVALID_INPUT           │
//! │         ├── CoreError::InvalidConfiguration ──► INVALID_CONFIGURATION   │
//! │         ├── CoreError::NoApplicable... ───────► NO_APPLICABLE_...       │
//! │         ├── CoreError::ConfigurationNotFound ─► NOT_FOUND               │
//! │         ├── CoreError::ConfigurationConflict ─► CONFIGURATION_CONFLICT  │
//! │         └── CoreError::StorageUnavailable ────► STORAGE_UNAVAILABLE     │
//! │                                                                         │
//! │  stdout: { "success": false, "error": { "code": ..., "message": ... } } │
//! │  exit status: ErrorCode::exit_status()                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use fare_core::CoreError;
use serde::Serialize;

use crate::config::ConfigError;

/// Error printed by a failed command.
///
/// ```json
/// {
///   "code": "CONFIGURATION_CONFLICT",
///   "message": "Configuration conflicts with 'Standard Weekday' ..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct CliError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Ride or command arguments failed validation
    InvalidInput,

    /// A configuration draft failed validation
    InvalidConfiguration,

    /// No active configuration prices the requested day
    NoApplicableConfiguration,

    /// Configuration or calculation does not exist
    NotFound,

    /// Another active configuration claims one of the same days
    ConfigurationConflict,

    /// The database could not serve the request
    StorageUnavailable,
}

impl ErrorCode {
    /// Process exit status for this code.
    ///
    /// `1` for rejected requests, `3` for environment failures. `2` stays
    /// with clap's usage errors.
    pub fn exit_status(self) -> u8 {
        match self {
            ErrorCode::StorageUnavailable => 3,
            _ => 1,
        }
    }
}

impl CliError {
    /// Creates a new CLI error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CliError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        CliError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::InvalidInput, message)
    }

    /// Creates an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::InvalidConfiguration, message)
    }
}

/// Converts core errors to CLI errors.
impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::InvalidInput(_) => ErrorCode::InvalidInput,
            CoreError::InvalidConfiguration(_) => ErrorCode::InvalidConfiguration,
            CoreError::NoApplicableConfiguration { .. } => ErrorCode::NoApplicableConfiguration,
            CoreError::ConfigurationNotFound(_) => ErrorCode::NotFound,
            CoreError::ConfigurationConflict { .. } => ErrorCode::ConfigurationConflict,
            CoreError::StorageUnavailable(reason) => {
                tracing::error!("Storage unavailable: {}", reason);
                ErrorCode::StorageUnavailable
            }
        };
        CliError::new(code, err.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::invalid_input(err.to_string())
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for CliError {}

#[cfg(test)]
mod tests {
    use super::*;
    use fare_core::{ValidationError, Weekday};

    #[test]
    fn test_core_error_codes() {
        let cases = [
            (
                CoreError::InvalidInput(ValidationError::MustBePositive {
                    field: "distance_km".to_string(),
                }),
                ErrorCode::InvalidInput,
            ),
            (
                CoreError::InvalidConfiguration(ValidationError::Required {
                    field: "applicable_days".to_string(),
                }),
                ErrorCode::InvalidConfiguration,
            ),
            (
                CoreError::ConfigurationNotFound("cfg-9".to_string()),
                ErrorCode::NotFound,
            ),
            (
                CoreError::ConfigurationConflict {
                    conflicting_id: "cfg-1".to_string(),
                    conflicting_name: "Standard Weekday".to_string(),
                    days: vec![Weekday::Monday],
                },
                ErrorCode::ConfigurationConflict,
            ),
            (
                CoreError::StorageUnavailable("disk I/O error".to_string()),
                ErrorCode::StorageUnavailable,
            ),
        ];

        for (err, code) in cases {
            let message = err.to_string();
            let cli = CliError::from(err);
            assert_eq!(cli.code, code);
            assert_eq!(cli.message, message);
        }
    }

    #[test]
    fn test_serialized_shape() {
        let err = CliError::not_found("Calculation", "calc-1");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Calculation not found: calc-1");
    }

    #[test]
    fn test_exit_status() {
        assert_eq!(ErrorCode::StorageUnavailable.exit_status(), 3);
        assert_eq!(ErrorCode::ConfigurationConflict.exit_status(), 1);
        assert_ne!(ErrorCode::InvalidInput.exit_status(), 0);
    }
}
