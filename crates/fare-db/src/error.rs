//! # Storage Errors
//!
//! [`DbError`] says what went wrong in SQLite terms; the service converts it
//! into the pricing taxonomy before it leaves this crate.
//!
//! ```text
//! sqlx::Error ──► DbError ──► CoreError
//!                   NotFound ─────────► ConfigurationNotFound
//!                   UniqueViolation ──► InvalidConfiguration(Duplicate)
//!                   anything else ────► StorageUnavailable
//! ```

use fare_core::{CoreError, ValidationError};
use sqlx::error::ErrorKind;
use thiserror::Error;

/// Message raised by the append-only triggers in the schema.
const APPEND_ONLY: &str = "append-only";

#[derive(Debug, Error)]
pub enum DbError {
    /// An UPDATE or DELETE matched no row.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// ## When This Occurs
    /// - Creating a configuration, or renaming one, to a name already in use
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Rejected by a trigger or CHECK constraint, e.g. an UPDATE against the
    /// log or calculation tables.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// No connection became free within the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A stored row no longer decodes (bad decimal text, unknown weekday,
    /// malformed JSON column).
    #[error("Corrupt {entity} row {id}: {reason}")]
    CorruptRow {
        entity: String,
        id: String,
        reason: String,
    },

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn corrupt(entity: impl Into<String>, id: impl Into<String>, reason: impl ToString) -> Self {
        DbError::CorruptRow {
            entity: entity.into(),
            id: id.into(),
            reason: reason.to_string(),
        }
    }
}

/// Column named in `UNIQUE constraint failed: <table>.<column>`.
fn unique_column(message: &str) -> &str {
    message
        .rsplit(": ")
        .next()
        .and_then(|qualified| qualified.rsplit('.').next())
        .unwrap_or("unknown")
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let message = db_err.message();
                match db_err.kind() {
                    // The caller knows the offending value and replaces it
                    ErrorKind::UniqueViolation => DbError::duplicate(unique_column(message), "unknown"),
                    _ if message.starts_with("UNIQUE constraint failed") => {
                        DbError::duplicate(unique_column(message), "unknown")
                    }
                    ErrorKind::CheckViolation => DbError::ConstraintViolation(message.to_string()),
                    _ if message.contains(APPEND_ONLY) => {
                        DbError::ConstraintViolation(message.to_string())
                    }
                    _ => DbError::QueryFailed(message.to_string()),
                }
            }
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::Internal(format!("column {index}: {source}"))
            }
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { id, .. } => CoreError::ConfigurationNotFound(id),
            DbError::UniqueViolation { field, value } => {
                CoreError::InvalidConfiguration(ValidationError::Duplicate { field, value })
            }
            other => CoreError::StorageUnavailable(other.to_string()),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[test]
    fn test_unique_column() {
        assert_eq!(
            unique_column("UNIQUE constraint failed: pricing_configurations.name"),
            "name"
        );
        assert_eq!(unique_column("no column here"), "no column here");
    }

    #[test]
    fn test_db_error_into_core_error() {
        let core: CoreError = DbError::not_found("PricingConfiguration", "cfg-1").into();
        assert!(matches!(core, CoreError::ConfigurationNotFound(id) if id == "cfg-1"));

        let core: CoreError = DbError::duplicate("name", "Standard Weekday").into();
        assert!(matches!(
            core,
            CoreError::InvalidConfiguration(ValidationError::Duplicate { .. })
        ));

        let core: CoreError = DbError::corrupt("RideCalculation", "calc-1", "bad decimal").into();
        assert!(matches!(core, CoreError::StorageUnavailable(msg) if msg.contains("calc-1")));
    }

    #[tokio::test]
    async fn test_check_constraint_is_classified() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = sqlx::query(
            "INSERT INTO pricing_configuration_logs
                 (id, pricing_config_id, action, actor, timestamp, notes)
             VALUES ('log-1', 'cfg-1', 'RENAME', 'admin', '2024-01-01T00:00:00Z', '')",
        )
        .execute(db.pool())
        .await
        .map_err(DbError::from)
        .unwrap_err();

        assert!(matches!(err, DbError::ConstraintViolation(_)));
    }
}
