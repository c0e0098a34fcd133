//! # Configuration Log Repository
//!
//! Append-only audit trail of configuration mutations. Entries are written in
//! the same transaction as the mutation they describe; the table's triggers
//! reject any later UPDATE or DELETE.

use chrono::{DateTime, Utc};
use fare_core::{ConfigurationLog, LogAction};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

#[derive(Debug, FromRow)]
struct LogRow {
    id: String,
    pricing_config_id: String,
    action: LogAction,
    actor: String,
    timestamp: DateTime<Utc>,
    previous_state: Option<String>,
    new_state: Option<String>,
    notes: String,
}

impl TryFrom<LogRow> for ConfigurationLog {
    type Error = DbError;

    fn try_from(row: LogRow) -> DbResult<Self> {
        let previous_state = parse_state(&row.id, row.previous_state)?;
        let new_state = parse_state(&row.id, row.new_state)?;

        Ok(ConfigurationLog {
            id: row.id,
            pricing_config_id: row.pricing_config_id,
            action: row.action,
            actor: row.actor,
            timestamp: row.timestamp,
            previous_state,
            new_state,
            notes: row.notes,
        })
    }
}

fn parse_state(id: &str, state: Option<String>) -> DbResult<Option<serde_json::Value>> {
    state
        .map(|json| serde_json::from_str(&json))
        .transpose()
        .map_err(|e| DbError::corrupt("ConfigurationLog", id, e))
}

/// Repository for configuration log reads.
#[derive(Debug, Clone)]
pub struct ConfigurationLogRepository {
    pool: SqlitePool,
}

impl ConfigurationLogRepository {
    /// Creates a new ConfigurationLogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ConfigurationLogRepository { pool }
    }

    /// History of one configuration, oldest first.
    ///
    /// Still available after the configuration is deleted.
    pub async fn list_for_configuration(&self, config_id: &str) -> DbResult<Vec<ConfigurationLog>> {
        debug!(config_id = %config_id, "Loading configuration history");

        let rows = sqlx::query_as::<_, LogRow>(
            r#"
            SELECT id, pricing_config_id, action, actor, timestamp,
                   previous_state, new_state, notes
            FROM pricing_configuration_logs
            WHERE pricing_config_id = ?1
            ORDER BY timestamp ASC, rowid ASC
            "#,
        )
        .bind(config_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ConfigurationLog::try_from).collect()
    }

    /// Counts every log entry.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pricing_configuration_logs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Appends a log entry on the given connection (normally a transaction).
pub async fn append(conn: &mut SqliteConnection, entry: &ConfigurationLog) -> DbResult<()> {
    debug!(
        config_id = %entry.pricing_config_id,
        action = ?entry.action,
        "Appending configuration log"
    );

    let encode = |state: &Option<serde_json::Value>| -> DbResult<Option<String>> {
        state
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| DbError::Internal(e.to_string()))
    };

    sqlx::query(
        r#"
        INSERT INTO pricing_configuration_logs (
            id, pricing_config_id, action, actor, timestamp,
            previous_state, new_state, notes
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.pricing_config_id)
    .bind(entry.action)
    .bind(&entry.actor)
    .bind(entry.timestamp)
    .bind(encode(&entry.previous_state)?)
    .bind(encode(&entry.new_state)?)
    .bind(&entry.notes)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
