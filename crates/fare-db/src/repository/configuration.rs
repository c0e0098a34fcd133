//! # Pricing Configuration Repository
//!
//! Storage for [`PricingConfiguration`] rows.
//!
//! ## Read vs Write Access
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ConfigurationRepository (pool)        free functions (&mut conn)      │
//! │  ───────────────────────────────       ───────────────────────────     │
//! │  get_by_id                             fetch_by_id                     │
//! │  list_all                              fetch_all                       │
//! │  list_active_for_day                   fetch_by_name                   │
//! │  count                                 insert / update / delete        │
//! │                                                                         │
//! │  Readers take a pooled connection.     Writers run inside the caller's │
//! │                                        transaction, under the gate.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ordering is always newest first: `created_at DESC, rowid DESC`.

use chrono::{DateTime, Utc};
use fare_core::{Money, PricingConfiguration, TimeComponentMode, TimeTier, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use std::str::FromStr;
use tracing::debug;

use crate::error::{DbError, DbResult};

const ENTITY: &str = "PricingConfiguration";

const SELECT_COLUMNS: &str = r#"
    SELECT
        id,
        name,
        description,
        is_active,
        applicable_days,
        base_distance_km,
        base_price_cents,
        additional_price_per_km_cents,
        time_multiplier_tiers,
        time_component_mode,
        waiting_free_minutes,
        waiting_charge_per_interval_cents,
        waiting_interval_minutes,
        created_at,
        updated_at,
        created_by,
        updated_by
    FROM pricing_configurations
"#;

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, FromRow)]
struct ConfigurationRow {
    id: String,
    name: String,
    description: String,
    is_active: bool,
    applicable_days: String,
    base_distance_km: String,
    base_price_cents: i64,
    additional_price_per_km_cents: i64,
    time_multiplier_tiers: String,
    time_component_mode: TimeComponentMode,
    waiting_free_minutes: i64,
    waiting_charge_per_interval_cents: i64,
    waiting_interval_minutes: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    created_by: Option<String>,
    updated_by: Option<String>,
}

/// Tier as stored: decimals as strings so thresholds survive exactly.
#[derive(Debug, Serialize, Deserialize)]
struct StoredTier {
    max_hours: String,
    multiplier: String,
}

impl TryFrom<ConfigurationRow> for PricingConfiguration {
    type Error = DbError;

    fn try_from(row: ConfigurationRow) -> DbResult<Self> {
        let id = row.id;
        let corrupt = |reason: String| DbError::corrupt(ENTITY, id.clone(), reason);

        let applicable_days: Vec<Weekday> = serde_json::from_str(&row.applicable_days)
            .map_err(|e| corrupt(format!("applicable_days: {e}")))?;

        let stored_tiers: Vec<StoredTier> = serde_json::from_str(&row.time_multiplier_tiers)
            .map_err(|e| corrupt(format!("time_multiplier_tiers: {e}")))?;
        let time_multiplier_tiers = stored_tiers
            .iter()
            .map(|tier| -> Result<TimeTier, rust_decimal::Error> {
                Ok(TimeTier::new(
                    Decimal::from_str(&tier.max_hours)?,
                    Decimal::from_str(&tier.multiplier)?,
                ))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| corrupt(format!("time_multiplier_tiers: {e}")))?;

        let base_distance_km = Decimal::from_str(&row.base_distance_km)
            .map_err(|e| corrupt(format!("base_distance_km: {e}")))?;

        Ok(PricingConfiguration {
            id,
            name: row.name,
            description: row.description,
            is_active: row.is_active,
            applicable_days,
            base_distance_km,
            base_price: Money::from_cents(row.base_price_cents),
            additional_price_per_km: Money::from_cents(row.additional_price_per_km_cents),
            time_multiplier_tiers,
            time_component_mode: row.time_component_mode,
            waiting_free_minutes: row.waiting_free_minutes,
            waiting_charge_per_interval: Money::from_cents(row.waiting_charge_per_interval_cents),
            waiting_interval_minutes: row.waiting_interval_minutes,
            created_at: row.created_at,
            updated_at: row.updated_at,
            created_by: row.created_by,
            updated_by: row.updated_by,
        })
    }
}

fn decode_all(rows: Vec<ConfigurationRow>) -> DbResult<Vec<PricingConfiguration>> {
    rows.into_iter().map(PricingConfiguration::try_from).collect()
}

fn encode_days(config: &PricingConfiguration) -> DbResult<String> {
    serde_json::to_string(&config.applicable_days).map_err(|e| DbError::Internal(e.to_string()))
}

fn encode_tiers(config: &PricingConfiguration) -> DbResult<String> {
    let stored: Vec<StoredTier> = config
        .time_multiplier_tiers
        .iter()
        .map(|tier| StoredTier {
            max_hours: tier.max_hours.to_string(),
            multiplier: tier.multiplier.to_string(),
        })
        .collect();
    serde_json::to_string(&stored).map_err(|e| DbError::Internal(e.to_string()))
}

// =============================================================================
// Repository (pooled reads)
// =============================================================================

/// Repository for pricing configuration reads.
#[derive(Debug, Clone)]
pub struct ConfigurationRepository {
    pool: SqlitePool,
}

impl ConfigurationRepository {
    /// Creates a new ConfigurationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ConfigurationRepository { pool }
    }

    /// Gets a configuration by ID, active or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PricingConfiguration>> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_id(&mut conn, id).await
    }

    /// Lists every configuration, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<PricingConfiguration>> {
        let mut conn = self.pool.acquire().await?;
        fetch_all(&mut conn).await
    }

    /// Lists active configurations claiming `day`, newest first.
    pub async fn list_active_for_day(&self, day: Weekday) -> DbResult<Vec<PricingConfiguration>> {
        debug!(day = %day, "Loading active configurations");

        let sql = format!(
            "{SELECT_COLUMNS}
             WHERE is_active = 1
               AND EXISTS (SELECT 1 FROM json_each(applicable_days) WHERE json_each.value = ?1)
             ORDER BY created_at DESC, rowid DESC"
        );
        let rows = sqlx::query_as::<_, ConfigurationRow>(&sql)
            .bind(day.as_str())
            .fetch_all(&self.pool)
            .await?;

        decode_all(rows)
    }

    /// Counts stored configurations.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pricing_configurations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Connection-level operations (used inside transactions)
// =============================================================================

/// Fetches a configuration by ID on the given connection.
pub async fn fetch_by_id(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<PricingConfiguration>> {
    debug!(id = %id, "Fetching configuration");

    let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
    let row = sqlx::query_as::<_, ConfigurationRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    row.map(PricingConfiguration::try_from).transpose()
}

/// Fetches a configuration by its (trimmed) name.
pub async fn fetch_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> DbResult<Option<PricingConfiguration>> {
    let sql = format!("{SELECT_COLUMNS} WHERE name = ?1");
    let row = sqlx::query_as::<_, ConfigurationRow>(&sql)
        .bind(name.trim())
        .fetch_optional(&mut *conn)
        .await?;

    row.map(PricingConfiguration::try_from).transpose()
}

/// Fetches every configuration, newest first.
pub async fn fetch_all(conn: &mut SqliteConnection) -> DbResult<Vec<PricingConfiguration>> {
    let sql = format!("{SELECT_COLUMNS} ORDER BY created_at DESC, rowid DESC");
    let rows = sqlx::query_as::<_, ConfigurationRow>(&sql)
        .fetch_all(&mut *conn)
        .await?;

    decode_all(rows)
}

/// Inserts a new configuration.
pub async fn insert(conn: &mut SqliteConnection, config: &PricingConfiguration) -> DbResult<()> {
    debug!(id = %config.id, name = %config.name, "Inserting configuration");

    sqlx::query(
        r#"
        INSERT INTO pricing_configurations (
            id, name, description, is_active, applicable_days,
            base_distance_km, base_price_cents, additional_price_per_km_cents,
            time_multiplier_tiers, time_component_mode,
            waiting_free_minutes, waiting_charge_per_interval_cents, waiting_interval_minutes,
            created_at, updated_at, created_by, updated_by
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5,
            ?6, ?7, ?8,
            ?9, ?10,
            ?11, ?12, ?13,
            ?14, ?15, ?16, ?17
        )
        "#,
    )
    .bind(&config.id)
    .bind(&config.name)
    .bind(&config.description)
    .bind(config.is_active)
    .bind(encode_days(config)?)
    .bind(config.base_distance_km.to_string())
    .bind(config.base_price.cents())
    .bind(config.additional_price_per_km.cents())
    .bind(encode_tiers(config)?)
    .bind(config.time_component_mode)
    .bind(config.waiting_free_minutes)
    .bind(config.waiting_charge_per_interval.cents())
    .bind(config.waiting_interval_minutes)
    .bind(config.created_at)
    .bind(config.updated_at)
    .bind(&config.created_by)
    .bind(&config.updated_by)
    .execute(&mut *conn)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &config.name),
        other => other,
    })?;

    Ok(())
}

/// Overwrites every mutable column of an existing configuration.
pub async fn update(conn: &mut SqliteConnection, config: &PricingConfiguration) -> DbResult<()> {
    debug!(id = %config.id, "Updating configuration");

    let result = sqlx::query(
        r#"
        UPDATE pricing_configurations SET
            name = ?2,
            description = ?3,
            is_active = ?4,
            applicable_days = ?5,
            base_distance_km = ?6,
            base_price_cents = ?7,
            additional_price_per_km_cents = ?8,
            time_multiplier_tiers = ?9,
            time_component_mode = ?10,
            waiting_free_minutes = ?11,
            waiting_charge_per_interval_cents = ?12,
            waiting_interval_minutes = ?13,
            updated_at = ?14,
            updated_by = ?15
        WHERE id = ?1
        "#,
    )
    .bind(&config.id)
    .bind(&config.name)
    .bind(&config.description)
    .bind(config.is_active)
    .bind(encode_days(config)?)
    .bind(config.base_distance_km.to_string())
    .bind(config.base_price.cents())
    .bind(config.additional_price_per_km.cents())
    .bind(encode_tiers(config)?)
    .bind(config.time_component_mode)
    .bind(config.waiting_free_minutes)
    .bind(config.waiting_charge_per_interval.cents())
    .bind(config.waiting_interval_minutes)
    .bind(config.updated_at)
    .bind(&config.updated_by)
    .execute(&mut *conn)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &config.name),
        other => other,
    })?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found(ENTITY, &config.id));
    }

    Ok(())
}

/// Deletes a configuration row.
pub async fn delete(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
    debug!(id = %id, "Deleting configuration");

    let result = sqlx::query("DELETE FROM pricing_configurations WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found(ENTITY, id));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
