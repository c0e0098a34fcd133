//! # Ride Calculation Repository
//!
//! Append-only storage for [`RideCalculation`] records. A record carries its
//! own breakdown and configuration name, so it stays readable after the
//! configuration is edited or deleted.

use chrono::{DateTime, Utc};
use fare_core::{Money, RideCalculation, Weekday};
use rust_decimal::Decimal;
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;
use tracing::debug;

use crate::error::{DbError, DbResult};

const ENTITY: &str = "RideCalculation";

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, pricing_config_id, pricing_config_name,
        distance_km, time_hours, waiting_minutes, day_of_week,
        distance_base_price_cents, additional_distance_price_cents,
        time_multiplier_component_cents, waiting_charges_cents, total_price_cents,
        time_multiplier, calculated_at, calculated_by
    FROM ride_calculations
"#;

#[derive(Debug, FromRow)]
struct CalculationRow {
    id: String,
    pricing_config_id: String,
    pricing_config_name: String,
    distance_km: String,
    time_hours: String,
    waiting_minutes: i64,
    day_of_week: String,
    distance_base_price_cents: i64,
    additional_distance_price_cents: i64,
    time_multiplier_component_cents: i64,
    waiting_charges_cents: i64,
    total_price_cents: i64,
    time_multiplier: String,
    calculated_at: DateTime<Utc>,
    calculated_by: Option<String>,
}

impl TryFrom<CalculationRow> for RideCalculation {
    type Error = DbError;

    fn try_from(row: CalculationRow) -> DbResult<Self> {
        let decimal = |value: &str, column: &str| {
            Decimal::from_str(value).map_err(|e| DbError::corrupt(ENTITY, &row.id, format!("{column}: {e}")))
        };

        let distance_km = decimal(&row.distance_km, "distance_km")?;
        let time_hours = decimal(&row.time_hours, "time_hours")?;
        let time_multiplier = decimal(&row.time_multiplier, "time_multiplier")?;
        let day_of_week = Weekday::from_str(&row.day_of_week)
            .map_err(|e| DbError::corrupt(ENTITY, &row.id, e))?;

        Ok(RideCalculation {
            id: row.id,
            pricing_config_id: row.pricing_config_id,
            pricing_config_name: row.pricing_config_name,
            distance_km,
            time_hours,
            waiting_minutes: row.waiting_minutes,
            day_of_week,
            distance_base_price: Money::from_cents(row.distance_base_price_cents),
            additional_distance_price: Money::from_cents(row.additional_distance_price_cents),
            time_multiplier_component: Money::from_cents(row.time_multiplier_component_cents),
            waiting_charges: Money::from_cents(row.waiting_charges_cents),
            total_price: Money::from_cents(row.total_price_cents),
            time_multiplier,
            calculated_at: row.calculated_at,
            calculated_by: row.calculated_by,
        })
    }
}

/// Repository for ride calculation records.
#[derive(Debug, Clone)]
pub struct CalculationRepository {
    pool: SqlitePool,
}

impl CalculationRepository {
    /// Creates a new CalculationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CalculationRepository { pool }
    }

    /// Appends a record. Records are never updated afterwards.
    pub async fn insert(&self, record: &RideCalculation) -> DbResult<()> {
        debug!(
            id = %record.id,
            config_id = %record.pricing_config_id,
            total = %record.total_price,
            "Inserting ride calculation"
        );

        sqlx::query(
            r#"
            INSERT INTO ride_calculations (
                id, pricing_config_id, pricing_config_name,
                distance_km, time_hours, waiting_minutes, day_of_week,
                distance_base_price_cents, additional_distance_price_cents,
                time_multiplier_component_cents, waiting_charges_cents, total_price_cents,
                time_multiplier, calculated_at, calculated_by
            ) VALUES (
                ?1, ?2, ?3,
                ?4, ?5, ?6, ?7,
                ?8, ?9,
                ?10, ?11, ?12,
                ?13, ?14, ?15
            )
            "#,
        )
        .bind(&record.id)
        .bind(&record.pricing_config_id)
        .bind(&record.pricing_config_name)
        .bind(record.distance_km.to_string())
        .bind(record.time_hours.to_string())
        .bind(record.waiting_minutes)
        .bind(record.day_of_week.as_str())
        .bind(record.distance_base_price.cents())
        .bind(record.additional_distance_price.cents())
        .bind(record.time_multiplier_component.cents())
        .bind(record.waiting_charges.cents())
        .bind(record.total_price.cents())
        .bind(record.time_multiplier.to_string())
        .bind(record.calculated_at)
        .bind(&record.calculated_by)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a record by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<RideCalculation>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let row = sqlx::query_as::<_, CalculationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(RideCalculation::try_from).transpose()
    }

    /// Most recent records first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<RideCalculation>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY calculated_at DESC, rowid DESC LIMIT ?1");
        let rows = sqlx::query_as::<_, CalculationRow>(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(RideCalculation::try_from).collect()
    }

    /// Counts stored records.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ride_calculations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn record(id: &str) -> RideCalculation {
        RideCalculation {
            id: id.to_string(),
            pricing_config_id: "cfg-1".to_string(),
            pricing_config_name: "Standard Weekday".to_string(),
            distance_km: "5.5".parse().unwrap(),
            time_hours: "1.5".parse().unwrap(),
            waiting_minutes: 10,
            day_of_week: Weekday::Monday,
            distance_base_price: Money::from_cents(8000),
            additional_distance_price: Money::from_cents(7500),
            time_multiplier_component: Money::from_cents(3875),
            waiting_charges: Money::from_cents(1500),
            total_price: Money::from_cents(20875),
            time_multiplier: "1.25".parse().unwrap(),
            calculated_at: Utc::now(),
            calculated_by: Some("cli".to_string()),
        }
    }

    #[tokio::test]
    async fn test_insert_get_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.calculations();

        repo.insert(&record("calc-1")).await.unwrap();
        repo.insert(&record("calc-2")).await.unwrap();

        let loaded = repo.get_by_id("calc-1").await.unwrap().unwrap();
        assert_eq!(loaded, record_with_time("calc-1", loaded.calculated_at));
        assert!(repo.get_by_id("nope").await.unwrap().is_none());

        let recent = repo.list_recent(1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, "calc-2");
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    fn record_with_time(id: &str, at: DateTime<Utc>) -> RideCalculation {
        RideCalculation {
            calculated_at: at,
            ..record(id)
        }
    }

    #[tokio::test]
    async fn test_calculations_are_append_only() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.calculations().insert(&record("calc-1")).await.unwrap();

        let update = sqlx::query("UPDATE ride_calculations SET total_price_cents = 0")
            .execute(db.pool())
            .await
            .map_err(DbError::from);
        assert!(matches!(update, Err(DbError::ConstraintViolation(_))));

        let delete = sqlx::query("DELETE FROM ride_calculations WHERE id = 'calc-1'")
            .execute(db.pool())
            .await
            .map_err(DbError::from);
        assert!(matches!(delete, Err(DbError::ConstraintViolation(_))));

        let kept = db.calculations().get_by_id("calc-1").await.unwrap().unwrap();
        assert_eq!(kept.total_price.cents(), 20875);
    }
}
