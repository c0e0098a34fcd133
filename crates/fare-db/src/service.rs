//! # Pricing Service
//!
//! Connects the pure pricing core to storage.
//!
//! ## Calculation Path (read-mostly, no gate)
//! ```text
//! RideRequest
//!    │ validate_ride_request           → InvalidInput
//!    ▼
//! load catalog: active for day (+ requested id)
//!    │ ConfigurationCatalog::select    → ConfigurationNotFound / NoApplicable
//!    ▼
//! calculator::quote                    (pure)
//!    │ recorder::record + INSERT       → StorageUnavailable
//!    ▼
//! PriceResult { quote, calculation_id }
//! ```
//!
//! ## Mutation Path (serialized)
//! ```text
//! validate draft                       → InvalidConfiguration
//!    │
//!    ▼
//! lock write gate ─► BEGIN IMMEDIATE
//!    │ read current state (inside the transaction)
//!    │ check_conflicts                 → ConfigurationConflict
//!    │ INSERT / UPDATE / DELETE
//!    │ append log entry
//!    ▼
//! COMMIT ─► release gate
//! ```
//! Any error drops the transaction, which rolls it back; the log entry and the
//! mutation are committed together or not at all. `BEGIN IMMEDIATE` takes the
//! SQLite write lock up front, so a second process waits on the busy timeout
//! and then sees the committed state in its conflict check.

use chrono::Utc;
use fare_core::calculator;
use fare_core::recorder;
use fare_core::validation::{check_conflicts, validate_configuration, validate_ride_request};
use fare_core::{
    ConfigurationCatalog, ConfigurationDraft, ConfigurationLog, ConfigurationSummary, CoreError,
    CoreResult, LogAction, PriceQuote, PriceResult, PricingConfiguration, RideCalculation,
    RideRequest, ValidationError, Weekday,
};
use sqlx::SqliteConnection;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::DbError;
use crate::pool::Database;
use crate::repository::{configuration, log};

/// Default number of calculations returned by listings.
pub const DEFAULT_CALCULATION_LIMIT: u32 = 50;

/// Pricing operations over a [`Database`].
///
/// Cheap to clone; clones share the pool and the write gate.
#[derive(Debug, Clone)]
pub struct PricingService {
    db: Database,
}

impl PricingService {
    pub fn new(db: Database) -> Self {
        PricingService { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    // =========================================================================
    // Calculation
    // =========================================================================

    /// Prices a ride and persists one [`RideCalculation`].
    ///
    /// Failed validation or selection never persists anything.
    pub async fn calculate(
        &self,
        request: &RideRequest,
        calculated_by: Option<&str>,
    ) -> CoreResult<PriceResult> {
        let quote = self.price(request).await?;

        let record = recorder::record(&quote, calculated_by);
        self.db.calculations().insert(&record).await?;

        info!(
            calculation_id = %record.id,
            config = %quote.pricing_config_name,
            total = %quote.total_price,
            "Ride priced"
        );

        Ok(PriceResult::recorded(quote, &record))
    }

    /// Prices a ride without persisting a record.
    pub async fn preview(&self, request: &RideRequest) -> CoreResult<PriceResult> {
        let quote = self.price(request).await?;
        Ok(PriceResult::preview(quote))
    }

    async fn price(&self, request: &RideRequest) -> CoreResult<PriceQuote> {
        let inputs = validate_ride_request(request)?;
        let requested_id = request.pricing_config_id.as_deref();

        let catalog = self.load_catalog(inputs.day_of_week, requested_id).await?;
        let selection = catalog.select(inputs.day_of_week, requested_id)?;

        if selection.is_ambiguous() {
            warn!(
                day = %inputs.day_of_week,
                matched = selection.matched,
                chosen = %selection.configuration.id,
                "Several active configurations claim this day; using the most recent"
            );
        }

        calculator::quote(selection.configuration, &inputs)
    }

    /// Snapshot of what can price a ride on `day`.
    async fn load_catalog(
        &self,
        day: Weekday,
        requested_id: Option<&str>,
    ) -> CoreResult<ConfigurationCatalog> {
        let repo = self.db.configurations();
        let mut configurations = repo.list_active_for_day(day).await?;

        if let Some(id) = requested_id {
            if let Some(requested) = repo.get_by_id(id).await? {
                configurations.push(requested);
            }
        }

        Ok(ConfigurationCatalog::new(configurations))
    }

    // =========================================================================
    // Configuration queries
    // =========================================================================

    /// Every configuration, newest first.
    pub async fn list_configurations(&self) -> CoreResult<Vec<PricingConfiguration>> {
        Ok(self.db.configurations().list_all().await?)
    }

    /// `{id, name, description}` of active configurations claiming `day`.
    pub async fn active_configurations_for(
        &self,
        day: Weekday,
    ) -> CoreResult<Vec<ConfigurationSummary>> {
        let configurations = self.db.configurations().list_active_for_day(day).await?;
        Ok(configurations.iter().map(PricingConfiguration::summary).collect())
    }

    /// A configuration by id, active or not.
    pub async fn get_configuration(&self, id: &str) -> CoreResult<PricingConfiguration> {
        self.db
            .configurations()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ConfigurationNotFound(id.to_string()))
    }

    /// Audit trail of a configuration, oldest first.
    pub async fn configuration_history(&self, id: &str) -> CoreResult<Vec<ConfigurationLog>> {
        Ok(self.db.configuration_logs().list_for_configuration(id).await?)
    }

    // =========================================================================
    // Calculation queries
    // =========================================================================

    pub async fn recent_calculations(&self, limit: u32) -> CoreResult<Vec<RideCalculation>> {
        Ok(self.db.calculations().list_recent(limit).await?)
    }

    pub async fn get_calculation(&self, id: &str) -> CoreResult<Option<RideCalculation>> {
        Ok(self.db.calculations().get_by_id(id).await?)
    }

    // =========================================================================
    // Configuration mutations
    // =========================================================================

    /// Creates a configuration from a draft.
    pub async fn create_configuration(
        &self,
        draft: ConfigurationDraft,
        actor: &str,
        notes: &str,
    ) -> CoreResult<PricingConfiguration> {
        validate_configuration(&draft).map_err(CoreError::InvalidConfiguration)?;
        let config =
            PricingConfiguration::from_draft(Uuid::new_v4().to_string(), draft, actor, Utc::now());

        let _gate = self.db.lock_writes().await;
        let mut tx = self.db.begin_write().await?;

        ensure_name_available(&mut tx, &config).await?;
        check_conflicts(&config, &configuration::fetch_all(&mut tx).await?)?;
        configuration::insert(&mut tx, &config).await?;
        log::append(
            &mut tx,
            &log_entry(&config.id, LogAction::Create, actor, None, Some(&config), notes)?,
        )
        .await?;

        commit(tx).await?;
        info!(id = %config.id, name = %config.name, actor, "Configuration created");
        Ok(config)
    }

    /// Replaces the editable fields of a configuration.
    pub async fn update_configuration(
        &self,
        id: &str,
        draft: ConfigurationDraft,
        actor: &str,
        notes: &str,
    ) -> CoreResult<PricingConfiguration> {
        validate_configuration(&draft).map_err(CoreError::InvalidConfiguration)?;

        let _gate = self.db.lock_writes().await;
        let mut tx = self.db.begin_write().await?;

        let previous = load_for_write(&mut tx, id).await?;
        let mut config = previous.clone();
        config.apply_draft(draft, actor, Utc::now());

        ensure_name_available(&mut tx, &config).await?;
        check_conflicts(&config, &configuration::fetch_all(&mut tx).await?)?;
        configuration::update(&mut tx, &config).await?;
        log::append(
            &mut tx,
            &log_entry(id, LogAction::Update, actor, Some(&previous), Some(&config), notes)?,
        )
        .await?;

        commit(tx).await?;
        info!(id, actor, "Configuration updated");
        Ok(config)
    }

    /// Makes a configuration eligible for selection.
    ///
    /// Rejected with `ConfigurationConflict` when another active configuration
    /// claims one of its days. Activating an active configuration changes
    /// nothing and writes no log entry.
    pub async fn activate_configuration(
        &self,
        id: &str,
        actor: &str,
        notes: &str,
    ) -> CoreResult<PricingConfiguration> {
        self.set_active(id, true, actor, notes).await
    }

    /// Removes a configuration from selection.
    pub async fn deactivate_configuration(
        &self,
        id: &str,
        actor: &str,
        notes: &str,
    ) -> CoreResult<PricingConfiguration> {
        self.set_active(id, false, actor, notes).await
    }

    async fn set_active(
        &self,
        id: &str,
        active: bool,
        actor: &str,
        notes: &str,
    ) -> CoreResult<PricingConfiguration> {
        let _gate = self.db.lock_writes().await;
        let mut tx = self.db.begin_write().await?;

        let previous = load_for_write(&mut tx, id).await?;
        if previous.is_active == active {
            return Ok(previous);
        }

        let mut config = previous.clone();
        config.is_active = active;
        config.updated_at = Utc::now();
        config.updated_by = Some(actor.to_string());

        if active {
            check_conflicts(&config, &configuration::fetch_all(&mut tx).await?)?;
        }
        configuration::update(&mut tx, &config).await?;

        let action = if active {
            LogAction::Activate
        } else {
            LogAction::Deactivate
        };
        log::append(
            &mut tx,
            &log_entry(id, action, actor, Some(&previous), Some(&config), notes)?,
        )
        .await?;

        commit(tx).await?;
        info!(id, actor, active, "Configuration activation changed");
        Ok(config)
    }

    /// Deletes a configuration. Its log history and past calculations remain.
    pub async fn delete_configuration(
        &self,
        id: &str,
        actor: &str,
        notes: &str,
    ) -> CoreResult<PricingConfiguration> {
        let _gate = self.db.lock_writes().await;
        let mut tx = self.db.begin_write().await?;

        let previous = load_for_write(&mut tx, id).await?;
        configuration::delete(&mut tx, id).await?;
        log::append(
            &mut tx,
            &log_entry(id, LogAction::Delete, actor, Some(&previous), None, notes)?,
        )
        .await?;

        commit(tx).await?;
        info!(id, actor, "Configuration deleted");
        Ok(previous)
    }
}

// =============================================================================
// Write-path helpers
// =============================================================================

async fn load_for_write(conn: &mut SqliteConnection, id: &str) -> CoreResult<PricingConfiguration> {
    configuration::fetch_by_id(conn, id)
        .await?
        .ok_or_else(|| CoreError::ConfigurationNotFound(id.to_string()))
}

async fn ensure_name_available(
    conn: &mut SqliteConnection,
    config: &PricingConfiguration,
) -> CoreResult<()> {
    match configuration::fetch_by_name(conn, &config.name).await? {
        Some(other) if other.id != config.id => {
            Err(CoreError::InvalidConfiguration(ValidationError::Duplicate {
                field: "name".to_string(),
                value: config.name.clone(),
            }))
        }
        _ => Ok(()),
    }
}

async fn commit(tx: sqlx::Transaction<'_, sqlx::Sqlite>) -> CoreResult<()> {
    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
    Ok(())
}

fn log_entry(
    config_id: &str,
    action: LogAction,
    actor: &str,
    previous: Option<&PricingConfiguration>,
    new: Option<&PricingConfiguration>,
    notes: &str,
) -> CoreResult<ConfigurationLog> {
    let snapshot = |config: Option<&PricingConfiguration>| {
        config
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| CoreError::StorageUnavailable(format!("snapshot failed: {e}")))
    };

    Ok(ConfigurationLog {
        id: Uuid::new_v4().to_string(),
        pricing_config_id: config_id.to_string(),
        action,
        actor: actor.to_string(),
        timestamp: Utc::now(),
        previous_state: snapshot(previous)?,
        new_state: snapshot(new)?,
        notes: notes.to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use chrono::Duration;
    use fare_core::{Money, TimeComponentMode, TimeTier};
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn draft(name: &str, days: &[Weekday], active: bool) -> ConfigurationDraft {
        ConfigurationDraft {
            name: name.to_string(),
            description: format!("{name} pricing"),
            is_active: active,
            applicable_days: days.to_vec(),
            base_distance_km: dec("3.0"),
            base_price: Money::from_cents(8000),
            additional_price_per_km: Money::from_cents(3000),
            time_multiplier_tiers: vec![
                TimeTier::new(dec("1"), dec("1.0")),
                TimeTier::new(dec("2"), dec("1.25")),
            ],
            time_component_mode: TimeComponentMode::DistanceSurcharge,
            waiting_free_minutes: 3,
            waiting_charge_per_interval: Money::from_cents(500),
            waiting_interval_minutes: 3,
        }
    }

    const WEEKDAYS: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    fn ride(day: &str, config_id: Option<&str>) -> RideRequest {
        RideRequest {
            distance_km: dec("5.5"),
            time_hours: dec("1.5"),
            waiting_minutes: 10,
            day_of_week: day.to_string(),
            pricing_config_id: config_id.map(str::to_string),
        }
    }

    async fn setup() -> PricingService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        PricingService::new(db)
    }

    async fn calculation_count(service: &PricingService) -> i64 {
        service.database().calculations().count().await.unwrap()
    }

    #[tokio::test]
    async fn test_calculate_persists_one_record_per_call() {
        let service = setup().await;
        let config = service
            .create_configuration(draft("Standard Weekday", &WEEKDAYS, true), "admin", "")
            .await
            .unwrap();

        let first = service.calculate(&ride("monday", None), Some("cli")).await.unwrap();
        let second = service.calculate(&ride("Monday", None), Some("cli")).await.unwrap();

        assert_eq!(first.quote.pricing_config_id, config.id);
        assert_eq!(first.quote.total_price.cents(), 20875);
        assert_eq!(first.quote.price_breakdown, second.quote.price_breakdown);
        assert_eq!(first.quote.total_price, second.quote.total_price);
        assert_ne!(first.calculation_id, second.calculation_id);
        assert_eq!(calculation_count(&service).await, 2);

        let stored = service
            .get_calculation(first.calculation_id.as_deref().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.breakdown(), first.quote.price_breakdown);
        assert_eq!(stored.calculated_by.as_deref(), Some("cli"));
        assert_eq!(service.recent_calculations(10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_preview_does_not_persist() {
        let service = setup().await;
        service
            .create_configuration(draft("Standard Weekday", &WEEKDAYS, true), "admin", "")
            .await
            .unwrap();

        let preview = service.preview(&ride("tuesday", None)).await.unwrap();
        assert!(preview.calculation_id.is_none());
        assert_eq!(preview.quote.total_price.cents(), 20875);
        assert_eq!(calculation_count(&service).await, 0);
    }

    #[tokio::test]
    async fn test_failed_calculations_persist_nothing() {
        let service = setup().await;
        let weekday = service
            .create_configuration(draft("Standard Weekday", &WEEKDAYS, true), "admin", "")
            .await
            .unwrap();
        let dormant = service
            .create_configuration(draft("Dormant", &[Weekday::Sunday], false), "admin", "")
            .await
            .unwrap();

        let mut bad = ride("monday", None);
        bad.distance_km = Decimal::ZERO;
        assert!(matches!(
            service.calculate(&bad, None).await,
            Err(CoreError::InvalidInput(_))
        ));

        assert!(matches!(
            service.calculate(&ride("sunday", None), None).await,
            Err(CoreError::NoApplicableConfiguration { .. })
        ));
        assert!(matches!(
            service.calculate(&ride("sunday", Some(&dormant.id)), None).await,
            Err(CoreError::ConfigurationNotFound(_))
        ));
        assert!(matches!(
            service.calculate(&ride("saturday", Some(&weekday.id)), None).await,
            Err(CoreError::NoApplicableConfiguration { .. })
        ));
        assert!(matches!(
            service.calculate(&ride("monday", Some("missing")), None).await,
            Err(CoreError::ConfigurationNotFound(_))
        ));

        assert_eq!(calculation_count(&service).await, 0);
    }

    #[tokio::test]
    async fn test_explicit_configuration_id() {
        let service = setup().await;
        let weekday = service
            .create_configuration(draft("Standard Weekday", &WEEKDAYS, true), "admin", "")
            .await
            .unwrap();

        let result = service
            .calculate(&ride("friday", Some(&weekday.id)), None)
            .await
            .unwrap();
        assert_eq!(result.quote.pricing_config_name, "Standard Weekday");
    }

    #[tokio::test]
    async fn test_create_rejects_overlapping_active_day() {
        let service = setup().await;
        service
            .create_configuration(draft("Standard Weekday", &WEEKDAYS, true), "admin", "")
            .await
            .unwrap();

        let err = service
            .create_configuration(draft("Holiday Flat", &[Weekday::Monday], true), "admin", "")
            .await
            .unwrap_err();
        match err {
            CoreError::ConfigurationConflict {
                conflicting_name,
                days,
                ..
            } => {
                assert_eq!(conflicting_name, "Standard Weekday");
                assert_eq!(days, vec![Weekday::Monday]);
            }
            other => panic!("expected conflict, got {other:?}"),
        }

        // Nothing was written for the rejected configuration
        assert_eq!(service.list_configurations().await.unwrap().len(), 1);
        assert_eq!(service.database().configuration_logs().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_activation_conflict_and_handover() {
        let service = setup().await;
        let standard = service
            .create_configuration(draft("Standard Weekday", &WEEKDAYS, true), "admin", "")
            .await
            .unwrap();
        let holiday = service
            .create_configuration(draft("Holiday Flat", &[Weekday::Monday], false), "admin", "")
            .await
            .unwrap();

        assert!(matches!(
            service.activate_configuration(&holiday.id, "admin", "").await,
            Err(CoreError::ConfigurationConflict { .. })
        ));

        service
            .deactivate_configuration(&standard.id, "admin", "holiday week")
            .await
            .unwrap();
        let activated = service
            .activate_configuration(&holiday.id, "admin", "")
            .await
            .unwrap();
        assert!(activated.is_active);
        assert_eq!(activated.updated_by.as_deref(), Some("admin"));

        let summaries = service.active_configurations_for(Weekday::Monday).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].name, "Holiday Flat");
        assert!(service
            .active_configurations_for(Weekday::Tuesday)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_activations_admit_only_one() {
        let service = setup().await;
        let a = service
            .create_configuration(draft("Monday A", &[Weekday::Monday], false), "admin", "")
            .await
            .unwrap();
        let b = service
            .create_configuration(draft("Monday B", &[Weekday::Monday, Weekday::Friday], false), "admin", "")
            .await
            .unwrap();

        let first = {
            let service = service.clone();
            tokio::spawn(async move { service.activate_configuration(&a.id, "alice", "").await })
        };
        let second = {
            let service = service.clone();
            tokio::spawn(async move { service.activate_configuration(&b.id, "bob", "").await })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let activated = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(CoreError::ConfigurationConflict { .. })))
            .count();
        assert_eq!((activated, conflicts), (1, 1));

        let monday = service.active_configurations_for(Weekday::Monday).await.unwrap();
        assert_eq!(monday.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_separate_handles_on_one_file_report_conflict() {
        let dir = std::env::temp_dir().join(format!("fare-handles-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("fare.db");

        // Two handles share the file but not the in-process write gate
        let first = PricingService::new(Database::new(DbConfig::new(&path)).await.unwrap());
        let second = PricingService::new(
            Database::new(DbConfig::new(&path).run_migrations(false))
                .await
                .unwrap(),
        );

        let a = first
            .create_configuration(draft("Monday A", &[Weekday::Monday], false), "admin", "")
            .await
            .unwrap();
        let b = second
            .create_configuration(draft("Monday B", &[Weekday::Monday], false), "admin", "")
            .await
            .unwrap();

        let (left, right) = tokio::join!(
            first.activate_configuration(&a.id, "alice", ""),
            second.activate_configuration(&b.id, "bob", ""),
        );

        let results = [left, right];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(CoreError::ConfigurationConflict { .. })))
                .count(),
            1
        );

        first.database().close().await;
        second.database().close().await;
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces_as_storage_unavailable() {
        let service = setup().await;
        service
            .create_configuration(draft("Standard Weekday", &WEEKDAYS, true), "admin", "")
            .await
            .unwrap();

        service.database().close().await;

        let err = service.calculate(&ride("monday", None), Some("cli")).await.unwrap_err();
        assert!(matches!(err, CoreError::StorageUnavailable(_)));

        let err = service.preview(&ride("monday", None)).await.unwrap_err();
        assert!(matches!(err, CoreError::StorageUnavailable(_)));
    }

    #[tokio::test]
    async fn test_invalid_and_duplicate_drafts() {
        let service = setup().await;

        let mut invalid = draft("No Days", &[], true);
        assert!(matches!(
            service.create_configuration(invalid.clone(), "admin", "").await,
            Err(CoreError::InvalidConfiguration(ValidationError::Required { .. }))
        ));
        invalid.applicable_days = vec![Weekday::Monday];
        invalid.waiting_interval_minutes = 0;
        assert!(matches!(
            service.create_configuration(invalid, "admin", "").await,
            Err(CoreError::InvalidConfiguration(ValidationError::MustBePositive { .. }))
        ));

        service
            .create_configuration(draft("Standard Weekday", &[Weekday::Monday], true), "admin", "")
            .await
            .unwrap();
        assert!(matches!(
            service
                .create_configuration(draft(" Standard Weekday ", &[Weekday::Sunday], true), "admin", "")
                .await,
            Err(CoreError::InvalidConfiguration(ValidationError::Duplicate { .. }))
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_identity_and_checks_conflicts() {
        let service = setup().await;
        let weekday = service
            .create_configuration(draft("Standard Weekday", &WEEKDAYS, true), "alice", "")
            .await
            .unwrap();
        let weekend = service
            .create_configuration(draft("Weekend Premium", &[Weekday::Saturday], true), "alice", "")
            .await
            .unwrap();

        let mut edit = draft("Weekend Premium", &[Weekday::Saturday, Weekday::Sunday], true);
        edit.base_price = Money::from_cents(9500);
        let updated = service
            .update_configuration(&weekend.id, edit, "bob", "add sunday")
            .await
            .unwrap();
        assert_eq!(updated.id, weekend.id);
        assert_eq!(updated.created_by.as_deref(), Some("alice"));
        assert_eq!(updated.updated_by.as_deref(), Some("bob"));
        assert_eq!(updated.base_price.cents(), 9500);

        let grab_friday = draft("Weekend Premium", &[Weekday::Friday, Weekday::Saturday], true);
        assert!(matches!(
            service.update_configuration(&weekend.id, grab_friday, "bob", "").await,
            Err(CoreError::ConfigurationConflict { conflicting_id, .. }) if conflicting_id == weekday.id
        ));

        let rename = draft("Standard Weekday", &[Weekday::Saturday], true);
        assert!(matches!(
            service.update_configuration(&weekend.id, rename, "bob", "").await,
            Err(CoreError::InvalidConfiguration(ValidationError::Duplicate { .. }))
        ));

        assert!(matches!(
            service
                .update_configuration("missing", draft("X", &[Weekday::Sunday], true), "bob", "")
                .await,
            Err(CoreError::ConfigurationNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_lifecycle_is_logged_and_survives_delete() {
        let service = setup().await;
        let config = service
            .create_configuration(draft("Standard Weekday", &WEEKDAYS, true), "alice", "initial")
            .await
            .unwrap();
        let result = service.calculate(&ride("monday", None), None).await.unwrap();

        service
            .update_configuration(&config.id, draft("Standard Weekday", &WEEKDAYS, true), "bob", "")
            .await
            .unwrap();
        service.deactivate_configuration(&config.id, "bob", "").await.unwrap();
        service.activate_configuration(&config.id, "bob", "").await.unwrap();
        // Already active: no change, no log entry
        service.activate_configuration(&config.id, "bob", "").await.unwrap();
        service.delete_configuration(&config.id, "carol", "retired").await.unwrap();

        let history = service.configuration_history(&config.id).await.unwrap();
        let actions: Vec<LogAction> = history.iter().map(|entry| entry.action).collect();
        assert_eq!(
            actions,
            vec![
                LogAction::Create,
                LogAction::Update,
                LogAction::Deactivate,
                LogAction::Activate,
                LogAction::Delete,
            ]
        );

        assert_eq!(history[0].notes, "initial");
        assert!(history[0].previous_state.is_none());
        assert_eq!(history[0].new_state.as_ref().unwrap()["name"], "Standard Weekday");
        assert_eq!(history[2].new_state.as_ref().unwrap()["is_active"], false);
        assert_eq!(history[4].actor, "carol");
        assert!(history[4].previous_state.is_some());
        assert!(history[4].new_state.is_none());

        assert!(matches!(
            service.get_configuration(&config.id).await,
            Err(CoreError::ConfigurationNotFound(_))
        ));
        assert!(matches!(
            service.delete_configuration(&config.id, "carol", "").await,
            Err(CoreError::ConfigurationNotFound(_))
        ));

        // Past calculations keep their breakdown and configuration name
        let stored = service
            .get_calculation(result.calculation_id.as_deref().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.pricing_config_name, "Standard Weekday");
        assert_eq!(stored.total_price, result.quote.total_price);
    }

    #[tokio::test]
    async fn test_selection_prefers_newest_when_invariant_is_broken() {
        let service = setup().await;
        let now = Utc::now();

        // Bypass the service to plant two active configurations on one day
        let older = PricingConfiguration::from_draft(
            "older",
            draft("Older", &[Weekday::Monday], true),
            "import",
            now - Duration::days(1),
        );
        let mut newer_draft = draft("Newer", &[Weekday::Monday], true);
        newer_draft.base_price = Money::from_cents(9000);
        let newer = PricingConfiguration::from_draft("newer", newer_draft, "import", now);

        let mut conn = service.database().pool().acquire().await.unwrap();
        configuration::insert(&mut conn, &older).await.unwrap();
        configuration::insert(&mut conn, &newer).await.unwrap();
        drop(conn);

        let result = service.preview(&ride("monday", None)).await.unwrap();
        assert_eq!(result.quote.pricing_config_id, "newer");

        let explicit = service.preview(&ride("monday", Some("older"))).await.unwrap();
        assert_eq!(explicit.quote.pricing_config_id, "older");
    }
}
