//! # Domain Types
//!
//! Configuration-side types used throughout the fare engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────────────┐        ┌─────────────────────────┐       │
//! │  │  PricingConfiguration    │        │  ConfigurationLog       │       │
//! │  │  ──────────────────────  │ 1    * │  ─────────────────────  │       │
//! │  │  id (UUID)               │◄───────│  pricing_config_id      │       │
//! │  │  name (unique)           │        │  action, actor          │       │
//! │  │  applicable_days         │        │  previous/new snapshot  │       │
//! │  │  distance / time /       │        └─────────────────────────┘       │
//! │  │  waiting terms           │                                           │
//! │  └──────────────────────────┘                                           │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │    Weekday      │   │    TimeTier     │   │ TimeComponentMode   │   │
//! │  │  monday..sunday │   │  max_hours      │   │  DistanceSurcharge  │   │
//! │  └─────────────────┘   │  multiplier     │   │  HourlyRate         │   │
//! │                        └─────────────────┘   └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::{DEFAULT_WAITING_FREE_MINUTES, DEFAULT_WAITING_INTERVAL_MINUTES};

// =============================================================================
// Weekday
// =============================================================================

/// Day of the week a configuration applies to.
///
/// Tokens are lowercase (`"monday"`); parsing is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All seven days, Monday first.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Returns the lowercase token.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }

    /// Parses a token, reporting failures against `field`.
    pub fn parse_field(token: &str, field: &str) -> Result<Self, ValidationError> {
        let token = token.trim().to_lowercase();
        Weekday::ALL
            .into_iter()
            .find(|day| day.as_str() == token)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: field.to_string(),
                allowed: Weekday::ALL.iter().map(|d| d.as_str().to_string()).collect(),
            })
    }

    /// Joins days as `monday, tuesday`.
    pub fn join(days: &[Weekday]) -> String {
        days.iter().map(Weekday::as_str).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Weekday::parse_field(s, "day_of_week")
    }
}

// =============================================================================
// Time Tiers
// =============================================================================

/// One duration bracket: rides up to `max_hours` use `multiplier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TimeTier {
    #[ts(type = "number")]
    pub max_hours: Decimal,
    #[ts(type = "number")]
    pub multiplier: Decimal,
}

impl TimeTier {
    pub fn new(max_hours: Decimal, multiplier: Decimal) -> Self {
        TimeTier {
            max_hours,
            multiplier,
        }
    }
}

/// How the resolved multiplier turns into the time component of a fare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TimeComponentMode {
    /// `(distance_base_price + additional_distance_price) × (multiplier − 1)`.
    ///
    /// The multiplier scales the distance fare; the component is the surcharge
    /// on top of it. A multiplier of 1.0 adds nothing.
    #[default]
    DistanceSurcharge,
    /// `time_hours × multiplier`, the multiplier being a per-hour rate.
    HourlyRate,
}

// =============================================================================
// Pricing Configuration
// =============================================================================

/// A named pricing rule set.
///
/// ## Invariant
/// At most one *active* configuration claims a given weekday. Enforced on the
/// write path (see [`crate::validation::check_conflicts`]), never at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingConfiguration {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Unique human-readable name.
    pub name: String,

    pub description: String,

    /// Whether this configuration is eligible for selection.
    pub is_active: bool,

    /// Days of the week this configuration claims.
    pub applicable_days: Vec<Weekday>,

    /// Distance covered by the flat base price.
    #[ts(type = "number")]
    pub base_distance_km: Decimal,

    /// Flat price, charged even when the base distance is not used up.
    pub base_price: Money,

    /// Price per km beyond `base_distance_km`.
    pub additional_price_per_km: Money,

    /// Strictly increasing brackets; the last one is open-ended.
    pub time_multiplier_tiers: Vec<TimeTier>,

    pub time_component_mode: TimeComponentMode,

    /// Waiting minutes that are never charged.
    pub waiting_free_minutes: i64,

    /// Charge for each started interval beyond the free minutes.
    pub waiting_charge_per_interval: Money,

    pub waiting_interval_minutes: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    pub created_by: Option<String>,

    pub updated_by: Option<String>,
}

impl PricingConfiguration {
    /// Builds a new configuration from an admin draft.
    pub fn from_draft(
        id: impl Into<String>,
        draft: ConfigurationDraft,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Self {
        PricingConfiguration {
            id: id.into(),
            name: draft.name.trim().to_string(),
            description: draft.description.trim().to_string(),
            is_active: draft.is_active,
            applicable_days: draft.applicable_days,
            base_distance_km: draft.base_distance_km,
            base_price: draft.base_price,
            additional_price_per_km: draft.additional_price_per_km,
            time_multiplier_tiers: draft.time_multiplier_tiers,
            time_component_mode: draft.time_component_mode,
            waiting_free_minutes: draft.waiting_free_minutes,
            waiting_charge_per_interval: draft.waiting_charge_per_interval,
            waiting_interval_minutes: draft.waiting_interval_minutes,
            created_at: now,
            updated_at: now,
            created_by: Some(actor.to_string()),
            updated_by: Some(actor.to_string()),
        }
    }

    /// Replaces every editable field with the draft's values.
    ///
    /// Identity and creation metadata are kept.
    pub fn apply_draft(&mut self, draft: ConfigurationDraft, actor: &str, now: DateTime<Utc>) {
        let created_at = self.created_at;
        let created_by = self.created_by.take();
        *self = PricingConfiguration::from_draft(std::mem::take(&mut self.id), draft, actor, now);
        self.created_at = created_at;
        self.created_by = created_by;
    }

    /// Checks whether this configuration claims `day`.
    #[inline]
    pub fn applies_to(&self, day: Weekday) -> bool {
        self.applicable_days.contains(&day)
    }

    /// Days claimed by both configurations, in weekday order.
    pub fn shared_days(&self, other: &PricingConfiguration) -> Vec<Weekday> {
        let mut days: Vec<Weekday> = self
            .applicable_days
            .iter()
            .copied()
            .filter(|day| other.applies_to(*day))
            .collect();
        days.sort();
        days.dedup();
        days
    }

    /// Short listing form.
    pub fn summary(&self) -> ConfigurationSummary {
        ConfigurationSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

/// Editable fields of a configuration, as authored by an admin.
///
/// ## Example (TOML)
/// ```toml
/// name = "Standard Weekday"
/// applicable_days = ["monday", "tuesday", "wednesday", "thursday", "friday"]
/// base_distance_km = 3.0
/// base_price = 80.0
/// additional_price_per_km = 30.0
/// waiting_charge_per_interval = 5.0
///
/// [[time_multiplier_tiers]]
/// max_hours = 1
/// multiplier = 1.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationDraft {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_active")]
    pub is_active: bool,

    pub applicable_days: Vec<Weekday>,

    pub base_distance_km: Decimal,

    pub base_price: Money,

    pub additional_price_per_km: Money,

    pub time_multiplier_tiers: Vec<TimeTier>,

    #[serde(default)]
    pub time_component_mode: TimeComponentMode,

    #[serde(default = "default_waiting_free_minutes")]
    pub waiting_free_minutes: i64,

    pub waiting_charge_per_interval: Money,

    #[serde(default = "default_waiting_interval_minutes")]
    pub waiting_interval_minutes: i64,
}

fn default_active() -> bool {
    true
}

fn default_waiting_free_minutes() -> i64 {
    DEFAULT_WAITING_FREE_MINUTES
}

fn default_waiting_interval_minutes() -> i64 {
    DEFAULT_WAITING_INTERVAL_MINUTES
}

impl From<&PricingConfiguration> for ConfigurationDraft {
    fn from(config: &PricingConfiguration) -> Self {
        ConfigurationDraft {
            name: config.name.clone(),
            description: config.description.clone(),
            is_active: config.is_active,
            applicable_days: config.applicable_days.clone(),
            base_distance_km: config.base_distance_km,
            base_price: config.base_price,
            additional_price_per_km: config.additional_price_per_km,
            time_multiplier_tiers: config.time_multiplier_tiers.clone(),
            time_component_mode: config.time_component_mode,
            waiting_free_minutes: config.waiting_free_minutes,
            waiting_charge_per_interval: config.waiting_charge_per_interval,
            waiting_interval_minutes: config.waiting_interval_minutes,
        }
    }
}

/// `{id, name, description}` listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConfigurationSummary {
    pub id: String,
    pub name: String,
    pub description: String,
}

// =============================================================================
// Configuration Log
// =============================================================================

/// Kind of mutation recorded in the configuration log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogAction {
    Create,
    Update,
    Activate,
    Deactivate,
    Delete,
}

/// Append-only audit entry for one configuration mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConfigurationLog {
    pub id: String,
    /// Kept after the configuration itself is deleted.
    pub pricing_config_id: String,
    pub action: LogAction,
    pub actor: String,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    /// Full configuration before the change (`None` on create).
    #[ts(type = "PricingConfiguration | null")]
    pub previous_state: Option<serde_json::Value>,
    /// Full configuration after the change (`None` on delete).
    #[ts(type = "PricingConfiguration | null")]
    pub new_state: Option<serde_json::Value>,
    pub notes: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
