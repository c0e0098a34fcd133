//! # Ride Types
//!
//! Trip inputs, price quotes and the persisted calculation record.
//!
//! ## Flow
//! ```text
//! RideRequest (raw, from caller)
//!      │ validation::validate_ride_request
//!      ▼
//! RideInputs (validated, day parsed)
//!      │ calculator::quote
//!      ▼
//! PriceQuote ──► recorder::record ──► RideCalculation (persisted)
//!      │                                     │
//!      └────────────── PriceResult ◄─────────┘ (quote + calculation_id)
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{TimeComponentMode, Weekday};

// =============================================================================
// Inputs
// =============================================================================

/// Raw trip parameters as supplied by a caller.
///
/// Nothing here is trusted; see [`crate::validation::validate_ride_request`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RideRequest {
    #[ts(type = "number")]
    pub distance_km: Decimal,
    #[ts(type = "number")]
    pub time_hours: Decimal,
    #[serde(default)]
    pub waiting_minutes: i64,
    pub day_of_week: String,
    /// Explicit configuration to price with, bypassing day-based selection.
    #[serde(default)]
    pub pricing_config_id: Option<String>,
}

/// Validated trip parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RideInputs {
    #[ts(type = "number")]
    pub distance_km: Decimal,
    #[ts(type = "number")]
    pub time_hours: Decimal,
    pub waiting_minutes: i64,
    pub day_of_week: Weekday,
}

// =============================================================================
// Outputs
// =============================================================================

/// The four independently rounded fare components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceBreakdown {
    pub distance_base_price: Money,
    pub additional_distance_price: Money,
    pub time_multiplier_component: Money,
    pub waiting_charges: Money,
}

impl PriceBreakdown {
    /// Sum of the components. Integer cents, so this is exact.
    pub fn total(&self) -> Option<Money> {
        self.distance_base_price
            .checked_add(self.additional_distance_price)?
            .checked_add(self.time_multiplier_component)?
            .checked_add(self.waiting_charges)
    }
}

/// Intermediate quantities behind a breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CalculationDetails {
    #[ts(type = "number")]
    pub base_distance_km: Decimal,
    #[ts(type = "number")]
    pub additional_distance_km: Decimal,
    #[ts(type = "number")]
    pub time_multiplier: Decimal,
    pub waiting_chargeable_minutes: i64,
    pub waiting_intervals: i64,
    pub time_component_mode: TimeComponentMode,
}

/// A priced ride, before (or without) persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceQuote {
    pub pricing_config_id: String,
    pub pricing_config_name: String,
    pub input_parameters: RideInputs,
    pub price_breakdown: PriceBreakdown,
    pub total_price: Money,
    pub calculation_details: CalculationDetails,
}

/// A quote plus the id of its persisted record.
///
/// `calculation_id` is `None` for previews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceResult {
    #[serde(flatten)]
    pub quote: PriceQuote,
    pub calculation_id: Option<String>,
}

// =============================================================================
// Ride Calculation (audit record)
// =============================================================================

/// Immutable record of one persisted price computation.
///
/// Stores the full breakdown, not just the configuration reference, so the
/// record stays accurate after the configuration changes or is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RideCalculation {
    pub id: String,
    pub pricing_config_id: String,
    pub pricing_config_name: String,

    #[ts(type = "number")]
    pub distance_km: Decimal,
    #[ts(type = "number")]
    pub time_hours: Decimal,
    pub waiting_minutes: i64,
    pub day_of_week: Weekday,

    pub distance_base_price: Money,
    pub additional_distance_price: Money,
    pub time_multiplier_component: Money,
    pub waiting_charges: Money,
    pub total_price: Money,

    #[ts(type = "number")]
    pub time_multiplier: Decimal,

    #[ts(as = "String")]
    pub calculated_at: DateTime<Utc>,
    pub calculated_by: Option<String>,
}

impl RideCalculation {
    /// Breakdown as stored on the record.
    pub fn breakdown(&self) -> PriceBreakdown {
        PriceBreakdown {
            distance_base_price: self.distance_base_price,
            additional_distance_price: self.additional_distance_price,
            time_multiplier_component: self.time_multiplier_component,
            waiting_charges: self.waiting_charges,
        }
    }
}
