//! # Price Calculator
//!
//! Turns validated trip inputs and one configuration into an itemized quote.
//!
//! ## Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Price = DBP + (Dn × DAP) + TimeComponent + WC                          │
//! │                                                                         │
//! │  DBP  distance_base_price        = base_price (flat)                   │
//! │  Dn   additional_distance_km     = max(0, distance − base_distance)    │
//! │  DAP  additional_price_per_km                                          │
//! │  TMF  time multiplier            = TierResolver(tiers, time_hours)     │
//! │                                                                         │
//! │  TimeComponent                                                          │
//! │    distance_surcharge : (DBP + Dn × DAP) × (TMF − 1)                   │
//! │    hourly_rate        : time_hours × TMF                               │
//! │                                                                         │
//! │  WC   ceil(max(0, waiting − free) / interval) × charge_per_interval    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding
//! Every component is computed exactly in `Decimal` and rounded half-up to
//! cents once. The total is the integer sum of the rounded components, so
//! `total_price == sum(components)` always holds.
//!
//! ## Worked Example
//! ```text
//! config: base 3.0 km @ 80.00, 30.00/km, tiers [(1, 1.0), (2, 1.25)],
//!         3 free minutes, 5.00 per 3 minutes
//! ride:   5.5 km, 1.5 h, 10 min waiting
//!
//! DBP  = 80.00
//! DAP  = 2.5 × 30.00           = 75.00
//! TMF  = 1.25 (1.5 h falls in the 2 h tier)
//! time = (80 + 75) × 0.25      = 38.75
//! WC   = ceil(7 / 3) × 5.00    = 15.00
//! ─────────────────────────────────────
//! total                        = 208.75
//! ```

use rust_decimal::Decimal;

use crate::catalog::ConfigurationCatalog;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::ride::{CalculationDetails, PriceBreakdown, PriceQuote, RideInputs, RideRequest};
use crate::tier::TierResolver;
use crate::types::{PricingConfiguration, TimeComponentMode};
use crate::validation::validate_ride_request;

/// Validates the request, selects a configuration and prices the ride.
///
/// Input errors are reported before configuration errors.
pub fn calculate(catalog: &ConfigurationCatalog, request: &RideRequest) -> CoreResult<PriceQuote> {
    let inputs = validate_ride_request(request)?;
    let selection = catalog.select(inputs.day_of_week, request.pricing_config_id.as_deref())?;
    quote(selection.configuration, &inputs)
}

/// Prices validated inputs against one configuration.
///
/// Pure: the same configuration and inputs always give the same quote.
pub fn quote(config: &PricingConfiguration, inputs: &RideInputs) -> CoreResult<PriceQuote> {
    // Distance
    let additional_distance_km = inputs
        .distance_km
        .checked_sub(config.base_distance_km)
        .ok_or_else(|| too_large("distance_km"))?
        .max(Decimal::ZERO);
    let distance_base_exact = config.base_price.to_decimal();
    let additional_exact = additional_distance_km
        .checked_mul(config.additional_price_per_km.to_decimal())
        .ok_or_else(|| too_large("distance_km"))?;

    // Time
    let time_multiplier = TierResolver::new(&config.time_multiplier_tiers)
        .multiplier(inputs.time_hours)
        .ok_or_else(|| {
            CoreError::InvalidConfiguration(ValidationError::Required {
                field: "time_multiplier_tiers".to_string(),
            })
        })?;
    let time_exact = match config.time_component_mode {
        TimeComponentMode::DistanceSurcharge => distance_base_exact
            .checked_add(additional_exact)
            .and_then(|subtotal| subtotal.checked_mul(time_multiplier - Decimal::ONE)),
        TimeComponentMode::HourlyRate => inputs.time_hours.checked_mul(time_multiplier),
    }
    .ok_or_else(|| too_large("time_hours"))?;

    // Waiting
    let waiting = waiting_intervals(
        inputs.waiting_minutes,
        config.waiting_free_minutes,
        config.waiting_interval_minutes,
    )?;
    let waiting_charges = waiting
        .intervals
        .checked_mul(config.waiting_charge_per_interval.cents())
        .map(Money::from_cents)
        .ok_or_else(|| too_large("waiting_minutes"))?;

    let price_breakdown = PriceBreakdown {
        distance_base_price: config.base_price,
        additional_distance_price: to_money(additional_exact, "distance_km")?,
        time_multiplier_component: to_money(time_exact, "time_hours")?,
        waiting_charges,
    };
    let total_price = price_breakdown
        .total()
        .ok_or_else(|| too_large("total_price"))?;

    Ok(PriceQuote {
        pricing_config_id: config.id.clone(),
        pricing_config_name: config.name.clone(),
        input_parameters: *inputs,
        price_breakdown,
        total_price,
        calculation_details: CalculationDetails {
            base_distance_km: config.base_distance_km,
            additional_distance_km,
            time_multiplier,
            waiting_chargeable_minutes: waiting.chargeable_minutes,
            waiting_intervals: waiting.intervals,
            time_component_mode: config.time_component_mode,
        },
    })
}

// =============================================================================
// Waiting Quantization
// =============================================================================

/// Chargeable waiting time, split into started intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitingIntervals {
    pub chargeable_minutes: i64,
    pub intervals: i64,
}

/// `chargeable = max(0, waiting − free)`, `intervals = ceil(chargeable / interval)`.
///
/// ## Example
/// ```rust
/// use fare_core::calculator::waiting_intervals;
///
/// let w = waiting_intervals(10, 3, 3).unwrap();
/// assert_eq!((w.chargeable_minutes, w.intervals), (7, 3));
/// ```
pub fn waiting_intervals(
    waiting_minutes: i64,
    free_minutes: i64,
    interval_minutes: i64,
) -> CoreResult<WaitingIntervals> {
    if interval_minutes <= 0 {
        return Err(CoreError::InvalidConfiguration(
            ValidationError::MustBePositive {
                field: "waiting_interval_minutes".to_string(),
            },
        ));
    }

    let chargeable_minutes = waiting_minutes.saturating_sub(free_minutes).max(0);
    let intervals = chargeable_minutes / interval_minutes
        + i64::from(chargeable_minutes % interval_minutes != 0);

    Ok(WaitingIntervals {
        chargeable_minutes,
        intervals,
    })
}

fn to_money(amount: Decimal, field: &str) -> CoreResult<Money> {
    Money::from_decimal(amount).ok_or_else(|| too_large(field))
}

fn too_large(field: &str) -> CoreError {
    CoreError::InvalidInput(ValidationError::TooLarge {
        field: field.to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
