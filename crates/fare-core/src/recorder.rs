//! # Calculation Recorder
//!
//! Builds the immutable [`RideCalculation`] for a quote. Persisting it is the
//! storage layer's job; this module only assigns identity and timestamp.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::ride::{PriceQuote, PriceResult, RideCalculation};

/// Builds a calculation record with a fresh id, stamped now.
pub fn record(quote: &PriceQuote, calculated_by: Option<&str>) -> RideCalculation {
    record_at(quote, Uuid::new_v4().to_string(), Utc::now(), calculated_by)
}

/// Builds a calculation record with an explicit id and timestamp.
pub fn record_at(
    quote: &PriceQuote,
    id: String,
    calculated_at: DateTime<Utc>,
    calculated_by: Option<&str>,
) -> RideCalculation {
    let inputs = &quote.input_parameters;
    let breakdown = &quote.price_breakdown;

    RideCalculation {
        id,
        pricing_config_id: quote.pricing_config_id.clone(),
        pricing_config_name: quote.pricing_config_name.clone(),
        distance_km: inputs.distance_km,
        time_hours: inputs.time_hours,
        waiting_minutes: inputs.waiting_minutes,
        day_of_week: inputs.day_of_week,
        distance_base_price: breakdown.distance_base_price,
        additional_distance_price: breakdown.additional_distance_price,
        time_multiplier_component: breakdown.time_multiplier_component,
        waiting_charges: breakdown.waiting_charges,
        total_price: quote.total_price,
        time_multiplier: quote.calculation_details.time_multiplier,
        calculated_at,
        calculated_by: calculated_by.map(str::to_string),
    }
}

impl PriceResult {
    /// A result whose record was persisted as `record`.
    pub fn recorded(quote: PriceQuote, record: &RideCalculation) -> Self {
        PriceResult {
            quote,
            calculation_id: Some(record.id.clone()),
        }
    }

    /// A result that was never persisted.
    pub fn preview(quote: PriceQuote) -> Self {
        PriceResult {
            quote,
            calculation_id: None,
        }
    }
}
