//! # Validation Module
//!
//! Rules for trip inputs and for pricing configurations.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation (CLI / API)                                     │
//! │  └── Type validation (deserialization of numbers, day tokens)          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── validate_ride_request   → CoreError::InvalidInput                 │
//! │  ├── validate_configuration  → CoreError::InvalidConfiguration         │
//! │  └── check_conflicts         → CoreError::ConfigurationConflict        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE (name)                                                     │
//! │  └── CHECK constraints, append-only triggers                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The same functions run on the write path and in tests, so the rules
//! live in exactly one place.

use rust_decimal::Decimal;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::ride::{RideInputs, RideRequest};
use crate::types::{ConfigurationDraft, PricingConfiguration, TimeTier, Weekday};
use crate::MAX_NAME_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Ride Inputs
// =============================================================================

/// Validates raw trip parameters.
///
/// ## Rules
/// - `distance_km > 0`
/// - `time_hours > 0`
/// - `waiting_minutes >= 0`
/// - `day_of_week` is one of the seven lowercase weekday tokens (any case)
///
/// ## Example
/// ```rust
/// use fare_core::ride::RideRequest;
/// use fare_core::validation::validate_ride_request;
/// use rust_decimal::Decimal;
///
/// let request = RideRequest {
///     distance_km: Decimal::new(55, 1),
///     time_hours: Decimal::new(15, 1),
///     waiting_minutes: 10,
///     day_of_week: "Monday".to_string(),
///     pricing_config_id: None,
/// };
/// assert!(validate_ride_request(&request).is_ok());
/// ```
pub fn validate_ride_request(request: &RideRequest) -> ValidationResult<RideInputs> {
    positive(request.distance_km, "distance_km")?;
    positive(request.time_hours, "time_hours")?;

    if request.waiting_minutes < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "waiting_minutes".to_string(),
        });
    }

    let day_of_week = Weekday::parse_field(&request.day_of_week, "day_of_week")?;

    Ok(RideInputs {
        distance_km: request.distance_km,
        time_hours: request.time_hours,
        waiting_minutes: request.waiting_minutes,
        day_of_week,
    })
}

fn positive(value: Decimal, field: &str) -> ValidationResult<()> {
    if value <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn non_negative(value: Decimal, field: &str) -> ValidationResult<()> {
    if value < Decimal::ZERO {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Configuration Fields
// =============================================================================

/// Validates a configuration name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_NAME_LEN`] characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates the weekday set: non-empty, no repeats.
pub fn validate_applicable_days(days: &[Weekday]) -> ValidationResult<()> {
    if days.is_empty() {
        return Err(ValidationError::Required {
            field: "applicable_days".to_string(),
        });
    }

    for (i, day) in days.iter().enumerate() {
        if days[..i].contains(day) {
            return Err(ValidationError::Duplicate {
                field: "applicable_days".to_string(),
                value: day.to_string(),
            });
        }
    }

    Ok(())
}

/// Validates time tiers.
///
/// ## Rules
/// - At least one tier
/// - Every `max_hours` and `multiplier` strictly positive
/// - `max_hours` strictly increasing (no duplicates, no reordering)
///
/// ```text
/// [(1, 1.0), (2, 1.25), (3, 1.5)]   ✓
/// [(1, 1.0), (1, 1.25)]             ✗ tier 1 not increasing
/// [(2, 1.25), (1, 1.0)]             ✗ tier 1 not increasing
/// ```
pub fn validate_time_tiers(tiers: &[TimeTier]) -> ValidationResult<()> {
    const FIELD: &str = "time_multiplier_tiers";

    if tiers.is_empty() {
        return Err(ValidationError::Required {
            field: FIELD.to_string(),
        });
    }

    for (index, tier) in tiers.iter().enumerate() {
        positive(tier.max_hours, "time_multiplier_tiers.max_hours")?;
        positive(tier.multiplier, "time_multiplier_tiers.multiplier")?;

        if index > 0 && tier.max_hours <= tiers[index - 1].max_hours {
            return Err(ValidationError::NotIncreasing {
                field: FIELD.to_string(),
                index,
            });
        }
    }

    Ok(())
}

/// Validates every field invariant of a configuration draft.
///
/// Conflicts with other configurations are a separate check
/// ([`check_conflicts`]); they need the rest of the catalog.
pub fn validate_configuration(draft: &ConfigurationDraft) -> ValidationResult<()> {
    validate_name(&draft.name)?;
    validate_applicable_days(&draft.applicable_days)?;

    non_negative(draft.base_distance_km, "base_distance_km")?;
    if draft.base_price.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: "base_price".to_string(),
        });
    }
    if draft.additional_price_per_km.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: "additional_price_per_km".to_string(),
        });
    }

    validate_time_tiers(&draft.time_multiplier_tiers)?;

    if draft.waiting_free_minutes < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "waiting_free_minutes".to_string(),
        });
    }
    if draft.waiting_charge_per_interval.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: "waiting_charge_per_interval".to_string(),
        });
    }
    if draft.waiting_interval_minutes <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "waiting_interval_minutes".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Conflict Detection
// =============================================================================

/// Rejects a configuration that would share a weekday with another active one.
///
/// `candidate` is the configuration as it would look after the write.
/// Inactive candidates never conflict. The first colliding configuration is
/// reported together with every shared day.
///
/// ## Example
/// ```text
/// candidate: "Holiday Flat"      active  [monday, tuesday]
/// existing:  "Standard Weekday"  active  [monday..friday]
///            "Weekend Premium"   active  [saturday, sunday]
///
/// → ConfigurationConflict { "Standard Weekday", [monday, tuesday] }
/// ```
pub fn check_conflicts(
    candidate: &PricingConfiguration,
    existing: &[PricingConfiguration],
) -> CoreResult<()> {
    if !candidate.is_active {
        return Ok(());
    }

    for other in existing
        .iter()
        .filter(|other| other.is_active && other.id != candidate.id)
    {
        let days = candidate.shared_days(other);
        if !days.is_empty() {
            return Err(CoreError::ConfigurationConflict {
                conflicting_id: other.id.clone(),
                conflicting_name: other.name.clone(),
                days,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::TimeComponentMode;
    use chrono::Utc;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn request(distance: &str, hours: &str, waiting: i64, day: &str) -> RideRequest {
        RideRequest {
            distance_km: dec(distance),
            time_hours: dec(hours),
            waiting_minutes: waiting,
            day_of_week: day.to_string(),
            pricing_config_id: None,
        }
    }

    fn draft(name: &str, days: Vec<Weekday>) -> ConfigurationDraft {
        ConfigurationDraft {
            name: name.to_string(),
            description: String::new(),
            is_active: true,
            applicable_days: days,
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

    fn config(id: &str, name: &str, active: bool, days: Vec<Weekday>) -> PricingConfiguration {
        let mut draft = draft(name, days);
        draft.is_active = active;
        PricingConfiguration::from_draft(id, draft, "admin", Utc::now())
    }

    #[test]
    fn test_validate_ride_request() {
        let inputs = validate_ride_request(&request("5.5", "1.5", 10, "MONDAY")).unwrap();
        assert_eq!(inputs.day_of_week, Weekday::Monday);
        assert_eq!(inputs.waiting_minutes, 10);

        assert!(validate_ride_request(&request("5.5", "1.5", 0, "sunday")).is_ok());
    }

    #[test]
    fn test_validate_ride_request_rejects_each_field() {
        let cases = [
            (request("0", "1.5", 0, "monday"), "distance_km"),
            (request("-1", "1.5", 0, "monday"), "distance_km"),
            (request("5.5", "0", 0, "monday"), "time_hours"),
            (request("5.5", "-0.5", 0, "monday"), "time_hours"),
            (request("5.5", "1.5", -1, "monday"), "waiting_minutes"),
            (request("5.5", "1.5", 0, "someday"), "day_of_week"),
        ];

        for (req, field) in cases {
            let err = validate_ride_request(&req).unwrap_err();
            assert_eq!(err.field(), field, "for {req:?}");
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Standard Weekday").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"A".repeat(MAX_NAME_LEN)).is_ok());
        assert!(validate_name(&"A".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_applicable_days() {
        assert!(validate_applicable_days(&[Weekday::Monday]).is_ok());
        assert!(validate_applicable_days(&[]).is_err());
        assert!(matches!(
            validate_applicable_days(&[Weekday::Monday, Weekday::Monday]),
            Err(ValidationError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_validate_time_tiers() {
        let ok = [
            TimeTier::new(dec("1"), dec("1.0")),
            TimeTier::new(dec("2"), dec("1.25")),
            TimeTier::new(dec("3"), dec("1.5")),
        ];
        assert!(validate_time_tiers(&ok).is_ok());
        assert!(validate_time_tiers(&[]).is_err());

        let duplicate = [
            TimeTier::new(dec("1"), dec("1.0")),
            TimeTier::new(dec("1"), dec("1.25")),
        ];
        assert_eq!(
            validate_time_tiers(&duplicate),
            Err(ValidationError::NotIncreasing {
                field: "time_multiplier_tiers".to_string(),
                index: 1,
            })
        );

        let reversed = [
            TimeTier::new(dec("2"), dec("1.25")),
            TimeTier::new(dec("1"), dec("1.0")),
        ];
        assert!(validate_time_tiers(&reversed).is_err());

        let zero_multiplier = [TimeTier::new(dec("1"), dec("0"))];
        assert!(validate_time_tiers(&zero_multiplier).is_err());
    }

    #[test]
    fn test_validate_configuration() {
        let ok = draft("Standard Weekday", vec![Weekday::Monday]);
        assert!(validate_configuration(&ok).is_ok());

        let mut bad = ok.clone();
        bad.base_price = Money::from_cents(-1);
        assert_eq!(validate_configuration(&bad).unwrap_err().field(), "base_price");

        let mut bad = ok.clone();
        bad.base_distance_km = dec("-0.1");
        assert_eq!(validate_configuration(&bad).unwrap_err().field(), "base_distance_km");

        let mut bad = ok.clone();
        bad.waiting_interval_minutes = 0;
        assert_eq!(
            validate_configuration(&bad).unwrap_err().field(),
            "waiting_interval_minutes"
        );

        let mut bad = ok.clone();
        bad.waiting_free_minutes = -1;
        assert_eq!(
            validate_configuration(&bad).unwrap_err().field(),
            "waiting_free_minutes"
        );

        let mut free = ok;
        free.base_distance_km = Decimal::ZERO;
        free.waiting_charge_per_interval = Money::zero();
        assert!(validate_configuration(&free).is_ok());
    }

    #[test]
    fn test_check_conflicts_rejects_shared_active_day() {
        let existing = vec![
            config("a", "Standard Weekday", true, vec![Weekday::Monday, Weekday::Tuesday]),
            config("b", "Weekend Premium", true, vec![Weekday::Saturday]),
        ];
        let candidate = config("c", "Holiday Flat", true, vec![Weekday::Tuesday, Weekday::Monday]);

        match check_conflicts(&candidate, &existing) {
            Err(CoreError::ConfigurationConflict {
                conflicting_id,
                conflicting_name,
                days,
            }) => {
                assert_eq!(conflicting_id, "a");
                assert_eq!(conflicting_name, "Standard Weekday");
                assert_eq!(days, vec![Weekday::Monday, Weekday::Tuesday]);
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_check_conflicts_ignores_inactive_and_self() {
        let existing = vec![
            config("a", "Standard Weekday", true, vec![Weekday::Monday]),
            config("b", "Old Weekday", false, vec![Weekday::Friday]),
        ];

        // Inactive candidate never conflicts
        let dormant = config("c", "Dormant", false, vec![Weekday::Monday]);
        assert!(check_conflicts(&dormant, &existing).is_ok());

        // Inactive existing configurations are ignored
        let friday = config("d", "Friday Special", true, vec![Weekday::Friday]);
        assert!(check_conflicts(&friday, &existing).is_ok());

        // A configuration does not conflict with its own stored version
        let edited = config("a", "Standard Weekday", true, vec![Weekday::Monday]);
        assert!(check_conflicts(&edited, &existing).is_ok());
    }
}
