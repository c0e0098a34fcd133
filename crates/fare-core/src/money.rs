//! # Money Module
//!
//! Provides the `Money` type for handling fare amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WHERE ROUNDING HAPPENS                                                 │
//! │                                                                         │
//! │  distance, hours, multipliers ──► Decimal (exact, unrounded)            │
//! │                                        │                                │
//! │                                        ▼                                │
//! │  Money::from_decimal() ── half-up to 2 places, ONCE per component       │
//! │                                        │                                │
//! │                                        ▼                                │
//! │  total = sum of rounded components (integer cents, no drift)            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use fare_core::money::Money;
//! use rust_decimal::Decimal;
//!
//! let base = Money::from_cents(8000); // 80.00
//! let extra = Money::from_decimal(Decimal::new(75005, 3)).unwrap(); // 75.005 → 75.01
//! assert_eq!((base + extra).cents(), 15501);
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use ts_rs::TS;

/// Places kept by every amount.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A fare amount in the smallest currency unit (e.g. paise, cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: a time multiplier below 1.0 yields a negative surcharge
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serde**: travels as a decimal number with two places (`203.75`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TS)]
#[ts(export)]
pub struct Money(#[ts(type = "number")] i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use fare_core::money::Money;
    ///
    /// let price = Money::from_cents(8000); // Represents 80.00
    /// assert_eq!(price.cents(), 8000);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Rounds a decimal amount (in major units) half-up to two places.
    ///
    /// Returns `None` when the amount does not fit in i64 cents.
    ///
    /// ## Example
    /// ```rust
    /// use fare_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// // 1.875 → 1.88 (half-up, not bankers)
    /// let m = Money::from_decimal(Decimal::new(1875, 3)).unwrap();
    /// assert_eq!(m.cents(), 188);
    /// ```
    pub fn from_decimal(amount: Decimal) -> Option<Self> {
        let cents = amount
            .checked_mul(Decimal::ONE_HUNDRED)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        cents.to_i64().map(Money)
    }

    /// Returns the exact decimal value in major units.
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `80.00` / `-5.50`; currency symbols belong to the caller.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Serialize::serialize(&self.to_decimal(), serializer)
    }
}

/// Incoming amounts must already be exact to the cent: `0.125` is rejected
/// rather than stored as `0.13`.
impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        if amount.normalize().scale() > MONEY_DECIMAL_PLACES {
            return Err(serde::de::Error::custom(format!(
                "amount {amount} has more than {MONEY_DECIMAL_PLACES} decimal places"
            )));
        }
        Money::from_decimal(amount).ok_or_else(|| serde::de::Error::custom("amount out of range"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(20375);
        assert_eq!(money.cents(), 20375);
        assert_eq!(money.major(), 203);
        assert_eq!(money.minor(), 75);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(20375).to_string(), "203.75");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(0).to_string(), "0.00");
    }

    #[test]
    fn test_from_decimal_rounds_half_up() {
        assert_eq!(Money::from_decimal(Decimal::new(1875, 3)).unwrap().cents(), 188);
        assert_eq!(Money::from_decimal(Decimal::new(1874, 3)).unwrap().cents(), 187);
        assert_eq!(Money::from_decimal(Decimal::new(125, 3)).unwrap().cents(), 13);
        assert_eq!(Money::from_decimal(Decimal::new(3875, 2)).unwrap().cents(), 3875);
    }

    #[test]
    fn test_from_decimal_out_of_range() {
        assert!(Money::from_decimal(Decimal::MAX).is_none());
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let parts = [
            Money::from_cents(8000),
            Money::from_cents(7500),
            Money::from_cents(3875),
            Money::from_cents(1500),
        ];
        let total: Money = parts.iter().copied().sum();
        assert_eq!(total.cents(), 20875);
        assert_eq!((total - parts[0]).cents(), 12875);
        assert!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)).is_none());
    }

    #[test]
    fn test_serde_as_decimal_number() {
        let json = serde_json::to_string(&Money::from_cents(20375)).unwrap();
        assert_eq!(json, "203.75");

        let back: Money = serde_json::from_str("80.0").unwrap();
        assert_eq!(back.cents(), 8000);
        let back: Money = serde_json::from_str("0.130").unwrap();
        assert_eq!(back.cents(), 13);
    }

    #[test]
    fn test_deserialize_rejects_sub_cent_amounts() {
        let err = serde_json::from_str::<Money>("0.125").unwrap_err();
        assert!(err.to_string().contains("more than 2 decimal places"));
        assert!(serde_json::from_str::<Money>("0.004").is_err());
    }
}
