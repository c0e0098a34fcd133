//! # Tier Resolver
//!
//! Flat bracket lookup: the whole duration is billed at one multiplier.
//!
//! ```text
//! tiers:  (1, 1.0)      (2, 1.25)       (3, 1.5)
//!        ├──────────┼─────────────┼─────────────┼──────────────►  hours
//!        0          1             2             3
//!          1.0        1.25           1.5          1.5 (open-ended)
//!
//! 1.0       → 1.0   (threshold is inclusive)
//! 1.0000001 → 1.25
//! 10        → 1.5   (beyond the last threshold, no error)
//! ```

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::TimeTier;

/// The tier a duration falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedTier {
    /// Position in the tier list.
    pub index: usize,
    pub multiplier: Decimal,
    /// `true` when the duration exceeded every threshold.
    pub beyond_last: bool,
}

/// Looks up multipliers in an ordered tier list.
///
/// Assumes tiers passed [`crate::validation::validate_time_tiers`].
#[derive(Debug, Clone, Copy)]
pub struct TierResolver<'a> {
    tiers: &'a [TimeTier],
}

impl<'a> TierResolver<'a> {
    pub fn new(tiers: &'a [TimeTier]) -> Self {
        TierResolver { tiers }
    }

    /// Resolves the tier for `hours`.
    ///
    /// Returns `None` only for an empty tier list.
    pub fn resolve(&self, hours: Decimal) -> Option<ResolvedTier> {
        if let Some(index) = self.tiers.iter().position(|tier| tier.max_hours >= hours) {
            return Some(ResolvedTier {
                index,
                multiplier: self.tiers[index].multiplier,
                beyond_last: false,
            });
        }

        self.tiers.last().map(|last| ResolvedTier {
            index: self.tiers.len() - 1,
            multiplier: last.multiplier,
            beyond_last: true,
        })
    }

    /// Shorthand for the resolved multiplier.
    pub fn multiplier(&self, hours: Decimal) -> Option<Decimal> {
        self.resolve(hours).map(|resolved| resolved.multiplier)
    }
}
