//! # Configuration Catalog
//!
//! An in-memory snapshot of pricing configurations and the selection policy
//! that picks one for a ride.
//!
//! ## Selection Policy
//! ```text
//! select(day, requested_id)
//!      │
//!      ├── requested_id given?
//!      │     ├── absent or inactive      → ConfigurationNotFound
//!      │     ├── does not claim the day  → NoApplicableConfiguration
//!      │     └── otherwise               → that configuration
//!      │
//!      └── no id
//!            ├── no active match         → NoApplicableConfiguration
//!            └── newest active match     (more than one match is reported
//!                                          through Selection::matched)
//! ```
//!
//! The catalog is read-only. Storage builds it; the calculator consumes it.

use crate::error::{CoreError, CoreResult};
use crate::types::{PricingConfiguration, Weekday};

/// Outcome of [`ConfigurationCatalog::select`].
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub configuration: &'a PricingConfiguration,
    /// Active configurations that claimed the day. Anything above 1 means the
    /// write-time invariant was broken somewhere.
    pub matched: usize,
}

impl Selection<'_> {
    /// Whether more than one active configuration claimed the day.
    pub fn is_ambiguous(&self) -> bool {
        self.matched > 1
    }
}

/// Snapshot of configurations, newest first.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationCatalog {
    configurations: Vec<PricingConfiguration>,
}

impl ConfigurationCatalog {
    /// Builds a catalog. Later duplicates of an id are dropped; the result is
    /// ordered by `created_at`, newest first (input order breaks ties).
    pub fn new(configurations: impl IntoIterator<Item = PricingConfiguration>) -> Self {
        let mut unique: Vec<PricingConfiguration> = Vec::new();
        for config in configurations {
            if !unique.iter().any(|existing| existing.id == config.id) {
                unique.push(config);
            }
        }
        unique.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        ConfigurationCatalog {
            configurations: unique,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PricingConfiguration> {
        self.configurations.iter()
    }

    /// Active configurations claiming `day`, newest first.
    pub fn active_for(&self, day: Weekday) -> Vec<&PricingConfiguration> {
        self.configurations
            .iter()
            .filter(|config| config.is_active && config.applies_to(day))
            .collect()
    }

    /// Looks up an active configuration by id.
    ///
    /// ## Errors
    /// `ConfigurationNotFound` when the id is absent or the configuration is
    /// inactive.
    pub fn by_id(&self, id: &str) -> CoreResult<&PricingConfiguration> {
        self.configurations
            .iter()
            .find(|config| config.id == id && config.is_active)
            .ok_or_else(|| CoreError::ConfigurationNotFound(id.to_string()))
    }

    /// Picks the configuration that prices a ride on `day`.
    pub fn select(&self, day: Weekday, requested_id: Option<&str>) -> CoreResult<Selection<'_>> {
        if let Some(id) = requested_id {
            let configuration = self.by_id(id)?;
            if !configuration.applies_to(day) {
                return Err(CoreError::NoApplicableConfiguration {
                    day,
                    reason: format!(
                        "configuration '{}' does not apply to {}",
                        configuration.name, day
                    ),
                });
            }
            return Ok(Selection {
                configuration,
                matched: 1,
            });
        }

        let candidates = self.active_for(day);
        match candidates.first() {
            Some(configuration) => Ok(Selection {
                configuration,
                matched: candidates.len(),
            }),
            None => Err(CoreError::NoApplicableConfiguration {
                day,
                reason: "no active configuration claims this day".to_string(),
            }),
        }
    }
}
