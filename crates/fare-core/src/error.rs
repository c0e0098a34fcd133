//! # Error Types
//!
//! Domain-specific error types for fare-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  fare-core errors (this file)                                          │
//! │  ├── CoreError        - Pricing taxonomy (input, selection, conflict)  │
//! │  └── ValidationError  - Field-level validation failures                │
//! │                                                                         │
//! │  fare-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures                    │
//! │                       (folds into CoreError::StorageUnavailable)       │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── CliError         - What the caller sees (code + message)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CliError → JSON envelope          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, configuration, day)
//! 3. Errors are enum variants, never String
//! 4. Nothing here is retried; the caller decides

use thiserror::Error;

use crate::types::Weekday;

// =============================================================================
// Core Error
// =============================================================================

/// Pricing errors.
///
/// Every failure of a calculation or a configuration mutation is one of these.
/// A calculation either returns a complete quote or exactly one of these.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Trip parameters are malformed or out of range.
    ///
    /// ## When This Occurs
    /// - `distance_km <= 0` or `time_hours <= 0`
    /// - `waiting_minutes < 0`
    /// - `day_of_week` is not one of the seven weekday tokens
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// A configuration draft failed its own field invariants.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(ValidationError),

    /// No active configuration can price a ride on this day.
    ///
    /// ## When This Occurs
    /// - No active configuration claims the day
    /// - The explicitly requested configuration does not apply to the day
    #[error("No applicable pricing configuration for {day}: {reason}")]
    NoApplicableConfiguration { day: Weekday, reason: String },

    /// An explicitly requested configuration is absent (or inactive, on the
    /// calculation path).
    #[error("Pricing configuration not found: {0}")]
    ConfigurationNotFound(String),

    /// Activating a configuration would make two active configurations claim
    /// the same weekday.
    ///
    /// ## User Workflow
    /// ```text
    /// Activate "Holiday Flat" (monday, tuesday)
    ///      │
    ///      ▼
    /// "Standard Weekday" is active on monday..friday
    ///      │
    ///      ▼
    /// ConfigurationConflict { conflicting_name: "Standard Weekday",
    ///                         days: [monday, tuesday] }
    /// ```
    #[error(
        "Conflicts with active configuration '{conflicting_name}' ({conflicting_id}) on {}",
        Weekday::join(.days)
    )]
    ConfigurationConflict {
        conflicting_id: String,
        conflicting_name: String,
        days: Vec<Weekday>,
    },

    /// The persistence collaborator failed.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl CoreError {
    /// Returns the field-level detail when this is a validation failure.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            CoreError::InvalidInput(e) | CoreError::InvalidConfiguration(e) => Some(e),
            _ => None,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Field-level validation errors.
///
/// Shared by trip input validation and configuration validation, so both
/// paths report the offending field the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly greater than zero.
    #[error("{field} must be greater than 0")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} cannot be negative")]
    MustBeNonNegative { field: String },

    /// Value is too large to be represented as an amount.
    #[error("{field} is too large")]
    TooLarge { field: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {}", .allowed.join(", "))]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., duplicate configuration name).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Tier thresholds must be strictly increasing.
    #[error("{field}: tier {index} max_hours must be greater than the previous tier")]
    NotIncreasing { field: String, index: usize },
}

impl ValidationError {
    /// Returns the name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::MustBeNonNegative { field }
            | ValidationError::TooLarge { field }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::Duplicate { field, .. }
            | ValidationError::NotIncreasing { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
