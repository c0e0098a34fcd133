//! # fare-core: Pure Pricing Logic for the Fare Engine
//!
//! This crate is the **heart** of the fare engine. It contains all pricing
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Fare Engine Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    fare-cli (presentation)                      │   │
//! │  │    calculate ──► configs ──► calculations      JSON envelope   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    fare-db (PricingService)                     │   │
//! │  │    load catalog, write gate, transactions, audit records        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ fare-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌──────────┐   │   │
//! │  │   │  catalog  │  │   tier    │  │ calculator │  │ recorder │   │   │
//! │  │   │ selection │  │ resolver  │  │   quote    │  │  record  │   │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └──────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Configuration types (PricingConfiguration, Weekday, tiers, logs)
//! - [`ride`] - Trip inputs, quotes and calculation records
//! - [`money`] - Money type with integer cents and half-up rounding
//! - [`error`] - Pricing error taxonomy
//! - [`validation`] - Input and configuration rules, conflict detection
//! - [`tier`] - Time tier lookup
//! - [`catalog`] - Configuration snapshot and selection policy
//! - [`calculator`] - Fare computation
//! - [`recorder`] - Calculation record construction
//!
//! ## Example Usage
//!
//! ```rust
//! use fare_core::calculator::waiting_intervals;
//! use fare_core::tier::TierResolver;
//! use fare_core::TimeTier;
//! use rust_decimal::Decimal;
//!
//! let tiers = [
//!     TimeTier::new(Decimal::ONE, Decimal::ONE),
//!     TimeTier::new(Decimal::TWO, Decimal::new(125, 2)),
//! ];
//! assert_eq!(
//!     TierResolver::new(&tiers).multiplier(Decimal::new(15, 1)),
//!     Some(Decimal::new(125, 2))
//! );
//!
//! // 10 minutes, 3 free, 3 minute intervals → 3 started intervals
//! assert_eq!(waiting_intervals(10, 3, 3).unwrap().intervals, 3);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calculator;
pub mod catalog;
pub mod error;
pub mod money;
pub mod recorder;
pub mod ride;
pub mod tier;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{ConfigurationCatalog, Selection};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use ride::*;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a configuration name, in characters.
pub const MAX_NAME_LEN: usize = 100;

/// Waiting minutes that are free unless a configuration says otherwise.
pub const DEFAULT_WAITING_FREE_MINUTES: i64 = 3;

/// Waiting interval length unless a configuration says otherwise.
pub const DEFAULT_WAITING_INTERVAL_MINUTES: i64 = 3;
