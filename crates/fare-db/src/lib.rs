//! # fare-db: Database Layer for the Fare Engine
//!
//! Persistence for pricing configurations, their audit trail and ride
//! calculation records, plus the [`PricingService`] that ties them to the
//! pure pricing core. SQLite through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Fare Engine Data Flow                          │
//! │                                                                         │
//! │  fare-cli (fare calculate --distance-km 5.5 ...)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     fare-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌──────────────┐    │   │
//! │  │   │PricingService │──►│  Repositories  │   │  Migrations  │    │   │
//! │  │   │ (service.rs)  │   │ configuration  │   │  (embedded)  │    │   │
//! │  │   │               │   │ log            │   │ 001_pricing_ │    │   │
//! │  │   │ write gate +  │   │ calculation    │   │   schema.sql │    │   │
//! │  │   │ transactions  │   └───────┬────────┘   └──────────────┘    │   │
//! │  │   └───────┬───────┘           │                                 │   │
//! │  │           │ fare-core         │                                 │   │
//! │  │           ▼ (validate, select, quote)                           │   │
//! │  └───────────────────────────────┼─────────────────────────────────┘   │
//! │                                  ▼                                     │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (./fare.db)                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool and the configuration write gate
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Configuration, log and calculation repositories
//! - [`service`] - Pricing operations over the database
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fare_db::{Database, DbConfig, PricingService};
//!
//! let db = Database::new(DbConfig::new("./fare.db")).await?;
//! let service = PricingService::new(db);
//!
//! let result = service.calculate(&request, Some("cli")).await?;
//! println!("{}", result.quote.total_price);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use service::{PricingService, DEFAULT_CALCULATION_LIMIT};

// Repository re-exports for convenience
pub use repository::calculation::CalculationRepository;
pub use repository::configuration::ConfigurationRepository;
pub use repository::log::ConfigurationLogRepository;
