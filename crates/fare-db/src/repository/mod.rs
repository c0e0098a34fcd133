//! # Repository Module
//!
//! Database repository implementations for the fare engine.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  PricingService                                                        │
//! │       │                                                                 │
//! │       │  db.configurations().list_active_for_day(Weekday::Monday)      │
//! │       ▼                                                                 │
//! │  ConfigurationRepository        ConfigurationLogRepository             │
//! │  ├── get_by_id                  ├── list_for_configuration             │
//! │  ├── list_all                   └── append (in transaction)            │
//! │  ├── list_active_for_day                                               │
//! │  └── insert/update/delete       CalculationRepository                  │
//! │      (in transaction)           ├── insert                             │
//! │                                 ├── get_by_id                          │
//! │                                 └── list_recent                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Queries are built at runtime (`sqlx::query_as::<_, Row>`) and decoded
//! through private row structs, so builds need no live database.

pub mod calculation;
pub mod configuration;
pub mod log;
