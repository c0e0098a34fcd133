//! # Commands Module
//!
//! Every `fare` subcommand.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs            ◄─── You are here (dispatch)
//! ├── calculate.rs      ◄─── fare calculate
//! ├── configuration.rs  ◄─── fare configs ...
//! └── calculation.rs    ◄─── fare calculations ...
//! ```
//!
//! Each command returns its payload as a `serde_json::Value`; `main` wraps it
//! in the `{success, data}` envelope.

pub mod calculate;
pub mod calculation;
pub mod configuration;

use clap::Subcommand;
use fare_db::PricingService;
use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;

/// What every command needs.
pub struct Context {
    pub service: PricingService,

    /// Actor recorded in configuration logs
    pub actor: String,

    /// Recorded as `calculated_by` on persisted calculations
    pub calculated_by: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Price a ride with the configuration that applies to its day
    Calculate(calculate::CalculateArgs),

    /// Manage pricing configurations
    #[command(subcommand)]
    Configs(configuration::ConfigsCommand),

    /// Inspect persisted ride calculations
    #[command(subcommand)]
    Calculations(calculation::CalculationsCommand),
}

/// Runs one command.
pub async fn dispatch(ctx: &Context, command: Command) -> Result<Value, CliError> {
    match command {
        Command::Calculate(args) => calculate::run(ctx, args).await,
        Command::Configs(command) => configuration::run(ctx, command).await,
        Command::Calculations(command) => calculation::run(ctx, command).await,
    }
}

fn to_data<T: Serialize>(value: &T) -> Result<Value, CliError> {
    serde_json::to_value(value)
        .map_err(|e| CliError::new(crate::error::ErrorCode::StorageUnavailable, e.to_string()))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Context;
    use fare_db::{Database, DbConfig, PricingService};

    pub async fn context() -> Context {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Context {
            service: PricingService::new(db),
            actor: "tester".to_string(),
            calculated_by: "cli-test".to_string(),
        }
    }
}
