//! # fare
//!
//! Command line front end for the fare engine.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  argv ──► clap ──► commands::dispatch ──► PricingService ──► SQLite     │
//! │                          │                                              │
//! │                          ▼                                              │
//! │  stdout: { "success": true,  "data": ... }                              │
//! │          { "success": false, "error": { "code", "message" } }           │
//! │  stderr: tracing output (RUST_LOG)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ```sh
//! fare calculate --distance-km 5.5 --time-hours 1.5 --waiting-minutes 10 --day monday
//! fare configs create --file drafts/standard-weekday.toml --notes "launch pricing"
//! fare configs list --day saturday
//! fare calculations list --limit 10
//! ```

mod commands;
mod config;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use fare_core::CoreError;
use fare_db::{Database, DbConfig, PricingService};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::{Command, Context};
use crate::config::FareConfig;
use crate::error::CliError;

/// Ride fare pricing engine.
#[derive(Debug, Parser)]
#[command(name = "fare", version, about = "Ride fare pricing engine")]
struct Cli {
    /// SQLite database file (overrides FARE_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Output written to stdout for every command.
#[derive(Debug, Serialize)]
struct Envelope {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<CliError>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let (envelope, status) = match run(cli).await {
        Ok(data) => (
            Envelope {
                success: true,
                data: Some(data),
                error: None,
            },
            ExitCode::SUCCESS,
        ),
        Err(err) => {
            let status = ExitCode::from(err.code.exit_status());
            (
                Envelope {
                    success: false,
                    data: None,
                    error: Some(err),
                },
                status,
            )
        }
    };

    match serde_json::to_string_pretty(&envelope) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!("Failed to serialize output: {}", e);
            return ExitCode::FAILURE;
        }
    }
    status
}

async fn run(cli: Cli) -> Result<Value, CliError> {
    let mut config = FareConfig::load()?;
    if let Some(path) = cli.db {
        config.db_path = path;
    }
    debug!(
        db = %config.db_path.display(),
        actor = %config.actor,
        "Configuration loaded"
    );

    let db_config = DbConfig::new(&config.db_path).max_connections(config.db_max_connections);
    let db = Database::new(db_config).await.map_err(CoreError::from)?;

    let ctx = Context {
        service: PricingService::new(db.clone()),
        actor: config.actor,
        calculated_by: config.calculated_by,
    };

    let result = commands::dispatch(&ctx, cli.command).await;
    db.close().await;
    result
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so stdout stays machine-readable.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=fare_db=trace` - Show trace for the storage layer only
/// - Default: `info,fare=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fare=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
