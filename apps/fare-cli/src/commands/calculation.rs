//! `fare calculations ...`: read persisted ride calculations.

use clap::Subcommand;
use fare_db::DEFAULT_CALCULATION_LIMIT;
use serde_json::Value;

use super::{to_data, Context};
use crate::error::CliError;

#[derive(Debug, Subcommand)]
pub enum CalculationsCommand {
    /// Most recent calculations first
    List {
        #[arg(long, default_value_t = DEFAULT_CALCULATION_LIMIT)]
        limit: u32,
    },

    /// Show one calculation
    Show { id: String },
}

pub async fn run(ctx: &Context, command: CalculationsCommand) -> Result<Value, CliError> {
    match command {
        CalculationsCommand::List { limit } => {
            to_data(&ctx.service.recent_calculations(limit).await?)
        }
        CalculationsCommand::Show { id } => match ctx.service.get_calculation(&id).await? {
            Some(calculation) => to_data(&calculation),
            None => Err(CliError::not_found("Calculation", &id)),
        },
    }
}
