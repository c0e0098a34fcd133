//! `fare calculate`: price one ride.

use clap::Args;
use fare_core::RideRequest;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use super::{to_data, Context};
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct CalculateArgs {
    /// Trip distance in kilometres
    #[arg(long, allow_negative_numbers = true)]
    pub distance_km: Decimal,

    /// Trip duration in hours
    #[arg(long, allow_negative_numbers = true)]
    pub time_hours: Decimal,

    /// Minutes spent waiting
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub waiting_minutes: i64,

    /// Day of the ride (monday..sunday, case-insensitive)
    #[arg(long)]
    pub day: String,

    /// Price with this configuration instead of the day's active one
    #[arg(long)]
    pub config_id: Option<String>,

    /// Compute the price without recording it
    #[arg(long)]
    pub preview: bool,
}

impl From<&CalculateArgs> for RideRequest {
    fn from(args: &CalculateArgs) -> Self {
        RideRequest {
            distance_km: args.distance_km,
            time_hours: args.time_hours,
            waiting_minutes: args.waiting_minutes,
            day_of_week: args.day.clone(),
            pricing_config_id: args.config_id.clone(),
        }
    }
}

pub async fn run(ctx: &Context, args: CalculateArgs) -> Result<Value, CliError> {
    let request = RideRequest::from(&args);
    debug!(?request, preview = args.preview, "Calculating fare");

    let result = if args.preview {
        ctx.service.preview(&request).await?
    } else {
        ctx.service
            .calculate(&request, Some(&ctx.calculated_by))
            .await?
    };

    to_data(&result)
}
