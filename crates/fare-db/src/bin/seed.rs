//! # Seed Data Generator
//!
//! Populates the database with the sample pricing configurations for
//! development.
//!
//! ## Usage
//! ```bash
//! # Seed ./fare.db (default)
//! cargo run -p fare-db --bin seed
//!
//! # Specify database path
//! cargo run -p fare-db --bin seed -- --db ./data/fare.db
//! ```
//!
//! ## Generated Configurations
//! ```text
//! Standard Weekday   mon..fri   3.0 km for 80.00, 30.00/km after
//!                               tiers ≤1h ×1.0, ≤2h ×1.25, ≤3h ×1.5
//!                               3 free minutes, 5.00 per 3 minutes
//!
//! Weekend Premium    sat, sun   3.5 km for 95.00, 35.00/km after
//!                               tiers ≤1h ×1.2, ≤2h ×1.5, ≤3h ×2.0
//!                               3 free minutes, 7.00 per 3 minutes
//!
//! Night Time Special mon..sun  2.5 km for 100.00, 40.00/km after (inactive)
//!                               tiers ≤1h ×1.5, ≤2h ×2.0
//!                               2 free minutes, 8.00 per 2 minutes
//! ```

use fare_core::{ConfigurationDraft, Money, TimeComponentMode, TimeTier, Weekday};
use fare_db::{Database, DbConfig, PricingService};
use rust_decimal::Decimal;
use std::env;

const ACTOR: &str = "seed";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./fare.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Fare Engine Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./fare.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Fare Engine Seed Data Generator");
    println!("==================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.configurations().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} configurations", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let service = PricingService::new(db);

    for draft in samples()? {
        let config = service
            .create_configuration(draft, ACTOR, "seeded")
            .await?;
        println!("✓ Created {} ({})", config.name, config.id);
    }

    println!();
    println!("✅ Seed complete");

    Ok(())
}

/// Sample configurations. The night draft is inactive, so it may share every
/// weekday with the active ones.
fn samples() -> Result<Vec<ConfigurationDraft>, rust_decimal::Error> {
    Ok(vec![standard_weekday()?, weekend_premium()?, night_time_special()?])
}

fn standard_weekday() -> Result<ConfigurationDraft, rust_decimal::Error> {
    Ok(ConfigurationDraft {
        name: "Standard Weekday".to_string(),
        description: "Default pricing for Monday through Friday".to_string(),
        is_active: true,
        applicable_days: vec![
            Weekday::Monday,
            Weekday::Tuesday,
            Weekday::Wednesday,
            Weekday::Thursday,
            Weekday::Friday,
        ],
        base_distance_km: "3.0".parse()?,
        base_price: Money::from_cents(8000),
        additional_price_per_km: Money::from_cents(3000),
        time_multiplier_tiers: tiers(&[("1", "1.0"), ("2", "1.25"), ("3", "1.5")])?,
        time_component_mode: TimeComponentMode::DistanceSurcharge,
        waiting_free_minutes: 3,
        waiting_charge_per_interval: Money::from_cents(500),
        waiting_interval_minutes: 3,
    })
}

fn weekend_premium() -> Result<ConfigurationDraft, rust_decimal::Error> {
    Ok(ConfigurationDraft {
        name: "Weekend Premium".to_string(),
        description: "Higher rates for Saturday and Sunday".to_string(),
        is_active: true,
        applicable_days: vec![Weekday::Saturday, Weekday::Sunday],
        base_distance_km: "3.5".parse()?,
        base_price: Money::from_cents(9500),
        additional_price_per_km: Money::from_cents(3500),
        time_multiplier_tiers: tiers(&[("1", "1.2"), ("2", "1.5"), ("3", "2.0")])?,
        time_component_mode: TimeComponentMode::DistanceSurcharge,
        waiting_free_minutes: 3,
        waiting_charge_per_interval: Money::from_cents(700),
        waiting_interval_minutes: 3,
    })
}

fn night_time_special() -> Result<ConfigurationDraft, rust_decimal::Error> {
    Ok(ConfigurationDraft {
        name: "Night Time Special".to_string(),
        description: "Late night rides, currently switched off".to_string(),
        is_active: false,
        applicable_days: vec![
            Weekday::Monday,
            Weekday::Tuesday,
            Weekday::Wednesday,
            Weekday::Thursday,
            Weekday::Friday,
            Weekday::Saturday,
            Weekday::Sunday,
        ],
        base_distance_km: "2.5".parse()?,
        base_price: Money::from_cents(10000),
        additional_price_per_km: Money::from_cents(4000),
        time_multiplier_tiers: tiers(&[("1", "1.5"), ("2", "2.0")])?,
        time_component_mode: TimeComponentMode::DistanceSurcharge,
        waiting_free_minutes: 2,
        waiting_charge_per_interval: Money::from_cents(800),
        waiting_interval_minutes: 2,
    })
}

fn tiers(pairs: &[(&str, &str)]) -> Result<Vec<TimeTier>, rust_decimal::Error> {
    pairs
        .iter()
        .map(|(max_hours, multiplier)| {
            Ok(TimeTier::new(
                max_hours.parse::<Decimal>()?,
                multiplier.parse::<Decimal>()?,
            ))
        })
        .collect()
}
