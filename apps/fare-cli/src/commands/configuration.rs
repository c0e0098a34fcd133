//! # Configuration Commands
//!
//! `fare configs ...`: list, inspect and mutate pricing configurations.
//!
//! Drafts are TOML files deserialized into [`ConfigurationDraft`]; see
//! `drafts/` for samples. Every mutation is logged under the configured actor
//! with the optional `--notes`.

use clap::{Args, Subcommand};
use fare_core::{ConfigurationDraft, CoreError, Weekday};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use super::{to_data, Context};
use crate::error::CliError;

#[derive(Debug, Default, Clone, Args)]
pub struct AuditArgs {
    /// Free-text note stored with the log entry
    #[arg(long, default_value = "")]
    pub notes: String,
}

#[derive(Debug, Subcommand)]
pub enum ConfigsCommand {
    /// List every configuration, or the active ones for a day
    List {
        #[arg(long)]
        day: Option<String>,
    },

    /// Show one configuration
    Show { id: String },

    /// Create a configuration from a TOML draft
    Create {
        #[arg(long)]
        file: PathBuf,
        #[command(flatten)]
        audit: AuditArgs,
    },

    /// Replace a configuration's fields with a TOML draft
    Update {
        id: String,
        #[arg(long)]
        file: PathBuf,
        #[command(flatten)]
        audit: AuditArgs,
    },

    /// Make a configuration eligible for selection
    Activate {
        id: String,
        #[command(flatten)]
        audit: AuditArgs,
    },

    /// Remove a configuration from selection
    Deactivate {
        id: String,
        #[command(flatten)]
        audit: AuditArgs,
    },

    /// Delete a configuration (its history is kept)
    Delete {
        id: String,
        #[command(flatten)]
        audit: AuditArgs,
    },

    /// Show the audit trail of a configuration
    History { id: String },
}

pub async fn run(ctx: &Context, command: ConfigsCommand) -> Result<Value, CliError> {
    let service = &ctx.service;
    let actor = ctx.actor.as_str();

    match command {
        ConfigsCommand::List { day: Some(day) } => {
            let day = Weekday::from_str(&day).map_err(CoreError::from)?;
            to_data(&service.active_configurations_for(day).await?)
        }
        ConfigsCommand::List { day: None } => to_data(&service.list_configurations().await?),
        ConfigsCommand::Show { id } => to_data(&service.get_configuration(&id).await?),
        ConfigsCommand::Create { file, audit } => {
            let draft = read_draft(&file)?;
            to_data(&service.create_configuration(draft, actor, &audit.notes).await?)
        }
        ConfigsCommand::Update { id, file, audit } => {
            let draft = read_draft(&file)?;
            to_data(&service.update_configuration(&id, draft, actor, &audit.notes).await?)
        }
        ConfigsCommand::Activate { id, audit } => {
            to_data(&service.activate_configuration(&id, actor, &audit.notes).await?)
        }
        ConfigsCommand::Deactivate { id, audit } => {
            to_data(&service.deactivate_configuration(&id, actor, &audit.notes).await?)
        }
        ConfigsCommand::Delete { id, audit } => {
            to_data(&service.delete_configuration(&id, actor, &audit.notes).await?)
        }
        ConfigsCommand::History { id } => to_data(&service.configuration_history(&id).await?),
    }
}

/// Reads and parses a draft file.
pub fn read_draft(path: &Path) -> Result<ConfigurationDraft, CliError> {
    debug!(path = %path.display(), "Reading configuration draft");

    let contents = std::fs::read_to_string(path)
        .map_err(|e| CliError::invalid_input(format!("Cannot read {}: {}", path.display(), e)))?;
    parse_draft(&contents)
        .map_err(|e| CliError::invalid_configuration(format!("{}: {}", path.display(), e)))
}

/// Parses a TOML draft. Omitted optional fields take their defaults.
pub fn parse_draft(contents: &str) -> Result<ConfigurationDraft, toml::de::Error> {
    toml::from_str(contents)
}
