//! Flag and environment resolution for the CLI.
//!
//! Every connection value can come from a flag, the process environment, or
//! a `.env` file (loaded in `main` before clap parses). Missing values are
//! reported as validation errors rather than clap usage errors so scripted
//! callers get a stable exit code.

use clap::Args;
use std::path::PathBuf;

use dirsync_engine::EngineConfig;
use dirsync_graph::{GraphConfig, GraphCredentials, GraphDirectoryClient};

use crate::error::{CliError, CliResult};

/// Directory connection settings shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Entra application (client) id
    #[arg(long, env = "CLIENT_ID")]
    pub client_id: Option<String>,

    /// Entra client secret
    #[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Entra tenant id
    #[arg(long, env = "TENANT_ID")]
    pub tenant_id: Option<String>,

    /// Mailbox whose contact folder is reconciled
    #[arg(long, env = "TARGET_MAILBOX")]
    pub target_mailbox: Option<String>,

    /// Contact folder display name
    #[arg(long, env = "CONTACT_FOLDER_NAME", default_value = "Work Contacts")]
    pub folder_name: String,
}

impl ConnectionArgs {
    /// Builds the Graph client, rejecting missing required values.
    pub fn client(&self) -> CliResult<GraphDirectoryClient> {
        let client_id = require(&self.client_id, "client id (--client-id / CLIENT_ID)")?;
        let client_secret = require(
            &self.client_secret,
            "client secret (--client-secret / CLIENT_SECRET)",
        )?;
        let tenant_id = require(&self.tenant_id, "tenant id (--tenant-id / TENANT_ID)")?;
        let target_mailbox = require(
            &self.target_mailbox,
            "target mailbox (--target-mailbox / TARGET_MAILBOX)",
        )?;

        let config = GraphConfig::new(tenant_id, target_mailbox)
            .with_folder_name(self.folder_name.clone());
        let credentials = GraphCredentials::new(client_id, client_secret);

        Ok(GraphDirectoryClient::new(config, credentials)?)
    }
}

/// Run artifact locations shared by `sync` and `plan`.
#[derive(Args, Debug, Clone)]
pub struct PathArgs {
    /// Desired-state CSV file
    #[arg(long, env = "CSV_FILE_PATH")]
    pub csv: Option<PathBuf>,

    /// Checkpoint file of confirmed-synced contact ids
    #[arg(long, env = "CHECKPOINT_PATH", default_value = "sync_checkpoint.json")]
    pub checkpoint: PathBuf,

    /// Append-only success log
    #[arg(long, env = "RESULTS_LOG_PATH", default_value = "sync_results.txt")]
    pub results_log: PathBuf,

    /// Append-only error log
    #[arg(long, env = "ERROR_LOG_PATH", default_value = "error_log.txt")]
    pub errors_log: PathBuf,
}

impl PathArgs {
    pub fn engine_config(&self) -> CliResult<EngineConfig> {
        let csv_path = self
            .csv
            .clone()
            .ok_or_else(|| missing("CSV path (--csv / CSV_FILE_PATH)"))?;

        Ok(EngineConfig {
            csv_path,
            checkpoint_path: self.checkpoint.clone(),
            results_log: self.results_log.clone(),
            errors_log: self.errors_log.clone(),
        })
    }
}

fn require(value: &Option<String>, what: &str) -> CliResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.clone()),
        _ => Err(missing(what)),
    }
}

fn missing(what: &str) -> CliError {
    CliError::Validation(format!("missing {what}"))
}
