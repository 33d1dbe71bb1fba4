//! dirsync - reconcile a CSV of contacts against a directory contact folder
//!
//! This CLI enables operators to:
//! - Run a full reconciliation pass (`sync`)
//! - Preview the action plan without touching the directory (`plan`)
//! - Dump the directory folder's current contacts to a CSV (`export`)

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod error;

use error::CliResult;

/// dirsync - CSV to directory contact reconciliation
#[derive(Parser)]
#[command(name = "dirsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the CSV against the directory's contact folder
    Sync(commands::sync::SyncArgs),

    /// Show what a sync run would do, without writing anything remote
    Plan(commands::plan::PlanArgs),

    /// Dump the remote contact folder to a CSV file
    Export(commands::export::ExportArgs),
}

#[tokio::main]
async fn main() {
    // .env values become env vars before clap resolves `env =` fallbacks.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Sync(args) => commands::sync::execute(args).await,
        Commands::Plan(args) => commands::plan::execute(args).await,
        Commands::Export(args) => commands::export::execute(args).await,
    }
}
