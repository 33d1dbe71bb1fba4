//! Run a full reconciliation pass against the directory

use clap::Args;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

use dirsync_engine::ReconciliationEngine;

use crate::config::{ConnectionArgs, PathArgs};
use crate::error::CliResult;

/// Reconcile the CSV against the directory's contact folder
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub paths: PathArgs,

    /// Compute and print the plan without applying it
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the sync command
pub async fn execute(args: SyncArgs) -> CliResult<()> {
    if args.dry_run {
        return crate::commands::plan::execute(crate::commands::plan::PlanArgs {
            connection: args.connection,
            paths: args.paths,
        })
        .await;
    }

    let client = args.connection.client()?;
    let engine = ReconciliationEngine::new(client, args.paths.engine_config()?);

    // Ctrl-c flips the flag; the engine finishes the in-flight call, skips
    // the rest and still persists the checkpoint.
    let cancel = Arc::new(AtomicBool::new(false));
    let watcher_flag = Arc::clone(&cancel);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing current operation");
            watcher_flag.store(true, Ordering::SeqCst);
        }
    });

    let summary = engine.run(&cancel).await?;
    println!("{summary}");

    Ok(())
}
