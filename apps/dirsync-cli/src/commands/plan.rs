//! Compute and print the action plan without applying it

use clap::Args;

use dirsync_engine::{ActionKind, ReconciliationEngine};

use crate::config::{ConnectionArgs, PathArgs};
use crate::error::CliResult;

/// Show what a sync run would do, without writing anything remote
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub paths: PathArgs,
}

/// Execute the plan command
pub async fn execute(args: PlanArgs) -> CliResult<()> {
    let client = args.connection.client()?;
    let engine = ReconciliationEngine::new(client, args.paths.engine_config()?);

    let (plan, warnings) = engine.build_run_plan().await?;

    for warning in &warnings {
        let email = warning.email.as_deref().unwrap_or("-");
        eprintln!("warning [{}] {} {}", warning.context, email, warning.message);
    }

    for action in &plan.actions {
        println!("{} {}", action.kind(), action.email());
    }

    println!(
        "plan: {} creates, {} updates, {} deletes, {} in sync ({} already checkpointed)",
        plan.count(ActionKind::Create),
        plan.count(ActionKind::Update),
        plan.count(ActionKind::Delete),
        plan.noops,
        plan.checkpoint_skips,
    );

    Ok(())
}
