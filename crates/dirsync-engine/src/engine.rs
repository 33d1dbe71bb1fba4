//! Reconciliation engine orchestrator.
//!
//! Runs the five strictly ordered phases: load desired, load actual, plan,
//! apply, persist checkpoint. Each phase completes before the next begins;
//! the plan needs both full loads and the checkpoint persist needs the full
//! apply outcome.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing::{info, warn};

use crate::checkpoint::CheckpointStore;
use crate::client::DirectoryClient;
use crate::desired::load_desired;
use crate::error::SyncResult;
use crate::plan::{build_plan, ActionKind, ActionPlan, PlannedAction};
use crate::remote::load_actual;
use crate::report::{LoadWarning, ReportWriter};
use crate::summary::RunSummary;

/// Paths the engine works against. Credential and endpoint configuration
/// belongs to the [`DirectoryClient`] implementation, not here.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Desired-state CSV.
    pub csv_path: PathBuf,
    /// Checkpoint file (JSON array of remote ids).
    pub checkpoint_path: PathBuf,
    /// Append-only success log.
    pub results_log: PathBuf,
    /// Append-only error/warning log.
    pub errors_log: PathBuf,
}

/// Drives one reconciliation run to completion.
///
/// The engine exclusively owns the action plan and the in-memory checkpoint
/// for the duration of a run; no ambient state survives between runs except
/// the checkpoint file.
pub struct ReconciliationEngine<C> {
    client: C,
    config: EngineConfig,
    reporter: ReportWriter,
    store: CheckpointStore,
}

impl<C: DirectoryClient> ReconciliationEngine<C> {
    #[must_use]
    pub fn new(client: C, config: EngineConfig) -> Self {
        let reporter = ReportWriter::new(&config.results_log, &config.errors_log);
        let store = CheckpointStore::new(&config.checkpoint_path);
        Self {
            client,
            config,
            reporter,
            store,
        }
    }

    /// Computes the plan without applying anything or writing report lines.
    ///
    /// # Errors
    ///
    /// Same fatal cases as [`run`](Self::run): unreadable CSV, failed remote
    /// listing, or the empty-desired-state refusal.
    pub async fn build_run_plan(&self) -> SyncResult<(ActionPlan, Vec<LoadWarning>)> {
        let desired = load_desired(&self.config.csv_path)?;
        let actual = load_actual(&self.client).await?;
        let (checkpoint, checkpoint_warning) = self.store.load();

        let mut warnings = desired.warnings;
        warnings.extend(actual.warnings);
        warnings.extend(checkpoint_warning);

        let plan = build_plan(&desired.records, &actual.records, &checkpoint)?;
        Ok((plan, warnings))
    }

    /// Runs one full reconciliation pass.
    ///
    /// Per-record action failures are caught, written to the error log and
    /// counted; they never abort the run. Setting `cancel` during the apply
    /// phase stops before the next action; whatever already succeeded is
    /// still checkpointed.
    ///
    /// # Errors
    ///
    /// Fatal cases only: desired/remote load failure, the empty-desired-state
    /// refusal, a report file that cannot be appended to, or a checkpoint
    /// that cannot be persisted at end of run.
    pub async fn run(&self, cancel: &AtomicBool) -> SyncResult<RunSummary> {
        let started = Instant::now();
        info!("starting reconciliation run");

        let desired = match load_desired(&self.config.csv_path) {
            Ok(state) => state,
            Err(e) => {
                self.report_fatal("csv-load", &e)?;
                return Err(e);
            }
        };
        let actual = match load_actual(&self.client).await {
            Ok(state) => state,
            Err(e) => {
                self.report_fatal("remote-load", &e)?;
                return Err(e);
            }
        };

        let (mut checkpoint, checkpoint_warning) = self.store.load();

        let mut summary = RunSummary::default();
        for warning in desired
            .warnings
            .iter()
            .chain(actual.warnings.iter())
            .chain(checkpoint_warning.iter())
        {
            self.reporter.warning(warning)?;
            summary.warnings += 1;
        }

        let plan = match build_plan(&desired.records, &actual.records, &checkpoint) {
            Ok(plan) => plan,
            Err(e) => {
                self.report_fatal("plan", &e)?;
                return Err(e);
            }
        };
        summary.noops = plan.noops;
        summary.checkpoint_skips = plan.checkpoint_skips;

        // No-ops verified by comparison this run are confirmed synchronized
        // even if the apply phase is cut short below.
        checkpoint.extend(plan.confirmed.iter().cloned());

        for action in &plan.actions {
            if cancel.load(Ordering::Relaxed) {
                warn!("shutdown requested, stopping apply phase early");
                summary.cancelled = true;
                break;
            }
            self.apply_one(action, &mut checkpoint, &mut summary).await?;
        }

        summary.duration_seconds = started.elapsed().as_secs();

        if let Err(e) = self.store.save(&checkpoint) {
            self.report_fatal("checkpoint-persist", &e)?;
            return Err(e);
        }

        info!(%summary, "reconciliation run finished");
        Ok(summary)
    }

    /// Applies a single plan entry with failure isolation.
    async fn apply_one(
        &self,
        action: &PlannedAction,
        checkpoint: &mut crate::checkpoint::CheckpointSet,
        summary: &mut RunSummary,
    ) -> SyncResult<()> {
        match action {
            PlannedAction::Create(record) => match self.client.create(record).await {
                Ok(remote_id) => {
                    checkpoint.insert(remote_id);
                    self.reporter.success(ActionKind::Create, &record.email)?;
                    summary.creates += 1;
                }
                Err(e) => {
                    self.reporter
                        .failure("create", Some(&record.email), &e.to_string())?;
                    summary.errors += 1;
                }
            },
            PlannedAction::Update { remote_id, record } => {
                match self.client.update(remote_id, record).await {
                    Ok(()) => {
                        checkpoint.insert(remote_id.clone());
                        self.reporter.success(ActionKind::Update, &record.email)?;
                        summary.updates += 1;
                    }
                    Err(e) => {
                        self.reporter
                            .failure("update", Some(&record.email), &e.to_string())?;
                        summary.errors += 1;
                    }
                }
            }
            PlannedAction::Delete { remote_id, email } => {
                match self.client.delete(remote_id).await {
                    Ok(()) => {
                        // The id no longer exists remotely; keeping it would
                        // make the checkpoint lie about the directory.
                        checkpoint.remove(remote_id);
                        self.reporter.success(ActionKind::Delete, email)?;
                        summary.deletes += 1;
                    }
                    Err(e) => {
                        self.reporter
                            .failure("delete", Some(email), &e.to_string())?;
                        summary.errors += 1;
                    }
                }
            }
        }
        Ok(())
    }

    fn report_fatal(&self, context: &str, error: &crate::error::SyncError) -> SyncResult<()> {
        warn!(context, %error, "run-fatal failure");
        self.reporter.failure(context, None, &error.to_string())
    }
}
