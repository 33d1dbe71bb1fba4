//! # dirsync engine
//!
//! Reconciliation engine that keeps a remote directory contact set consistent
//! with a canonical CSV source of truth.
//!
//! ## Overview
//!
//! A run proceeds through five strictly ordered phases:
//!
//! 1. Load desired state from CSV (hand-edited, so malformed rows are
//!    warnings, not failures).
//! 2. Load actual state from the remote directory via [`DirectoryClient`].
//! 3. Build an [`ActionPlan`] by diffing the two sets keyed by lower-cased
//!    email.
//! 4. Apply the plan one action at a time, isolating per-record failures.
//! 5. Persist the checkpoint of confirmed-synchronized remote ids.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    ReconciliationEngine                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  ┌────────────┐   ┌────────────┐   ┌────────────────────┐   │
//! │  │ CSV Loader │──►│    Plan    │──►│   Action Applier   │   │
//! │  │ (desired)  │   │  Builder   │   │ (create/update/    │   │
//! │  └────────────┘   └────────────┘   │  delete, isolated) │   │
//! │  ┌────────────┐         │         └─────────┬──────────┘   │
//! │  │   Remote   │─────────┘                   │              │
//! │  │   Loader   │                             ▼              │
//! │  └────────────┘   ┌────────────┐   ┌────────────────────┐   │
//! │                   │ Checkpoint │◄──│   Report Writer    │   │
//! │                   │   Store    │   │ (results / errors) │   │
//! │                   └────────────┘   └────────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The remote directory service itself is behind the [`DirectoryClient`]
//! trait; timeouts and transport retries belong to the implementation, the
//! engine only consumes a success/failure result per call.

pub mod checkpoint;
pub mod client;
pub mod desired;
pub mod engine;
pub mod error;
pub mod plan;
pub mod record;
pub mod remote;
pub mod report;
pub mod summary;

pub use checkpoint::{CheckpointSet, CheckpointStore};
pub use client::{DirectoryClient, DirectoryEntry};
pub use desired::{load_desired, save_csv, DesiredState, CSV_HEADERS};
pub use engine::{EngineConfig, ReconciliationEngine};
pub use error::{SyncError, SyncResult};
pub use plan::{build_plan, ActionKind, ActionPlan, PlannedAction};
pub use record::ContactRecord;
pub use remote::{load_actual, ActualState};
pub use report::{LoadWarning, ReportWriter};
pub use summary::RunSummary;
