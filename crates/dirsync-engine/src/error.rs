//! Error types for the reconciliation engine.

use thiserror::Error;

/// Result type alias using [`SyncError`].
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during a reconciliation run.
///
/// Failures local to one record never surface here; the applier catches them
/// and writes an error-log line instead. These variants are the run-fatal
/// cases only.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The desired-state CSV could not be read or has an invalid header.
    #[error("failed to load desired state: {0}")]
    DesiredLoad(String),

    /// The remote directory listing failed (auth/network). The plan phase
    /// cannot run without accurate actual state.
    #[error("failed to load remote state: {0}")]
    RemoteLoad(String),

    /// The desired set is empty while the directory still holds contacts.
    /// Planning deletes from an empty or unreadable CSV would wipe the
    /// directory, so the run refuses to plan at all.
    #[error("desired state is empty but the directory holds {actual_count} contacts; refusing to plan deletes")]
    EmptyDesiredState { actual_count: usize },

    /// A directory create/update/delete/list call failed.
    #[error("directory operation failed: {0}")]
    Directory(String),

    /// The checkpoint file could not be persisted at end of run. The run
    /// itself already applied its actions; the next run will redo work.
    #[error("failed to persist checkpoint: {0}")]
    CheckpointPersist(String),

    /// A results/error log line could not be appended.
    #[error("failed to append report line: {0}")]
    Report(String),

    /// Writing the CSV export failed.
    #[error("failed to write CSV: {0}")]
    CsvWrite(String),
}
