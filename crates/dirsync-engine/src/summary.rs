//! Per-run counters surfaced to the invoker at the end of every run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Counts of what a reconciliation run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
    /// Pairs that required no remote call, checkpoint skips included.
    pub noops: usize,
    /// No-ops skipped without any comparison side effects because the remote
    /// id was already checkpointed.
    pub checkpoint_skips: usize,
    /// Per-record action failures (the run continued past each).
    pub errors: usize,
    /// Loader warnings routed to the error log.
    pub warnings: usize,
    pub duration_seconds: u64,
    /// True when a shutdown request cut the apply phase short.
    pub cancelled: bool,
}

impl RunSummary {
    /// Total remote mutations attempted, successful or not.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.creates + self.updates + self.deletes + self.errors
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "creates={} updates={} deletes={} no-ops={} (checkpoint skips: {}) errors={} warnings={} duration={}s",
            self.creates,
            self.updates,
            self.deletes,
            self.noops,
            self.checkpoint_skips,
            self.errors,
            self.warnings,
            self.duration_seconds,
        )?;
        if self.cancelled {
            write!(f, " [cancelled]")?;
        }
        Ok(())
    }
}
