//! Append-only result and error report files.
//!
//! Two artifacts per run: a results log with one line per successful action
//! (`<timestamp> <action> <email>`) and an error log with one line per failed
//! action or loader warning (`<timestamp> <context> <email-or-blank>
//! <message>`). A `-` stands in for the blank email field so lines stay
//! whitespace-splittable.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};

use crate::error::{SyncError, SyncResult};
use crate::plan::ActionKind;

/// A non-fatal problem recorded while loading desired or actual state.
#[derive(Debug, Clone)]
pub struct LoadWarning {
    /// Where the warning originated, e.g. `csv-load` or `remote-load`.
    pub context: &'static str,
    /// The affected record's email, when known.
    pub email: Option<String>,
    pub message: String,
}

impl LoadWarning {
    pub(crate) fn new(context: &'static str, email: Option<String>, message: String) -> Self {
        Self {
            context,
            email,
            message,
        }
    }
}

/// Appends human-readable lines to the two report files.
///
/// Stateless apart from the paths; the files are opened in append mode per
/// line so an interrupted run never truncates earlier history.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    results_path: PathBuf,
    errors_path: PathBuf,
}

impl ReportWriter {
    #[must_use]
    pub fn new(results_path: impl Into<PathBuf>, errors_path: impl Into<PathBuf>) -> Self {
        Self {
            results_path: results_path.into(),
            errors_path: errors_path.into(),
        }
    }

    /// Records a successfully applied action.
    pub fn success(&self, action: ActionKind, email: &str) -> SyncResult<()> {
        let line = format!("{} {} {}", timestamp(), action, email);
        append_line(&self.results_path, &line)
    }

    /// Records a failed action or run-level problem.
    pub fn failure(&self, context: &str, email: Option<&str>, message: &str) -> SyncResult<()> {
        let line = format!(
            "{} {} {} {}",
            timestamp(),
            context,
            email.filter(|e| !e.is_empty()).unwrap_or("-"),
            message
        );
        append_line(&self.errors_path, &line)
    }

    /// Routes a loader warning into the error log.
    pub fn warning(&self, warning: &LoadWarning) -> SyncResult<()> {
        self.failure(warning.context, warning.email.as_deref(), &warning.message)
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn append_line(path: &Path, line: &str) -> SyncResult<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| SyncError::Report(format!("{}: {e}", path.display())))?;
    writeln!(file, "{line}").map_err(|e| SyncError::Report(format!("{}: {e}", path.display())))
}
