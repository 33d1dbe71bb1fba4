//! Actual-state loader: fetches and validates the remote contact set.
//!
//! The validity filter lives here, at the loader boundary: entries missing
//! identity or required fields never reach the diff. A fetch failure is fatal
//! for the run since the plan cannot be trusted without accurate actual
//! state; it does not touch the on-disk checkpoint.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::client::DirectoryClient;
use crate::error::SyncResult;
use crate::record::ContactRecord;
use crate::report::LoadWarning;

const WARN_CONTEXT: &str = "remote-load";

/// Validated remote state: records keyed by lower-cased email, with
/// `remote_id` always present, plus warnings for excluded entries.
#[derive(Debug, Default)]
pub struct ActualState {
    pub records: BTreeMap<String, ContactRecord>,
    pub warnings: Vec<LoadWarning>,
}

/// Fetches all remote contacts and applies the validity filter.
///
/// Duplicate remote emails keep the first-seen entry; later ones are ignored
/// with a warning. (The remote side is not hand-edited, so duplicates signal
/// drift worth surfacing rather than a row to prefer.)
///
/// # Errors
///
/// Propagates the client's listing failure ([`crate::SyncError::RemoteLoad`]
/// or [`crate::SyncError::Directory`]); reconciliation cannot proceed
/// without it.
pub async fn load_actual(client: &dyn DirectoryClient) -> SyncResult<ActualState> {
    let entries = client.list_contacts().await?;
    let total = entries.len();

    let mut state = ActualState::default();

    for entry in entries {
        let remote_id = entry.remote_id.clone();
        let Some(record) = entry.into_record() else {
            state.warnings.push(LoadWarning::new(
                WARN_CONTEXT,
                None,
                format!("remote record {remote_id} missing required fields, excluded"),
            ));
            continue;
        };

        let key = record.email_key();
        if state.records.contains_key(&key) {
            state.warnings.push(LoadWarning::new(
                WARN_CONTEXT,
                Some(record.email.clone()),
                format!("duplicate remote email, keeping first-seen record, ignoring {remote_id}"),
            ));
            continue;
        }
        state.records.insert(key, record);
    }

    debug!(
        fetched = total,
        valid = state.records.len(),
        excluded = state.warnings.len(),
        "validated remote listing"
    );
    info!("loaded {} remote contacts", state.records.len());

    Ok(state)
}
