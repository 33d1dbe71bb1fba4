//! Diff computation: classifies each record into an action.
//!
//! The plan is built once per run from fully loaded desired and actual
//! state, consumed once by the applier, and never persisted.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::checkpoint::CheckpointSet;
use crate::error::{SyncError, SyncResult};
use crate::record::ContactRecord;

/// The kind of a planned action, used in report lines and counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// A single entry of the action plan.
#[derive(Debug, Clone)]
pub enum PlannedAction {
    /// Record exists in the CSV but not remotely.
    Create(ContactRecord),
    /// Record exists on both sides with at least one differing field.
    Update {
        remote_id: String,
        record: ContactRecord,
    },
    /// Record exists remotely but not in the CSV.
    Delete { remote_id: String, email: String },
}

impl PlannedAction {
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Create(_) => ActionKind::Create,
            Self::Update { .. } => ActionKind::Update,
            Self::Delete { .. } => ActionKind::Delete,
        }
    }

    #[must_use]
    pub fn email(&self) -> &str {
        match self {
            Self::Create(record) | Self::Update { record, .. } => &record.email,
            Self::Delete { email, .. } => email,
        }
    }
}

/// Ordered action set for one run, with the no-op bookkeeping the summary
/// and checkpoint need.
#[derive(Debug, Default)]
pub struct ActionPlan {
    /// Creates, then updates, then deletes, each ordered by email.
    pub actions: Vec<PlannedAction>,
    /// Remote ids confirmed in sync by field comparison this run but not yet
    /// in the checkpoint. They are checkpointed without any remote call.
    pub confirmed: Vec<String>,
    /// Pairs requiring no remote call, checkpoint skips included.
    pub noops: usize,
    /// No-ops short-circuited because the remote id was already checkpointed.
    pub checkpoint_skips: usize,
}

impl ActionPlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    #[must_use]
    pub fn count(&self, kind: ActionKind) -> usize {
        self.actions.iter().filter(|a| a.kind() == kind).count()
    }
}

/// Computes the action plan from desired and actual state.
///
/// Both maps are keyed by lower-cased email. Pairs present on both sides are
/// compared field by field; equal pairs already present in `checkpoint` are
/// skipped without touching them at all.
///
/// # Errors
///
/// Returns [`SyncError::EmptyDesiredState`] when `desired` is empty while
/// `actual` is not. An empty desired set is indistinguishable from a failed
/// or truncated CSV load, and planning deletes from it would wipe the
/// directory.
pub fn build_plan(
    desired: &BTreeMap<String, ContactRecord>,
    actual: &BTreeMap<String, ContactRecord>,
    checkpoint: &CheckpointSet,
) -> SyncResult<ActionPlan> {
    if desired.is_empty() && !actual.is_empty() {
        return Err(SyncError::EmptyDesiredState {
            actual_count: actual.len(),
        });
    }

    let mut plan = ActionPlan::default();
    let mut updates = Vec::new();
    let mut deletes = Vec::new();

    for (key, wanted) in desired {
        match actual.get(key) {
            None => plan.actions.push(PlannedAction::Create(wanted.clone())),
            Some(current) => {
                // A remote record without an id cannot be patched; recreate it.
                let Some(remote_id) = current.remote_id.clone() else {
                    plan.actions.push(PlannedAction::Create(wanted.clone()));
                    continue;
                };

                if wanted.comparable_fields_equal(current) {
                    plan.noops += 1;
                    if checkpoint.contains(&remote_id) {
                        plan.checkpoint_skips += 1;
                    } else {
                        plan.confirmed.push(remote_id);
                    }
                } else {
                    updates.push(PlannedAction::Update {
                        remote_id,
                        record: wanted.clone(),
                    });
                }
            }
        }
    }

    for (key, current) in actual {
        if desired.contains_key(key) {
            continue;
        }
        if let Some(remote_id) = current.remote_id.clone() {
            deletes.push(PlannedAction::Delete {
                remote_id,
                email: current.email.clone(),
            });
        }
    }

    plan.actions.extend(updates);
    plan.actions.extend(deletes);

    debug!(
        creates = plan.count(ActionKind::Create),
        updates = plan.count(ActionKind::Update),
        deletes = plan.count(ActionKind::Delete),
        noops = plan.noops,
        checkpoint_skips = plan.checkpoint_skips,
        "built action plan"
    );

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(email: &str, department: &str, remote_id: Option<&str>) -> ContactRecord {
        ContactRecord {
            email: email.to_string(),
            given_name: "Test".to_string(),
            surname: "User".to_string(),
            business_phone: None,
            mobile: None,
            department: department.to_string(),
            job_title: "Engineer".to_string(),
            office_location: "HQ".to_string(),
            remote_id: remote_id.map(String::from),
        }
    }

    fn keyed(records: Vec<ContactRecord>) -> BTreeMap<String, ContactRecord> {
        records.into_iter().map(|r| (r.email_key(), r)).collect()
    }

    #[test]
    fn test_desired_only_record_plans_create() {
        let desired = keyed(vec![record("alice@x.com", "Eng", None)]);
        let actual = BTreeMap::new();

        let plan = build_plan(&desired, &actual, &CheckpointSet::default()).unwrap();
        assert_eq!(plan.actions.len(), 1);
        assert!(matches!(&plan.actions[0], PlannedAction::Create(r) if r.email == "alice@x.com"));
    }

    #[test]
    fn test_field_difference_plans_update_with_actual_remote_id() {
        let desired = keyed(vec![record("bob@x.com", "Eng", None)]);
        let actual = keyed(vec![record("bob@x.com", "Sales", Some("R1"))]);

        let plan = build_plan(&desired, &actual, &CheckpointSet::default()).unwrap();
        assert_eq!(plan.actions.len(), 1);
        match &plan.actions[0] {
            PlannedAction::Update { remote_id, record } => {
                assert_eq!(remote_id, "R1");
                assert_eq!(record.department, "Eng");
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_desired_with_nonempty_actual_refuses_to_plan() {
        let desired = BTreeMap::new();
        let actual = keyed(vec![record("carol@x.com", "Eng", Some("R2"))]);

        let err = build_plan(&desired, &actual, &CheckpointSet::default()).unwrap_err();
        assert!(matches!(err, SyncError::EmptyDesiredState { actual_count: 1 }));
    }

    #[test]
    fn test_both_sides_empty_is_a_valid_empty_plan() {
        let plan =
            build_plan(&BTreeMap::new(), &BTreeMap::new(), &CheckpointSet::default()).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.noops, 0);
    }

    #[test]
    fn test_disjoint_sets_produce_one_create_and_one_delete_each() {
        let desired = keyed(vec![
            record("a@x.com", "Eng", None),
            record("b@x.com", "Eng", None),
        ]);
        let actual = keyed(vec![
            record("c@x.com", "Eng", Some("R1")),
            record("d@x.com", "Eng", Some("R2")),
        ]);

        let plan = build_plan(&desired, &actual, &CheckpointSet::default()).unwrap();
        assert_eq!(plan.count(ActionKind::Create), 2);
        assert_eq!(plan.count(ActionKind::Delete), 2);
        assert_eq!(plan.count(ActionKind::Update), 0);
    }

    #[test]
    fn test_equal_pair_is_noop_and_gets_confirmed() {
        let desired = keyed(vec![record("e@x.com", "Eng", None)]);
        let actual = keyed(vec![record("e@x.com", "Eng", Some("R1"))]);

        let plan = build_plan(&desired, &actual, &CheckpointSet::default()).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.noops, 1);
        assert_eq!(plan.checkpoint_skips, 0);
        assert_eq!(plan.confirmed, vec!["R1".to_string()]);
    }

    #[test]
    fn test_checkpointed_equal_pair_is_skipped_entirely() {
        let desired = keyed(vec![record("e@x.com", "Eng", None)]);
        let actual = keyed(vec![record("e@x.com", "Eng", Some("R1"))]);
        let mut checkpoint = CheckpointSet::default();
        checkpoint.insert("R1".to_string());

        let plan = build_plan(&desired, &actual, &checkpoint).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.noops, 1);
        assert_eq!(plan.checkpoint_skips, 1);
        assert!(plan.confirmed.is_empty());
    }

    #[test]
    fn test_checkpointed_pair_with_changed_fields_still_updates() {
        let desired = keyed(vec![record("e@x.com", "Eng", None)]);
        let actual = keyed(vec![record("e@x.com", "Sales", Some("R1"))]);
        let mut checkpoint = CheckpointSet::default();
        checkpoint.insert("R1".to_string());

        let plan = build_plan(&desired, &actual, &checkpoint).unwrap();
        assert_eq!(plan.count(ActionKind::Update), 1);
    }

    #[test]
    fn test_actions_ordered_creates_updates_deletes() {
        let desired = keyed(vec![
            record("new@x.com", "Eng", None),
            record("changed@x.com", "Eng", None),
        ]);
        let actual = keyed(vec![
            record("changed@x.com", "Sales", Some("R1")),
            record("gone@x.com", "Eng", Some("R2")),
        ]);

        let plan = build_plan(&desired, &actual, &CheckpointSet::default()).unwrap();
        let kinds: Vec<ActionKind> = plan.actions.iter().map(PlannedAction::kind).collect();
        assert_eq!(
            kinds,
            vec![ActionKind::Create, ActionKind::Update, ActionKind::Delete]
        );
    }

    #[test]
    fn test_email_match_is_case_insensitive_across_sides() {
        let desired = keyed(vec![record("Mixed@X.com", "Eng", None)]);
        let actual = keyed(vec![record("mixed@x.com", "Eng", Some("R1"))]);

        let plan = build_plan(&desired, &actual, &CheckpointSet::default()).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.noops, 1);
    }
}
