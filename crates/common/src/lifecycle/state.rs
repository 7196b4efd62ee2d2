//! The story lifecycle transition table
//!
//! `apply` is the single place the status column and its paired timestamps
//! (`deleted_at`, `purge_at`, `archived_at`) may change. Every applied
//! transition fully determines all four fields, which keeps the invariants in
//! one spot: at most one of {deleted_at, archived_at} set, `purge_at` set iff
//! trashed, and always `deleted_at + retention`.

use crate::db::models::StoryStatus;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A named lifecycle operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Publish,
    MoveToArchive,
    MoveToTrash,
    RestoreFromArchive,
    RestoreFromTrash,
    PublishFromArchive,
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Publish => "publish",
            Transition::MoveToArchive => "move_to_archive",
            Transition::MoveToTrash => "move_to_trash",
            Transition::RestoreFromArchive => "restore_from_archive",
            Transition::RestoreFromTrash => "restore_from_trash",
            Transition::PublishFromArchive => "publish_from_archive",
        }
    }

    /// The status this operation lands in
    pub fn target(&self) -> StoryStatus {
        match self {
            Transition::Publish | Transition::PublishFromArchive => StoryStatus::Published,
            Transition::MoveToArchive => StoryStatus::Archived,
            Transition::MoveToTrash => StoryStatus::Trashed,
            Transition::RestoreFromArchive | Transition::RestoreFromTrash => StoryStatus::Draft,
        }
    }

    /// The status this operation requires, if it is source-restricted
    fn required_source(&self) -> Option<StoryStatus> {
        match self {
            Transition::Publish | Transition::MoveToArchive | Transition::MoveToTrash => None,
            Transition::RestoreFromArchive | Transition::PublishFromArchive => {
                Some(StoryStatus::Archived)
            }
            Transition::RestoreFromTrash => Some(StoryStatus::Trashed),
        }
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The full new value of the lifecycle columns after a transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateChange {
    pub status: StoryStatus,
    pub deleted_at: Option<DateTime<Utc>>,
    pub purge_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

/// Outcome of applying a transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateOutcome {
    /// The transition applies; persist the change
    Applied(StateChange),
    /// The target state already holds. Idempotent no-op, surfaced to the
    /// caller as a warning rather than an error.
    AlreadyInState(StoryStatus),
}

/// A transition attempted from a state it is not defined for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: StoryStatus,
    pub operation: Transition,
}

/// Evaluate a transition against the current status.
///
/// `retention` is how long a trashed story lives before purge.
pub fn apply(
    current: StoryStatus,
    op: Transition,
    now: DateTime<Utc>,
    retention: Duration,
) -> Result<StateOutcome, InvalidTransition> {
    let target = op.target();
    if current == target {
        return Ok(StateOutcome::AlreadyInState(current));
    }

    if let Some(required) = op.required_source() {
        if current != required {
            return Err(InvalidTransition {
                from: current,
                operation: op,
            });
        }
    }

    let change = match target {
        StoryStatus::Published | StoryStatus::Draft => StateChange {
            status: target,
            deleted_at: None,
            purge_at: None,
            archived_at: None,
        },
        StoryStatus::Archived => StateChange {
            status: target,
            deleted_at: None,
            purge_at: None,
            archived_at: Some(now),
        },
        StoryStatus::Trashed => StateChange {
            status: target,
            deleted_at: Some(now),
            purge_at: Some(now + retention),
            archived_at: None,
        },
    };

    Ok(StateOutcome::Applied(change))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RETENTION: i64 = 30;

    fn apply_ok(current: StoryStatus, op: Transition) -> StateOutcome {
        apply(current, op, Utc::now(), Duration::days(RETENTION)).unwrap()
    }

    fn applied(current: StoryStatus, op: Transition) -> StateChange {
        match apply_ok(current, op) {
            StateOutcome::Applied(change) => change,
            other => panic!("expected Applied, got {:?}", other),
        }
    }

    #[test]
    fn test_publish_from_any_state_clears_timestamps() {
        for from in [StoryStatus::Draft, StoryStatus::Archived, StoryStatus::Trashed] {
            let change = applied(from, Transition::Publish);
            assert_eq!(change.status, StoryStatus::Published);
            assert_eq!(change.deleted_at, None);
            assert_eq!(change.purge_at, None);
            assert_eq!(change.archived_at, None);
        }
    }

    #[test]
    fn test_move_to_trash_sets_purge_deadline() {
        let now = Utc::now();
        let outcome = apply(
            StoryStatus::Published,
            Transition::MoveToTrash,
            now,
            Duration::days(RETENTION),
        )
        .unwrap();
        let StateOutcome::Applied(change) = outcome else {
            panic!("expected Applied");
        };
        assert_eq!(change.status, StoryStatus::Trashed);
        assert_eq!(change.deleted_at, Some(now));
        assert_eq!(change.purge_at, Some(now + Duration::days(RETENTION)));
        assert_eq!(change.archived_at, None);
    }

    #[test]
    fn test_move_to_archive_clears_trash_fields() {
        let change = applied(StoryStatus::Trashed, Transition::MoveToArchive);
        assert_eq!(change.status, StoryStatus::Archived);
        assert!(change.archived_at.is_some());
        assert_eq!(change.deleted_at, None);
        assert_eq!(change.purge_at, None);
    }

    #[test]
    fn test_restore_from_trash() {
        let change = applied(StoryStatus::Trashed, Transition::RestoreFromTrash);
        assert_eq!(change.status, StoryStatus::Draft);
        assert_eq!(change.deleted_at, None);
        assert_eq!(change.purge_at, None);
        assert_eq!(change.archived_at, None);
    }

    #[test]
    fn test_restore_from_archive() {
        let change = applied(StoryStatus::Archived, Transition::RestoreFromArchive);
        assert_eq!(change.status, StoryStatus::Draft);
        assert_eq!(change.archived_at, None);
    }

    #[test]
    fn test_publish_from_archive() {
        let change = applied(StoryStatus::Archived, Transition::PublishFromArchive);
        assert_eq!(change.status, StoryStatus::Published);
        assert_eq!(change.archived_at, None);
    }

    #[test]
    fn test_already_in_state_is_a_noop() {
        assert_eq!(
            apply_ok(StoryStatus::Published, Transition::Publish),
            StateOutcome::AlreadyInState(StoryStatus::Published)
        );
        assert_eq!(
            apply_ok(StoryStatus::Trashed, Transition::MoveToTrash),
            StateOutcome::AlreadyInState(StoryStatus::Trashed)
        );
        assert_eq!(
            apply_ok(StoryStatus::Draft, Transition::RestoreFromTrash),
            StateOutcome::AlreadyInState(StoryStatus::Draft)
        );
    }

    #[test]
    fn test_source_restricted_transitions_reject_other_states() {
        let err = apply(
            StoryStatus::Published,
            Transition::RestoreFromTrash,
            Utc::now(),
            Duration::days(RETENTION),
        )
        .unwrap_err();
        assert_eq!(err.from, StoryStatus::Published);
        assert_eq!(err.operation, Transition::RestoreFromTrash);

        assert!(apply(
            StoryStatus::Trashed,
            Transition::RestoreFromArchive,
            Utc::now(),
            Duration::days(RETENTION),
        )
        .is_err());

        assert!(apply(
            StoryStatus::Draft,
            Transition::PublishFromArchive,
            Utc::now(),
            Duration::days(RETENTION),
        )
        .is_err());
    }

    #[test]
    fn test_timestamp_exclusivity_after_every_applied_change() {
        let states = [
            StoryStatus::Draft,
            StoryStatus::Published,
            StoryStatus::Archived,
            StoryStatus::Trashed,
        ];
        let ops = [
            Transition::Publish,
            Transition::MoveToArchive,
            Transition::MoveToTrash,
            Transition::RestoreFromArchive,
            Transition::RestoreFromTrash,
            Transition::PublishFromArchive,
        ];
        for from in states {
            for op in ops {
                if let Ok(StateOutcome::Applied(change)) =
                    apply(from, op, Utc::now(), Duration::days(RETENTION))
                {
                    // never both archive and trash timestamps
                    assert!(change.deleted_at.is_none() || change.archived_at.is_none());
                    // purge_at iff trashed
                    assert_eq!(
                        change.purge_at.is_some(),
                        change.status == StoryStatus::Trashed
                    );
                    assert_eq!(
                        change.deleted_at.is_some(),
                        change.status == StoryStatus::Trashed
                    );
                    assert_eq!(
                        change.archived_at.is_some(),
                        change.status == StoryStatus::Archived
                    );
                }
            }
        }
    }
}
