//! Content Lifecycle Controller
//!
//! Owns the state graph of a story (draft, published, archived, trashed
//! pending purge) and the time-bound purge contract. Transitions go through
//! the pure table in [`state`]; this module persists the outcome and handles
//! the view-counter side effect.
//!
//! Ownership checks are deliberately NOT here: the caller (request handler)
//! verifies the acting user owns the story before invoking a transition.

mod state;

pub use state::{apply, InvalidTransition, StateChange, StateOutcome, Transition};

use crate::config::ContentConfig;
use crate::db::models::Story;
use crate::db::Repository;
use crate::errors::{AppError, Result};
use chrono::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Outcome of a lifecycle operation, distinguishing the idempotent no-op
#[derive(Clone, Debug)]
pub enum TransitionOutcome {
    /// The story moved to a new state
    Applied(Story),
    /// The story was already in the target state; nothing changed
    Noop(Story),
}

impl TransitionOutcome {
    /// The story after the operation, whichever branch was taken
    pub fn story(&self) -> &Story {
        match self {
            TransitionOutcome::Applied(story) | TransitionOutcome::Noop(story) => story,
        }
    }

    pub fn into_story(self) -> Story {
        match self {
            TransitionOutcome::Applied(story) | TransitionOutcome::Noop(story) => story,
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, TransitionOutcome::Noop(_))
    }
}

/// Drives story state transitions against the repository
#[derive(Clone)]
pub struct LifecycleController {
    repo: Repository,
    retention: Duration,
}

impl LifecycleController {
    pub fn new(repo: Repository, config: &ContentConfig) -> Self {
        Self {
            repo,
            retention: Duration::days(config.trash_retention_days),
        }
    }

    /// Run a named transition on a story
    pub async fn transition(&self, story_id: Uuid, op: Transition) -> Result<TransitionOutcome> {
        let story = self
            .repo
            .find_story_by_id(story_id)
            .await?
            .ok_or_else(|| AppError::StoryNotFound {
                id: story_id.to_string(),
            })?;

        let outcome = state::apply(story.story_status(), op, chrono::Utc::now(), self.retention)
            .map_err(|e| AppError::InvalidTransition {
                from: e.from.to_string(),
                operation: e.operation.to_string(),
            })?;

        match outcome {
            StateOutcome::AlreadyInState(status) => {
                warn!(
                    story_id = %story_id,
                    status = %status,
                    operation = %op,
                    "Story already in target state, skipping transition"
                );
                Ok(TransitionOutcome::Noop(story))
            }
            StateOutcome::Applied(change) => {
                let updated = self.repo.apply_state_change(story_id, &change).await?;
                info!(
                    story_id = %story_id,
                    from = %story.status,
                    to = %updated.status,
                    operation = %op,
                    "Story transitioned"
                );
                metrics::counter!("storyhaven_story_transitions_total").increment(1);
                Ok(TransitionOutcome::Applied(updated))
            }
        }
    }

    /// Permanently delete a story and, via schema cascade, its comments,
    /// bookmarks and view history.
    ///
    /// The bulk purge path only calls this once `should_purge` holds; a
    /// manual delete by the owner is allowed regardless of the timer.
    pub async fn permanently_delete(&self, story_id: Uuid) -> Result<()> {
        let deleted = self.repo.delete_story(story_id).await?;
        if !deleted {
            return Err(AppError::StoryNotFound {
                id: story_id.to_string(),
            });
        }

        info!(story_id = %story_id, "Story permanently deleted");
        metrics::counter!("storyhaven_stories_purged_total").increment(1);
        Ok(())
    }

    /// Count a view: atomic counter increment plus, for authenticated
    /// viewers, a most-recent-wins view-history upsert.
    pub async fn increment_views(
        &self,
        story_id: Uuid,
        viewer_id: Option<Uuid>,
    ) -> Result<Story> {
        let story = self.repo.increment_views(story_id).await?;

        if let Some(viewer_id) = viewer_id {
            self.repo.upsert_view_history(viewer_id, story_id).await?;
        }

        metrics::counter!("storyhaven_story_views_total").increment(1);
        Ok(story)
    }
}
