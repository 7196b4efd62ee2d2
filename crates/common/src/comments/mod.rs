//! Comment Tree Engine
//!
//! Enforces depth-bounded threaded discussion semantics and edit/delete
//! authorization for a story's comment set. Soft delete is destructive: the
//! body is overwritten with a placeholder and restore substitutes a different
//! placeholder, never the original text.

mod permissions;
mod policy;
pub mod tree;

pub use permissions::{can_delete, can_edit, can_reply, Actor};
pub use policy::CommentPolicy;
pub use tree::{build_tree, depth_of, reply_count, CommentNode};

use crate::db::models::{Comment, StoryStatus, DELETED_PLACEHOLDER, RESTORED_PLACEHOLDER};
use crate::db::Repository;
use crate::errors::{AppError, Result};
use tracing::info;
use uuid::Uuid;

/// Outcome of an edit attempt. Authorization failure is a soft failure, not
/// an error: callers must check for `Denied`.
#[derive(Clone, Debug)]
pub enum EditOutcome {
    Updated(Comment),
    Denied,
}

impl EditOutcome {
    pub fn is_denied(&self) -> bool {
        matches!(self, EditOutcome::Denied)
    }
}

/// Body a comment gets back on restore.
///
/// Soft delete overwrote the original text, so a deleted placeholder becomes
/// the restored placeholder; any other body is kept as is. The original text
/// never comes back.
fn restored_body(body: &str) -> String {
    if body == DELETED_PLACEHOLDER {
        RESTORED_PLACEHOLDER.to_string()
    } else {
        body.to_string()
    }
}

/// Validate a reply target over the story's full comment set.
///
/// The parent must exist in the set, not be deleted, and sit above the depth
/// limit; a parent at the limit rejects with `MaxDepthExceeded`.
fn validate_reply_target(comments: &[Comment], parent_id: Uuid, max_depth: usize) -> Result<()> {
    let parent = comments.iter().find(|c| c.id == parent_id).ok_or_else(|| {
        AppError::validation("parent_id", "Parent comment not found or was deleted")
    })?;

    if parent.is_deleted {
        return Err(AppError::validation(
            "parent_id",
            "Parent comment not found or was deleted",
        ));
    }

    if tree::depth_of(comments, parent_id) >= max_depth {
        return Err(AppError::MaxDepthExceeded { max: max_depth });
    }

    Ok(())
}

/// Drives comment creation, threading and soft-delete against the repository
#[derive(Clone)]
pub struct CommentEngine {
    repo: Repository,
    policy: CommentPolicy,
}

impl CommentEngine {
    pub fn new(repo: Repository, policy: CommentPolicy) -> Self {
        Self { repo, policy }
    }

    pub fn policy(&self) -> &CommentPolicy {
        &self.policy
    }

    /// Add a comment to a published story, optionally as a reply.
    ///
    /// Reply depth is bounded: the parent must sit above the depth limit,
    /// belong to the same story, and not be deleted.
    pub async fn add_comment(
        &self,
        story_id: Uuid,
        author_id: Uuid,
        body: &str,
        parent_id: Option<Uuid>,
    ) -> Result<Comment> {
        let story = self
            .repo
            .find_story_by_id(story_id)
            .await?
            .ok_or_else(|| AppError::StoryNotFound {
                id: story_id.to_string(),
            })?;

        if story.story_status() != StoryStatus::Published {
            return Err(AppError::validation(
                "story_id",
                "Comments are only allowed on published stories",
            ));
        }

        let body = self.policy.validate_body(body)?;

        if let Some(parent_id) = parent_id {
            // Deleted comments stay in the arena so parent chains keep their
            // length; depth must be computed over the full set.
            let all = self.repo.list_comments_for_story(story_id, true).await?;
            validate_reply_target(&all, parent_id, self.policy.max_depth)?;
        }

        let comment = self
            .repo
            .create_comment(story_id, author_id, parent_id, body)
            .await?;

        info!(
            comment_id = %comment.id,
            story_id = %story_id,
            parent_id = ?parent_id,
            "Comment created"
        );
        metrics::counter!("storyhaven_comments_created_total").increment(1);

        Ok(comment)
    }

    /// Edit a comment's body.
    ///
    /// Only the author or staff may edit; anyone else gets
    /// `EditOutcome::Denied` with no mutation. A successful edit increments
    /// the edit counter and bumps the modified timestamp.
    pub async fn edit_comment(
        &self,
        comment_id: Uuid,
        actor: &Actor,
        new_body: &str,
    ) -> Result<EditOutcome> {
        let comment = self
            .repo
            .find_comment_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::CommentNotFound {
                id: comment_id.to_string(),
            })?;

        if !can_edit(&comment, Some(actor)) {
            return Ok(EditOutcome::Denied);
        }

        let body = self.policy.validate_body(new_body)?;
        let updated = self.repo.update_comment_body(comment_id, body).await?;

        info!(comment_id = %comment_id, edited_count = updated.edited_count, "Comment edited");
        Ok(EditOutcome::Updated(updated))
    }

    /// Soft-delete a comment: hide it behind the deleted placeholder while
    /// keeping its row and tree position so replies are not orphaned.
    ///
    /// The original text is overwritten, not preserved.
    pub async fn soft_delete(&self, comment_id: Uuid) -> Result<Comment> {
        let comment = self
            .repo
            .set_comment_deleted(comment_id, true, DELETED_PLACEHOLDER.to_string())
            .await?;

        info!(comment_id = %comment_id, "Comment soft-deleted");
        Ok(comment)
    }

    /// Restore a soft-deleted comment.
    ///
    /// The pre-delete text is gone, so the body becomes the restored
    /// placeholder; restoring a never-deleted comment is a no-op.
    pub async fn restore(&self, comment_id: Uuid) -> Result<Comment> {
        let comment = self
            .repo
            .find_comment_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::CommentNotFound {
                id: comment_id.to_string(),
            })?;

        if !comment.is_deleted {
            return Ok(comment);
        }

        let restored = self
            .repo
            .set_comment_deleted(comment_id, false, restored_body(&comment.body))
            .await?;

        info!(comment_id = %comment_id, "Comment restored");
        Ok(restored)
    }

    /// Flat, creation-ordered comment list for a story; callers assemble the
    /// tree with [`build_tree`]
    pub async fn list_for_story(
        &self,
        story_id: Uuid,
        include_deleted: bool,
    ) -> Result<Vec<Comment>> {
        self.repo
            .list_comments_for_story(story_id, include_deleted)
            .await
    }

    /// A user's comments, newest first
    pub async fn list_for_author(
        &self,
        author_id: Uuid,
        include_deleted: bool,
    ) -> Result<Vec<Comment>> {
        self.repo
            .list_comments_for_author(author_id, include_deleted)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use chrono::{Duration, Utc};

    fn comment(id: Uuid, parent_id: Option<Uuid>, offset_secs: i64) -> Comment {
        let at = Utc::now() + Duration::seconds(offset_secs);
        Comment {
            id,
            story_id: Uuid::nil(),
            parent_id,
            author_id: Uuid::new_v4(),
            body: "Nice story!".to_string(),
            created_at: at.into(),
            updated_at: at.into(),
            is_deleted: false,
            edited_count: 0,
        }
    }

    /// A single parent chain: chain[i] sits at depth i
    fn chain(len: usize) -> Vec<Comment> {
        let mut comments = vec![comment(Uuid::new_v4(), None, 0)];
        for i in 1..len {
            let parent = comments[i - 1].id;
            comments.push(comment(Uuid::new_v4(), Some(parent), i as i64));
        }
        comments
    }

    #[test]
    fn test_restore_substitutes_placeholder() {
        assert_eq!(restored_body(DELETED_PLACEHOLDER), RESTORED_PLACEHOLDER);
    }

    #[test]
    fn test_restore_never_recovers_original_text() {
        // Soft delete replaced the body, so a delete-then-restore round trip
        // ends at the restored placeholder, never the pre-delete text
        let after_delete = DELETED_PLACEHOLDER;
        let after_restore = restored_body(after_delete);
        assert_eq!(after_restore, RESTORED_PLACEHOLDER);
        assert_ne!(after_restore, "Nice story!");
    }

    #[test]
    fn test_restore_keeps_unexpected_body() {
        assert_eq!(restored_body("Still here"), "Still here");
    }

    #[test]
    fn test_reply_allowed_below_depth_limit() {
        let comments = chain(5);
        // parent at depth 4, reply would land at depth 5
        assert!(validate_reply_target(&comments, comments[4].id, 5).is_ok());
    }

    #[test]
    fn test_reply_under_deepest_comment_rejected() {
        let comments = chain(6);
        // parent at depth 5, at the limit
        let err = validate_reply_target(&comments, comments[5].id, 5).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MaxDepthExceeded);
        assert_eq!(err.field(), Some("parent_id"));
    }

    #[test]
    fn test_reply_to_deleted_parent_rejected() {
        let mut comments = chain(2);
        comments[1].is_deleted = true;
        let parent_id = comments[1].id;
        let err = validate_reply_target(&comments, parent_id, 5).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(err.field(), Some("parent_id"));
    }

    #[test]
    fn test_reply_to_missing_parent_rejected() {
        let comments = chain(1);
        let err = validate_reply_target(&comments, Uuid::new_v4(), 5).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }
}
