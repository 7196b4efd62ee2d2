//! Comment thread handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actor::ActorContext;
use crate::AppState;
use storyhaven_common::{
    comments::{can_delete, can_edit, tree},
    db::models::Comment,
    errors::{AppError, Result},
    EditOutcome,
};

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub body: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct EditCommentRequest {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ListCommentsQuery {
    #[serde(default)]
    pub include_deleted: bool,
}

#[derive(Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub story_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub author_id: Uuid,
    pub body: String,
    pub is_deleted: bool,
    pub is_edited: bool,
    pub edited_count: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            is_edited: comment.is_edited(),
            id: comment.id,
            story_id: comment.story_id,
            parent_id: comment.parent_id,
            author_id: comment.author_id,
            body: comment.body,
            is_deleted: comment.is_deleted,
            edited_count: comment.edited_count,
            created_at: comment.created_at.to_rfc3339(),
            updated_at: comment.updated_at.to_rfc3339(),
        }
    }
}

/// Edit result; an edit by someone without permission is reported here,
/// not as an error
#[derive(Serialize)]
pub struct EditCommentResponse {
    pub updated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<CommentResponse>,
}

#[derive(Serialize)]
pub struct CommentTreeResponse {
    pub story_id: Uuid,
    pub total: usize,
    pub comments: Vec<tree::CommentNode>,
}

/// Post a comment on a published story
pub async fn create_comment(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(story_id): Path<Uuid>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>)> {
    let actor = actor.require()?;

    let comment = state
        .comments
        .add_comment(story_id, actor.id, &request.body, request.parent_id)
        .await?;

    Ok((StatusCode::CREATED, Json(comment.into())))
}

/// Threaded comment tree for a story, roots in posting order
pub async fn list_comments(
    State(state): State<AppState>,
    Path(story_id): Path<Uuid>,
    Query(query): Query<ListCommentsQuery>,
) -> Result<Json<CommentTreeResponse>> {
    // Verify the story exists so a bad ID is a 404, not an empty tree
    state
        .repo
        .find_story_by_id(story_id)
        .await?
        .ok_or_else(|| AppError::StoryNotFound {
            id: story_id.to_string(),
        })?;

    let comments = state
        .comments
        .list_for_story(story_id, query.include_deleted)
        .await?;

    Ok(Json(CommentTreeResponse {
        story_id,
        total: comments.len(),
        comments: tree::build_tree(&comments),
    }))
}

/// Flat list of a user's comments, newest first
pub async fn list_author_comments(
    State(state): State<AppState>,
    Path(author_id): Path<Uuid>,
) -> Result<Json<Vec<CommentResponse>>> {
    let comments = state.comments.list_for_author(author_id, false).await?;
    Ok(Json(comments.into_iter().map(Into::into).collect()))
}

/// Edit a comment's text
pub async fn edit_comment(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(comment_id): Path<Uuid>,
    Json(request): Json<EditCommentRequest>,
) -> Result<Json<EditCommentResponse>> {
    let actor = actor.require()?;

    let outcome = state
        .comments
        .edit_comment(comment_id, &actor, &request.body)
        .await?;

    let response = match outcome {
        EditOutcome::Updated(comment) => EditCommentResponse {
            updated: true,
            comment: Some(comment.into()),
        },
        EditOutcome::Denied => {
            tracing::warn!(
                comment_id = %comment_id,
                user_id = %actor.id,
                "Edit denied: not the comment's author"
            );
            EditCommentResponse {
                updated: false,
                comment: None,
            }
        }
    };

    Ok(Json(response))
}

/// Soft-delete a comment, replacing its text with a placeholder
pub async fn delete_comment(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(comment_id): Path<Uuid>,
) -> Result<Json<CommentResponse>> {
    let actor = actor.require()?;

    let comment = state
        .repo
        .find_comment_by_id(comment_id)
        .await?
        .ok_or_else(|| AppError::CommentNotFound {
            id: comment_id.to_string(),
        })?;

    let story = state
        .repo
        .find_story_by_id(comment.story_id)
        .await?
        .ok_or_else(|| AppError::StoryNotFound {
            id: comment.story_id.to_string(),
        })?;

    if !can_delete(&comment, story.author_id, Some(&actor)) {
        return Err(AppError::Forbidden {
            message: "You cannot delete this comment".to_string(),
        });
    }

    let deleted = state.comments.soft_delete(comment_id).await?;
    Ok(Json(deleted.into()))
}

/// Restore a soft-deleted comment.
///
/// The original text is gone; the restored comment carries a placeholder.
pub async fn restore_comment(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(comment_id): Path<Uuid>,
) -> Result<Json<CommentResponse>> {
    let actor = actor.require()?;

    let comment = state
        .repo
        .find_comment_by_id(comment_id)
        .await?
        .ok_or_else(|| AppError::CommentNotFound {
            id: comment_id.to_string(),
        })?;

    if !can_edit(&comment, Some(&actor)) {
        return Err(AppError::Forbidden {
            message: "You cannot restore this comment".to_string(),
        });
    }

    let restored = state.comments.restore(comment_id).await?;
    Ok(Json(restored.into()))
}
