//! Bookmark handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actor::ActorContext;
use crate::AppState;
use storyhaven_common::errors::{AppError, Result};

#[derive(Debug, Deserialize, Default)]
pub struct CreateBookmarkRequest {
    pub notes: Option<String>,
}

#[derive(Serialize)]
pub struct BookmarkResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub story_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct BookmarkCountResponse {
    pub story_id: Uuid,
    pub bookmarks: u64,
}

/// Bookmark a story; one bookmark per (user, story), so bookmarking again
/// just refreshes the notes
pub async fn create_bookmark(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(story_id): Path<Uuid>,
    Json(request): Json<CreateBookmarkRequest>,
) -> Result<Json<BookmarkResponse>> {
    let actor = actor.require()?;

    state
        .repo
        .find_story_by_id(story_id)
        .await?
        .ok_or_else(|| AppError::StoryNotFound {
            id: story_id.to_string(),
        })?;

    let bookmark = state
        .repo
        .upsert_bookmark(actor.id, story_id, request.notes)
        .await?;

    Ok(Json(BookmarkResponse {
        id: bookmark.id,
        user_id: bookmark.user_id,
        story_id: bookmark.story_id,
        notes: bookmark.notes,
        created_at: bookmark.created_at.to_rfc3339(),
    }))
}

/// Remove the caller's bookmark for a story
pub async fn delete_bookmark(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(story_id): Path<Uuid>,
) -> Result<StatusCode> {
    let actor = actor.require()?;

    let removed = state.repo.delete_bookmark(actor.id, story_id).await?;
    if !removed {
        return Err(AppError::NotFound {
            resource_type: "bookmark".to_string(),
            id: story_id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

/// How many users bookmarked a story
pub async fn count_bookmarks(
    State(state): State<AppState>,
    Path(story_id): Path<Uuid>,
) -> Result<Json<BookmarkCountResponse>> {
    let bookmarks = state.repo.count_bookmarks(story_id).await?;

    Ok(Json(BookmarkCountResponse {
        story_id,
        bookmarks,
    }))
}
