//! Story management handlers
//!
//! Ownership is checked here, before any lifecycle transition is invoked;
//! the controller itself never looks at who is acting.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::actor::ActorContext;
use crate::AppState;
use storyhaven_common::{
    db::models::{Story, StoryStatus},
    errors::{AppError, Result},
    tags, Actor, Transition, TransitionOutcome,
};

/// Request to create a new story (always created as a draft)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStoryRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[serde(default)]
    pub summary: String,

    #[validate(length(min = 1, message = "Story text cannot be empty"))]
    pub body: String,

    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Story representation returned by the API
#[derive(Serialize)]
pub struct StoryResponse {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub author_id: Uuid,
    pub status: String,
    pub tags: Vec<String>,
    pub views_count: i64,
    pub popularity: String,
    pub is_popular: bool,
    pub is_trending: bool,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_viewed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purge_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until_purge: Option<i64>,
}

impl StoryResponse {
    fn from_story(story: Story) -> Self {
        let now = chrono::Utc::now();
        Self {
            days_until_purge: story.days_until_purge(now),
            popularity: story.popularity_level().as_str().to_string(),
            is_popular: story.is_popular(),
            is_trending: story.is_trending(now),
            tags: story.tags_list(),
            id: story.id,
            title: story.title,
            summary: story.summary,
            body: story.body,
            author_id: story.author_id,
            status: story.status,
            views_count: story.views_count,
            created_at: story.created_at.to_rfc3339(),
            updated_at: story.updated_at.to_rfc3339(),
            last_viewed_at: story.last_viewed_at.map(|dt| dt.to_rfc3339()),
            deleted_at: story.deleted_at.map(|dt| dt.to_rfc3339()),
            purge_at: story.purge_at.map(|dt| dt.to_rfc3339()),
            archived_at: story.archived_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

/// Response for lifecycle transitions; carries the idempotent-no-op warning
#[derive(Serialize)]
pub struct TransitionResponse {
    pub story: StoryResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Create a new draft story
pub async fn create_story(
    State(state): State<AppState>,
    actor: ActorContext,
    Json(request): Json<CreateStoryRequest>,
) -> Result<(StatusCode, Json<StoryResponse>)> {
    let actor = actor.require()?;

    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let tags_column = match &request.tags {
        Some(raw) => {
            if raw.len() > state.config.content.max_tags {
                return Err(AppError::validation(
                    "tags",
                    format!("Maximum number of tags is {}", state.config.content.max_tags),
                ));
            }
            let normalized = tags::join(raw);
            if normalized.is_empty() {
                return Err(AppError::validation("tags", "Enter at least one tag"));
            }
            normalized
        }
        None => String::new(),
    };

    let story = state
        .repo
        .create_story(
            actor.id,
            request.title.trim().to_string(),
            request.summary.trim().to_string(),
            request.body,
            tags_column,
        )
        .await?;

    tracing::info!(
        story_id = %story.id,
        author_id = %actor.id,
        title = %story.title,
        "Story created"
    );

    Ok((StatusCode::CREATED, Json(StoryResponse::from_story(story))))
}

/// Get a story by ID
pub async fn get_story(
    State(state): State<AppState>,
    Path(story_id): Path<Uuid>,
) -> Result<Json<StoryResponse>> {
    let story = state
        .repo
        .find_story_by_id(story_id)
        .await?
        .ok_or_else(|| AppError::StoryNotFound {
            id: story_id.to_string(),
        })?;

    Ok(Json(StoryResponse::from_story(story)))
}

/// Count a view; authenticated viewers also get a history entry
pub async fn record_view(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(story_id): Path<Uuid>,
) -> Result<Json<StoryResponse>> {
    let story = state
        .lifecycle
        .increment_views(story_id, actor.0.map(|a| a.id))
        .await?;

    Ok(Json(StoryResponse::from_story(story)))
}

#[derive(Serialize)]
pub struct ViewHistoryEntry {
    pub story_id: Uuid,
    pub viewed_at: String,
}

/// A user's reading history, most recent first.
///
/// Only visible to the user themself or staff.
pub async fn view_history(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<ViewHistoryEntry>>> {
    let actor = actor.require()?;

    if actor.id != user_id && !actor.is_staff {
        return Err(AppError::Forbidden {
            message: "You cannot view another user's history".to_string(),
        });
    }

    let entries = state.repo.list_view_history(user_id).await?;

    Ok(Json(
        entries
            .into_iter()
            .map(|entry| ViewHistoryEntry {
                story_id: entry.story_id,
                viewed_at: entry.viewed_at.to_rfc3339(),
            })
            .collect(),
    ))
}

/// Shared ownership check + transition runner
async fn run_transition(
    state: &AppState,
    actor: Actor,
    story_id: Uuid,
    op: Transition,
) -> Result<Json<TransitionResponse>> {
    require_ownership(state, story_id, &actor).await?;

    let outcome = state.lifecycle.transition(story_id, op).await?;

    let warning = match &outcome {
        TransitionOutcome::Noop(story) => Some(format!(
            "Story is already in the {} state",
            story.status
        )),
        TransitionOutcome::Applied(_) => None,
    };

    Ok(Json(TransitionResponse {
        story: StoryResponse::from_story(outcome.into_story()),
        warning,
    }))
}

/// The acting user must own the story (or be staff)
async fn require_ownership(state: &AppState, story_id: Uuid, actor: &Actor) -> Result<Story> {
    let story = state
        .repo
        .find_story_by_id(story_id)
        .await?
        .ok_or_else(|| AppError::StoryNotFound {
            id: story_id.to_string(),
        })?;

    if story.author_id != actor.id && !actor.is_staff {
        return Err(AppError::Forbidden {
            message: "Only the story's author can do that".to_string(),
        });
    }

    Ok(story)
}

macro_rules! transition_handler {
    ($name:ident, $op:expr) => {
        pub async fn $name(
            State(state): State<AppState>,
            actor: ActorContext,
            Path(story_id): Path<Uuid>,
        ) -> Result<Json<TransitionResponse>> {
            let actor = actor.require()?;
            run_transition(&state, actor, story_id, $op).await
        }
    };
}

transition_handler!(publish, Transition::Publish);
transition_handler!(archive, Transition::MoveToArchive);
transition_handler!(trash, Transition::MoveToTrash);
transition_handler!(restore_from_archive, Transition::RestoreFromArchive);
transition_handler!(restore_from_trash, Transition::RestoreFromTrash);
transition_handler!(publish_from_archive, Transition::PublishFromArchive);

/// Permanently delete a story.
///
/// Only reachable from the trash; the owner may do this before the purge
/// timer elapses.
pub async fn delete_story(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(story_id): Path<Uuid>,
) -> Result<StatusCode> {
    let actor = actor.require()?;
    let story = require_ownership(&state, story_id, &actor).await?;

    if story.story_status() != StoryStatus::Trashed {
        return Err(AppError::InvalidTransition {
            from: story.status,
            operation: "permanently_delete".to_string(),
        });
    }

    state.lifecycle.permanently_delete(story_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
