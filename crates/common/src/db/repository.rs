//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations. Each operation
//! runs within a single request-scoped unit of work; the only operation with
//! a concurrency hazard is the view counter, which uses an atomic in-database
//! increment rather than read-modify-write.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use crate::lifecycle::StateChange;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbBackend, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, Statement,
};
use uuid::Uuid;

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Story Operations
    // ========================================================================

    /// Create a new story in draft status
    pub async fn create_story(
        &self,
        author_id: Uuid,
        title: String,
        summary: String,
        body: String,
        tags: String,
    ) -> Result<Story> {
        let now = chrono::Utc::now();

        let story = StoryActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title),
            summary: Set(summary),
            body: Set(body),
            author_id: Set(author_id),
            status: Set(String::from(StoryStatus::Draft)),
            tags: Set(tags),
            views_count: Set(0),
            last_viewed_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
            purge_at: Set(None),
            archived_at: Set(None),
        };

        story.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find story by ID
    pub async fn find_story_by_id(&self, id: Uuid) -> Result<Option<Story>> {
        StoryEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Persist a lifecycle state change produced by `lifecycle::apply`.
    ///
    /// The change carries the full new value of the status column and all
    /// three lifecycle timestamps; nothing else writes those fields.
    pub async fn apply_state_change(&self, id: Uuid, change: &StateChange) -> Result<Story> {
        let mut story: StoryActiveModel = StoryEntity::find_by_id(id)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::StoryNotFound { id: id.to_string() })?
            .into();

        story.status = Set(String::from(change.status));
        story.deleted_at = Set(change.deleted_at.map(Into::into));
        story.purge_at = Set(change.purge_at.map(Into::into));
        story.archived_at = Set(change.archived_at.map(Into::into));
        story.updated_at = Set(chrono::Utc::now().into());

        story.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Permanently delete a story row.
    ///
    /// Dependent comments, bookmarks and view history are removed by the
    /// schema's ON DELETE CASCADE foreign keys (see migrations/0001_init.sql).
    pub async fn delete_story(&self, id: Uuid) -> Result<bool> {
        let result = StoryEntity::delete_by_id(id).exec(self.write_conn()).await?;

        Ok(result.rows_affected > 0)
    }

    /// Atomically increment the view counter and stamp the last view time.
    ///
    /// Uses an in-database increment so concurrent viewers never lose
    /// updates; a fetch-then-write here would race.
    pub async fn increment_views(&self, id: Uuid) -> Result<Story> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            UPDATE stories
            SET views_count = views_count + 1, last_viewed_at = NOW()
            WHERE id = $1
            "#,
            vec![id.into()],
        );

        use sea_orm::ConnectionTrait;
        let result = self.write_conn().execute(stmt).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::StoryNotFound { id: id.to_string() });
        }

        self.find_story_by_id(id)
            .await?
            .ok_or_else(|| AppError::StoryNotFound { id: id.to_string() })
    }

    /// All trashed stories whose retention window has elapsed
    pub async fn find_purgeable(&self, now: DateTime<Utc>) -> Result<Vec<Story>> {
        StoryEntity::find()
            .filter(StoryColumn::Status.eq(StoryStatus::Trashed.as_str()))
            .filter(StoryColumn::PurgeAt.lte(now))
            .order_by_asc(StoryColumn::PurgeAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Comment Operations
    // ========================================================================

    /// Create a comment row
    pub async fn create_comment(
        &self,
        story_id: Uuid,
        author_id: Uuid,
        parent_id: Option<Uuid>,
        body: String,
    ) -> Result<Comment> {
        let now = chrono::Utc::now();

        let comment = CommentActiveModel {
            id: Set(Uuid::new_v4()),
            story_id: Set(story_id),
            parent_id: Set(parent_id),
            author_id: Set(author_id),
            body: Set(body),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            is_deleted: Set(false),
            edited_count: Set(0),
        };

        comment.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find comment by ID
    pub async fn find_comment_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        CommentEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// All comments for a story, oldest first (tree assembly is the caller's
    /// concern, see `comments::tree`)
    pub async fn list_comments_for_story(
        &self,
        story_id: Uuid,
        include_deleted: bool,
    ) -> Result<Vec<Comment>> {
        let mut query = CommentEntity::find().filter(CommentColumn::StoryId.eq(story_id));

        if !include_deleted {
            query = query.filter(CommentColumn::IsDeleted.eq(false));
        }

        query
            .order_by_asc(CommentColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// All comments by an author, newest first
    pub async fn list_comments_for_author(
        &self,
        author_id: Uuid,
        include_deleted: bool,
    ) -> Result<Vec<Comment>> {
        let mut query = CommentEntity::find().filter(CommentColumn::AuthorId.eq(author_id));

        if !include_deleted {
            query = query.filter(CommentColumn::IsDeleted.eq(false));
        }

        query
            .order_by_desc(CommentColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Update a comment body, bumping the edit counter and modified time
    pub async fn update_comment_body(&self, id: Uuid, body: String) -> Result<Comment> {
        let existing = self
            .find_comment_by_id(id)
            .await?
            .ok_or_else(|| AppError::CommentNotFound { id: id.to_string() })?;

        let edited_count = existing.edited_count + 1;
        let mut comment: CommentActiveModel = existing.into();
        comment.body = Set(body);
        comment.edited_count = Set(edited_count);
        comment.updated_at = Set(chrono::Utc::now().into());

        comment.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Flip the deleted flag, swapping in the given placeholder body.
    /// Does not touch the edit counter; a delete is not an edit.
    pub async fn set_comment_deleted(
        &self,
        id: Uuid,
        is_deleted: bool,
        body: String,
    ) -> Result<Comment> {
        let existing = self
            .find_comment_by_id(id)
            .await?
            .ok_or_else(|| AppError::CommentNotFound { id: id.to_string() })?;

        let mut comment: CommentActiveModel = existing.into();
        comment.is_deleted = Set(is_deleted);
        comment.body = Set(body);
        comment.updated_at = Set(chrono::Utc::now().into());

        comment.update(self.write_conn()).await.map_err(Into::into)
    }

    // ========================================================================
    // View History Operations
    // ========================================================================

    /// Record that a viewer saw a story just now.
    ///
    /// Keyed on the (user, story) uniqueness constraint: insert if absent,
    /// refresh `viewed_at` if present (most-recent-wins).
    pub async fn upsert_view_history(&self, user_id: Uuid, story_id: Uuid) -> Result<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            INSERT INTO view_history (id, user_id, story_id, viewed_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id, story_id) DO UPDATE SET
                viewed_at = EXCLUDED.viewed_at
            "#,
            vec![Uuid::new_v4().into(), user_id.into(), story_id.into()],
        );

        use sea_orm::ConnectionTrait;
        self.write_conn().execute(stmt).await?;
        Ok(())
    }

    /// A user's view history, most recent first
    pub async fn list_view_history(&self, user_id: Uuid) -> Result<Vec<ViewHistory>> {
        ViewHistoryEntity::find()
            .filter(ViewHistoryColumn::UserId.eq(user_id))
            .order_by_desc(ViewHistoryColumn::ViewedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Bookmark Operations
    // ========================================================================

    /// Add a bookmark, or refresh the notes of an existing one.
    ///
    /// Keyed on the (user, story) uniqueness constraint so re-bookmarking is
    /// idempotent rather than a constraint violation; absent notes keep
    /// whatever was stored.
    pub async fn upsert_bookmark(
        &self,
        user_id: Uuid,
        story_id: Uuid,
        notes: Option<String>,
    ) -> Result<Bookmark> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            INSERT INTO bookmarks (id, user_id, story_id, notes, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (user_id, story_id) DO UPDATE SET
                notes = COALESCE(EXCLUDED.notes, bookmarks.notes)
            RETURNING id, user_id, story_id, notes, created_at
            "#,
            vec![
                Uuid::new_v4().into(),
                user_id.into(),
                story_id.into(),
                notes.into(),
            ],
        );

        BookmarkEntity::find()
            .from_raw_sql(stmt)
            .one(self.write_conn())
            .await?
            .ok_or_else(|| AppError::Internal {
                message: "Bookmark upsert returned no row".to_string(),
            })
    }

    /// Remove a user's bookmark for a story
    pub async fn delete_bookmark(&self, user_id: Uuid, story_id: Uuid) -> Result<bool> {
        let result = BookmarkEntity::delete_many()
            .filter(BookmarkColumn::UserId.eq(user_id))
            .filter(BookmarkColumn::StoryId.eq(story_id))
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Number of users who bookmarked a story
    pub async fn count_bookmarks(&self, story_id: Uuid) -> Result<u64> {
        BookmarkEntity::find()
            .filter(BookmarkColumn::StoryId.eq(story_id))
            .count(self.read_conn())
            .await
            .map_err(Into::into)
    }
}
