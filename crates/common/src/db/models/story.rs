//! Story entity and its derived queries
//!
//! The status column drives the trash/archive lifecycle; its timestamps
//! (`deleted_at`, `purge_at`, `archived_at`) are only ever written through
//! `lifecycle::apply` so the invariants of the state machine hold:
//! at most one of {deleted_at, archived_at} set, and `purge_at` set iff the
//! story is trashed.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Story lifecycle status
///
/// `Trashed` keeps its original wire name `deleted` (display name on the site
/// was "deleted", pending purge).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryStatus {
    Draft,
    Published,
    Archived,
    #[serde(rename = "deleted")]
    Trashed,
}

impl StoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryStatus::Draft => "draft",
            StoryStatus::Published => "published",
            StoryStatus::Archived => "archived",
            StoryStatus::Trashed => "deleted",
        }
    }
}

impl From<String> for StoryStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "published" => StoryStatus::Published,
            "archived" => StoryStatus::Archived,
            "deleted" => StoryStatus::Trashed,
            _ => StoryStatus::Draft,
        }
    }
}

impl From<StoryStatus> for String {
    fn from(status: StoryStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for StoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Popularity tier derived from the view counter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopularityLevel {
    Fresh,
    New,
    Trending,
    Hot,
    Viral,
}

impl PopularityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PopularityLevel::Fresh => "fresh",
            PopularityLevel::New => "new",
            PopularityLevel::Trending => "trending",
            PopularityLevel::Hot => "hot",
            PopularityLevel::Viral => "viral",
        }
    }
}

/// Classify a view count into a popularity tier.
/// Boundaries are inclusive-lower: a count exactly at a threshold belongs to
/// the higher tier.
pub fn popularity_level(views_count: i64) -> PopularityLevel {
    if views_count >= 1000 {
        PopularityLevel::Viral
    } else if views_count >= 500 {
        PopularityLevel::Hot
    } else if views_count >= 100 {
        PopularityLevel::Trending
    } else if views_count >= 10 {
        PopularityLevel::New
    } else {
        PopularityLevel::Fresh
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub summary: String,

    #[sea_orm(column_type = "Text")]
    pub body: String,

    pub author_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub status: String,

    /// Comma-joined, lowercased, deduplicated tag list
    #[sea_orm(column_type = "Text")]
    pub tags: String,

    pub views_count: i64,

    pub last_viewed_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,

    pub deleted_at: Option<DateTimeWithTimeZone>,

    pub purge_at: Option<DateTimeWithTimeZone>,

    pub archived_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Get the lifecycle status as an enum
    pub fn story_status(&self) -> StoryStatus {
        StoryStatus::from(self.status.clone())
    }

    /// Get the tag list
    pub fn tags_list(&self) -> Vec<String> {
        crate::tags::parse(&self.tags)
    }

    /// Popularity tier for this story
    pub fn popularity_level(&self) -> PopularityLevel {
        popularity_level(self.views_count)
    }

    /// A story is popular once it reaches 100 views
    pub fn is_popular(&self) -> bool {
        self.views_count >= 100
    }

    /// Gaining traction: at least 50 views within a week of creation
    pub fn is_trending(&self, now: DateTime<Utc>) -> bool {
        if self.views_count < 50 {
            return false;
        }
        (now - self.created_at.with_timezone(&Utc)).num_days() <= 7
    }

    /// Days remaining until the story is purged from the trash.
    ///
    /// Ceiling of the remaining time in whole days, floored at 0. Only
    /// meaningful while trashed; `None` otherwise.
    pub fn days_until_purge(&self, now: DateTime<Utc>) -> Option<i64> {
        if self.story_status() != StoryStatus::Trashed {
            return None;
        }
        let purge_at = self.purge_at?;
        let remaining = purge_at.with_timezone(&Utc) - now;
        if remaining <= chrono::Duration::zero() {
            return Some(0);
        }
        let whole_days = remaining.num_days();
        let days = if remaining - chrono::Duration::days(whole_days) > chrono::Duration::zero() {
            whole_days + 1
        } else {
            whole_days
        };
        Some(days)
    }

    /// Whether the retention window has elapsed and the story may be purged
    pub fn should_purge(&self, now: DateTime<Utc>) -> bool {
        match (self.story_status(), self.purge_at) {
            (StoryStatus::Trashed, Some(purge_at)) => now >= purge_at.with_timezone(&Utc),
            _ => false,
        }
    }

    /// Whole days spent in the archive; `None` outside the archived status
    pub fn time_in_archive(&self, now: DateTime<Utc>) -> Option<i64> {
        match (self.story_status(), self.archived_at) {
            (StoryStatus::Archived, Some(archived_at)) => {
                Some((now - archived_at.with_timezone(&Utc)).num_days())
            }
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comment::Entity", on_delete = "Cascade")]
    Comments,

    #[sea_orm(has_many = "super::bookmark::Entity", on_delete = "Cascade")]
    Bookmarks,

    #[sea_orm(has_many = "super::view_history::Entity", on_delete = "Cascade")]
    ViewHistory,
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::bookmark::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookmarks.def()
    }
}

impl Related<super::view_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ViewHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_story(status: StoryStatus) -> Model {
        let now = Utc::now();
        Model {
            id: Uuid::new_v4(),
            title: "Test story".to_string(),
            summary: String::new(),
            body: "Once upon a time...".to_string(),
            author_id: Uuid::new_v4(),
            status: String::from(status),
            tags: "fantasy, romance".to_string(),
            views_count: 0,
            last_viewed_at: None,
            created_at: now.into(),
            updated_at: now.into(),
            deleted_at: None,
            purge_at: None,
            archived_at: None,
        }
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            StoryStatus::Draft,
            StoryStatus::Published,
            StoryStatus::Archived,
            StoryStatus::Trashed,
        ] {
            assert_eq!(StoryStatus::from(String::from(status)), status);
        }
        // Trashed keeps the original wire name
        assert_eq!(String::from(StoryStatus::Trashed), "deleted");
    }

    #[test]
    fn test_popularity_boundaries() {
        assert_eq!(popularity_level(0), PopularityLevel::Fresh);
        assert_eq!(popularity_level(9), PopularityLevel::Fresh);
        assert_eq!(popularity_level(10), PopularityLevel::New);
        assert_eq!(popularity_level(99), PopularityLevel::New);
        assert_eq!(popularity_level(100), PopularityLevel::Trending);
        assert_eq!(popularity_level(499), PopularityLevel::Trending);
        assert_eq!(popularity_level(500), PopularityLevel::Hot);
        assert_eq!(popularity_level(999), PopularityLevel::Hot);
        assert_eq!(popularity_level(1000), PopularityLevel::Viral);
    }

    #[test]
    fn test_is_popular() {
        let mut story = test_story(StoryStatus::Published);
        story.views_count = 99;
        assert!(!story.is_popular());
        story.views_count = 100;
        assert!(story.is_popular());
    }

    #[test]
    fn test_is_trending_needs_views_and_recency() {
        let now = Utc::now();

        let mut story = test_story(StoryStatus::Published);
        story.views_count = 50;
        story.created_at = (now - Duration::days(3)).into();
        assert!(story.is_trending(now));

        story.views_count = 49;
        assert!(!story.is_trending(now));

        story.views_count = 500;
        story.created_at = (now - Duration::days(8)).into();
        assert!(!story.is_trending(now));
    }

    #[test]
    fn test_days_until_purge_full_window() {
        let now = Utc::now();
        let mut story = test_story(StoryStatus::Trashed);
        story.deleted_at = Some(now.into());
        story.purge_at = Some((now + Duration::days(30)).into());
        assert_eq!(story.days_until_purge(now), Some(30));
    }

    #[test]
    fn test_days_until_purge_rounds_up() {
        let now = Utc::now();
        let mut story = test_story(StoryStatus::Trashed);
        story.deleted_at = Some((now - Duration::days(26)).into());
        story.purge_at = Some((now + Duration::days(4) + Duration::hours(3)).into());
        // 4 days and change rounds up to 5
        assert_eq!(story.days_until_purge(now), Some(5));
    }

    #[test]
    fn test_days_until_purge_never_negative() {
        let now = Utc::now();
        let mut story = test_story(StoryStatus::Trashed);
        story.deleted_at = Some((now - Duration::days(40)).into());
        story.purge_at = Some((now - Duration::days(10)).into());
        assert_eq!(story.days_until_purge(now), Some(0));
    }

    #[test]
    fn test_days_until_purge_only_when_trashed() {
        let now = Utc::now();
        let mut story = test_story(StoryStatus::Published);
        story.purge_at = Some((now + Duration::days(5)).into());
        assert_eq!(story.days_until_purge(now), None);
    }

    #[test]
    fn test_should_purge() {
        let now = Utc::now();
        let mut story = test_story(StoryStatus::Trashed);
        story.deleted_at = Some(now.into());
        story.purge_at = Some((now + Duration::days(30)).into());
        assert!(!story.should_purge(now));
        assert!(story.should_purge(now + Duration::days(30)));
        assert!(story.should_purge(now + Duration::days(31)));
    }

    #[test]
    fn test_time_in_archive() {
        let now = Utc::now();
        let mut story = test_story(StoryStatus::Archived);
        story.archived_at = Some((now - Duration::days(12)).into());
        assert_eq!(story.time_in_archive(now), Some(12));

        let draft = test_story(StoryStatus::Draft);
        assert_eq!(draft.time_in_archive(now), None);
    }

    #[test]
    fn test_tags_list() {
        let story = test_story(StoryStatus::Draft);
        assert_eq!(story.tags_list(), vec!["fantasy", "romance"]);
    }
}
