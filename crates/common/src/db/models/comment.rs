//! Comment entity
//!
//! Comments form a tree via the nullable `parent_id` self-reference, stored
//! arena style (flat table keyed by id); tree shape is computed lazily by
//! grouping, see `comments::tree`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Body shown in place of a soft-deleted comment. The original text is
/// overwritten, not stashed.
pub const DELETED_PLACEHOLDER: &str = "[comment deleted]";

/// Body substituted on restore. Soft-delete is destructive, so restore cannot
/// bring the original text back; the asymmetry is deliberate.
pub const RESTORED_PLACEHOLDER: &str = "[comment restored]";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub story_id: Uuid,

    pub parent_id: Option<Uuid>,

    pub author_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub body: String,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,

    pub is_deleted: bool,

    pub edited_count: i32,
}

impl Model {
    /// Whether this comment starts a thread (no parent)
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether the comment has been edited since creation
    pub fn is_edited(&self) -> bool {
        self.edited_count > 0 || self.created_at < self.updated_at
    }

    /// Body for display, masking deleted comments
    pub fn display_content(&self) -> &str {
        if self.is_deleted {
            DELETED_PLACEHOLDER
        } else {
            &self.body
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::story::Entity",
        from = "Column::StoryId",
        to = "super::story::Column::Id"
    )]
    Story,

    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id"
    )]
    Parent,
}

impl Related<super::story::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Story.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_comment() -> Model {
        let now = Utc::now();
        Model {
            id: Uuid::new_v4(),
            story_id: Uuid::new_v4(),
            parent_id: None,
            author_id: Uuid::new_v4(),
            body: "Nice story!".to_string(),
            created_at: now.into(),
            updated_at: now.into(),
            is_deleted: false,
            edited_count: 0,
        }
    }

    #[test]
    fn test_is_root() {
        let mut comment = test_comment();
        assert!(comment.is_root());
        comment.parent_id = Some(Uuid::new_v4());
        assert!(!comment.is_root());
    }

    #[test]
    fn test_display_content_masks_deleted() {
        let mut comment = test_comment();
        assert_eq!(comment.display_content(), "Nice story!");
        comment.is_deleted = true;
        assert_eq!(comment.display_content(), DELETED_PLACEHOLDER);
    }

    #[test]
    fn test_is_edited() {
        let mut comment = test_comment();
        assert!(!comment.is_edited());
        comment.edited_count = 1;
        assert!(comment.is_edited());
    }
}
