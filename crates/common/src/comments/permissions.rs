//! Comment permission predicates
//!
//! Pure checks; an anonymous caller is `None`. Authorization failures are
//! never errors here, just `false`.

use crate::db::models::Comment;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The acting user, as established by the caller (the request layer owns
/// authentication; this is only a capability value)
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    /// Moderator/staff capability
    #[serde(default)]
    pub is_staff: bool,
}

impl Actor {
    pub fn new(id: Uuid) -> Self {
        Self { id, is_staff: false }
    }

    pub fn staff(id: Uuid) -> Self {
        Self { id, is_staff: true }
    }
}

/// Edit allowed for the comment's author or staff
pub fn can_edit(comment: &Comment, actor: Option<&Actor>) -> bool {
    match actor {
        Some(actor) => actor.id == comment.author_id || actor.is_staff,
        None => false,
    }
}

/// Delete allowed for the comment's author, staff, or the story's author
pub fn can_delete(comment: &Comment, story_author_id: Uuid, actor: Option<&Actor>) -> bool {
    match actor {
        Some(actor) => {
            actor.id == comment.author_id || actor.is_staff || actor.id == story_author_id
        }
        None => false,
    }
}

/// Reply allowed only for authenticated users, on non-deleted comments,
/// above the depth limit
pub fn can_reply(comment: &Comment, depth: usize, max_depth: usize, actor: Option<&Actor>) -> bool {
    if actor.is_none() {
        return false;
    }
    if comment.is_deleted {
        return false;
    }
    depth < max_depth
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn comment(author_id: Uuid) -> Comment {
        let now = Utc::now();
        Comment {
            id: Uuid::new_v4(),
            story_id: Uuid::new_v4(),
            parent_id: None,
            author_id,
            body: "Nice story!".to_string(),
            created_at: now.into(),
            updated_at: now.into(),
            is_deleted: false,
            edited_count: 0,
        }
    }

    #[test]
    fn test_can_edit() {
        let author = Actor::new(Uuid::new_v4());
        let c = comment(author.id);

        assert!(can_edit(&c, Some(&author)));
        assert!(can_edit(&c, Some(&Actor::staff(Uuid::new_v4()))));
        assert!(!can_edit(&c, Some(&Actor::new(Uuid::new_v4()))));
        assert!(!can_edit(&c, None));
    }

    #[test]
    fn test_can_delete_includes_story_author() {
        let story_author = Uuid::new_v4();
        let c = comment(Uuid::new_v4());

        assert!(can_delete(&c, story_author, Some(&Actor::new(c.author_id))));
        assert!(can_delete(&c, story_author, Some(&Actor::new(story_author))));
        assert!(can_delete(&c, story_author, Some(&Actor::staff(Uuid::new_v4()))));
        assert!(!can_delete(&c, story_author, Some(&Actor::new(Uuid::new_v4()))));
        assert!(!can_delete(&c, story_author, None));
    }

    #[test]
    fn test_can_reply() {
        let actor = Actor::new(Uuid::new_v4());
        let c = comment(Uuid::new_v4());

        assert!(can_reply(&c, 0, 5, Some(&actor)));
        assert!(can_reply(&c, 4, 5, Some(&actor)));
        // depth limit reached
        assert!(!can_reply(&c, 5, 5, Some(&actor)));
        // anonymous
        assert!(!can_reply(&c, 0, 5, None));
    }

    #[test]
    fn test_cannot_reply_to_deleted() {
        let actor = Actor::new(Uuid::new_v4());
        let mut c = comment(Uuid::new_v4());
        c.is_deleted = true;
        assert!(!can_reply(&c, 0, 5, Some(&actor)));
    }
}
