//! Tree shape over a flat comment list
//!
//! Comments are stored arena style: a flat table keyed by id with parent-id
//! references, never owned child pointers. Depth and tree shape are computed
//! lazily here by grouping on `parent_id`: a node's children are all comments
//! whose `parent_id` equals the node's id, recursively, starting from
//! `parent_id = None`.

use crate::db::models::Comment;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// A comment with its nested replies, for rendering
#[derive(Clone, Debug, Serialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,
    pub depth: usize,
    pub replies: Vec<CommentNode>,
}

/// Number of parent hops from a comment to its thread root (root = 0).
///
/// Walks the parent chain over the flat slice; a dangling or cyclic parent
/// chain terminates the walk rather than recursing forever.
pub fn depth_of(comments: &[Comment], id: Uuid) -> usize {
    let by_id: HashMap<Uuid, &Comment> =
        comments.iter().map(|c| (c.id, c)).collect();

    let mut depth = 0;
    let mut current = by_id.get(&id).and_then(|c| c.parent_id);
    while let Some(parent_id) = current {
        depth += 1;
        if depth > comments.len() {
            break;
        }
        current = by_id.get(&parent_id).and_then(|c| c.parent_id);
    }
    depth
}

/// Number of direct replies to a comment
pub fn reply_count(comments: &[Comment], id: Uuid) -> usize {
    comments.iter().filter(|c| c.parent_id == Some(id)).count()
}

/// Assemble the comment tree from a flat, creation-ordered list.
///
/// The input order is preserved among siblings, so a list ordered by
/// `created_at` ascending yields oldest-first threads.
pub fn build_tree(comments: &[Comment]) -> Vec<CommentNode> {
    let mut children: HashMap<Option<Uuid>, Vec<&Comment>> = HashMap::new();
    for comment in comments {
        children.entry(comment.parent_id).or_default().push(comment);
    }

    fn collect(
        parent_id: Option<Uuid>,
        depth: usize,
        children: &HashMap<Option<Uuid>, Vec<&Comment>>,
    ) -> Vec<CommentNode> {
        children
            .get(&parent_id)
            .map(|group| {
                group
                    .iter()
                    .map(|comment| CommentNode {
                        comment: (*comment).clone(),
                        depth,
                        replies: collect(Some(comment.id), depth + 1, children),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    collect(None, 0, &children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn comment(id: Uuid, parent_id: Option<Uuid>, offset_secs: i64) -> Comment {
        let at = Utc::now() + Duration::seconds(offset_secs);
        Comment {
            id,
            story_id: Uuid::nil(),
            parent_id,
            author_id: Uuid::new_v4(),
            body: format!("comment {}", id),
            created_at: at.into(),
            updated_at: at.into(),
            is_deleted: false,
            edited_count: 0,
        }
    }

    /// root -> reply -> nested reply, plus a second root
    fn sample() -> (Vec<Comment>, Uuid, Uuid, Uuid, Uuid) {
        let (a, b, c, d) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let comments = vec![
            comment(a, None, 0),
            comment(b, Some(a), 1),
            comment(c, Some(b), 2),
            comment(d, None, 3),
        ];
        (comments, a, b, c, d)
    }

    #[test]
    fn test_depth_of() {
        let (comments, a, b, c, _) = sample();
        assert_eq!(depth_of(&comments, a), 0);
        assert_eq!(depth_of(&comments, b), 1);
        assert_eq!(depth_of(&comments, c), 2);
    }

    #[test]
    fn test_depth_of_deep_chain() {
        let mut comments = vec![comment(Uuid::new_v4(), None, 0)];
        for i in 1..=5 {
            let parent = comments[i - 1].id;
            comments.push(comment(Uuid::new_v4(), Some(parent), i as i64));
        }
        assert_eq!(depth_of(&comments, comments[5].id), 5);
    }

    #[test]
    fn test_depth_of_tolerates_dangling_parent() {
        let orphan = comment(Uuid::new_v4(), Some(Uuid::new_v4()), 0);
        let id = orphan.id;
        assert_eq!(depth_of(&[orphan], id), 1);
    }

    #[test]
    fn test_build_tree_shape() {
        let (comments, a, b, c, d) = sample();
        let tree = build_tree(&comments);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].comment.id, a);
        assert_eq!(tree[0].depth, 0);
        assert_eq!(tree[1].comment.id, d);

        assert_eq!(tree[0].replies.len(), 1);
        assert_eq!(tree[0].replies[0].comment.id, b);
        assert_eq!(tree[0].replies[0].depth, 1);
        assert_eq!(tree[0].replies[0].replies[0].comment.id, c);
        assert_eq!(tree[0].replies[0].replies[0].depth, 2);
    }

    #[test]
    fn test_build_tree_preserves_sibling_order() {
        let root = Uuid::new_v4();
        let (x, y) = (Uuid::new_v4(), Uuid::new_v4());
        let comments = vec![
            comment(root, None, 0),
            comment(x, Some(root), 1),
            comment(y, Some(root), 2),
        ];
        let tree = build_tree(&comments);
        let reply_ids: Vec<Uuid> = tree[0].replies.iter().map(|n| n.comment.id).collect();
        assert_eq!(reply_ids, vec![x, y]);
    }

    #[test]
    fn test_reply_count() {
        let (comments, a, b, _, d) = sample();
        assert_eq!(reply_count(&comments, a), 1);
        assert_eq!(reply_count(&comments, b), 1);
        assert_eq!(reply_count(&comments, d), 0);
    }
}
