//! SeaORM entity models
//!
//! Database entities for Storyhaven

mod bookmark;
mod comment;
mod story;
mod view_history;

pub use story::{
    popularity_level,
    ActiveModel as StoryActiveModel,
    Column as StoryColumn,
    Entity as StoryEntity,
    Model as Story,
    PopularityLevel,
    StoryStatus,
};

pub use comment::{
    ActiveModel as CommentActiveModel,
    Column as CommentColumn,
    Entity as CommentEntity,
    Model as Comment,
    DELETED_PLACEHOLDER,
    RESTORED_PLACEHOLDER,
};

pub use bookmark::{
    ActiveModel as BookmarkActiveModel,
    Column as BookmarkColumn,
    Entity as BookmarkEntity,
    Model as Bookmark,
};

pub use view_history::{
    ActiveModel as ViewHistoryActiveModel,
    Column as ViewHistoryColumn,
    Entity as ViewHistoryEntity,
    Model as ViewHistory,
};
