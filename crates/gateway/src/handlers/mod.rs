//! Request handlers

pub mod bookmarks;
pub mod comments;
pub mod health;
pub mod stories;
