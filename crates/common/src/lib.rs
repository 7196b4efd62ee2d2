//! Storyhaven Common Library
//!
//! Shared code for the Storyhaven services:
//! - Database models and repository pattern
//! - Comment Tree Engine (depth-bounded threading, soft delete)
//! - Content Lifecycle Controller (draft/published/archived/trashed)
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod comments;
pub mod config;
pub mod db;
pub mod errors;
pub mod lifecycle;
pub mod metrics;
pub mod tags;

// Re-export commonly used types
pub use comments::{Actor, CommentEngine, CommentPolicy, EditOutcome};
pub use config::AppConfig;
pub use db::Repository;
pub use errors::{AppError, Result};
pub use lifecycle::{LifecycleController, Transition, TransitionOutcome};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
