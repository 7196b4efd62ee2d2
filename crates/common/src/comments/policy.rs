//! Comment body validation
//!
//! All failures are field-tagged validation errors on `body`; nothing here is
//! fatal.

use crate::config::ContentConfig;
use crate::errors::{AppError, Result};

/// Validation policy for comment bodies
#[derive(Clone, Debug)]
pub struct CommentPolicy {
    pub min_len: usize,
    pub max_len: usize,
    pub max_depth: usize,
    blocked_words: Vec<String>,
}

impl CommentPolicy {
    pub fn from_config(config: &ContentConfig) -> Self {
        Self {
            min_len: config.comment_min_len,
            max_len: config.comment_max_len,
            max_depth: config.max_reply_depth,
            blocked_words: config
                .blocked_words
                .iter()
                .map(|w| w.to_lowercase())
                .collect(),
        }
    }

    /// Validate and normalize a comment body. Returns the trimmed text.
    pub fn validate_body(&self, body: &str) -> Result<String> {
        let trimmed = body.trim();
        let len = trimmed.chars().count();

        if len < self.min_len {
            return Err(AppError::validation(
                "body",
                format!("Comment is too short (minimum {} characters)", self.min_len),
            ));
        }
        if len > self.max_len {
            return Err(AppError::validation(
                "body",
                format!("Comment is too long (maximum {} characters)", self.max_len),
            ));
        }

        let lowered = trimmed.to_lowercase();
        if self.blocked_words.iter().any(|w| lowered.contains(w)) {
            return Err(AppError::validation(
                "body",
                "Comment contains blocked words",
            ));
        }

        Ok(trimmed.to_string())
    }
}

impl Default for CommentPolicy {
    fn default() -> Self {
        Self::from_config(&ContentConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn policy() -> CommentPolicy {
        CommentPolicy::from_config(&ContentConfig {
            blocked_words: vec!["spam".to_string()],
            ..ContentConfig::default()
        })
    }

    #[test]
    fn test_valid_body_is_trimmed() {
        let body = policy().validate_body("  Nice story!  ").unwrap();
        assert_eq!(body, "Nice story!");
    }

    #[test]
    fn test_too_short() {
        let err = policy().validate_body("ab").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(err.field(), Some("body"));
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn test_whitespace_does_not_count() {
        // three characters, but only two after trimming
        assert!(policy().validate_body(" ab ").is_err());
    }

    #[test]
    fn test_too_long() {
        let body = "a".repeat(5001);
        let err = policy().validate_body(&body).unwrap_err();
        assert!(err.to_string().contains("too long"));

        let body = "a".repeat(5000);
        assert!(policy().validate_body(&body).is_ok());
    }

    #[test]
    fn test_blocked_words_case_insensitive() {
        let err = policy().validate_body("This is SPAM content").unwrap_err();
        assert_eq!(err.field(), Some("body"));
        assert!(err.to_string().contains("blocked words"));

        assert!(policy().validate_body("This is fine content").is_ok());
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        // two multibyte characters are still too short
        assert!(policy().validate_body("ой").is_err());
        assert!(policy().validate_body("ой!").is_ok());
    }
}
