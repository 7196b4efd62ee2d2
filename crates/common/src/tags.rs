//! Tag list handling
//!
//! Tags are stored as a single comma-joined text column. The canonical form
//! is trimmed, lowercased, with empties dropped and duplicates removed while
//! keeping first-seen order.

/// Parse a comma-joined tag column into the canonical list
pub fn parse(raw: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for tag in raw.split(',') {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

/// Normalize a tag list into the stored column form
pub fn join(tags: &[String]) -> String {
    parse(&tags.join(",")).join(", ")
}

/// Add a tag to a stored column value; no-op if already present
pub fn add(raw: &str, tag: &str) -> String {
    let mut tags = parse(raw);
    let tag = tag.trim().to_lowercase();
    if !tag.is_empty() && !tags.contains(&tag) {
        tags.push(tag);
    }
    tags.join(", ")
}

/// Remove a tag from a stored column value
pub fn remove(raw: &str, tag: &str) -> String {
    let tag = tag.trim().to_lowercase();
    parse(raw)
        .into_iter()
        .filter(|t| *t != tag)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes() {
        assert_eq!(
            parse("  Fantasy , romance  , adventure  "),
            vec!["fantasy", "romance", "adventure"]
        );
    }

    #[test]
    fn test_parse_drops_empties_and_duplicates() {
        assert_eq!(parse(", , ,"), Vec::<String>::new());
        assert_eq!(parse("drama, Drama, drama"), vec!["drama"]);
    }

    #[test]
    fn test_add_is_idempotent() {
        let tags = add("fantasy", "Romance");
        assert_eq!(tags, "fantasy, romance");
        assert_eq!(add(&tags, "romance"), "fantasy, romance");
    }

    #[test]
    fn test_remove() {
        assert_eq!(remove("fantasy, romance, adventure", "Romance"), "fantasy, adventure");
        assert_eq!(remove("fantasy", "missing"), "fantasy");
    }

    #[test]
    fn test_join_keeps_order() {
        let tags = vec!["Zebra".to_string(), "apple".to_string(), "zebra".to_string()];
        assert_eq!(join(&tags), "zebra, apple");
    }
}
