use super::text_enum;

text_enum! {
    pub enum ForumCategory("category") {
        General => "general",
        News => "news",
        Guides => "guides",
        Tournaments => "tournaments",
        Clans => "clans",
        OffTopic => "off_topic",
    }
}

pub const MAX_TAG_LENGTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("Too many tags (max {0})")]
    TooMany(usize),

    #[error("Tags must be at most {MAX_TAG_LENGTH} characters")]
    TooLong,
}

/// Trims, lower-cases and de-duplicates submitted tags, keeping first-seen order.
pub fn normalize_tags(tags: &[String], max_tags: usize) -> Result<Vec<String>, TagError> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() || normalized.contains(&tag) {
            continue;
        }
        if tag.chars().count() > MAX_TAG_LENGTH {
            return Err(TagError::TooLong);
        }
        normalized.push(tag);
    }

    if normalized.len() > max_tags {
        return Err(TagError::TooMany(max_tags));
    }

    Ok(normalized)
}

#[must_use]
pub fn encode_tags(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

/// Decodes the stored tag column. Rows written before tags were stored as a
/// JSON array hold a comma separated list.
#[must_use]
pub fn decode_tags(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }

    if let Ok(tags) = serde_json::from_str::<Vec<String>>(raw) {
        return tags;
    }

    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether the stored column is still in the comma separated form.
#[must_use]
pub fn is_legacy_tags(raw: &str) -> bool {
    serde_json::from_str::<Vec<String>>(raw.trim()).is_err()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tags() {
        let tags = vec![
            " Strategy ".to_string(),
            "strategy".to_string(),
            String::new(),
            "FPS".to_string(),
        ];
        assert_eq!(normalize_tags(&tags, 10).unwrap(), vec!["strategy", "fps"]);
    }

    #[test]
    fn test_too_many_tags() {
        let tags: Vec<String> = (0..11).map(|i| format!("t{i}")).collect();
        assert_eq!(normalize_tags(&tags, 10), Err(TagError::TooMany(10)));
    }

    #[test]
    fn test_decode_json_and_legacy_tags() {
        assert_eq!(decode_tags(r#"["a","b"]"#), vec!["a", "b"]);
        assert_eq!(decode_tags("a, b ,,c"), vec!["a", "b", "c"]);
        assert!(decode_tags("").is_empty());
        assert!(is_legacy_tags("a,b"));
        assert!(!is_legacy_tags("[]"));
    }
}
