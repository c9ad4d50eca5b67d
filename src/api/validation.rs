use std::str::FromStr;

use super::ApiError;
use crate::config::CommunityConfig;
use crate::domain::ParseEnumError;
use crate::domain::pagination::{PageParams, PageQuery};

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_CONTENT_LENGTH: usize = 20_000;
pub const MAX_MESSAGE_LENGTH: usize = 5_000;
pub const MAX_SEARCH_LENGTH: usize = 100;

pub fn validate_id(id: i32, resource: &str) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {resource} ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

/// Trims `value` and enforces a maximum length; empty input is rejected
/// with `empty_message`.
pub fn validate_text(value: &str, max_len: usize, empty_message: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(empty_message));
    }
    if trimmed.chars().count() > max_len {
        return Err(ApiError::validation(format!(
            "Text must be {max_len} characters or less"
        )));
    }
    Ok(trimmed.to_string())
}

/// Parses an optional enum query/body value; invalid spellings are a 400.
pub fn parse_enum<T>(value: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = ParseEnumError>,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e: ParseEnumError| ApiError::validation(e.to_string())),
        None => Ok(None),
    }
}

pub fn validate_search_query(query: Option<&str>) -> Result<Option<String>, ApiError> {
    let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
        return Ok(None);
    };

    if query.chars().count() > MAX_SEARCH_LENGTH {
        return Err(ApiError::validation(format!(
            "Search query must be {MAX_SEARCH_LENGTH} characters or less"
        )));
    }

    Ok(Some(query.to_string()))
}

pub fn page_params(query: PageQuery, community: &CommunityConfig) -> PageParams {
    PageParams::resolve(query, community.default_page_size, community.max_page_size)
}

pub fn validate_non_negative(value: Option<i32>, field: &str) -> Result<Option<i32>, ApiError> {
    match value {
        Some(v) if v < 0 => Err(ApiError::validation(format!("{field} cannot be negative"))),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForumCategory, Role};

    #[test]
    fn test_validate_id() {
        assert!(validate_id(1, "user").is_ok());
        assert!(validate_id(0, "user").is_err());
        assert!(validate_id(-3, "user").is_err());
    }

    #[test]
    fn test_validate_text() {
        assert_eq!(validate_text("  hi ", 10, "empty").unwrap(), "hi");
        assert!(matches!(
            validate_text("   ", 10, "Title and content are required"),
            Err(ApiError::Validation(msg)) if msg == "Title and content are required"
        ));
        assert!(validate_text("abcdef", 5, "empty").is_err());
    }

    #[test]
    fn test_parse_enum() {
        assert_eq!(parse_enum::<Role>(Some("admin")).unwrap(), Some(Role::Admin));
        assert_eq!(parse_enum::<Role>(None).unwrap(), None);
        assert_eq!(parse_enum::<Role>(Some("  ")).unwrap(), None);
        assert_eq!(
            parse_enum::<ForumCategory>(Some("off_topic")).unwrap(),
            Some(ForumCategory::OffTopic)
        );
        assert!(parse_enum::<Role>(Some("root")).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query(Some("  ")).unwrap(), None);
        assert_eq!(
            validate_search_query(Some(" nova ")).unwrap(),
            Some("nova".to_string())
        );
        assert!(validate_search_query(Some(&"x".repeat(101))).is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert_eq!(validate_non_negative(Some(0), "wins").unwrap(), Some(0));
        assert!(validate_non_negative(Some(-1), "wins").is_err());
        assert_eq!(validate_non_negative(None, "wins").unwrap(), None);
    }
}
