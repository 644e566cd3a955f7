//! Pagination bounds and catalog search helpers.

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Maximum page size for list endpoints.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Maximum accepted length of a free-text search query.
pub const MAX_QUERY_LEN: usize = 100;

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Build a case-insensitive `ILIKE` pattern from a free-text query.
///
/// `%`, `_` and `\` are escaped so user input only ever matches literally.
/// Returns `None` when the query is blank.
///
/// ```
/// use sborrowhub_core::search::like_pattern;
/// assert_eq!(like_pattern("  cam "), Some("%cam%".to_string()));
/// assert_eq!(like_pattern("50%"), Some("%50\\%%".to_string()));
/// assert_eq!(like_pattern("   "), None);
/// ```
pub fn like_pattern(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut escaped = String::with_capacity(trimmed.len() + 2);
    escaped.push('%');
    for ch in trimmed.chars().take(MAX_QUERY_LEN) {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    Some(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_limit_uses_default_when_none() {
        assert_eq!(clamp_limit(None, 20, 100), 20);
    }

    #[test]
    fn clamp_limit_respects_max() {
        assert_eq!(clamp_limit(Some(200), 20, 100), 100);
    }

    #[test]
    fn clamp_limit_floors_at_one() {
        assert_eq!(clamp_limit(Some(-5), 20, 100), 1);
        assert_eq!(clamp_limit(Some(0), 20, 100), 1);
    }

    #[test]
    fn clamp_offset_floors_at_zero() {
        assert_eq!(clamp_offset(None), 0);
        assert_eq!(clamp_offset(Some(-10)), 0);
        assert_eq!(clamp_offset(Some(40)), 40);
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("a_b"), Some("%a\\_b%".to_string()));
        assert_eq!(like_pattern("c\\d"), Some("%c\\\\d%".to_string()));
    }

    #[test]
    fn like_pattern_truncates_long_queries() {
        let long = "x".repeat(500);
        let pattern = like_pattern(&long).unwrap();
        assert_eq!(pattern.len(), MAX_QUERY_LEN + 2);
    }
}
