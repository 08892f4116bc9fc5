//! Shared guardrails for query payload bounds and result limits.

pub const MAX_QUERY_LENGTH: usize = 256;
pub const DEFAULT_SIMILARITY_LIMIT: usize = 10;
pub const MAX_SIMILARITY_LIMIT: usize = 100;
pub const DEFAULT_SIMILAR_PLANETS: usize = 3;
pub const MAX_HISTORY_ENTRIES: usize = 50;

pub fn clamp_limit(value: usize, maximum: usize) -> usize {
    value.min(maximum)
}

/// Trim surrounding whitespace and cap the query at [`MAX_QUERY_LENGTH`]
/// characters.
pub fn truncate_query(query: &str) -> String {
    let stripped = query.trim();
    match stripped.char_indices().nth(MAX_QUERY_LENGTH) {
        Some((cut, _)) => stripped[..cut].to_string(),
        None => stripped.to_string(),
    }
}
