//! Deterministic cache key derivation.
//!
//! Key shape is contractual: logically identical requests must map to
//! byte-identical keys, and every search key embeds a version token so a
//! bump strands the previous generation wholesale.

use uuid::Uuid;

use crate::application::store::{PageRequest, ProductFilter};

/// Namespace key the search version token lives under.
pub const SEARCH_VERSION: &str = "catalog:search:version";

/// Point-lookup key: `catalog:product:{id}` with the id as 32 hex digits.
pub fn product_key(id: Uuid) -> String {
    format!("catalog:product:{}", id.simple())
}

/// Search key:
/// `catalog:search:{version}:{active}:{min}:{max}:{query}:{page}:{page_size}`.
///
/// `active` is `true`/`false`/`any`; absent price bounds render as `na`,
/// present ones with exactly two decimals; the free-text query goes through
/// [`normalize_query`]. Field order never changes.
pub fn search_key(version: &str, filter: &ProductFilter, page: PageRequest) -> String {
    let active = match filter.is_active {
        Some(true) => "true",
        Some(false) => "false",
        None => "any",
    };
    let min = filter
        .min_price
        .map_or_else(|| "na".to_string(), |price| price.to_string());
    let max = filter
        .max_price
        .map_or_else(|| "na".to_string(), |price| price.to_string());
    let query = normalize_query(filter.query.as_deref());
    format!(
        "catalog:search:{version}:{active}:{min}:{max}:{query}:{}:{}",
        page.page, page.page_size
    )
}

/// Trims, lowercases, and collapses internal whitespace runs to single
/// underscores; blank input becomes `none`.
pub fn normalize_query(query: Option<&str>) -> String {
    let trimmed = query.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return "none".to_string();
    }
    trimmed
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}
