use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use time::OffsetDateTime;
use tracing::debug;

use super::store::{CacheError, CacheStore};

/// Token every namespace starts from.
pub const BASELINE_VERSION: &str = "v1";

/// Keeps one opaque version token per namespace key.
///
/// Search keys embed the current token, so advancing it strands every cached
/// page of the previous generation at once; stranded entries age out through
/// their own TTLs. Readers treat tokens as opaque and never parse them.
#[derive(Clone)]
pub struct VersionRegistry {
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl VersionRegistry {
    /// `ttl` should dwarf every data TTL; an expired token only costs one
    /// lazy re-initialization.
    pub fn new(cache: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Current token for `namespace`, initializing to [`BASELINE_VERSION`]
    /// when the key is absent or unreadable. Racing initializations all
    /// write the same baseline, so last-write-wins is harmless.
    pub async fn current(&self, namespace: &str) -> Result<String, CacheError> {
        if let Some(bytes) = self.cache.get(namespace).await? {
            match String::from_utf8(bytes.to_vec()) {
                Ok(token) if !token.is_empty() => return Ok(token),
                _ => debug!(namespace, "replacing undecodable version token"),
            }
        }
        self.cache
            .set(
                namespace,
                Bytes::from_static(BASELINE_VERSION.as_bytes()),
                self.ttl,
            )
            .await?;
        Ok(BASELINE_VERSION.to_string())
    }

    /// Advances `namespace` to a fresh token, guaranteed distinct from the
    /// stored one, and returns it.
    pub async fn bump(&self, namespace: &str) -> Result<String, CacheError> {
        let previous = match self.cache.get(namespace).await {
            Ok(Some(bytes)) => String::from_utf8(bytes.to_vec()).ok(),
            Ok(None) | Err(_) => None,
        };
        let token = next_token(previous.as_deref());
        self.cache
            .set(namespace, Bytes::from(token.clone().into_bytes()), self.ttl)
            .await?;
        debug!(namespace, token = %token, "version bumped");
        Ok(token)
    }
}

/// Nanosecond-clock token. Bumping twice within one nanosecond would repeat
/// the candidate, so it is nudged past the stored value when they collide.
fn next_token(previous: Option<&str>) -> String {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    let candidate = format!("v{nanos}");
    if previous == Some(candidate.as_str()) {
        return format!("v{}", nanos + 1);
    }
    candidate
}
