use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use uuid::Uuid;

/// Failure surfaced by a cache backend.
///
/// Callers treat every variant as "the cache is unusable right now":
/// handlers degrade to the durable store and never forward these to their
/// own callers.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache operation exceeded {}ms", .0.as_millis())]
    Timeout(Duration),
}

impl CacheError {
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Volatile key/value store with per-entry TTL.
///
/// Keys are namespaced strings built by the key module; values are opaque
/// serialized payloads. Expiry is best-effort: an entry may also disappear
/// early under capacity pressure, and readers must tolerate both.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError>;

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// Readiness probe: writes, reads back, and removes a value under a unique
/// throwaway key.
pub async fn verify_round_trip(store: &dyn CacheStore) -> Result<(), CacheError> {
    let key = format!("catalog:health:{}", Uuid::new_v4().simple());
    store
        .set(&key, Bytes::from_static(b"ok"), Duration::from_secs(5))
        .await?;
    let value = store.get(&key).await?;
    store.delete(&key).await?;
    if value.as_deref() == Some(b"ok".as_slice()) {
        Ok(())
    } else {
        Err(CacheError::Unavailable(
            "health probe read back a different value".to_string(),
        ))
    }
}
