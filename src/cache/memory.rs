use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;
use tracing::warn;

use super::config::CacheConfig;
use super::store::{CacheError, CacheStore};

struct Entry {
    value: Bytes,
    expires_at: Instant,
}

/// In-process [`CacheStore`] over an LRU map with absolute expiry.
///
/// Suited to tests and single-node deployments. Entries disappear on
/// capacity pressure (least recently used first) or on the first read past
/// their deadline; operations never fail.
pub struct MemoryCacheStore {
    entries: Mutex<LruCache<String, Entry>>,
}

impl MemoryCacheStore {
    /// Create a new memory store with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(config.memory_capacity_non_zero())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, Entry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!(
                    lock_kind = "mutex.lock",
                    result = "poisoned_recovered",
                    "recovered from poisoned cache lock"
                );
                poisoned.into_inner()
            }
        }
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let mut entries = self.lock();
        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.lock().put(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.lock().pop(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn roundtrip() {
        let store = MemoryCacheStore::default();

        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", Bytes::from_static(b"v"), MINUTE).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(Bytes::from_static(b"v")));

        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_entries_read_as_misses() {
        let store = MemoryCacheStore::default();
        store
            .set("k", Bytes::from_static(b"v"), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn least_recently_used_entry_is_evicted() {
        let config = CacheConfig {
            memory_capacity: 2,
            ..Default::default()
        };
        let store = MemoryCacheStore::new(&config);

        store.set("a", Bytes::from_static(b"1"), MINUTE).await.unwrap();
        store.set("b", Bytes::from_static(b"2"), MINUTE).await.unwrap();

        // Touch "a" so "b" is the eviction candidate.
        assert!(store.get("a").await.unwrap().is_some());

        store.set("c", Bytes::from_static(b"3"), MINUTE).await.unwrap();

        assert_eq!(store.get("b").await.unwrap(), None);
        assert!(store.get("a").await.unwrap().is_some());
        assert!(store.get("c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn overwrite_replaces_value_and_ttl() {
        let store = MemoryCacheStore::default();
        store
            .set("k", Bytes::from_static(b"old"), Duration::ZERO)
            .await
            .unwrap();
        store.set("k", Bytes::from_static(b"new"), MINUTE).await.unwrap();
        assert_eq!(
            store.get("k").await.unwrap(),
            Some(Bytes::from_static(b"new"))
        );
    }
}
