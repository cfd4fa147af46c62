use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::debug;

use super::store::{CacheError, CacheStore};

/// Redis-backed [`CacheStore`].
///
/// Holds a multiplexed [`ConnectionManager`] that reconnects on its own and
/// is cheap to clone per operation. Every command runs under the configured
/// timeout so a wedged backend degrades callers instead of hanging them.
pub struct RedisCacheStore {
    manager: ConnectionManager,
    op_timeout: Duration,
}

impl RedisCacheStore {
    pub async fn connect(url: &str, op_timeout: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(CacheError::unavailable)?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(CacheError::unavailable)?;
        debug!("redis cache connected");
        Ok(Self {
            manager,
            op_timeout,
        })
    }

    async fn run<T>(
        &self,
        op: impl Future<Output = Result<T, redis::RedisError>>,
    ) -> Result<T, CacheError> {
        tokio::time::timeout(self.op_timeout, op)
            .await
            .map_err(|_| CacheError::Timeout(self.op_timeout))?
            .map_err(CacheError::unavailable)
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let mut conn = self.manager.clone();
        let value: Option<Vec<u8>> = self.run(conn.get(key)).await?;
        Ok(value.map(Bytes::from))
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        // SETEX rejects a zero expiry; clamp sub-second TTLs up to one.
        let seconds = ttl.as_secs().max(1);
        self.run(conn.set_ex(key, value.as_ref(), seconds)).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        self.run(conn.del(key)).await
    }
}
