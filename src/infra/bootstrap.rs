//! Composition root: resolved settings in, wired catalog service out.

use std::sync::Arc;

use tracing::info;

use crate::application::catalog::CatalogService;
use crate::application::store::ProductStore;
use crate::cache::{CacheConfig, CacheStore, MemoryCacheStore, RedisCacheStore};
use crate::config::{CacheBackend, Settings};

use super::db::{self, PostgresProductStore, RetryPolicy};
use super::error::InfraError;
use super::memory::MemoryProductStore;

/// Builds the cache backend named by the settings.
pub async fn build_cache_store(settings: &Settings) -> Result<Arc<dyn CacheStore>, InfraError> {
    let config = CacheConfig::from(&settings.cache);
    match settings.cache.backend {
        CacheBackend::Memory => Ok(Arc::new(MemoryCacheStore::new(&config))),
        CacheBackend::Redis => {
            let url = settings.cache.redis_url.as_deref().ok_or_else(|| {
                InfraError::configuration("cache.redis_url is required for the redis backend")
            })?;
            let store = RedisCacheStore::connect(url, config.op_timeout())
                .await
                .map_err(InfraError::cache)?;
            Ok(Arc::new(store))
        }
    }
}

/// Builds the product store: Postgres when a database URL is configured,
/// the in-memory store otherwise.
pub async fn build_product_store(
    settings: &Settings,
) -> Result<Arc<dyn ProductStore>, InfraError> {
    match settings.database.url.as_deref() {
        Some(url) => {
            let pool = db::connect(url, settings.database.max_connections.get())
                .await
                .map_err(InfraError::database)?;
            db::run_migrations(&pool)
                .await
                .map_err(InfraError::database)?;
            Ok(Arc::new(PostgresProductStore::new(
                pool,
                RetryPolicy::from(&settings.database),
            )))
        }
        None => {
            info!("no database url configured, using the in-memory product store");
            Ok(Arc::new(MemoryProductStore::new()))
        }
    }
}

/// Wires store, cache, and handlers from resolved settings.
pub async fn build_catalog_service(settings: &Settings) -> Result<CatalogService, InfraError> {
    let store = build_product_store(settings).await?;
    let cache = build_cache_store(settings).await?;
    Ok(CatalogService::new(
        store,
        cache,
        CacheConfig::from(&settings.cache),
    ))
}
