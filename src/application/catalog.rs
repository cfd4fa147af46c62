//! Catalog handlers: read-through caching in front of the durable store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use metrics::{counter, histogram};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::commands::{CreateProduct, DeactivateProduct, UpdateProduct};
use crate::application::dto::{Cached, ProductDto, SearchPage};
use crate::application::error::CatalogError;
use crate::application::queries::{GetProductById, SearchProducts};
use crate::application::store::{ProductStore, StoreError};
use crate::application::validate::Validate;
use crate::cache::{
    CacheConfig, CacheStore, SEARCH_VERSION, VersionRegistry, product_key, search_key,
};
use crate::domain::product::Product;

/// Product catalog operations with read-through caching and
/// write-then-invalidate coherence.
///
/// Reads consult the cache first and fall back to the durable store,
/// repopulating the entry on the way out. Writes commit to the store, then
/// drop the product's point entry and advance the search version so every
/// cached search page goes stale at once. Cache trouble is logged and
/// counted but never fails a request; the store stays authoritative and the
/// worst case is one redundant store round trip.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn ProductStore>,
    cache: Arc<dyn CacheStore>,
    versions: VersionRegistry,
    config: CacheConfig,
}

impl CatalogService {
    pub fn new(
        store: Arc<dyn ProductStore>,
        cache: Arc<dyn CacheStore>,
        config: CacheConfig,
    ) -> Self {
        let versions = VersionRegistry::new(Arc::clone(&cache), config.version_ttl());
        Self {
            store,
            cache,
            versions,
            config,
        }
    }

    /// Creates a product and returns its stored form.
    ///
    /// The SKU pre-check serves the friendly conflict for the common case; a
    /// concurrent insert can still slip past it, so the store's unique
    /// constraint maps to the same conflict.
    pub async fn create_product(
        &self,
        command: CreateProduct,
    ) -> Result<ProductDto, CatalogError> {
        command.validate().map_err(CatalogError::Validation)?;

        let sku = command.sku.trim();
        if self.store.sku_exists(sku).await? {
            return Err(CatalogError::sku_conflict(sku));
        }

        let (product, event) = Product::create(
            &command.sku,
            &command.name,
            command.description.as_deref(),
            command.price,
            &command.currency,
        );
        match self.store.insert(&product).await {
            Ok(()) => {}
            Err(StoreError::Duplicate { .. }) => {
                return Err(CatalogError::sku_conflict(&product.sku));
            }
            Err(err) => return Err(err.into()),
        }
        debug!(product_id = %event.product_id, sku = %event.sku, "product created");

        self.invalidate(product.id).await;
        Ok(ProductDto::from(&product))
    }

    /// Fetches one product, preferring the cached copy.
    pub async fn get_product_by_id(
        &self,
        query: GetProductById,
    ) -> Result<Cached<ProductDto>, CatalogError> {
        let key = product_key(query.id);
        if let Some(dto) = self.cache_get::<ProductDto>(&key, "product").await {
            return Ok(Cached::hit(dto));
        }

        let product = self
            .store
            .find_by_id(query.id)
            .await?
            .ok_or_else(|| CatalogError::product_not_found(query.id))?;
        let dto = ProductDto::from(&product);
        self.cache_put(&key, &dto, self.config.product_ttl()).await;
        Ok(Cached::miss(dto))
    }

    /// Runs a catalog search, preferring a cached page under the current
    /// search version.
    ///
    /// When the version token cannot be read, the cache is bypassed for the
    /// whole request: a page served under a stale token could resurrect
    /// invalidated results.
    pub async fn search_products(
        &self,
        query: SearchProducts,
    ) -> Result<Cached<SearchPage>, CatalogError> {
        query.validate().map_err(CatalogError::Validation)?;
        let filter = query.filter();
        let page = query.page_request();

        let key = match self.versions.current(SEARCH_VERSION).await {
            Ok(version) => Some(search_key(&version, &filter, page)),
            Err(err) => {
                warn!(error = %err, "version lookup failed, bypassing search cache");
                counter!("vetrina_cache_error_total", "op" => "version").increment(1);
                None
            }
        };
        if let Some(key) = key.as_deref() {
            if let Some(cached) = self.cache_get::<SearchPage>(key, "search").await {
                return Ok(Cached::hit(cached));
            }
        }

        let started = Instant::now();
        let result = self.store.search(&filter, page).await?;
        histogram!("vetrina_search_store_ms").record(started.elapsed().as_millis() as f64);

        let page_dto = SearchPage {
            items: result.items.iter().map(ProductDto::from).collect(),
            total_count: result.total_count,
            page: page.page,
            page_size: page.page_size,
        };
        if let Some(key) = key.as_deref() {
            self.cache_put(key, &page_dto, self.config.search_ttl()).await;
        }
        Ok(Cached::miss(page_dto))
    }

    /// Applies the editable fields to an existing product.
    pub async fn update_product(
        &self,
        command: UpdateProduct,
    ) -> Result<ProductDto, CatalogError> {
        command.validate().map_err(CatalogError::Validation)?;

        let mut product = self
            .store
            .find_by_id(command.id)
            .await?
            .ok_or_else(|| CatalogError::product_not_found(command.id))?;
        product.update(
            &command.name,
            command.description.as_deref(),
            command.price,
            &command.currency,
        );
        self.store.update(&product).await?;
        debug!(product_id = %product.id, "product updated");

        self.invalidate(product.id).await;
        Ok(ProductDto::from(&product))
    }

    /// Marks a product inactive. An already-inactive product is left
    /// untouched, but the cache is still invalidated so repeated calls
    /// converge on fresh reads.
    pub async fn deactivate_product(
        &self,
        command: DeactivateProduct,
    ) -> Result<(), CatalogError> {
        let mut product = self
            .store
            .find_by_id(command.id)
            .await?
            .ok_or_else(|| CatalogError::product_not_found(command.id))?;
        if product.deactivate() {
            self.store.deactivate(&product).await?;
            debug!(product_id = %product.id, "product deactivated");
        }
        self.invalidate(product.id).await;
        Ok(())
    }

    /// Write-side invalidation, best effort in both halves: drop the point
    /// entry, then advance the search version. A step that fails leaves
    /// entries to age out through their TTLs.
    async fn invalidate(&self, id: Uuid) {
        let key = product_key(id);
        if let Err(err) = self.cache.delete(&key).await {
            warn!(key = %key, error = %err, "cache delete failed");
            counter!("vetrina_cache_error_total", "op" => "delete").increment(1);
        }
        match self.versions.bump(SEARCH_VERSION).await {
            Ok(version) => {
                counter!("vetrina_search_version_bump_total").increment(1);
                debug!(version = %version, "search namespace invalidated");
            }
            Err(err) => {
                warn!(error = %err, "search version bump failed");
                counter!("vetrina_cache_error_total", "op" => "bump").increment(1);
            }
        }
    }

    /// Cache read that never fails the request: backend trouble and
    /// undecodable payloads both count as a miss.
    async fn cache_get<T: DeserializeOwned>(&self, key: &str, lookup: &'static str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(value) => {
                    counter!("vetrina_cache_hit_total", "lookup" => lookup).increment(1);
                    debug!(key, lookup, "cache hit");
                    Some(value)
                }
                Err(err) => {
                    warn!(key, error = %err, "discarding undecodable cache entry");
                    counter!("vetrina_cache_miss_total", "lookup" => lookup).increment(1);
                    None
                }
            },
            Ok(None) => {
                counter!("vetrina_cache_miss_total", "lookup" => lookup).increment(1);
                None
            }
            Err(err) => {
                warn!(key, error = %err, "cache read failed, falling back to store");
                counter!("vetrina_cache_error_total", "op" => "get").increment(1);
                None
            }
        }
    }

    /// Best-effort cache write; on failure the entry is simply not cached.
    async fn cache_put<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(key, error = %err, "failed to encode cache payload");
                return;
            }
        };
        if let Err(err) = self.cache.set(key, Bytes::from(bytes), ttl).await {
            warn!(key, error = %err, "cache write failed");
            counter!("vetrina_cache_error_total", "op" => "set").increment(1);
        }
    }
}
