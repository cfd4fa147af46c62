//! Coherence checks: read-through caching, write-then-invalidate, version
//! token rotation, and degradation when the cache is unreachable.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use vetrina::application::catalog::CatalogService;
use vetrina::application::commands::{CreateProduct, DeactivateProduct, UpdateProduct};
use vetrina::application::queries::{GetProductById, SearchProducts};
use vetrina::application::store::{PageRequest, ProductFilter};
use vetrina::cache::{
    BASELINE_VERSION, CacheConfig, CacheError, CacheStore, MemoryCacheStore, SEARCH_VERSION,
    VersionRegistry, product_key, search_key,
};
use vetrina::domain::price::Price;
use vetrina::infra::memory::MemoryProductStore;

fn service() -> CatalogService {
    CatalogService::new(
        Arc::new(MemoryProductStore::new()),
        Arc::new(MemoryCacheStore::new(&CacheConfig::default())),
        CacheConfig::default(),
    )
}

fn create_cmd(sku: &str, name: &str, minor: i64) -> CreateProduct {
    CreateProduct {
        sku: sku.to_string(),
        name: name.to_string(),
        description: None,
        price: Price::from_minor_units(minor),
        currency: "USD".to_string(),
    }
}

#[tokio::test]
async fn point_reads_go_miss_then_hit_with_identical_payload() {
    let service = service();
    let created = service
        .create_product(create_cmd("SKU-1", "Cache Mug", 1_100))
        .await
        .unwrap();

    let miss = service
        .get_product_by_id(GetProductById { id: created.id })
        .await
        .unwrap();
    let hit = service
        .get_product_by_id(GetProductById { id: created.id })
        .await
        .unwrap();

    assert!(!miss.cache_hit);
    assert!(hit.cache_hit);
    assert_eq!(miss.value, hit.value);
}

#[tokio::test]
async fn cached_search_pages_equal_the_store_computation() {
    let service = service();
    for (sku, name, minor) in [
        ("SKU-1", "Alder Desk", 40_000),
        ("SKU-2", "Beech Shelf", 15_000),
        ("SKU-3", "Cedar Chest", 28_000),
    ] {
        service.create_product(create_cmd(sku, name, minor)).await.unwrap();
    }

    let query = SearchProducts {
        min_price: Some(Price::from_minor_units(10_000)),
        page_size: 2,
        ..SearchProducts::default()
    };
    let miss = service.search_products(query.clone()).await.unwrap();
    let hit = service.search_products(query).await.unwrap();

    assert!(!miss.cache_hit);
    assert!(hit.cache_hit);
    assert_eq!(hit.value, miss.value);
}

#[tokio::test]
async fn whitespace_variants_share_one_coherent_page() {
    let service = service();
    service
        .create_product(create_cmd("SKU-1", "Blue Mug", 1_400))
        .await
        .unwrap();

    let spaced = SearchProducts {
        query: Some("blue   mug".to_string()),
        ..SearchProducts::default()
    };
    let first = service.search_products(spaced).await.unwrap();
    assert!(!first.cache_hit);
    assert_eq!(first.value.total_count, 1);

    // Collapses to the same cache key, so it must also compute the same page.
    let tight = SearchProducts {
        query: Some("blue mug".to_string()),
        ..SearchProducts::default()
    };
    let second = service.search_products(tight).await.unwrap();
    assert!(second.cache_hit);
    assert_eq!(second.value, first.value);
}

#[tokio::test]
async fn cached_searches_never_survive_a_mutation() {
    let service = service();
    let created = service
        .create_product(create_cmd("SKU-1", "Alpha Bowl", 1_000))
        .await
        .unwrap();

    let primed = service.search_products(SearchProducts::default()).await.unwrap();
    assert!(!primed.cache_hit);
    assert!(
        service
            .search_products(SearchProducts::default())
            .await
            .unwrap()
            .cache_hit
    );

    service
        .update_product(UpdateProduct {
            id: created.id,
            name: "Alpha Bowl XL".to_string(),
            description: None,
            price: Price::from_minor_units(1_500),
            currency: "USD".to_string(),
        })
        .await
        .unwrap();

    let after = service.search_products(SearchProducts::default()).await.unwrap();
    assert!(!after.cache_hit);
    assert_eq!(after.value.items[0].name, "Alpha Bowl XL");
}

#[tokio::test]
async fn update_drops_the_point_entry() {
    let service = service();
    let created = service
        .create_product(create_cmd("SKU-1", "Old Label", 2_000))
        .await
        .unwrap();

    let _ = service
        .get_product_by_id(GetProductById { id: created.id })
        .await
        .unwrap();
    assert!(
        service
            .get_product_by_id(GetProductById { id: created.id })
            .await
            .unwrap()
            .cache_hit
    );

    service
        .update_product(UpdateProduct {
            id: created.id,
            name: "New Label".to_string(),
            description: None,
            price: Price::from_minor_units(2_000),
            currency: "USD".to_string(),
        })
        .await
        .unwrap();

    let after = service
        .get_product_by_id(GetProductById { id: created.id })
        .await
        .unwrap();
    assert!(!after.cache_hit);
    assert_eq!(after.value.name, "New Label");
}

#[tokio::test]
async fn deactivation_reflects_in_active_searches() {
    let service = service();
    let chair = service
        .create_product(create_cmd("SKU-1", "Aspen Chair", 10_000))
        .await
        .unwrap();
    service
        .create_product(create_cmd("SKU-2", "Brook Table", 20_000))
        .await
        .unwrap();

    let active_query = SearchProducts {
        is_active: Some(true),
        ..SearchProducts::default()
    };
    let before = service.search_products(active_query.clone()).await.unwrap().value;
    assert_eq!(before.total_count, 2);

    service
        .deactivate_product(DeactivateProduct { id: chair.id })
        .await
        .unwrap();

    let after = service.search_products(active_query).await.unwrap();
    assert!(!after.cache_hit);
    assert_eq!(after.value.total_count, 1);
    assert_eq!(after.value.items[0].sku, "SKU-2");
}

#[tokio::test]
async fn catalog_walkthrough_stays_coherent() {
    let service = service();

    let kettle = service
        .create_product(CreateProduct {
            sku: "SKU_CACHE".to_string(),
            name: "Walkthrough Kettle".to_string(),
            description: Some("Stovetop kettle.".to_string()),
            price: Price::from_minor_units(1_100),
            currency: "USD".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(kettle.price.to_string(), "11.00");

    let miss = service
        .get_product_by_id(GetProductById { id: kettle.id })
        .await
        .unwrap();
    let hit = service
        .get_product_by_id(GetProductById { id: kettle.id })
        .await
        .unwrap();
    assert!(!miss.cache_hit);
    assert!(hit.cache_hit);
    assert_eq!(miss.value, hit.value);

    let err = service
        .create_product(create_cmd("SKU_CACHE", "Duplicate Kettle", 1_100))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "catalog.conflict");

    let before = service.search_products(SearchProducts::default()).await.unwrap();
    assert_eq!(before.value.total_count, 1);

    service
        .create_product(create_cmd("SKU_CACHE_2", "Walkthrough Tray", 2_200))
        .await
        .unwrap();

    let after = service.search_products(SearchProducts::default()).await.unwrap();
    assert!(!after.cache_hit);
    assert_eq!(after.value.total_count, 2);
}

#[tokio::test]
async fn version_bumps_move_the_search_namespace() {
    let cache: Arc<dyn CacheStore> = Arc::new(MemoryCacheStore::new(&CacheConfig::default()));
    let registry = VersionRegistry::new(Arc::clone(&cache), Duration::from_secs(3_600));

    let baseline = registry.current(SEARCH_VERSION).await.unwrap();
    assert_eq!(baseline, BASELINE_VERSION);

    let filter = ProductFilter::default();
    let page = PageRequest {
        page: 1,
        page_size: 20,
    };
    let key_before = search_key(&baseline, &filter, page);

    let bumped = registry.bump(SEARCH_VERSION).await.unwrap();
    assert_ne!(bumped, baseline);
    assert_eq!(registry.current(SEARCH_VERSION).await.unwrap(), bumped);

    let key_after = search_key(&bumped, &filter, page);
    assert_ne!(key_after, key_before);
}

#[tokio::test]
async fn undecodable_entries_degrade_to_store_reads() {
    let cache = Arc::new(MemoryCacheStore::new(&CacheConfig::default()));
    let service = CatalogService::new(
        Arc::new(MemoryProductStore::new()),
        Arc::clone(&cache) as Arc<dyn CacheStore>,
        CacheConfig::default(),
    );

    let created = service
        .create_product(create_cmd("SKU-1", "Garbled Mug", 1_000))
        .await
        .unwrap();
    let key = product_key(created.id);
    cache
        .set(&key, Bytes::from_static(b"not json"), Duration::from_secs(60))
        .await
        .unwrap();

    let read = service
        .get_product_by_id(GetProductById { id: created.id })
        .await
        .unwrap();
    assert!(!read.cache_hit);
    assert_eq!(read.value, created);

    // The broken entry was replaced on the way out.
    let hit = service
        .get_product_by_id(GetProductById { id: created.id })
        .await
        .unwrap();
    assert!(hit.cache_hit);
}

struct FailingCacheStore;

#[async_trait]
impl CacheStore for FailingCacheStore {
    async fn get(&self, _key: &str) -> Result<Option<Bytes>, CacheError> {
        Err(CacheError::Unavailable("cache offline".to_string()))
    }

    async fn set(&self, _key: &str, _value: Bytes, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("cache offline".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("cache offline".to_string()))
    }
}

#[tokio::test]
async fn cache_outage_degrades_to_store_reads() {
    let service = CatalogService::new(
        Arc::new(MemoryProductStore::new()),
        Arc::new(FailingCacheStore),
        CacheConfig::default(),
    );

    let created = service
        .create_product(create_cmd("SKU-OUT", "Outage Lamp", 5_000))
        .await
        .unwrap();

    let first = service
        .get_product_by_id(GetProductById { id: created.id })
        .await
        .unwrap();
    let second = service
        .get_product_by_id(GetProductById { id: created.id })
        .await
        .unwrap();
    assert!(!first.cache_hit);
    assert!(!second.cache_hit);
    assert_eq!(first.value, second.value);

    service
        .update_product(UpdateProduct {
            id: created.id,
            name: "Outage Lamp II".to_string(),
            description: None,
            price: Price::from_minor_units(5_500),
            currency: "USD".to_string(),
        })
        .await
        .unwrap();

    let page = service.search_products(SearchProducts::default()).await.unwrap();
    assert!(!page.cache_hit);
    assert_eq!(page.value.total_count, 1);
    assert_eq!(page.value.items[0].name, "Outage Lamp II");

    service
        .deactivate_product(DeactivateProduct { id: created.id })
        .await
        .unwrap();
    let after = service
        .get_product_by_id(GetProductById { id: created.id })
        .await
        .unwrap();
    assert!(!after.value.is_active);
}
