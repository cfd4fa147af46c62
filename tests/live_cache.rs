//! Live cache tests against a running Redis instance.
//!
//! - Exercises the Redis-backed store and the version registry end to end.
//! - Marked `#[ignore]` so the suite only runs where Redis is reachable.
//! - Reads the server address from `VETRINA_TEST_REDIS_URL`
//!   (default `redis://127.0.0.1:6379`).

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use uuid::Uuid;

use vetrina::cache::{BASELINE_VERSION, CacheStore, RedisCacheStore, VersionRegistry, verify_round_trip};

type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Tests that a value written through the store comes back intact and that
/// deletion removes it.
#[tokio::test]
#[ignore]
async fn live_set_get_delete_round_trips() -> TestResult<()> {
    let store = connect().await?;
    let key = test_key("entry");

    store
        .set(&key, Bytes::from_static(b"payload"), Duration::from_secs(30))
        .await?;
    let value = store.get(&key).await?;
    assert_eq!(value.as_deref(), Some(b"payload".as_slice()));

    store.delete(&key).await?;
    assert!(store.get(&key).await?.is_none());

    Ok(())
}

/// Tests the readiness probe used at startup.
#[tokio::test]
#[ignore]
async fn live_readiness_probe_passes() -> TestResult<()> {
    let store = connect().await?;
    verify_round_trip(&store).await?;
    Ok(())
}

/// Tests that entries honor their TTL and disappear on their own.
#[tokio::test]
#[ignore]
async fn live_entries_expire_through_their_ttl() -> TestResult<()> {
    let store = connect().await?;
    let key = test_key("expiring");

    store
        .set(&key, Bytes::from_static(b"short-lived"), Duration::from_secs(1))
        .await?;
    assert!(store.get(&key).await?.is_some());

    tokio::time::sleep(Duration::from_millis(1_400)).await;
    assert!(store.get(&key).await?.is_none());

    Ok(())
}

/// Tests the version registry over Redis: a fresh namespace starts at the
/// baseline token, and bumps replace it with a distinct token that later
/// reads observe.
#[tokio::test]
#[ignore]
async fn live_version_registry_rotates_tokens() -> TestResult<()> {
    let cache = Arc::new(connect().await?);
    let registry = VersionRegistry::new(
        Arc::clone(&cache) as Arc<dyn CacheStore>,
        Duration::from_secs(60),
    );
    let namespace = test_key("version");

    let initial = registry.current(&namespace).await?;
    assert_eq!(initial, BASELINE_VERSION);

    let bumped = registry.bump(&namespace).await?;
    assert_ne!(bumped, initial);
    assert_eq!(registry.current(&namespace).await?, bumped);

    cache.delete(&namespace).await?;
    Ok(())
}

/// Tests that missing keys read as absent rather than erroring.
#[tokio::test]
#[ignore]
async fn live_missing_keys_read_as_none() -> TestResult<()> {
    let store = connect().await?;
    assert!(store.get(&test_key("never-written")).await?.is_none());
    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

fn redis_url() -> String {
    std::env::var("VETRINA_TEST_REDIS_URL")
        .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

fn test_key(kind: &str) -> String {
    format!("catalog:test:{kind}:{}", Uuid::new_v4().simple())
}

async fn connect() -> TestResult<RedisCacheStore> {
    Ok(RedisCacheStore::connect(&redis_url(), Duration::from_millis(2_000)).await?)
}
