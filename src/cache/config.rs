//! Cache configuration.
//!
//! Controls entry lifetimes, the per-operation timeout, and the in-process
//! store capacity.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

// Default values for cache configuration
const DEFAULT_PRODUCT_TTL_SECS: u64 = 300;
const DEFAULT_SEARCH_TTL_SECS: u64 = 120;
const DEFAULT_VERSION_TTL_SECS: u64 = 60 * 60 * 24 * 30;
const DEFAULT_OP_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_MEMORY_CAPACITY: usize = 10_000;

/// Cache tuning knobs, deserialized from the `[cache]` settings section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL for point-lookup entries (seconds).
    pub product_ttl_secs: u64,
    /// TTL for cached search pages (seconds).
    pub search_ttl_secs: u64,
    /// TTL for the search version token (seconds); effectively permanent.
    pub version_ttl_secs: u64,
    /// Upper bound on any single cache operation (milliseconds).
    pub op_timeout_ms: u64,
    /// Entry capacity of the in-process store.
    pub memory_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            product_ttl_secs: DEFAULT_PRODUCT_TTL_SECS,
            search_ttl_secs: DEFAULT_SEARCH_TTL_SECS,
            version_ttl_secs: DEFAULT_VERSION_TTL_SECS,
            op_timeout_ms: DEFAULT_OP_TIMEOUT_MS,
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            product_ttl_secs: settings.product_ttl_secs,
            search_ttl_secs: settings.search_ttl_secs,
            version_ttl_secs: settings.version_ttl_secs,
            op_timeout_ms: settings.op_timeout_ms,
            memory_capacity: settings.memory_capacity,
        }
    }
}

impl CacheConfig {
    pub fn product_ttl(&self) -> Duration {
        Duration::from_secs(self.product_ttl_secs)
    }

    pub fn search_ttl(&self) -> Duration {
        Duration::from_secs(self.search_ttl_secs)
    }

    pub fn version_ttl(&self) -> Duration {
        Duration::from_secs(self.version_ttl_secs)
    }

    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }

    /// Returns the memory-store capacity as NonZeroUsize, clamping to 1 if
    /// zero.
    pub fn memory_capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.memory_capacity).unwrap_or(NonZeroUsize::MIN)
    }
}
