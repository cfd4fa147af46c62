//! Catalog cache subsystem.
//!
//! One volatile key/value store fronts the catalog's reads:
//!
//! - **Point entries**: one serialized product per id, product TTL
//! - **Search pages**: one serialized result page per normalized request,
//!   keyed under the current search version token, search TTL
//!
//! Writers never enumerate or delete search entries. They advance the
//! version token (see [`VersionRegistry`]) so every later search derives a
//! key in the new generation; stranded pages expire through their own TTL.
//!
//! ## Configuration
//!
//! Cache behavior is controlled via the `[cache]` settings section:
//!
//! ```toml
//! [cache]
//! product_ttl_secs = 300
//! search_ttl_secs = 120
//! op_timeout_ms = 2000
//! # ... see config.rs for all options
//! ```

mod config;
mod keys;
mod memory;
mod redis;
mod store;
mod version;

pub use config::CacheConfig;
pub use keys::{SEARCH_VERSION, normalize_query, product_key, search_key};
pub use memory::MemoryCacheStore;
pub use redis::RedisCacheStore;
pub use store::{CacheError, CacheStore, verify_round_trip};
pub use version::{BASELINE_VERSION, VersionRegistry};
