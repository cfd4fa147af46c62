//! Configuration layer: typed settings with layered precedence (defaults → file → env).

use std::{num::NonZeroU32, path::Path, str::FromStr, time::Duration};

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "vetrina";
const ENV_PREFIX: &str = "VETRINA";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_DB_RETRY_ATTEMPTS: u32 = 5;
const DEFAULT_DB_RETRY_BACKOFF_MS: u64 = 200;

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: NonZeroU32,
    pub retry_attempts: NonZeroU32,
    pub retry_backoff: Duration,
}

/// Cache backend selection plus the knobs forwarded into
/// [`crate::cache::CacheConfig`].
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub backend: CacheBackend,
    pub redis_url: Option<String>,
    pub product_ttl_secs: u64,
    pub search_ttl_secs: u64,
    pub version_ttl_secs: u64,
    pub op_timeout_ms: u64,
    pub memory_capacity: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Memory,
    Redis,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (files, then environment).
pub fn load(config_file: Option<&Path>) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = config_file {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let raw: RawSettings = builder.build()?.try_deserialize()?;
    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    database: RawDatabaseSettings,
    cache: RawCacheSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDatabaseSettings {
    url: Option<String>,
    max_connections: Option<u32>,
    retry_attempts: Option<u32>,
    retry_backoff_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    backend: Option<String>,
    redis_url: Option<String>,
    product_ttl_secs: Option<u64>,
    search_ttl_secs: Option<u64>,
    version_ttl_secs: Option<u64>,
    op_timeout_ms: Option<u64>,
    memory_capacity: Option<usize>,
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            database,
            cache,
        } = raw;

        let logging = build_logging_settings(logging)?;
        let database = build_database_settings(database)?;
        let cache = build_cache_settings(cache)?;

        Ok(Self {
            logging,
            database,
            cache,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_database_settings(database: RawDatabaseSettings) -> Result<DatabaseSettings, LoadError> {
    let url = database.url.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    });

    let max_connections = non_zero_u32(
        database
            .max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
        "database.max_connections",
    )?;
    let retry_attempts = non_zero_u32(
        database.retry_attempts.unwrap_or(DEFAULT_DB_RETRY_ATTEMPTS),
        "database.retry_attempts",
    )?;

    let backoff_ms = database
        .retry_backoff_ms
        .unwrap_or(DEFAULT_DB_RETRY_BACKOFF_MS);
    if backoff_ms == 0 {
        return Err(LoadError::invalid(
            "database.retry_backoff_ms",
            "must be greater than zero",
        ));
    }

    Ok(DatabaseSettings {
        url,
        max_connections,
        retry_attempts,
        retry_backoff: Duration::from_millis(backoff_ms),
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let backend = match cache.backend.as_deref() {
        None | Some("memory") => CacheBackend::Memory,
        Some("redis") => CacheBackend::Redis,
        Some(other) => {
            return Err(LoadError::invalid(
                "cache.backend",
                format!("unknown backend `{other}`, expected `memory` or `redis`"),
            ));
        }
    };

    let redis_url = cache.redis_url.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    });
    if backend == CacheBackend::Redis && redis_url.is_none() {
        return Err(LoadError::invalid(
            "cache.redis_url",
            "required when cache.backend is `redis`",
        ));
    }

    let defaults = crate::cache::CacheConfig::default();
    let product_ttl_secs = cache.product_ttl_secs.unwrap_or(defaults.product_ttl_secs);
    let search_ttl_secs = cache.search_ttl_secs.unwrap_or(defaults.search_ttl_secs);
    let version_ttl_secs = cache.version_ttl_secs.unwrap_or(defaults.version_ttl_secs);
    let op_timeout_ms = cache.op_timeout_ms.unwrap_or(defaults.op_timeout_ms);
    for (key, value) in [
        ("cache.product_ttl_secs", product_ttl_secs),
        ("cache.search_ttl_secs", search_ttl_secs),
        ("cache.version_ttl_secs", version_ttl_secs),
        ("cache.op_timeout_ms", op_timeout_ms),
    ] {
        if value == 0 {
            return Err(LoadError::invalid(key, "must be greater than zero"));
        }
    }

    let memory_capacity = cache.memory_capacity.unwrap_or(defaults.memory_capacity);
    if memory_capacity == 0 {
        return Err(LoadError::invalid(
            "cache.memory_capacity",
            "must be greater than zero",
        ));
    }

    Ok(CacheSettings {
        backend,
        redis_url,
        product_ttl_secs,
        search_ttl_secs,
        version_ttl_secs,
        op_timeout_ms,
        memory_capacity,
    })
}

fn non_zero_u32(value: u32, key: &'static str) -> Result<NonZeroU32, LoadError> {
    NonZeroU32::new(value).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}
