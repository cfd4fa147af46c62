use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "vetrina_cache_hit_total",
            Unit::Count,
            "Total number of cache hits, labelled by lookup kind."
        );
        describe_counter!(
            "vetrina_cache_miss_total",
            Unit::Count,
            "Total number of cache misses, labelled by lookup kind."
        );
        describe_counter!(
            "vetrina_cache_error_total",
            Unit::Count,
            "Total number of swallowed cache failures, labelled by operation."
        );
        describe_counter!(
            "vetrina_search_version_bump_total",
            Unit::Count,
            "Total number of search-version advances after writes."
        );
        describe_counter!(
            "vetrina_store_retry_total",
            Unit::Count,
            "Total number of retried transient store failures."
        );
        describe_histogram!(
            "vetrina_search_store_ms",
            Unit::Milliseconds,
            "Store-side search latency in milliseconds."
        );
    });
}
