//! Postgres-backed product store.

mod products;
mod util;

pub use products::PostgresProductStore;
pub use util::map_sqlx_error;

use std::time::Duration;

use metrics::counter;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::warn;

use crate::config::DatabaseSettings;

/// Opens a bounded connection pool against `url`.
pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(Into::into)
}

/// Bounded retry for transient store failures. `attempts` counts every try
/// including the first; backoff grows linearly between tries.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            backoff: Duration::from_millis(200),
        }
    }
}

impl From<&DatabaseSettings> for RetryPolicy {
    fn from(settings: &DatabaseSettings) -> Self {
        Self {
            attempts: settings.retry_attempts.get(),
            backoff: settings.retry_backoff,
        }
    }
}

/// Runs `op`, retrying transient failures until the policy's attempt budget
/// is spent. Callers never observe the intermediate failures.
pub(crate) async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, sqlx::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < attempts && is_transient(&err) => {
                warn!(attempt, error = %err, "transient database failure, retrying");
                counter!("vetrina_store_retry_total").increment(1);
                tokio::time::sleep(policy.backoff * attempt).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

fn is_transient(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut)
}
