use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

// Path relative to crates/catalog-db/Cargo.toml; resolves to <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &catalog_core::AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("record not found")]
    NotFound,
    #[error("user has already liked this {0}")]
    AlreadyLiked(likes::SubjectKind),
    #[error("user has not liked this {0}")]
    NotLiked(likes::SubjectKind),
    #[error("{0} no longer exists; like record change was rolled back")]
    SubjectNotFound(likes::SubjectKind),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Connect to a Postgres pool using explicit URL and config.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Run all pending migrations against the pool.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Run migrations with a bounded number of fixed-backoff attempts.
///
/// Schema and index creation happens once at process startup; the database
/// may still be coming up at that point, so transient failures are retried
/// up to `max_attempts` times with a fixed `backoff` between attempts.
/// Exhausting the attempts returns the last error, which is fatal to startup.
///
/// # Errors
///
/// Returns [`DbError::Migration`] with the final attempt's error once all
/// attempts are exhausted.
pub async fn run_migrations_with_retry(
    pool: &PgPool,
    max_attempts: u32,
    backoff: Duration,
) -> Result<(), DbError> {
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match run_migrations(pool).await {
            Ok(()) => return Ok(()),
            Err(e) if attempt < max_attempts => {
                tracing::warn!(
                    error = %e,
                    attempt,
                    max_attempts,
                    "migration attempt failed; retrying after backoff"
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(e) => return Err(DbError::Migration(e)),
        }
    }
}

/// Send a `SELECT 1` to verify the pool has a live connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// Run a full health check: ping the pool and return a typed error on failure.
///
/// # Errors
///
/// Returns [`DbError`] if the ping fails.
pub async fn health_check(pool: &PgPool) -> Result<(), DbError> {
    ping(pool).await?;
    Ok(())
}


pub mod brands;
pub mod events;
pub mod likes;
pub mod products;
pub mod read_model;

pub use brands::{get_brand, get_brands_by_ids, list_brands, upsert_brand, BrandRow, NewBrand};
pub use events::{record_purchase, record_view};
pub use likes::{adjust_counter, like, liked_subject_ids, unlike, SubjectKind};
pub use products::{
    create_product, delete_product, get_product, get_products_by_ids, list_products,
    update_product, NewProduct, ProductFilters, ProductPatch, ProductRow,
};
pub use read_model::{
    get_combined, join_with_brands, liked_brands, liked_products, list_combined, order_by_ids,
    resolve_many, CombinedProduct,
};
