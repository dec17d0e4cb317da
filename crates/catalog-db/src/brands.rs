//! Database operations for the `brands` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `brands` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BrandRow {
    pub id: i64,
    pub brand_kor: Option<String>,
    pub brand_eng: Option<String>,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for brand upsert. `id` is assigned by the upstream pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBrand {
    pub id: i64,
    pub brand_kor: Option<String>,
    pub brand_eng: Option<String>,
}

/// Returns all brands, ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_brands(pool: &PgPool) -> Result<Vec<BrandRow>, DbError> {
    let rows = sqlx::query_as::<_, BrandRow>(
        "SELECT id, brand_kor, brand_eng, like_count, created_at, updated_at \
         FROM brands \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single brand by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_brand(pool: &PgPool, id: i64) -> Result<Option<BrandRow>, DbError> {
    let row = sqlx::query_as::<_, BrandRow>(
        "SELECT id, brand_kor, brand_eng, like_count, created_at, updated_at \
         FROM brands \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns all brands whose id is in `ids`. Used by the read-model layer to
/// resolve every distinct brand of a product page in one query.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_brands_by_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<BrandRow>, DbError> {
    let rows = sqlx::query_as::<_, BrandRow>(
        "SELECT id, brand_kor, brand_eng, like_count, created_at, updated_at \
         FROM brands \
         WHERE id = ANY($1) \
         ORDER BY id",
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Upserts a brand row. Conflicts on `id` update the display names in place;
/// `like_count` is never touched here — it only moves through the like path.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_brand(pool: &PgPool, brand: &NewBrand) -> Result<BrandRow, DbError> {
    let row = sqlx::query_as::<_, BrandRow>(
        "INSERT INTO brands (id, brand_kor, brand_eng) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (id) DO UPDATE SET \
             brand_kor  = EXCLUDED.brand_kor, \
             brand_eng  = EXCLUDED.brand_eng, \
             updated_at = NOW() \
         RETURNING id, brand_kor, brand_eng, like_count, created_at, updated_at",
    )
    .bind(brand.id)
    .bind(&brand.brand_kor)
    .bind(&brand.brand_eng)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
