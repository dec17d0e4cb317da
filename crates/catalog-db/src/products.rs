//! Database operations for the `products` table.

use catalog_core::PageRequest;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::DbError;

const PRODUCT_COLUMNS: &str = "id, name, price, discounted_price, discount, major_category, \
     sub_category, gender, img_url, rank, like_count, view_count, purchase_count, \
     brand_id, created_at, updated_at";

// ---------------------------------------------------------------------------
// Row and input types
// ---------------------------------------------------------------------------

/// A row from the `products` table.
///
/// Serialized directly in create/update responses — the stored document is
/// the response shape.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub price: Option<Decimal>,
    pub discounted_price: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub major_category: Option<String>,
    pub sub_category: Option<String>,
    pub gender: Option<String>,
    pub img_url: Option<String>,
    pub rank: Option<i32>,
    pub like_count: i64,
    pub view_count: i64,
    pub purchase_count: i64,
    pub brand_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for product creation. `id` is assigned by the upstream pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub id: i64,
    pub name: String,
    pub price: Option<Decimal>,
    pub discounted_price: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub major_category: Option<String>,
    pub sub_category: Option<String>,
    pub gender: Option<String>,
    pub img_url: Option<String>,
    pub rank: Option<i32>,
    pub brand_id: i64,
}

/// Partial update for a product; absent fields are left unchanged.
///
/// Counters are deliberately not updatable here — they only move through the
/// like/view/purchase paths.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub discounted_price: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub major_category: Option<String>,
    pub sub_category: Option<String>,
    pub gender: Option<String>,
    pub img_url: Option<String>,
    pub rank: Option<i32>,
    pub brand_id: Option<i64>,
}

/// Filter criteria for product listing. Absent fields impose no constraint;
/// `name` is a case-insensitive substring match.
#[derive(Debug, Clone, Default)]
pub struct ProductFilters<'a> {
    pub name: Option<&'a str>,
    pub major_category: Option<&'a str>,
    pub gender: Option<&'a str>,
    pub brand_id: Option<i64>,
}

/// Escapes `%`, `_` and `\` so a user-supplied string matches literally
/// inside an `ILIKE` pattern.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Counts matching products, then returns the requested page in ascending
/// `id` order. The count covers all matches regardless of the page, so
/// `total` is stable across pages of the same filter set.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn list_products(
    pool: &PgPool,
    filters: &ProductFilters<'_>,
    page: PageRequest,
) -> Result<(i64, Vec<ProductRow>), DbError> {
    let name_pattern = filters.name.map(escape_like);

    let total: i64 = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM products \
         WHERE ($1::TEXT IS NULL OR name ILIKE '%' || $1 || '%') \
           AND ($2::TEXT IS NULL OR major_category = $2) \
           AND ($3::TEXT IS NULL OR gender = $3) \
           AND ($4::BIGINT IS NULL OR brand_id = $4)",
    )
    .bind(name_pattern.as_deref())
    .bind(filters.major_category)
    .bind(filters.gender)
    .bind(filters.brand_id)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE ($1::TEXT IS NULL OR name ILIKE '%' || $1 || '%') \
           AND ($2::TEXT IS NULL OR major_category = $2) \
           AND ($3::TEXT IS NULL OR gender = $3) \
           AND ($4::BIGINT IS NULL OR brand_id = $4) \
         ORDER BY id \
         OFFSET $5 LIMIT $6",
    ))
    .bind(name_pattern.as_deref())
    .bind(filters.major_category)
    .bind(filters.gender)
    .bind(filters.brand_id)
    .bind(page.offset())
    .bind(page.limit())
    .fetch_all(pool)
    .await?;

    Ok((total, rows))
}

/// Returns a single product by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product(pool: &PgPool, id: i64) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1",
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns all products whose id is in `ids`, in ascending `id` order.
/// Missing ids are silently absent from the result.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_products_by_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1) ORDER BY id",
    ))
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Inserts a product if no row with that id exists; an existing row wins and
/// is returned unchanged (insert-if-absent, not a full upsert).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, or [`DbError::NotFound`]
/// if the row vanished between insert and read-back.
pub async fn create_product(pool: &PgPool, product: &NewProduct) -> Result<ProductRow, DbError> {
    sqlx::query(
        "INSERT INTO products \
             (id, name, price, discounted_price, discount, major_category, \
              sub_category, gender, img_url, rank, brand_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(product.id)
    .bind(&product.name)
    .bind(product.price)
    .bind(product.discounted_price)
    .bind(product.discount)
    .bind(&product.major_category)
    .bind(&product.sub_category)
    .bind(&product.gender)
    .bind(&product.img_url)
    .bind(product.rank)
    .bind(product.brand_id)
    .execute(pool)
    .await?;

    get_product(pool, product.id).await?.ok_or(DbError::NotFound)
}

/// Applies a partial update, bumping `updated_at`. Fields absent from the
/// patch keep their current value.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no product has this id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_product(
    pool: &PgPool,
    id: i64,
    patch: &ProductPatch,
) -> Result<ProductRow, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "UPDATE products SET \
             name             = COALESCE($2, name), \
             price            = COALESCE($3, price), \
             discounted_price = COALESCE($4, discounted_price), \
             discount         = COALESCE($5, discount), \
             major_category   = COALESCE($6, major_category), \
             sub_category     = COALESCE($7, sub_category), \
             gender           = COALESCE($8, gender), \
             img_url          = COALESCE($9, img_url), \
             rank             = COALESCE($10, rank), \
             brand_id         = COALESCE($11, brand_id), \
             updated_at       = NOW() \
         WHERE id = $1 \
         RETURNING {PRODUCT_COLUMNS}",
    ))
    .bind(id)
    .bind(&patch.name)
    .bind(patch.price)
    .bind(patch.discounted_price)
    .bind(patch.discount)
    .bind(&patch.major_category)
    .bind(&patch.sub_category)
    .bind(&patch.gender)
    .bind(&patch.img_url)
    .bind(patch.rank)
    .bind(patch.brand_id)
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}

/// Deletes a product by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no product has this id, or
/// [`DbError::Sqlx`] if the delete fails.
pub async fn delete_product(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let deleted = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
