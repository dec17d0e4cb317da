//! The combined product/brand read model.
//!
//! Every read path that needs brand context works the same way: fetch the
//! products, collect their distinct `brand_id`s, fetch those brands in one
//! query, and merge through an in-memory map. A per-product brand lookup
//! would reintroduce the N+1 pattern this layer exists to avoid.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::brands::{self, BrandRow};
use crate::likes::{self, SubjectKind};
use crate::products::{self, ProductFilters, ProductRow};
use crate::DbError;
use catalog_core::PageRequest;

/// A product merged with its owning brand's display fields.
///
/// Built per request, never persisted. `brand_like_count` is the brand's
/// live counter at join time, not a per-product copy. The brand fields stay
/// `None` when the referenced brand does not exist — a join miss is a normal
/// omission, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct CombinedProduct {
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
    pub brand_kor: Option<String>,
    pub brand_eng: Option<String>,
    pub brand_like_count: Option<i64>,
}

fn combine(product: ProductRow, brand: Option<&BrandRow>) -> CombinedProduct {
    CombinedProduct {
        id: product.id,
        name: product.name,
        price: product.price,
        discounted_price: product.discounted_price,
        discount: product.discount,
        major_category: product.major_category,
        sub_category: product.sub_category,
        gender: product.gender,
        img_url: product.img_url,
        rank: product.rank,
        like_count: product.like_count,
        view_count: product.view_count,
        purchase_count: product.purchase_count,
        brand_id: product.brand_id,
        created_at: product.created_at,
        updated_at: product.updated_at,
        brand_kor: brand.and_then(|b| b.brand_kor.clone()),
        brand_eng: brand.and_then(|b| b.brand_eng.clone()),
        brand_like_count: brand.map(|b| b.like_count),
    }
}

/// Merges each product with its brand via a map built once from `brands`.
/// Output preserves the order and length of `products`.
#[must_use]
pub fn join_with_brands(products: Vec<ProductRow>, brands: &[BrandRow]) -> Vec<CombinedProduct> {
    let by_id: HashMap<i64, &BrandRow> = brands.iter().map(|b| (b.id, b)).collect();
    products
        .into_iter()
        .map(|p| {
            let brand = by_id.get(&p.brand_id).copied();
            combine(p, brand)
        })
        .collect()
}

/// Reorders `items` to follow the relative order of `ids`; ids with no
/// matching item are dropped.
#[must_use]
pub fn order_by_ids<T>(ids: &[i64], items: Vec<T>, id_of: impl Fn(&T) -> i64) -> Vec<T> {
    let mut by_id: HashMap<i64, T> = items.into_iter().map(|item| (id_of(&item), item)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

fn distinct_brand_ids(products: &[ProductRow]) -> Vec<i64> {
    products
        .iter()
        .map(|p| p.brand_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

async fn join_page(
    pool: &PgPool,
    products: Vec<ProductRow>,
) -> Result<Vec<CombinedProduct>, DbError> {
    let brand_ids = distinct_brand_ids(&products);
    let brands = brands::get_brands_by_ids(pool, &brand_ids).await?;
    Ok(join_with_brands(products, &brands))
}

/// Returns `(total, page)` of combined products for the given filters.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any query fails.
pub async fn list_combined(
    pool: &PgPool,
    filters: &ProductFilters<'_>,
    page: PageRequest,
) -> Result<(i64, Vec<CombinedProduct>), DbError> {
    let (total, rows) = products::list_products(pool, filters, page).await?;
    let combined = join_page(pool, rows).await?;
    Ok((total, combined))
}

/// Returns a single product joined with its brand.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the product does not exist, or
/// [`DbError::Sqlx`] if a query fails. A missing brand is not an error.
pub async fn get_combined(pool: &PgPool, id: i64) -> Result<CombinedProduct, DbError> {
    let product = products::get_product(pool, id)
        .await?
        .ok_or(DbError::NotFound)?;
    let brand = brands::get_brand(pool, product.brand_id).await?;
    Ok(combine(product, brand.as_ref()))
}

/// Resolves a batch of product ids into combined records, preserving the
/// relative order of `ids`. Ids with no matching product are omitted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any query fails.
pub async fn resolve_many(pool: &PgPool, ids: &[i64]) -> Result<Vec<CombinedProduct>, DbError> {
    let rows = products::get_products_by_ids(pool, ids).await?;
    let rows = order_by_ids(ids, rows, |p| p.id);
    join_page(pool, rows).await
}

/// Returns the products a user has liked, in like-event order. Products
/// deleted since the like are dropped; a user with no likes gets an empty
/// list.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any query fails.
pub async fn liked_products(pool: &PgPool, user_id: &str) -> Result<Vec<ProductRow>, DbError> {
    let ids = likes::liked_subject_ids(pool, SubjectKind::Product, user_id).await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = products::get_products_by_ids(pool, &ids).await?;
    Ok(order_by_ids(&ids, rows, |p| p.id))
}

/// Returns the brands a user has liked, in like-event order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any query fails.
pub async fn liked_brands(pool: &PgPool, user_id: &str) -> Result<Vec<BrandRow>, DbError> {
    let ids = likes::liked_subject_ids(pool, SubjectKind::Brand, user_id).await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = brands::get_brands_by_ids(pool, &ids).await?;
    Ok(order_by_ids(&ids, rows, |b| b.id))
}
