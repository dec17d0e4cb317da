//! Append-only view/purchase telemetry and their derived counters.
//!
//! These are fire-and-forget logs: the event row is written first, then the
//! product counter is bumped. A vanished product is tolerated — the event
//! stands on its own and the counter update simply matches nothing.

use sqlx::PgPool;

use crate::DbError;

/// Records that `user_id` viewed `product_id` and increments `view_count`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either statement fails.
pub async fn record_view(pool: &PgPool, product_id: i64, user_id: &str) -> Result<(), DbError> {
    sqlx::query("INSERT INTO product_views (product_id, user_id) VALUES ($1, $2)")
        .bind(product_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    sqlx::query("UPDATE products SET view_count = view_count + 1 WHERE id = $1")
        .bind(product_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Records that `user_id` purchased `product_id` and increments
/// `purchase_count`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either statement fails.
pub async fn record_purchase(pool: &PgPool, product_id: i64, user_id: &str) -> Result<(), DbError> {
    sqlx::query("INSERT INTO product_purchases (product_id, user_id) VALUES ($1, $2)")
        .bind(product_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    sqlx::query("UPDATE products SET purchase_count = purchase_count + 1 WHERE id = $1")
        .bind(product_id)
        .execute(pool)
        .await?;

    Ok(())
}
