//! Live integration tests for catalog-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/catalog-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory. All tests are `#[ignore]`d so the default test run
//! stays offline; run them with `cargo test -- --ignored` against a Postgres
//! reachable through `DATABASE_URL`.

use catalog_core::PageRequest;
use catalog_db::{
    create_product, delete_product, get_combined, like, liked_brands, liked_products,
    list_combined, record_purchase, record_view, resolve_many, unlike, update_product,
    upsert_brand, DbError, NewBrand, NewProduct, ProductFilters, ProductPatch, SubjectKind,
};
use rust_decimal::Decimal;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_brand(pool: &sqlx::PgPool, id: i64, eng: &str) {
    upsert_brand(
        pool,
        &NewBrand {
            id,
            brand_kor: Some(format!("{eng} KR")),
            brand_eng: Some(eng.to_string()),
        },
    )
    .await
    .unwrap_or_else(|e| panic!("seed_brand failed for id {id}: {e}"));
}

async fn seed_product(pool: &sqlx::PgPool, id: i64, name: &str, brand_id: i64) {
    create_product(
        pool,
        &NewProduct {
            id,
            name: name.to_string(),
            price: Some(Decimal::new(19_900, 0)),
            discounted_price: None,
            discount: None,
            major_category: Some("top".to_string()),
            sub_category: None,
            gender: Some("U".to_string()),
            img_url: None,
            rank: None,
            brand_id,
        },
    )
    .await
    .unwrap_or_else(|e| panic!("seed_product failed for id {id}: {e}"));
}

async fn product_like_count(pool: &sqlx::PgPool, id: i64) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT like_count FROM products WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("fetch like_count")
}

async fn ledger_count(pool: &sqlx::PgPool, product_id: i64, user_id: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM product_likes WHERE product_id = $1 AND user_id = $2",
    )
    .bind(product_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
    .expect("count ledger rows")
}

// ---------------------------------------------------------------------------
// Like ledger and counters
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn like_then_unlike_round_trip(pool: sqlx::PgPool) {
    seed_brand(&pool, 5, "Brand Five").await;
    seed_product(&pool, 42, "Linen Shirt", 5).await;
    sqlx::query("UPDATE products SET like_count = 3 WHERE id = 42")
        .execute(&pool)
        .await
        .expect("preset counter");

    like(&pool, SubjectKind::Product, 42, "u1").await.expect("like");
    assert_eq!(product_like_count(&pool, 42).await, 4);
    assert_eq!(ledger_count(&pool, 42, "u1").await, 1);

    let err = like(&pool, SubjectKind::Product, 42, "u1")
        .await
        .expect_err("second like must fail");
    assert!(matches!(err, DbError::AlreadyLiked(SubjectKind::Product)));
    assert_eq!(product_like_count(&pool, 42).await, 4);
    assert_eq!(ledger_count(&pool, 42, "u1").await, 1);

    unlike(&pool, SubjectKind::Product, 42, "u1").await.expect("unlike");
    assert_eq!(product_like_count(&pool, 42).await, 3);
    assert_eq!(ledger_count(&pool, 42, "u1").await, 0);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn unlike_without_like_fails(pool: sqlx::PgPool) {
    seed_brand(&pool, 5, "Brand Five").await;
    seed_product(&pool, 1, "Hoodie", 5).await;

    let err = unlike(&pool, SubjectKind::Product, 1, "u1")
        .await
        .expect_err("unlike with empty ledger must fail");
    assert!(matches!(err, DbError::NotLiked(SubjectKind::Product)));
    assert_eq!(product_like_count(&pool, 1).await, 0);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn like_on_missing_product_compensates_ledger(pool: sqlx::PgPool) {
    let err = like(&pool, SubjectKind::Product, 999, "u1")
        .await
        .expect_err("like on missing product must fail");
    assert!(matches!(err, DbError::SubjectNotFound(SubjectKind::Product)));
    // The ledger insert was rolled back.
    assert_eq!(ledger_count(&pool, 999, "u1").await, 0);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn unlike_after_product_deletion_restores_ledger(pool: sqlx::PgPool) {
    seed_brand(&pool, 5, "Brand Five").await;
    seed_product(&pool, 7, "Parka", 5).await;
    like(&pool, SubjectKind::Product, 7, "u1").await.expect("like");

    delete_product(&pool, 7).await.expect("delete product");

    let err = unlike(&pool, SubjectKind::Product, 7, "u1")
        .await
        .expect_err("unlike on deleted product must fail");
    assert!(matches!(err, DbError::SubjectNotFound(SubjectKind::Product)));
    // Compensation re-inserted the ledger record it had removed.
    assert_eq!(ledger_count(&pool, 7, "u1").await, 1);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn brand_likes_use_their_own_ledger(pool: sqlx::PgPool) {
    seed_brand(&pool, 9, "Brand Nine").await;

    like(&pool, SubjectKind::Brand, 9, "u1").await.expect("brand like");
    let err = like(&pool, SubjectKind::Brand, 9, "u1")
        .await
        .expect_err("duplicate brand like must fail");
    assert!(matches!(err, DbError::AlreadyLiked(SubjectKind::Brand)));

    let count: i64 = sqlx::query_scalar("SELECT like_count FROM brands WHERE id = 9")
        .fetch_one(&pool)
        .await
        .expect("brand like_count");
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn counter_matches_extant_ledger_under_concurrent_likes(pool: sqlx::PgPool) {
    seed_brand(&pool, 5, "Brand Five").await;
    seed_product(&pool, 11, "Socks", 5).await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            like(&pool, SubjectKind::Product, 11, &format!("user-{i}")).await
        }));
    }
    for handle in handles {
        handle.await.expect("join").expect("like");
    }

    assert_eq!(product_like_count(&pool, 11).await, 8);
    let ledger: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_likes WHERE product_id = 11")
        .fetch_one(&pool)
        .await
        .expect("ledger count");
    assert_eq!(ledger, 8);
}

// ---------------------------------------------------------------------------
// Read model
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn list_combined_paginates_with_stable_total(pool: sqlx::PgPool) {
    seed_brand(&pool, 5, "Brand Five").await;
    for i in 1..=25 {
        seed_product(&pool, i, &format!("Shirt {i:02}"), 5).await;
    }
    seed_product(&pool, 100, "Jeans", 5).await;

    let filters = ProductFilters {
        name: Some("shirt"),
        ..ProductFilters::default()
    };

    let page2 = PageRequest::new(2, 10).expect("page");
    let (total, items) = list_combined(&pool, &filters, page2).await.expect("list");
    assert_eq!(total, 25);
    assert_eq!(items.len(), 10);
    // Stable ascending-id order: page 2 of size 10 is ids 11..=20.
    let ids: Vec<i64> = items.iter().map(|p| p.id).collect();
    assert_eq!(ids, (11..=20).collect::<Vec<i64>>());
    assert!(items.iter().all(|p| p.brand_eng.as_deref() == Some("Brand Five")));

    // Concatenating all pages yields exactly `total` records, no duplicates.
    let mut seen = Vec::new();
    for page in 1..=3 {
        let page = PageRequest::new(page, 10).expect("page");
        let (_, items) = list_combined(&pool, &filters, page).await.expect("list");
        seen.extend(items.iter().map(|p| p.id));
    }
    let mut deduped = seen.clone();
    deduped.dedup();
    assert_eq!(seen.len(), 25);
    assert_eq!(deduped.len(), 25);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn get_combined_tolerates_missing_brand(pool: sqlx::PgPool) {
    // brand_id 77 does not exist.
    seed_product(&pool, 3, "Orphan Tee", 77).await;

    let combined = get_combined(&pool, 3).await.expect("get");
    assert_eq!(combined.id, 3);
    assert!(combined.brand_kor.is_none());
    assert!(combined.brand_like_count.is_none());

    let err = get_combined(&pool, 404).await.expect_err("missing product");
    assert!(matches!(err, DbError::NotFound));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn resolve_many_preserves_input_order_and_skips_missing(pool: sqlx::PgPool) {
    seed_brand(&pool, 5, "Brand Five").await;
    seed_product(&pool, 7, "Seven", 5).await;
    seed_product(&pool, 9, "Nine", 5).await;

    let combined = resolve_many(&pool, &[9, 8, 7]).await.expect("resolve");
    let ids: Vec<i64> = combined.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![9, 7]);
    assert_eq!(combined[0].brand_like_count, Some(0));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn liked_products_follow_like_order_and_drop_deleted(pool: sqlx::PgPool) {
    seed_brand(&pool, 5, "Brand Five").await;
    for id in [21, 22, 23] {
        seed_product(&pool, id, &format!("Item {id}"), 5).await;
    }
    like(&pool, SubjectKind::Product, 23, "u9").await.expect("like");
    like(&pool, SubjectKind::Product, 21, "u9").await.expect("like");
    like(&pool, SubjectKind::Product, 22, "u9").await.expect("like");

    delete_product(&pool, 21).await.expect("delete");

    let rows = liked_products(&pool, "u9").await.expect("liked");
    let ids: Vec<i64> = rows.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![23, 22]);

    let empty = liked_products(&pool, "nobody").await.expect("no likes");
    assert!(empty.is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn liked_brands_follow_like_order(pool: sqlx::PgPool) {
    seed_brand(&pool, 1, "One").await;
    seed_brand(&pool, 2, "Two").await;
    like(&pool, SubjectKind::Brand, 2, "u3").await.expect("like");
    like(&pool, SubjectKind::Brand, 1, "u3").await.expect("like");

    let rows = liked_brands(&pool, "u3").await.expect("liked");
    let ids: Vec<i64> = rows.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![2, 1]);
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn create_product_is_insert_if_absent(pool: sqlx::PgPool) {
    seed_product(&pool, 50, "Original", 5).await;

    // A second create with the same id must not overwrite the stored row.
    let row = create_product(
        &pool,
        &NewProduct {
            id: 50,
            name: "Impostor".to_string(),
            price: None,
            discounted_price: None,
            discount: None,
            major_category: None,
            sub_category: None,
            gender: None,
            img_url: None,
            rank: None,
            brand_id: 6,
        },
    )
    .await
    .expect("create");

    assert_eq!(row.name, "Original");
    assert_eq!(row.brand_id, 5);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn update_product_only_touches_present_fields(pool: sqlx::PgPool) {
    seed_product(&pool, 60, "Knit Sweater", 5).await;

    let patch = ProductPatch {
        price: Some(Decimal::new(9_900, 0)),
        ..ProductPatch::default()
    };
    let row = update_product(&pool, 60, &patch).await.expect("update");
    assert_eq!(row.price, Some(Decimal::new(9_900, 0)));
    assert_eq!(row.name, "Knit Sweater");
    assert!(row.updated_at >= row.created_at);

    let err = update_product(&pool, 61, &patch).await.expect_err("missing");
    assert!(matches!(err, DbError::NotFound));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn delete_product_reports_not_found(pool: sqlx::PgPool) {
    seed_product(&pool, 70, "Coat", 5).await;
    delete_product(&pool, 70).await.expect("delete");

    let err = delete_product(&pool, 70).await.expect_err("second delete");
    assert!(matches!(err, DbError::NotFound));
}

// ---------------------------------------------------------------------------
// Telemetry
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires Postgres via DATABASE_URL"]
async fn view_and_purchase_append_events_and_bump_counters(pool: sqlx::PgPool) {
    seed_product(&pool, 80, "Boots", 5).await;

    record_view(&pool, 80, "u1").await.expect("view");
    record_view(&pool, 80, "u2").await.expect("view");
    record_purchase(&pool, 80, "u1").await.expect("purchase");

    let (views, purchases): (i64, i64) = sqlx::query_as(
        "SELECT view_count, purchase_count FROM products WHERE id = 80",
    )
    .fetch_one(&pool)
    .await
    .expect("counters");
    assert_eq!(views, 2);
    assert_eq!(purchases, 1);

    let events: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_views WHERE product_id = 80")
        .fetch_one(&pool)
        .await
        .expect("events");
    assert_eq!(events, 2);

    // Telemetry for a vanished product is tolerated.
    record_view(&pool, 404, "u1").await.expect("view on missing product");
}
