use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use catalog_core::{PageRequest, DEFAULT_PAGE_SIZE};
use catalog_db::{CombinedProduct, NewProduct, ProductFilters, ProductPatch, ProductRow};

use crate::middleware::RequestId;

use super::{map_db_error, map_paging_error, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ListQuery {
    pub name: Option<String>,
    pub major_category: Option<String>,
    pub gender: Option<String>,
    pub brand_id: Option<i64>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct PaginatedProducts {
    pub total: i64,
    pub items: Vec<CombinedProduct>,
}

#[derive(Debug, Deserialize)]
pub(super) struct BulkRequest {
    pub product_ids: Vec<i64>,
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PaginatedProducts>, ApiError> {
    let page = PageRequest::new(
        query.page.unwrap_or(1),
        query.size.unwrap_or(DEFAULT_PAGE_SIZE),
    )
    .map_err(|e| map_paging_error(req_id.0.clone(), &e))?;

    let filters = ProductFilters {
        name: query.name.as_deref(),
        major_category: query.major_category.as_deref(),
        gender: query.gender.as_deref(),
        brand_id: query.brand_id,
    };

    let (total, items) = catalog_db::list_combined(&state.pool, &filters, page)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(PaginatedProducts { total, items }))
}

pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<CombinedProduct>, ApiError> {
    let combined = catalog_db::get_combined(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(combined))
}

pub(super) async fn create_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<NewProduct>,
) -> Result<(StatusCode, Json<ProductRow>), ApiError> {
    let row = catalog_db::create_product(&state.pool, &body)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok((StatusCode::CREATED, Json(row)))
}

pub(super) async fn update_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<ProductPatch>,
) -> Result<Json<ProductRow>, ApiError> {
    let row = catalog_db::update_product(&state.pool, id, &body)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(row))
}

pub(super) async fn delete_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    catalog_db::delete_product(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn bulk_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<BulkRequest>,
) -> Result<Json<Vec<CombinedProduct>>, ApiError> {
    let combined = catalog_db::resolve_many(&state.pool, &body.product_ids)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(combined))
}
