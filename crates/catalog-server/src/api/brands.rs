use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use catalog_db::{BrandRow, NewBrand};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, AppState};

pub(super) async fn list_brands(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<Vec<BrandRow>>, ApiError> {
    let rows = catalog_db::list_brands(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(rows))
}

pub(super) async fn get_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<BrandRow>, ApiError> {
    let row = catalog_db::get_brand(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "brand not found"))?;

    Ok(Json(row))
}

pub(super) async fn upsert_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<NewBrand>,
) -> Result<(StatusCode, Json<BrandRow>), ApiError> {
    let row = catalog_db::upsert_brand(&state.pool, &body)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok((StatusCode::CREATED, Json(row)))
}
