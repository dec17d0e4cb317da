//! Like, unlike, liked-list, and view/purchase telemetry handlers, for both
//! products and brands.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use catalog_db::SubjectKind;

use crate::middleware::{RequestId, UserId};

use super::{map_db_error, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct LikeRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub(super) struct LikeResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub(super) struct LikedProductItem {
    pub id: i64,
    pub name: String,
    pub img_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct UserLikedProductsResponse {
    pub user_id: String,
    pub like_products: Vec<LikedProductItem>,
}

#[derive(Debug, Serialize)]
pub(super) struct LikedBrandItem {
    pub id: i64,
    pub brand_kor: Option<String>,
    pub brand_eng: Option<String>,
    pub like_count: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct UserLikedBrandsResponse {
    pub user_id: String,
    pub like_brands: Vec<LikedBrandItem>,
}

pub(super) async fn like_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<LikeRequest>,
) -> Result<(StatusCode, Json<LikeResponse>), ApiError> {
    catalog_db::like(&state.pool, SubjectKind::Product, id, &body.user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(LikeResponse {
            message: "product liked",
        }),
    ))
}

pub(super) async fn unlike_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((id, user_id)): Path<(i64, String)>,
) -> Result<Json<LikeResponse>, ApiError> {
    catalog_db::unlike(&state.pool, SubjectKind::Product, id, &user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(LikeResponse {
        message: "product like removed",
    }))
}

pub(super) async fn get_liked_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_id): Path<String>,
) -> Result<Json<UserLikedProductsResponse>, ApiError> {
    let rows = catalog_db::liked_products(&state.pool, &user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let like_products = rows
        .into_iter()
        .map(|p| LikedProductItem {
            id: p.id,
            name: p.name,
            img_url: p.img_url,
        })
        .collect();

    Ok(Json(UserLikedProductsResponse {
        user_id,
        like_products,
    }))
}

pub(super) async fn like_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<LikeRequest>,
) -> Result<(StatusCode, Json<LikeResponse>), ApiError> {
    catalog_db::like(&state.pool, SubjectKind::Brand, id, &body.user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(LikeResponse {
            message: "brand liked",
        }),
    ))
}

pub(super) async fn unlike_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((id, user_id)): Path<(i64, String)>,
) -> Result<Json<LikeResponse>, ApiError> {
    catalog_db::unlike(&state.pool, SubjectKind::Brand, id, &user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(LikeResponse {
        message: "brand like removed",
    }))
}

pub(super) async fn get_liked_brands(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_id): Path<String>,
) -> Result<Json<UserLikedBrandsResponse>, ApiError> {
    let rows = catalog_db::liked_brands(&state.pool, &user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let like_brands = rows
        .into_iter()
        .map(|b| LikedBrandItem {
            id: b.id,
            brand_kor: b.brand_kor,
            brand_eng: b.brand_eng,
            like_count: b.like_count,
        })
        .collect();

    Ok(Json(UserLikedBrandsResponse {
        user_id,
        like_brands,
    }))
}

pub(super) async fn view_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    user: UserId,
) -> Result<StatusCode, ApiError> {
    catalog_db::record_view(&state.pool, id, &user.0)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn purchase_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    user: UserId,
) -> Result<StatusCode, ApiError> {
    catalog_db::record_purchase(&state.pool, id, &user.0)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(StatusCode::NO_CONTENT)
}
