//! Catalog endpoints

use super::{error::ApiError, AppState};
use crate::auth::{
    middleware::{require_admin, require_staff},
    models::Claims,
};
use crate::store::{NewProduct, ProductQuery, ProductUpdate};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// GET /api/products
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Value>, ApiError> {
    let page = state.db.list_products(&query)?;

    Ok(Json(json!({
        "success": true,
        "data": page.items,
        "total": page.total,
        "limit": page.limit,
        "offset": page.offset,
    })))
}

/// GET /api/products/featured
pub async fn featured_products(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let products = state.db.featured_products()?;
    Ok(Json(json!({ "success": true, "data": products })))
}

/// GET /api/products/categories - active product count per category
pub async fn category_stats(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let categories = state.db.category_counts()?;
    Ok(Json(json!({ "success": true, "data": categories })))
}

/// GET /api/products/:id - counts a view
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let detail = state
        .db
        .view_product(id)?
        .ok_or(ApiError::NotFound("Product"))?;

    Ok(Json(json!({ "success": true, "data": detail })))
}

/// POST /api/products (staff)
pub async fn create_product(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<NewProduct>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    require_staff(&claims)?;

    let category = payload.validate().map_err(ApiError::BadRequest)?;
    let id = state.db.create_product(&payload, category)?;
    let product = state
        .db
        .get_product(id)?
        .ok_or(ApiError::NotFound("Product"))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": product })),
    ))
}

/// PUT /api/products/:id (staff) - partial update
pub async fn update_product(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i64>,
    Json(payload): Json<ProductUpdate>,
) -> Result<Json<Value>, ApiError> {
    require_staff(&claims)?;
    payload.validate().map_err(ApiError::BadRequest)?;

    match state.db.update_product(id, &payload)? {
        None => return Err(ApiError::BadRequest("No fields to update".to_string())),
        Some(false) => return Err(ApiError::NotFound("Product")),
        Some(true) => {}
    }

    let product = state
        .db
        .get_product(id)?
        .ok_or(ApiError::NotFound("Product"))?;

    Ok(Json(json!({ "success": true, "data": product })))
}

/// DELETE /api/products/:id (admin) - soft delete
pub async fn delete_product(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&claims)?;

    if !state.db.deactivate_product(id)? {
        return Err(ApiError::NotFound("Product"));
    }

    Ok(Json(json!({ "success": true, "message": "Product deleted successfully" })))
}
