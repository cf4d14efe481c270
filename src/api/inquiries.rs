//! Inquiry form and back-office inquiry queue

use super::{error::ApiError, AppState};
use crate::auth::{
    middleware::{require_admin, require_staff},
    models::Claims,
};
use crate::store::{InquiryFilter, InquiryUpdate, NewInquiry};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// POST /api/inquiries (public)
pub async fn submit_inquiry(
    State(state): State<AppState>,
    Json(payload): Json<NewInquiry>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    payload.validate().map_err(ApiError::BadRequest)?;

    let submitted = state.db.submit_inquiry(&payload)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Inquiry submitted successfully. We will contact you soon.",
            "data": submitted,
        })),
    ))
}

/// GET /api/inquiries/mine (any signed-in account)
///
/// Matched on the token's email claim; tokens without one see nothing.
pub async fn my_inquiries(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Value>, ApiError> {
    let items = match claims.email() {
        Some(email) => state.db.list_inquiries_for_email(email)?,
        None => Vec::new(),
    };

    Ok(Json(json!({
        "success": true,
        "total": items.len(),
        "data": items,
    })))
}

/// GET /api/admin/inquiries (staff)
pub async fn list_inquiries(
    State(state): State<AppState>,
    claims: Claims,
    Query(filter): Query<InquiryFilter>,
) -> Result<Json<Value>, ApiError> {
    require_staff(&claims)?;

    let page = state.db.list_inquiries(&filter)?;

    Ok(Json(json!({
        "success": true,
        "data": page.items,
        "total": page.total,
        "limit": page.limit,
        "offset": page.offset,
    })))
}

/// GET /api/admin/inquiries/:id (staff)
pub async fn get_inquiry(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    require_staff(&claims)?;

    let detail = state
        .db
        .get_inquiry(id)?
        .ok_or(ApiError::NotFound("Inquiry"))?;

    Ok(Json(json!({ "success": true, "data": detail })))
}

/// PUT /api/admin/inquiries/:id (staff) - status / priority / note
pub async fn update_inquiry(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i64>,
    Json(payload): Json<InquiryUpdate>,
) -> Result<Json<Value>, ApiError> {
    require_staff(&claims)?;

    if payload.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }
    if !state.db.update_inquiry(id, &payload, claims.subject_id)? {
        return Err(ApiError::NotFound("Inquiry"));
    }

    let detail = state
        .db
        .get_inquiry(id)?
        .ok_or(ApiError::NotFound("Inquiry"))?;

    Ok(Json(json!({ "success": true, "data": detail })))
}

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    #[serde(default)]
    pub note: String,
}

/// POST /api/admin/inquiries/:id/notes (staff)
pub async fn add_note(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i64>,
    Json(payload): Json<NoteRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    require_staff(&claims)?;

    if payload.note.trim().is_empty() {
        return Err(ApiError::BadRequest("Note is required".to_string()));
    }

    let note = state
        .db
        .add_inquiry_note(id, &payload.note, claims.subject_id)?
        .ok_or(ApiError::NotFound("Inquiry"))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": note })),
    ))
}

/// DELETE /api/admin/inquiries/:id (admin)
pub async fn delete_inquiry(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&claims)?;

    if !state.db.delete_inquiry(id)? {
        return Err(ApiError::NotFound("Inquiry"));
    }

    Ok(Json(json!({ "success": true, "message": "Inquiry deleted successfully" })))
}
