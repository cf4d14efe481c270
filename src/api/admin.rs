//! Dashboard, export and health endpoints

use super::{error::ApiError, AppState};
use crate::auth::{middleware::require_staff, models::Claims};
use crate::store::ExportFilter;
use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

/// GET /api/health
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "success": true,
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// GET /api/admin/statistics (staff)
pub async fn statistics(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Value>, ApiError> {
    require_staff(&claims)?;

    let stats = state.db.dashboard_stats()?;
    Ok(Json(json!({ "success": true, "data": stats })))
}

/// GET /api/admin/export (staff) - inquiries as CSV
pub async fn export_inquiries(
    State(state): State<AppState>,
    claims: Claims,
    Query(filter): Query<ExportFilter>,
) -> Result<impl IntoResponse, ApiError> {
    require_staff(&claims)?;

    let csv = state.db.export_inquiries_csv(&filter)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=inquiries.csv",
            ),
        ],
        csv,
    ))
}
