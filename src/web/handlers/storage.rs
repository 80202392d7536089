//! Object store handlers for Web API.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::web::dto::{ApiResponse, SyncReportResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET /api/storage/report - Compare stored objects with asset rows.
#[utoipa::path(
    get,
    path = "/api/storage/report",
    tag = "storage",
    responses(
        (status = 200, description = "Consistency report", body = SyncReportResponse),
        (status = 502, description = "Object store failure")
    )
)]
pub async fn storage_report(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SyncReportResponse>>, ApiError> {
    let report = state.library().sync_report().await?;
    Ok(Json(ApiResponse::new(SyncReportResponse::from(report))))
}
