//! Learner journey handlers for Web API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::catalog::LearnerJourneyRepository;
use crate::web::dto::{
    ApiResponse, CreateJourneyRequest, JourneyResponse, UpdateJourneyRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET /api/learner-journeys - List learner journeys.
#[utoipa::path(
    get,
    path = "/api/learner-journeys",
    tag = "learner-journeys",
    responses((status = 200, description = "Learner journeys", body = Vec<JourneyResponse>))
)]
pub async fn list_journeys(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<JourneyResponse>>>, ApiError> {
    let journeys = LearnerJourneyRepository::new(state.db.pool()).list().await?;
    Ok(Json(ApiResponse::new(
        journeys.into_iter().map(JourneyResponse::from).collect(),
    )))
}

/// POST /api/learner-journeys - Create a learner journey.
#[utoipa::path(
    post,
    path = "/api/learner-journeys",
    tag = "learner-journeys",
    request_body = CreateJourneyRequest,
    responses(
        (status = 201, description = "Journey created", body = JourneyResponse),
        (status = 409, description = "Name already used"),
        (status = 422, description = "Unknown or repeated asset")
    )
)]
pub async fn create_journey(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateJourneyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<JourneyResponse>>), ApiError> {
    let journey = LearnerJourneyRepository::new(state.db.pool())
        .create(&req.into_new_journey())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(JourneyResponse::from(journey))),
    ))
}

/// GET /api/learner-journeys/:id - Get a learner journey.
#[utoipa::path(
    get,
    path = "/api/learner-journeys/{id}",
    tag = "learner-journeys",
    params(("id" = i64, Path, description = "Journey ID")),
    responses(
        (status = 200, description = "Journey", body = JourneyResponse),
        (status = 404, description = "Journey not found")
    )
)]
pub async fn get_journey(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<JourneyResponse>>, ApiError> {
    let journey = LearnerJourneyRepository::new(state.db.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Learner journey not found"))?;
    Ok(Json(ApiResponse::new(JourneyResponse::from(journey))))
}

/// PATCH /api/learner-journeys/:id - Update a learner journey.
///
/// Sending `assets` replaces the whole ordered list.
#[utoipa::path(
    patch,
    path = "/api/learner-journeys/{id}",
    tag = "learner-journeys",
    params(("id" = i64, Path, description = "Journey ID")),
    request_body = UpdateJourneyRequest,
    responses(
        (status = 200, description = "Journey updated", body = JourneyResponse),
        (status = 404, description = "Journey not found"),
        (status = 409, description = "Name already used"),
        (status = 422, description = "Unknown or repeated asset")
    )
)]
pub async fn update_journey(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateJourneyRequest>,
) -> Result<Json<ApiResponse<JourneyResponse>>, ApiError> {
    let journey = LearnerJourneyRepository::new(state.db.pool())
        .update(id, &req.into_update())
        .await?
        .ok_or_else(|| ApiError::not_found("Learner journey not found"))?;
    Ok(Json(ApiResponse::new(JourneyResponse::from(journey))))
}

/// DELETE /api/learner-journeys/:id - Delete a learner journey.
#[utoipa::path(
    delete,
    path = "/api/learner-journeys/{id}",
    tag = "learner-journeys",
    params(("id" = i64, Path, description = "Journey ID")),
    responses(
        (status = 204, description = "Journey deleted"),
        (status = 404, description = "Journey not found")
    )
)]
pub async fn delete_journey(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if LearnerJourneyRepository::new(state.db.pool()).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Learner journey not found"))
    }
}
