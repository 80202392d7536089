//! Chapter handlers for Web API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::catalog::ChapterRepository;
use crate::web::dto::{
    ApiResponse, ChapterListQuery, ChapterResponse, CreateChapterRequest, UpdateChapterRequest,
    ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET /api/chapters - List chapters, optionally for one asset.
#[utoipa::path(
    get,
    path = "/api/chapters",
    tag = "chapters",
    params(ChapterListQuery),
    responses((status = 200, description = "Chapters", body = Vec<ChapterResponse>))
)]
pub async fn list_chapters(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChapterListQuery>,
) -> Result<Json<ApiResponse<Vec<ChapterResponse>>>, ApiError> {
    let chapters = ChapterRepository::new(state.db.pool())
        .list(query.asset)
        .await?;
    Ok(Json(ApiResponse::new(
        chapters.into_iter().map(ChapterResponse::from).collect(),
    )))
}

/// POST /api/chapters - Create a chapter.
#[utoipa::path(
    post,
    path = "/api/chapters",
    tag = "chapters",
    request_body = CreateChapterRequest,
    responses(
        (status = 201, description = "Chapter created", body = ChapterResponse),
        (status = 409, description = "Name already used in the asset"),
        (status = 422, description = "Unknown asset or invalid time range")
    )
)]
pub async fn create_chapter(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateChapterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ChapterResponse>>), ApiError> {
    let asset_id = req.asset;
    let chapter = ChapterRepository::new(state.db.pool())
        .create(asset_id, &req.chapter.into_new_chapter())
        .await?;

    tracing::debug!(chapter_id = chapter.id, asset_id, "Chapter created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(ChapterResponse::from(chapter))),
    ))
}

/// GET /api/chapters/:id - Get a chapter.
#[utoipa::path(
    get,
    path = "/api/chapters/{id}",
    tag = "chapters",
    params(("id" = i64, Path, description = "Chapter ID")),
    responses(
        (status = 200, description = "Chapter", body = ChapterResponse),
        (status = 404, description = "Chapter not found")
    )
)]
pub async fn get_chapter(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ChapterResponse>>, ApiError> {
    let chapter = ChapterRepository::new(state.db.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Chapter not found"))?;
    Ok(Json(ApiResponse::new(ChapterResponse::from(chapter))))
}

/// PATCH /api/chapters/:id - Update a chapter.
#[utoipa::path(
    patch,
    path = "/api/chapters/{id}",
    tag = "chapters",
    params(("id" = i64, Path, description = "Chapter ID")),
    request_body = UpdateChapterRequest,
    responses(
        (status = 200, description = "Chapter updated", body = ChapterResponse),
        (status = 404, description = "Chapter not found"),
        (status = 409, description = "Name already used in the asset"),
        (status = 422, description = "Invalid time range")
    )
)]
pub async fn update_chapter(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateChapterRequest>,
) -> Result<Json<ApiResponse<ChapterResponse>>, ApiError> {
    let chapter = ChapterRepository::new(state.db.pool())
        .update(id, &req.into_update())
        .await?
        .ok_or_else(|| ApiError::not_found("Chapter not found"))?;
    Ok(Json(ApiResponse::new(ChapterResponse::from(chapter))))
}

/// DELETE /api/chapters/:id - Delete a chapter.
#[utoipa::path(
    delete,
    path = "/api/chapters/{id}",
    tag = "chapters",
    params(("id" = i64, Path, description = "Chapter ID")),
    responses(
        (status = 204, description = "Chapter deleted"),
        (status = 404, description = "Chapter not found")
    )
)]
pub async fn delete_chapter(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if ChapterRepository::new(state.db.pool()).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Chapter not found"))
    }
}
