//! Asset handlers for Web API.

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use crate::catalog::ChapterRepository;
use crate::library::{
    AssetDetails, AssetFilter, AssetRelations, AssetRepository, AssetStatus, NewAsset, Upload,
};
use crate::web::dto::validation::{parse_bool, parse_id_list, parse_int, sanitize_string};
use crate::web::dto::{
    ApiResponse, AssetListQuery, AssetResponse, ChapterResponse, CreateAssetRequest,
    PaginatedResponse, PaginationQuery, ReplaceChaptersRequest, UpdateAssetRequest,
    ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Generate a safe Content-Disposition header value for file downloads.
///
/// Control characters, quotes and backslashes are stripped from the plain
/// `filename` parameter; non-ASCII names also get an RFC 5987 `filename*`.
pub(crate) fn content_disposition_header(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();

    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let encoded = urlencoding::encode(filename);
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}

/// Load relations for a page of assets and wrap them for the response.
pub(crate) async fn asset_page(
    state: &AppState,
    filter: &AssetFilter,
    pagination: PaginationQuery,
) -> Result<PaginatedResponse<AssetResponse>, ApiError> {
    let repo = AssetRepository::new(state.db.pool());
    let (offset, limit) = pagination.to_offset_limit();

    let assets = repo.list(filter, offset, limit).await?;
    let total = repo.count(filter).await?;

    let mut data = Vec::with_capacity(assets.len());
    for asset in assets {
        let links = repo.load_links(asset.id).await?;
        data.push(AssetResponse::from(AssetDetails { asset, links }));
    }

    Ok(PaginatedResponse::new(
        data,
        pagination.page,
        pagination.per_page,
        total.max(0) as u64,
    ))
}

// ============================================================================
// Multipart Forms
// ============================================================================

/// Fields read from a multipart asset form.
#[derive(Debug, Default)]
pub(crate) struct AssetForm {
    pub upload: Option<Upload>,
    pub text: HashMap<String, String>,
    pub relations: AssetRelations,
}

impl AssetForm {
    fn take_text(&mut self, field: &str) -> Option<String> {
        self.text
            .remove(field)
            .filter(|value| !value.trim().is_empty())
    }

    /// Build a new asset for `folder_id` from the form.
    pub fn into_new_asset(
        mut self,
        folder_id: i64,
    ) -> Result<(NewAsset, AssetRelations, Option<Upload>), ApiError> {
        let name = self.take_text("name").ok_or_else(|| {
            let mut details = HashMap::new();
            details.insert(
                "name".to_string(),
                vec!["This field is required.".to_string()],
            );
            ApiError::validation(details)
        })?;

        let mut asset = NewAsset::new(name).with_parent(folder_id);
        asset.link = self.take_text("link");
        asset.description = self.take_text("description");
        asset.creation_date = self.take_text("creation_date");
        asset.copyright_info = self.take_text("copyright_info");
        asset.type_field = self.take_text("type_field");
        if let Some(duration) = self.take_text("duration") {
            asset.duration = Some(parse_int("duration", &duration)?);
        }
        if let Some(enabled) = self.take_text("enabled") {
            asset.enabled = parse_bool("enabled", &enabled)?;
        }
        if let Some(status) = self.take_text("status") {
            asset.status = AssetStatus::from_str(status.trim())
                .map_err(|e| ApiError::unprocessable(format!("status: {e}")))?;
        }

        Ok((asset, self.relations, self.upload))
    }
}

fn append_ids(target: &mut Option<Vec<i64>>, ids: Vec<i64>) {
    target.get_or_insert_with(Vec::new).extend(ids);
}

/// Read every field of a multipart asset form.
pub(crate) async fn read_asset_form(mut multipart: Multipart) -> Result<AssetForm, ApiError> {
    let mut form = AssetForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await?;
                // Browsers send an empty part when no file was chosen.
                if file_name.trim().is_empty() && data.is_empty() {
                    continue;
                }
                form.upload = Some(Upload::new(file_name, data));
            }
            "tags" | "locations" | "contributors" | "collections" => {
                let ids = parse_id_list(&name, &field.text().await?)?;
                let target = match name.as_str() {
                    "tags" => &mut form.relations.tags,
                    "locations" => &mut form.relations.locations,
                    "contributors" => &mut form.relations.contributors,
                    _ => &mut form.relations.collections,
                };
                append_ids(target, ids);
            }
            "" => {}
            _ => {
                let value = sanitize_string(&field.text().await?);
                form.text.insert(name.clone(), value);
            }
        }
    }

    Ok(form)
}

// ============================================================================
// Asset Endpoints
// ============================================================================

/// GET /api/assets - List assets with filters.
#[utoipa::path(
    get,
    path = "/api/assets",
    tag = "assets",
    params(AssetListQuery),
    responses(
        (status = 200, description = "Page of assets", body = Vec<AssetResponse>)
    )
)]
pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AssetListQuery>,
) -> Result<Json<PaginatedResponse<AssetResponse>>, ApiError> {
    let page = asset_page(&state, &query.filter(), query.pagination()).await?;
    Ok(Json(page))
}

/// POST /api/assets - Create an asset without a file.
#[utoipa::path(
    post,
    path = "/api/assets",
    tag = "assets",
    request_body = CreateAssetRequest,
    responses(
        (status = 201, description = "Asset created", body = AssetResponse),
        (status = 400, description = "Invalid JSON"),
        (status = 422, description = "Invalid asset data")
    )
)]
pub async fn create_asset(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateAssetRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AssetResponse>>), ApiError> {
    let (new_asset, relations) = req.into_parts();
    let details = state
        .library()
        .create_asset(new_asset, &relations, None)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(AssetResponse::from(details))),
    ))
}

/// GET /api/assets/:id - Get an asset.
#[utoipa::path(
    get,
    path = "/api/assets/{id}",
    tag = "assets",
    params(
        ("id" = i64, Path, description = "Asset ID")
    ),
    responses(
        (status = 200, description = "Asset", body = AssetResponse),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn get_asset(
    State(state): State<Arc<AppState>>,
    Path(asset_id): Path<i64>,
) -> Result<Json<ApiResponse<AssetResponse>>, ApiError> {
    let details = state.library().get_asset(asset_id).await?;
    Ok(Json(ApiResponse::new(AssetResponse::from(details))))
}

/// PATCH /api/assets/:id - Update asset metadata, relations or folder.
///
/// Moving an asset to another folder moves its stored file too.
#[utoipa::path(
    patch,
    path = "/api/assets/{id}",
    tag = "assets",
    params(
        ("id" = i64, Path, description = "Asset ID")
    ),
    request_body = UpdateAssetRequest,
    responses(
        (status = 200, description = "Asset updated", body = AssetResponse),
        (status = 404, description = "Asset not found"),
        (status = 422, description = "Invalid asset data"),
        (status = 502, description = "Object store failure")
    )
)]
pub async fn update_asset(
    State(state): State<Arc<AppState>>,
    Path(asset_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateAssetRequest>,
) -> Result<Json<ApiResponse<AssetResponse>>, ApiError> {
    let (update, relations) = req.into_parts();
    let details = state
        .library()
        .update_asset(asset_id, update, &relations, None)
        .await?;

    Ok(Json(ApiResponse::new(AssetResponse::from(details))))
}

/// DELETE /api/assets/:id - Delete an asset and its stored file.
#[utoipa::path(
    delete,
    path = "/api/assets/{id}",
    tag = "assets",
    params(
        ("id" = i64, Path, description = "Asset ID")
    ),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn delete_asset(
    State(state): State<Arc<AppState>>,
    Path(asset_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.library().delete_asset(asset_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/assets/:id/file - Download the stored file.
#[utoipa::path(
    get,
    path = "/api/assets/{id}/file",
    tag = "assets",
    params(
        ("id" = i64, Path, description = "Asset ID")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 404, description = "Asset or file not found"),
        (status = 502, description = "Object store failure")
    )
)]
pub async fn download_asset_file(
    State(state): State<Arc<AppState>>,
    Path(asset_id): Path<i64>,
) -> Result<Response, ApiError> {
    let download = state.library().download_asset_file(asset_id).await?;

    let file_name = download.asset.file.clone().unwrap_or_default();
    let content_type = download
        .asset
        .filetype
        .clone()
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&file_name),
        )
        .header(header::CONTENT_LENGTH, download.content.len())
        .body(Body::from(download.content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })?;

    Ok(response)
}

/// PUT /api/assets/:id/file - Upload or replace the stored file.
///
/// Request body: multipart/form-data with a "file" field.
#[utoipa::path(
    put,
    path = "/api/assets/{id}/file",
    tag = "assets",
    params(
        ("id" = i64, Path, description = "Asset ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored", body = AssetResponse),
        (status = 400, description = "No file provided"),
        (status = 404, description = "Asset not found"),
        (status = 413, description = "File too large"),
        (status = 422, description = "Invalid or duplicate file name"),
        (status = 502, description = "Object store failure")
    )
)]
pub async fn upload_asset_file(
    State(state): State<Arc<AppState>>,
    Path(asset_id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<AssetResponse>>, ApiError> {
    let library = state.library();
    library.get_asset(asset_id).await?;

    let form = read_asset_form(multipart).await?;
    let upload = form
        .upload
        .ok_or_else(|| ApiError::bad_request("No file provided"))?;

    let details = library.replace_asset_file(asset_id, upload).await?;
    Ok(Json(ApiResponse::new(AssetResponse::from(details))))
}

/// DELETE /api/assets/:id/file - Remove the stored file, keeping the asset.
#[utoipa::path(
    delete,
    path = "/api/assets/{id}/file",
    tag = "assets",
    params(
        ("id" = i64, Path, description = "Asset ID")
    ),
    responses(
        (status = 200, description = "File removed", body = AssetResponse),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn remove_asset_file(
    State(state): State<Arc<AppState>>,
    Path(asset_id): Path<i64>,
) -> Result<Json<ApiResponse<AssetResponse>>, ApiError> {
    let details = state.library().remove_asset_file(asset_id).await?;
    Ok(Json(ApiResponse::new(AssetResponse::from(details))))
}

/// GET /api/assets/:id/chapters - List the chapters of an asset.
#[utoipa::path(
    get,
    path = "/api/assets/{id}/chapters",
    tag = "chapters",
    params(
        ("id" = i64, Path, description = "Asset ID")
    ),
    responses(
        (status = 200, description = "Chapters in playback order", body = Vec<ChapterResponse>),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn list_asset_chapters(
    State(state): State<Arc<AppState>>,
    Path(asset_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<ChapterResponse>>>, ApiError> {
    state.library().get_asset(asset_id).await?;

    let chapters = ChapterRepository::new(state.db.pool())
        .list_by_asset(asset_id)
        .await?;

    Ok(Json(ApiResponse::new(
        chapters.into_iter().map(ChapterResponse::from).collect(),
    )))
}

/// PUT /api/assets/:id/chapters - Replace every chapter of an asset.
#[utoipa::path(
    put,
    path = "/api/assets/{id}/chapters",
    tag = "chapters",
    params(
        ("id" = i64, Path, description = "Asset ID")
    ),
    request_body = ReplaceChaptersRequest,
    responses(
        (status = 200, description = "Chapters replaced", body = Vec<ChapterResponse>),
        (status = 404, description = "Asset not found"),
        (status = 422, description = "Invalid or repeated chapters")
    )
)]
pub async fn replace_asset_chapters(
    State(state): State<Arc<AppState>>,
    Path(asset_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<ReplaceChaptersRequest>,
) -> Result<Json<ApiResponse<Vec<ChapterResponse>>>, ApiError> {
    let chapters: Vec<_> = req
        .chapters
        .into_iter()
        .map(|c| c.into_new_chapter())
        .collect();

    let chapters = state
        .library()
        .replace_chapters(asset_id, &chapters)
        .await?;

    Ok(Json(ApiResponse::new(
        chapters.into_iter().map(ChapterResponse::from).collect(),
    )))
}
