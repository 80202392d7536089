//! Folder handlers for Web API.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::library::{AssetFilter, FolderRepository};
use crate::web::dto::{
    ApiResponse, AssetResponse, BreadcrumbItem, CreateFolderRequest, FolderDeletionResponse,
    FolderDetailResponse, FolderListQuery, FolderResponse, PaginatedResponse, PaginationQuery,
    UpdateFolderRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::asset::{asset_page, read_asset_form};
use crate::web::handlers::AppState;

/// GET /api/folders - List folders.
///
/// `?parent=<id>` lists the children of one folder, `?root=true` lists
/// top-level folders, otherwise every folder is returned.
#[utoipa::path(
    get,
    path = "/api/folders",
    tag = "folders",
    params(FolderListQuery),
    responses(
        (status = 200, description = "List of folders", body = Vec<FolderResponse>),
        (status = 404, description = "Parent folder not found")
    )
)]
pub async fn list_folders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FolderListQuery>,
) -> Result<Json<ApiResponse<Vec<FolderResponse>>>, ApiError> {
    let repo = FolderRepository::new(state.db.pool());

    let folders = match (query.parent, query.root) {
        (Some(parent_id), _) => {
            state.library().get_folder(parent_id).await?;
            repo.list_by_parent(parent_id).await?
        }
        (None, Some(true)) => repo.list_root().await?,
        _ => repo.list_all().await?,
    };

    Ok(Json(ApiResponse::new(
        folders.into_iter().map(FolderResponse::from).collect(),
    )))
}

/// POST /api/folders - Create a folder.
#[utoipa::path(
    post,
    path = "/api/folders",
    tag = "folders",
    request_body = CreateFolderRequest,
    responses(
        (status = 201, description = "Folder created", body = FolderResponse),
        (status = 400, description = "Invalid JSON"),
        (status = 422, description = "Invalid name, duplicate name or unknown parent")
    )
)]
pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateFolderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FolderResponse>>), ApiError> {
    let folder = state
        .library()
        .create_folder(&req.into_new_folder())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(FolderResponse::from(folder))),
    ))
}

/// GET /api/folders/:id - Get folder details with breadcrumb and counts.
#[utoipa::path(
    get,
    path = "/api/folders/{id}",
    tag = "folders",
    params(
        ("id" = i64, Path, description = "Folder ID")
    ),
    responses(
        (status = 200, description = "Folder details", body = FolderDetailResponse),
        (status = 404, description = "Folder not found")
    )
)]
pub async fn get_folder(
    State(state): State<Arc<AppState>>,
    Path(folder_id): Path<i64>,
) -> Result<Json<ApiResponse<FolderDetailResponse>>, ApiError> {
    let folder = state.library().get_folder(folder_id).await?;

    let repo = FolderRepository::new(state.db.pool());
    let path = repo
        .get_path(folder_id)
        .await?
        .into_iter()
        .map(|f| BreadcrumbItem {
            id: f.id,
            name: f.name,
        })
        .collect();
    let child_count = repo.count_children(folder_id).await?;
    let asset_count = repo.count_assets(folder_id).await?;

    Ok(Json(ApiResponse::new(FolderDetailResponse {
        folder: FolderResponse::from(folder),
        path,
        child_count,
        asset_count,
    })))
}

/// PATCH /api/folders/:id - Rename, describe or move a folder.
#[utoipa::path(
    patch,
    path = "/api/folders/{id}",
    tag = "folders",
    params(
        ("id" = i64, Path, description = "Folder ID")
    ),
    request_body = UpdateFolderRequest,
    responses(
        (status = 200, description = "Folder updated", body = FolderResponse),
        (status = 404, description = "Folder not found"),
        (status = 422, description = "Invalid name, duplicate name or parent cycle")
    )
)]
pub async fn update_folder(
    State(state): State<Arc<AppState>>,
    Path(folder_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateFolderRequest>,
) -> Result<Json<ApiResponse<FolderResponse>>, ApiError> {
    let folder = state
        .library()
        .update_folder(folder_id, &req.into_update())
        .await?;

    Ok(Json(ApiResponse::new(FolderResponse::from(folder))))
}

/// DELETE /api/folders/:id - Delete a folder, its subtree, their assets and files.
#[utoipa::path(
    delete,
    path = "/api/folders/{id}",
    tag = "folders",
    params(
        ("id" = i64, Path, description = "Folder ID")
    ),
    responses(
        (status = 200, description = "Folder deleted", body = FolderDeletionResponse),
        (status = 404, description = "Folder not found")
    )
)]
pub async fn delete_folder(
    State(state): State<Arc<AppState>>,
    Path(folder_id): Path<i64>,
) -> Result<Json<ApiResponse<FolderDeletionResponse>>, ApiError> {
    let deletion = state.library().delete_folder(folder_id).await?;
    Ok(Json(ApiResponse::new(FolderDeletionResponse::from(deletion))))
}

/// GET /api/folders/:id/children - List direct child folders.
#[utoipa::path(
    get,
    path = "/api/folders/{id}/children",
    tag = "folders",
    params(
        ("id" = i64, Path, description = "Folder ID")
    ),
    responses(
        (status = 200, description = "Child folders", body = Vec<FolderResponse>),
        (status = 404, description = "Folder not found")
    )
)]
pub async fn list_children(
    State(state): State<Arc<AppState>>,
    Path(folder_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<FolderResponse>>>, ApiError> {
    state.library().get_folder(folder_id).await?;

    let children = FolderRepository::new(state.db.pool())
        .list_by_parent(folder_id)
        .await?;

    Ok(Json(ApiResponse::new(
        children.into_iter().map(FolderResponse::from).collect(),
    )))
}

/// GET /api/folders/:id/assets - List assets in a folder.
#[utoipa::path(
    get,
    path = "/api/folders/{id}/assets",
    tag = "assets",
    params(
        ("id" = i64, Path, description = "Folder ID"),
        PaginationQuery
    ),
    responses(
        (status = 200, description = "Assets in folder", body = Vec<AssetResponse>),
        (status = 404, description = "Folder not found")
    )
)]
pub async fn list_folder_assets(
    State(state): State<Arc<AppState>>,
    Path(folder_id): Path<i64>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<AssetResponse>>, ApiError> {
    state.library().get_folder(folder_id).await?;

    let page = asset_page(
        &state,
        &AssetFilter::new().folder(folder_id),
        pagination.normalized(),
    )
    .await?;
    Ok(Json(page))
}

/// POST /api/folders/:id/assets - Create an asset with an uploaded file.
///
/// Request body: multipart/form-data with a "name" field, an optional "file"
/// and any other asset fields. Relation fields ("tags", "locations",
/// "contributors", "collections") take comma separated ids and may repeat.
#[utoipa::path(
    post,
    path = "/api/folders/{id}/assets",
    tag = "assets",
    params(
        ("id" = i64, Path, description = "Folder ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Asset created", body = AssetResponse),
        (status = 400, description = "Invalid multipart data"),
        (status = 413, description = "File too large"),
        (status = 422, description = "Invalid asset data"),
        (status = 502, description = "Object store failure")
    )
)]
pub async fn create_folder_asset(
    State(state): State<Arc<AppState>>,
    Path(folder_id): Path<i64>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<AssetResponse>>), ApiError> {
    let library = state.library();
    library.get_folder(folder_id).await?;

    let form = read_asset_form(multipart).await?;
    let (new_asset, relations, upload) = form.into_new_asset(folder_id)?;

    let details = library.create_asset(new_asset, &relations, upload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(AssetResponse::from(details))),
    ))
}
