//! Catalog handlers: collections, contributors, tag groups, tags and country tags.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::catalog::{CountryTagRepository, NamedKind, NamedRepository, TagRepository};
use crate::web::dto::{
    ApiResponse, CountryTagResponse, CreateCountryTagRequest, CreateTagRequest, NamedRequest,
    NamedResponse, TagListQuery, TagResponse, UpdateCountryTagRequest, UpdateTagRequest,
    ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

fn named_not_found(kind: NamedKind) -> ApiError {
    ApiError::not_found(format!("{} not found", kind.label()))
}

// ============================================================================
// Name-only entries
// ============================================================================

async fn list_named(
    state: &AppState,
    kind: NamedKind,
) -> Result<Json<ApiResponse<Vec<NamedResponse>>>, ApiError> {
    let entries = NamedRepository::new(state.db.pool(), kind).list().await?;
    Ok(Json(ApiResponse::new(
        entries.into_iter().map(NamedResponse::from).collect(),
    )))
}

async fn create_named(
    state: &AppState,
    kind: NamedKind,
    req: NamedRequest,
) -> Result<(StatusCode, Json<ApiResponse<NamedResponse>>), ApiError> {
    let entry = NamedRepository::new(state.db.pool(), kind)
        .create(&req.name)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(NamedResponse::from(entry))),
    ))
}

async fn get_named(
    state: &AppState,
    kind: NamedKind,
    id: i64,
) -> Result<Json<ApiResponse<NamedResponse>>, ApiError> {
    let entry = NamedRepository::new(state.db.pool(), kind)
        .get_by_id(id)
        .await?
        .ok_or_else(|| named_not_found(kind))?;
    Ok(Json(ApiResponse::new(NamedResponse::from(entry))))
}

async fn update_named(
    state: &AppState,
    kind: NamedKind,
    id: i64,
    req: NamedRequest,
) -> Result<Json<ApiResponse<NamedResponse>>, ApiError> {
    let entry = NamedRepository::new(state.db.pool(), kind)
        .update(id, &req.name)
        .await?
        .ok_or_else(|| named_not_found(kind))?;
    Ok(Json(ApiResponse::new(NamedResponse::from(entry))))
}

async fn delete_named(state: &AppState, kind: NamedKind, id: i64) -> Result<StatusCode, ApiError> {
    if NamedRepository::new(state.db.pool(), kind).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(named_not_found(kind))
    }
}

/// GET /api/collections - List collections.
#[utoipa::path(
    get,
    path = "/api/collections",
    tag = "catalog",
    responses((status = 200, description = "Collections", body = Vec<NamedResponse>))
)]
pub async fn list_collections(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<NamedResponse>>>, ApiError> {
    list_named(&state, NamedKind::Collection).await
}

/// POST /api/collections - Create a collection.
#[utoipa::path(
    post,
    path = "/api/collections",
    tag = "catalog",
    request_body = NamedRequest,
    responses(
        (status = 201, description = "Collection created", body = NamedResponse),
        (status = 409, description = "Name already used")
    )
)]
pub async fn create_collection(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<NamedRequest>,
) -> Result<(StatusCode, Json<ApiResponse<NamedResponse>>), ApiError> {
    create_named(&state, NamedKind::Collection, req).await
}

/// GET /api/collections/:id - Get a collection.
#[utoipa::path(
    get,
    path = "/api/collections/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Collection ID")),
    responses(
        (status = 200, description = "Collection", body = NamedResponse),
        (status = 404, description = "Collection not found")
    )
)]
pub async fn get_collection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<NamedResponse>>, ApiError> {
    get_named(&state, NamedKind::Collection, id).await
}

/// PATCH /api/collections/:id - Rename a collection.
#[utoipa::path(
    patch,
    path = "/api/collections/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Collection ID")),
    request_body = NamedRequest,
    responses(
        (status = 200, description = "Collection renamed", body = NamedResponse),
        (status = 404, description = "Collection not found"),
        (status = 409, description = "Name already used")
    )
)]
pub async fn update_collection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<NamedRequest>,
) -> Result<Json<ApiResponse<NamedResponse>>, ApiError> {
    update_named(&state, NamedKind::Collection, id, req).await
}

/// DELETE /api/collections/:id - Delete a collection.
#[utoipa::path(
    delete,
    path = "/api/collections/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Collection ID")),
    responses(
        (status = 204, description = "Collection deleted"),
        (status = 404, description = "Collection not found")
    )
)]
pub async fn delete_collection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    delete_named(&state, NamedKind::Collection, id).await
}

/// GET /api/contributors - List contributors.
#[utoipa::path(
    get,
    path = "/api/contributors",
    tag = "catalog",
    responses((status = 200, description = "Contributors", body = Vec<NamedResponse>))
)]
pub async fn list_contributors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<NamedResponse>>>, ApiError> {
    list_named(&state, NamedKind::Contributor).await
}

/// POST /api/contributors - Create a contributor.
#[utoipa::path(
    post,
    path = "/api/contributors",
    tag = "catalog",
    request_body = NamedRequest,
    responses(
        (status = 201, description = "Contributor created", body = NamedResponse),
        (status = 409, description = "Name already used")
    )
)]
pub async fn create_contributor(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<NamedRequest>,
) -> Result<(StatusCode, Json<ApiResponse<NamedResponse>>), ApiError> {
    create_named(&state, NamedKind::Contributor, req).await
}

/// GET /api/contributors/:id - Get a contributor.
#[utoipa::path(
    get,
    path = "/api/contributors/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Contributor ID")),
    responses(
        (status = 200, description = "Contributor", body = NamedResponse),
        (status = 404, description = "Contributor not found")
    )
)]
pub async fn get_contributor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<NamedResponse>>, ApiError> {
    get_named(&state, NamedKind::Contributor, id).await
}

/// PATCH /api/contributors/:id - Rename a contributor.
#[utoipa::path(
    patch,
    path = "/api/contributors/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Contributor ID")),
    request_body = NamedRequest,
    responses(
        (status = 200, description = "Contributor renamed", body = NamedResponse),
        (status = 404, description = "Contributor not found"),
        (status = 409, description = "Name already used")
    )
)]
pub async fn update_contributor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<NamedRequest>,
) -> Result<Json<ApiResponse<NamedResponse>>, ApiError> {
    update_named(&state, NamedKind::Contributor, id, req).await
}

/// DELETE /api/contributors/:id - Delete a contributor.
#[utoipa::path(
    delete,
    path = "/api/contributors/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Contributor ID")),
    responses(
        (status = 204, description = "Contributor deleted"),
        (status = 404, description = "Contributor not found")
    )
)]
pub async fn delete_contributor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    delete_named(&state, NamedKind::Contributor, id).await
}

/// GET /api/tag-groups - List tag groups.
#[utoipa::path(
    get,
    path = "/api/tag-groups",
    tag = "catalog",
    responses((status = 200, description = "Tag groups", body = Vec<NamedResponse>))
)]
pub async fn list_tag_groups(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<NamedResponse>>>, ApiError> {
    list_named(&state, NamedKind::TagGroup).await
}

/// POST /api/tag-groups - Create a tag group.
#[utoipa::path(
    post,
    path = "/api/tag-groups",
    tag = "catalog",
    request_body = NamedRequest,
    responses(
        (status = 201, description = "Tag group created", body = NamedResponse),
        (status = 409, description = "Name already used")
    )
)]
pub async fn create_tag_group(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<NamedRequest>,
) -> Result<(StatusCode, Json<ApiResponse<NamedResponse>>), ApiError> {
    create_named(&state, NamedKind::TagGroup, req).await
}

/// GET /api/tag-groups/:id - Get a tag group.
#[utoipa::path(
    get,
    path = "/api/tag-groups/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Tag group ID")),
    responses(
        (status = 200, description = "Tag group", body = NamedResponse),
        (status = 404, description = "Tag group not found")
    )
)]
pub async fn get_tag_group(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<NamedResponse>>, ApiError> {
    get_named(&state, NamedKind::TagGroup, id).await
}

/// PATCH /api/tag-groups/:id - Rename a tag group.
#[utoipa::path(
    patch,
    path = "/api/tag-groups/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Tag group ID")),
    request_body = NamedRequest,
    responses(
        (status = 200, description = "Tag group renamed", body = NamedResponse),
        (status = 404, description = "Tag group not found"),
        (status = 409, description = "Name already used")
    )
)]
pub async fn update_tag_group(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<NamedRequest>,
) -> Result<Json<ApiResponse<NamedResponse>>, ApiError> {
    update_named(&state, NamedKind::TagGroup, id, req).await
}

/// DELETE /api/tag-groups/:id - Delete a tag group. Its tags become ungrouped.
#[utoipa::path(
    delete,
    path = "/api/tag-groups/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Tag group ID")),
    responses(
        (status = 204, description = "Tag group deleted"),
        (status = 404, description = "Tag group not found")
    )
)]
pub async fn delete_tag_group(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    delete_named(&state, NamedKind::TagGroup, id).await
}

// ============================================================================
// Tags
// ============================================================================

/// GET /api/tags - List tags, optionally in one group.
#[utoipa::path(
    get,
    path = "/api/tags",
    tag = "catalog",
    params(TagListQuery),
    responses((status = 200, description = "Tags", body = Vec<TagResponse>))
)]
pub async fn list_tags(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TagListQuery>,
) -> Result<Json<ApiResponse<Vec<TagResponse>>>, ApiError> {
    let tags = TagRepository::new(state.db.pool()).list(query.group).await?;
    Ok(Json(ApiResponse::new(
        tags.into_iter().map(TagResponse::from).collect(),
    )))
}

/// POST /api/tags - Create a tag.
#[utoipa::path(
    post,
    path = "/api/tags",
    tag = "catalog",
    request_body = CreateTagRequest,
    responses(
        (status = 201, description = "Tag created", body = TagResponse),
        (status = 409, description = "Name already used in the group"),
        (status = 422, description = "Unknown tag group")
    )
)]
pub async fn create_tag(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateTagRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TagResponse>>), ApiError> {
    let tag = TagRepository::new(state.db.pool())
        .create(&req.into_new_tag())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(TagResponse::from(tag))),
    ))
}

/// GET /api/tags/:id - Get a tag.
#[utoipa::path(
    get,
    path = "/api/tags/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Tag", body = TagResponse),
        (status = 404, description = "Tag not found")
    )
)]
pub async fn get_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<TagResponse>>, ApiError> {
    let tag = TagRepository::new(state.db.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tag not found"))?;
    Ok(Json(ApiResponse::new(TagResponse::from(tag))))
}

/// PATCH /api/tags/:id - Update a tag.
#[utoipa::path(
    patch,
    path = "/api/tags/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Tag ID")),
    request_body = UpdateTagRequest,
    responses(
        (status = 200, description = "Tag updated", body = TagResponse),
        (status = 404, description = "Tag not found"),
        (status = 409, description = "Name already used in the group")
    )
)]
pub async fn update_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateTagRequest>,
) -> Result<Json<ApiResponse<TagResponse>>, ApiError> {
    let tag = TagRepository::new(state.db.pool())
        .update(id, &req.into_update())
        .await?
        .ok_or_else(|| ApiError::not_found("Tag not found"))?;
    Ok(Json(ApiResponse::new(TagResponse::from(tag))))
}

/// DELETE /api/tags/:id - Delete a tag and detach it from assets.
#[utoipa::path(
    delete,
    path = "/api/tags/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Tag ID")),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 404, description = "Tag not found")
    )
)]
pub async fn delete_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if TagRepository::new(state.db.pool()).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Tag not found"))
    }
}

// ============================================================================
// Country tags
// ============================================================================

/// GET /api/country-tags - List country tags.
#[utoipa::path(
    get,
    path = "/api/country-tags",
    tag = "catalog",
    responses((status = 200, description = "Country tags", body = Vec<CountryTagResponse>))
)]
pub async fn list_country_tags(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<CountryTagResponse>>>, ApiError> {
    let countries = CountryTagRepository::new(state.db.pool()).list().await?;
    Ok(Json(ApiResponse::new(
        countries.into_iter().map(CountryTagResponse::from).collect(),
    )))
}

/// POST /api/country-tags - Create a country tag.
#[utoipa::path(
    post,
    path = "/api/country-tags",
    tag = "catalog",
    request_body = CreateCountryTagRequest,
    responses(
        (status = 201, description = "Country tag created", body = CountryTagResponse),
        (status = 409, description = "Name or code already used"),
        (status = 422, description = "Invalid country code")
    )
)]
pub async fn create_country_tag(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateCountryTagRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CountryTagResponse>>), ApiError> {
    let country = CountryTagRepository::new(state.db.pool())
        .create(&req.into_new_country())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(CountryTagResponse::from(country))),
    ))
}

/// GET /api/country-tags/:id - Get a country tag.
#[utoipa::path(
    get,
    path = "/api/country-tags/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Country tag ID")),
    responses(
        (status = 200, description = "Country tag", body = CountryTagResponse),
        (status = 404, description = "Country tag not found")
    )
)]
pub async fn get_country_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<CountryTagResponse>>, ApiError> {
    let country = CountryTagRepository::new(state.db.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Country tag not found"))?;
    Ok(Json(ApiResponse::new(CountryTagResponse::from(country))))
}

/// PATCH /api/country-tags/:id - Update a country tag.
#[utoipa::path(
    patch,
    path = "/api/country-tags/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Country tag ID")),
    request_body = UpdateCountryTagRequest,
    responses(
        (status = 200, description = "Country tag updated", body = CountryTagResponse),
        (status = 404, description = "Country tag not found"),
        (status = 409, description = "Name or code already used"),
        (status = 422, description = "Invalid country code")
    )
)]
pub async fn update_country_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateCountryTagRequest>,
) -> Result<Json<ApiResponse<CountryTagResponse>>, ApiError> {
    let country = CountryTagRepository::new(state.db.pool())
        .update(id, &req.into_update())
        .await?
        .ok_or_else(|| ApiError::not_found("Country tag not found"))?;
    Ok(Json(ApiResponse::new(CountryTagResponse::from(country))))
}

/// DELETE /api/country-tags/:id - Delete a country tag.
#[utoipa::path(
    delete,
    path = "/api/country-tags/{id}",
    tag = "catalog",
    params(("id" = i64, Path, description = "Country tag ID")),
    responses(
        (status = 204, description = "Country tag deleted"),
        (status = 404, description = "Country tag not found")
    )
)]
pub async fn delete_country_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if CountryTagRepository::new(state.db.pool()).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Country tag not found"))
    }
}
