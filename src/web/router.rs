//! Router configuration for Web API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::api_doc::ApiDoc;
use super::handlers::*;
use super::middleware::{create_cors_layer, security_headers};

/// Room for multipart boundaries and text fields on top of the file itself.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let body_limit = usize::try_from(app_state.max_upload_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let folder_routes = Router::new()
        .route("/", get(list_folders).post(create_folder))
        .route(
            "/:id",
            get(get_folder).patch(update_folder).delete(delete_folder),
        )
        .route("/:id/children", get(list_children))
        .route(
            "/:id/assets",
            get(list_folder_assets).post(create_folder_asset),
        );

    let asset_routes = Router::new()
        .route("/", get(list_assets).post(create_asset))
        .route(
            "/:id",
            get(get_asset).patch(update_asset).delete(delete_asset),
        )
        .route(
            "/:id/file",
            get(download_asset_file)
                .put(upload_asset_file)
                .delete(remove_asset_file),
        )
        .route(
            "/:id/chapters",
            get(list_asset_chapters).put(replace_asset_chapters),
        );

    let chapter_routes = Router::new()
        .route("/", get(list_chapters).post(create_chapter))
        .route(
            "/:id",
            get(get_chapter).patch(update_chapter).delete(delete_chapter),
        );

    let collection_routes = Router::new()
        .route("/", get(list_collections).post(create_collection))
        .route(
            "/:id",
            get(get_collection)
                .patch(update_collection)
                .delete(delete_collection),
        );

    let contributor_routes = Router::new()
        .route("/", get(list_contributors).post(create_contributor))
        .route(
            "/:id",
            get(get_contributor)
                .patch(update_contributor)
                .delete(delete_contributor),
        );

    let tag_group_routes = Router::new()
        .route("/", get(list_tag_groups).post(create_tag_group))
        .route(
            "/:id",
            get(get_tag_group)
                .patch(update_tag_group)
                .delete(delete_tag_group),
        );

    let tag_routes = Router::new()
        .route("/", get(list_tags).post(create_tag))
        .route("/:id", get(get_tag).patch(update_tag).delete(delete_tag));

    let country_routes = Router::new()
        .route("/", get(list_country_tags).post(create_country_tag))
        .route(
            "/:id",
            get(get_country_tag)
                .patch(update_country_tag)
                .delete(delete_country_tag),
        );

    let journey_routes = Router::new()
        .route("/", get(list_journeys).post(create_journey))
        .route(
            "/:id",
            get(get_journey).patch(update_journey).delete(delete_journey),
        );

    // API routes
    let api_routes = Router::new()
        .nest("/folders", folder_routes)
        .nest("/assets", asset_routes)
        .nest("/chapters", chapter_routes)
        .nest("/collections", collection_routes)
        .nest("/contributors", contributor_routes)
        .nest("/tag-groups", tag_group_routes)
        .nest("/tags", tag_routes)
        .nest("/country-tags", country_routes)
        .nest("/learner-journeys", journey_routes)
        .route("/storage/report", get(storage_report));

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(security_headers))
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Create the Swagger UI router serving the OpenAPI document.
pub fn create_swagger_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
