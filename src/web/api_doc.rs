//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::library::AssetStatus;
use crate::web::dto;
use crate::web::error;
use crate::web::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Asset Manager API",
        version = "0.1.0",
        description = "Digital asset management: folders, assets with files in an S3-compatible object store, and catalog metadata."
    ),
    paths(
        // Folders
        handlers::folder::list_folders,
        handlers::folder::create_folder,
        handlers::folder::get_folder,
        handlers::folder::update_folder,
        handlers::folder::delete_folder,
        handlers::folder::list_children,
        handlers::folder::list_folder_assets,
        handlers::folder::create_folder_asset,
        // Assets
        handlers::asset::list_assets,
        handlers::asset::create_asset,
        handlers::asset::get_asset,
        handlers::asset::update_asset,
        handlers::asset::delete_asset,
        handlers::asset::download_asset_file,
        handlers::asset::upload_asset_file,
        handlers::asset::remove_asset_file,
        handlers::asset::list_asset_chapters,
        handlers::asset::replace_asset_chapters,
        // Chapters
        handlers::chapter::list_chapters,
        handlers::chapter::create_chapter,
        handlers::chapter::get_chapter,
        handlers::chapter::update_chapter,
        handlers::chapter::delete_chapter,
        // Catalog
        handlers::catalog::list_collections,
        handlers::catalog::create_collection,
        handlers::catalog::get_collection,
        handlers::catalog::update_collection,
        handlers::catalog::delete_collection,
        handlers::catalog::list_contributors,
        handlers::catalog::create_contributor,
        handlers::catalog::get_contributor,
        handlers::catalog::update_contributor,
        handlers::catalog::delete_contributor,
        handlers::catalog::list_tag_groups,
        handlers::catalog::create_tag_group,
        handlers::catalog::get_tag_group,
        handlers::catalog::update_tag_group,
        handlers::catalog::delete_tag_group,
        handlers::catalog::list_tags,
        handlers::catalog::create_tag,
        handlers::catalog::get_tag,
        handlers::catalog::update_tag,
        handlers::catalog::delete_tag,
        handlers::catalog::list_country_tags,
        handlers::catalog::create_country_tag,
        handlers::catalog::get_country_tag,
        handlers::catalog::update_country_tag,
        handlers::catalog::delete_country_tag,
        // Learner journeys
        handlers::journey::list_journeys,
        handlers::journey::create_journey,
        handlers::journey::get_journey,
        handlers::journey::update_journey,
        handlers::journey::delete_journey,
        // Storage
        handlers::storage::storage_report,
    ),
    components(
        schemas(
            AssetStatus,
            // Folder models
            dto::FolderResponse,
            dto::FolderDetailResponse,
            dto::BreadcrumbItem,
            dto::FolderDeletionResponse,
            dto::CreateFolderRequest,
            dto::UpdateFolderRequest,
            // Asset models
            dto::AssetResponse,
            dto::CreateAssetRequest,
            dto::UpdateAssetRequest,
            dto::PaginationMeta,
            // Catalog models
            dto::NamedRequest,
            dto::NamedResponse,
            dto::TagResponse,
            dto::CreateTagRequest,
            dto::UpdateTagRequest,
            dto::CountryTagResponse,
            dto::CreateCountryTagRequest,
            dto::UpdateCountryTagRequest,
            dto::ChapterRequest,
            dto::ChapterResponse,
            dto::CreateChapterRequest,
            dto::UpdateChapterRequest,
            dto::ReplaceChaptersRequest,
            dto::JourneyResponse,
            dto::CreateJourneyRequest,
            dto::UpdateJourneyRequest,
            // Storage models
            dto::SyncReportResponse,
            dto::MissingObjectResponse,
            // Error
            error::ErrorBody,
            error::ErrorDetail,
            error::ErrorCode,
        )
    ),
    tags(
        (name = "folders", description = "Folder hierarchy operations"),
        (name = "assets", description = "Asset metadata and file operations"),
        (name = "chapters", description = "Chapters within assets"),
        (name = "catalog", description = "Tags, tag groups, collections, contributors and country tags"),
        (name = "learner-journeys", description = "Ordered asset sequences"),
        (name = "storage", description = "Object store consistency")
    )
)]
pub struct ApiDoc;
