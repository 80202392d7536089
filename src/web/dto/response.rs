//! Response DTOs for Web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::catalog::{Chapter, CountryTag, LearnerJourney, NamedEntity, Tag};
use crate::datetime::{format_duration, to_rfc3339};
use crate::library::{AssetDetails, AssetStatus, Folder, FolderDeletion, SyncReport};

// ============================================================================
// Generic Response Wrappers
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Paginated response wrapper.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    /// Response data.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PaginationMeta,
}

impl<T: Serialize> PaginatedResponse<T> {
    /// Create a new paginated response.
    pub fn new(data: Vec<T>, page: u32, per_page: u32, total: u64) -> Self {
        Self {
            data,
            meta: PaginationMeta {
                page,
                per_page,
                total,
            },
        }
    }
}

/// Pagination metadata.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u64,
}

// ============================================================================
// Folder DTOs
// ============================================================================

/// Folder response.
#[derive(Debug, Serialize, ToSchema)]
pub struct FolderResponse {
    /// Folder ID.
    pub id: i64,
    /// Folder name.
    pub name: String,
    /// Folder description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parent folder ID, null for top-level folders.
    pub parent: Option<i64>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last change timestamp.
    pub updated_at: String,
}

impl From<Folder> for FolderResponse {
    fn from(folder: Folder) -> Self {
        Self {
            id: folder.id,
            name: folder.name,
            description: folder.description,
            parent: folder.parent_id,
            created_at: to_rfc3339(&folder.created_at),
            updated_at: to_rfc3339(&folder.updated_at),
        }
    }
}

/// A step in a folder breadcrumb.
#[derive(Debug, Serialize, ToSchema)]
pub struct BreadcrumbItem {
    pub id: i64,
    pub name: String,
}

/// Folder details with its location and contents.
#[derive(Debug, Serialize, ToSchema)]
pub struct FolderDetailResponse {
    /// The folder.
    #[serde(flatten)]
    pub folder: FolderResponse,
    /// Folders from the top of the tree down to this one.
    pub path: Vec<BreadcrumbItem>,
    /// Number of direct child folders.
    pub child_count: i64,
    /// Number of assets directly in this folder.
    pub asset_count: i64,
}

/// Result of a cascading folder delete.
#[derive(Debug, Serialize, ToSchema)]
pub struct FolderDeletionResponse {
    /// Folders removed, including the one requested.
    pub folders: usize,
    /// Assets removed.
    pub assets: usize,
    /// Stored objects removed.
    pub objects: usize,
}

impl From<FolderDeletion> for FolderDeletionResponse {
    fn from(deletion: FolderDeletion) -> Self {
        Self {
            folders: deletion.folders,
            assets: deletion.assets,
            objects: deletion.objects,
        }
    }
}

// ============================================================================
// Asset DTOs
// ============================================================================

/// Asset response.
#[derive(Debug, Serialize, ToSchema)]
pub struct AssetResponse {
    /// Asset ID.
    pub id: i64,
    /// Asset name.
    pub name: String,
    /// Folder holding the asset.
    pub parent: i64,
    /// Stored file name.
    pub file: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    /// Running time in seconds.
    pub duration: Option<i64>,
    /// Running time as HH:MM:SS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_display: Option<String>,
    /// Date the content was made (YYYY-MM-DD).
    pub creation_date: Option<String>,
    pub copyright_info: Option<String>,
    pub enabled: bool,
    pub status: AssetStatus,
    pub type_field: Option<String>,
    /// MIME type of the stored file.
    pub filetype: Option<String>,
    /// Size of the stored file in bytes.
    pub file_size: Option<i64>,
    pub uploaded_at: String,
    pub last_edit_at: String,
    /// Tag IDs.
    pub tags: Vec<i64>,
    /// Country tag IDs.
    pub locations: Vec<i64>,
    /// Contributor IDs.
    pub contributors: Vec<i64>,
    /// Collection IDs.
    pub collections: Vec<i64>,
}

impl From<AssetDetails> for AssetResponse {
    fn from(details: AssetDetails) -> Self {
        let AssetDetails { asset, links } = details;
        Self {
            id: asset.id,
            name: asset.name,
            parent: asset.parent_id,
            file: asset.file,
            link: asset.link,
            description: asset.description,
            duration_display: asset.duration.map(format_duration),
            duration: asset.duration,
            creation_date: asset.creation_date,
            copyright_info: asset.copyright_info,
            enabled: asset.enabled,
            status: asset.status,
            type_field: asset.type_field,
            filetype: asset.filetype,
            file_size: asset.file_size,
            uploaded_at: to_rfc3339(&asset.uploaded_at),
            last_edit_at: to_rfc3339(&asset.last_edit_at),
            tags: links.tags,
            locations: links.locations,
            contributors: links.contributors,
            collections: links.collections,
        }
    }
}

// ============================================================================
// Catalog DTOs
// ============================================================================

/// Collection, contributor or tag group.
#[derive(Debug, Serialize, ToSchema)]
pub struct NamedResponse {
    pub id: i64,
    pub name: String,
}

impl From<NamedEntity> for NamedResponse {
    fn from(entity: NamedEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
        }
    }
}

/// Tag response.
#[derive(Debug, Serialize, ToSchema)]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
    /// Tag group ID.
    pub group: Option<i64>,
    pub deprecated: bool,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            group: tag.group_id,
            deprecated: tag.deprecated,
        }
    }
}

/// Country tag response.
#[derive(Debug, Serialize, ToSchema)]
pub struct CountryTagResponse {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    /// ISO 3166-1 alpha-2 code.
    pub code: String,
}

impl From<CountryTag> for CountryTagResponse {
    fn from(country: CountryTag) -> Self {
        Self {
            id: country.id,
            name: country.name,
            display_name: country.display_name,
            code: country.code,
        }
    }
}

/// Chapter response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChapterResponse {
    pub id: i64,
    /// Asset the chapter belongs to.
    pub asset: i64,
    pub name: String,
    /// Start offset in seconds.
    pub start_time: i64,
    /// End offset in seconds.
    pub end_time: Option<i64>,
    pub description: Option<String>,
}

impl From<Chapter> for ChapterResponse {
    fn from(chapter: Chapter) -> Self {
        Self {
            id: chapter.id,
            asset: chapter.asset_id,
            name: chapter.name,
            start_time: chapter.start_time,
            end_time: chapter.end_time,
            description: chapter.description,
        }
    }
}

/// Learner journey response.
#[derive(Debug, Serialize, ToSchema)]
pub struct JourneyResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Asset IDs in journey order.
    pub assets: Vec<i64>,
}

impl From<LearnerJourney> for JourneyResponse {
    fn from(journey: LearnerJourney) -> Self {
        Self {
            id: journey.id,
            name: journey.name,
            description: journey.description,
            assets: journey.asset_ids,
        }
    }
}

// ============================================================================
// Storage DTOs
// ============================================================================

/// An asset whose stored object is missing.
#[derive(Debug, Serialize, ToSchema)]
pub struct MissingObjectResponse {
    pub asset: i64,
    pub key: String,
}

/// Consistency report between asset rows and the object store.
#[derive(Debug, Serialize, ToSchema)]
pub struct SyncReportResponse {
    /// True when every object is referenced and every file is present.
    pub consistent: bool,
    pub objects_checked: usize,
    pub assets_checked: usize,
    /// Keys no asset references.
    pub orphaned_objects: Vec<String>,
    /// Assets whose object is missing.
    pub missing_objects: Vec<MissingObjectResponse>,
}

impl From<SyncReport> for SyncReportResponse {
    fn from(report: SyncReport) -> Self {
        Self {
            consistent: report.is_consistent(),
            objects_checked: report.objects_checked,
            assets_checked: report.assets_checked,
            orphaned_objects: report.orphaned_objects,
            missing_objects: report
                .missing_objects
                .into_iter()
                .map(|m| MissingObjectResponse {
                    asset: m.asset_id,
                    key: m.key,
                })
                .collect(),
        }
    }
}
