//! Request DTOs for Web API.

use serde::{Deserialize, Deserializer};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::catalog::{
    ChapterUpdate, CountryTagUpdate, JourneyUpdate, NewChapter, NewCountryTag, NewJourney,
    NewTag, TagUpdate,
};
use crate::library::{
    AssetFilter, AssetRelations, AssetStatus, AssetUpdate, FolderUpdate, NewAsset, NewFolder,
};

use super::validation::{no_control_chars, not_empty_trimmed};

/// Default page size.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Largest page size a client may ask for.
pub const MAX_PER_PAGE: u32 = 100;

/// Deserialize a field that distinguishes "absent" from "null".
///
/// Used with `#[serde(default)]`: a missing field stays `None`, an explicit
/// `null` becomes `Some(None)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Treat an empty or whitespace-only string as absent.
fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

/// Page number and size.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// Page number, starting at 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PaginationQuery {
    /// Clamp the page and size into range.
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// SQL offset and limit for this page.
    pub fn to_offset_limit(&self) -> (i64, i64) {
        let page = self.normalized();
        let offset = (page.page as i64 - 1) * page.per_page as i64;
        (offset, page.per_page as i64)
    }
}

// ============================================================================
// Folder DTOs
// ============================================================================

/// Filters for listing folders.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FolderListQuery {
    /// Only folders directly under this folder.
    pub parent: Option<i64>,
    /// Only top-level folders.
    pub root: Option<bool>,
}

/// Create folder request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFolderRequest {
    /// Folder name.
    #[validate(
        length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"),
        custom(function = "not_empty_trimmed")
    )]
    pub name: String,
    /// Folder description.
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    #[serde(default)]
    pub description: Option<String>,
    /// Parent folder ID; omit for a top-level folder.
    #[serde(default)]
    pub parent: Option<i64>,
}

impl CreateFolderRequest {
    pub fn into_new_folder(self) -> NewFolder {
        let mut folder = NewFolder::new(self.name).with_parent_opt(self.parent);
        if let Some(description) = blank_to_none(self.description) {
            folder = folder.with_description(description);
        }
        folder
    }
}

/// Update folder request. Send `"parent": null` to move a folder to the top level.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateFolderRequest {
    #[validate(
        length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"),
        custom(function = "not_empty_trimmed")
    )]
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub parent: Option<Option<i64>>,
}

impl UpdateFolderRequest {
    pub fn into_update(self) -> FolderUpdate {
        FolderUpdate {
            name: self.name,
            description: self.description.map(blank_to_none),
            parent_id: self.parent,
        }
    }
}

// ============================================================================
// Asset DTOs
// ============================================================================

/// Filters and paging for listing assets.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AssetListQuery {
    /// Page number, starting at 1.
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
    /// Folder ID.
    pub folder: Option<i64>,
    /// Tag ID.
    pub tag: Option<i64>,
    /// Collection ID.
    pub collection: Option<i64>,
    /// Contributor ID.
    pub contributor: Option<i64>,
    /// Country tag ID.
    pub location: Option<i64>,
    pub enabled: Option<bool>,
    #[param(value_type = Option<String>)]
    pub status: Option<AssetStatus>,
    /// Substring of the name or description.
    pub search: Option<String>,
}

impl AssetListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page.unwrap_or(1),
            per_page: self.per_page.unwrap_or(DEFAULT_PER_PAGE),
        }
        .normalized()
    }

    pub fn filter(&self) -> AssetFilter {
        AssetFilter {
            folder_id: self.folder,
            tag_id: self.tag,
            collection_id: self.collection,
            contributor_id: self.contributor,
            location_id: self.location,
            enabled: self.enabled,
            status: self.status,
            search: blank_to_none(self.search.clone()),
        }
    }
}

/// Create asset request (metadata only; upload the file separately).
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAssetRequest {
    #[validate(
        length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"),
        custom(function = "not_empty_trimmed")
    )]
    pub name: String,
    /// Folder to hold the asset.
    #[serde(default)]
    pub parent: Option<i64>,
    #[serde(default)]
    pub link: Option<String>,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    #[serde(default)]
    pub description: Option<String>,
    /// Running time in seconds.
    #[serde(default)]
    pub duration: Option<i64>,
    /// YYYY-MM-DD.
    #[serde(default)]
    pub creation_date: Option<String>,
    #[validate(custom(function = "no_control_chars"))]
    #[serde(default)]
    pub copyright_info: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub status: Option<AssetStatus>,
    #[serde(default)]
    pub type_field: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<i64>>,
    #[serde(default)]
    pub locations: Option<Vec<i64>>,
    #[serde(default)]
    pub contributors: Option<Vec<i64>>,
    #[serde(default)]
    pub collections: Option<Vec<i64>>,
}

impl CreateAssetRequest {
    pub fn into_parts(self) -> (NewAsset, AssetRelations) {
        let relations = AssetRelations {
            tags: self.tags,
            locations: self.locations,
            contributors: self.contributors,
            collections: self.collections,
        };

        let asset = NewAsset {
            name: self.name,
            parent_id: self.parent,
            file: None,
            link: blank_to_none(self.link),
            description: blank_to_none(self.description),
            duration: self.duration,
            creation_date: blank_to_none(self.creation_date),
            copyright_info: blank_to_none(self.copyright_info),
            enabled: self.enabled.unwrap_or(true),
            status: self.status.unwrap_or_default(),
            type_field: blank_to_none(self.type_field),
        };

        (asset, relations)
    }
}

/// Update asset request. Nullable fields are cleared with an explicit `null`.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAssetRequest {
    #[validate(
        length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"),
        custom(function = "not_empty_trimmed")
    )]
    #[serde(default)]
    pub name: Option<String>,
    /// Move the asset (and its file) to this folder.
    #[serde(default)]
    pub parent: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub link: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub duration: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub creation_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub copyright_info: Option<Option<String>>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub status: Option<AssetStatus>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub type_field: Option<Option<String>>,
    #[serde(default)]
    pub tags: Option<Vec<i64>>,
    #[serde(default)]
    pub locations: Option<Vec<i64>>,
    #[serde(default)]
    pub contributors: Option<Vec<i64>>,
    #[serde(default)]
    pub collections: Option<Vec<i64>>,
}

impl UpdateAssetRequest {
    pub fn into_parts(self) -> (AssetUpdate, AssetRelations) {
        let relations = AssetRelations {
            tags: self.tags,
            locations: self.locations,
            contributors: self.contributors,
            collections: self.collections,
        };

        let update = AssetUpdate {
            name: self.name,
            parent_id: self.parent,
            file: None,
            link: self.link.map(blank_to_none),
            description: self.description.map(blank_to_none),
            duration: self.duration,
            creation_date: self.creation_date.map(blank_to_none),
            copyright_info: self.copyright_info.map(blank_to_none),
            enabled: self.enabled,
            status: self.status,
            type_field: self.type_field.map(blank_to_none),
        };

        (update, relations)
    }
}

// ============================================================================
// Catalog DTOs
// ============================================================================

/// Create or rename a collection, contributor or tag group.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NamedRequest {
    #[validate(
        length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"),
        custom(function = "not_empty_trimmed"),
        custom(function = "no_control_chars")
    )]
    pub name: String,
}

/// Filters for listing tags.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TagListQuery {
    /// Only tags in this group.
    pub group: Option<i64>,
}

/// Create tag request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTagRequest {
    #[validate(
        length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"),
        custom(function = "not_empty_trimmed")
    )]
    pub name: String,
    /// Tag group ID.
    #[serde(default)]
    pub group: Option<i64>,
    #[serde(default)]
    pub deprecated: bool,
}

impl CreateTagRequest {
    pub fn into_new_tag(self) -> NewTag {
        NewTag {
            name: self.name,
            group_id: self.group,
            deprecated: self.deprecated,
        }
    }
}

/// Update tag request.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTagRequest {
    #[validate(
        length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"),
        custom(function = "not_empty_trimmed")
    )]
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub group: Option<Option<i64>>,
    #[serde(default)]
    pub deprecated: Option<bool>,
}

impl UpdateTagRequest {
    pub fn into_update(self) -> TagUpdate {
        TagUpdate {
            name: self.name,
            group_id: self.group,
            deprecated: self.deprecated,
        }
    }
}

/// Create country tag request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCountryTagRequest {
    #[validate(
        length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"),
        custom(function = "not_empty_trimmed")
    )]
    pub name: String,
    #[validate(
        length(min = 1, max = 255, message = "Display name must be between 1 and 255 characters"),
        custom(function = "not_empty_trimmed")
    )]
    pub display_name: String,
    /// ISO 3166-1 alpha-2 code.
    #[validate(length(equal = 2, message = "Code must be 2 letters"))]
    pub code: String,
}

impl CreateCountryTagRequest {
    pub fn into_new_country(self) -> NewCountryTag {
        NewCountryTag::new(self.name, self.display_name, self.code)
    }
}

/// Update country tag request.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCountryTagRequest {
    #[validate(
        length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"),
        custom(function = "not_empty_trimmed")
    )]
    #[serde(default)]
    pub name: Option<String>,
    #[validate(
        length(min = 1, max = 255, message = "Display name must be between 1 and 255 characters"),
        custom(function = "not_empty_trimmed")
    )]
    #[serde(default)]
    pub display_name: Option<String>,
    #[validate(length(equal = 2, message = "Code must be 2 letters"))]
    #[serde(default)]
    pub code: Option<String>,
}

impl UpdateCountryTagRequest {
    pub fn into_update(self) -> CountryTagUpdate {
        CountryTagUpdate {
            name: self.name,
            display_name: self.display_name,
            code: self.code,
        }
    }
}

/// Filters for listing chapters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChapterListQuery {
    /// Only chapters of this asset.
    pub asset: Option<i64>,
}

/// A chapter inside an asset.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChapterRequest {
    #[validate(
        length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"),
        custom(function = "not_empty_trimmed")
    )]
    pub name: String,
    /// Start offset in seconds.
    #[validate(range(min = 0, message = "Start time cannot be negative"))]
    pub start_time: i64,
    /// End offset in seconds.
    #[serde(default)]
    pub end_time: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ChapterRequest {
    pub fn into_new_chapter(self) -> NewChapter {
        NewChapter {
            name: self.name,
            start_time: self.start_time,
            end_time: self.end_time,
            description: blank_to_none(self.description),
        }
    }
}

/// Create chapter request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateChapterRequest {
    /// Asset the chapter belongs to.
    pub asset: i64,
    #[serde(flatten)]
    #[validate(nested)]
    pub chapter: ChapterRequest,
}

/// Replace every chapter of an asset.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReplaceChaptersRequest {
    #[validate(nested)]
    pub chapters: Vec<ChapterRequest>,
}

/// Update chapter request.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateChapterRequest {
    #[validate(
        length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"),
        custom(function = "not_empty_trimmed")
    )]
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_time: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub end_time: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

impl UpdateChapterRequest {
    pub fn into_update(self) -> ChapterUpdate {
        ChapterUpdate {
            name: self.name,
            start_time: self.start_time,
            end_time: self.end_time,
            description: self.description.map(blank_to_none),
        }
    }
}

/// Create learner journey request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateJourneyRequest {
    #[validate(
        length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"),
        custom(function = "not_empty_trimmed")
    )]
    pub name: String,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    #[serde(default)]
    pub description: Option<String>,
    /// Asset IDs in journey order.
    #[serde(default)]
    pub assets: Vec<i64>,
}

impl CreateJourneyRequest {
    pub fn into_new_journey(self) -> NewJourney {
        NewJourney {
            name: self.name,
            description: blank_to_none(self.description),
            asset_ids: self.assets,
        }
    }
}

/// Update learner journey request.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateJourneyRequest {
    #[validate(
        length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"),
        custom(function = "not_empty_trimmed")
    )]
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub assets: Option<Vec<i64>>,
}

impl UpdateJourneyRequest {
    pub fn into_update(self) -> JourneyUpdate {
        JourneyUpdate {
            name: self.name,
            description: self.description.map(blank_to_none),
            asset_ids: self.assets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_offsets() {
        let query = PaginationQuery {
            page: 3,
            per_page: 10,
        };
        assert_eq!(query.to_offset_limit(), (20, 10));

        let query = PaginationQuery {
            page: 0,
            per_page: 1000,
        };
        assert_eq!(query.to_offset_limit(), (0, MAX_PER_PAGE as i64));
    }

    #[test]
    fn test_null_differs_from_missing() {
        let absent: UpdateFolderRequest = serde_json::from_str(r#"{"name": "A"}"#).unwrap();
        assert_eq!(absent.parent, None);

        let cleared: UpdateFolderRequest = serde_json::from_str(r#"{"parent": null}"#).unwrap();
        assert_eq!(cleared.parent, Some(None));

        let moved: UpdateFolderRequest = serde_json::from_str(r#"{"parent": 4}"#).unwrap();
        assert_eq!(moved.parent, Some(Some(4)));
    }

    #[test]
    fn test_create_asset_defaults() {
        let request: CreateAssetRequest =
            serde_json::from_str(r#"{"name": "Intro", "parent": 1, "tags": [2], "link": ""}"#)
                .unwrap();
        let (asset, relations) = request.into_parts();
        assert!(asset.enabled);
        assert_eq!(asset.status, AssetStatus::Draft);
        assert_eq!(asset.link, None);
        assert_eq!(relations.tags, Some(vec![2]));
        assert_eq!(relations.collections, None);
    }

    #[test]
    fn test_invalid_status_rejected() {
        let result: Result<CreateAssetRequest, _> =
            serde_json::from_str(r#"{"name": "Intro", "status": "live"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_request_validation() {
        let request = CreateFolderRequest {
            name: "   ".to_string(),
            description: None,
            parent: None,
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));

        let request = ChapterRequest {
            name: "Intro".to_string(),
            start_time: -1,
            end_time: None,
            description: None,
        };
        assert!(request.validate().is_err());
    }
}
