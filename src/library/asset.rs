//! Asset types and repository.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use thiserror::Error;

use crate::storage::asset_key;
use crate::{AssetManagerError, Result};

/// Editorial status of an asset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    #[default]
    Draft,
    Review,
    Published,
    Archived,
}

/// Error for an unknown status string.
#[derive(Debug, Error)]
#[error("\"{0}\" is not a valid choice.")]
pub struct InvalidStatus(pub String);

impl AssetStatus {
    pub const ALL: [AssetStatus; 4] = [
        AssetStatus::Draft,
        AssetStatus::Review,
        AssetStatus::Published,
        AssetStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Draft => "draft",
            AssetStatus::Review => "review",
            AssetStatus::Published => "published",
            AssetStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        AssetStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidStatus(s.to_string()))
    }
}

impl TryFrom<String> for AssetStatus {
    type Error = InvalidStatus;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// Guess the MIME type of a file from its name.
pub fn guess_filetype(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// An asset in the library.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Asset {
    pub id: i64,
    pub name: String,
    /// Folder holding the asset.
    pub parent_id: i64,
    /// Stored file name, if a file is attached.
    pub file: Option<String>,
    pub file_size: Option<i64>,
    /// MIME type of the attached file.
    pub filetype: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    /// Running time in seconds.
    pub duration: Option<i64>,
    /// Calendar date the content was made (YYYY-MM-DD).
    pub creation_date: Option<String>,
    pub copyright_info: Option<String>,
    pub enabled: bool,
    #[sqlx(try_from = "String")]
    pub status: AssetStatus,
    pub type_field: Option<String>,
    pub uploaded_at: String,
    pub last_edit_at: String,
}

impl Asset {
    /// Object key of the attached file, `media/<parent_id>/<file>`.
    pub fn object_key(&self) -> Option<String> {
        self.file.as_deref().map(|file| asset_key(self.parent_id, file))
    }
}

/// A file attached to an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub name: String,
    pub size: i64,
    pub filetype: String,
}

impl StoredFile {
    pub fn new(name: impl Into<String>, size: i64) -> Self {
        let name = name.into();
        let filetype = guess_filetype(&name);
        Self {
            name,
            size,
            filetype,
        }
    }
}

/// Data for creating a new asset.
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub name: String,
    pub parent_id: Option<i64>,
    pub file: Option<StoredFile>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub duration: Option<i64>,
    pub creation_date: Option<String>,
    pub copyright_info: Option<String>,
    pub enabled: bool,
    pub status: AssetStatus,
    pub type_field: Option<String>,
}

impl NewAsset {
    /// Create a new enabled draft asset with no parent yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_id: None,
            file: None,
            link: None,
            description: None,
            duration: None,
            creation_date: None,
            copyright_info: None,
            enabled: true,
            status: AssetStatus::default(),
            type_field: None,
        }
    }

    pub fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_file(mut self, file: StoredFile) -> Self {
        self.file = Some(file);
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_duration(mut self, seconds: i64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_creation_date(mut self, date: impl Into<String>) -> Self {
        self.creation_date = Some(date.into());
        self
    }

    pub fn with_copyright_info(mut self, info: impl Into<String>) -> Self {
        self.copyright_info = Some(info.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_status(mut self, status: AssetStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_type_field(mut self, type_field: impl Into<String>) -> Self {
        self.type_field = Some(type_field.into());
        self
    }
}

/// Builder for updating an asset.
#[derive(Debug, Clone, Default)]
pub struct AssetUpdate {
    pub name: Option<String>,
    pub parent_id: Option<i64>,
    /// `Some(None)` detaches the file.
    pub file: Option<Option<StoredFile>>,
    pub link: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub duration: Option<Option<i64>>,
    pub creation_date: Option<Option<String>>,
    pub copyright_info: Option<Option<String>>,
    pub enabled: Option<bool>,
    pub status: Option<AssetStatus>,
    pub type_field: Option<Option<String>>,
}

impl AssetUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn parent_id(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn file(mut self, file: Option<StoredFile>) -> Self {
        self.file = Some(file);
        self
    }

    pub fn link(mut self, link: Option<impl Into<String>>) -> Self {
        self.link = Some(link.map(|s| s.into()));
        self
    }

    pub fn description(mut self, description: Option<impl Into<String>>) -> Self {
        self.description = Some(description.map(|s| s.into()));
        self
    }

    pub fn duration(mut self, seconds: Option<i64>) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn creation_date(mut self, date: Option<impl Into<String>>) -> Self {
        self.creation_date = Some(date.map(|s| s.into()));
        self
    }

    pub fn copyright_info(mut self, info: Option<impl Into<String>>) -> Self {
        self.copyright_info = Some(info.map(|s| s.into()));
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn status(mut self, status: AssetStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn type_field(mut self, type_field: Option<impl Into<String>>) -> Self {
        self.type_field = Some(type_field.map(|s| s.into()));
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.parent_id.is_none()
            && self.file.is_none()
            && self.link.is_none()
            && self.description.is_none()
            && self.duration.is_none()
            && self.creation_date.is_none()
            && self.copyright_info.is_none()
            && self.enabled.is_none()
            && self.status.is_none()
            && self.type_field.is_none()
    }
}

/// Many-to-many relations of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Tags,
    Locations,
    Contributors,
    Collections,
}

impl Relation {
    pub const ALL: [Relation; 4] = [
        Relation::Tags,
        Relation::Locations,
        Relation::Contributors,
        Relation::Collections,
    ];

    fn link_table(&self) -> &'static str {
        match self {
            Relation::Tags => "asset_tags",
            Relation::Locations => "asset_locations",
            Relation::Contributors => "asset_contributors",
            Relation::Collections => "asset_collections",
        }
    }

    fn link_column(&self) -> &'static str {
        match self {
            Relation::Tags => "tag_id",
            Relation::Locations => "country_tag_id",
            Relation::Contributors => "contributor_id",
            Relation::Collections => "collection_id",
        }
    }

    fn target_table(&self) -> &'static str {
        match self {
            Relation::Tags => "tags",
            Relation::Locations => "country_tags",
            Relation::Contributors => "contributors",
            Relation::Collections => "collections",
        }
    }

    /// Field name used in API payloads and error details.
    pub fn field(&self) -> &'static str {
        match self {
            Relation::Tags => "tags",
            Relation::Locations => "locations",
            Relation::Contributors => "contributors",
            Relation::Collections => "collections",
        }
    }
}

/// Relation ids to set on an asset. `None` leaves a relation untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetRelations {
    pub tags: Option<Vec<i64>>,
    pub locations: Option<Vec<i64>>,
    pub contributors: Option<Vec<i64>>,
    pub collections: Option<Vec<i64>>,
}

impl AssetRelations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tags(mut self, ids: Vec<i64>) -> Self {
        self.tags = Some(ids);
        self
    }

    pub fn locations(mut self, ids: Vec<i64>) -> Self {
        self.locations = Some(ids);
        self
    }

    pub fn contributors(mut self, ids: Vec<i64>) -> Self {
        self.contributors = Some(ids);
        self
    }

    pub fn collections(mut self, ids: Vec<i64>) -> Self {
        self.collections = Some(ids);
        self
    }

    pub fn get(&self, relation: Relation) -> Option<&[i64]> {
        match relation {
            Relation::Tags => self.tags.as_deref(),
            Relation::Locations => self.locations.as_deref(),
            Relation::Contributors => self.contributors.as_deref(),
            Relation::Collections => self.collections.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Relation::ALL.iter().all(|r| self.get(*r).is_none())
    }
}

/// Relation ids currently attached to an asset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetLinks {
    pub tags: Vec<i64>,
    pub locations: Vec<i64>,
    pub contributors: Vec<i64>,
    pub collections: Vec<i64>,
}

/// An asset together with its relations.
#[derive(Debug, Clone)]
pub struct AssetDetails {
    pub asset: Asset,
    pub links: AssetLinks,
}

/// Filter for listing assets.
#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    pub folder_id: Option<i64>,
    pub tag_id: Option<i64>,
    pub collection_id: Option<i64>,
    pub contributor_id: Option<i64>,
    pub location_id: Option<i64>,
    pub enabled: Option<bool>,
    pub status: Option<AssetStatus>,
    /// Case-insensitive substring of the name or description.
    pub search: Option<String>,
}

impl AssetFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn folder(mut self, folder_id: i64) -> Self {
        self.folder_id = Some(folder_id);
        self
    }

    pub fn tag(mut self, tag_id: i64) -> Self {
        self.tag_id = Some(tag_id);
        self
    }

    pub fn status(mut self, status: AssetStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    fn push_conditions(&self, query: &mut QueryBuilder<'_, Sqlite>) {
        query.push(" WHERE 1 = 1");

        if let Some(folder_id) = self.folder_id {
            query.push(" AND parent_id = ");
            query.push_bind(folder_id);
        }

        let links = [
            (self.tag_id, Relation::Tags),
            (self.collection_id, Relation::Collections),
            (self.contributor_id, Relation::Contributors),
            (self.location_id, Relation::Locations),
        ];
        for (id, relation) in links {
            if let Some(id) = id {
                query.push(format!(
                    " AND id IN (SELECT asset_id FROM {} WHERE {} = ",
                    relation.link_table(),
                    relation.link_column()
                ));
                query.push_bind(id);
                query.push(")");
            }
        }

        if let Some(enabled) = self.enabled {
            query.push(" AND enabled = ");
            query.push_bind(enabled);
        }

        if let Some(status) = self.status {
            query.push(" AND status = ");
            query.push_bind(status.as_str());
        }

        if let Some(ref search) = self.search {
            let pattern = format!("%{}%", escape_like(search.trim()));
            query.push(" AND (name LIKE ");
            query.push_bind(pattern.clone());
            query.push(" ESCAPE '\\' OR description LIKE ");
            query.push_bind(pattern);
            query.push(" ESCAPE '\\')");
        }
    }
}

/// Escape `LIKE` wildcards so user text matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

const ASSET_COLUMNS: &str = "id, name, parent_id, file, file_size, filetype, link, description, \
     duration, creation_date, copyright_info, enabled, status, type_field, uploaded_at, last_edit_at";

/// Repository for asset operations.
pub struct AssetRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AssetRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new asset. The parent must be set.
    pub async fn create(&self, asset: &NewAsset) -> Result<Asset> {
        let parent_id = asset.parent_id.ok_or_else(|| {
            AssetManagerError::Validation(super::validation::MISSING_PARENT.to_string())
        })?;

        let result = sqlx::query(
            "INSERT INTO assets (name, parent_id, file, file_size, filetype, link, description,
                                 duration, creation_date, copyright_info, enabled, status, type_field)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&asset.name)
        .bind(parent_id)
        .bind(asset.file.as_ref().map(|f| f.name.as_str()))
        .bind(asset.file.as_ref().map(|f| f.size))
        .bind(asset.file.as_ref().map(|f| f.filetype.as_str()))
        .bind(&asset.link)
        .bind(&asset.description)
        .bind(asset.duration)
        .bind(&asset.creation_date)
        .bind(&asset.copyright_info)
        .bind(asset.enabled)
        .bind(asset.status.as_str())
        .bind(&asset.type_field)
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| AssetManagerError::NotFound("asset".to_string()))
    }

    /// Get an asset by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Asset>> {
        let asset =
            sqlx::query_as::<_, Asset>(&format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = ?"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(asset)
    }

    /// List assets matching a filter, newest first.
    pub async fn list(&self, filter: &AssetFilter, offset: i64, limit: i64) -> Result<Vec<Asset>> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {ASSET_COLUMNS} FROM assets"));
        filter.push_conditions(&mut query);
        query.push(" ORDER BY id DESC LIMIT ");
        query.push_bind(limit);
        query.push(" OFFSET ");
        query.push_bind(offset);

        let assets = query.build_query_as::<Asset>().fetch_all(self.pool).await?;
        Ok(assets)
    }

    /// Count assets matching a filter.
    pub async fn count(&self, filter: &AssetFilter) -> Result<i64> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM assets");
        filter.push_conditions(&mut query);

        let count: (i64,) = query.build_query_as().fetch_one(self.pool).await?;
        Ok(count.0)
    }

    /// Assets in any of the given folders.
    pub async fn list_by_folders(&self, folder_ids: &[i64]) -> Result<Vec<Asset>> {
        if folder_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {ASSET_COLUMNS} FROM assets WHERE parent_id IN ("
        ));
        let mut separated = query.separated(", ");
        for id in folder_ids {
            separated.push_bind(*id);
        }
        query.push(") ORDER BY id");

        let assets = query.build_query_as::<Asset>().fetch_all(self.pool).await?;
        Ok(assets)
    }

    /// Every asset with an attached file.
    pub async fn list_with_files(&self) -> Result<Vec<Asset>> {
        let assets = sqlx::query_as::<_, Asset>(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets WHERE file IS NOT NULL ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(assets)
    }

    /// Find an asset by name within a folder.
    pub async fn find_by_name_in_folder(&self, folder_id: i64, name: &str) -> Result<Option<Asset>> {
        let asset = sqlx::query_as::<_, Asset>(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets WHERE parent_id = ? AND name = ?"
        ))
        .bind(folder_id)
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(asset)
    }

    /// Find the asset holding a stored file name within a folder.
    pub async fn find_by_file_in_folder(&self, folder_id: i64, file: &str) -> Result<Option<Asset>> {
        let asset = sqlx::query_as::<_, Asset>(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets WHERE parent_id = ? AND file = ?"
        ))
        .bind(folder_id)
        .bind(file)
        .fetch_optional(self.pool)
        .await?;

        Ok(asset)
    }

    /// Update an asset. `last_edit_at` is always refreshed.
    pub async fn update(&self, id: i64, update: &AssetUpdate) -> Result<Option<Asset>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE assets SET ");
        let mut separated = query.separated(", ");

        if let Some(ref name) = update.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name.clone());
        }

        if let Some(parent_id) = update.parent_id {
            separated.push("parent_id = ");
            separated.push_bind_unseparated(parent_id);
        }

        if let Some(ref file) = update.file {
            separated.push("file = ");
            separated.push_bind_unseparated(file.as_ref().map(|f| f.name.clone()));
            separated.push("file_size = ");
            separated.push_bind_unseparated(file.as_ref().map(|f| f.size));
            separated.push("filetype = ");
            separated.push_bind_unseparated(file.as_ref().map(|f| f.filetype.clone()));
        }

        if let Some(ref link) = update.link {
            separated.push("link = ");
            separated.push_bind_unseparated(link.clone());
        }

        if let Some(ref description) = update.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description.clone());
        }

        if let Some(duration) = update.duration {
            separated.push("duration = ");
            separated.push_bind_unseparated(duration);
        }

        if let Some(ref creation_date) = update.creation_date {
            separated.push("creation_date = ");
            separated.push_bind_unseparated(creation_date.clone());
        }

        if let Some(ref copyright_info) = update.copyright_info {
            separated.push("copyright_info = ");
            separated.push_bind_unseparated(copyright_info.clone());
        }

        if let Some(enabled) = update.enabled {
            separated.push("enabled = ");
            separated.push_bind_unseparated(enabled);
        }

        if let Some(status) = update.status {
            separated.push("status = ");
            separated.push_bind_unseparated(status.as_str());
        }

        if let Some(ref type_field) = update.type_field {
            separated.push("type_field = ");
            separated.push_bind_unseparated(type_field.clone());
        }

        separated.push("last_edit_at = datetime('now')");

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query.build().execute(self.pool).await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Attach or detach the stored file.
    pub async fn set_file(&self, id: i64, file: Option<StoredFile>) -> Result<Option<Asset>> {
        self.update(id, &AssetUpdate::new().file(file)).await
    }

    /// Delete an asset by ID.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM assets WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Ids from `ids` that do not exist in the relation's target table.
    pub async fn missing_relation_ids(&self, relation: Relation, ids: &[i64]) -> Result<Vec<i64>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT id FROM {} WHERE id IN (",
            relation.target_table()
        ));
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        query.push(")");

        let found: Vec<(i64,)> = query.build_query_as().fetch_all(self.pool).await?;
        let found: std::collections::HashSet<i64> = found.into_iter().map(|(id,)| id).collect();

        Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
    }

    /// Load the relation ids attached to an asset.
    pub async fn load_links(&self, asset_id: i64) -> Result<AssetLinks> {
        let mut links = AssetLinks::default();
        for relation in Relation::ALL {
            let rows: Vec<(i64,)> = sqlx::query_as(&format!(
                "SELECT {} FROM {} WHERE asset_id = ? ORDER BY {}",
                relation.link_column(),
                relation.link_table(),
                relation.link_column()
            ))
            .bind(asset_id)
            .fetch_all(self.pool)
            .await?;
            let ids = rows.into_iter().map(|(id,)| id).collect();

            match relation {
                Relation::Tags => links.tags = ids,
                Relation::Locations => links.locations = ids,
                Relation::Contributors => links.contributors = ids,
                Relation::Collections => links.collections = ids,
            }
        }
        Ok(links)
    }

    /// Replace the relations that are set in `relations`.
    pub async fn replace_relations(&self, asset_id: i64, relations: &AssetRelations) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for relation in Relation::ALL {
            let Some(ids) = relations.get(relation) else {
                continue;
            };

            sqlx::query(&format!(
                "DELETE FROM {} WHERE asset_id = ?",
                relation.link_table()
            ))
            .bind(asset_id)
            .execute(&mut *tx)
            .await?;

            for id in ids {
                sqlx::query(&format!(
                    "INSERT OR IGNORE INTO {} (asset_id, {}) VALUES (?, ?)",
                    relation.link_table(),
                    relation.link_column()
                ))
                .bind(asset_id)
                .bind(*id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Load an asset together with its relations.
    pub async fn get_details(&self, id: i64) -> Result<Option<AssetDetails>> {
        let Some(asset) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let links = self.load_links(id).await?;
        Ok(Some(AssetDetails { asset, links }))
    }
}
