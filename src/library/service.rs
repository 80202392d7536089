//! Library service.
//!
//! This module provides the operations that must keep folder rows, asset rows
//! and stored objects consistent with each other:
//! - Folder create/update with name, uniqueness and cycle checks
//! - Cascading folder delete including stored objects
//! - Asset create/update/delete with file upload, replacement and relocation
//! - A consistency audit between the database and the object store

use std::collections::HashSet;

use bytes::Bytes;
use tracing::{info, warn};

use crate::catalog::{invalid_pk_msg, Chapter, ChapterRepository, NewChapter};
use crate::datetime::normalize_date;
use crate::db::Database;
use crate::storage::{asset_key, ObjectStorage, StorageError, MEDIA_PREFIX};
use crate::{AssetManagerError, Result};

use super::asset::{
    Asset, AssetDetails, AssetRelations, AssetRepository, AssetUpdate, NewAsset, Relation,
    StoredFile,
};
use super::folder::{Folder, FolderRepository, FolderUpdate, NewFolder};
use super::validation::{
    base_file_name, check_inline_duplicates, check_length, duplicate_file_name_msg, duplicate_model_name_msg,
    validate_file_name, validate_name, DESCENDANT_SET_AS_PARENT, FOLDER_SET_AS_OWN_PARENT,
    MISSING_PARENT, ROOT_LABEL,
};
use super::{DEFAULT_MAX_FILE_SIZE, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH};

/// A file received from a client.
#[derive(Debug, Clone)]
pub struct Upload {
    /// File name as sent by the client.
    pub file_name: String,
    /// File content.
    pub data: Bytes,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
        }
    }
}

/// Result of a file download.
#[derive(Debug)]
pub struct DownloadResult {
    /// Asset owning the file.
    pub asset: Asset,
    /// File content.
    pub content: Bytes,
}

/// What a folder delete removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderDeletion {
    pub folders: usize,
    pub assets: usize,
    pub objects: usize,
}

/// An asset whose stored object is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingObject {
    pub asset_id: i64,
    pub key: String,
}

/// Differences between asset rows and the object store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub objects_checked: usize,
    pub assets_checked: usize,
    /// Keys under `media/` that no asset references.
    pub orphaned_objects: Vec<String>,
    /// Assets that reference a key with no object behind it.
    pub missing_objects: Vec<MissingObject>,
}

impl SyncReport {
    pub fn is_consistent(&self) -> bool {
        self.orphaned_objects.is_empty() && self.missing_objects.is_empty()
    }
}

/// Service for folder and asset operations that touch the object store.
pub struct LibraryService<'a> {
    db: &'a Database,
    storage: &'a ObjectStorage,
    max_file_size: u64,
}

impl<'a> LibraryService<'a> {
    /// Create a new LibraryService.
    pub fn new(db: &'a Database, storage: &'a ObjectStorage) -> Self {
        Self {
            db,
            storage,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Create a new LibraryService with a custom max file size.
    pub fn with_max_file_size(mut self, max_size: u64) -> Self {
        self.max_file_size = max_size;
        self
    }

    /// Maximum accepted upload size in bytes.
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    fn folders(&self) -> FolderRepository<'_> {
        FolderRepository::new(self.db.pool())
    }

    fn assets(&self) -> AssetRepository<'_> {
        AssetRepository::new(self.db.pool())
    }

    // ========== Folders ==========

    /// Get a folder or fail with not found.
    pub async fn get_folder(&self, id: i64) -> Result<Folder> {
        self.folders()
            .get_by_id(id)
            .await?
            .ok_or_else(|| AssetManagerError::NotFound("folder".to_string()))
    }

    /// Load a folder referenced as a parent.
    async fn resolve_parent(&self, parent_id: i64) -> Result<Folder> {
        self.folders()
            .get_by_id(parent_id)
            .await?
            .ok_or_else(|| AssetManagerError::Validation(invalid_pk_msg(parent_id)))
    }

    /// Reject a folder name already used by a sibling other than `exclude`.
    async fn check_folder_name(
        &self,
        parent: Option<&Folder>,
        name: &str,
        exclude: Option<i64>,
    ) -> Result<()> {
        let existing = self
            .folders()
            .find_sibling_by_name(parent.map(|p| p.id), name)
            .await?;

        match existing {
            Some(other) if Some(other.id) != exclude => {
                let label = parent.map(|p| p.name.as_str()).unwrap_or(ROOT_LABEL);
                Err(AssetManagerError::Validation(duplicate_model_name_msg(
                    "Folder", name, label,
                )))
            }
            _ => Ok(()),
        }
    }

    /// Create a folder.
    pub async fn create_folder(&self, new: &NewFolder) -> Result<Folder> {
        validate_name("Folder", &new.name)?;

        let parent = match new.parent_id {
            Some(parent_id) => Some(self.resolve_parent(parent_id).await?),
            None => None,
        };
        self.check_folder_name(parent.as_ref(), &new.name, None)
            .await?;

        let folder = self.folders().create(new).await?;
        info!(
            folder_id = folder.id,
            parent_id = ?folder.parent_id,
            name = %folder.name,
            "Folder created"
        );
        Ok(folder)
    }

    /// Rename or move a folder.
    ///
    /// A folder cannot become its own parent or the child of one of its
    /// sub-folders.
    pub async fn update_folder(&self, id: i64, update: &FolderUpdate) -> Result<Folder> {
        let current = self.get_folder(id).await?;

        if let Some(ref name) = update.name {
            validate_name("Folder", name)?;
        }

        let parent = match update.parent_id {
            Some(Some(parent_id)) => {
                if parent_id == id {
                    return Err(AssetManagerError::Validation(
                        FOLDER_SET_AS_OWN_PARENT.to_string(),
                    ));
                }
                let parent = self.resolve_parent(parent_id).await?;
                let ancestors = self.folders().get_path(parent_id).await?;
                if ancestors.iter().any(|f| f.id == id) {
                    return Err(AssetManagerError::Validation(
                        DESCENDANT_SET_AS_PARENT.to_string(),
                    ));
                }
                Some(parent)
            }
            Some(None) => None,
            None => match current.parent_id {
                Some(parent_id) => Some(self.get_folder(parent_id).await?),
                None => None,
            },
        };

        let name = update.name.as_deref().unwrap_or(&current.name);
        let moved = parent.as_ref().map(|p| p.id) != current.parent_id;
        if moved || name != current.name {
            self.check_folder_name(parent.as_ref(), name, Some(id))
                .await?;
        }

        let folder = self
            .folders()
            .update(id, update)
            .await?
            .ok_or_else(|| AssetManagerError::NotFound("folder".to_string()))?;

        info!(
            folder_id = folder.id,
            parent_id = ?folder.parent_id,
            name = %folder.name,
            moved,
            "Folder updated"
        );
        Ok(folder)
    }

    /// Delete a folder, its sub-folders, their assets and every stored object.
    pub async fn delete_folder(&self, id: i64) -> Result<FolderDeletion> {
        self.get_folder(id).await?;

        let mut folder_ids = vec![id];
        folder_ids.extend(self.folders().descendant_ids(id).await?);

        let assets = self.assets().list_by_folders(&folder_ids).await?;
        let keys: Vec<String> = assets.iter().filter_map(Asset::object_key).collect();

        self.folders().delete(id).await?;

        let mut objects = 0;
        for key in &keys {
            if self.discard_object(key).await {
                objects += 1;
            }
        }

        let deletion = FolderDeletion {
            folders: folder_ids.len(),
            assets: assets.len(),
            objects,
        };
        info!(
            folder_id = id,
            folders = deletion.folders,
            assets = deletion.assets,
            objects = deletion.objects,
            "Folder deleted"
        );
        Ok(deletion)
    }

    // ========== Assets ==========

    /// Get an asset with its relations.
    pub async fn get_asset(&self, id: i64) -> Result<AssetDetails> {
        self.assets()
            .get_details(id)
            .await?
            .ok_or_else(|| AssetManagerError::NotFound("asset".to_string()))
    }

    async fn find_asset(&self, id: i64) -> Result<Asset> {
        self.assets()
            .get_by_id(id)
            .await?
            .ok_or_else(|| AssetManagerError::NotFound("asset".to_string()))
    }

    /// Reject an invalid asset name or one already used in the folder.
    async fn check_asset_name(&self, folder: &Folder, name: &str, exclude: Option<i64>) -> Result<()> {
        check_length(name, MAX_NAME_LENGTH)?;
        validate_name("Asset", name)?;

        match self.assets().find_by_name_in_folder(folder.id, name).await? {
            Some(other) if Some(other.id) != exclude => Err(AssetManagerError::Validation(
                duplicate_model_name_msg("Asset", name, &folder.name),
            )),
            _ => Ok(()),
        }
    }

    /// Reject a stored file name already attached to another asset of the folder.
    async fn check_file_name(&self, folder: &Folder, file: &str, exclude: Option<i64>) -> Result<()> {
        match self.assets().find_by_file_in_folder(folder.id, file).await? {
            Some(other) if Some(other.id) != exclude => Err(AssetManagerError::Validation(
                duplicate_file_name_msg(file, &folder.name, &other.name),
            )),
            _ => Ok(()),
        }
    }

    async fn check_relations(&self, relations: &AssetRelations) -> Result<()> {
        for relation in Relation::ALL {
            let Some(ids) = relations.get(relation) else {
                continue;
            };
            let missing = self.assets().missing_relation_ids(relation, ids).await?;
            if let Some(id) = missing.first() {
                return Err(AssetManagerError::Validation(invalid_pk_msg(*id)));
            }
        }
        Ok(())
    }

    /// Validate an upload and describe the file it will become.
    fn prepare_upload(&self, upload: &Upload) -> Result<StoredFile> {
        let name = base_file_name(&upload.file_name);
        if name.is_empty() {
            return Err(AssetManagerError::Validation(
                "No file was submitted.".to_string(),
            ));
        }
        validate_file_name(name)?;

        if upload.data.is_empty() {
            return Err(AssetManagerError::Validation(
                "The submitted file is empty.".to_string(),
            ));
        }
        if upload.data.len() as u64 > self.max_file_size {
            return Err(AssetManagerError::Validation(format!(
                "The submitted file is too large ({} bytes). The maximum size is {} bytes.",
                upload.data.len(),
                self.max_file_size
            )));
        }

        Ok(StoredFile::new(name, upload.data.len() as i64))
    }

    /// Delete an object after its row is gone. Failures are logged, not returned.
    async fn discard_object(&self, key: &str) -> bool {
        match self.storage.delete(key).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to delete stored object");
                false
            }
        }
    }

    /// Create an asset, storing its file first when one is uploaded.
    pub async fn create_asset(
        &self,
        mut new: NewAsset,
        relations: &AssetRelations,
        upload: Option<Upload>,
    ) -> Result<AssetDetails> {
        let parent_id = new
            .parent_id
            .ok_or_else(|| AssetManagerError::Validation(MISSING_PARENT.to_string()))?;
        let folder = self.resolve_parent(parent_id).await?;

        self.check_asset_name(&folder, &new.name, None).await?;
        if let Some(ref description) = new.description {
            check_length(description, MAX_DESCRIPTION_LENGTH)?;
        }
        check_metadata(&new.link, new.duration)?;
        new.creation_date = normalize_date(new.creation_date.as_deref())?;
        self.check_relations(relations).await?;

        new.file = None;
        let mut key = None;
        if let Some(upload) = upload {
            let stored = self.prepare_upload(&upload)?;
            self.check_file_name(&folder, &stored.name, None).await?;

            let object_key = asset_key(folder.id, &stored.name);
            self.storage.put(&object_key, upload.data).await?;
            key = Some(object_key);
            new.file = Some(stored);
        }

        let asset = match self.assets().create(&new).await {
            Ok(asset) => asset,
            Err(e) => {
                if let Some(ref key) = key {
                    self.discard_object(key).await;
                }
                return Err(e);
            }
        };

        if !relations.is_empty() {
            self.assets().replace_relations(asset.id, relations).await?;
        }

        info!(
            asset_id = asset.id,
            folder_id = asset.parent_id,
            key = ?key,
            "Asset created"
        );
        self.get_asset(asset.id).await
    }

    /// Update an asset.
    ///
    /// A new upload is written at the asset's (possibly new) key. Moving an
    /// asset with a file copies the object to the new folder's key. The old
    /// object is removed whenever the key changes.
    pub async fn update_asset(
        &self,
        id: i64,
        mut update: AssetUpdate,
        relations: &AssetRelations,
        upload: Option<Upload>,
    ) -> Result<AssetDetails> {
        let current = self.find_asset(id).await?;

        let folder = match update.parent_id {
            Some(parent_id) if parent_id != current.parent_id => {
                self.resolve_parent(parent_id).await?
            }
            _ => self.get_folder(current.parent_id).await?,
        };
        let moved = folder.id != current.parent_id;
        if !moved {
            update.parent_id = None;
        }

        if update.name.is_some() || moved {
            let name = update.name.as_deref().unwrap_or(&current.name);
            self.check_asset_name(&folder, name, Some(id)).await?;
        }
        if let Some(Some(ref description)) = update.description {
            check_length(description, MAX_DESCRIPTION_LENGTH)?;
        }
        if let Some(ref link) = update.link {
            check_metadata(link, None)?;
        }
        if let Some(Some(duration)) = update.duration {
            check_metadata(&None, Some(duration))?;
        }
        if let Some(ref date) = update.creation_date {
            update.creation_date = Some(normalize_date(date.as_deref())?);
        }
        self.check_relations(relations).await?;

        update.file = None;
        let stored = upload.as_ref().map(|u| self.prepare_upload(u)).transpose()?;
        let file_name = stored
            .as_ref()
            .map(|s| s.name.clone())
            .or_else(|| current.file.clone());
        if let Some(ref file_name) = file_name {
            if stored.is_some() || moved {
                self.check_file_name(&folder, file_name, Some(id)).await?;
            }
        }

        let old_key = current.object_key();
        let new_key = file_name.as_deref().map(|f| asset_key(folder.id, f));

        let mut written = None;
        match (upload, &new_key) {
            (Some(upload), Some(key)) => {
                self.storage.put(key, upload.data).await?;
                written = Some(key.clone());
            }
            (None, Some(key)) if moved => {
                if let Some(ref old) = old_key {
                    self.storage.copy(old, key).await?;
                    written = Some(key.clone());
                }
            }
            _ => {}
        }

        let uploaded = stored.is_some();
        if let Some(stored) = stored {
            update.file = Some(Some(stored));
        }

        let result = self.assets().update(id, &update).await;
        let asset = match result {
            Ok(Some(asset)) => asset,
            other => {
                // Only roll back objects written to a fresh key; an in-place
                // overwrite has already replaced the old content.
                if let Some(ref key) = written {
                    if old_key.as_ref() != Some(key) {
                        self.discard_object(key).await;
                    }
                }
                return match other {
                    Err(e) => Err(e),
                    _ => Err(AssetManagerError::NotFound("asset".to_string())),
                };
            }
        };

        if !relations.is_empty() {
            self.assets().replace_relations(id, relations).await?;
        }

        if let Some(ref old) = old_key {
            if new_key.as_ref() != Some(old) {
                self.discard_object(old).await;
            }
        }

        info!(
            asset_id = asset.id,
            folder_id = asset.parent_id,
            moved,
            uploaded,
            key = ?new_key,
            "Asset updated"
        );
        self.get_asset(id).await
    }

    /// Upload or replace the file of an asset.
    pub async fn replace_asset_file(&self, id: i64, upload: Upload) -> Result<AssetDetails> {
        self.update_asset(id, AssetUpdate::new(), &AssetRelations::new(), Some(upload))
            .await
    }

    /// Detach the file from an asset and delete the stored object.
    pub async fn remove_asset_file(&self, id: i64) -> Result<AssetDetails> {
        let current = self.find_asset(id).await?;
        let Some(key) = current.object_key() else {
            return self.get_asset(id).await;
        };

        self.assets().set_file(id, None).await?;
        self.discard_object(&key).await;

        info!(asset_id = id, key = %key, "Asset file removed");
        self.get_asset(id).await
    }

    /// Delete an asset and its stored object.
    pub async fn delete_asset(&self, id: i64) -> Result<()> {
        let current = self.find_asset(id).await?;

        self.assets().delete(id).await?;
        if let Some(key) = current.object_key() {
            self.discard_object(&key).await;
        }

        info!(asset_id = id, folder_id = current.parent_id, "Asset deleted");
        Ok(())
    }

    /// Read the stored file of an asset.
    pub async fn download_asset_file(&self, id: i64) -> Result<DownloadResult> {
        let asset = self.find_asset(id).await?;
        let key = asset
            .object_key()
            .ok_or_else(|| AssetManagerError::NotFound("file".to_string()))?;

        let content = self.storage.get(&key).await.map_err(|e| match e {
            StorageError::NotFound(_) => AssetManagerError::NotFound("file".to_string()),
            other => other.into(),
        })?;

        Ok(DownloadResult { asset, content })
    }

    /// Replace all chapters of an asset.
    pub async fn replace_chapters(
        &self,
        asset_id: i64,
        chapters: &[NewChapter],
    ) -> Result<Vec<Chapter>> {
        self.find_asset(asset_id).await?;
        check_inline_duplicates("Chapter", chapters.iter().map(|c| c.name.trim()))?;

        ChapterRepository::new(self.db.pool())
            .replace_for_asset(asset_id, chapters)
            .await
    }

    // ========== Consistency ==========

    /// Compare stored objects with asset rows.
    pub async fn sync_report(&self) -> Result<SyncReport> {
        let keys = self.storage.list(Some(MEDIA_PREFIX)).await?;
        let assets = self.assets().list_with_files().await?;

        let stored: HashSet<&str> = keys.iter().map(String::as_str).collect();
        let mut expected = HashSet::new();
        let mut missing_objects = Vec::new();

        for asset in &assets {
            if let Some(key) = asset.object_key() {
                if !stored.contains(key.as_str()) {
                    missing_objects.push(MissingObject {
                        asset_id: asset.id,
                        key: key.clone(),
                    });
                }
                expected.insert(key);
            }
        }

        let orphaned_objects = keys
            .iter()
            .filter(|key| !expected.contains(key.as_str()))
            .cloned()
            .collect();

        let report = SyncReport {
            objects_checked: keys.len(),
            assets_checked: assets.len(),
            orphaned_objects,
            missing_objects,
        };
        if !report.is_consistent() {
            warn!(
                orphaned = report.orphaned_objects.len(),
                missing = report.missing_objects.len(),
                "Object store and database are out of sync"
            );
        }
        Ok(report)
    }
}

/// Check optional link and duration values.
fn check_metadata(link: &Option<String>, duration: Option<i64>) -> Result<()> {
    if let Some(link) = link {
        let valid = url::Url::parse(link)
            .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
            .unwrap_or(false);
        if !valid {
            return Err(AssetManagerError::Validation(
                "Enter a valid URL.".to_string(),
            ));
        }
    }
    if matches!(duration, Some(d) if d < 0) {
        return Err(AssetManagerError::Validation(
            "Ensure duration is greater than or equal to 0.".to_string(),
        ));
    }
    Ok(())
}
