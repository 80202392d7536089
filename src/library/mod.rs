//! The asset library: folders, assets and their files.
//!
//! This module provides:
//! - Hierarchical folders with cycle prevention
//! - Asset metadata and relations
//! - [`LibraryService`], which keeps asset rows and stored objects in step

mod asset;
mod folder;
mod service;
pub mod validation;

pub use asset::{
    guess_filetype, Asset, AssetDetails, AssetFilter, AssetLinks, AssetRelations,
    AssetRepository, AssetStatus, AssetUpdate, InvalidStatus, NewAsset, Relation, StoredFile,
};
pub use folder::{Folder, FolderRepository, FolderUpdate, NewFolder};
pub use service::{DownloadResult, FolderDeletion, LibraryService, MissingObject, SyncReport, Upload};

/// Maximum length for folder and asset names (in characters).
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum length for descriptions (in characters).
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Default maximum upload size (100MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;
