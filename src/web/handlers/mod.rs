//! API handlers.

pub mod asset;
pub mod catalog;
pub mod chapter;
pub mod folder;
pub mod journey;
pub mod storage;

pub use asset::*;
pub use catalog::*;
pub use chapter::*;
pub use folder::*;
pub use journey::*;
pub use storage::*;

use crate::library::{LibraryService, DEFAULT_MAX_FILE_SIZE};
use crate::storage::ObjectStorage;
use crate::Database;

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Database,
    /// Object store holding asset files.
    pub storage: ObjectStorage,
    /// Maximum accepted upload size in bytes.
    pub max_upload_size: u64,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: Database, storage: ObjectStorage) -> Self {
        Self {
            db,
            storage,
            max_upload_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Set the maximum upload size.
    pub fn with_max_upload_size(mut self, max_upload_size: u64) -> Self {
        self.max_upload_size = max_upload_size;
        self
    }

    /// Library service bound to this state.
    pub fn library(&self) -> LibraryService<'_> {
        LibraryService::new(&self.db, &self.storage).with_max_file_size(self.max_upload_size)
    }
}
