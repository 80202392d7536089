//! Asset Manager - a digital asset management backend.
//!
//! Folders form a hierarchy, assets live in folders and carry a single file
//! kept in an S3-compatible object store under `media/<folder_id>/<filename>`.
//! Tags, collections, contributors, country tags, chapters and learner
//! journeys describe the assets. Everything is exposed over a REST API.

pub mod catalog;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod library;
pub mod logging;
pub mod storage;
pub mod web;

pub use catalog::{
    Chapter, ChapterRepository, CountryTag, CountryTagRepository, LearnerJourney,
    LearnerJourneyRepository, NamedEntity, NamedKind, NamedRepository, Tag, TagRepository,
};
pub use config::Config;
pub use db::Database;
pub use error::{AssetManagerError, Result};
pub use library::{
    Asset, AssetRepository, AssetStatus, Folder, FolderRepository, LibraryService, Upload,
};
pub use storage::ObjectStorage;
pub use web::{AppState, WebServer};
