//! Catalog metadata attached to assets.
//!
//! - Tags and tag groups
//! - Collections and contributors
//! - Country tags
//! - Chapters within an asset
//! - Learner journeys (ordered asset lists)

mod chapter;
mod country;
mod journey;
mod named;
mod tag;

pub use chapter::{Chapter, ChapterRepository, ChapterUpdate, NewChapter};
pub use country::{CountryTag, CountryTagRepository, CountryTagUpdate, NewCountryTag};
pub use journey::{JourneyUpdate, LearnerJourney, LearnerJourneyRepository, NewJourney};
pub use named::{NamedEntity, NamedKind, NamedRepository};
pub use tag::{NewTag, Tag, TagRepository, TagUpdate};

use crate::AssetManagerError;

/// Message for a reference to a row that does not exist.
pub fn invalid_pk_msg(id: i64) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

/// Turn a uniqueness violation into a readable conflict; other errors pass through.
pub(crate) fn map_unique(err: sqlx::Error, message: impl FnOnce() -> String) -> AssetManagerError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return AssetManagerError::Conflict(message());
        }
    }
    err.into()
}
