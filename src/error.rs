//! Error types for the asset manager.

use thiserror::Error;

use crate::storage::StorageError;

/// Common error type for the asset manager.
#[derive(Error, Debug)]
pub enum AssetManagerError {
    /// Database error.
    ///
    /// Wraps any sqlx error that is not a uniqueness violation.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input.
    ///
    /// The message is shown to the user as-is.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Uniqueness constraint violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Object store error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl AssetManagerError {
    /// The user-facing message without the category prefix.
    pub fn message(&self) -> String {
        match self {
            AssetManagerError::Validation(msg)
            | AssetManagerError::Conflict(msg)
            | AssetManagerError::Config(msg)
            | AssetManagerError::Database(msg)
            | AssetManagerError::DatabaseConnection(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

// Unique-constraint violations surface as conflicts, everything else as a
// plain database error.
impl From<sqlx::Error> for AssetManagerError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() {
                return AssetManagerError::Conflict(db_err.message().to_string());
            }
        }
        AssetManagerError::Database(e.to_string())
    }
}

/// Result type alias for asset manager operations.
pub type Result<T> = std::result::Result<T, AssetManagerError>;
