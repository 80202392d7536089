//! Configuration module for the asset manager.

use serde::Deserialize;
use std::path::Path;

use crate::{AssetManagerError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number for the Web API.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/asset_manager.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Which object store holds asset files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// S3 or an S3-compatible service.
    S3,
    /// A directory on the local filesystem.
    Local,
    /// Process memory; contents are lost on restart.
    Memory,
}

/// Object storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Storage backend.
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    /// Bucket name (S3 backend).
    #[serde(default)]
    pub bucket: String,
    /// Region (S3 backend).
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible providers, e.g. `http://localhost:9000` for MinIO.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Root directory (local backend).
    #[serde(default = "default_local_path")]
    pub local_path: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_backend() -> StorageBackend {
    StorageBackend::Local
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_local_path() -> String {
    "data/objects".to_string()
}

fn default_max_upload_size() -> u64 {
    100
}

impl StorageConfig {
    /// Maximum upload size in bytes.
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1024 * 1024
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            bucket: String::new(),
            region: default_region(),
            endpoint: None,
            local_path: default_local_path(),
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/asset_manager.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Object storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(AssetManagerError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| AssetManagerError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `ASSET_MANAGER_S3_BUCKET`: bucket name; also selects the S3 backend
    /// - `ASSET_MANAGER_S3_ENDPOINT`: custom S3 endpoint
    /// - `ASSET_MANAGER_DATABASE_PATH`: SQLite database path
    pub fn apply_env_overrides(&mut self) {
        if let Ok(bucket) = std::env::var("ASSET_MANAGER_S3_BUCKET") {
            if !bucket.is_empty() {
                self.storage.backend = StorageBackend::S3;
                self.storage.bucket = bucket;
            }
        }

        if let Ok(endpoint) = std::env::var("ASSET_MANAGER_S3_ENDPOINT") {
            if !endpoint.is_empty() {
                self.storage.endpoint = Some(endpoint);
            }
        }

        if let Ok(path) = std::env::var("ASSET_MANAGER_DATABASE_PATH") {
            if !path.is_empty() {
                self.database.path = path;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the S3 backend is selected without a bucket
    /// - the upload limit is zero
    pub fn validate(&self) -> Result<()> {
        if self.storage.backend == StorageBackend::S3 && self.storage.bucket.is_empty() {
            return Err(AssetManagerError::Config(
                "S3 storage is selected but no bucket is set. \
                 Set storage.bucket in config.toml or ASSET_MANAGER_S3_BUCKET."
                    .to_string(),
            ));
        }

        if self.storage.max_upload_size_mb == 0 {
            return Err(AssetManagerError::Config(
                "storage.max_upload_size_mb must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
