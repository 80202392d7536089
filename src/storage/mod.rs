//! Object storage for asset files.
//!
//! [`ObjectStorage`] wraps an [`object_store::ObjectStore`] chosen from the
//! configuration: S3 (or an S3-compatible service), a local directory, or
//! process memory for tests. Keys follow the layout in [`keys`].

pub mod keys;

pub use keys::{asset_key, folder_prefix, parse_asset_key, MEDIA_PREFIX};

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{Error as ObjectStoreError, ObjectStore, PutPayload};
use thiserror::Error;

use crate::config::{StorageBackend, StorageConfig};

/// Errors raised by the object store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("upload failed: {0}")]
    UploadFailed(String),

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("delete failed: {0}")]
    DeleteFailed(String),

    #[error("storage backend error: {0}")]
    BackendError(String),

    #[error("storage configuration error: {0}")]
    ConfigError(String),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Handle to the object store holding asset files.
#[derive(Clone)]
pub struct ObjectStorage {
    store: Arc<dyn ObjectStore>,
    backend: StorageBackend,
    /// Bucket name or directory, used in log fields.
    location: String,
}

impl ObjectStorage {
    /// Build the store described by the configuration.
    pub fn from_config(config: &StorageConfig) -> StorageResult<Self> {
        match config.backend {
            StorageBackend::S3 => {
                Self::s3(&config.bucket, &config.region, config.endpoint.as_deref())
            }
            StorageBackend::Local => Self::local(&config.local_path),
            StorageBackend::Memory => Ok(Self::in_memory()),
        }
    }

    /// S3 or an S3-compatible service.
    ///
    /// Credentials come from the usual `AWS_*` environment variables. A custom
    /// endpoint such as `http://localhost:9000` targets MinIO and friends.
    pub fn s3(bucket: &str, region: &str, endpoint: Option<&str>) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket);

        if let Some(endpoint) = endpoint {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(allow_http)
                .with_virtual_hosted_style_request(false);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        tracing::info!(bucket = %bucket, region = %region, "Using S3 object storage");

        Ok(Self {
            store: Arc::new(store),
            backend: StorageBackend::S3,
            location: bucket.to_string(),
        })
    }

    /// A directory on the local filesystem. The directory is created if needed.
    pub fn local(root: impl AsRef<std::path::Path>) -> StorageResult<Self> {
        let root = root.as_ref();
        std::fs::create_dir_all(root).map_err(|e| StorageError::ConfigError(e.to_string()))?;

        let store = LocalFileSystem::new_with_prefix(root)
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        tracing::info!(path = %root.display(), "Using local object storage");

        Ok(Self {
            store: Arc::new(store),
            backend: StorageBackend::Local,
            location: root.display().to_string(),
        })
    }

    /// Process-local store; contents vanish with the process.
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(InMemory::new()),
            backend: StorageBackend::Memory,
            location: "memory".to_string(),
        }
    }

    /// The backend in use.
    pub fn backend(&self) -> StorageBackend {
        self.backend
    }

    /// Write an object, replacing any existing object at the key.
    pub async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        let start = Instant::now();
        let size = data.len();
        let location = Path::from(key);

        self.store
            .put(&location, PutPayload::from(data))
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    store = %self.location,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Object upload failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        tracing::info!(
            store = %self.location,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object uploaded"
        );

        Ok(())
    }

    /// Read an object into memory.
    pub async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let start = Instant::now();
        let location = Path::from(key);

        let result = self.store.get(&location).await.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    store = %self.location,
                    key = %key,
                    "Object download failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::debug!(
            store = %self.location,
            key = %key,
            size_bytes = bytes.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object downloaded"
        );

        Ok(bytes)
    }

    /// Delete an object. Deleting a missing key succeeds.
    pub async fn delete(&self, key: &str) -> StorageResult<()> {
        let location = Path::from(key);

        match self.store.delete(&location).await {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => {
                tracing::info!(store = %self.location, key = %key, "Object deleted");
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    store = %self.location,
                    key = %key,
                    "Object delete failed"
                );
                Err(StorageError::DeleteFailed(e.to_string()))
            }
        }
    }

    /// Copy an object to a new key, replacing the destination.
    pub async fn copy(&self, from: &str, to: &str) -> StorageResult<()> {
        let start = Instant::now();

        self.store
            .copy(&Path::from(from), &Path::from(to))
            .await
            .map_err(|e| match e {
                ObjectStoreError::NotFound { .. } => StorageError::NotFound(from.to_string()),
                other => StorageError::BackendError(other.to_string()),
            })?;

        tracing::info!(
            store = %self.location,
            from_key = %from,
            to_key = %to,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object copied"
        );

        Ok(())
    }

    /// Whether an object exists at the key.
    pub async fn exists(&self, key: &str) -> StorageResult<bool> {
        match self.store.head(&Path::from(key)).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    /// List object keys under an optional prefix, sorted.
    pub async fn list(&self, prefix: Option<&str>) -> StorageResult<Vec<String>> {
        let prefix = prefix.map(Path::from);

        let objects: Vec<_> = self
            .store
            .list(prefix.as_ref())
            .try_collect()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        let mut keys: Vec<String> = objects
            .into_iter()
            .map(|meta| meta.location.to_string())
            .collect();
        keys.sort();
        Ok(keys)
    }
}

impl std::fmt::Debug for ObjectStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStorage")
            .field("backend", &self.backend)
            .field("location", &self.location)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let storage = ObjectStorage::in_memory();
        storage
            .put("media/1/a.txt", Bytes::from_static(b"hello"))
            .await
            .unwrap();

        let data = storage.get("media/1/a.txt").await.unwrap();
        assert_eq!(&data[..], b"hello");
        assert!(storage.exists("media/1/a.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_get_missing() {
        let storage = ObjectStorage::in_memory();
        let result = storage.get("media/1/missing.txt").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let storage = ObjectStorage::in_memory();
        storage
            .put("media/1/a.txt", Bytes::from_static(b"x"))
            .await
            .unwrap();

        storage.delete("media/1/a.txt").await.unwrap();
        storage.delete("media/1/a.txt").await.unwrap();
        assert!(!storage.exists("media/1/a.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_copy() {
        let storage = ObjectStorage::in_memory();
        storage
            .put("media/1/a.txt", Bytes::from_static(b"x"))
            .await
            .unwrap();

        storage.copy("media/1/a.txt", "media/2/a.txt").await.unwrap();

        assert_eq!(
            storage.list(None).await.unwrap(),
            vec!["media/1/a.txt", "media/2/a.txt"]
        );
    }

    #[tokio::test]
    async fn test_list_with_prefix() {
        let storage = ObjectStorage::in_memory();
        for key in ["media/1/b.txt", "media/1/a.txt", "media/10/c.txt"] {
            storage.put(key, Bytes::from_static(b"x")).await.unwrap();
        }

        let keys = storage.list(Some(&folder_prefix(1))).await.unwrap();
        assert_eq!(keys, vec!["media/1/a.txt", "media/1/b.txt"]);
    }

    #[tokio::test]
    async fn test_local_backend() {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = ObjectStorage::local(dir.path().join("objects")).unwrap();
        assert_eq!(storage.backend(), StorageBackend::Local);

        storage
            .put("media/3/clip.mp4", Bytes::from_static(b"frames"))
            .await
            .unwrap();
        assert!(dir.path().join("objects/media/3/clip.mp4").exists());

        storage.delete("media/3/clip.mp4").await.unwrap();
        storage.delete("media/3/clip.mp4").await.unwrap();
        assert!(storage.list(None).await.unwrap().is_empty());
    }

    #[test]
    fn test_from_config_memory() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            ..Default::default()
        };
        let storage = ObjectStorage::from_config(&config).unwrap();
        assert_eq!(storage.backend(), StorageBackend::Memory);
    }
}
