use crate::keys::generate_storage_key;
use crate::traits::{Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for stored artifacts (e.g., "./data/storage")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:4000/files")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        // Locators must be absolute so they stay valid regardless of the working directory
        let base_path = fs::canonicalize(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path with security validation
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.contains("..") || storage_key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        let path = self.base_path.join(storage_key);
        if path.strip_prefix(&self.base_path).is_err() {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }

        Ok(path)
    }

    /// Generate public URL for file
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    fn generate_locator(path: &Path) -> String {
        format!("file://{}", path.display())
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    fn stored(&self, key: String, path: &Path, size_bytes: u64) -> StoredObject {
        StoredObject {
            url: self.generate_url(&key),
            locator: Self::generate_locator(path),
            key,
            size_bytes,
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(
        &self,
        data: Bytes,
        key_prefix: &str,
        content_type: &str,
    ) -> StorageResult<StoredObject> {
        let key = generate_storage_key(key_prefix, content_type)?;
        let path = self.key_to_path(&key)?;
        let size = data.len() as u64;

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(self.stored(key, &path, size))
    }

    async fn put_file(
        &self,
        source: &Path,
        key_prefix: &str,
        content_type: &str,
    ) -> StorageResult<StoredObject> {
        let key = generate_storage_key(key_prefix, content_type)?;
        let path = self.key_to_path(&key)?;
        let start = std::time::Instant::now();

        self.ensure_parent_dir(&path).await?;

        let bytes_copied = fs::copy(source, &path).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to copy {} to {}: {}",
                source.display(),
                path.display(),
                e
            ))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage file upload successful"
        );

        Ok(self.stored(key, &path, bytes_copied))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
