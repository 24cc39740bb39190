//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A successfully stored artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Backend-internal key (`{prefix}/{uuid}.{ext}`)
    pub key: String,
    /// Stable locator usable by later stages (`s3://bucket/key` or `file:///abs/path`)
    pub locator: String,
    /// Publicly reachable URL persisted on the record
    pub url: String,
    pub size_bytes: u64,
}

/// Storage abstraction trait
///
/// Uploads are append-only: every call writes a new object under a freshly generated
/// key and nothing is retried internally. Retry policy, if any, belongs to the caller.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store in-memory bytes under a new key derived from `key_prefix` and `content_type`
    async fn put(
        &self,
        data: Bytes,
        key_prefix: &str,
        content_type: &str,
    ) -> StorageResult<StoredObject>;

    /// Store a local file under a new key. The source file is left in place.
    async fn put_file(
        &self,
        path: &Path,
        key_prefix: &str,
        content_type: &str,
    ) -> StorageResult<StoredObject>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
