use crate::keys::generate_storage_key;
use crate::traits::{Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult};
use std::path::Path;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    /// Generate public URL for S3 object
    ///
    /// For AWS S3, uses the standard format: https://{bucket}.s3.{region}.amazonaws.com/{key}
    /// For S3-compatible providers, uses path-style URLs on the endpoint
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }

    /// Locator consumed by AWS Transcribe's `MediaFileUri`
    fn generate_locator(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }

    async fn put_bytes(&self, key: String, bytes: Bytes) -> StorageResult<StoredObject> {
        let size = bytes.len() as u64;
        let location = ObjectPath::from(key.clone());
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.put(&location, PutPayload::from(bytes)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(StoredObject {
            url: self.generate_url(&key),
            locator: self.generate_locator(&key),
            key,
            size_bytes: size,
        })
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn put(
        &self,
        data: Bytes,
        key_prefix: &str,
        content_type: &str,
    ) -> StorageResult<StoredObject> {
        let key = generate_storage_key(key_prefix, content_type)?;
        self.put_bytes(key, data).await
    }

    async fn put_file(
        &self,
        path: &Path,
        key_prefix: &str,
        content_type: &str,
    ) -> StorageResult<StoredObject> {
        let key = generate_storage_key(key_prefix, content_type)?;
        // Single PUT; artifacts are bounded by the upload size limit
        let data = tokio::fs::read(path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to read {}: {}", path.display(), e))
        })?;
        self.put_bytes(key, Bytes::from(data)).await
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_urls_and_locators() {
        let storage = S3Storage::new(
            "lectures".to_string(),
            "us-east-1".to_string(),
            None,
        )
        .await
        .unwrap();

        assert_eq!(
            storage.generate_url("audio/a.mp3"),
            "https://lectures.s3.us-east-1.amazonaws.com/audio/a.mp3"
        );
        assert_eq!(
            storage.generate_locator("audio/a.mp3"),
            "s3://lectures/audio/a.mp3"
        );
    }

    #[tokio::test]
    async fn test_custom_endpoint_uses_path_style() {
        let storage = S3Storage::new(
            "lectures".to_string(),
            "us-east-1".to_string(),
            Some("http://localhost:9000/".to_string()),
        )
        .await
        .unwrap();

        assert_eq!(
            storage.generate_url("videos/v.mp4"),
            "http://localhost:9000/lectures/videos/v.mp4"
        );
    }
}
