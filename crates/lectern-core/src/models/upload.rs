use bytes::Bytes;
use std::path::PathBuf;

/// Where the uploaded video payload lives
#[derive(Debug, Clone)]
pub enum VideoSource {
    /// Payload buffered from an HTTP upload
    Bytes(Bytes),
    /// Caller-owned file on local disk (CLI); never deleted by the pipeline
    Path(PathBuf),
}

/// Immutable input of one pipeline job
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub source: VideoSource,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
}

impl UploadRequest {
    pub fn from_bytes(
        data: impl Into<Bytes>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        let data = data.into();
        Self {
            size: data.len() as u64,
            source: VideoSource::Bytes(data),
            filename: filename.into(),
            content_type: content_type.into(),
        }
    }

    pub fn from_path(
        path: impl Into<PathBuf>,
        size: u64,
        filename: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            source: VideoSource::Path(path.into()),
            filename: filename.into(),
            content_type: content_type.into(),
            size,
        }
    }

    /// Lowercased extension of the declared filename, if any
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }
}
