use lectern_core::models::UploadRequest;
use lectern_core::{Config, PipelineError};
use std::path::Path;

/// Rejections raised before a job touches disk or network
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Content type {content_type} does not match extension '{extension}'")]
    ContentTypeMismatch {
        content_type: String,
        extension: String,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty file")]
    EmptyFile,
}

impl From<ValidationError> for PipelineError {
    fn from(err: ValidationError) -> Self {
        PipelineError::InvalidInput(err.to_string())
    }
}

/// Upload validator for video payloads
pub struct MediaValidator {
    max_file_size: u64,
    allowed_extensions: Vec<String>,
    allowed_content_types: Vec<String>,
}

/// "video/mp4; codecs=avc1" -> "video/mp4"
fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_lowercase()
}

fn extension_of(filename: &str) -> Result<String, ValidationError> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| ValidationError::InvalidFilename(filename.to_string()))
}

impl MediaValidator {
    pub fn new(
        max_file_size: u64,
        allowed_extensions: Vec<String>,
        allowed_content_types: Vec<String>,
    ) -> Self {
        Self {
            max_file_size,
            allowed_extensions,
            allowed_content_types,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.max_video_size_bytes() as u64,
            config.video_allowed_extensions().to_vec(),
            config.video_allowed_content_types().to_vec(),
        )
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub fn validate_file_size(&self, size: u64) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    pub fn validate_extension(&self, filename: &str) -> Result<(), ValidationError> {
        let extension = extension_of(filename)?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(())
    }

    /// Content type must be `video/*` and on the allow-list
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        let normalized = normalize_content_type(content_type);

        if !normalized.starts_with("video/")
            || !self.allowed_content_types.iter().any(|ct| ct == &normalized)
        {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    /// Reject payloads whose declared type disagrees with the filename
    pub fn validate_extension_content_type_match(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<(), ValidationError> {
        let extension = extension_of(filename)?;
        let normalized = normalize_content_type(content_type);

        let expected: &[&str] = match extension.as_str() {
            "mp4" => &["video/mp4"],
            "m4v" => &["video/x-m4v", "video/mp4"],
            "webm" => &["video/webm"],
            "mov" => &["video/quicktime"],
            "avi" => &["video/x-msvideo", "video/avi"],
            "mkv" => &["video/x-matroska"],
            _ => {
                tracing::debug!(
                    extension = %extension,
                    content_type = %content_type,
                    "Unknown extension, skipping Content-Type/extension cross-validation"
                );
                return Ok(());
            }
        };

        if !expected.iter().any(|ct| *ct == normalized) {
            return Err(ValidationError::ContentTypeMismatch {
                content_type: content_type.to_string(),
                extension,
            });
        }

        Ok(())
    }

    pub fn validate_all(
        &self,
        filename: &str,
        content_type: &str,
        file_size: u64,
    ) -> Result<(), ValidationError> {
        self.validate_file_size(file_size)?;
        self.validate_extension(filename)?;
        self.validate_content_type(content_type)?;
        self.validate_extension_content_type_match(filename, content_type)?;
        Ok(())
    }

    pub fn validate(&self, request: &UploadRequest) -> Result<(), ValidationError> {
        self.validate_all(&request.filename, &request.content_type, request.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_validator() -> MediaValidator {
        MediaValidator::new(
            1024 * 1024,
            vec!["mp4".to_string(), "webm".to_string(), "mov".to_string()],
            vec![
                "video/mp4".to_string(),
                "video/webm".to_string(),
                "video/quicktime".to_string(),
                "audio/mpeg".to_string(),
            ],
        )
    }

    #[test]
    fn test_validate_file_size() {
        let validator = test_validator();
        assert!(validator.validate_file_size(512 * 1024).is_ok());
        assert!(matches!(
            validator.validate_file_size(2 * 1024 * 1024),
            Err(ValidationError::FileTooLarge { .. })
        ));
        assert!(matches!(
            validator.validate_file_size(0),
            Err(ValidationError::EmptyFile)
        ));
    }

    #[test]
    fn test_validate_extension() {
        let validator = test_validator();
        assert!(validator.validate_extension("lecture.MP4").is_ok());
        assert!(validator.validate_extension("lecture.mp3").is_err());
        assert!(matches!(
            validator.validate_extension("lecture"),
            Err(ValidationError::InvalidFilename(_))
        ));
    }

    #[test]
    fn test_content_type_must_be_video() {
        let validator = test_validator();
        assert!(validator.validate_content_type("video/mp4").is_ok());
        assert!(validator.validate_content_type("VIDEO/WEBM").is_ok());
        assert!(validator
            .validate_content_type("video/mp4; codecs=avc1")
            .is_ok());
        // Allow-listed but not a video
        assert!(validator.validate_content_type("audio/mpeg").is_err());
        assert!(validator.validate_content_type("video/x-flv").is_err());
    }

    #[test]
    fn test_extension_must_match_content_type() {
        let validator = test_validator();
        assert!(validator
            .validate_extension_content_type_match("a.mov", "video/quicktime")
            .is_ok());
        assert!(matches!(
            validator.validate_extension_content_type_match("a.mp4", "video/webm"),
            Err(ValidationError::ContentTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_request() {
        let validator = test_validator();
        let ok = UploadRequest::from_bytes(vec![0u8; 64], "lecture.mp4", "video/mp4");
        assert!(validator.validate(&ok).is_ok());

        let spoofed = UploadRequest::from_bytes(vec![0u8; 64], "notes.pdf", "video/mp4");
        let err: PipelineError = validator.validate(&spoofed).unwrap_err().into();
        assert_eq!(err.kind(), lectern_core::ErrorKind::InvalidInput);
    }
}
