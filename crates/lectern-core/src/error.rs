//! Error types module
//!
//! `PipelineError` is the single error a pipeline job terminates with. Each variant maps
//! onto one `ErrorKind` of the caller-facing taxonomy. Stage adapters report
//! `anyhow` errors which the orchestrator wraps at the stage boundary, so the source
//! chain stays available for logs while clients only ever see `client_message()`.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues and upstream failures
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "TRANSCRIPTION_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same request may succeed
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message. Never contains paths, storage keys or credentials.
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Caller-facing error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ErrorKind {
    InvalidInput,
    TranscodeError,
    StorageUploadError,
    TranscriptionFailed,
    TranscriptionTimedOut,
    TranscriptFetchError,
    /// Warning only: the fallback notes were used and the job still completed
    NotesGenerationDegraded,
    PersistenceError,
    Cancelled,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::TranscodeError => "TranscodeError",
            ErrorKind::StorageUploadError => "StorageUploadError",
            ErrorKind::TranscriptionFailed => "TranscriptionFailed",
            ErrorKind::TranscriptionTimedOut => "TranscriptionTimedOut",
            ErrorKind::TranscriptFetchError => "TranscriptFetchError",
            ErrorKind::NotesGenerationDegraded => "NotesGenerationDegraded",
            ErrorKind::PersistenceError => "PersistenceError",
            ErrorKind::Cancelled => "Cancelled",
            ErrorKind::Internal => "Internal",
        }
    }

    /// Whether a job reporting this kind is aborted
    pub fn aborts_job(&self) -> bool {
        !matches!(self, ErrorKind::NotesGenerationDegraded)
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Audio extraction failed")]
    Transcode(#[source] anyhow::Error),

    #[error("Failed to upload {artifact}")]
    StorageUpload {
        artifact: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("Transcription failed: {reason}")]
    TranscriptionFailed { reason: String },

    #[error("Transcription did not finish after {polls} status checks")]
    TranscriptionTimedOut { polls: u32, waited_secs: u64 },

    #[error("Transcript fetch failed after {attempts} attempt(s)")]
    TranscriptFetch {
        attempts: u32,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to persist notes")]
    Persistence(#[source] anyhow::Error),

    #[error("Job was cancelled")]
    Cancelled,

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// (http status, error code, recoverable, suggested action, sensitive, log level)
fn pipeline_error_static_metadata(
    err: &PipelineError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        PipelineError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Upload a video file within the size limit"),
            false,
            LogLevel::Debug,
        ),
        PipelineError::Transcode(_) => (
            422,
            "TRANSCODE_ERROR",
            false,
            Some("Check that the video has an audio track and is not corrupted"),
            true,
            LogLevel::Warn,
        ),
        PipelineError::StorageUpload { .. } => (
            502,
            "STORAGE_UPLOAD_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        PipelineError::TranscriptionFailed { .. } => (
            502,
            "TRANSCRIPTION_FAILED",
            false,
            Some("Check the audio quality of the video and try again"),
            false,
            LogLevel::Warn,
        ),
        PipelineError::TranscriptionTimedOut { .. } => (
            504,
            "TRANSCRIPTION_TIMED_OUT",
            true,
            Some("Retry later or upload a shorter video"),
            false,
            LogLevel::Warn,
        ),
        PipelineError::TranscriptFetch { .. } => (
            502,
            "TRANSCRIPT_FETCH_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        PipelineError::Persistence(_) => (
            500,
            "PERSISTENCE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        PipelineError::Cancelled => (499, "CANCELLED", true, None, false, LogLevel::Debug),
        PipelineError::Internal { .. } => (
            500,
            "INTERNAL_ERROR",
            false,
            Some("Contact support if this error persists"),
            true,
            LogLevel::Error,
        ),
    }
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InvalidInput(_) => ErrorKind::InvalidInput,
            PipelineError::Transcode(_) => ErrorKind::TranscodeError,
            PipelineError::StorageUpload { .. } => ErrorKind::StorageUploadError,
            PipelineError::TranscriptionFailed { .. } => ErrorKind::TranscriptionFailed,
            PipelineError::TranscriptionTimedOut { .. } => ErrorKind::TranscriptionTimedOut,
            PipelineError::TranscriptFetch { .. } => ErrorKind::TranscriptFetchError,
            PipelineError::Persistence(_) => ErrorKind::PersistenceError,
            PipelineError::Cancelled => ErrorKind::Cancelled,
            PipelineError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Shorthand for wrapping a workspace or plumbing failure
    pub fn internal(message: impl Into<String>, source: anyhow::Error) -> Self {
        PipelineError::Internal {
            message: message.into(),
            source,
        }
    }

    /// Get detailed error information including the source chain (for logs only)
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for PipelineError {
    fn http_status_code(&self) -> u16 {
        pipeline_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        pipeline_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        pipeline_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        pipeline_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        pipeline_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        pipeline_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            PipelineError::InvalidInput(ref msg) => msg.clone(),
            PipelineError::Transcode(_) => {
                "Could not extract an audio track from the uploaded video".to_string()
            }
            PipelineError::StorageUpload { artifact, .. } => {
                format!("Failed to store the {}", artifact)
            }
            PipelineError::TranscriptionFailed { ref reason } => {
                format!("Transcription failed: {}", reason)
            }
            PipelineError::TranscriptionTimedOut { waited_secs, .. } => format!(
                "Transcription did not finish within {} seconds",
                waited_secs
            ),
            PipelineError::TranscriptFetch { attempts, .. } => format!(
                "Failed to retrieve the transcript after {} attempt(s)",
                attempts
            ),
            PipelineError::Persistence(_) => "Failed to save the generated notes".to_string(),
            PipelineError::Cancelled => "Processing was cancelled".to_string(),
            PipelineError::Internal { .. } => "Internal server error".to_string(),
        }
    }
}
