//! HTTP error response body
//!
//! The `IntoResponse` wrapper lives in lectern-api; this crate only owns the wire shape
//! so every surface renders pipeline failures the same way.

use lectern_core::{ErrorKind, ErrorMetadata, PipelineError};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard error response format for HTTP APIs
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    pub kind: ErrorKind,
    /// Whether retrying the same request may succeed
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    /// Source chain, only outside production and never for sensitive errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn from_pipeline_error(err: &PipelineError, expose_details: bool) -> Self {
        let details = (expose_details && !err.is_sensitive()).then(|| err.detailed_message());

        Self {
            error: err.client_message(),
            code: err.error_code().to_string(),
            kind: err.kind(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action().map(String::from),
            details,
        }
    }
}
