//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`. Pipeline failures and request-shape
//! problems both end up as a `PipelineError` so every error renders the same body.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lectern_core::{ErrorMetadata, LogLevel, PipelineError};
use lectern_infra::ErrorResponse;

static CACHED_IS_PRODUCTION: std::sync::LazyLock<bool> = std::sync::LazyLock::new(|| {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
});

/// Wrapper type for PipelineError to implement IntoResponse
#[derive(Debug)]
pub struct HttpAppError(pub PipelineError);

impl From<PipelineError> for HttpAppError {
    fn from(err: PipelineError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(PipelineError::internal("Request failed", err))
    }
}

impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        HttpAppError(PipelineError::InvalidInput(format!(
            "Failed to read multipart body: {}",
            err.body_text()
        )))
    }
}

fn log_error(error: &PipelineError) {
    let kind = error.kind();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, kind = %kind, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, kind = %kind, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error.detailed_message(), kind = %kind, "Request failed");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let error = &self.0;

        let status = StatusCode::from_u16(error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(error);

        // Details are hidden in production and for sensitive errors
        let body = ErrorResponse::from_pipeline_error(error, !*CACHED_IS_PRODUCTION);

        (status, Json(body)).into_response()
    }
}
