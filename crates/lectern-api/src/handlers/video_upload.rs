use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use lectern_core::models::{PersistedVideo, UploadRequest};
use lectern_core::{ErrorKind, PipelineError};
use lectern_infra::ErrorResponse;
use lectern_processing::{JobOutcome, JobWarning};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use utoipa::ToSchema;
use uuid::Uuid;

/// Multipart field carrying the video
pub const VIDEO_FIELD: &str = "video";

#[derive(Debug, Serialize, ToSchema)]
pub struct WarningResponse {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<JobWarning> for WarningResponse {
    fn from(warning: JobWarning) -> Self {
        Self {
            kind: warning.kind,
            message: warning.message,
        }
    }
}

/// Persisted record plus the job's non-fatal warnings
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoNotesResponse {
    #[serde(flatten)]
    pub video: PersistedVideo,
    pub job_id: Uuid,
    pub warnings: Vec<WarningResponse>,
}

impl From<JobOutcome> for VideoNotesResponse {
    fn from(outcome: JobOutcome) -> Self {
        Self {
            video: outcome.record,
            job_id: outcome.job_id,
            warnings: outcome.warnings.into_iter().map(Into::into).collect(),
        }
    }
}

/// Pull the single `video` field out of the form. Other fields are ignored.
async fn extract_video_field(mut multipart: Multipart) -> Result<UploadRequest, HttpAppError> {
    let mut upload: Option<(Bytes, String, String)> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }
        if upload.is_some() {
            return Err(PipelineError::InvalidInput(format!(
                "Multiple video fields are not allowed; send exactly one field named '{}'",
                VIDEO_FIELD
            ))
            .into());
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await?;
        upload = Some((data, filename, content_type));
    }

    let (data, filename, content_type) = upload.ok_or_else(|| {
        PipelineError::InvalidInput(format!(
            "No video provided; send a multipart field named '{}'",
            VIDEO_FIELD
        ))
    })?;

    Ok(UploadRequest::from_bytes(data, filename, content_type))
}

#[utoipa::path(
    post,
    path = "/api/v1/videos",
    tag = "videos",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Notes generated and stored", body = VideoNotesResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 422, description = "No usable audio track", body = ErrorResponse),
        (status = 502, description = "Upstream service failed", body = ErrorResponse),
        (status = 504, description = "Transcription timed out", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<VideoNotesResponse>, HttpAppError> {
    let upload = extract_video_field(multipart).await?;
    tracing::info!(
        filename = %upload.filename,
        content_type = %upload.content_type,
        size_bytes = upload.size,
        "Video upload received"
    );

    // The job runs on its own task; dropping this handler (client gone) cancels it
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let pipeline = state.pipeline.clone();
    let job = tokio::spawn(async move { pipeline.run(upload, cancel).await });

    let outcome = job
        .await
        .map_err(|e| PipelineError::internal("Pipeline task aborted", e.into()))??;

    Ok(Json(outcome.into()))
}
