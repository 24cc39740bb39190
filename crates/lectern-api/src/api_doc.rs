//! OpenAPI documentation, served at `/api/openapi.json`

use utoipa::OpenApi;

use crate::handlers;
use lectern_core::models;

/// Returns the OpenAPI document for the current API version
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lectern API",
        version = "0.1.0",
        description = "Turns lecture videos into study notes: audio extraction, transcription, and generated title, summary, key concepts and quiz. All endpoints are versioned under /api/v1/."
    ),
    paths(
        handlers::video_upload::upload_video,
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::PersistedVideo,
            models::KeyConcept,
            models::QuizItem,
            models::NotesResult,
            lectern_core::ErrorKind,
            handlers::video_upload::VideoNotesResponse,
            handlers::video_upload::WarningResponse,
            handlers::health::HealthCheckResponse,
            lectern_infra::ErrorResponse,
        )
    ),
    tags(
        (name = "videos", description = "Video upload and notes generation"),
        (name = "health", description = "Service health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_upload_path() {
        let spec = get_openapi_spec();
        assert!(spec.paths.paths.contains_key("/api/v1/videos"));
        assert!(spec.paths.paths.contains_key("/health"));
    }
}
