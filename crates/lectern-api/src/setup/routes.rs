//! Route configuration and setup

use crate::constants::API_PREFIX;
use crate::handlers::{health, video_upload};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use lectern_core::{Config, StorageBackend};
use lectern_infra::request_id_middleware;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::map_response_body::MapResponseBodyLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and headers around the video itself
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let body_limit = config.max_video_size_bytes() + MULTIPART_OVERHEAD_BYTES;

    let mut app = Router::new()
        .route(
            &format!("{}/videos", API_PREFIX),
            post(video_upload::upload_video),
        )
        .route("/health", get(health::health_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        );

    // Local storage URLs point back at this server
    if config.storage_backend() == StorageBackend::Local {
        app = app.nest_service("/files", ServeDir::new(config.local_storage_path()));
    }

    // Outermost first: the request ID must exist before the trace span opens
    let middleware = ServiceBuilder::new()
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // CORS needs a `Default` response body; the limit layer's body isn't one
        .layer(MapResponseBodyLayer::new(Body::new))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit));

    let app = app.layer(middleware).with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|_| anyhow::anyhow!("Invalid CORS origin: {}", o))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
