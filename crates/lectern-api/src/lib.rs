//! Lectern API Library
//!
//! HTTP surface of the video-to-notes pipeline: the upload handler, health check,
//! error rendering and application setup.

mod api_doc;
pub mod constants;
mod handlers;
pub mod setup;

pub mod error;
pub mod state;

// Re-exports
pub use error::HttpAppError;
pub use lectern_infra::ErrorResponse;
pub use state::AppState;
