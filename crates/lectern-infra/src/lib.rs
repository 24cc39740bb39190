//! Lectern Infrastructure Library
//!
//! Shared plumbing for the Lectern binaries:
//! - Telemetry initialization (tracing subscriber)
//! - Request ID middleware
//! - The JSON error body returned by the HTTP surface

pub mod error;
pub mod middleware;
pub mod telemetry;

// Re-export commonly used types
pub use error::ErrorResponse;
pub use middleware::{get_request_id, request_id_middleware, RequestId, REQUEST_ID_HEADER};
pub use telemetry::{init_telemetry, shutdown_telemetry, LogFormat};
