//! Lectern Core Library
//!
//! This crate provides the domain models, error taxonomy and configuration shared
//! by every Lectern component.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, GenerationProvider, LecternConfig, TranscriptionProvider};
pub use error::{ErrorKind, ErrorMetadata, LogLevel, PipelineError};
pub use storage_types::StorageBackend;
