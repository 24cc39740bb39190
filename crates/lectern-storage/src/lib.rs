//! Lectern Storage Library
//!
//! Storage abstraction for pipeline artifacts (extracted audio, raw video) with
//! S3 and local filesystem backends.
//!
//! # Storage key format
//!
//! Every `put` generates a fresh key `{prefix}/{uuid}.{ext}`; keys are never reused.
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use lectern_core::StorageBackend;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult, StoredObject};
