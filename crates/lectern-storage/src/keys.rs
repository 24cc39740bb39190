//! Shared key generation for storage backends.
//!
//! Key format: `{prefix}/{uuid-v4}.{ext}` where the extension is derived from the
//! content type.

use crate::{StorageError, StorageResult};
use uuid::Uuid;

/// Map a MIME type onto the file extension used in storage keys
pub fn extension_for_content_type(content_type: &str) -> &'static str {
    let normalized = content_type
        .split(';')
        .next()
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_default();

    match normalized.as_str() {
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/wav" | "audio/wave" | "audio/x-wav" => "wav",
        "audio/ogg" => "ogg",
        "audio/flac" => "flac",
        "audio/mp4" | "audio/x-m4a" => "m4a",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "video/quicktime" => "mov",
        "video/x-msvideo" => "avi",
        "video/x-matroska" => "mkv",
        "video/x-m4v" => "m4v",
        "application/json" => "json",
        _ => "bin",
    }
}

/// Generate a fresh storage key under `prefix`.
///
/// Every call returns a different key. All backends must use this format for consistency.
pub fn generate_storage_key(prefix: &str, content_type: &str) -> StorageResult<String> {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() || prefix.contains("..") || prefix.contains('\\') {
        return Err(StorageError::InvalidKey(format!(
            "Invalid key prefix: {:?}",
            prefix
        )));
    }

    Ok(format!(
        "{}/{}.{}",
        prefix,
        Uuid::new_v4(),
        extension_for_content_type(content_type)
    ))
}
