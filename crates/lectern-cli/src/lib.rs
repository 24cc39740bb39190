//! Helpers shared by the `lectern` command-line tool

use std::path::Path;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Video content type implied by a file's extension
pub fn content_type_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_lowercase();
    let content_type = match extension.as_str() {
        "mp4" => "video/mp4",
        "m4v" => "video/x-m4v",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        _ => return None,
    };
    Some(content_type)
}

/// Process exit code for a failed job
pub fn exit_code_for(kind: lectern_core::ErrorKind) -> i32 {
    match kind {
        lectern_core::ErrorKind::InvalidInput => 2,
        lectern_core::ErrorKind::Cancelled => 130,
        _ => 1,
    }
}

/// Initialize tracing for CLI binaries.
///
/// Logs go to stderr so stdout carries only the JSON result.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
