//! Audio extraction with ffmpeg

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("Input video {0} is not readable")]
    MissingInput(PathBuf),

    #[error("Failed to execute ffmpeg: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("FFmpeg failed ({status}): {stderr_tail}")]
    Failed { status: String, stderr_tail: String },

    #[error("FFmpeg did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("FFmpeg produced no audio output")]
    EmptyOutput,
}

/// Extracted audio track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    pub path: PathBuf,
    pub extension: String,
    pub content_type: String,
    pub size_bytes: u64,
}

impl AudioArtifact {
    /// Media format name understood by the transcription service
    pub fn media_format(&self) -> &str {
        match self.extension.as_str() {
            "m4a" => "mp4",
            other => other,
        }
    }
}

#[async_trait]
pub trait MediaTranscoder: Send + Sync {
    /// Write the audio track of `video` into `output_dir` as a new file
    async fn extract_audio(
        &self,
        video: &Path,
        output_dir: &Path,
    ) -> Result<AudioArtifact, TranscodeError>;
}

/// (file extension, content type) produced by an ffmpeg audio codec
fn codec_output(codec: &str) -> (&'static str, &'static str) {
    match codec {
        "aac" => ("m4a", "audio/mp4"),
        "pcm_s16le" => ("wav", "audio/wav"),
        "flac" => ("flac", "audio/flac"),
        "libvorbis" | "libopus" => ("ogg", "audio/ogg"),
        _ => ("mp3", "audio/mpeg"),
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    lines[lines.len().saturating_sub(5)..].join("\n")
}

pub struct FfmpegTranscoder {
    ffmpeg_path: String,
    codec: String,
    timeout: Duration,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: impl Into<String>, codec: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            codec: codec.into(),
            timeout,
        }
    }
}

#[async_trait]
impl MediaTranscoder for FfmpegTranscoder {
    #[tracing::instrument(skip(self, video, output_dir), fields(codec = %self.codec))]
    async fn extract_audio(
        &self,
        video: &Path,
        output_dir: &Path,
    ) -> Result<AudioArtifact, TranscodeError> {
        if !tokio::fs::try_exists(video).await.unwrap_or(false) {
            return Err(TranscodeError::MissingInput(video.to_path_buf()));
        }

        let (extension, content_type) = codec_output(&self.codec);
        let output_path = output_dir.join(format!("audio.{}", extension));
        let start = std::time::Instant::now();

        let child = Command::new(&self.ffmpeg_path)
            .args(["-hide_banner", "-nostdin", "-y", "-i"])
            .arg(video)
            .args(["-vn", "-acodec", &self.codec])
            .arg(&output_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(TranscodeError::Spawn)?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| TranscodeError::TimedOut(self.timeout))?
            .map_err(TranscodeError::Spawn)?;

        if !output.status.success() {
            return Err(TranscodeError::Failed {
                status: output.status.to_string(),
                stderr_tail: stderr_tail(&output.stderr),
            });
        }

        let size_bytes = tokio::fs::metadata(&output_path)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        if size_bytes == 0 {
            return Err(TranscodeError::EmptyOutput);
        }

        tracing::info!(
            size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Audio extracted"
        );

        Ok(AudioArtifact {
            path: output_path,
            extension: extension.to_string(),
            content_type: content_type.to_string(),
            size_bytes,
        })
    }
}
