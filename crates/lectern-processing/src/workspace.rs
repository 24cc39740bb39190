//! Per-job scratch directory
//!
//! Every intermediate file of a job lives under one directory owned by a
//! `JobWorkspace`. The directory is removed by `close()` on the normal path and by
//! `Drop` when the job future is cancelled or unwinds.

use anyhow::{Context, Result};
use lectern_core::models::{UploadRequest, VideoSource};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use uuid::Uuid;

#[derive(Debug)]
pub struct JobWorkspace {
    dir: TempDir,
    job_id: Uuid,
}

impl JobWorkspace {
    /// Create the workspace under `root`, or the system temp directory when unset
    pub fn create(root: Option<&Path>, job_id: Uuid) -> Result<Self> {
        let prefix = format!("lectern-job-{}-", job_id);
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);

        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root)
                    .with_context(|| format!("Failed to create work dir {}", root.display()))?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
        .context("Failed to create job workspace")?;

        tracing::debug!(job_id = %job_id, path = %dir.path().display(), "Created job workspace");
        Ok(Self { dir, job_id })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn video_path(&self, extension: &str) -> PathBuf {
        self.dir.path().join(format!("video.{}", extension))
    }

    /// Make the uploaded payload available as a local file.
    ///
    /// Buffered uploads are written into the workspace. Caller-owned files are used
    /// in place and never deleted.
    pub async fn stage_video(&self, request: &UploadRequest) -> Result<PathBuf> {
        match &request.source {
            VideoSource::Bytes(data) => {
                let extension = request.extension().unwrap_or_else(|| "bin".to_string());
                let path = self.video_path(&extension);
                tokio::fs::write(&path, data)
                    .await
                    .context("Failed to write uploaded video to workspace")?;
                Ok(path)
            }
            VideoSource::Path(path) => {
                if !tokio::fs::try_exists(path).await.unwrap_or(false) {
                    anyhow::bail!("Source video {} does not exist", path.display());
                }
                Ok(path.clone())
            }
        }
    }

    /// Remove the directory and report failures
    pub fn close(self) -> Result<()> {
        let job_id = self.job_id;
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .with_context(|| format!("Failed to remove job workspace {}", path.display()))?;
        tracing::debug!(job_id = %job_id, "Removed job workspace");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stage_bytes_then_close_removes_everything() {
        let root = tempfile::tempdir().unwrap();
        let workspace = JobWorkspace::create(Some(root.path()), Uuid::new_v4()).unwrap();
        let request = UploadRequest::from_bytes(b"fake video".to_vec(), "Lecture 1.MP4", "video/mp4");

        let staged = workspace.stage_video(&request).await.unwrap();
        assert_eq!(staged.file_name().unwrap(), "video.mp4");
        assert_eq!(std::fs::read(&staged).unwrap(), b"fake video");

        let dir = workspace.path().to_path_buf();
        workspace.close().unwrap();
        assert!(!dir.exists());
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_caller_owned_path_survives() {
        let source_dir = tempfile::tempdir().unwrap();
        let source = source_dir.path().join("lecture.mp4");
        std::fs::write(&source, b"video").unwrap();

        let workspace = JobWorkspace::create(None, Uuid::new_v4()).unwrap();
        let request = UploadRequest::from_path(&source, 5, "lecture.mp4", "video/mp4");
        let staged = workspace.stage_video(&request).await.unwrap();
        assert_eq!(staged, source);

        workspace.close().unwrap();
        assert!(source.exists());
    }

    #[test]
    fn test_drop_removes_directory() {
        let workspace = JobWorkspace::create(None, Uuid::new_v4()).unwrap();
        let dir = workspace.path().to_path_buf();
        std::fs::write(dir.join("audio.mp3"), b"x").unwrap();
        drop(workspace);
        assert!(!dir.exists());
    }
}
