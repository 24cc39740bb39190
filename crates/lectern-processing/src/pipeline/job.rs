use lectern_core::models::{PersistedVideo, UploadRequest};
use lectern_core::ErrorKind;
use lectern_plugins::JobHandle;
use lectern_storage::StoredObject;
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

use crate::notes::NotesOutcome;
use crate::transcoder::AudioArtifact;

/// Non-fatal condition recorded while a job ran
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobWarning {
    pub kind: ErrorKind,
    pub message: String,
}

impl JobWarning {
    pub fn notes_degraded() -> Self {
        Self {
            kind: ErrorKind::NotesGenerationDegraded,
            message: "Notes generation failed; placeholder notes were stored".to_string(),
        }
    }
}

/// Working record of one job, mutated only by the orchestrator
#[derive(Debug)]
pub struct PipelineJob {
    pub id: Uuid,
    pub original_filename: String,
    pub video_path: Option<PathBuf>,
    pub audio: Option<AudioArtifact>,
    pub audio_object: Option<StoredObject>,
    pub video_object: Option<StoredObject>,
    pub transcription_job: Option<JobHandle>,
    pub raw_transcript: Option<String>,
    pub cleaned_transcript: Option<String>,
    pub notes: Option<NotesOutcome>,
    pub warnings: Vec<JobWarning>,
}

impl PipelineJob {
    pub fn new(id: Uuid, request: &UploadRequest) -> Self {
        Self {
            id,
            original_filename: request.filename.clone(),
            video_path: None,
            audio: None,
            audio_object: None,
            video_object: None,
            transcription_job: None,
            raw_transcript: None,
            cleaned_transcript: None,
            notes: None,
            warnings: Vec::new(),
        }
    }

    /// Cleaned transcript, or the raw one when cleanup was skipped
    pub fn transcript(&self) -> Option<&str> {
        self.cleaned_transcript
            .as_deref()
            .or(self.raw_transcript.as_deref())
    }
}

/// Result of a job that reached persistence
#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    pub job_id: Uuid,
    pub record: PersistedVideo,
    pub warnings: Vec<JobWarning>,
}
