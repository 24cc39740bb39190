use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::notes::{KeyConcept, NotesResult, QuizItem};

/// Record handed to the document store once a job has completed
#[derive(Debug, Clone, PartialEq)]
pub struct NewVideo {
    pub original_filename: String,
    pub notes: NotesResult,
    pub notes_degraded: bool,
    pub transcript: String,
    pub video_url: Option<String>,
    pub audio_url: String,
}

/// Durable study-notes record. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersistedVideo {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub key_concepts: Vec<KeyConcept>,
    pub quiz: Vec<QuizItem>,
    pub transcript: String,
    pub original_filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub audio_url: String,
    /// True when the deterministic fallback notes were stored
    pub notes_degraded: bool,
    pub created_at: DateTime<Utc>,
}

impl PersistedVideo {
    pub fn from_new(id: Uuid, created_at: DateTime<Utc>, video: NewVideo) -> Self {
        Self {
            id,
            title: video.notes.title,
            summary: video.notes.summary,
            key_concepts: video.notes.key_concepts,
            quiz: video.notes.quiz,
            transcript: video.transcript,
            original_filename: video.original_filename,
            video_url: video.video_url,
            audio_url: video.audio_url,
            notes_degraded: video.notes_degraded,
            created_at,
        }
    }

    pub fn notes(&self) -> NotesResult {
        NotesResult {
            title: self.title.clone(),
            summary: self.summary.clone(),
            key_concepts: self.key_concepts.clone(),
            quiz: self.quiz.clone(),
        }
    }
}

/// Listing row for recent records
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    pub id: Uuid,
    pub title: String,
    pub original_filename: String,
    pub notes_degraded: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&PersistedVideo> for VideoSummary {
    fn from(video: &PersistedVideo) -> Self {
        Self {
            id: video.id,
            title: video.title.clone(),
            original_filename: video.original_filename.clone(),
            notes_degraded: video.notes_degraded,
            created_at: video.created_at,
        }
    }
}
