use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use lectern_core::models::{NewVideo, PersistedVideo, VideoSummary};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::video::VideoRepository;

/// Process-local repository used when no DATABASE_URL is configured
#[derive(Clone, Default)]
pub struct InMemoryVideoRepository {
    videos: Arc<Mutex<HashMap<Uuid, PersistedVideo>>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.videos.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.videos.lock().await.is_empty()
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn create(&self, video: NewVideo) -> Result<PersistedVideo> {
        let record = PersistedVideo::from_new(Uuid::new_v4(), Utc::now(), video);
        self.videos.lock().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<PersistedVideo>> {
        Ok(self.videos.lock().await.get(&id).cloned())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<VideoSummary>> {
        let videos = self.videos.lock().await;
        let mut summaries: Vec<VideoSummary> = videos.values().map(VideoSummary::from).collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summaries.truncate(limit.max(0) as usize);
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_core::models::{KeyConcept, NotesResult, QuizItem};

    fn new_video(title: &str) -> NewVideo {
        NewVideo {
            original_filename: "lecture.mp4".to_string(),
            notes: NotesResult {
                title: title.to_string(),
                summary: "Summary".to_string(),
                key_concepts: vec![KeyConcept {
                    topic: "Entropy".to_string(),
                    definition: "Disorder".to_string(),
                }],
                quiz: vec![QuizItem {
                    question: "Q?".to_string(),
                    options: vec!["A".to_string(), "B".to_string()],
                    answer: "A".to_string(),
                }],
            },
            notes_degraded: false,
            transcript: "Today we cover entropy.".to_string(),
            video_url: None,
            audio_url: "https://bucket.s3.us-east-1.amazonaws.com/audio/a.mp3".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_round_trips() {
        let repo = InMemoryVideoRepository::new();
        let created = repo.create(new_video("Thermodynamics")).await.unwrap();

        let fetched = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.title, "Thermodynamics");
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_list_recent_respects_limit() {
        let repo = InMemoryVideoRepository::new();
        for i in 0..3 {
            repo.create(new_video(&format!("Lecture {}", i))).await.unwrap();
        }

        assert_eq!(repo.list_recent(2).await.unwrap().len(), 2);
        assert_eq!(repo.list_recent(10).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let repo = InMemoryVideoRepository::new();
        assert!(repo.get(Uuid::new_v4()).await.unwrap().is_none());
    }
}
