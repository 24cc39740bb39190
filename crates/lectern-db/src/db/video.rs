use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lectern_core::models::{KeyConcept, NewVideo, PersistedVideo, QuizItem, VideoSummary};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Append-only document store for processed videos
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Persist a completed job and return the stored record with its id
    async fn create(&self, video: NewVideo) -> Result<PersistedVideo>;

    async fn get(&self, id: Uuid) -> Result<Option<PersistedVideo>>;

    /// Most recent records first
    async fn list_recent(&self, limit: i64) -> Result<Vec<VideoSummary>>;
}

#[derive(sqlx::FromRow)]
struct VideoRow {
    id: Uuid,
    title: String,
    summary: String,
    key_concepts: Json<Vec<KeyConcept>>,
    quiz: Json<Vec<QuizItem>>,
    transcript: String,
    original_filename: String,
    video_url: Option<String>,
    audio_url: String,
    notes_degraded: bool,
    created_at: DateTime<Utc>,
}

impl From<VideoRow> for PersistedVideo {
    fn from(row: VideoRow) -> Self {
        PersistedVideo {
            id: row.id,
            title: row.title,
            summary: row.summary,
            key_concepts: row.key_concepts.0,
            quiz: row.quiz.0,
            transcript: row.transcript,
            original_filename: row.original_filename,
            video_url: row.video_url,
            audio_url: row.audio_url,
            notes_degraded: row.notes_degraded,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "insert"))]
    async fn create(&self, video: NewVideo) -> Result<PersistedVideo> {
        let record = PersistedVideo::from_new(Uuid::new_v4(), Utc::now(), video);

        sqlx::query(
            r#"
            INSERT INTO videos (
                id, title, summary, key_concepts, quiz, transcript,
                original_filename, video_url, audio_url, notes_degraded, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.id)
        .bind(&record.title)
        .bind(&record.summary)
        .bind(Json(&record.key_concepts))
        .bind(Json(&record.quiz))
        .bind(&record.transcript)
        .bind(&record.original_filename)
        .bind(&record.video_url)
        .bind(&record.audio_url)
        .bind(record.notes_degraded)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert video record")?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<PersistedVideo>> {
        let row = sqlx::query_as::<Postgres, VideoRow>(
            r#"
            SELECT id, title, summary, key_concepts, quiz, transcript,
                   original_filename, video_url, audio_url, notes_degraded, created_at
            FROM videos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch video record")?;

        Ok(row.map(PersistedVideo::from))
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn list_recent(&self, limit: i64) -> Result<Vec<VideoSummary>> {
        let rows = sqlx::query_as::<Postgres, (Uuid, String, String, bool, DateTime<Utc>)>(
            r#"
            SELECT id, title, original_filename, notes_degraded, created_at
            FROM videos
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit.clamp(1, 500))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list video records")?;

        Ok(rows
            .into_iter()
            .map(
                |(id, title, original_filename, notes_degraded, created_at)| VideoSummary {
                    id,
                    title,
                    original_filename,
                    notes_degraded,
                    created_at,
                },
            )
            .collect())
    }
}
