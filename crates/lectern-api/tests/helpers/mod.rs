//! Test helpers: build AppState and router around in-process pipeline fakes.
//!
//! Storage is a real `LocalStorage` under a temp dir and transcripts are served from
//! `file://` locators, so only ffmpeg, the transcription service and the model are faked.

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use lectern_api::setup::routes;
use lectern_api::state::{AppState, DatabaseKind};
use lectern_core::{Config, LecternConfig};
use lectern_db::InMemoryVideoRepository;
use lectern_plugins::{JobHandle, JobPoll, TextGenerator, TranscriptionClient};
use lectern_processing::{
    AudioArtifact, DefaultTransport, MediaTranscoder, MediaValidator, PipelineOptions,
    PipelineOrchestrator, PipelineServices, RetryPolicy, TranscodeError, TranscriptFetcher,
};
use lectern_storage::LocalStorage;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const TRANSCRIPT: &str = "Entropy measures disorder. The second law says it never decreases.";

pub const NOTES_REPLY: &str = r#"{
  "title": "Thermodynamics",
  "summary": "Entropy and the second law.",
  "keyConcepts": [
    {"topic": "Entropy", "definition": "Measure of disorder."},
    {"topic": "Second law", "definition": "Entropy of an isolated system never decreases."}
  ],
  "quiz": [
    {"question": "Can entropy of an isolated system decrease?", "options": ["Yes", "No"], "answer": "No"}
  ]
}"#;

pub struct FakeTranscoder;

#[async_trait]
impl MediaTranscoder for FakeTranscoder {
    async fn extract_audio(
        &self,
        _video: &Path,
        output_dir: &Path,
    ) -> Result<AudioArtifact, TranscodeError> {
        let path = output_dir.join("audio.mp3");
        tokio::fs::write(&path, b"ID3 fake audio")
            .await
            .map_err(TranscodeError::Spawn)?;
        Ok(AudioArtifact {
            path,
            extension: "mp3".to_string(),
            content_type: "audio/mpeg".to_string(),
            size_bytes: 14,
        })
    }
}

/// Finishes on the first poll with either a transcript locator or a failure
pub struct FakeTranscription {
    outcome: JobPoll,
}

#[async_trait]
impl TranscriptionClient for FakeTranscription {
    fn name(&self) -> &str {
        "fake"
    }

    async fn submit(&self, _locator: &str, _language: &str, _format: &str) -> Result<JobHandle> {
        Ok(JobHandle::new("api-test-job"))
    }

    async fn poll(&self, _handle: &JobHandle) -> Result<JobPoll> {
        Ok(self.outcome.clone())
    }

    async fn cancel(&self, _handle: &JobHandle) -> Result<()> {
        Ok(())
    }

    async fn release(&self, _handle: &JobHandle) {}
}

pub struct FakeGenerator {
    reply: Option<String>,
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    fn name(&self) -> &str {
        "fake"
    }

    async fn complete(&self, _prompt: &str, _max_tokens: u32, _temperature: f32) -> Result<String> {
        self.reply
            .clone()
            .ok_or_else(|| anyhow::anyhow!("429 Too Many Requests"))
    }
}

/// Knobs for one test application
#[derive(Default)]
pub struct TestAppBuilder {
    pub transcription_failure: Option<String>,
    pub generator_fails: bool,
}

/// Test application: server plus owned resources
pub struct TestApp {
    pub server: TestServer,
    pub repository: InMemoryVideoRepository,
    pub _temp_dir: TempDir,
}

impl TestAppBuilder {
    pub async fn build(self) -> TestApp {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let transcript_path = temp_dir.path().join("transcript.json");
        let document = serde_json::json!({
            "results": { "transcripts": [{ "transcript": TRANSCRIPT }] },
            "status": "COMPLETED"
        });
        std::fs::write(&transcript_path, document.to_string()).unwrap();

        let outcome = match self.transcription_failure {
            Some(reason) => JobPoll::failed(Some(reason)),
            None => JobPoll::completed(format!("file://{}", transcript_path.display())),
        };

        let storage = LocalStorage::new(
            temp_dir.path().join("storage"),
            "http://localhost:4000/files".to_string(),
        )
        .await
        .expect("Failed to create local storage");

        let repository = InMemoryVideoRepository::new();
        let services = PipelineServices {
            storage: Arc::new(storage),
            transcoder: Arc::new(FakeTranscoder),
            transcription: Arc::new(FakeTranscription { outcome }),
            fetcher: Arc::new(TranscriptFetcher::new(
                Arc::new(DefaultTransport::new()),
                RetryPolicy::default(),
            )),
            generator: Arc::new(FakeGenerator {
                reply: (!self.generator_fails).then(|| NOTES_REPLY.to_string()),
            }),
            repository: Arc::new(repository.clone()),
        };

        let config = Config::from(LecternConfig::default());
        let options = PipelineOptions {
            work_dir: Some(temp_dir.path().join("work")),
            ..PipelineOptions::default()
        };
        let orchestrator =
            PipelineOrchestrator::new(services, options, MediaValidator::from_config(&config));

        let state = Arc::new(AppState {
            config: config.clone(),
            pipeline: Arc::new(orchestrator),
            repository: Arc::new(repository.clone()),
            database: DatabaseKind::InMemory,
        });

        let router = routes::setup_routes(&config, state).expect("Failed to build routes");
        let server = TestServer::new(router).expect("Failed to start test server");

        TestApp {
            server,
            repository,
            _temp_dir: temp_dir,
        }
    }
}

pub async fn setup_test_app() -> TestApp {
    TestAppBuilder::default().build().await
}

pub fn video_form(filename: &str, mime_type: &str) -> MultipartForm {
    let part = Part::bytes(vec![0u8; 4096])
        .file_name(filename.to_string())
        .mime_type(mime_type.to_string());
    MultipartForm::new().add_part("video", part)
}
