//! In-process fakes for every pipeline collaborator

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use lectern_core::models::{NewVideo, PersistedVideo, UploadRequest, VideoSummary};
use lectern_db::{InMemoryVideoRepository, VideoRepository};
use lectern_plugins::{JobHandle, JobPoll, TextGenerator, TranscriptionClient};
use lectern_processing::{
    AudioArtifact, FetchError, MediaTranscoder, MediaValidator, PipelineOptions,
    PipelineOrchestrator, PipelineServices, RetryPolicy, TranscodeError, TranscriptFetcher,
    TranscriptTransport,
};
use lectern_storage::{Storage, StorageBackend, StorageError, StorageResult, StoredObject};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use uuid::Uuid;

pub const TRANSCRIPT: &str = "Today we discuss photosynthesis. Plants convert light into chemical energy.";

pub const NOTES_REPLY: &str = r#"```json
{
  "title": "Photosynthesis",
  "summary": "How plants turn light into energy.",
  "keyConcepts": [
    {"topic": "Chlorophyll", "definition": "Pigment that absorbs light."},
    {"topic": "Light reactions", "definition": "Produce ATP and NADPH."},
    {"topic": "Calvin cycle", "definition": "Fixes carbon dioxide."},
    {"topic": "Stomata", "definition": "Pores for gas exchange."},
    {"topic": "Glucose", "definition": "Sugar product."}
  ],
  "quiz": [
    {"question": "Which pigment absorbs light?", "options": ["Chlorophyll", "Keratin"], "answer": "Chlorophyll"},
    {"question": "What does the Calvin cycle fix?", "options": ["Oxygen", "Carbon dioxide"], "answer": "Carbon dioxide"}
  ]
}
```"#;

pub fn transcript_document(text: &str) -> Vec<u8> {
    serde_json::json!({
        "jobName": "lectern-test",
        "results": { "transcripts": [{ "transcript": text }] },
        "status": "COMPLETED"
    })
    .to_string()
    .into_bytes()
}

pub struct FakeTranscoder {
    pub fail: bool,
    pub calls: AtomicU32,
}

#[async_trait]
impl MediaTranscoder for FakeTranscoder {
    async fn extract_audio(
        &self,
        video: &Path,
        output_dir: &Path,
    ) -> Result<AudioArtifact, TranscodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(video.exists(), "video must be staged before extraction");

        if self.fail {
            return Err(TranscodeError::Failed {
                status: "exit status: 1".to_string(),
                stderr_tail: format!("{}: does not contain any stream", video.display()),
            });
        }

        let path = output_dir.join("audio.mp3");
        tokio::fs::write(&path, b"ID3 fake audio").await.unwrap();
        Ok(AudioArtifact {
            path,
            extension: "mp3".to_string(),
            content_type: "audio/mpeg".to_string(),
            size_bytes: 14,
        })
    }
}

/// Records uploads without touching a backend
#[derive(Default)]
pub struct FakeStorage {
    pub fail_prefix: Option<&'static str>,
    pub uploads: Mutex<Vec<(String, String)>>,
}

impl FakeStorage {
    pub fn uploads(&self) -> Vec<(String, String)> {
        self.uploads.lock().unwrap().clone()
    }

    fn record(&self, prefix: &str, content_type: &str) -> StorageResult<StoredObject> {
        if self.fail_prefix == Some(prefix) {
            return Err(StorageError::UploadFailed(
                "InvalidAccessKeyId: AKIAEXAMPLE".to_string(),
            ));
        }
        let key = lectern_storage::keys::generate_storage_key(prefix, content_type)?;
        self.uploads
            .lock()
            .unwrap()
            .push((prefix.to_string(), content_type.to_string()));
        Ok(StoredObject {
            locator: format!("s3://lectures/{}", key),
            url: format!("https://lectures.s3.us-east-1.amazonaws.com/{}", key),
            key,
            size_bytes: 1,
        })
    }
}

#[async_trait]
impl Storage for FakeStorage {
    async fn put(&self, _data: Bytes, key_prefix: &str, content_type: &str) -> StorageResult<StoredObject> {
        self.record(key_prefix, content_type)
    }

    async fn put_file(&self, path: &Path, key_prefix: &str, content_type: &str) -> StorageResult<StoredObject> {
        assert!(path.exists(), "uploaded file must exist");
        self.record(key_prefix, content_type)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

/// Replays scripted statuses and repeats the last one
pub struct FakeTranscription {
    script: Mutex<VecDeque<JobPoll>>,
    last: Mutex<JobPoll>,
    pub polls: AtomicU32,
    pub cancelled: Mutex<Vec<String>>,
    pub released: Mutex<Vec<String>>,
    pub submitted: Mutex<Vec<(String, String, String)>>,
}

impl FakeTranscription {
    pub fn new(script: Vec<JobPoll>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(JobPoll::running()),
            polls: AtomicU32::new(0),
            cancelled: Mutex::new(Vec::new()),
            released: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn completing() -> Self {
        Self::new(vec![
            JobPoll::pending(),
            JobPoll::running(),
            JobPoll::completed("https://s3.amazonaws.com/transcripts/job.json"),
        ])
    }

    pub fn poll_count(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn cancelled(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }

    pub fn released(&self) -> Vec<String> {
        self.released.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranscriptionClient for FakeTranscription {
    fn name(&self) -> &str {
        "fake"
    }

    async fn submit(&self, media_locator: &str, language_code: &str, media_format: &str) -> Result<JobHandle> {
        self.submitted.lock().unwrap().push((
            media_locator.to_string(),
            language_code.to_string(),
            media_format.to_string(),
        ));
        Ok(JobHandle::new("lectern-test-job"))
    }

    async fn poll(&self, _handle: &JobHandle) -> Result<JobPoll> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        let poll = match next {
            Some(poll) => {
                *self.last.lock().unwrap() = poll.clone();
                poll
            }
            None => self.last.lock().unwrap().clone(),
        };
        Ok(poll)
    }

    async fn cancel(&self, handle: &JobHandle) -> Result<()> {
        self.cancelled.lock().unwrap().push(handle.name().to_string());
        Ok(())
    }

    async fn release(&self, handle: &JobHandle) {
        self.released.lock().unwrap().push(handle.name().to_string());
    }
}

/// Serves scripted transcript documents
pub struct FakeTransport {
    script: Mutex<VecDeque<Result<Vec<u8>, FetchError>>>,
}

impl FakeTransport {
    pub fn new(script: Vec<Result<Vec<u8>, FetchError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
        }
    }

    pub fn serving(text: &str) -> Self {
        Self::new(vec![Ok(transcript_document(text))])
    }
}

#[async_trait]
impl TranscriptTransport for FakeTransport {
    async fn get(&self, _locator: &str) -> Result<Vec<u8>, FetchError> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(FetchError::Status { status: 404 }))
    }
}

/// Answers cleanup prompts and notes prompts separately
pub struct FakeGenerator {
    pub notes_reply: Result<String, String>,
    pub cleanup_reply: Result<String, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn replying(notes_reply: &str) -> Self {
        Self {
            notes_reply: Ok(notes_reply.to_string()),
            cleanup_reply: Err("cleanup not expected".to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            notes_reply: Err("503 Service Unavailable".to_string()),
            cleanup_reply: Err("503 Service Unavailable".to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    fn name(&self) -> &str {
        "fake"
    }

    async fn complete(&self, prompt: &str, _max_tokens: u32, _temperature: f32) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let reply = if prompt.starts_with("Fix the punctuation") {
            &self.cleanup_reply
        } else {
            &self.notes_reply
        };
        reply.clone().map_err(|e| anyhow::anyhow!(e))
    }
}

/// Document store that rejects every write
#[derive(Default)]
pub struct FailingRepository {
    pub attempts: AtomicU32,
}

#[async_trait]
impl VideoRepository for FailingRepository {
    async fn create(&self, _video: NewVideo) -> Result<PersistedVideo> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(anyhow::anyhow!(
            "error returned from database: connection to 10.0.0.5:5432 refused"
        ))
    }

    async fn get(&self, _id: Uuid) -> Result<Option<PersistedVideo>> {
        Ok(None)
    }

    async fn list_recent(&self, _limit: i64) -> Result<Vec<VideoSummary>> {
        Ok(Vec::new())
    }
}

/// Fakes wired into an orchestrator, with handles kept for assertions
pub struct Harness {
    pub orchestrator: PipelineOrchestrator,
    pub transcoder: Arc<FakeTranscoder>,
    pub storage: Arc<FakeStorage>,
    pub transcription: Arc<FakeTranscription>,
    pub generator: Arc<FakeGenerator>,
    pub repository: InMemoryVideoRepository,
    pub failing_repository: Option<Arc<FailingRepository>>,
    pub work_root: TempDir,
}

pub struct HarnessBuilder {
    pub transcoder_fails: bool,
    pub storage: FakeStorage,
    pub transcription: FakeTranscription,
    pub transport: FakeTransport,
    pub generator: FakeGenerator,
    pub options: PipelineOptions,
    pub repository_fails: bool,
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self {
            transcoder_fails: false,
            storage: FakeStorage::default(),
            transcription: FakeTranscription::completing(),
            transport: FakeTransport::serving(TRANSCRIPT),
            generator: FakeGenerator::replying(NOTES_REPLY),
            options: PipelineOptions::default(),
            repository_fails: false,
        }
    }
}

impl HarnessBuilder {
    pub fn build(self) -> Harness {
        let work_root = tempfile::tempdir().unwrap();
        let transcoder = Arc::new(FakeTranscoder {
            fail: self.transcoder_fails,
            calls: AtomicU32::new(0),
        });
        let storage = Arc::new(self.storage);
        let transcription = Arc::new(self.transcription);
        let generator = Arc::new(self.generator);
        let repository = InMemoryVideoRepository::new();
        let failing_repository = self
            .repository_fails
            .then(|| Arc::new(FailingRepository::default()));
        let store: Arc<dyn VideoRepository> = match &failing_repository {
            Some(failing) => failing.clone(),
            None => Arc::new(repository.clone()),
        };

        let services = PipelineServices {
            storage: storage.clone(),
            transcoder: transcoder.clone(),
            transcription: transcription.clone(),
            fetcher: Arc::new(TranscriptFetcher::new(
                Arc::new(self.transport),
                RetryPolicy::default(),
            )),
            generator: generator.clone(),
            repository: store,
        };

        let options = PipelineOptions {
            work_dir: Some(work_root.path().to_path_buf()),
            ..self.options
        };
        let validator = MediaValidator::new(
            10 * 1024 * 1024,
            vec!["mp4".to_string(), "webm".to_string()],
            vec!["video/mp4".to_string(), "video/webm".to_string()],
        );

        Harness {
            orchestrator: PipelineOrchestrator::new(services, options, validator),
            transcoder,
            storage,
            transcription,
            generator,
            repository,
            failing_repository,
            work_root,
        }
    }
}

impl Harness {
    /// Directories left behind under the work root
    pub fn leftover_workspaces(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.work_root.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }
}

pub fn upload() -> UploadRequest {
    UploadRequest::from_bytes(vec![0u8; 2048], "lecture.mp4", "video/mp4")
}
