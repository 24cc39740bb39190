use lectern_core::models::{NewVideo, UploadRequest};
use lectern_core::{Config, ErrorMetadata, LogLevel, PipelineError};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use super::job::{JobOutcome, JobWarning, PipelineJob};
use super::poller::{poll_until_complete, PollPolicy};
use super::services::PipelineServices;
use crate::notes::{NoteGenerator, TranscriptCleaner};
use crate::validator::MediaValidator;
use crate::workspace::JobWorkspace;

const AUDIO_PREFIX: &str = "audio";
const VIDEO_PREFIX: &str = "videos";

/// Per-deployment knobs of the pipeline
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub upload_video: bool,
    pub clean_transcript: bool,
    pub language_code: String,
    pub poll: PollPolicy,
    pub work_dir: Option<PathBuf>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_concurrent_jobs: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            upload_video: true,
            clean_transcript: false,
            language_code: "en-US".to_string(),
            poll: PollPolicy::default(),
            work_dir: None,
            max_tokens: 2048,
            temperature: 0.3,
            max_concurrent_jobs: 4,
        }
    }
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            upload_video: config.upload_video(),
            clean_transcript: config.clean_transcript(),
            language_code: config.transcription_language().to_string(),
            poll: PollPolicy::from_config(config),
            work_dir: config.work_dir().cloned(),
            max_tokens: config.generation_max_tokens(),
            temperature: config.generation_temperature(),
            max_concurrent_jobs: config.max_concurrent_jobs(),
        }
    }
}

/// Race a stage against cancellation
async fn cancellable<T>(
    cancel: &CancellationToken,
    stage: impl Future<Output = Result<T, PipelineError>>,
) -> Result<T, PipelineError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PipelineError::Cancelled),
        result = stage => result,
    }
}

fn log_failure(job_id: Uuid, err: &PipelineError) {
    let details = err.detailed_message();
    match err.log_level() {
        LogLevel::Debug => {
            tracing::debug!(job_id = %job_id, kind = %err.kind(), error = %details, "Pipeline job ended")
        }
        LogLevel::Warn => {
            tracing::warn!(job_id = %job_id, kind = %err.kind(), error = %details, "Pipeline job failed")
        }
        LogLevel::Error => {
            tracing::error!(job_id = %job_id, kind = %err.kind(), error = %details, "Pipeline job failed")
        }
    }
}

/// Runs video-to-notes jobs
pub struct PipelineOrchestrator {
    services: PipelineServices,
    options: PipelineOptions,
    validator: MediaValidator,
    notes: NoteGenerator,
    cleaner: TranscriptCleaner,
    permits: Arc<Semaphore>,
}

impl PipelineOrchestrator {
    pub fn new(services: PipelineServices, options: PipelineOptions, validator: MediaValidator) -> Self {
        let notes = NoteGenerator::new(
            services.generator.clone(),
            options.max_tokens,
            options.temperature,
        );
        let cleaner = TranscriptCleaner::new(
            services.generator.clone(),
            options.max_tokens,
            options.temperature,
        );
        let permits = Arc::new(Semaphore::new(options.max_concurrent_jobs.max(1)));

        Self {
            services,
            options,
            validator,
            notes,
            cleaner,
            permits,
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn validator(&self) -> &MediaValidator {
        &self.validator
    }

    /// Run one job to completion, failure or cancellation.
    ///
    /// The job workspace is removed before this returns, whatever the outcome.
    pub async fn run(
        &self,
        request: UploadRequest,
        cancel: CancellationToken,
    ) -> Result<JobOutcome, PipelineError> {
        let job_id = Uuid::new_v4();
        let span = tracing::info_span!("pipeline_job", job_id = %job_id);

        async move {
            let start = Instant::now();
            let result = self.run_job(job_id, &request, &cancel).await;

            match &result {
                Ok(outcome) => tracing::info!(
                    job_id = %job_id,
                    video_id = %outcome.record.id,
                    warnings = outcome.warnings.len(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Pipeline job completed"
                ),
                Err(e) => log_failure(job_id, e),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn run_job(
        &self,
        job_id: Uuid,
        request: &UploadRequest,
        cancel: &CancellationToken,
    ) -> Result<JobOutcome, PipelineError> {
        self.validator.validate(request)?;

        let _permit = cancellable(cancel, async {
            self.permits
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| PipelineError::internal("Job limiter closed", e.into()))
        })
        .await?;

        let workspace = JobWorkspace::create(self.options.work_dir.as_deref(), job_id)
            .map_err(|e| PipelineError::internal("Failed to create job workspace", e))?;

        let mut job = PipelineJob::new(job_id, request);
        let result = self.execute(&mut job, request, &workspace, cancel).await;

        if let Some(handle) = &job.transcription_job {
            self.services.transcription.release(handle).await;
        }
        if let Err(e) = workspace.close() {
            tracing::error!(job_id = %job_id, error = %e, "Failed to remove job workspace");
        }

        result
    }

    async fn execute(
        &self,
        job: &mut PipelineJob,
        request: &UploadRequest,
        workspace: &JobWorkspace,
        cancel: &CancellationToken,
    ) -> Result<JobOutcome, PipelineError> {
        let services = &self.services;

        let video_path = cancellable(cancel, async {
            workspace
                .stage_video(request)
                .await
                .map_err(|e| PipelineError::internal("Failed to stage uploaded video", e))
        })
        .await?;
        job.video_path = Some(video_path.clone());

        // Stage 1: audio extraction
        let stage_start = Instant::now();
        let audio = cancellable(cancel, async {
            services
                .transcoder
                .extract_audio(&video_path, workspace.path())
                .await
                .map_err(|e| PipelineError::Transcode(e.into()))
        })
        .await?;
        tracing::info!(
            stage = "extract_audio",
            size_bytes = audio.size_bytes,
            duration_ms = stage_start.elapsed().as_secs_f64() * 1000.0,
            "Stage finished"
        );
        job.audio = Some(audio.clone());

        // Stage 2: audio upload
        let audio_object = cancellable(cancel, async {
            services
                .storage
                .put_file(&audio.path, AUDIO_PREFIX, &audio.content_type)
                .await
                .map_err(|e| PipelineError::StorageUpload {
                    artifact: "audio",
                    source: e.into(),
                })
        })
        .await?;
        tracing::info!(stage = "upload_audio", key = %audio_object.key, "Stage finished");
        job.audio_object = Some(audio_object.clone());

        // Stage 3: optional video upload
        if self.options.upload_video {
            let video_object = cancellable(cancel, async {
                services
                    .storage
                    .put_file(&video_path, VIDEO_PREFIX, &request.content_type)
                    .await
                    .map_err(|e| PipelineError::StorageUpload {
                        artifact: "video",
                        source: e.into(),
                    })
            })
            .await?;
            tracing::info!(stage = "upload_video", key = %video_object.key, "Stage finished");
            job.video_object = Some(video_object);
        }

        // Stage 4: transcription
        let handle = cancellable(cancel, async {
            services
                .transcription
                .submit(
                    &audio_object.locator,
                    &self.options.language_code,
                    audio.media_format(),
                )
                .await
                .map_err(|e| {
                    tracing::warn!(error = %e, "Transcription submit failed");
                    PipelineError::TranscriptionFailed {
                        reason: "transcription job could not be submitted".to_string(),
                    }
                })
        })
        .await?;
        job.transcription_job = Some(handle.clone());

        let stage_start = Instant::now();
        let polled = cancellable(
            cancel,
            poll_until_complete(services.transcription.as_ref(), &handle, self.options.poll),
        )
        .await;
        let result_locator = match polled {
            Ok(locator) => locator,
            Err(e) => {
                if matches!(
                    e,
                    PipelineError::Cancelled | PipelineError::TranscriptionTimedOut { .. }
                ) {
                    if let Err(cancel_err) = services.transcription.cancel(&handle).await {
                        tracing::warn!(
                            transcription_job_name = %handle,
                            error = %cancel_err,
                            "Failed to cancel transcription job"
                        );
                    }
                }
                return Err(e);
            }
        };
        tracing::info!(
            stage = "transcribe",
            transcription_job_name = %handle,
            duration_ms = stage_start.elapsed().as_secs_f64() * 1000.0,
            "Stage finished"
        );

        // Stage 5: transcript fetch
        let raw_transcript = cancellable(cancel, async {
            services
                .fetcher
                .fetch(&result_locator)
                .await
                .map_err(PipelineError::from)
        })
        .await?;
        tracing::info!(
            stage = "fetch_transcript",
            transcript_chars = raw_transcript.chars().count(),
            "Stage finished"
        );
        job.raw_transcript = Some(raw_transcript.clone());

        // Stage 6: optional cleanup
        if self.options.clean_transcript {
            let cleaned = cancellable(cancel, async {
                Ok(self.cleaner.clean(&raw_transcript).await)
            })
            .await?;
            job.cleaned_transcript = Some(cleaned);
        }
        let transcript = job.transcript().unwrap_or(&raw_transcript).to_string();

        // Stage 7: notes
        let outcome = cancellable(cancel, async {
            Ok(self.notes.generate_or_fallback(&transcript).await)
        })
        .await?;
        if outcome.degraded {
            job.warnings.push(JobWarning::notes_degraded());
        }
        tracing::info!(
            stage = "generate_notes",
            degraded = outcome.degraded,
            key_concepts = outcome.notes.key_concepts.len(),
            quiz_items = outcome.notes.quiz.len(),
            "Stage finished"
        );
        job.notes = Some(outcome.clone());

        // Stage 8: persistence. Not raced against cancellation once started.
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        let record = services
            .repository
            .create(NewVideo {
                original_filename: job.original_filename.clone(),
                notes: outcome.notes,
                notes_degraded: outcome.degraded,
                transcript,
                video_url: job.video_object.as_ref().map(|o| o.url.clone()),
                audio_url: audio_object.url.clone(),
            })
            .await
            .map_err(PipelineError::Persistence)?;

        Ok(JobOutcome {
            job_id: job.id,
            record,
            warnings: job.warnings.clone(),
        })
    }
}
