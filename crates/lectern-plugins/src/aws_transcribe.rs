//! AWS Transcribe client for batch audio transcription

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_transcribe::types::{LanguageCode, Media, MediaFormat};
use aws_sdk_transcribe::Client as TranscribeClient;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use uuid::Uuid;

use crate::transcription::{JobHandle, JobPoll, TranscriptionClient};

/// Submits and inspects AWS Transcribe jobs. Media must be addressed by an `s3://` locator.
pub struct AwsTranscribeClient {
    client: TranscribeClient,
    region: String,
}

impl Debug for AwsTranscribeClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AwsTranscribeClient")
            .field("region", &self.region)
            .finish()
    }
}

impl AwsTranscribeClient {
    /// Create a Transcribe client for the given region using the default credential chain
    pub async fn new(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;

        Self {
            client: TranscribeClient::new(&config),
            region: region.to_string(),
        }
    }

    fn job_name() -> String {
        format!("lectern-{}", Uuid::new_v4())
    }
}

/// Map a Transcribe job status onto a poll observation
fn poll_from_status(
    status: &str,
    transcript_uri: Option<&str>,
    failure_reason: Option<&str>,
) -> JobPoll {
    match status {
        "COMPLETED" => match transcript_uri {
            Some(uri) => JobPoll::completed(uri),
            None => JobPoll::failed(Some("completed without transcript location".to_string())),
        },
        "FAILED" => JobPoll::failed(failure_reason.map(String::from)),
        "QUEUED" => JobPoll::pending(),
        // IN_PROGRESS and any status added later keep the job polling
        _ => JobPoll::running(),
    }
}

#[async_trait]
impl TranscriptionClient for AwsTranscribeClient {
    fn name(&self) -> &str {
        "aws_transcribe"
    }

    async fn submit(
        &self,
        media_locator: &str,
        language_code: &str,
        media_format: &str,
    ) -> Result<JobHandle> {
        if !media_locator.starts_with("s3://") {
            anyhow::bail!("AWS Transcribe requires an s3:// media locator");
        }

        let job_name = Self::job_name();
        let media = Media::builder().media_file_uri(media_locator).build();

        self.client
            .start_transcription_job()
            .transcription_job_name(&job_name)
            .media(media)
            .language_code(LanguageCode::from(language_code))
            .media_format(MediaFormat::from(media_format))
            .send()
            .await
            .context("Failed to start transcription job")?;

        tracing::info!(
            transcription_job_name = %job_name,
            language_code = %language_code,
            media_format = %media_format,
            "Started transcription job"
        );

        Ok(JobHandle::new(job_name))
    }

    async fn poll(&self, handle: &JobHandle) -> Result<JobPoll> {
        let response = self
            .client
            .get_transcription_job()
            .transcription_job_name(handle.name())
            .send()
            .await
            .context("Failed to get transcription job status")?;

        let job = response
            .transcription_job()
            .context("Transcription job not found in response")?;

        let status = job
            .transcription_job_status()
            .map(|s| s.as_str())
            .unwrap_or("UNKNOWN");

        let poll = poll_from_status(
            status,
            job.transcript().and_then(|t| t.transcript_file_uri()),
            job.failure_reason(),
        );

        tracing::debug!(
            transcription_job_name = %handle,
            status = %status,
            "Polled transcription job"
        );

        Ok(poll)
    }

    async fn cancel(&self, handle: &JobHandle) -> Result<()> {
        // Transcribe has no cancel; deleting the job stops billing for queued work
        self.client
            .delete_transcription_job()
            .transcription_job_name(handle.name())
            .send()
            .await
            .context("Failed to delete transcription job")?;

        tracing::info!(transcription_job_name = %handle, "Deleted transcription job");
        Ok(())
    }
}
