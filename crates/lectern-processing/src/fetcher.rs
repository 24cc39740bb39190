//! Transcript retrieval with bounded retry
//!
//! A finished transcription job exposes its transcript as a JSON document at a
//! locator (`https://…` for AWS Transcribe, `file://…` for local whisper). The
//! document is fetched through a `TranscriptTransport`, retried on transport-level
//! failures with exponential backoff, and reduced to
//! `results.transcripts[0].transcript`.

use async_trait::async_trait;
use lectern_core::{Config, PipelineError};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Attempt timed out after {0:?}")]
    Timeout(Duration),

    #[error("Server returned {status}")]
    Status { status: u16 },

    #[error("Malformed transcript document: {0}")]
    Malformed(String),

    #[error("Transcript document has no results.transcripts[0].transcript")]
    MissingTranscript,

    #[error("Transcript is empty")]
    EmptyTranscript,

    #[error("Unsupported transcript locator scheme")]
    UnsupportedLocator,

    #[error("Failed to read local transcript: {0}")]
    Io(#[source] std::io::Error),
}

impl FetchError {
    /// Transport failures, 5xx and 429 are worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport(_) | FetchError::Timeout(_) => true,
            FetchError::Status { status } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Last error of a failed fetch, with the number of attempts made
#[derive(Debug, thiserror::Error)]
#[error("{error} (after {attempts} attempt(s))")]
pub struct FetchFailure {
    pub attempts: u32,
    #[source]
    pub error: FetchError,
}

impl From<FetchFailure> for PipelineError {
    fn from(failure: FetchFailure) -> Self {
        PipelineError::TranscriptFetch {
            attempts: failure.attempts,
            source: anyhow::Error::new(failure.error),
        }
    }
}

#[async_trait]
pub trait TranscriptTransport: Send + Sync {
    /// One attempt at reading the raw document behind `locator`
    async fn get(&self, locator: &str) -> Result<Vec<u8>, FetchError>;
}

/// Reads `http(s)://` locators with reqwest and `file://` locators from disk
#[derive(Clone, Default)]
pub struct DefaultTransport {
    client: reqwest::Client,
}

impl DefaultTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TranscriptTransport for DefaultTransport {
    async fn get(&self, locator: &str) -> Result<Vec<u8>, FetchError> {
        if let Some(path) = locator.strip_prefix("file://") {
            return tokio::fs::read(path).await.map_err(FetchError::Io);
        }

        if !(locator.starts_with("https://") || locator.starts_with("http://")) {
            return Err(FetchError::UnsupportedLocator);
        }

        let response = self
            .client
            .get(locator)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.without_url().to_string()))?;
        Ok(body.to_vec())
    }
}

/// Pull the first transcript alternative out of a transcript document
pub fn extract_transcript(document: &[u8]) -> Result<String, FetchError> {
    let value: Value =
        serde_json::from_slice(document).map_err(|e| FetchError::Malformed(e.to_string()))?;

    let transcript = value
        .pointer("/results/transcripts/0/transcript")
        .and_then(Value::as_str)
        .ok_or(FetchError::MissingTranscript)?;

    if transcript.trim().is_empty() {
        return Err(FetchError::EmptyTranscript);
    }
    Ok(transcript.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base: Duration::from_secs(2),
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.fetch_max_retries(),
            backoff_base: config.fetch_backoff_base(),
            attempt_timeout: config.fetch_attempt_timeout(),
        }
    }

    /// Delay before retry number `retry` (1-based): base, 2×base, 4×base, …
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        self.backoff_base.saturating_mul(1u32 << exponent)
    }
}

pub struct TranscriptFetcher {
    transport: Arc<dyn TranscriptTransport>,
    policy: RetryPolicy,
}

impl TranscriptFetcher {
    pub fn new(transport: Arc<dyn TranscriptTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub async fn fetch(&self, locator: &str) -> Result<String, FetchFailure> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let result =
                match tokio::time::timeout(self.policy.attempt_timeout, self.transport.get(locator))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Timeout(self.policy.attempt_timeout)),
                };

            let error = match result {
                Ok(document) => {
                    return extract_transcript(&document).map_err(|error| FetchFailure {
                        attempts: attempt,
                        error,
                    });
                }
                Err(error) => error,
            };

            if !error.is_retryable() || attempt > self.policy.max_retries {
                return Err(FetchFailure {
                    attempts: attempt,
                    error,
                });
            }

            let delay = self.policy.backoff(attempt);
            tracing::warn!(
                attempt,
                error = %error,
                retry_in_ms = delay.as_millis() as u64,
                "Transcript fetch failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
