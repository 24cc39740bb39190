//! Transcription job contract
//!
//! A transcription service is driven as submit-then-poll. Clients never block
//! waiting for completion; the wait strategy (interval, ceiling) belongs to the caller.

use anyhow::Result;
use async_trait::async_trait;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Identifier of a submitted transcription job
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Display for JobHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// One observation of a job's state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPoll {
    pub status: JobStatus,
    /// Where the finished transcript can be fetched (COMPLETED only)
    pub result_locator: Option<String>,
    /// Service-reported reason (FAILED only)
    pub failure_reason: Option<String>,
}

impl JobPoll {
    pub fn pending() -> Self {
        Self {
            status: JobStatus::Pending,
            result_locator: None,
            failure_reason: None,
        }
    }

    pub fn running() -> Self {
        Self {
            status: JobStatus::Running,
            ..Self::pending()
        }
    }

    pub fn completed(result_locator: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Completed,
            result_locator: Some(result_locator.into()),
            failure_reason: None,
        }
    }

    pub fn failed(reason: Option<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            result_locator: None,
            failure_reason: reason,
        }
    }
}

#[async_trait]
pub trait TranscriptionClient: Send + Sync {
    fn name(&self) -> &str;

    /// Submit a job for the media at `media_locator` and return immediately
    async fn submit(
        &self,
        media_locator: &str,
        language_code: &str,
        media_format: &str,
    ) -> Result<JobHandle>;

    /// Report the job's current state without waiting
    async fn poll(&self, handle: &JobHandle) -> Result<JobPoll>;

    /// Best-effort stop of a job that will not be awaited any further
    async fn cancel(&self, _handle: &JobHandle) -> Result<()> {
        Ok(())
    }

    /// Release local resources held for a finished job
    async fn release(&self, _handle: &JobHandle) {}
}
