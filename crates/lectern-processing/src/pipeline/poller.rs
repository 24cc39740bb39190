//! Transcription status polling
//!
//! Polls immediately after submission, then once per interval, until the job reaches
//! a terminal status or the poll ceiling. State lives in a `PollState` owned by one
//! call; nothing is shared between jobs.

use lectern_core::{Config, PipelineError};
use lectern_plugins::{JobHandle, JobStatus, TranscriptionClient};
use std::time::Duration;
use tokio::time::Instant;

const UNKNOWN_REASON: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_polls: u32,
    /// Consecutive status-check errors tolerated before giving up
    pub max_consecutive_errors: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_polls: 240,
            max_consecutive_errors: 3,
        }
    }
}

impl PollPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.poll_interval(),
            max_polls: config.poll_max_attempts(),
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub struct PollState {
    pub polls: u32,
    pub consecutive_errors: u32,
    started: Instant,
}

impl PollState {
    fn new() -> Self {
        Self {
            polls: 0,
            consecutive_errors: 0,
            started: Instant::now(),
        }
    }

    fn waited(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Poll `handle` to a terminal status and return the transcript locator
pub async fn poll_until_complete(
    client: &dyn TranscriptionClient,
    handle: &JobHandle,
    policy: PollPolicy,
) -> Result<String, PipelineError> {
    let mut state = PollState::new();

    loop {
        state.polls += 1;

        match client.poll(handle).await {
            Ok(poll) => {
                state.consecutive_errors = 0;
                tracing::debug!(
                    transcription_job_name = %handle,
                    poll = state.polls,
                    status = ?poll.status,
                    "Transcription status"
                );

                match poll.status {
                    JobStatus::Completed => {
                        return poll.result_locator.ok_or_else(|| {
                            PipelineError::TranscriptionFailed {
                                reason: "completed without transcript location".to_string(),
                            }
                        });
                    }
                    JobStatus::Failed => {
                        return Err(PipelineError::TranscriptionFailed {
                            reason: poll
                                .failure_reason
                                .filter(|r| !r.trim().is_empty())
                                .unwrap_or_else(|| UNKNOWN_REASON.to_string()),
                        });
                    }
                    JobStatus::Pending | JobStatus::Running => {}
                }
            }
            Err(e) => {
                state.consecutive_errors += 1;
                tracing::warn!(
                    transcription_job_name = %handle,
                    poll = state.polls,
                    consecutive_errors = state.consecutive_errors,
                    error = %e,
                    "Transcription status check failed"
                );
                if state.consecutive_errors >= policy.max_consecutive_errors {
                    return Err(PipelineError::TranscriptionFailed {
                        reason: "transcription status unavailable".to_string(),
                    });
                }
            }
        }

        if state.polls >= policy.max_polls {
            return Err(PipelineError::TranscriptionTimedOut {
                polls: state.polls,
                waited_secs: state.waited().as_secs(),
            });
        }

        tokio::time::sleep(policy.interval).await;
    }
}
