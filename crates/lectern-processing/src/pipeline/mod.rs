//! Pipeline orchestration
//!
//! One job runs as a single sequential task: extract audio, upload audio,
//! optionally upload the video, submit and poll transcription, fetch the transcript,
//! optionally clean it, generate notes, persist, then remove the job workspace.

mod job;
mod orchestrator;
mod poller;
mod services;

pub use job::{JobOutcome, JobWarning, PipelineJob};
pub use orchestrator::{PipelineOptions, PipelineOrchestrator};
pub use poller::{poll_until_complete, PollPolicy, PollState};
pub use services::PipelineServices;
