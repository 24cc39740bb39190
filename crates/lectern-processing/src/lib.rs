//! Lectern processing library
//!
//! The stages of a video-to-notes job and the orchestrator that chains them:
//! upload validation, the per-job workspace, audio extraction, transcript
//! fetching, note generation with its fallback, and the pipeline itself.

pub mod fetcher;
pub mod notes;
pub mod pipeline;
pub mod transcoder;
pub mod validator;
pub mod workspace;

pub use fetcher::{
    extract_transcript, DefaultTransport, FetchError, FetchFailure, RetryPolicy,
    TranscriptFetcher, TranscriptTransport,
};
pub use notes::{
    fallback_notes, parse_notes, NoteGenerator, NotesOutcome, NotesParseError,
    TranscriptCleaner,
};
pub use pipeline::{
    JobOutcome, JobWarning, PipelineJob, PipelineOptions, PipelineOrchestrator,
    PipelineServices, PollPolicy,
};
pub use transcoder::{AudioArtifact, FfmpegTranscoder, MediaTranscoder, TranscodeError};
pub use validator::{MediaValidator, ValidationError};
pub use workspace::JobWorkspace;
