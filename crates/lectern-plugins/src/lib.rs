//! Vendor adapters
//!
//! Speech-to-text and text-generation services are reached only through the
//! `TranscriptionClient` and `TextGenerator` traits defined here. Each concrete
//! adapter sits behind a cargo feature.

pub mod factory;
pub mod generation;
pub mod transcription;

#[cfg(feature = "plugin-anthropic")]
mod anthropic;
#[cfg(feature = "plugin-aws-transcribe")]
mod aws_transcribe;
#[cfg(feature = "plugin-openai")]
mod chat_completions;
#[cfg(feature = "plugin-whisper")]
mod local_whisper;

#[cfg(feature = "plugin-anthropic")]
pub use anthropic::AnthropicGenerator;
#[cfg(feature = "plugin-aws-transcribe")]
pub use aws_transcribe::AwsTranscribeClient;
#[cfg(feature = "plugin-openai")]
pub use chat_completions::ChatCompletionsGenerator;
#[cfg(feature = "plugin-whisper")]
pub use local_whisper::LocalWhisperClient;

pub use factory::{create_text_generator, create_transcription_client};
pub use generation::{probe, TextGenerator};
pub use transcription::{JobHandle, JobPoll, JobStatus, TranscriptionClient};
