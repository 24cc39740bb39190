use lectern_core::models::NotesResult;
use lectern_plugins::TextGenerator;
use std::sync::Arc;

use super::fallback::fallback_notes;
use super::parser::{parse_notes, NotesParseError};
use super::prompt::notes_prompt;

#[derive(Debug, thiserror::Error)]
pub enum NotesError {
    #[error("Text generation failed")]
    Generation(#[source] anyhow::Error),

    #[error(transparent)]
    Parse(#[from] NotesParseError),
}

/// Notes plus whether the fallback was substituted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesOutcome {
    pub notes: NotesResult,
    pub degraded: bool,
}

pub struct NoteGenerator {
    generator: Arc<dyn TextGenerator>,
    max_tokens: u32,
    temperature: f32,
}

impl NoteGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            generator,
            max_tokens,
            temperature,
        }
    }

    /// One generation call, parsed tolerantly. Not retried.
    pub async fn generate(&self, transcript: &str) -> Result<NotesResult, NotesError> {
        let reply = self
            .generator
            .complete(&notes_prompt(transcript), self.max_tokens, self.temperature)
            .await
            .map_err(NotesError::Generation)?;

        let notes = parse_notes(&reply)?;

        let mismatches = notes.answer_mismatches();
        if !mismatches.is_empty() {
            tracing::warn!(
                quiz_items = ?mismatches,
                "Quiz answers not found among their options"
            );
        }

        Ok(notes)
    }

    /// `generate`, with the deterministic fallback substituted on any failure
    pub async fn generate_or_fallback(&self, transcript: &str) -> NotesOutcome {
        match self.generate(transcript).await {
            Ok(notes) => NotesOutcome {
                notes,
                degraded: false,
            },
            Err(e) => {
                tracing::warn!(
                    generator = %self.generator.name(),
                    error = %e,
                    cause = ?std::error::Error::source(&e).map(|s| s.to_string()),
                    "Notes generation degraded, using fallback notes"
                );
                NotesOutcome {
                    notes: fallback_notes(transcript),
                    degraded: true,
                }
            }
        }
    }
}
