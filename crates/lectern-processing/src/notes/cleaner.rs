use lectern_plugins::TextGenerator;
use std::sync::Arc;

use super::prompt::cleanup_prompt;

/// Optional punctuation and grammar pass over a transcript
pub struct TranscriptCleaner {
    generator: Arc<dyn TextGenerator>,
    max_tokens: u32,
    temperature: f32,
}

impl TranscriptCleaner {
    pub fn new(generator: Arc<dyn TextGenerator>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            generator,
            max_tokens,
            temperature,
        }
    }

    /// Single call; any failure or an empty reply returns the input unchanged
    pub async fn clean(&self, transcript: &str) -> String {
        match self
            .generator
            .complete(&cleanup_prompt(transcript), self.max_tokens, self.temperature)
            .await
        {
            Ok(cleaned) if !cleaned.trim().is_empty() => cleaned.trim().to_string(),
            Ok(_) => {
                tracing::warn!("Transcript cleanup returned nothing, keeping raw transcript");
                transcript.to_string()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Transcript cleanup failed, keeping raw transcript");
                transcript.to_string()
            }
        }
    }
}
