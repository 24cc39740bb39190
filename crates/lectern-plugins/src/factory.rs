//! Adapter construction from configuration

use anyhow::Result;
use lectern_core::{Config, GenerationProvider, TranscriptionProvider};
use std::sync::Arc;

use crate::generation::TextGenerator;
use crate::transcription::TranscriptionClient;

/// Build the transcription client selected by `TRANSCRIPTION_PROVIDER`
pub async fn create_transcription_client(config: &Config) -> Result<Arc<dyn TranscriptionClient>> {
    match config.transcription_provider() {
        TranscriptionProvider::Aws => {
            #[cfg(feature = "plugin-aws-transcribe")]
            {
                let region = config.transcribe_region().ok_or_else(|| {
                    anyhow::anyhow!("AWS_REGION or S3_REGION is required for AWS Transcribe")
                })?;
                let client = crate::AwsTranscribeClient::new(region).await;
                tracing::info!(region = %region, "Using AWS Transcribe");
                Ok(Arc::new(client))
            }
            #[cfg(not(feature = "plugin-aws-transcribe"))]
            {
                anyhow::bail!("AWS Transcribe support requires the plugin-aws-transcribe feature")
            }
        }
        TranscriptionProvider::Whisper => {
            #[cfg(feature = "plugin-whisper")]
            {
                tracing::info!(
                    whisper_path = %config.whisper_path(),
                    model = %config.whisper_model(),
                    "Using local whisper"
                );
                Ok(Arc::new(crate::LocalWhisperClient::new(
                    config.whisper_path(),
                    config.whisper_model(),
                )))
            }
            #[cfg(not(feature = "plugin-whisper"))]
            {
                anyhow::bail!("Local whisper support requires the plugin-whisper feature")
            }
        }
    }
}

/// Build the text generator selected by `GENERATION_PROVIDER`
pub fn create_text_generator(config: &Config) -> Result<Arc<dyn TextGenerator>> {
    match config.generation_provider() {
        GenerationProvider::Anthropic => {
            #[cfg(feature = "plugin-anthropic")]
            {
                let api_key = config
                    .anthropic_api_key()
                    .ok_or_else(|| anyhow::anyhow!("ANTHROPIC_API_KEY is required"))?;
                let generator = crate::AnthropicGenerator::new(
                    api_key,
                    config.anthropic_model(),
                    config.generation_timeout(),
                )?;
                tracing::info!(model = %config.anthropic_model(), "Using Anthropic text generation");
                Ok(Arc::new(generator))
            }
            #[cfg(not(feature = "plugin-anthropic"))]
            {
                anyhow::bail!("Anthropic support requires the plugin-anthropic feature")
            }
        }
        GenerationProvider::OpenAi => {
            #[cfg(feature = "plugin-openai")]
            {
                let api_key = config
                    .openai_api_key()
                    .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY or GROQ_API_KEY is required"))?;
                let generator = crate::ChatCompletionsGenerator::new(
                    api_key,
                    config.openai_model(),
                    config.openai_base_url(),
                    config.generation_timeout(),
                )?;
                tracing::info!(
                    model = %config.openai_model(),
                    base_url = %config.openai_base_url(),
                    "Using chat completions text generation"
                );
                Ok(Arc::new(generator))
            }
            #[cfg(not(feature = "plugin-openai"))]
            {
                anyhow::bail!("Chat completions support requires the plugin-openai feature")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_core::LecternConfig;

    #[tokio::test]
    async fn test_whisper_client_from_config() {
        let config = Config::from(LecternConfig {
            transcription_provider: TranscriptionProvider::Whisper,
            ..LecternConfig::default()
        });
        let client = create_transcription_client(&config).await.unwrap();
        assert_eq!(client.name(), "local_whisper");
    }

    #[test]
    fn test_generator_requires_api_key() {
        let config = Config::from(LecternConfig {
            generation_provider: GenerationProvider::Anthropic,
            anthropic_api_key: None,
            ..LecternConfig::default()
        });
        assert!(create_text_generator(&config).is_err());
    }

    #[test]
    fn test_chat_completions_generator_from_config() {
        let config = Config::from(LecternConfig {
            generation_provider: GenerationProvider::OpenAi,
            openai_api_key: Some("gsk-test".to_string()),
            ..LecternConfig::default()
        });
        let generator = create_text_generator(&config).unwrap();
        assert_eq!(generator.name(), "chat_completions");
    }
}
