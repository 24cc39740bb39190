use anyhow::{Context, Result};
use lectern_core::Config;
use lectern_db::VideoRepository;
use lectern_plugins::{TextGenerator, TranscriptionClient};
use lectern_storage::Storage;
use std::sync::Arc;

use crate::fetcher::{DefaultTransport, RetryPolicy, TranscriptFetcher};
use crate::transcoder::{FfmpegTranscoder, MediaTranscoder};

/// External collaborators of a job, resolved once at start-up
#[derive(Clone)]
pub struct PipelineServices {
    pub storage: Arc<dyn Storage>,
    pub transcoder: Arc<dyn MediaTranscoder>,
    pub transcription: Arc<dyn TranscriptionClient>,
    pub fetcher: Arc<TranscriptFetcher>,
    pub generator: Arc<dyn TextGenerator>,
    pub repository: Arc<dyn VideoRepository>,
}

impl PipelineServices {
    /// Build every adapter from configuration
    pub async fn from_config(
        config: &Config,
        repository: Arc<dyn VideoRepository>,
    ) -> Result<Self> {
        let storage = lectern_storage::create_storage(config)
            .await
            .context("Failed to initialize storage backend")?;

        let transcoder = Arc::new(FfmpegTranscoder::new(
            config.ffmpeg_path(),
            config.audio_codec(),
            config.transcode_timeout(),
        ));

        let transcription = lectern_plugins::create_transcription_client(config)
            .await
            .context("Failed to initialize transcription client")?;

        let fetcher = Arc::new(TranscriptFetcher::new(
            Arc::new(DefaultTransport::new()),
            RetryPolicy::from_config(config),
        ));

        let generator = lectern_plugins::create_text_generator(config)
            .context("Failed to initialize text generator")?;

        tracing::info!(
            storage = %storage.backend_type(),
            transcription = %transcription.name(),
            generator = %generator.name(),
            "Pipeline services initialized"
        );

        Ok(Self {
            storage,
            transcoder,
            transcription,
            fetcher,
            generator,
            repository,
        })
    }
}
