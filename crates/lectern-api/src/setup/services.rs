//! Pipeline wiring

use anyhow::Result;
use lectern_core::Config;
use lectern_db::VideoRepository;
use lectern_processing::{MediaValidator, PipelineOptions, PipelineOrchestrator, PipelineServices};
use std::sync::Arc;

/// Resolve every adapter once and build the shared orchestrator
pub async fn initialize_pipeline(
    config: &Config,
    repository: Arc<dyn VideoRepository>,
) -> Result<Arc<PipelineOrchestrator>> {
    let services = PipelineServices::from_config(config, repository).await?;
    let options = PipelineOptions::from_config(config);
    let validator = MediaValidator::from_config(config);

    tracing::info!(
        upload_video = options.upload_video,
        clean_transcript = options.clean_transcript,
        max_concurrent_jobs = options.max_concurrent_jobs,
        poll_interval_secs = options.poll.interval.as_secs(),
        max_polls = options.poll.max_polls,
        "Pipeline initialized"
    );

    Ok(Arc::new(PipelineOrchestrator::new(services, options, validator)))
}
