//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::{Context, Result};
use lectern_core::Config;
use lectern_infra::LogFormat;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    lectern_infra::init_telemetry(LogFormat::from_env(), "lectern-api")?;

    // Fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;
    tracing::info!(
        environment = %config.environment(),
        storage = %config.storage_backend(),
        transcription = %config.transcription_provider(),
        generation = %config.generation_provider(),
        "Configuration loaded and validated successfully"
    );

    let (repository, database) = database::setup_repository(&config).await?;

    let pipeline = services::initialize_pipeline(&config, repository.clone()).await?;

    let state = Arc::new(AppState {
        config: config.clone(),
        pipeline,
        repository,
        database,
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
