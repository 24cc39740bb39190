//! Lectern CLI: run the video-to-notes pipeline locally.
//!
//! Reads the same environment (or `.env`) as the API server.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use lectern_cli::{content_type_for_path, exit_code_for, init_tracing, truncate_string};
use lectern_core::models::UploadRequest;
use lectern_core::Config;
use lectern_db::{InMemoryVideoRepository, PgVideoRepository, VideoRepository};
use lectern_infra::ErrorResponse;
use lectern_processing::{MediaValidator, PipelineOptions, PipelineOrchestrator, PipelineServices};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "lectern", about = "Turn lecture videos into study notes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one video through the pipeline and print the stored record
    Process {
        /// Path to the video file
        file: PathBuf,
        /// Skip uploading the original video
        #[arg(long)]
        no_video_upload: bool,
        /// Clean up the transcript with the model before generating notes
        #[arg(long)]
        clean: bool,
    },
    /// Check that the configured text-generation service answers
    ProbeLlm,
    /// List recently stored notes
    List {
        /// Maximum number of items
        #[arg(long, default_value = "20")]
        limit: i64,
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

async fn open_repository(config: &Config) -> anyhow::Result<Arc<dyn VideoRepository>> {
    match config.database_url() {
        Some(url) => {
            let pool = lectern_db::connect_and_migrate(
                url,
                config.db_max_connections(),
                Duration::from_secs(config.db_timeout_seconds()),
            )
            .await?;
            Ok(Arc::new(PgVideoRepository::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; the record is kept in memory only");
            Ok(Arc::new(InMemoryVideoRepository::new()))
        }
    }
}

/// Cancel the job on Ctrl+C so remote work and temp files are cleaned up
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted; cancelling job");
            token.cancel();
        }
    });
    cancel
}

async fn process(
    config: &Config,
    file: PathBuf,
    no_video_upload: bool,
    clean: bool,
) -> anyhow::Result<()> {
    let metadata = tokio::fs::metadata(&file)
        .await
        .with_context(|| format!("Cannot read {}", file.display()))?;
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    let content_type = content_type_for_path(&file)
        .with_context(|| format!("{} does not look like a video file", file.display()))?;

    let repository = open_repository(config).await?;
    let services = PipelineServices::from_config(config, repository).await?;
    let mut options = PipelineOptions::from_config(config);
    if no_video_upload {
        options.upload_video = false;
    }
    if clean {
        options.clean_transcript = true;
    }
    let orchestrator =
        PipelineOrchestrator::new(services, options, MediaValidator::from_config(config));

    let request = UploadRequest::from_path(&file, metadata.len(), filename, content_type);

    match orchestrator.run(request, cancel_on_ctrl_c()).await {
        Ok(outcome) => print_json(&outcome),
        Err(e) => {
            let body = ErrorResponse::from_pipeline_error(&e, true);
            eprintln!("{}", serde_json::to_string_pretty(&body)?);
            std::process::exit(exit_code_for(e.kind()));
        }
    }
}

async fn probe_llm(config: &Config) -> anyhow::Result<()> {
    let generator = lectern_plugins::create_text_generator(config)?;
    let reply = lectern_plugins::probe(generator.as_ref())
        .await
        .with_context(|| format!("{} did not answer", generator.name()))?;
    print_json(&serde_json::json!({
        "provider": generator.name(),
        "reply": reply,
    }))
}

async fn list(config: &Config, limit: i64, format: OutputFormat) -> anyhow::Result<()> {
    if config.database_url().is_none() {
        anyhow::bail!("DATABASE_URL must be set to list stored notes");
    }
    let repository = open_repository(config).await?;
    let videos = repository.list_recent(limit).await?;

    match format {
        OutputFormat::Json => print_json(&videos),
        OutputFormat::Table => {
            println!(
                "{:<36}  {:<32}  {:<24}  {:<8}  {}",
                "ID", "TITLE", "FILE", "FALLBACK", "CREATED"
            );
            for video in &videos {
                println!(
                    "{:<36}  {:<32}  {:<24}  {:<8}  {}",
                    video.id,
                    truncate_string(&video.title, 32),
                    truncate_string(&video.original_filename, 24),
                    if video.notes_degraded { "yes" } else { "no" },
                    video.created_at.format("%Y-%m-%d %H:%M"),
                );
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Process {
            file,
            no_video_upload,
            clean,
        } => process(&config, file, no_video_upload, clean).await?,
        Commands::ProbeLlm => probe_llm(&config).await?,
        Commands::List { limit, format } => list(&config, limit, format).await?,
    }

    Ok(())
}
