//! Tracing subscriber initialization

use std::str::FromStr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "lectern=debug,tower_http=debug";

/// Output format of the log layer, selected with `LOG_FORMAT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" | "fmt" => Ok(LogFormat::Pretty),
            _ => Err(anyhow::anyhow!("Invalid log format: {}", s)),
        }
    }
}

impl LogFormat {
    /// Read `LOG_FORMAT`, falling back to the human format
    pub fn from_env() -> Self {
        std::env::var("LOG_FORMAT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }
}

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into())
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the default filter. Calling this twice is an error.
pub fn init_telemetry(format: LogFormat, service_name: &str) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(DEFAULT_FILTER));

    match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::info!(
        service = service_name,
        version = env!("CARGO_PKG_VERSION"),
        log_format = ?format,
        "Tracing initialized"
    );
    Ok(())
}

pub async fn shutdown_telemetry() {
    tracing::debug!("Telemetry shutdown");
}
