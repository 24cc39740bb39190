//! Document store selection

use crate::state::DatabaseKind;
use anyhow::Result;
use lectern_core::Config;
use lectern_db::{InMemoryVideoRepository, PgVideoRepository, VideoRepository};
use std::sync::Arc;
use std::time::Duration;

/// Postgres when `DATABASE_URL` is set, otherwise an in-memory store
pub async fn setup_repository(config: &Config) -> Result<(Arc<dyn VideoRepository>, DatabaseKind)> {
    match config.database_url() {
        Some(url) => {
            let pool = lectern_db::connect_and_migrate(
                url,
                config.db_max_connections(),
                Duration::from_secs(config.db_timeout_seconds()),
            )
            .await?;
            Ok((Arc::new(PgVideoRepository::new(pool)), DatabaseKind::Postgres))
        }
        None => {
            if config.is_production() {
                tracing::warn!("DATABASE_URL not set; notes are kept in memory and lost on restart");
            } else {
                tracing::info!("DATABASE_URL not set; using in-memory repository");
            }
            Ok((Arc::new(InMemoryVideoRepository::new()), DatabaseKind::InMemory))
        }
    }
}
