//! Application state shared by every handler

use lectern_core::Config;
use lectern_db::VideoRepository;
use lectern_processing::PipelineOrchestrator;
use std::sync::Arc;

/// Which document store backs the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseKind {
    Postgres,
    InMemory,
}

impl DatabaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseKind::Postgres => "postgres",
            DatabaseKind::InMemory => "memory",
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: Arc<PipelineOrchestrator>,
    pub repository: Arc<dyn VideoRepository>,
    pub database: DatabaseKind,
}
