//! Database repositories for data access layer
//
// Repository trait and implementations
pub mod memory;
pub mod pool;
pub mod video;
//
pub use memory::InMemoryVideoRepository;
pub use pool::connect_and_migrate;
pub use video::{PgVideoRepository, VideoRepository};
