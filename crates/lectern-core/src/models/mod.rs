pub mod notes;
pub mod upload;
pub mod video;

pub use notes::{KeyConcept, NotesResult, QuizItem};
pub use upload::{UploadRequest, VideoSource};
pub use video::{NewVideo, PersistedVideo, VideoSummary};
