//! Study-notes generation
//!
//! A single text-generation call produces JSON-shaped notes. The reply is parsed
//! tolerantly; when generation or parsing fails the caller substitutes the
//! deterministic fallback and flags the outcome as degraded.

mod cleaner;
mod fallback;
mod generator;
mod parser;
mod prompt;

pub use cleaner::TranscriptCleaner;
pub use fallback::{fallback_notes, FALLBACK_TITLE};
pub use generator::{NoteGenerator, NotesError, NotesOutcome};
pub use parser::{parse_notes, NotesParseError};
pub use prompt::{cleanup_prompt, notes_prompt};
