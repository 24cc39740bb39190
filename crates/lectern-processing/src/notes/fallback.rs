use lectern_core::models::{KeyConcept, NotesResult, QuizItem};

pub const FALLBACK_TITLE: &str = "Lecture Notes";
const SUMMARY_CHARS: usize = 200;
const PLACEHOLDER_DEFINITION: &str = "Review the transcript for details on this topic.";

/// Deterministic notes used when generation or parsing fails
pub fn fallback_notes(transcript: &str) -> NotesResult {
    NotesResult {
        title: FALLBACK_TITLE.to_string(),
        summary: transcript.chars().take(SUMMARY_CHARS).collect(),
        key_concepts: (1..=3)
            .map(|i| KeyConcept {
                topic: format!("Topic {}", i),
                definition: PLACEHOLDER_DEFINITION.to_string(),
            })
            .collect(),
        quiz: vec![QuizItem {
            question: "What was discussed?".to_string(),
            options: vec!["Option A".to_string(), "Option B".to_string()],
            answer: "Option A".to_string(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_shape() {
        let notes = fallback_notes("short transcript");
        assert_eq!(notes.title, "Lecture Notes");
        assert_eq!(notes.summary, "short transcript");
        assert_eq!(notes.key_concepts.len(), 3);
        assert_eq!(notes.key_concepts[2].topic, "Topic 3");
        assert_eq!(notes.quiz.len(), 1);
        assert!(notes.answer_mismatches().is_empty());
    }

    #[test]
    fn test_summary_truncates_on_char_boundary() {
        let transcript = "é".repeat(300);
        let notes = fallback_notes(&transcript);
        assert_eq!(notes.summary.chars().count(), 200);
    }
}
