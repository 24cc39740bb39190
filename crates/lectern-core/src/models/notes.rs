use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct KeyConcept {
    pub topic: String,
    pub definition: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QuizItem {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl QuizItem {
    /// `answer` is expected to be one of `options`; violations are a data-quality warning.
    pub fn answer_in_options(&self) -> bool {
        self.options.iter().any(|o| o == &self.answer)
    }
}

/// Structured study notes generated from a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotesResult {
    pub title: String,
    pub summary: String,
    pub key_concepts: Vec<KeyConcept>,
    pub quiz: Vec<QuizItem>,
}

impl NotesResult {
    /// Indices of quiz items whose answer is not among their options
    pub fn answer_mismatches(&self) -> Vec<usize> {
        self.quiz
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.answer_in_options())
            .map(|(i, _)| i)
            .collect()
    }
}
