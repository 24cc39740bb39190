//! Tolerant parsing of model replies
//!
//! Replies are tried as raw JSON, then as the interior of a markdown fence, then as
//! the span from the first `{` to the last `}`. The first candidate that yields
//! complete notes wins.

use lectern_core::models::{KeyConcept, NotesResult, QuizItem};
use serde::Deserialize;

use super::fallback::FALLBACK_TITLE;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotesParseError {
    #[error("Reply contains no JSON object")]
    NoJson,

    #[error("Reply is not valid notes JSON: {0}")]
    InvalidJson(String),

    #[error("Notes have no key concepts")]
    MissingKeyConcepts,

    #[error("Notes have no quiz items")]
    MissingQuiz,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNotes {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default, alias = "key_concepts")]
    key_concepts: Vec<RawConcept>,
    #[serde(default)]
    quiz: Vec<RawQuizItem>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawConcept {
    Topic(String),
    Pair {
        topic: String,
        #[serde(default)]
        definition: String,
    },
}

#[derive(Debug, Deserialize)]
struct RawQuizItem {
    question: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    answer: String,
}

impl TryFrom<RawNotes> for NotesResult {
    type Error = NotesParseError;

    fn try_from(raw: RawNotes) -> Result<Self, Self::Error> {
        if raw.key_concepts.is_empty() {
            return Err(NotesParseError::MissingKeyConcepts);
        }
        if raw.quiz.is_empty() {
            return Err(NotesParseError::MissingQuiz);
        }

        let title = raw
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| FALLBACK_TITLE.to_string());

        Ok(NotesResult {
            title,
            summary: raw.summary.unwrap_or_default(),
            key_concepts: raw
                .key_concepts
                .into_iter()
                .map(|c| match c {
                    RawConcept::Topic(topic) => KeyConcept {
                        topic,
                        definition: String::new(),
                    },
                    RawConcept::Pair { topic, definition } => KeyConcept { topic, definition },
                })
                .collect(),
            quiz: raw
                .quiz
                .into_iter()
                .map(|q| QuizItem {
                    question: q.question,
                    options: q.options,
                    answer: q.answer,
                })
                .collect(),
        })
    }
}

/// Interior of the first ``` fence, without its language tag
fn fenced_block(raw: &str) -> Option<&str> {
    let open = raw.find("```")?;
    let rest = &raw[open + 3..];

    // A language tag is a word directly after the fence, ended by any whitespace
    let tag_len = rest
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(rest.len());
    let body = match rest[tag_len..].chars().next() {
        Some(c) if tag_len > 0 && c.is_whitespace() => &rest[tag_len..],
        _ => rest,
    };

    let close = body.find("```")?;
    Some(body[..close].trim())
}

fn brace_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

fn parse_candidate(candidate: &str) -> Result<NotesResult, NotesParseError> {
    let raw: RawNotes = serde_json::from_str(candidate)
        .map_err(|e| NotesParseError::InvalidJson(e.to_string()))?;
    NotesResult::try_from(raw)
}

pub fn parse_notes(reply: &str) -> Result<NotesResult, NotesParseError> {
    let trimmed = reply.trim();
    if !trimmed.contains('{') {
        return Err(NotesParseError::NoJson);
    }

    let candidates = [Some(trimmed), fenced_block(trimmed), brace_span(trimmed)];

    let mut last_error = NotesParseError::NoJson;
    for candidate in candidates.into_iter().flatten() {
        match parse_candidate(candidate) {
            Ok(notes) => return Ok(notes),
            Err(e) => last_error = e,
        }
    }

    Err(last_error)
}
