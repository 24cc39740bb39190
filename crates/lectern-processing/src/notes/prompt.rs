/// Prompt asking for notes in the exact JSON shape `parse_notes` expects
pub fn notes_prompt(transcript: &str) -> String {
    format!(
        r#"You are an educational assistant. From the lecture transcript below, generate study notes as valid JSON with exactly these fields:
{{
  "title": "a descriptive title for the lecture",
  "summary": "a concise summary of the lecture in 3-5 sentences",
  "keyConcepts": [
    {{"topic": "concept name", "definition": "one or two sentence explanation"}}
  ],
  "quiz": [
    {{"question": "a multiple-choice question", "options": ["option 1", "option 2", "option 3", "option 4"], "answer": "the correct option, copied exactly from options"}}
  ]
}}

Rules:
- keyConcepts must contain exactly 5 entries.
- quiz must contain 2 or 3 questions.
- Every answer must be one of its options.

Transcript:
{transcript}

Return ONLY the JSON object, no other text."#
    )
}

/// Prompt asking for a punctuation and grammar pass that keeps the wording
pub fn cleanup_prompt(transcript: &str) -> String {
    format!(
        r#"Fix the punctuation, capitalization and obvious grammar mistakes in the following lecture transcript. Keep the speaker's wording and meaning. Do not summarize, shorten or add commentary.

Transcript:
{transcript}

Return ONLY the corrected transcript."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_are_deterministic_and_embed_transcript() {
        let a = notes_prompt("photosynthesis converts light");
        let b = notes_prompt("photosynthesis converts light");
        assert_eq!(a, b);
        assert!(a.contains("photosynthesis converts light"));
        assert!(a.contains("\"keyConcepts\""));
        assert!(a.contains("exactly 5"));

        assert!(cleanup_prompt("um so yeah").contains("um so yeah"));
    }
}
