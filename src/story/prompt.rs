//! Prompt construction for stories and question batches

use super::model::{CefrLevel, LengthBucket, Story};
use crate::quiz::QuestionKind;

/// Number of questions requested per batch
pub const BATCH_SIZE: usize = 5;

/// Prompt asking for a story as a `{title, content}` JSON object
pub fn story_prompt(language: &str, theme: &str, level: CefrLevel, length: LengthBucket) -> String {
    let (min_words, max_words) = length.word_range();
    format!(
        "Generate a {language} short story with the following specifications:
- Theme: {theme}
- CEFR Level: {level}
- Length: {length} ({min_words}-{max_words} words)

Requirements:
- Write entirely in {language}
- Match the vocabulary and grammar complexity to {level} level
- Include cultural references appropriate for {language} language learners
- Create an engaging narrative with clear characters and plot
- Use grammar structures typical for {level} level

Return the response as JSON with this structure:
{{
  \"title\": \"Story title in {language}\",
  \"content\": \"Full story content in {language}\"
}}"
    )
}

/// Prompt asking for exactly [`BATCH_SIZE`] questions about `story`
pub fn questions_prompt(language: &str, story: &Story, kind: QuestionKind) -> String {
    let focus = match kind {
        QuestionKind::Comprehension => {
            "Generate comprehension questions about the story content, characters, plot, and \
             meaning. Questions should test understanding of what happened in the story."
        }
        QuestionKind::Grammar => {
            "Generate grammar questions focusing on specific grammar constructs used in this \
             story. Identify grammar patterns, verb forms, case usage, etc. that appear in the \
             text and create questions about them."
        }
    };

    format!(
        "Based on this {language} story, generate exactly {BATCH_SIZE} {kind} questions.

Story: {content}
Level: {level}

{focus}

IMPORTANT: Return a JSON object with a \"questions\" array of exactly {BATCH_SIZE} question objects. \
Each question object must have these exact fields:

{{
  \"id\": \"unique string like q1, q2, etc\",
  \"question\": \"the question text in English\",
  \"options\": [\"option A\", \"option B\", \"option C\", \"option D\"],
  \"correctAnswer\": \"exact text that matches one of the options above\",
  \"explanation\": \"detailed explanation of the correct answer\"
}}

Example format:
{{
  \"questions\": [
    {{
      \"id\": \"q1\",
      \"question\": \"What is the main character's name?\",
      \"options\": [\"Ivan\", \"Peter\", \"Alexei\", \"Dmitri\"],
      \"correctAnswer\": \"Ivan\",
      \"explanation\": \"The story mentions Ivan as the protagonist in the first paragraph.\"
    }}
  ]
}}

Return ONLY the JSON, no other text.",
        content = story.content,
        level = story.level,
    )
}
