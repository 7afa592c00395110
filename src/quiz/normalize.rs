//! Repair and validation of model replies
//!
//! Models wrap JSON in markdown fences, add chatter around it, pick their own
//! wrapper keys and drift on field casing. Everything here tolerates that and
//! either produces clean data or fails with a [`NormalizeError`].

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use super::error::NormalizeError;
use super::model::{Question, QuestionKind, lenient_match};
use crate::story::StoryDraft;

/// Explanation used when a candidate has no explanation field at all
pub const MISSING_EXPLANATION: &str = "No explanation provided.";

static LEADING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[A-Za-z0-9_-]*\s*").unwrap());
static TRAILING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*```\s*$").unwrap());

// Lowercase spellings come first and win when several are present.
const ID_KEYS: &[&str] = &["id", "Id", "ID"];
const QUESTION_KEYS: &[&str] = &["question", "Question", "question_text", "questionText"];
const OPTIONS_KEYS: &[&str] = &["options", "Options", "choices", "Choices"];
const ANSWER_KEYS: &[&str] =
    &["correctAnswer", "CorrectAnswer", "correct_answer", "Correct_Answer", "answer", "Answer"];
const EXPLANATION_KEYS: &[&str] = &["explanation", "Explanation"];
const TITLE_KEYS: &[&str] = &["title", "Title"];
const CONTENT_KEYS: &[&str] = &["content", "Content", "story", "Story", "text"];

/// Turn one model reply into a batch of questions tagged with `kind`
pub fn normalize_questions(raw: &str, kind: QuestionKind) -> Result<Vec<Question>, NormalizeError> {
    let value = extract_json(raw)?;
    let candidates = candidate_list(value)?;
    let total = candidates.len();

    // Ids are assigned after filtering, so they count accepted questions only
    let mut seen_ids = HashSet::new();
    let questions: Vec<Question> = candidates
        .iter()
        .enumerate()
        .filter_map(|(index, candidate)| coerce_question(index, candidate, kind))
        .enumerate()
        .map(|(index, mut question)| {
            if question.id.is_empty() {
                question.id = format!("q{}", index + 1);
            }
            while !seen_ids.insert(question.id.clone()) {
                question.id = format!("{}-{}", question.id, index + 1);
            }
            question
        })
        .collect();

    tracing::debug!(candidates = total, accepted = questions.len(), %kind, "Normalized questions");

    if questions.is_empty() {
        return Err(NormalizeError::EmptyBatch);
    }
    Ok(questions)
}

/// Pull `{title, content}` out of a story reply
pub fn parse_story_reply(raw: &str) -> Result<StoryDraft, NormalizeError> {
    let value = extract_json(raw)?;
    let Value::Object(obj) = value else {
        return Err(NormalizeError::IncompleteStory("title"));
    };

    let title = text_field(&obj, TITLE_KEYS).filter(|t| !t.is_empty());
    let content = text_field(&obj, CONTENT_KEYS).filter(|c| !c.is_empty());

    match (title, content) {
        (Some(title), Some(content)) => Ok(StoryDraft { title, content }),
        (None, _) => Err(NormalizeError::IncompleteStory("title")),
        (_, None) => Err(NormalizeError::IncompleteStory("content")),
    }
}

/// Recover a JSON value from a reply
///
/// Tries the reply as-is, then with a markdown fence removed, then the
/// outermost `[...]` span, then the outermost `{...}` span.
pub fn extract_json(raw: &str) -> Result<Value, NormalizeError> {
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        return Ok(unwrap_encoded(value));
    }

    let trimmed = raw.trim();
    let without_lead = LEADING_FENCE.replace(trimmed, "");
    let cleaned = TRAILING_FENCE.replace(&without_lead, "");

    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        return Ok(unwrap_encoded(value));
    }

    let spans = [span_between(&cleaned, '[', ']'), span_between(&cleaned, '{', '}')];
    for span in spans.into_iter().flatten() {
        if let Ok(value) = serde_json::from_str::<Value>(span) {
            return Ok(value);
        }
    }

    tracing::warn!(reply_len = raw.len(), "Could not recover JSON from model reply");
    Err(NormalizeError::Unparsable)
}

/// Some providers double-encode: the reply is a JSON string holding JSON
fn unwrap_encoded(value: Value) -> Value {
    if let Value::String(inner) = &value {
        if let Ok(decoded @ (Value::Array(_) | Value::Object(_))) = serde_json::from_str(inner) {
            return decoded;
        }
    }
    value
}

/// Slice from the first `open` to the last `close`, inclusive
fn span_between(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// The list of question candidates inside a parsed reply
fn candidate_list(value: Value) -> Result<Vec<Value>, NormalizeError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(map) => {
            let mut first_array = None;
            for (key, value) in map {
                if let Value::Array(items) = value {
                    if key == "questions" {
                        return Ok(items);
                    }
                    if first_array.is_none() {
                        first_array = Some(items);
                    }
                }
            }
            first_array.ok_or(NormalizeError::NoArrayFound)
        }
        _ => Err(NormalizeError::NoArrayFound),
    }
}

/// Build a question from one candidate, or `None` if it must be dropped
///
/// A missing id is left empty for the caller to number.
fn coerce_question(index: usize, candidate: &Value, kind: QuestionKind) -> Option<Question> {
    let position = index + 1;
    let Value::Object(obj) = candidate else {
        tracing::warn!(position, "Dropping question: not an object");
        return None;
    };

    let id = text_field(obj, ID_KEYS).unwrap_or_default();

    let Some(prompt) = text_field(obj, QUESTION_KEYS).filter(|q| !q.is_empty()) else {
        tracing::warn!(position, "Dropping question: missing question text");
        return None;
    };

    let options = field(obj, OPTIONS_KEYS).map(coerce_options).unwrap_or_default();
    if options.len() < 2 {
        tracing::warn!(position, options = options.len(), "Dropping question: fewer than 2 options");
        return None;
    }

    let Some(correct_answer) = text_field(obj, ANSWER_KEYS).filter(|a| !a.is_empty()) else {
        tracing::warn!(position, "Dropping question: missing correct answer");
        return None;
    };

    let explanation = match field(obj, EXPLANATION_KEYS) {
        None => MISSING_EXPLANATION.to_string(),
        Some(value) => match coerce_text(value).filter(|e| !e.is_empty()) {
            Some(explanation) => explanation,
            None => {
                tracing::warn!(position, "Dropping question: blank explanation");
                return None;
            }
        },
    };

    if !options.iter().any(|opt| lenient_match(opt, &correct_answer)) {
        tracing::warn!(position, %correct_answer, ?options, "Correct answer not found in options");
    }

    Some(Question { id, kind, prompt, options, correct_answer, explanation })
}

/// First present, non-null value under any of `keys`
fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| obj.get(*key).filter(|v| !v.is_null()))
}

fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    field(obj, keys).and_then(coerce_text)
}

/// Scalars become trimmed strings; containers do not
fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Options as a list, an `{"A": ..., "B": ...}` map, or one option per line
fn coerce_options(value: &Value) -> Vec<String> {
    let raw: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(coerce_text).collect(),
        Value::Object(map) => map.values().filter_map(coerce_text).collect(),
        Value::String(s) => s.lines().map(|line| line.trim().to_string()).collect(),
        _ => Vec::new(),
    };
    raw.into_iter().filter(|opt| !opt.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const ONE_QUESTION: &str = r#"[{"question":"Q1?","options":["A","B"],"correctAnswer":"A","explanation":"x"}]"#;

    #[test]
    fn parses_plain_array() {
        let questions = normalize_questions(ONE_QUESTION, QuestionKind::Comprehension).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, "q1");
        assert_eq!(questions[0].prompt, "Q1?");
        assert_eq!(questions[0].options, vec!["A", "B"]);
        assert_eq!(questions[0].kind, QuestionKind::Comprehension);
    }

    #[test]
    fn strips_fence_after_chatter() {
        let raw = "Sure! ```json\n[{\"question\":\"Q1?\",\"options\":[\"A\",\"B\"],\"correctAnswer\":\"A\",\"explanation\":\"x\"}]\n```";
        let questions = normalize_questions(raw, QuestionKind::Grammar).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, "q1");
        assert_eq!(questions[0].kind, QuestionKind::Grammar);
    }

    #[test]
    fn strips_leading_fence() {
        let raw = format!("```json\n{}\n```", ONE_QUESTION);
        assert_eq!(normalize_questions(&raw, QuestionKind::Grammar).unwrap().len(), 1);
    }

    #[test]
    fn finds_non_standard_wrapper_key() {
        let raw = r#"{"items":[{"question":"Q?","options":["A","B"],"correctAnswer":"B","explanation":"e"}]}"#;
        let questions = normalize_questions(raw, QuestionKind::Comprehension).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_answer, "B");
    }

    #[test]
    fn prefers_questions_key_over_earlier_arrays() {
        let raw = r#"{
            "notes": ["not", "questions"],
            "questions": [{"question":"Q?","options":["A","B"],"correctAnswer":"A","explanation":"e"}]
        }"#;
        let questions = normalize_questions(raw, QuestionKind::Comprehension).unwrap();
        assert_eq!(questions[0].prompt, "Q?");
    }

    #[test]
    fn first_array_wins_without_questions_key() {
        let raw = r#"{
            "meta": {"count": 1},
            "batch": [{"question":"First?","options":["A","B"],"correctAnswer":"A","explanation":"e"}],
            "extra": [{"question":"Second?","options":["A","B"],"correctAnswer":"A","explanation":"e"}]
        }"#;
        let questions = normalize_questions(raw, QuestionKind::Comprehension).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].prompt, "First?");
    }

    #[test]
    fn object_without_array_fails() {
        let err = normalize_questions(r#"{"answer": 42}"#, QuestionKind::Grammar).unwrap_err();
        assert_eq!(err, NormalizeError::NoArrayFound);

        let err = normalize_questions("42", QuestionKind::Grammar).unwrap_err();
        assert_eq!(err, NormalizeError::NoArrayFound);
    }

    #[test]
    fn garbage_is_unparsable() {
        let err = normalize_questions("I cannot help with that.", QuestionKind::Grammar).unwrap_err();
        assert_eq!(err, NormalizeError::Unparsable);

        let err = normalize_questions("[oops, {broken", QuestionKind::Grammar).unwrap_err();
        assert_eq!(err, NormalizeError::Unparsable);
    }

    #[test]
    fn all_rejected_is_empty_batch() {
        let raw = r#"[{"question":"","options":["A","B"],"correctAnswer":"A","explanation":"e"}]"#;
        assert_eq!(
            normalize_questions(raw, QuestionKind::Grammar).unwrap_err(),
            NormalizeError::EmptyBatch
        );
        assert_eq!(normalize_questions("[]", QuestionKind::Grammar).unwrap_err(), NormalizeError::EmptyBatch);
    }

    #[test]
    fn accepts_case_variant_fields() {
        let raw = r#"[{
            "Question": "  Who went to Moscow?  ",
            "Options": ["Masha", "Petya", 3],
            "correct_answer": "Masha",
            "Explanation": "First line."
        }]"#;
        let q = &normalize_questions(raw, QuestionKind::Comprehension).unwrap()[0];
        assert_eq!(q.prompt, "Who went to Moscow?");
        assert_eq!(q.options, vec!["Masha", "Petya", "3"]);
        assert_eq!(q.correct_answer, "Masha");
        assert_eq!(q.explanation, "First line.");
    }

    #[test]
    fn lowercase_field_wins_when_both_present() {
        let raw = r#"[{"question":"lower","Question":"upper","options":["A","B"],"correctAnswer":"A","CorrectAnswer":"B","explanation":"e"}]"#;
        let q = &normalize_questions(raw, QuestionKind::Comprehension).unwrap()[0];
        assert_eq!(q.prompt, "lower");
        assert_eq!(q.correct_answer, "A");
    }

    #[test]
    fn rejects_incomplete_candidates_and_keeps_the_rest() {
        let raw = r#"[
            {"question":"ok 1","options":["A","B"],"correctAnswer":"A","explanation":"e"},
            {"question":"one option","options":["A"],"correctAnswer":"A","explanation":"e"},
            {"question":"no answer","options":["A","B"],"explanation":"e"},
            {"question":"blank explanation","options":["A","B"],"correctAnswer":"A","explanation":"  "},
            "not an object",
            {"question":"ok 2","options":["A","B"],"correctAnswer":"B","explanation":"e"}
        ]"#;
        let questions = normalize_questions(raw, QuestionKind::Grammar).unwrap();
        let prompts: Vec<_> = questions.iter().map(|q| q.prompt.as_str()).collect();
        assert_eq!(prompts, vec!["ok 1", "ok 2"]);
        let ids: Vec<_> = questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2"]);
    }

    #[test]
    fn generated_ids_skip_past_given_ones() {
        let raw = r#"[
            {"question":"a","options":["A","B"],"correctAnswer":"A","explanation":"e"},
            {"id":"q1","question":"b","options":["A","B"],"correctAnswer":"A","explanation":"e"},
            {"id":"","question":"c","options":["A","B"],"correctAnswer":"A","explanation":"e"}
        ]"#;
        let questions = normalize_questions(raw, QuestionKind::Grammar).unwrap();
        let ids: Vec<_> = questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q1-2", "q3"]);
    }

    #[test]
    fn missing_explanation_gets_placeholder() {
        let raw = r#"[{"question":"Q?","options":["A","B"],"correctAnswer":"A"}]"#;
        let q = &normalize_questions(raw, QuestionKind::Grammar).unwrap()[0];
        assert_eq!(q.explanation, MISSING_EXPLANATION);
    }

    #[test]
    fn options_as_map_or_lines() {
        let raw = r#"[
            {"question":"map","options":{"A":"один","B":"два"},"correctAnswer":"один","explanation":"e"},
            {"question":"lines","options":"да\n\nнет\n","correctAnswer":"да","explanation":"e"}
        ]"#;
        let questions = normalize_questions(raw, QuestionKind::Grammar).unwrap();
        assert_eq!(questions[0].options, vec!["один", "два"]);
        assert_eq!(questions[1].options, vec!["да", "нет"]);
    }

    #[test]
    fn duplicate_ids_are_made_unique() {
        let raw = r#"[
            {"id":"q1","question":"a","options":["A","B"],"correctAnswer":"A","explanation":"e"},
            {"id":"q1","question":"b","options":["A","B"],"correctAnswer":"A","explanation":"e"}
        ]"#;
        let questions = normalize_questions(raw, QuestionKind::Grammar).unwrap();
        assert_eq!(questions[0].id, "q1");
        assert_ne!(questions[1].id, "q1");
    }

    #[test]
    fn numeric_ids_are_coerced() {
        let raw = r#"[{"id":7,"question":"a","options":["A","B"],"correctAnswer":"A","explanation":"e"}]"#;
        assert_eq!(normalize_questions(raw, QuestionKind::Grammar).unwrap()[0].id, "7");
    }

    #[test]
    fn mismatched_answer_is_kept() {
        let raw = r#"[{"question":"Q?","options":["A","B"],"correctAnswer":"Z","explanation":"e"}]"#;
        let q = &normalize_questions(raw, QuestionKind::Grammar).unwrap()[0];
        assert_eq!(q.correct_answer, "Z");
    }

    #[test]
    fn double_encoded_reply() {
        let raw = serde_json::to_string(ONE_QUESTION).unwrap();
        assert_eq!(normalize_questions(&raw, QuestionKind::Grammar).unwrap().len(), 1);
    }

    #[test]
    fn idempotent_on_own_output() {
        let raw = r#"Here you go:
        {"questions":[
            {"Question":" Кто? ","options":[" Иван ","Пётр"],"correct_answer":"иван","explanation":"e"},
            {"id":"x","question":"Где?","choices":{"a":"дома","b":"в школе"},"answer":"дома"}
        ]}"#;
        let first = normalize_questions(raw, QuestionKind::Comprehension).unwrap();
        let reserialized = serde_json::to_string(&first).unwrap();
        let second = normalize_questions(&reserialized, QuestionKind::Comprehension).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn story_reply_parses() {
        let draft = parse_story_reply(r#"{"title":" Утро ","content":"Иван проснулся."}"#).unwrap();
        assert_eq!(draft.title, "Утро");
        assert_eq!(draft.content, "Иван проснулся.");
    }

    #[test]
    fn fenced_story_reply_parses() {
        let raw = "```json\n{\"title\":\"Т\",\"content\":\"Текст\"}\n```";
        assert_eq!(parse_story_reply(raw).unwrap().title, "Т");
    }

    #[test]
    fn story_reply_requires_fields() {
        assert_eq!(
            parse_story_reply(r#"{"content":"Текст"}"#).unwrap_err(),
            NormalizeError::IncompleteStory("title")
        );
        assert_eq!(
            parse_story_reply(r#"{"title":"Т","content":"  "}"#).unwrap_err(),
            NormalizeError::IncompleteStory("content")
        );
        assert_eq!(parse_story_reply("no json here").unwrap_err(), NormalizeError::Unparsable);
    }
}
