//! Quiz data model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What a question batch tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Comprehension,
    Grammar,
}

impl QuestionKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Comprehension => "comprehension",
            Self::Grammar => "grammar",
        }
    }

    /// Panel heading for a batch of this kind
    pub fn title(&self) -> &'static str {
        match self {
            Self::Comprehension => "Comprehension Questions",
            Self::Grammar => "Grammar Practice",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "comprehension" | "c" => Ok(Self::Comprehension),
            "grammar" | "g" => Ok(Self::Grammar),
            _ => Err(format!("Unknown question kind: {}. Options: comprehension, grammar", s)),
        }
    }
}

/// A multiple-choice question
///
/// Serialized with the field names the model is asked to produce, so a batch
/// can be fed back through the normalizer unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique within a batch
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(rename = "question")]
    pub prompt: String,
    /// Display order, at least two
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
}

impl Question {
    /// Whether `answer` counts as correct under lenient matching
    pub fn accepts(&self, answer: &str) -> bool {
        lenient_match(answer, &self.correct_answer)
    }

    /// Index of the first option that leniently matches the correct answer
    pub fn correct_option_index(&self) -> Option<usize> {
        self.options.iter().position(|opt| self.accepts(opt))
    }
}

/// Case-insensitive, substring-tolerant comparison
///
/// Both sides are trimmed and lowercased; they match when equal or when
/// either contains the other. An option that is a substring of another
/// option can therefore match too.
pub fn lenient_match(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    a == b || a.contains(&b) || b.contains(&a)
}

/// One submitted answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub explanation: String,
}

/// Running score for the current batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizScore {
    pub correct: u32,
    pub total: u32,
}

impl QuizScore {
    /// Count one answer
    pub fn record(&mut self, is_correct: bool) {
        self.total += 1;
        if is_correct {
            self.correct += 1;
        }
    }

    /// Percentage correct (0 when nothing answered)
    pub fn percentage(&self) -> f32 {
        if self.total == 0 { 0.0 } else { self.correct as f32 * 100.0 / self.total as f32 }
    }

    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_percentage(self.percentage())
    }
}

/// Coarse result grouping used to pick the results copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    /// 80% and above
    Excellent,
    /// 60% to 80%
    Good,
    /// Below 60%
    NeedsPractice,
}

impl ScoreBand {
    pub fn from_percentage(pct: f32) -> Self {
        if pct >= 80.0 {
            Self::Excellent
        } else if pct >= 60.0 {
            Self::Good
        } else {
            Self::NeedsPractice
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent work! You understood this story very well.",
            Self::Good => "Good job! A few points are worth another look.",
            Self::NeedsPractice => "Keep practicing! Re-read the story and try again.",
        }
    }
}
