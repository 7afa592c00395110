//! Story data model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Common European Framework of Reference proficiency tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CefrLevel {
    A1,
    A2,
    #[default]
    B1,
    B2,
    C1,
    C2,
}

impl CefrLevel {
    /// All levels, lowest first
    pub fn all() -> &'static [CefrLevel] {
        &[Self::A1, Self::A2, Self::B1, Self::B2, Self::C1, Self::C2]
    }

    /// Short code, e.g. "B1"
    pub fn code(&self) -> &'static str {
        match self {
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::C1 => "C1",
            Self::C2 => "C2",
        }
    }

    /// Human-readable label for pickers
    pub fn label(&self) -> &'static str {
        match self {
            Self::A1 => "A1 - Beginner",
            Self::A2 => "A2 - Elementary",
            Self::B1 => "B1 - Intermediate",
            Self::B2 => "B2 - Upper Intermediate",
            Self::C1 => "C1 - Advanced",
            Self::C2 => "C2 - Proficient",
        }
    }
}

impl fmt::Display for CefrLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CefrLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|level| level.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown level: {}. Options: A1, A2, B1, B2, C1, C2", s))
    }
}

/// Target story length
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthBucket {
    Short,
    #[default]
    Medium,
    Long,
}

impl LengthBucket {
    pub fn all() -> &'static [LengthBucket] {
        &[Self::Short, Self::Medium, Self::Long]
    }

    /// Target word count range, used as prompt guidance only
    pub fn word_range(&self) -> (u32, u32) {
        match self {
            Self::Short => (150, 200),
            Self::Medium => (300, 400),
            Self::Long => (500, 600),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }

    pub fn label(&self) -> String {
        let (min, max) = self.word_range();
        let name = match self {
            Self::Short => "Short",
            Self::Medium => "Medium",
            Self::Long => "Long",
        };
        format!("{} ({}-{} words)", name, min, max)
    }
}

impl fmt::Display for LengthBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LengthBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" | "s" => Ok(Self::Short),
            "medium" | "m" => Ok(Self::Medium),
            "long" | "l" => Ok(Self::Long),
            _ => Err(format!("Unknown length: {}. Options: short, medium, long", s)),
        }
    }
}

/// Suggested story themes
pub const THEMES: &[&str] = &[
    "Daily Life",
    "Travel",
    "Food",
    "Family",
    "Work",
    "Hobbies",
    "Nature",
    "History",
    "Culture",
    "Technology",
    "Sports",
    "Art",
    "Science",
];

/// A generated story
///
/// `level`, `theme` and `length` always record what was requested, never
/// anything the model echoed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub title: String,
    pub content: String,
    pub level: CefrLevel,
    pub theme: String,
    pub length: LengthBucket,
}

impl Story {
    /// Approximate word count of the story body
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// Title and body parsed from a model reply, before request data is attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryDraft {
    pub title: String,
    pub content: String,
}

impl StoryDraft {
    /// Attach the request's selections
    pub fn into_story(self, level: CefrLevel, theme: &str, length: LengthBucket) -> Story {
        Story { title: self.title, content: self.content, level, theme: theme.to_string(), length }
    }
}
