//! Quiz questions: data model, reply normalization and batch progress

pub mod error;
pub mod model;
pub mod normalize;
pub mod session;

pub use error::NormalizeError;
pub use model::{AnswerRecord, Question, QuestionKind, QuizScore, ScoreBand, lenient_match};
pub use normalize::{normalize_questions, parse_story_reply};
pub use session::{Advance, QuizSession, StepError};
