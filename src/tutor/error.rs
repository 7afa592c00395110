//! Errors surfaced by tutor actions

use thiserror::Error;

use super::Phase;
use crate::llm::LlmError;
use crate::quiz::{NormalizeError, StepError};

/// Everything a learner action can fail with
///
/// None of these end the session: the tutor is always left in its last
/// stable phase and the message is shown as a transient notice.
#[derive(Debug, Error)]
pub enum TutorError {
    /// A required selection is missing; never reaches the network
    #[error("{0}")]
    Validation(String),

    /// Gateway or parse failure while generating a story
    #[error("Failed to generate story: {0}")]
    GenerationFailed(String),

    /// Question reply could not be normalized
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    /// Transport failure, reported verbatim
    #[error(transparent)]
    Gateway(#[from] LlmError),

    /// Action not available in the current phase
    #[error("Cannot {action} while {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: Phase,
    },
}

impl From<StepError> for TutorError {
    fn from(err: StepError) -> Self {
        let message = match err {
            StepError::NoBatch => "No questions loaded".to_string(),
            StepError::NoSuchOption(i) => format!("There is no option {}", i + 1),
            StepError::NothingSelected => "Please select an answer".to_string(),
            StepError::AlreadyAnswered => "This question is already answered".to_string(),
            StepError::NotAnswered => "Submit an answer first".to_string(),
        };
        TutorError::Validation(message)
    }
}
