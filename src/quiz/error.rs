//! Errors from turning model replies into quiz data

use thiserror::Error;

/// Why a model reply could not be turned into a story or question batch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// No JSON could be recovered from the reply
    #[error("Unable to parse model response as JSON")]
    Unparsable,

    /// The JSON holds no array of question candidates
    #[error("Model response contains no list of questions")]
    NoArrayFound,

    /// Every candidate was rejected
    #[error("No valid questions found in model response")]
    EmptyBatch,

    /// A story reply lacked a required field
    #[error("Story response is missing a non-empty \"{0}\"")]
    IncompleteStory(&'static str),
}
