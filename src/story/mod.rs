//! Stories: data model, prompts and the current-story holder

pub mod model;
pub mod prompt;
pub mod session;

pub use model::{CefrLevel, LengthBucket, Story, StoryDraft, THEMES};
pub use session::StorySession;
