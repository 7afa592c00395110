//! Holder for the single current story

use super::model::Story;

/// Owns the current story, if any
///
/// A story is only ever replaced wholesale.
#[derive(Debug, Clone, Default)]
pub struct StorySession {
    current: Option<Story>,
}

impl StorySession {
    pub fn new(current: Option<Story>) -> Self {
        Self { current }
    }

    /// The current story
    pub fn current(&self) -> Option<&Story> {
        self.current.as_ref()
    }

    pub fn has_story(&self) -> bool {
        self.current.is_some()
    }

    /// Replace the current story, returning the previous one
    pub fn replace(&mut self, story: Story) -> Option<Story> {
        self.current.replace(story)
    }

    /// Drop the current story
    pub fn clear(&mut self) -> Option<Story> {
        self.current.take()
    }
}
