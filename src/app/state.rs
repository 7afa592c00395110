//! Application state definitions

use crate::story::{CefrLevel, LengthBucket, THEMES};
use crate::tutor::{Phase, Selections};

/// Which screen is currently displayed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Screen {
    /// Level, theme and length pickers
    #[default]
    Configure,
    /// The story text
    Story,
    /// Story with the question overlay on top
    Quiz,
    /// Score and review
    Results,
}

impl Screen {
    /// The screen that shows a tutor phase
    pub fn for_phase(phase: Phase) -> Self {
        match phase {
            Phase::Idle | Phase::Configuring | Phase::GeneratingStory => Screen::Configure,
            Phase::StoryReady => Screen::Story,
            Phase::GeneratingQuestions | Phase::Answering | Phase::Feedback => Screen::Quiz,
            Phase::Results => Screen::Results,
        }
    }
}

/// Which picker has focus on the configure screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigureField {
    #[default]
    Level,
    Theme,
    Length,
}

impl ConfigureField {
    pub const ALL: [ConfigureField; 3] =
        [ConfigureField::Level, ConfigureField::Theme, ConfigureField::Length];

    pub fn label(&self) -> &'static str {
        match self {
            ConfigureField::Level => "Level",
            ConfigureField::Theme => "Theme",
            ConfigureField::Length => "Length",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ConfigureField::Level => ConfigureField::Theme,
            ConfigureField::Theme => ConfigureField::Length,
            ConfigureField::Length => ConfigureField::Level,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ConfigureField::Level => ConfigureField::Length,
            ConfigureField::Theme => ConfigureField::Level,
            ConfigureField::Length => ConfigureField::Theme,
        }
    }
}

/// Index after stepping `current` through a list of `len` items, wrapping
///
/// With nothing selected, forward lands on the first item and backward on
/// the last.
pub fn cycle(len: usize, current: Option<usize>, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    match (current, forward) {
        (None, true) => 0,
        (None, false) => len - 1,
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
    }
}

/// State for the configure screen
///
/// Only focus lives here; the values are the tutor's selections.
#[derive(Debug, Clone, Default)]
pub struct ConfigureState {
    pub focus: ConfigureField,
}

impl ConfigureState {
    pub fn next_level(selections: &Selections, forward: bool) -> CefrLevel {
        let all = CefrLevel::all();
        let current = all.iter().position(|l| *l == selections.level);
        all[cycle(all.len(), current, forward)]
    }

    pub fn next_theme(selections: &Selections, forward: bool) -> &'static str {
        let current = THEMES.iter().position(|t| *t == selections.theme);
        THEMES[cycle(THEMES.len(), current, forward)]
    }

    pub fn next_length(selections: &Selections, forward: bool) -> LengthBucket {
        let all = LengthBucket::all();
        let current = all.iter().position(|l| *l == selections.length);
        all[cycle(all.len(), current, forward)]
    }
}

/// Scroll state for the story text
#[derive(Debug, Clone, Default)]
pub struct StoryView {
    /// Current scroll position (lines from top)
    pub scroll_offset: usize,
    /// Total wrapped lines (updated on render)
    pub total_lines: usize,
    /// Visible height in lines (updated on render)
    pub visible_height: usize,
}

impl StoryView {
    /// Get the maximum allowed scroll offset
    pub fn max_scroll(&self) -> usize {
        self.total_lines.saturating_sub(self.visible_height)
    }

    /// Clamp scroll offset to valid range
    pub fn clamp_scroll(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta);
        self.clamp_scroll();
    }

    pub fn page(&self) -> isize {
        self.visible_height.max(1) as isize
    }
}

/// Command line mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommandMode {
    /// Command line hidden or showing status
    #[default]
    Normal,
    /// Accepting : commands
    Command,
}

/// State for the command line input
#[derive(Debug, Clone, Default)]
pub struct CommandLineState {
    /// Current mode
    pub mode: CommandMode,
    /// Input buffer
    pub input: String,
    /// Cursor position in input
    pub cursor: usize,
    /// Status/error message to display (when not in input mode)
    pub message: Option<String>,
    /// Whether message is an error
    pub is_error: bool,
    /// Command history
    pub history: Vec<String>,
    /// Current history index when navigating
    pub history_index: Option<usize>,
}

impl CommandLineState {
    /// Maximum number of history entries to keep
    const MAX_HISTORY: usize = 100;

    /// Start command mode
    pub fn enter_command_mode(&mut self) {
        self.mode = CommandMode::Command;
        self.input.clear();
        self.cursor = 0;
        self.message = None;
        self.history_index = None;
    }

    /// Exit input mode
    pub fn exit_input_mode(&mut self) {
        self.mode = CommandMode::Normal;
        self.input.clear();
        self.cursor = 0;
    }

    /// Set a status message
    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.is_error = false;
    }

    /// Set an error message
    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.is_error = true;
    }

    pub fn clear_message(&mut self) {
        self.message = None;
        self.is_error = false;
    }

    fn char_to_byte_index(&self, char_idx: usize) -> usize {
        self.input.char_indices().nth(char_idx).map(|(i, _)| i).unwrap_or(self.input.len())
    }

    fn char_count(&self) -> usize {
        self.input.chars().count()
    }

    /// Insert a character at cursor (cursor is character index)
    pub fn insert_char(&mut self, c: char) {
        let byte_idx = self.char_to_byte_index(self.cursor);
        self.input.insert(byte_idx, c);
        self.cursor += 1;
    }

    /// Delete character before cursor
    pub fn delete_char(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_idx = self.char_to_byte_index(self.cursor);
            self.input.remove(byte_idx);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    pub fn is_input_mode(&self) -> bool {
        self.mode == CommandMode::Command
    }

    /// Add to history
    pub fn add_to_history(&mut self, cmd: String) {
        if !cmd.is_empty() && self.history.last() != Some(&cmd) {
            if self.history.len() >= Self::MAX_HISTORY {
                self.history.remove(0);
            }
            self.history.push(cmd);
        }
    }

    /// Navigate history up
    pub fn history_up(&mut self) {
        if self.history.is_empty() {
            return;
        }
        self.history_index = match self.history_index {
            None => Some(self.history.len() - 1),
            Some(i) => Some(i.saturating_sub(1)),
        };
        if let Some(i) = self.history_index {
            self.input = self.history[i].clone();
            self.cursor = self.char_count();
        }
    }

    /// Navigate history down
    pub fn history_down(&mut self) {
        let Some(i) = self.history_index else {
            return;
        };
        if i + 1 < self.history.len() {
            self.history_index = Some(i + 1);
            self.input = self.history[i + 1].clone();
            self.cursor = self.char_count();
        } else {
            self.history_index = None;
            self.input.clear();
            self.cursor = 0;
        }
    }
}

/// Full application state outside the tutor
#[derive(Debug, Default)]
pub struct AppState {
    pub configure: ConfigureState,

    pub story_view: StoryView,

    /// Command line state
    pub command_line: CommandLineState,

    /// Help overlay visible
    pub show_help: bool,

    /// Frame counter for the loading spinner
    pub tick: usize,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn screen_follows_phase() {
        assert_eq!(Screen::for_phase(Phase::Idle), Screen::Configure);
        assert_eq!(Screen::for_phase(Phase::GeneratingStory), Screen::Configure);
        assert_eq!(Screen::for_phase(Phase::Configuring), Screen::Configure);
        assert_eq!(Screen::for_phase(Phase::StoryReady), Screen::Story);
        assert_eq!(Screen::for_phase(Phase::GeneratingQuestions), Screen::Quiz);
        assert_eq!(Screen::for_phase(Phase::Feedback), Screen::Quiz);
        assert_eq!(Screen::for_phase(Phase::Results), Screen::Results);
    }

    #[test]
    fn cycle_wraps_both_ways() {
        assert_eq!(cycle(3, Some(2), true), 0);
        assert_eq!(cycle(3, Some(0), false), 2);
        assert_eq!(cycle(3, None, true), 0);
        assert_eq!(cycle(3, None, false), 2);
        assert_eq!(cycle(0, None, true), 0);
    }

    #[test]
    fn theme_picker_starts_at_first_theme() {
        let selections = Selections::default();
        assert_eq!(ConfigureState::next_theme(&selections, true), THEMES[0]);

        let selections = Selections { theme: THEMES[0].to_string(), ..Default::default() };
        assert_eq!(ConfigureState::next_theme(&selections, true), THEMES[1]);
    }

    #[test]
    fn level_picker_wraps() {
        let selections = Selections { level: CefrLevel::C2, ..Default::default() };
        assert_eq!(ConfigureState::next_level(&selections, true), CefrLevel::A1);
        assert_eq!(ConfigureState::next_level(&selections, false), CefrLevel::C1);
    }

    #[test]
    fn story_scroll_is_clamped() {
        let mut view = StoryView { scroll_offset: 0, total_lines: 30, visible_height: 10 };
        view.scroll_by(50);
        assert_eq!(view.scroll_offset, 20);
        view.scroll_by(-100);
        assert_eq!(view.scroll_offset, 0);
    }

    #[test]
    fn insert_and_delete_multibyte() {
        let mut cmd = CommandLineState::default();
        cmd.enter_command_mode();
        for c in "тема".chars() {
            cmd.insert_char(c);
        }
        cmd.delete_char();
        assert_eq!(cmd.input, "тем");
        assert_eq!(cmd.cursor, 3);
    }

    #[test]
    fn history_navigation() {
        let mut cmd = CommandLineState::default();
        cmd.add_to_history("level a2".into());
        cmd.add_to_history("theme Food".into());
        cmd.add_to_history("theme Food".into());
        assert_eq!(cmd.history.len(), 2);

        cmd.history_up();
        assert_eq!(cmd.input, "theme Food");
        cmd.history_up();
        assert_eq!(cmd.input, "level a2");
        cmd.history_down();
        assert_eq!(cmd.input, "theme Food");
        cmd.history_down();
        assert_eq!(cmd.input, "");
    }
}
