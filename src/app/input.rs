//! Key to action mapping

use crossterm::event::{KeyCode, KeyModifiers};

/// Actions that can be taken in the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Navigation
    Up,
    Down,
    Left,
    Right,
    Top,
    Bottom,
    PageUp,
    PageDown,

    // Selection
    Select,
    Back,
    /// Pick an option by its 0-based position
    Pick(usize),

    // Workflow
    Comprehension,
    Grammar,
    TryAgain,
    Reset,
    NewStory,
    CopyStory,

    // Modes
    Command,
    Help,
    Quit,
}

/// Keys shared by both keymaps
fn common_key_to_action(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Down => Some(Action::Down),
        KeyCode::Up => Some(Action::Up),
        KeyCode::Left => Some(Action::Left),
        KeyCode::Right => Some(Action::Right),
        KeyCode::Home => Some(Action::Top),
        KeyCode::End => Some(Action::Bottom),
        KeyCode::PageDown => Some(Action::PageDown),
        KeyCode::PageUp => Some(Action::PageUp),
        KeyCode::Tab => Some(Action::Down),
        KeyCode::BackTab => Some(Action::Up),
        KeyCode::Enter => Some(Action::Select),
        KeyCode::Esc => Some(Action::Back),
        KeyCode::Char(c @ '1'..='9') => Some(Action::Pick(c as usize - '1' as usize)),
        KeyCode::Char('c') => Some(Action::Comprehension),
        KeyCode::Char('g') => Some(Action::Grammar),
        KeyCode::Char('t') => Some(Action::TryAgain),
        KeyCode::Char('r') => Some(Action::Reset),
        KeyCode::Char('n') => Some(Action::NewStory),
        KeyCode::Char('y') => Some(Action::CopyStory),
        KeyCode::Char(':') => Some(Action::Command),
        KeyCode::Char('?') => Some(Action::Help),
        KeyCode::Char('q') => Some(Action::Quit),
        _ => None,
    }
}

/// Vim-style key mapping (basic, without modifiers)
pub fn vim_key_to_action(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Char('j') => Some(Action::Down),
        KeyCode::Char('k') => Some(Action::Up),
        KeyCode::Char('h') => Some(Action::Left),
        KeyCode::Char('l') => Some(Action::Right),
        KeyCode::Char('G') => Some(Action::Bottom),
        KeyCode::Char('d') => Some(Action::PageDown),
        KeyCode::Char('u') => Some(Action::PageUp),
        _ => common_key_to_action(key),
    }
}

/// Map a key press, honoring Ctrl combinations and the vim setting
pub fn key_to_action(key: KeyCode, modifiers: KeyModifiers, vim_mode: bool) -> Option<Action> {
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match key {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('d') | KeyCode::Char('f') => Some(Action::PageDown),
            KeyCode::Char('u') | KeyCode::Char('b') => Some(Action::PageUp),
            _ => None,
        };
    }
    if vim_mode { vim_key_to_action(key) } else { common_key_to_action(key) }
}
