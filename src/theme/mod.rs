//! Color themes
//!
//! Colors are named for what they mark on screen: the reading surface, the
//! text hierarchy, the quiz feedback. Two built-in palettes are selectable by
//! name from the config file; a full custom palette can also be supplied.

mod palettes;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// A color theme for the application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,

    /// Screen background
    pub background: Color,
    /// Panels, the status bar and the selected option
    pub surface: Color,
    /// Focused picker rows and progress track
    pub raised: Color,

    /// Story and option text
    pub text: Color,
    /// Titles and question prompts
    pub text_strong: Color,
    /// Hints, labels and placeholders
    pub text_muted: Color,

    /// Keys, the spinner and the active selection
    pub accent: Color,
    /// CEFR level badges and score headings
    pub highlight: Color,

    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,

    /// Row behind a correctly answered option
    pub correct_bg: Color,
    /// Row behind a wrongly chosen option
    pub incorrect_bg: Color,

    pub border: Color,
    pub border_focused: Color,
}

impl Theme {
    /// Names accepted by [`Theme::named`]
    pub const NAMES: [&'static str; 2] = [palettes::TOKYO_NIGHT, palettes::TOKYO_NIGHT_DAY];

    /// Look up a built-in palette, ignoring case
    pub fn named(name: &str) -> Option<Theme> {
        let name = name.trim();
        if name.eq_ignore_ascii_case(palettes::TOKYO_NIGHT) {
            Some(Theme::tokyo_night())
        } else if name.eq_ignore_ascii_case(palettes::TOKYO_NIGHT_DAY) {
            Some(Theme::tokyo_night_day())
        } else {
            None
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::tokyo_night()
    }
}
