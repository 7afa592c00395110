//! Built-in palettes

use ratatui::style::Color;

use super::Theme;

pub(super) const TOKYO_NIGHT: &str = "Tokyo Night";
pub(super) const TOKYO_NIGHT_DAY: &str = "Tokyo Night Day";

impl Theme {
    /// Dark palette, the default
    pub fn tokyo_night() -> Self {
        Theme {
            name: TOKYO_NIGHT.to_string(),
            background: Color::Rgb(26, 27, 38), // #1a1b26
            surface: Color::Rgb(36, 40, 59),    // #24283b
            raised: Color::Rgb(65, 72, 104),    // #414868
            text: Color::Rgb(169, 177, 214),        // #a9b1d6
            text_strong: Color::Rgb(192, 202, 245), // #c0caf5
            text_muted: Color::Rgb(86, 95, 137),    // #565f89
            accent: Color::Rgb(122, 162, 247),    // #7aa2f7
            highlight: Color::Rgb(187, 154, 247), // #bb9af7
            success: Color::Rgb(158, 206, 106), // #9ece6a
            warning: Color::Rgb(224, 175, 104), // #e0af68
            error: Color::Rgb(247, 118, 142),   // #f7768e
            info: Color::Rgb(125, 207, 255),    // #7dcfff
            correct_bg: Color::Rgb(32, 48, 42),   // #20302a
            incorrect_bg: Color::Rgb(55, 34, 44), // #37222c
            border: Color::Rgb(65, 72, 104),
            border_focused: Color::Rgb(122, 162, 247),
        }
    }

    /// Light palette for bright terminals
    pub fn tokyo_night_day() -> Self {
        Theme {
            name: TOKYO_NIGHT_DAY.to_string(),
            background: Color::Rgb(225, 226, 231), // #e1e2e7
            surface: Color::Rgb(208, 213, 227),    // #d0d5e3
            raised: Color::Rgb(196, 200, 218),     // #c4c8da
            text: Color::Rgb(55, 96, 191),        // #3760bf
            text_strong: Color::Rgb(52, 59, 88),  // #343b58
            text_muted: Color::Rgb(132, 140, 181), // #848cb5
            accent: Color::Rgb(46, 125, 233),   // #2e7de9
            highlight: Color::Rgb(152, 84, 241), // #9854f1
            success: Color::Rgb(88, 117, 57),  // #587539
            warning: Color::Rgb(140, 108, 62), // #8c6c3e
            error: Color::Rgb(245, 42, 101),   // #f52a65
            info: Color::Rgb(0, 113, 151),     // #007197
            correct_bg: Color::Rgb(213, 229, 208),   // #d5e5d0
            incorrect_bg: Color::Rgb(242, 213, 220), // #f2d5dc
            border: Color::Rgb(168, 174, 203),
            border_focused: Color::Rgb(46, 125, 233),
        }
    }
}
