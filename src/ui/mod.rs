//! UI rendering components

pub mod command_line;
pub mod configure;
pub mod help;
pub mod layout;
pub mod quiz_panel;
pub mod results;
pub mod story;

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use crate::app::state::{AppState, Screen};
use crate::theme::Theme;
use crate::tutor::Tutor;

/// Main draw function
pub fn draw(frame: &mut Frame, state: &mut AppState, tutor: &Tutor, theme: &Theme) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(theme.background)), area);

    let [header_area, body_area, command_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1)])
            .areas(area);

    draw_header(frame, header_area, tutor, theme);

    match Screen::for_phase(tutor.phase()) {
        Screen::Configure => configure::draw(frame, body_area, state, tutor, theme),
        Screen::Story => story::draw(frame, body_area, state, tutor, theme),
        Screen::Quiz => {
            story::draw(frame, body_area, state, tutor, theme);
            quiz_panel::draw(frame, body_area, state, tutor, theme);
        }
        Screen::Results => results::draw(frame, body_area, tutor, theme),
    }

    if state.show_help {
        help::draw(frame, body_area, theme);
    }

    command_line::draw(frame, command_area, &state.command_line, tutor.phase(), theme);
}

/// Title bar with the current selections
fn draw_header(frame: &mut Frame, area: Rect, tutor: &Tutor, theme: &Theme) {
    let selections = tutor.selections();
    let theme_name = if selections.theme.is_empty() { "no theme" } else { &selections.theme };

    let line = Line::from(vec![
        Span::styled(
            " Skazka ",
            Style::default().fg(theme.background).bg(theme.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {} ", tutor.language()), Style::default().fg(theme.text_strong)),
        Span::styled(
            format!("· {} · {} · {}", selections.level, theme_name, selections.length),
            Style::default().fg(theme.text_muted),
        ),
        Span::styled(format!("   {}", tutor.phase()), Style::default().fg(theme.info)),
    ]);

    frame.render_widget(Paragraph::new(line).style(Style::default().bg(theme.surface)), area);
}
