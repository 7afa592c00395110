//! Level, theme and length pickers

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use super::layout::{centered_rect, draw_loading, key_hints, panel};
use crate::app::state::{AppState, ConfigureField};
use crate::theme::Theme;
use crate::tutor::{Phase, Tutor};

pub fn draw(frame: &mut Frame, area: Rect, state: &AppState, tutor: &Tutor, theme: &Theme) {
    let area = centered_rect(70, 80, area);
    let block = panel(" New Story ", true, theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if tutor.phase() == Phase::GeneratingStory {
        draw_loading(frame, inner, "Writing your story...", state.tick, theme);
        return;
    }

    let [fields_area, footer_area] =
        Layout::vertical([Constraint::Min(8), Constraint::Length(3)]).areas(inner);

    let selections = tutor.selections();
    let mut lines = vec![Line::from("")];

    for field in ConfigureField::ALL {
        let focused = field == state.configure.focus;
        let (value, placeholder) = match field {
            ConfigureField::Level => (selections.level.label().to_string(), false),
            ConfigureField::Theme if selections.theme.is_empty() => {
                ("choose a theme".to_string(), true)
            }
            ConfigureField::Theme => (selections.theme.clone(), false),
            ConfigureField::Length => (selections.length.label(), false),
        };

        let label_style = if focused {
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text_muted)
        };
        let value_style = match (focused, placeholder) {
            (_, true) => Style::default().fg(theme.warning).add_modifier(Modifier::ITALIC),
            (true, false) => Style::default().fg(theme.text_strong).add_modifier(Modifier::BOLD),
            (false, false) => Style::default().fg(theme.text),
        };
        let (left, right) = if focused { ("◀ ", " ▶") } else { ("  ", "  ") };

        lines.push(Line::from(vec![
            Span::styled(if focused { " › " } else { "   " }, label_style),
            Span::styled(format!("{:<8}", field.label()), label_style),
            Span::styled(left, Style::default().fg(theme.highlight)),
            Span::styled(value, value_style),
            Span::styled(right, Style::default().fg(theme.highlight)),
        ]));
        lines.push(Line::from(""));
    }

    if let Some(story) = tutor.story() {
        lines.push(Line::from(vec![
            Span::styled("   Current story: ", Style::default().fg(theme.text_muted)),
            Span::styled(story.title.clone(), Style::default().fg(theme.text_strong)),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), fields_area);

    let mut hints = vec![("j/k", "Field"), ("h/l", "Change"), ("Enter", "Generate")];
    if tutor.story().is_some() {
        hints.extend([("Esc", "Back to story"), ("c/g", "Quiz")]);
    }
    let footer = vec![Line::from(""), key_hints(&hints, theme)];
    frame.render_widget(Paragraph::new(footer), footer_area);
}
