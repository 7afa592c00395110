//! Layout utilities and common components

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::theme::Theme;

const SPINNER: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Spinner glyph for an animation tick
pub fn spinner(tick: usize) -> &'static str {
    SPINNER[(tick / 2) % SPINNER.len()]
}

/// Create a centered rectangle with the given percentage of width and height
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

/// Bordered block in the app style
pub fn panel<'a>(title: impl Into<Line<'a>>, focused: bool, theme: &Theme) -> Block<'a> {
    let border = if focused { theme.border_focused } else { theme.border };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(theme.background))
}

/// Centered spinner with a message
pub fn draw_loading(frame: &mut Frame, area: Rect, message: &str, tick: usize, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} {}", spinner(tick), message),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("This can take a little while.", Style::default().fg(theme.text_muted))),
    ];

    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), area);
}

/// Footer line of `[key] label` hints
pub fn key_hints(hints: &[(&str, &str)], theme: &Theme) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, (key, label)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("    "));
        }
        spans.push(Span::styled(format!("[{}]", key), Style::default().fg(theme.highlight)));
        spans.push(Span::styled(format!(" {}", label), Style::default().fg(theme.text_muted)));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(70, 70, outer);
        assert!(inner.x >= outer.x && inner.right() <= outer.right());
        assert!(inner.y >= outer.y && inner.bottom() <= outer.bottom());
        assert_eq!(inner.width, 70);
    }

    #[test]
    fn spinner_cycles() {
        assert_eq!(spinner(0), spinner(16));
        assert_ne!(spinner(0), spinner(2));
    }

    #[test]
    fn key_hints_spans() {
        let theme = Theme::default();
        let line = key_hints(&[("Enter", "Submit"), ("Esc", "Back")], &theme);
        assert_eq!(line.spans.len(), 5);
    }
}
