//! Key reference overlay

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::layout::centered_rect;
use crate::theme::Theme;

const KEYS: &[(&str, &str)] = &[
    ("j / k", "Move or scroll"),
    ("h / l", "Change a setting"),
    ("Enter", "Generate / submit / continue"),
    ("1-9", "Pick an answer"),
    ("c / g", "Comprehension or grammar questions"),
    ("t", "Try again with new questions"),
    ("r / Esc", "Back to settings"),
    ("n", "New story"),
    ("y", "Copy story"),
    (":", "Command (:level, :theme, :length, :quiz, :clear, :q)"),
    ("q", "Quit"),
];

pub fn draw(frame: &mut Frame, area: Rect, theme: &Theme) {
    let area = centered_rect(60, 70, area);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Keys ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.highlight))
        .style(Style::default().bg(theme.surface));

    let mut lines = vec![Line::from("")];
    lines.extend(KEYS.iter().map(|(key, action)| {
        Line::from(vec![
            Span::styled(
                format!("  {:<10}", key),
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
            ),
            Span::styled(*action, Style::default().fg(theme.text)),
        ])
    }));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("  Press any key to close", Style::default().fg(theme.text_muted))));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
