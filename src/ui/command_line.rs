//! Status line: transient notices, phase hints and the `:` prompt

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::state::{CommandLineState, CommandMode};
use crate::theme::Theme;
use crate::tutor::Phase;

pub fn draw(frame: &mut Frame, area: Rect, state: &CommandLineState, phase: Phase, theme: &Theme) {
    let line = match state.mode {
        CommandMode::Command => prompt_line(&state.input, state.cursor, theme),
        CommandMode::Normal => match &state.message {
            Some(message) => notice_line(message, state.is_error, theme),
            None => Line::styled(phase_hint(phase), Style::default().fg(theme.text_muted)),
        },
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Keys worth knowing in `phase`
fn phase_hint(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle | Phase::Configuring => "←/→ change · Enter generate · : commands · ? help",
        Phase::GeneratingStory | Phase::GeneratingQuestions => "Waiting for the model...",
        Phase::StoryReady => "c comprehension · g grammar · n new story · : commands · ? help",
        Phase::Answering => "1-9 pick · Enter submit · r reset · ? help",
        Phase::Feedback => "Enter next question · r reset · ? help",
        Phase::Results => "t try again · n new story · r back · ? help",
    }
}

fn notice_line(message: &str, is_error: bool, theme: &Theme) -> Line<'static> {
    let (mark, color) = if is_error { ("✗ ", theme.error) } else { ("✓ ", theme.success) };
    Line::from(vec![
        Span::styled(mark, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled(message.to_string(), Style::default().fg(color)),
    ])
}

/// The `:` prompt with a block cursor at character `cursor` of `input`
fn prompt_line(input: &str, cursor: usize, theme: &Theme) -> Line<'static> {
    let typed = Style::default().fg(theme.accent);
    let split = input.char_indices().nth(cursor).map(|(i, _)| i).unwrap_or(input.len());
    let (before, rest) = input.split_at(split);
    let mut rest = rest.chars();
    let under = rest.next().unwrap_or(' ');

    let mut spans = vec![Span::styled(format!(":{}", before), typed)];
    spans.push(Span::styled(
        under.to_string(),
        Style::default().fg(theme.background).bg(theme.text).add_modifier(Modifier::BOLD),
    ));
    let after = rest.as_str();
    if !after.is_empty() {
        spans.push(Span::styled(after.to_string(), typed));
    }
    Line::from(spans)
}
