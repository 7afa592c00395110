//! Quiz panel overlay component

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, LineGauge, Paragraph, Wrap},
};

use super::layout::{centered_rect, draw_loading, key_hints};
use crate::app::state::AppState;
use crate::quiz::{Question, QuizSession};
use crate::theme::Theme;
use crate::tutor::{Phase, Tutor};

/// Draw the quiz panel as a centered overlay
pub fn draw(frame: &mut Frame, area: Rect, state: &AppState, tutor: &Tutor, theme: &Theme) {
    let overlay_area = centered_rect(76, 86, area);
    frame.render_widget(Clear, overlay_area);

    let kind = tutor.pending_kind().or(tutor.quiz().kind());
    let title = match (tutor.phase(), kind) {
        (Phase::GeneratingQuestions, _) => " Generating Questions... ".to_string(),
        (_, Some(kind)) => format!(" {} ", kind.title()),
        (_, None) => " Quiz ".to_string(),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.surface));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if tutor.phase() == Phase::GeneratingQuestions {
        let message = match kind {
            Some(kind) => format!("Writing {} questions...", kind),
            None => "Writing questions...".to_string(),
        };
        draw_loading(frame, inner, &message, state.tick, theme);
        return;
    }

    let quiz = tutor.quiz();
    let Some(question) = quiz.current() else {
        return;
    };

    let [progress_area, body_area, footer_area] =
        Layout::vertical([Constraint::Length(2), Constraint::Min(5), Constraint::Length(1)])
            .areas(inner);

    draw_progress(frame, progress_area, quiz, theme);
    draw_question(frame, body_area, quiz, question, theme);

    let hints = if quiz.answered() {
        let next = if quiz.is_last() { "See results" } else { "Next question" };
        vec![("Enter", next), ("Esc", "Stop")]
    } else {
        vec![("j/k", "Select"), ("1-9", "Pick"), ("Enter", "Submit"), ("Esc", "Stop")]
    };
    frame.render_widget(Paragraph::new(key_hints(&hints, theme)), footer_area);
}

/// Progress gauge with "Question i of n" and the running score
fn draw_progress(frame: &mut Frame, area: Rect, quiz: &QuizSession, theme: &Theme) {
    let score = quiz.score();
    let label = format!(
        "Question {} of {}   Score {}/{}",
        quiz.index() + 1,
        quiz.questions().len(),
        score.correct,
        score.total
    );

    let gauge = LineGauge::default()
        .ratio(quiz.progress().clamp(0.0, 1.0))
        .label(Span::styled(label, Style::default().fg(theme.text_muted)))
        .filled_style(Style::default().fg(theme.accent))
        .unfilled_style(Style::default().fg(theme.raised));
    frame.render_widget(gauge, area);
}

/// Draw the current question, marking options once answered
fn draw_question(
    frame: &mut Frame,
    area: Rect,
    quiz: &QuizSession,
    question: &Question,
    theme: &Theme,
) {
    let mut lines = vec![
        Line::from(Span::styled(
            question.prompt.clone(),
            Style::default().fg(theme.text_strong).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    let answered = quiz.answered();
    let correct_index = question.correct_option_index();

    for (i, option) in question.options.iter().enumerate() {
        let is_selected = quiz.selected() == Some(i);
        let is_correct = correct_index == Some(i);

        let (marker, style) = if answered && is_correct {
            ("✓", Style::default().fg(theme.success).bg(theme.correct_bg).add_modifier(Modifier::BOLD))
        } else if answered && is_selected {
            ("✗", Style::default().fg(theme.error).bg(theme.incorrect_bg))
        } else if is_selected {
            ("●", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        } else {
            ("○", Style::default().fg(theme.text))
        };

        lines.push(Line::from(Span::styled(format!("  {} {}. {}", marker, i + 1, option), style)));
    }

    if answered {
        if let Some(record) = quiz.results().last() {
            lines.push(Line::from(""));
            let verdict = if record.is_correct {
                Span::styled("Correct!", Style::default().fg(theme.success).add_modifier(Modifier::BOLD))
            } else {
                Span::styled(
                    format!("Incorrect. The answer is: {}", record.correct_answer),
                    Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
                )
            };
            lines.push(Line::from(verdict));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                record.explanation.clone(),
                Style::default().fg(theme.text),
            )));
        }
    }

    let para = Paragraph::new(lines).alignment(Alignment::Left).wrap(Wrap { trim: false });
    frame.render_widget(para, area);
}
