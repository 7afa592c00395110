//! Score and per-question review

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use super::layout::{centered_rect, key_hints, panel};
use crate::quiz::{AnswerRecord, ScoreBand};
use crate::theme::Theme;
use crate::tutor::Tutor;

pub fn draw(frame: &mut Frame, area: Rect, tutor: &Tutor, theme: &Theme) {
    let area = centered_rect(80, 94, area);
    let quiz = tutor.quiz();
    let title = match quiz.kind() {
        Some(kind) => format!(" {} Results ", kind.title()),
        None => " Results ".to_string(),
    };
    let block = panel(title, true, theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [score_area, review_area, footer_area] =
        Layout::vertical([Constraint::Length(5), Constraint::Min(3), Constraint::Length(1)])
            .areas(inner);

    let score = quiz.score();
    let band = score.band();
    let band_color = match band {
        ScoreBand::Excellent => theme.success,
        ScoreBand::Good => theme.warning,
        ScoreBand::NeedsPractice => theme.error,
    };

    let summary = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{}/{} correct ({:.0}%)", score.correct, score.total, score.percentage()),
            Style::default().fg(theme.text_strong).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(band.message(), Style::default().fg(band_color))),
    ];
    frame.render_widget(Paragraph::new(summary).alignment(Alignment::Center), score_area);

    let review: Vec<Line> = quiz
        .results()
        .iter()
        .enumerate()
        .flat_map(|(i, record)| review_lines(i, record, theme))
        .collect();
    frame.render_widget(Paragraph::new(review).wrap(Wrap { trim: false }), review_area);

    let hints = [("t", "Try again"), ("r", "Back to settings"), ("n", "New story")];
    frame.render_widget(Paragraph::new(key_hints(&hints, theme)), footer_area);
}

fn review_lines(index: usize, record: &AnswerRecord, theme: &Theme) -> Vec<Line<'static>> {
    let (marker, color) =
        if record.is_correct { ("✓", theme.success) } else { ("✗", theme.error) };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} Q{} ", marker, index + 1), Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(record.question.clone(), Style::default().fg(theme.text_strong)),
        ]),
        Line::from(vec![
            Span::styled("     Your answer: ", Style::default().fg(theme.text_muted)),
            Span::styled(record.user_answer.clone(), Style::default().fg(color)),
        ]),
    ];
    if !record.is_correct {
        lines.push(Line::from(vec![
            Span::styled("     Correct answer: ", Style::default().fg(theme.text_muted)),
            Span::styled(record.correct_answer.clone(), Style::default().fg(theme.success)),
        ]));
    }
    lines.push(Line::from(Span::styled(
        format!("     {}", record.explanation),
        Style::default().fg(theme.text),
    )));
    lines.push(Line::from(""));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(is_correct: bool) -> AnswerRecord {
        AnswerRecord {
            question: "Кто проснулся рано?".into(),
            user_answer: "Пётр".into(),
            correct_answer: "Иван".into(),
            is_correct,
            explanation: "Иван is the protagonist.".into(),
        }
    }

    #[test]
    fn wrong_answers_show_the_correct_one() {
        let theme = Theme::default();
        assert_eq!(review_lines(0, &record(false), &theme).len(), 5);
        assert_eq!(review_lines(0, &record(true), &theme).len(), 4);
    }
}
