//! Story reading view

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use textwrap::{Options, wrap};

use super::layout::{key_hints, panel};
use crate::app::state::{AppState, StoryView};
use crate::story::Story;
use crate::theme::Theme;
use crate::tutor::Tutor;

/// Wrap story paragraphs to `width`, keeping blank lines between them
pub fn wrap_content(content: &str, width: usize) -> Vec<String> {
    let opts = Options::new(width.max(1));
    let mut lines = Vec::new();
    for paragraph in content.lines() {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
        } else {
            lines.extend(wrap(paragraph, &opts).into_iter().map(|s| s.to_string()));
        }
    }
    lines
}

pub fn draw(frame: &mut Frame, area: Rect, state: &mut AppState, tutor: &Tutor, theme: &Theme) {
    let Some(story) = tutor.story() else {
        return;
    };

    let block = panel(format!(" {} ", story.title), true, theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [meta_area, text_area, footer_area] =
        Layout::vertical([Constraint::Length(2), Constraint::Min(1), Constraint::Length(1)])
            .areas(inner);

    frame.render_widget(Paragraph::new(meta_line(story, theme)), meta_area);

    let width = text_area.width.saturating_sub(2) as usize;
    let lines = wrap_content(&story.content, width);
    update_view(&mut state.story_view, lines.len(), text_area.height as usize);

    let visible: Vec<Line> = lines
        .into_iter()
        .skip(state.story_view.scroll_offset)
        .take(text_area.height as usize)
        .map(|l| Line::from(Span::styled(format!(" {}", l), Style::default().fg(theme.text_strong))))
        .collect();
    frame.render_widget(Paragraph::new(visible), text_area);

    let hints = [
        ("j/k", "Scroll"),
        ("c", "Comprehension quiz"),
        ("g", "Grammar quiz"),
        ("n", "New story"),
        ("y", "Copy"),
    ];
    frame.render_widget(Paragraph::new(key_hints(&hints, theme)), footer_area);
}

fn meta_line(story: &Story, theme: &Theme) -> Line<'static> {
    let (min, max) = story.length.word_range();
    Line::from(vec![
        Span::styled(
            format!(" {} ", story.level.label()),
            Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("· {} · {} ({}-{} words) · {} words", story.theme, story.length, min, max, story.word_count()),
            Style::default().fg(theme.text_muted),
        ),
    ])
}

fn update_view(view: &mut StoryView, total_lines: usize, visible_height: usize) {
    view.total_lines = total_lines;
    view.visible_height = visible_height;
    view.clamp_scroll();
}
