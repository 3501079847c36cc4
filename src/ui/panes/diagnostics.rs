//! Diagnostics pane: every lex, parse and semantic error of the run

use super::source::clamp_scroll;
use crate::driver::{Diagnostic, Stage};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

fn stage_style(stage: Stage) -> Style {
    let bg = match stage {
        Stage::Lex | Stage::Parse => DEFAULT_THEME.error,
        Stage::Semantic => DEFAULT_THEME.secondary,
    };
    Style::default()
        .bg(bg)
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD)
}

/// Render the diagnostics list; `selected` is highlighted.
pub fn render_diagnostics_pane(
    frame: &mut Frame,
    area: Rect,
    diagnostics: &[Diagnostic],
    selected: usize,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(format!(" Diagnostics ({}) ", diagnostics.len()))
        .borders(Borders::ALL)
        .border_style(border_style);

    if diagnostics.is_empty() {
        let paragraph = Paragraph::new("No problems found")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.success));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    // Keep the selection on screen
    if selected < *scroll_offset {
        *scroll_offset = selected;
    } else if selected >= *scroll_offset + visible_height {
        *scroll_offset = selected + 1 - visible_height;
    }
    *scroll_offset = clamp_scroll(*scroll_offset, diagnostics.len(), visible_height);

    let items: Vec<ListItem> = diagnostics
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(idx, diag)| {
            let mut text_style = Style::default().fg(DEFAULT_THEME.fg);
            if idx == selected {
                text_style = text_style.bg(DEFAULT_THEME.current_line_bg);
            }
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {} ", diag.stage), stage_style(diag.stage)),
                Span::styled(format!(" {}", diag.message), text_style),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
