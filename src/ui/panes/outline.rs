//! Scrollable outline panes: the syntax tree and the scope tree
//!
//! Both views are plain indented text produced by the debug renderers
//! ([`Node::render_annotated`] and [`SymbolTable::render`]); this module only
//! colors each row by what it describes.
//!
//! [`Node::render_annotated`]: crate::parser::ast::Node::render_annotated
//! [`SymbolTable::render`]: crate::semantic::scope::SymbolTable::render

use super::source::clamp_scroll;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

/// Which renderer produced the rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineKind {
    Ast,
    Scopes,
}

fn row_style(kind: OutlineKind, row: &str) -> Style {
    let text = row.trim_start();
    match kind {
        OutlineKind::Ast => {
            if text.starts_with("Stmt Def") {
                Style::default().fg(DEFAULT_THEME.function)
            } else if text.starts_with("Stmt") {
                Style::default().fg(DEFAULT_THEME.keyword)
            } else if text.starts_with("Param") {
                Style::default().fg(DEFAULT_THEME.type_name)
            } else if text.starts_with("List") {
                Style::default().fg(DEFAULT_THEME.comment)
            } else {
                Style::default().fg(DEFAULT_THEME.fg)
            }
        }
        OutlineKind::Scopes => {
            if text.starts_with("scope") {
                Style::default()
                    .fg(DEFAULT_THEME.scope)
                    .add_modifier(Modifier::BOLD)
            } else if text.starts_with("Function") {
                Style::default().fg(DEFAULT_THEME.function)
            } else if text.starts_with("Parameter") {
                Style::default().fg(DEFAULT_THEME.type_name)
            } else {
                Style::default().fg(DEFAULT_THEME.fg)
            }
        }
    }
}

/// Render one outline pane
#[allow(clippy::too_many_arguments)]
pub fn render_outline_pane(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    kind: OutlineKind,
    rows: &[String],
    empty_text: &str,
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
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(border_style);

    if rows.is_empty() {
        let paragraph = Paragraph::new(empty_text.to_string())
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    *scroll_offset = clamp_scroll(*scroll_offset, rows.len(), visible_height);

    let visible_items: Vec<ListItem> = rows
        .iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|row| ListItem::new(row.as_str()).style(row_style(kind, row)))
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}
