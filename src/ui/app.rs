//! Main TUI application state and logic

use crate::driver::{Compilation, Diagnostic};
use crate::ui::panes::{self, OutlineKind};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

const PAGE: usize = 10;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Ast,
    Scopes,
    Diagnostics,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: source -> ast -> scopes -> diagnostics)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Ast,
            FocusedPane::Ast => FocusedPane::Scopes,
            FocusedPane::Scopes => FocusedPane::Diagnostics,
            FocusedPane::Diagnostics => FocusedPane::Source,
        }
    }

    /// Move focus to the previous pane (counter-clockwise)
    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Diagnostics,
            FocusedPane::Ast => FocusedPane::Source,
            FocusedPane::Scopes => FocusedPane::Ast,
            FocusedPane::Diagnostics => FocusedPane::Scopes,
        }
    }
}

/// The main application state
pub struct App {
    pub source_code: String,
    pub file_name: String,

    /// Pre-rendered views of the compilation
    pub ast_rows: Vec<String>,
    pub scope_rows: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub error_lines: Vec<usize>,

    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub source_scroll: usize,
    pub ast_scroll: usize,
    pub scopes_scroll: usize,
    pub diagnostics_scroll: usize,

    /// Index into `diagnostics`
    pub selected_diagnostic: usize,

    pub should_quit: bool,
    pub status_message: String,
}

impl App {
    pub fn new(source_code: String, file_name: String, compilation: &Compilation) -> Self {
        let ast_rows = match (&compilation.ast, &compilation.resolution) {
            (Some(ast), Some(_)) => lines_of(&ast.render_annotated()),
            (Some(ast), None) => lines_of(&ast.render()),
            (None, _) => Vec::new(),
        };
        let scope_rows = compilation
            .resolution
            .as_ref()
            .map(|r| lines_of(&r.table.render()))
            .unwrap_or_default();
        let diagnostics = compilation.diagnostics();

        let status_message = if diagnostics.is_empty() {
            format!("{} node(s), {} scope(s)", count_nodes(compilation), count_scopes(compilation))
        } else {
            "Select a diagnostic to jump to its line".to_string()
        };

        App {
            source_code,
            file_name,
            ast_rows,
            scope_rows,
            error_lines: compilation.error_lines(),
            diagnostics,
            focused_pane: FocusedPane::Source,
            source_scroll: 0,
            ast_scroll: 0,
            scopes_scroll: 0,
            diagnostics_scroll: 0,
            selected_diagnostic: 0,
            should_quit: false,
            status_message,
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(main_chunks[0]);

        // Left column: Source (top) | Diagnostics (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[0]);

        // Right column: AST (top) | Scopes (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[1]);

        let selected_line = self.selected_line();
        panes::render_source_pane(
            frame,
            left_rows[0],
            &self.source_code,
            &self.error_lines,
            selected_line,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        panes::render_diagnostics_pane(
            frame,
            left_rows[1],
            &self.diagnostics,
            self.selected_diagnostic,
            self.focused_pane == FocusedPane::Diagnostics,
            &mut self.diagnostics_scroll,
        );

        panes::render_outline_pane(
            frame,
            right_rows[0],
            "Syntax Tree",
            OutlineKind::Ast,
            &self.ast_rows,
            "(no tree: parsing failed)",
            self.focused_pane == FocusedPane::Ast,
            &mut self.ast_scroll,
        );

        panes::render_outline_pane(
            frame,
            right_rows[1],
            "Scopes",
            OutlineKind::Scopes,
            &self.scope_rows,
            "(not resolved)",
            self.focused_pane == FocusedPane::Scopes,
            &mut self.scopes_scroll,
        );

        panes::render_status_bar(
            frame,
            main_chunks[1],
            &self.file_name,
            &self.status_message,
            self.diagnostics.len(),
        );
    }

    /// Source line of the selected diagnostic, if it has one.
    fn selected_line(&self) -> Option<usize> {
        self.diagnostics
            .get(self.selected_diagnostic)
            .and_then(|d| d.line)
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Up => self.scroll_up(1),
            KeyCode::Down => self.scroll_down(1),
            KeyCode::PageUp => self.scroll_up(PAGE),
            KeyCode::PageDown => self.scroll_down(PAGE),
            KeyCode::Home => {
                *self.focused_scroll() = 0;
                if self.focused_pane == FocusedPane::Diagnostics {
                    self.select_diagnostic(0);
                }
            }
            _ => {}
        }
    }

    fn focused_scroll(&mut self) -> &mut usize {
        match self.focused_pane {
            FocusedPane::Source => &mut self.source_scroll,
            FocusedPane::Ast => &mut self.ast_scroll,
            FocusedPane::Scopes => &mut self.scopes_scroll,
            FocusedPane::Diagnostics => &mut self.diagnostics_scroll,
        }
    }

    fn scroll_up(&mut self, by: usize) {
        if self.focused_pane == FocusedPane::Diagnostics {
            self.select_diagnostic(self.selected_diagnostic.saturating_sub(by));
        } else {
            let scroll = self.focused_scroll();
            *scroll = scroll.saturating_sub(by);
        }
    }

    // Renderers clamp the offset, so overshooting here is harmless
    fn scroll_down(&mut self, by: usize) {
        if self.focused_pane == FocusedPane::Diagnostics {
            self.select_diagnostic(self.selected_diagnostic.saturating_add(by));
        } else {
            let scroll = self.focused_scroll();
            *scroll = scroll.saturating_add(by);
        }
    }

    /// Select a diagnostic and bring its line into view in the source pane.
    fn select_diagnostic(&mut self, index: usize) {
        if self.diagnostics.is_empty() {
            return;
        }
        self.selected_diagnostic = index.min(self.diagnostics.len() - 1);
        let diagnostic = &self.diagnostics[self.selected_diagnostic];
        if let Some(line) = diagnostic.line {
            self.source_scroll = line.saturating_sub(3);
            self.status_message = format!("Line {}", line);
        } else {
            self.status_message = "No line information".to_string();
        }
    }
}

fn lines_of(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

fn count_nodes(compilation: &Compilation) -> usize {
    compilation.ast.as_ref().map_or(0, |ast| ast.count())
}

fn count_scopes(compilation: &Compilation) -> usize {
    compilation.resolution.as_ref().map_or(0, |r| r.table.len())
}
