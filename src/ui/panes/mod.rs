//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`source`]: Source code display with syntax highlighting and error markers
//! - [`outline`]: Syntax tree and scope tree views
//! - [`diagnostics`]: Lex, parse and semantic errors
//! - [`status`]: Status bar with keybindings and the error count
//!
//! Each pane module exports a stateless `render_*` function; scroll offsets
//! live in [`App`](crate::ui::App) and are clamped by the renderer.

pub mod diagnostics;
pub mod outline;
pub mod source;
pub mod status;

pub use diagnostics::render_diagnostics_pane;
pub use outline::{render_outline_pane, OutlineKind};
pub use source::render_source_pane;
pub use status::render_status_bar;
