//! # Introduction
//!
//! `pymfront` is the front end for Pym, a small imperative teaching language:
//! a hand-written recursive-descent parser that builds an AST, and a scoped
//! symbol table that resolves every name in it. A terminal viewer built with
//! [ratatui](https://docs.rs/ratatui) shows the results side by side.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Tokens → Parser → AST → Resolver → Scopes → CLI / TUI
//! ```
//!
//! 1. [`parser`]: tokenises the source and builds the AST; numeric
//!    literals are exact [`parser::rational::Rational`]s.
//! 2. [`semantic`]: the [`semantic::SymbolTable`] arena and the resolver
//!    that opens scopes, declares names and links every use to its
//!    declaration.
//! 3. [`driver`]: runs the stages and gathers their diagnostics.
//! 4. [`cli`]: command-line options and the stderr logger.
//! 5. [`ui`]: ratatui-based viewer; not part of the stable library API.
//!
//! ## Example
//!
//! ```
//! use pymfront::driver::check;
//!
//! let (ast, resolution) = check("def twice(x) { return x * 2 }\nvar y = twice(4)").unwrap();
//! assert_eq!(resolution.table.len(), 2);
//! assert!(ast.render().starts_with("Stmt Compound @1"));
//! ```

pub mod cli;
pub mod driver;
pub mod parser;
pub mod semantic;
pub mod ui;
