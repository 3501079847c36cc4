//! Pym source parser
//!
//! This module turns a token sequence into an Abstract Syntax Tree (AST):
//! - [`token`]: Token model and the lookahead cursor
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: The [`Parser`](parse::Parser) and its error type
//! - [`ast`]: AST node definitions
//! - [`rational`]: Exact numeric literal values
//!
//! # Supported Language
//!
//! - Types: `int`, `rat`, `str`, untyped `var`, fixed-size arrays
//! - Functions: `def name(params) { ... }`, top level only
//! - Statements: declarations, expression statements, `if`/`elif`/`else`,
//!   `while`, `for`, `switch`/`case`/`default`, `return`
//! - Expressions: arithmetic, comparison, logical, assignment, calls,
//!   indexing, array literals
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with a Pratt loop for operators.
//! No external parser generator dependencies.

pub mod ast;
mod declarations;
pub mod expressions;
pub mod lexer;
pub mod parse;
pub mod rational;
mod statements;
pub mod token;
