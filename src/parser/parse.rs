//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, helper methods, and the program entry points.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: `def`, parameter lists and variable declarations
//! - `statements`: statements (if, while, for, switch, return, ...)
//! - `expressions`: expressions with a Pratt loop over an explicit precedence table
//!
//! Every production returns `Result<Node, ParseError>` and bails out with `?`
//! the moment a child fails, so no half-built node ever reaches a caller. A
//! failed match never consumes the offending token; [`Parser::parse_program_recovering`]
//! is the only place that decides to skip input.

use crate::parser::ast::*;
use crate::parser::token::{Token, TokenKind, TokenStream};
use std::fmt;
use thiserror::Error;

/// Deepest statement or expression nesting the parser accepts.
pub const MAX_NESTING: usize = 64;

/// What a production was looking for when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Token(TokenKind),
    /// A category such as "expression" or "statement"
    Category(&'static str),
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Token(kind) => write!(f, "{}", kind),
            Expected::Category(what) => f.write_str(what),
        }
    }
}

/// Parser error type
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    #[error("Parse error at line {line} in {production}: expected {expected}, found {}", describe_found(.found, .lexeme))]
    UnexpectedToken {
        production: &'static str,
        expected: Expected,
        found: TokenKind,
        lexeme: String,
        line: usize,
    },

    #[error("Parse error at line {line}: malformed literal '{text}': {reason}")]
    MalformedLiteral {
        text: String,
        reason: String,
        line: usize,
    },

    #[error("Parse error at line {line}: nesting deeper than {limit} levels")]
    TooDeep { limit: usize, line: usize },
}

fn describe_found(found: &TokenKind, lexeme: &str) -> String {
    Token::new(*found, lexeme, 0).to_string()
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { line, .. }
            | ParseError::MalformedLiteral { line, .. }
            | ParseError::TooDeep { line, .. } => *line,
        }
    }
}

/// Recursive descent parser for Pym
pub struct Parser {
    pub(crate) tokens: TokenStream,
    next_id: NodeId,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: TokenStream::new(tokens),
            next_id: 0,
            depth: 0,
        }
    }

    /// Parse the whole program into its root `Compound`, stopping at the
    /// first error.
    pub fn parse_program(&mut self) -> Result<Node, ParseError> {
        let line = self.current_line();
        let mut items = Vec::new();

        while !self.is_at_end() {
            items.push(self.parse_top_level()?);
        }

        log::info!("parsed {} top-level item(s)", items.len());
        Ok(self.program_root(line, items))
    }

    /// Parse the whole program, reporting every failed top-level item and
    /// resynchronizing after each one. The returned tree holds the items that
    /// parsed cleanly.
    pub fn parse_program_recovering(&mut self) -> (Node, Vec<ParseError>) {
        let line = self.current_line();
        let mut items = Vec::new();
        let mut errors = Vec::new();

        while !self.is_at_end() {
            let start = self.tokens.position();
            match self.parse_top_level() {
                Ok(item) => items.push(item),
                Err(err) => {
                    log::warn!("recovering from: {}", err);
                    errors.push(err);
                    self.synchronize(start);
                }
            }
        }

        (self.program_root(line, items), errors)
    }

    fn parse_top_level(&mut self) -> Result<Node, ParseError> {
        if self.check(TokenKind::Def) {
            self.parse_def()
        } else {
            self.parse_statement()
        }
    }

    fn program_root(&mut self, line: usize, items: Vec<Node>) -> Node {
        let list = self.list(ListKind::Stmt, line, items);
        self.node(Node::stmt(StmtKind::Compound, line).with_child(0, list))
    }

    /// Skip to the next plausible statement start: up to and including a `;`,
    /// or up to a statement keyword, `}` or EOF. If the failed item consumed
    /// nothing since `start`, one token is dropped first so the loop advances.
    /// Blocks the failed item opened are skipped through their closing `}`.
    fn synchronize(&mut self, start: usize) {
        if self.tokens.position() == start {
            self.advance();
        }

        let mut depth = self.open_braces_since(start);
        if depth > 0 {
            while depth > 0 && !self.is_at_end() {
                match self.advance().kind {
                    TokenKind::LBrace => depth += 1,
                    TokenKind::RBrace => depth -= 1,
                    _ => {}
                }
            }
            return;
        }

        while !self.is_at_end() {
            let kind = self.peek_kind();
            if kind == TokenKind::Semicolon {
                self.advance();
                return;
            }
            if kind.starts_statement() || kind == TokenKind::RBrace {
                return;
            }
            self.advance();
        }
    }

    /// Braces opened and still unclosed among the tokens consumed since `start`.
    fn open_braces_since(&self, start: usize) -> usize {
        self.tokens.tokens()[start..self.tokens.position()]
            .iter()
            .fold(0, |depth, token| match token.kind {
                TokenKind::LBrace => depth + 1,
                TokenKind::RBrace => depth.saturating_sub(1),
                _ => depth,
            })
    }

    // ===== Helper methods =====

    /// Run `parse` one nesting level deeper, failing once [`MAX_NESTING`]
    /// levels are open.
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::TooDeep {
                limit: MAX_NESTING,
                line: self.current_line(),
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Stamp a fresh id on `node`.
    pub(crate) fn node(&mut self, mut node: Node) -> Node {
        node.id = self.next_id;
        self.next_id += 1;
        node
    }

    pub(crate) fn list(&mut self, kind: ListKind, line: usize, items: Vec<Node>) -> Node {
        self.node(Node::list_of(kind, line, items))
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn advance(&mut self) -> Token {
        self.tokens.advance()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.tokens.is_at_end()
    }

    pub(crate) fn peek(&self) -> &Token {
        self.tokens.peek()
    }

    pub(crate) fn peek_kind(&self) -> TokenKind {
        self.tokens.peek_kind()
    }

    pub(crate) fn current_line(&self) -> usize {
        self.peek().line
    }

    /// Error describing the current token as a mismatch; nothing is consumed.
    pub(crate) fn unexpected(&self, production: &'static str, expected: Expected) -> ParseError {
        let token = self.peek();
        ParseError::UnexpectedToken {
            production,
            expected,
            found: token.kind,
            lexeme: token.lexeme.clone(),
            line: token.line,
        }
    }

    /// Consume a token of `kind` or fail without consuming.
    pub(crate) fn expect_token(&mut self, kind: TokenKind, production: &'static str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(production, Expected::Token(kind)))
        }
    }

    pub(crate) fn expect_identifier(&mut self, production: &'static str) -> Result<Token, ParseError> {
        self.expect_token(TokenKind::Ident, production)
    }

    /// Optional statement terminator.
    pub(crate) fn skip_semicolon(&mut self) {
        self.match_token(TokenKind::Semicolon);
    }
}
