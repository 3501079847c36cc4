//! Statement parsing implementation
//!
//! This module handles parsing of all Pym statement types:
//!
//! - Control flow: `if`/`elif`/`else`, `while`, `for`, `switch`
//! - `return`
//! - Compound statements: `{ ... }`
//! - Expression statements: calls, assignments
//!
//! Declarations (`var`, `int`, ...) live in `declarations`.
//!
//! # Grammar
//!
//! ```text
//! statement ::= while_stmt | if_stmt | for_stmt | switch_stmt | return_stmt
//!             | compound | declaration | expr_stmt
//! ```
//!
//! The statement dispatch needs exactly one token of lookahead. `;` after a
//! simple statement is optional.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::parse::{Expected, ParseError, Parser};
use crate::parser::token::TokenKind;

impl Parser {
    /// Parse a statement
    pub(crate) fn parse_statement(&mut self) -> Result<Node, ParseError> {
        self.nested(Self::dispatch_statement)
    }

    fn dispatch_statement(&mut self) -> Result<Node, ParseError> {
        log::trace!("statement at line {}: {}", self.current_line(), self.peek());

        match self.peek_kind() {
            TokenKind::While => self.parse_while_statement(),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Ident => self.parse_expression_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Switch => self.parse_switch_statement(),
            TokenKind::LBrace => self.parse_compound_statement(),
            TokenKind::Var | TokenKind::Int | TokenKind::Rat | TokenKind::StrType => {
                self.parse_declaration()
            }
            _ => Err(self.unexpected("statement", Expected::Category("statement"))),
        }
    }

    /// Parse `{ statement* }`
    pub(crate) fn parse_compound_statement(&mut self) -> Result<Node, ParseError> {
        const PRODUCTION: &str = "compound-statement";
        let line = self.expect_token(TokenKind::LBrace, PRODUCTION)?.line;

        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }
        self.expect_token(TokenKind::RBrace, PRODUCTION)?;

        let list = self.list(ListKind::Stmt, line, statements);
        Ok(self.node(Node::stmt(StmtKind::Compound, line).with_child(0, list)))
    }

    /// Parse `while ( expression ) statement`
    fn parse_while_statement(&mut self) -> Result<Node, ParseError> {
        const PRODUCTION: &str = "while-statement";
        let line = self.expect_token(TokenKind::While, PRODUCTION)?.line;
        let (condition, body) = self.parse_guarded_body(PRODUCTION)?;

        Ok(self.node(
            Node::stmt(StmtKind::While, line)
                .with_child(0, condition)
                .with_child(1, body),
        ))
    }

    /// Parse `if ( expression ) statement` plus any `elif`/`else` chain.
    ///
    /// A lone `if` is returned as `Stmt If`. With a chain, every branch goes
    /// into one flat `List Elif` under an `IfHeader`, in source order.
    fn parse_if_statement(&mut self) -> Result<Node, ParseError> {
        const PRODUCTION: &str = "if-statement";
        let line = self.expect_token(TokenKind::If, PRODUCTION)?.line;
        let (condition, body) = self.parse_guarded_body(PRODUCTION)?;
        let head = self.node(
            Node::stmt(StmtKind::If, line)
                .with_child(0, condition)
                .with_child(1, body),
        );

        if !self.check(TokenKind::Elif) && !self.check(TokenKind::Else) {
            return Ok(head);
        }

        let mut branches = vec![head];
        while self.check(TokenKind::Elif) {
            let elif_line = self.advance().line;
            let (condition, body) = self.parse_guarded_body("elif-clause")?;
            branches.push(self.node(
                Node::stmt(StmtKind::Elif, elif_line)
                    .with_child(0, condition)
                    .with_child(1, body),
            ));
        }
        if self.check(TokenKind::Else) {
            let else_line = self.advance().line;
            let body = self.parse_statement()?;
            branches.push(self.node(Node::stmt(StmtKind::Else, else_line).with_child(0, body)));
        }

        let chain = self.list(ListKind::Elif, line, branches);
        Ok(self.node(Node::stmt(StmtKind::IfHeader, line).with_child(0, chain)))
    }

    /// `( expression ) statement`, shared by `while`, `if` and `elif`.
    fn parse_guarded_body(&mut self, production: &'static str) -> Result<(Node, Node), ParseError> {
        self.expect_token(TokenKind::LParen, production)?;
        let condition = self.parse_expression()?;
        self.expect_token(TokenKind::RParen, production)?;
        let body = self.parse_statement()?;
        Ok((condition, body))
    }

    /// Parse `for ( init ;? condition ;? increment ) statement`
    fn parse_for_statement(&mut self) -> Result<Node, ParseError> {
        const PRODUCTION: &str = "for-statement";
        let line = self.expect_token(TokenKind::For, PRODUCTION)?.line;
        self.expect_token(TokenKind::LParen, PRODUCTION)?;

        // Both forms swallow their own optional ';'
        let init = match self.peek_kind() {
            TokenKind::Var | TokenKind::Int | TokenKind::Rat | TokenKind::StrType => {
                self.parse_declaration()?
            }
            TokenKind::Ident => self.parse_expression_statement()?,
            _ => {
                return Err(self.unexpected(
                    PRODUCTION,
                    Expected::Category("declaration or expression"),
                ))
            }
        };

        let condition = self.parse_expression()?;
        self.skip_semicolon();
        let increment = self.parse_expression()?;
        self.expect_token(TokenKind::RParen, PRODUCTION)?;
        let body = self.parse_statement()?;

        Ok(self.node(
            Node::stmt(StmtKind::For, line)
                .with_child(0, init)
                .with_child(1, condition)
                .with_child(2, increment)
                .with_child(3, body),
        ))
    }

    /// Parse `switch ( expression ) { case* default? }`
    fn parse_switch_statement(&mut self) -> Result<Node, ParseError> {
        const PRODUCTION: &str = "switch-statement";
        let line = self.expect_token(TokenKind::Switch, PRODUCTION)?.line;
        self.expect_token(TokenKind::LParen, PRODUCTION)?;
        let scrutinee = self.parse_expression()?;
        self.expect_token(TokenKind::RParen, PRODUCTION)?;
        let body_line = self.expect_token(TokenKind::LBrace, PRODUCTION)?.line;

        let mut clauses = Vec::new();
        let mut seen_default = false;
        loop {
            match self.peek_kind() {
                // Nothing may follow `default`
                TokenKind::Case | TokenKind::Default if seen_default => {
                    return Err(self.unexpected(PRODUCTION, Expected::Token(TokenKind::RBrace)));
                }
                TokenKind::Case => clauses.push(self.parse_case_clause()?),
                TokenKind::Default => {
                    clauses.push(self.parse_default_clause()?);
                    seen_default = true;
                }
                _ => break,
            }
        }
        self.expect_token(TokenKind::RBrace, PRODUCTION)?;

        let cases = self.list(ListKind::Case, body_line, clauses);
        Ok(self.node(
            Node::stmt(StmtKind::Switch, line)
                .with_child(0, scrutinee)
                .with_child(1, cases),
        ))
    }

    /// Parse `case expression : statement*`
    fn parse_case_clause(&mut self) -> Result<Node, ParseError> {
        const PRODUCTION: &str = "case-clause";
        let line = self.expect_token(TokenKind::Case, PRODUCTION)?.line;
        let value = self.parse_expression()?;
        self.expect_token(TokenKind::Colon, PRODUCTION)?;
        let body = self.parse_clause_body(line)?;

        Ok(self.node(
            Node::stmt(StmtKind::Case, line)
                .with_child(0, value)
                .with_child(1, body),
        ))
    }

    /// Parse `default : statement*`
    fn parse_default_clause(&mut self) -> Result<Node, ParseError> {
        const PRODUCTION: &str = "default-clause";
        let line = self.expect_token(TokenKind::Default, PRODUCTION)?.line;
        self.expect_token(TokenKind::Colon, PRODUCTION)?;
        let body = self.parse_clause_body(line)?;

        Ok(self.node(Node::stmt(StmtKind::Default, line).with_child(0, body)))
    }

    /// Statements up to the next `case`, `default` or `}`.
    fn parse_clause_body(&mut self, line: usize) -> Result<Node, ParseError> {
        let mut statements = Vec::new();
        while !matches!(
            self.peek_kind(),
            TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof
        ) {
            statements.push(self.parse_statement()?);
        }
        Ok(self.list(ListKind::Stmt, line, statements))
    }

    /// Parse `return expression? ;?`
    fn parse_return_statement(&mut self) -> Result<Node, ParseError> {
        let line = self.expect_token(TokenKind::Return, "return-statement")?.line;

        let mut node = Node::stmt(StmtKind::Return, line);
        if self.can_start_expression() {
            node.set_child(0, self.parse_expression()?);
        }
        self.skip_semicolon();

        Ok(self.node(node))
    }

    /// Parse an identifier-led expression followed by an optional `;`
    pub(crate) fn parse_expression_statement(&mut self) -> Result<Node, ParseError> {
        let line = self.current_line();
        if !self.check(TokenKind::Ident) {
            return Err(self.unexpected("expression-statement", Expected::Token(TokenKind::Ident)));
        }
        let expr = self.parse_expression()?;
        self.skip_semicolon();

        Ok(self.node(Node::stmt(StmtKind::Expr, line).with_child(0, expr)))
    }
}
