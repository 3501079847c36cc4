//! Expression parsing implementation
//!
//! Binary and unary operators are parsed with a Pratt loop driven by an
//! explicit precedence table ([`infix_rule`]) instead of one function per
//! level. Postfix forms (calls and indexing) bind tightest.
//!
//! # Precedence
//!
//! | level        | operators           | assoc |
//! |--------------|---------------------|-------|
//! | `Assignment` | `=`                 | right |
//! | `Or`         | `\|\|`              | left  |
//! | `And`        | `&&`                | left  |
//! | `Equality`   | `==` `!=`           | left  |
//! | `Comparison` | `<` `<=` `>` `>=`   | left  |
//! | `Term`       | `+` `-`             | left  |
//! | `Factor`     | `*` `/` `%`         | left  |
//! | `Prefix`     | unary `-` `!`       | right |
//! | `Postfix`    | call `()`, index `[]` | left |
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::parse::{Expected, ParseError, Parser};
use crate::parser::rational::Rational;
use crate::parser::token::TokenKind;

/// Binding power, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Assignment,
    Or,
    And,
    Equality,
    Comparison,
    Term,
    Factor,
    Prefix,
    Postfix,
}

impl Precedence {
    /// The next tighter level.
    pub fn next(self) -> Precedence {
        match self {
            Precedence::Lowest => Precedence::Assignment,
            Precedence::Assignment => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Equality,
            Precedence::Equality => Precedence::Comparison,
            Precedence::Comparison => Precedence::Term,
            Precedence::Term => Precedence::Factor,
            Precedence::Factor => Precedence::Prefix,
            Precedence::Prefix | Precedence::Postfix => Precedence::Postfix,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

/// Operator, level and associativity for a token in infix position.
pub fn infix_rule(kind: TokenKind) -> Option<(Operator, Precedence, Assoc)> {
    use Precedence::*;

    let rule = match kind {
        TokenKind::Assign => (Operator::Assign, Assignment, Assoc::Right),
        TokenKind::OrOr => (Operator::Or, Or, Assoc::Left),
        TokenKind::AndAnd => (Operator::And, And, Assoc::Left),
        TokenKind::EqEq => (Operator::Eq, Equality, Assoc::Left),
        TokenKind::NotEq => (Operator::Ne, Equality, Assoc::Left),
        TokenKind::Lt => (Operator::Lt, Comparison, Assoc::Left),
        TokenKind::Le => (Operator::Le, Comparison, Assoc::Left),
        TokenKind::Gt => (Operator::Gt, Comparison, Assoc::Left),
        TokenKind::Ge => (Operator::Ge, Comparison, Assoc::Left),
        TokenKind::Plus => (Operator::Add, Term, Assoc::Left),
        TokenKind::Minus => (Operator::Sub, Term, Assoc::Left),
        TokenKind::Star => (Operator::Mul, Factor, Assoc::Left),
        TokenKind::Slash => (Operator::Div, Factor, Assoc::Left),
        TokenKind::Percent => (Operator::Mod, Factor, Assoc::Left),
        _ => return None,
    };
    Some(rule)
}

fn prefix_operator(kind: TokenKind) -> Option<Operator> {
    match kind {
        TokenKind::Minus => Some(Operator::Neg),
        TokenKind::Bang => Some(Operator::Not),
        _ => None,
    }
}

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<Node, ParseError> {
        self.parse_precedence(Precedence::Assignment)
    }

    /// True when the current token can begin an expression.
    pub(crate) fn can_start_expression(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Ident
                | TokenKind::Num
                | TokenKind::Str
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::Minus
                | TokenKind::Bang
        )
    }

    /// Parse an expression whose operators all bind at least as tightly as `min`.
    fn parse_precedence(&mut self, min: Precedence) -> Result<Node, ParseError> {
        let mut lhs = self.parse_unary()?;

        while let Some((op, prec, assoc)) = infix_rule(self.peek_kind()) {
            if prec < min {
                break;
            }
            let line = self.advance().line;
            let rhs_min = match assoc {
                Assoc::Left => prec.next(),
                Assoc::Right => prec,
            };
            let rhs = self.parse_precedence(rhs_min)?;
            lhs = self.node(
                Node::expr(ExprKind::Op(op), line)
                    .with_child(0, lhs)
                    .with_child(1, rhs),
            );
        }

        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Node, ParseError> {
        self.nested(Self::parse_prefix)
    }

    fn parse_prefix(&mut self) -> Result<Node, ParseError> {
        if let Some(op) = prefix_operator(self.peek_kind()) {
            let line = self.advance().line;
            let operand = self.parse_unary()?;
            return Ok(self.node(Node::expr(ExprKind::Op(op), line).with_child(0, operand)));
        }
        self.parse_postfix()
    }

    /// Parse a primary followed by any number of `[index]` or `(args)`.
    fn parse_postfix(&mut self) -> Result<Node, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.peek_kind() {
                TokenKind::LBracket => {
                    let line = self.advance().line;
                    let index = self.parse_expression()?;
                    self.expect_token(TokenKind::RBracket, "index-expression")?;
                    expr = self.node(
                        Node::expr(ExprKind::ArrayAccess, line)
                            .with_child(0, expr)
                            .with_child(1, index),
                    );
                }
                // Only a bare name can be called
                TokenKind::LParen if expr.ident().is_some() => {
                    let line = expr.line;
                    self.advance();
                    let args = self.parse_arguments(TokenKind::RParen, "call-expression")?;
                    expr = self.node(
                        Node::expr(ExprKind::Call, line)
                            .with_child(0, expr)
                            .with_child(1, args),
                    );
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Comma-separated expressions up to and including `close`, as a `List Arg`.
    /// The opening delimiter has already been consumed.
    fn parse_arguments(&mut self, close: TokenKind, production: &'static str) -> Result<Node, ParseError> {
        let line = self.current_line();
        let mut args = Vec::new();

        if !self.check(close) {
            loop {
                args.push(self.parse_expression()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect_token(close, production)?;

        Ok(self.list(ListKind::Arg, line, args))
    }

    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        let token = self.peek().clone();

        match token.kind {
            TokenKind::Ident => {
                self.advance();
                Ok(self.node(Node::expr(ExprKind::Id(token.lexeme), token.line)))
            }
            TokenKind::Num => {
                let value = Rational::parse(&token.lexeme).map_err(|reason| {
                    ParseError::MalformedLiteral {
                        text: token.lexeme.clone(),
                        reason: reason.to_string(),
                        line: token.line,
                    }
                })?;
                self.advance();
                Ok(self.node(Node::expr(ExprKind::Num(value), token.line)))
            }
            TokenKind::Str => {
                self.advance();
                Ok(self.node(Node::expr(ExprKind::Str(token.lexeme), token.line)))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect_token(TokenKind::RParen, "parenthesized-expression")?;
                Ok(inner)
            }
            TokenKind::LBracket => {
                self.advance();
                let items = self.parse_arguments(TokenKind::RBracket, "array-literal")?;
                Ok(self.node(Node::expr(ExprKind::Array, token.line).with_child(0, items)))
            }
            _ => Err(self.unexpected("expression", Expected::Category("expression"))),
        }
    }
}
