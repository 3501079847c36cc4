//! Declaration parsing implementation
//!
//! This module handles the productions that introduce names:
//!
//! - Function definitions: `def name(params) { ... }`
//! - Parameters: untyped, typed scalar, typed array
//! - Variable declarations: `var x = e`, `int a[10]`, `str s`
//!
//! # Grammar
//!
//! ```text
//! def         ::= "def" identifier "(" [param {"," param}] ")" compound
//! param       ::= identifier | type identifier ["[" [number] "]"]
//! declaration ::= ("var" | type) identifier ["[" number "]"] ["=" expression] [";"]
//! type        ::= "int" | "rat" | "str"
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::parse::{Expected, ParseError, Parser};
use crate::parser::rational::Rational;
use crate::parser::token::TokenKind;

impl Parser {
    /// Parse a function definition
    pub(crate) fn parse_def(&mut self) -> Result<Node, ParseError> {
        const PRODUCTION: &str = "function-definition";
        let line = self.expect_token(TokenKind::Def, PRODUCTION)?.line;
        let name = self.expect_identifier(PRODUCTION)?;
        log::debug!("def {} at line {}", name.lexeme, line);

        self.expect_token(TokenKind::LParen, PRODUCTION)?;
        let params = self.parse_parameter_list()?;
        self.expect_token(TokenKind::RParen, PRODUCTION)?;
        let body = self.parse_compound_statement()?;

        Ok(self.node(
            Node::stmt(StmtKind::Def, line)
                .with_decl(DeclInfo::new(name.lexeme, ExprType::Unresolved, 0))
                .with_child(0, params)
                .with_child(1, body),
        ))
    }

    /// Parse function parameters up to (not including) `)`
    pub(crate) fn parse_parameter_list(&mut self) -> Result<Node, ParseError> {
        let line = self.current_line();
        let mut params = Vec::new();

        if !self.check(TokenKind::RParen) {
            loop {
                params.push(self.parse_parameter()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        Ok(self.list(ListKind::Param, line, params))
    }

    fn parse_parameter(&mut self) -> Result<Node, ParseError> {
        const PRODUCTION: &str = "parameter";
        let line = self.current_line();

        if self.check(TokenKind::Ident) {
            let name = self.advance();
            let decl = DeclInfo::new(name.lexeme, ExprType::Unresolved, 0);
            return Ok(self.node(Node::param(ParamKind::Dynamic, line, decl)));
        }

        if !self.peek_kind().is_type_keyword() {
            return Err(self.unexpected(PRODUCTION, Expected::Category("parameter")));
        }
        let ty = self.parse_type()?;
        let name = self.expect_identifier(PRODUCTION)?;

        if self.match_token(TokenKind::LBracket) {
            // Size is optional on parameters
            let size = if self.check(TokenKind::Num) {
                self.parse_size()?
            } else {
                0
            };
            self.expect_token(TokenKind::RBracket, PRODUCTION)?;
            let decl = DeclInfo::new(name.lexeme, ty, size);
            return Ok(self.node(Node::param(ParamKind::StaticArray, line, decl)));
        }

        let decl = DeclInfo::new(name.lexeme, ty, 0);
        Ok(self.node(Node::param(ParamKind::StaticScalar, line, decl)))
    }

    /// Parse a type keyword
    pub(crate) fn parse_type(&mut self) -> Result<ExprType, ParseError> {
        let ty = match self.peek_kind() {
            TokenKind::Int => ExprType::Int,
            TokenKind::Rat => ExprType::Rational,
            TokenKind::StrType => ExprType::String,
            _ => return Err(self.unexpected("type", Expected::Category("type"))),
        };
        self.advance();
        Ok(ty)
    }

    /// Parse a variable declaration
    pub(crate) fn parse_declaration(&mut self) -> Result<Node, ParseError> {
        const PRODUCTION: &str = "declaration";
        let line = self.current_line();

        let ty = if self.match_token(TokenKind::Var) {
            ExprType::Unresolved
        } else if self.peek_kind().is_type_keyword() {
            self.parse_type()?
        } else {
            return Err(self.unexpected(PRODUCTION, Expected::Category("declaration")));
        };
        let name = self.expect_identifier(PRODUCTION)?;

        let size = if self.match_token(TokenKind::LBracket) {
            if !self.check(TokenKind::Num) {
                return Err(self.unexpected(PRODUCTION, Expected::Token(TokenKind::Num)));
            }
            let size = self.parse_size()?;
            self.expect_token(TokenKind::RBracket, PRODUCTION)?;
            size
        } else {
            0
        };

        let mut node = Node::stmt(StmtKind::Decl, line).with_decl(DeclInfo::new(name.lexeme, ty, size));
        node.is_addr = true;
        if self.match_token(TokenKind::Assign) {
            node.set_child(0, self.parse_expression()?);
        }
        self.skip_semicolon();

        Ok(self.node(node))
    }

    /// Array length literal: a positive integer.
    fn parse_size(&mut self) -> Result<usize, ParseError> {
        let token = self.advance();
        let malformed = |reason: &str| ParseError::MalformedLiteral {
            text: token.lexeme.clone(),
            reason: reason.to_string(),
            line: token.line,
        };

        let value = Rational::parse(&token.lexeme).map_err(|e| malformed(&e.to_string()))?;
        if !value.is_integer() || value.numerator() <= 0 {
            return Err(malformed("array size must be a positive integer"));
        }
        usize::try_from(value.numerator()).map_err(|_| malformed("array size out of range"))
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::lexer::tokenize;
    use crate::parser::parse::{Expected, ParseError, Parser};
    use crate::parser::token::TokenKind;

    fn first_item(source: &str) -> Node {
        let root = Parser::new(tokenize(source).unwrap())
            .parse_program()
            .unwrap();
        root.child(0).unwrap().items()[0].clone()
    }

    fn parse_err(source: &str) -> ParseError {
        Parser::new(tokenize(source).unwrap())
            .parse_program()
            .unwrap_err()
    }

    #[test]
    fn test_parameter_kinds() {
        let def = first_item("def f(a, int b, rat c[], str d[3]) { }");
        let params = def.child(0).unwrap();
        assert_eq!(params.list_kind(), Some(ListKind::Param));

        let kinds: Vec<_> = params.items().iter().map(|p| p.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Param(ParamKind::Dynamic),
                NodeKind::Param(ParamKind::StaticScalar),
                NodeKind::Param(ParamKind::StaticArray),
                NodeKind::Param(ParamKind::StaticArray),
            ]
        );

        let decls: Vec<_> = params
            .items()
            .iter()
            .map(|p| p.decl.clone().unwrap())
            .collect();
        assert_eq!(decls[0], DeclInfo::new("a", ExprType::Unresolved, 0));
        assert_eq!(decls[1], DeclInfo::new("b", ExprType::Int, 0));
        assert_eq!(decls[2], DeclInfo::new("c", ExprType::Rational, 0));
        assert_eq!(decls[3], DeclInfo::new("d", ExprType::String, 3));
        assert!(params.items().iter().all(|p| p.is_addr));
    }

    #[test]
    fn test_declaration_forms() {
        let node = first_item("int a[10];");
        assert_eq!(node.stmt_kind(), Some(StmtKind::Decl));
        assert_eq!(node.decl, Some(DeclInfo::new("a", ExprType::Int, 10)));
        assert_eq!(node.arity(), 0);
        assert!(node.is_addr);

        let node = first_item("var x = 1 + 2");
        assert_eq!(node.decl, Some(DeclInfo::new("x", ExprType::Unresolved, 0)));
        assert_eq!(node.arity(), 1);
        assert!(matches!(
            node.child(0).unwrap().expr_kind(),
            Some(ExprKind::Op(Operator::Add))
        ));
    }

    #[test]
    fn test_zero_array_size_rejected() {
        let err = parse_err("int a[0]");
        assert!(matches!(err, ParseError::MalformedLiteral { ref text, line: 1, .. } if text == "0"));
    }

    #[test]
    fn test_fractional_array_size_rejected() {
        let err = parse_err("rat a[2.5]");
        assert!(matches!(err, ParseError::MalformedLiteral { .. }));
    }

    #[test]
    fn test_declaration_size_required() {
        let err = parse_err("int a[]");
        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                production: "declaration",
                expected: Expected::Token(TokenKind::Num),
                found: TokenKind::RBracket,
                ..
            }
        ));
    }

    #[test]
    fn test_def_requires_name() {
        let err = parse_err("def (a) { }");
        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                production: "function-definition",
                expected: Expected::Token(TokenKind::Ident),
                found: TokenKind::LParen,
                ..
            }
        ));
    }

    #[test]
    fn test_bad_parameter() {
        let err = parse_err("def f(a, 3) { }");
        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                production: "parameter",
                found: TokenKind::Num,
                ..
            }
        ));
    }
}
