//! Compile pipeline: source text → tokens → AST → scopes
//!
//! [`compile`] runs every stage it can and keeps whatever each one produced,
//! so callers (the CLI dumps, the viewer) can show a partial tree next to the
//! diagnostics. [`check`] is the strict form that fails on the first stage
//! with an error.

use crate::parser::ast::Node;
use crate::parser::lexer::{tokenize, LexError};
use crate::parser::parse::{ParseError, Parser};
use crate::parser::token::Token;
use crate::semantic::{resolve, Resolution, SemanticError};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("{} semantic error(s); first: {}", .0.len(), first_message(.0))]
    Semantic(Vec<SemanticError>),
}

fn first_message(errors: &[SemanticError]) -> String {
    errors.first().map(ToString::to_string).unwrap_or_default()
}

impl From<Vec<SemanticError>> for CompileError {
    fn from(errors: Vec<SemanticError>) -> Self {
        CompileError::Semantic(errors)
    }
}

/// Pipeline switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Keep parsing after a syntax error
    pub recover: bool,
    /// Run the scope builder after parsing
    pub resolve: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            recover: false,
            resolve: true,
        }
    }
}

/// Pipeline stage a diagnostic came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lex,
    Parse,
    Semantic,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Lex => write!(f, "lex"),
            Stage::Parse => write!(f, "parse"),
            Stage::Semantic => write!(f, "semantic"),
        }
    }
}

/// One reportable problem, flattened for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub stage: Stage,
    pub line: Option<usize>,
    pub message: String,
}

impl From<&LexError> for Diagnostic {
    fn from(err: &LexError) -> Self {
        Diagnostic {
            stage: Stage::Lex,
            line: Some(err.line),
            message: err.to_string(),
        }
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(err: &ParseError) -> Self {
        Diagnostic {
            stage: Stage::Parse,
            line: Some(err.line()),
            message: err.to_string(),
        }
    }
}

impl From<&SemanticError> for Diagnostic {
    fn from(err: &SemanticError) -> Self {
        Diagnostic {
            stage: Stage::Semantic,
            line: err.line(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.stage, self.message)
    }
}

/// Everything one run of the pipeline produced
#[derive(Debug, Clone, Default)]
pub struct Compilation {
    pub tokens: Vec<Token>,
    pub ast: Option<Node>,
    pub resolution: Option<Resolution>,
    pub lex_error: Option<LexError>,
    pub parse_errors: Vec<ParseError>,
}

impl Compilation {
    /// All diagnostics, lexing first, then parsing, then resolution.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut out: Vec<Diagnostic> = self.lex_error.iter().map(Diagnostic::from).collect();
        out.extend(self.parse_errors.iter().map(Diagnostic::from));
        if let Some(resolution) = &self.resolution {
            out.extend(resolution.errors.iter().map(Diagnostic::from));
        }
        out
    }

    pub fn error_count(&self) -> usize {
        usize::from(self.lex_error.is_some())
            + self.parse_errors.len()
            + self.resolution.as_ref().map_or(0, |r| r.errors.len())
    }

    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    /// Lines that carry at least one diagnostic, sorted.
    pub fn error_lines(&self) -> Vec<usize> {
        let mut lines: Vec<usize> = self.diagnostics().iter().filter_map(|d| d.line).collect();
        lines.sort_unstable();
        lines.dedup();
        lines
    }
}

/// Run the pipeline as far as it gets.
pub fn compile(source: &str, options: &Options) -> Compilation {
    let mut result = Compilation::default();

    let tokens = match tokenize(source) {
        Ok(tokens) => tokens,
        Err(err) => {
            log::warn!("{}", err);
            result.lex_error = Some(err);
            return result;
        }
    };
    log::info!("lexed {} token(s)", tokens.len());
    result.tokens = tokens.clone();

    let mut parser = Parser::new(tokens);
    let mut ast = if options.recover {
        let (ast, errors) = parser.parse_program_recovering();
        result.parse_errors = errors;
        ast
    } else {
        match parser.parse_program() {
            Ok(ast) => ast,
            Err(err) => {
                result.parse_errors.push(err);
                return result;
            }
        }
    };

    // A recovered tree has holes; resolving it would only add noise
    if options.resolve && result.parse_errors.is_empty() {
        result.resolution = Some(resolve(&mut ast));
    }
    result.ast = Some(ast);
    result
}

/// Lex, parse and resolve, failing on the first stage that reports errors.
pub fn check(source: &str) -> Result<(Node, Resolution), CompileError> {
    let tokens = tokenize(source)?;
    let mut ast = Parser::new(tokens).parse_program()?;
    let resolution = resolve(&mut ast);
    if !resolution.is_ok() {
        return Err(resolution.errors.into());
    }
    Ok((ast, resolution))
}

pub fn read_source(path: &Path) -> Result<String, CompileError> {
    std::fs::read_to_string(path).map_err(|source| CompileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_clean_program() {
        let result = compile("def main() { var x = 1 return x }", &Options::default());
        assert!(result.is_ok(), "{:?}", result.diagnostics());
        assert!(result.ast.is_some());
        assert_eq!(result.resolution.as_ref().map(|r| r.table.len()), Some(2));
    }

    #[test]
    fn test_lex_error_stops_pipeline() {
        let result = compile("var a = 1 & 2", &Options::default());
        assert!(result.ast.is_none());
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.diagnostics()[0].stage, Stage::Lex);
    }

    #[test]
    fn test_parse_error_without_recovery() {
        let result = compile("if (x y = 1\nwhile (", &Options::default());
        assert!(result.ast.is_none());
        assert_eq!(result.parse_errors.len(), 1);
    }

    #[test]
    fn test_recovery_skips_resolution() {
        let options = Options {
            recover: true,
            resolve: true,
        };
        let result = compile("var a = 1\nwhile x) a = 2\nb = 3", &options);
        assert!(result.ast.is_some());
        assert!(result.resolution.is_none());
        assert_eq!(result.error_lines(), vec![2]);
    }

    #[test]
    fn test_no_resolve() {
        let options = Options {
            recover: false,
            resolve: false,
        };
        let result = compile("undefined = 1", &options);
        assert!(result.is_ok());
        assert!(result.resolution.is_none());
    }

    #[test]
    fn test_check_reports_semantic_errors() {
        let err = check("x = 1\ny = 2").unwrap_err();
        match err {
            CompileError::Semantic(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_check_converts_parse_error() {
        let err = check("return )").unwrap_err();
        assert!(matches!(err, CompileError::Parse(_)));
        assert!(err.to_string().starts_with("Parse error at line 1"));
    }

    #[test]
    fn test_read_source_missing_file() {
        let err = read_source(Path::new("/definitely/not/here.pym")).unwrap_err();
        assert!(matches!(err, CompileError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.pym"));
    }
}
