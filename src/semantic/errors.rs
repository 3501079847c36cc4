//! Name-resolution error types
//!
//! These are raised by [`SymbolTable`] operations and collected by the
//! resolver. None of them stops resolution; every error is recorded and the
//! walk continues with the next statement.
//!
//! [`SymbolTable`]: crate::semantic::scope::SymbolTable

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SemanticError {
    /// A name declared twice in the same scope
    #[error("line {line}: '{name}' is already declared in this scope (first declared at line {previous_line})")]
    DuplicateDeclaration {
        name: String,
        line: usize,
        previous_line: usize,
    },

    /// An identifier with no visible declaration
    #[error("{}'{name}' is not declared in any enclosing scope", line_prefix(.line))]
    NameNotFound { name: String, line: Option<usize> },

    /// Left side of `=` is not addressable
    #[error("line {line}: left side of assignment is not addressable")]
    InvalidAssignmentTarget { line: usize },
}

fn line_prefix(line: &Option<usize>) -> String {
    line.map(|l| format!("line {}: ", l)).unwrap_or_default()
}

impl SemanticError {
    /// Attaches the use-site line to a `NameNotFound` raised by a bare lookup.
    pub fn at_line(self, at: usize) -> Self {
        match self {
            SemanticError::NameNotFound { name, line: None } => SemanticError::NameNotFound {
                name,
                line: Some(at),
            },
            other => other,
        }
    }

    /// Source line, when known.
    pub fn line(&self) -> Option<usize> {
        match self {
            SemanticError::DuplicateDeclaration { line, .. } => Some(*line),
            SemanticError::NameNotFound { line, .. } => *line,
            SemanticError::InvalidAssignmentTarget { line } => Some(*line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_line_fills_missing_line() {
        let err = SemanticError::NameNotFound {
            name: "x".to_string(),
            line: None,
        };
        assert_eq!(err.to_string(), "'x' is not declared in any enclosing scope");
        let err = err.at_line(7);
        assert_eq!(err.line(), Some(7));
        assert_eq!(err.to_string(), "line 7: 'x' is not declared in any enclosing scope");
    }

    #[test]
    fn test_duplicate_message() {
        let err = SemanticError::DuplicateDeclaration {
            name: "y".to_string(),
            line: 4,
            previous_line: 2,
        };
        assert!(err.to_string().contains("first declared at line 2"));
    }
}
