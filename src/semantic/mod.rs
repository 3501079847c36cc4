//! Scopes, symbols and name resolution
//!
//! - [`scope`]: the [`SymbolTable`](scope::SymbolTable) arena and its lookup rules
//! - [`resolver`]: the pass that builds scopes from a parsed program
//! - [`errors`]: [`SemanticError`](errors::SemanticError)

pub mod errors;
pub mod resolver;
pub mod scope;

pub use errors::SemanticError;
pub use resolver::{resolve, Resolution, Resolver};
pub use scope::{Scope, ScopeId, Symbol, SymbolKind, SymbolRef, SymbolTable};
