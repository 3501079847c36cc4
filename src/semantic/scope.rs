//! Scoped symbol table
//!
//! A [`SymbolTable`] is an arena that owns every [`Scope`] created during one
//! session. Scopes refer to each other through [`ScopeId`] handles only: the
//! enclosing-scope link is an index, never an owning pointer, so a child
//! scope cannot keep its parent alive and the tree can be dropped in one go.
//!
//! `ScopeId`s are handed out in creation order starting at 0 and are never
//! reused until [`SymbolTable::reset`] starts a new session. Each table
//! carries its own counter; independent parses never share numbering.
//!
//! # Lookup
//!
//! [`SymbolTable::lookup`] checks the starting scope, then follows parent
//! handles outward until a scope binds the name or the global scope misses.
//! Each scope on the chain is visited exactly once.

use super::errors::SemanticError;
use crate::parser::ast::{ExprType, NodeId};
use rustc_hash::FxHashMap;
use std::fmt;
use std::fmt::Write as _;

/// Handle and stable identifier of a scope within one [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a name was bound by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
    Variable,
    Parameter,
}

/// A use-site reference: which node refers to which declaration.
///
/// Stored on the referring AST node and on the resolved [`Symbol`]; it is an
/// observation, never an ownership edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolRef {
    /// The referring node
    pub node: NodeId,
    pub line: usize,
    /// Scope that declares the symbol
    pub scope: ScopeId,
    /// Declaration node of the symbol
    pub decl: NodeId,
}

/// A name bound in a scope
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub decl: NodeId,
    pub line: usize,
    pub ty: ExprType,
    pub is_addr: bool,
    pub size: usize,
    pub uses: Vec<SymbolRef>,
}

impl Symbol {
    pub fn new(kind: SymbolKind, decl: NodeId, line: usize) -> Self {
        Symbol {
            kind,
            decl,
            line,
            ty: ExprType::Unresolved,
            is_addr: !matches!(kind, SymbolKind::Function),
            size: 0,
            uses: Vec::new(),
        }
    }

    pub fn with_type(mut self, ty: ExprType, size: usize) -> Self {
        self.ty = ty;
        self.size = size;
        self
    }
}

/// One lexical block's bindings
#[derive(Debug, Clone)]
pub struct Scope {
    pub id: ScopeId,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// Node that introduced the scope
    pub origin: NodeId,
    pub line: usize,
    symbols: FxHashMap<String, Symbol>,
}

impl Scope {
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Bindings sorted by name.
    pub fn symbols(&self) -> Vec<(&str, &Symbol)> {
        let mut entries: Vec<(&str, &Symbol)> = self
            .symbols
            .iter()
            .map(|(name, sym)| (name.as_str(), sym))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// Arena of scopes for one parse session
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// Drops every scope; the next scope created gets id 0 again.
    pub fn reset(&mut self) {
        self.scopes.clear();
    }

    /// Creates a scope nested in `parent` (`None` for the global scope).
    pub fn new_scope(&mut self, parent: Option<ScopeId>, origin: NodeId, line: usize) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            id,
            parent,
            children: Vec::new(),
            origin,
            line,
            symbols: FxHashMap::default(),
        });
        if let Some(parent) = parent {
            self.scopes[parent.0].children.push(id);
        }
        log::debug!("scope {} opened (parent {:?}, line {})", id, parent.map(|p| p.0), line);
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Binds `name` in `scope`. Fails if `scope` itself already binds it;
    /// a binding of the same name in an enclosing scope is shadowed.
    pub fn declare(&mut self, scope: ScopeId, name: &str, symbol: Symbol) -> Result<(), SemanticError> {
        if let Some(existing) = self.scopes[scope.0].symbols.get(name) {
            return Err(SemanticError::DuplicateDeclaration {
                name: name.to_string(),
                line: symbol.line,
                previous_line: existing.line,
            });
        }
        self.scopes[scope.0].symbols.insert(name.to_string(), symbol);
        Ok(())
    }

    /// Whether `scope`'s own bindings contain `name`; enclosing scopes are
    /// not consulted.
    pub fn check_local(&self, scope: ScopeId, name: &str) -> bool {
        self.scopes[scope.0].symbols.contains_key(name)
    }

    /// Resolves `name` from `scope` outward.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Result<&Symbol, SemanticError> {
        self.lookup_with_scope(scope, name).map(|(_, symbol)| symbol)
    }

    /// Like [`SymbolTable::lookup`], also returning the declaring scope.
    pub fn lookup_with_scope(&self, scope: ScopeId, name: &str) -> Result<(ScopeId, &Symbol), SemanticError> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.0];
            if let Some(symbol) = scope.symbols.get(name) {
                return Ok((id, symbol));
            }
            current = scope.parent;
        }
        Err(SemanticError::NameNotFound {
            name: name.to_string(),
            line: None,
        })
    }

    /// Records a use of `name` declared in `scope`.
    pub fn add_use(&mut self, scope: ScopeId, name: &str, use_site: SymbolRef) {
        if let Some(symbol) = self.scopes[scope.0].symbols.get_mut(name) {
            symbol.uses.push(use_site);
        }
    }

    /// Chain of scope ids from `scope` up to the global scope.
    pub fn chain(&self, scope: ScopeId) -> Vec<ScopeId> {
        let mut chain = Vec::new();
        let mut current = Some(scope);
        while let Some(id) = current {
            chain.push(id);
            current = self.scopes[id.0].parent;
        }
        chain
    }

    /// Deterministic dump: scopes by id, nested by parent, symbols by name.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for scope in self.scopes.iter().filter(|s| s.parent.is_none()) {
            self.render_scope(scope.id, 0, &mut out);
        }
        out
    }

    fn render_scope(&self, id: ScopeId, depth: usize, out: &mut String) {
        let scope = &self.scopes[id.0];
        let indent = depth * 2;
        let _ = writeln!(
            out,
            "{:indent$}scope {} (line {}, node #{})",
            "",
            scope.id,
            scope.line,
            scope.origin,
            indent = indent
        );
        for (name, symbol) in scope.symbols() {
            let _ = write!(
                out,
                "{:indent$}  {:?} {} {}",
                "",
                symbol.kind,
                symbol.ty,
                name,
                indent = indent
            );
            if symbol.size > 0 {
                let _ = write!(out, "[{}]", symbol.size);
            }
            let _ = writeln!(out, " @{} uses={}", symbol.line, symbol.uses.len());
        }
        for child in &scope.children {
            self.render_scope(*child, depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(line: usize) -> Symbol {
        Symbol::new(SymbolKind::Variable, line, line)
    }

    #[test]
    fn test_duplicate_in_same_scope_fails() {
        let mut table = SymbolTable::new();
        let s = table.new_scope(None, 0, 1);
        table.declare(s, "x", var(1)).unwrap();
        let err = table.declare(s, "x", var(2)).unwrap_err();
        assert_eq!(
            err,
            SemanticError::DuplicateDeclaration {
                name: "x".to_string(),
                line: 2,
                previous_line: 1,
            }
        );
        assert_eq!(table.lookup(s, "x").unwrap().line, 1);
    }

    #[test]
    fn test_shadowing_in_child_scope() {
        let mut table = SymbolTable::new();
        let global = table.new_scope(None, 0, 1);
        let inner = table.new_scope(Some(global), 1, 2);
        table.declare(global, "x", var(1)).unwrap();
        table.declare(inner, "x", var(2)).unwrap();

        assert_eq!(table.lookup(inner, "x").unwrap().line, 2);
        assert_eq!(table.lookup(global, "x").unwrap().line, 1);
    }

    #[test]
    fn test_lookup_walks_outward_only() {
        let mut table = SymbolTable::new();
        let global = table.new_scope(None, 0, 1);
        let a = table.new_scope(Some(global), 1, 2);
        let b = table.new_scope(Some(a), 2, 3);
        table.declare(global, "g", var(1)).unwrap();
        table.declare(b, "local", var(3)).unwrap();

        let (found_in, symbol) = table.lookup_with_scope(b, "g").unwrap();
        assert_eq!(found_in, global);
        assert_eq!(symbol.line, 1);

        let err = table.lookup(global, "local").unwrap_err();
        assert!(matches!(err, SemanticError::NameNotFound { ref name, line: None } if name == "local"));
    }

    #[test]
    fn test_check_local_ignores_parents() {
        let mut table = SymbolTable::new();
        let global = table.new_scope(None, 0, 1);
        let inner = table.new_scope(Some(global), 1, 2);
        table.declare(global, "x", var(1)).unwrap();

        assert!(table.check_local(global, "x"));
        assert!(!table.check_local(inner, "x"));
        assert!(table.lookup(inner, "x").is_ok());
    }

    #[test]
    fn test_ids_monotonic_and_reset() {
        let mut table = SymbolTable::new();
        let a = table.new_scope(None, 0, 1);
        let b = table.new_scope(Some(a), 0, 1);
        let c = table.new_scope(Some(b), 0, 1);
        assert!(a < b && b < c);
        assert_eq!(table.chain(c), vec![c, b, a]);
        assert_eq!(table.scope(a).children, vec![b]);

        table.reset();
        assert!(table.is_empty());
        assert_eq!(table.new_scope(None, 0, 1).index(), 0);
    }

    #[test]
    fn test_render_is_sorted() {
        let mut table = SymbolTable::new();
        let global = table.new_scope(None, 0, 1);
        table.declare(global, "zeta", var(2)).unwrap();
        table
            .declare(global, "alpha", var(1).with_type(ExprType::Int, 3))
            .unwrap();
        let inner = table.new_scope(Some(global), 5, 4);
        table
            .declare(inner, "p", Symbol::new(SymbolKind::Parameter, 6, 4))
            .unwrap();

        let expected = "\
scope 0 (line 1, node #0)
  Variable int alpha[3] @1 uses=0
  Variable ? zeta @2 uses=0
  scope 1 (line 4, node #5)
    Parameter ? p @4 uses=0
";
        assert_eq!(table.render(), expected);
    }

    #[test]
    fn test_add_use() {
        let mut table = SymbolTable::new();
        let global = table.new_scope(None, 0, 1);
        table.declare(global, "x", var(1)).unwrap();
        table.add_use(
            global,
            "x",
            SymbolRef {
                node: 9,
                line: 3,
                scope: global,
                decl: 1,
            },
        );
        assert_eq!(table.lookup(global, "x").unwrap().uses.len(), 1);
    }
}
