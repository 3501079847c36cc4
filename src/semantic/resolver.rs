//! Scope builder
//!
//! Walks a parsed program, opens a scope for every construct that introduces
//! one, declares names as their declarations are reached and resolves every
//! identifier use against the enclosing chain. Results are written back onto
//! the AST (`symbol`, `scope`, `ty`, `is_addr`) and into the returned
//! [`SymbolTable`].
//!
//! # Scoping rules
//!
//! - The global scope belongs to the program root. Every top-level `def` is
//!   declared there before any body is walked, so calls may precede the
//!   callee's definition.
//! - A `def` opens one scope for its parameters; the body block shares it.
//! - Every other block, every `for` and every `case`/`default` clause opens
//!   a scope of its own, and so does a declaration standing alone as the
//!   body of an `if`/`elif`/`else`/`while`.
//! - A declaration's initializer is resolved before the name is bound, so in
//!   `var x = x` the right side sees an outer `x`.
//!
//! Errors are recorded and the walk continues.

use super::errors::SemanticError;
use super::scope::{ScopeId, Symbol, SymbolKind, SymbolRef, SymbolTable};
use crate::parser::ast::*;

/// Output of a resolution pass
#[derive(Debug, Clone)]
pub struct Resolution {
    pub table: SymbolTable,
    pub global: ScopeId,
    /// Every error found, ordered by line
    pub errors: Vec<SemanticError>,
}

impl Resolution {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Resolve `root` with a fresh symbol table.
pub fn resolve(root: &mut Node) -> Resolution {
    Resolver::new().resolve_program(root)
}

#[derive(Debug, Default)]
pub struct Resolver {
    table: SymbolTable,
    errors: Vec<SemanticError>,
}

impl Resolver {
    pub fn new() -> Self {
        Resolver::default()
    }

    /// Resolve into an existing table, e.g. one kept across runs and
    /// [`reset`](SymbolTable::reset) in between.
    pub fn with_table(table: SymbolTable) -> Self {
        Resolver {
            table,
            errors: Vec::new(),
        }
    }

    pub fn resolve_program(mut self, root: &mut Node) -> Resolution {
        let global = self.table.new_scope(None, root.id, root.line);
        root.scope = Some(global);

        if let Some(list) = root.child_mut(0) {
            // Hoist top-level functions
            for item in list.items_mut() {
                if item.stmt_kind() == Some(StmtKind::Def) {
                    self.declare_function(item, global);
                }
            }
            for item in list.items_mut() {
                if item.stmt_kind() == Some(StmtKind::Def) {
                    self.resolve_function_body(item, global);
                } else {
                    self.resolve_stmt(item, global);
                }
            }
        }

        self.errors.sort_by_key(SemanticError::line);
        log::info!(
            "resolved {} scope(s), {} error(s)",
            self.table.len(),
            self.errors.len()
        );

        Resolution {
            table: self.table,
            global,
            errors: self.errors,
        }
    }

    fn declare(&mut self, scope: ScopeId, node: &Node, kind: SymbolKind) {
        let Some(decl) = &node.decl else {
            return;
        };
        let mut symbol = Symbol::new(kind, node.id, node.line).with_type(node.ty, decl.size);
        if kind != SymbolKind::Function {
            symbol.is_addr = node.is_addr;
        }
        log::trace!("declare {} in scope {}", decl.name, scope);
        if let Err(err) = self.table.declare(scope, &decl.name, symbol) {
            self.errors.push(err);
        }
    }

    fn declare_function(&mut self, def: &Node, scope: ScopeId) {
        self.declare(scope, def, SymbolKind::Function);
    }

    /// Parameters and body of a `def` whose name is already bound.
    fn resolve_function_body(&mut self, def: &mut Node, scope: ScopeId) {
        let fn_scope = self.table.new_scope(Some(scope), def.id, def.line);
        def.scope = Some(fn_scope);

        if let Some(params) = def.child_mut(0) {
            for param in params.items_mut() {
                self.declare(fn_scope, param, SymbolKind::Parameter);
            }
        }
        if let Some(body) = def.child_mut(1) {
            body.scope = Some(fn_scope);
            self.resolve_items(body.child_mut(0), fn_scope);
        }
    }

    fn resolve_items(&mut self, list: Option<&mut Node>, scope: ScopeId) {
        if let Some(list) = list {
            for item in list.items_mut() {
                self.resolve_stmt(item, scope);
            }
        }
    }

    fn resolve_stmt(&mut self, node: &mut Node, scope: ScopeId) {
        let Some(kind) = node.stmt_kind() else {
            // Bare expressions only show up in hand-built trees
            self.resolve_expr(node, scope);
            return;
        };

        match kind {
            StmtKind::Def => {
                self.declare_function(node, scope);
                self.resolve_function_body(node, scope);
            }
            StmtKind::Decl => {
                if let Some(init) = node.child_mut(0) {
                    self.resolve_expr(init, scope);
                }
                // `var` takes the initializer's type
                if node.ty == ExprType::Unresolved {
                    if let Some(init_ty) = node.child(0).map(|init| init.ty) {
                        node.ty = init_ty;
                    }
                }
                self.declare(scope, node, SymbolKind::Variable);
            }
            StmtKind::Compound => {
                let inner = self.table.new_scope(Some(scope), node.id, node.line);
                node.scope = Some(inner);
                self.resolve_items(node.child_mut(0), inner);
            }
            StmtKind::IfHeader => self.resolve_items(node.child_mut(0), scope),
            StmtKind::If | StmtKind::Elif | StmtKind::While => {
                if let Some(condition) = node.child_mut(0) {
                    self.resolve_expr(condition, scope);
                }
                if let Some(body) = node.child_mut(1) {
                    self.resolve_body(body, scope);
                }
            }
            StmtKind::Else => {
                if let Some(body) = node.child_mut(0) {
                    self.resolve_body(body, scope);
                }
            }
            StmtKind::For => {
                let inner = self.table.new_scope(Some(scope), node.id, node.line);
                node.scope = Some(inner);
                if let Some(init) = node.child_mut(0) {
                    self.resolve_stmt(init, inner);
                }
                for slot in 1..3 {
                    if let Some(expr) = node.child_mut(slot) {
                        self.resolve_expr(expr, inner);
                    }
                }
                if let Some(body) = node.child_mut(3) {
                    self.resolve_stmt(body, inner);
                }
            }
            StmtKind::Switch => {
                if let Some(scrutinee) = node.child_mut(0) {
                    self.resolve_expr(scrutinee, scope);
                }
                if let Some(cases) = node.child_mut(1) {
                    for clause in cases.items_mut() {
                        self.resolve_stmt(clause, scope);
                    }
                }
            }
            StmtKind::Case => {
                if let Some(value) = node.child_mut(0) {
                    self.resolve_expr(value, scope);
                }
                let inner = self.table.new_scope(Some(scope), node.id, node.line);
                node.scope = Some(inner);
                self.resolve_items(node.child_mut(1), inner);
            }
            StmtKind::Default => {
                let inner = self.table.new_scope(Some(scope), node.id, node.line);
                node.scope = Some(inner);
                self.resolve_items(node.child_mut(0), inner);
            }
            StmtKind::Return | StmtKind::Expr => {
                if let Some(expr) = node.child_mut(0) {
                    self.resolve_expr(expr, scope);
                }
            }
        }
    }

    /// Body of a conditional or loop. A declaration used as the whole body
    /// gets a scope of its own so the name stays inside the branch; a block
    /// opens one anyway.
    fn resolve_body(&mut self, body: &mut Node, scope: ScopeId) {
        if body.stmt_kind() == Some(StmtKind::Decl) {
            let inner = self.table.new_scope(Some(scope), body.id, body.line);
            body.scope = Some(inner);
            self.resolve_stmt(body, inner);
        } else {
            self.resolve_stmt(body, scope);
        }
    }

    fn resolve_expr(&mut self, node: &mut Node, scope: ScopeId) {
        for child in node.children_mut() {
            self.resolve_expr(child, scope);
        }
        for item in node.items_mut() {
            self.resolve_expr(item, scope);
        }

        let kind = match node.expr_kind() {
            Some(kind) => kind.clone(),
            None => return,
        };
        match kind {
            ExprKind::Id(name) => self.resolve_identifier(node, &name, scope),
            ExprKind::Op(Operator::Assign) => {
                let target = node.child(0).map(|lhs| (lhs.is_addr, lhs.ty));
                if let Some((is_addr, ty)) = target {
                    if !is_addr {
                        self.errors
                            .push(SemanticError::InvalidAssignmentTarget { line: node.line });
                    }
                    node.ty = ty;
                }
            }
            ExprKind::Op(op) => {
                let lhs = node.child(0).map_or(ExprType::Unresolved, |n| n.ty);
                let rhs = node.child(1).map_or(ExprType::Unresolved, |n| n.ty);
                node.ty = operator_type(op, lhs, rhs);
            }
            ExprKind::ArrayAccess => {
                node.ty = node.child(0).map_or(ExprType::Unresolved, |n| n.ty);
            }
            ExprKind::Call | ExprKind::Array | ExprKind::Num(_) | ExprKind::Str(_) => {}
        }
    }

    fn resolve_identifier(&mut self, node: &mut Node, name: &str, scope: ScopeId) {
        let found = self
            .table
            .lookup_with_scope(scope, name)
            .map(|(declared_in, symbol)| (declared_in, symbol.decl, symbol.ty, symbol.is_addr));

        match found {
            Ok((declared_in, decl, ty, is_addr)) => {
                let use_site = SymbolRef {
                    node: node.id,
                    line: node.line,
                    scope: declared_in,
                    decl,
                };
                node.symbol = Some(use_site);
                node.ty = ty;
                node.is_addr = is_addr;
                self.table.add_use(declared_in, name, use_site);
            }
            Err(err) => {
                log::debug!("unresolved '{}' at line {}", name, node.line);
                self.errors.push(err.at_line(node.line));
            }
        }
    }
}

/// Result type of an operator application. Comparisons and logic yield
/// `int`; arithmetic on an unresolved operand stays unresolved.
fn operator_type(op: Operator, lhs: ExprType, rhs: ExprType) -> ExprType {
    use ExprType::*;

    match op {
        Operator::Or
        | Operator::And
        | Operator::Eq
        | Operator::Ne
        | Operator::Lt
        | Operator::Le
        | Operator::Gt
        | Operator::Ge
        | Operator::Not => Int,
        Operator::Neg => lhs,
        Operator::Add if lhs == String && rhs == String => String,
        Operator::Add | Operator::Sub | Operator::Mul | Operator::Div | Operator::Mod => {
            match (lhs, rhs) {
                (Int, Int) if op == Operator::Div => Rational,
                (Int, Int) => Int,
                (Int | Rational, Int | Rational) => Rational,
                _ => Unresolved,
            }
        }
        Operator::Assign => lhs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;
    use crate::parser::parse::Parser;

    fn resolved(source: &str) -> (Node, Resolution) {
        let mut root = Parser::new(tokenize(source).unwrap())
            .parse_program()
            .unwrap();
        let resolution = resolve(&mut root);
        (root, resolution)
    }

    fn find_ident<'a>(root: &'a Node, name: &str, line: usize) -> &'a Node {
        let mut found = None;
        root.walk(&mut |n| {
            if found.is_none() && n.ident() == Some(name) && n.line == line {
                found = Some(n);
            }
        });
        found.unwrap()
    }

    #[test]
    fn test_global_and_function_scopes() {
        let (root, res) = resolved("var g = 1\ndef f(a) {\n  return a + g\n}");
        assert!(res.is_ok(), "{:?}", res.errors);
        assert_eq!(root.scope, Some(res.global));

        let a = find_ident(&root, "a", 3);
        let g = find_ident(&root, "g", 3);
        let a_ref = a.symbol.unwrap();
        let g_ref = g.symbol.unwrap();
        assert_eq!(g_ref.scope, res.global);
        assert_ne!(a_ref.scope, res.global);
        assert_eq!(res.table.scope(a_ref.scope).parent, Some(res.global));
    }

    #[test]
    fn test_function_body_shares_parameter_scope() {
        let (root, res) = resolved("def f(a) { var a = 2 }");
        assert_eq!(res.errors.len(), 1);
        assert!(matches!(
            res.errors[0],
            SemanticError::DuplicateDeclaration { ref name, .. } if name == "a"
        ));

        let def = &root.child(0).unwrap().items()[0];
        assert_eq!(def.scope, def.child(1).unwrap().scope);
    }

    #[test]
    fn test_forward_call_is_hoisted() {
        let (_, res) = resolved("def main() { return helper(1) }\ndef helper(x) { return x }");
        assert!(res.is_ok(), "{:?}", res.errors);
        let global = res.table.scope(res.global);
        assert_eq!(global.get("helper").unwrap().uses.len(), 1);
        assert_eq!(global.get("main").unwrap().kind, SymbolKind::Function);
    }

    #[test]
    fn test_initializer_sees_outer_binding() {
        let (root, res) = resolved("var x = 1\n{\n  var x = x\n}");
        assert!(res.is_ok(), "{:?}", res.errors);
        let inner_use = find_ident(&root, "x", 3);
        assert_eq!(inner_use.symbol.unwrap().scope, res.global);
        assert_eq!(inner_use.ty, ExprType::Int);
    }

    #[test]
    fn test_name_not_found_has_line() {
        let (_, res) = resolved("var a = 1\n\nb = a");
        assert_eq!(
            res.errors,
            vec![SemanticError::NameNotFound {
                name: "b".to_string(),
                line: Some(3),
            }]
        );
    }

    #[test]
    fn test_block_scope_does_not_leak() {
        let (_, res) = resolved("{ var t = 1 }\nt = 2");
        assert_eq!(res.errors.len(), 1);
        assert_eq!(res.errors[0].line(), Some(2));
    }

    #[test]
    fn test_bare_branch_declaration_stays_in_branch() {
        let (_, res) = resolved("var c = 1\nif (c) var y = 2\ny = 3\nwhile (c) var z = 1\nvar z = 5");
        assert_eq!(
            res.errors,
            vec![SemanticError::NameNotFound {
                name: "y".to_string(),
                line: Some(3),
            }]
        );
        let global = res.table.scope(res.global);
        assert!(global.get("y").is_none());
        assert!(global.get("z").is_some());
        // global plus one scope per declaring body
        assert_eq!(res.table.len(), 3);
    }

    #[test]
    fn test_invalid_assignment_target() {
        let (_, res) = resolved("def f() { }\nvar x = 0\nf = 1\nx + 1 = 2\nx = 3");
        let lines: Vec<_> = res
            .errors
            .iter()
            .filter(|e| matches!(e, SemanticError::InvalidAssignmentTarget { .. }))
            .map(SemanticError::line)
            .collect();
        assert_eq!(lines, vec![Some(3), Some(4)]);
    }

    #[test]
    fn test_for_and_switch_scopes() {
        let source = "\
def f(n) {
  for (var i = 0; i < n; i = i + 1) { }
  switch (n) {
    case 1: var k = 1
    case 2: var k = 2
    default: var k = 3
  }
  return i
}";
        let (_, res) = resolved(source);
        assert_eq!(
            res.errors,
            vec![SemanticError::NameNotFound {
                name: "i".to_string(),
                line: Some(8),
            }]
        );
        // global, f, for, for body, case, case, default
        assert_eq!(res.table.len(), 7);
    }

    #[test]
    fn test_types_flow_from_declarations() {
        let (root, res) = resolved("rat r = 1\nint xs[4]\nvar s = \"hi\"\nvar y = xs[0] + r\nvar t = s + s");
        assert!(res.is_ok(), "{:?}", res.errors);
        let global = res.table.scope(res.global);
        assert_eq!(global.get("r").unwrap().ty, ExprType::Rational);
        assert_eq!(global.get("xs").unwrap().size, 4);
        assert_eq!(global.get("s").unwrap().ty, ExprType::String);
        assert_eq!(global.get("y").unwrap().ty, ExprType::Rational);
        assert_eq!(global.get("t").unwrap().ty, ExprType::String);
        assert_eq!(find_ident(&root, "xs", 4).ty, ExprType::Int);
    }

    #[test]
    fn test_errors_sorted_and_walk_continues() {
        let (_, res) = resolved("a = 1\nvar x = 1\nvar x = 2\nb = c");
        let lines: Vec<_> = res.errors.iter().map(SemanticError::line).collect();
        assert_eq!(lines, vec![Some(1), Some(3), Some(4), Some(4)]);
    }

    #[test]
    fn test_with_table_after_reset() {
        let mut table = SymbolTable::new();
        table.new_scope(None, 0, 1);
        table.reset();

        let mut root = Parser::new(tokenize("var a = 1").unwrap())
            .parse_program()
            .unwrap();
        let res = Resolver::with_table(table).resolve_program(&mut root);
        assert_eq!(res.global.index(), 0);
    }
}
