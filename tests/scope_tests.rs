// Symbol table properties: duplicate detection, shadowing, chain lookup.

use pymfront::parser::ast::ExprType;
use pymfront::semantic::{SemanticError, Symbol, SymbolKind, SymbolTable};

fn var(decl: usize, line: usize) -> Symbol {
    Symbol::new(SymbolKind::Variable, decl, line).with_type(ExprType::Int, 0)
}

#[test]
fn test_duplicate_only_within_one_scope() {
    let mut table = SymbolTable::new();
    let s = table.new_scope(None, 0, 1);
    let child = table.new_scope(Some(s), 1, 2);

    assert!(table.declare(s, "x", var(10, 1)).is_ok());
    assert!(matches!(
        table.declare(s, "x", var(11, 2)),
        Err(SemanticError::DuplicateDeclaration { .. })
    ));
    assert!(table.declare(child, "x", var(12, 3)).is_ok());

    assert_eq!(table.lookup(child, "x").unwrap().decl, 12);
    assert_eq!(table.lookup(s, "x").unwrap().decl, 10);
}

#[test]
fn test_chain_lookup_is_one_directional() {
    let mut table = SymbolTable::new();
    let global = table.new_scope(None, 0, 1);
    let a = table.new_scope(Some(global), 1, 2);
    let b = table.new_scope(Some(a), 2, 3);
    table.declare(global, "only_global", var(1, 1)).unwrap();
    table.declare(b, "only_b", var(2, 3)).unwrap();

    assert!(table.lookup(b, "only_global").is_ok());
    assert!(table.lookup(a, "only_global").is_ok());
    assert!(matches!(
        table.lookup(global, "only_b"),
        Err(SemanticError::NameNotFound { .. })
    ));
    assert!(table.lookup(a, "only_b").is_err());
}

#[test]
fn test_check_local_vs_lookup() {
    let mut table = SymbolTable::new();
    let global = table.new_scope(None, 0, 1);
    let inner = table.new_scope(Some(global), 1, 2);
    table.declare(global, "g", var(1, 1)).unwrap();

    assert!(!table.check_local(inner, "g"));
    assert!(table.lookup(inner, "g").is_ok());
}

#[test]
fn test_scope_ids_are_stable_and_restart_after_reset() {
    let mut table = SymbolTable::new();
    let ids: Vec<usize> = (0..5)
        .map(|i| table.new_scope(None, i, 1).index())
        .collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    assert_eq!(table.scope(table.scopes()[3].id).origin, 3);

    table.reset();
    assert_eq!(table.len(), 0);
    assert_eq!(table.new_scope(None, 0, 1).index(), 0);
}

#[test]
fn test_independent_tables_do_not_share_ids() {
    let mut first = SymbolTable::new();
    let mut second = SymbolTable::new();
    first.new_scope(None, 0, 1);
    first.new_scope(None, 0, 1);
    assert_eq!(second.new_scope(None, 0, 1).index(), 0);
}

#[test]
fn test_function_symbols_not_addressable() {
    let f = Symbol::new(SymbolKind::Function, 0, 1);
    let p = Symbol::new(SymbolKind::Parameter, 1, 1);
    assert!(!f.is_addr);
    assert!(p.is_addr);
}
