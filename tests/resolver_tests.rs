// Name resolution over whole programs.

use pymfront::driver::check;
use pymfront::parser::ast::*;
use pymfront::parser::lexer::tokenize;
use pymfront::parser::parse::Parser;
use pymfront::semantic::{resolve, SemanticError, SymbolKind};

fn parse(source: &str) -> Node {
    Parser::new(tokenize(source).unwrap())
        .parse_program()
        .unwrap()
}

#[test]
fn test_every_use_links_to_its_declaration() {
    let source = "\
def sum(int xs[], int n) {
  var total = 0
  for (int i = 0; i < n; i = i + 1) {
    total = total + xs[i]
  }
  return total
}
var data = [1, 2, 3]
var s = sum(data, 3)";
    let mut root = parse(source);
    let resolution = resolve(&mut root);
    assert!(resolution.is_ok(), "{:?}", resolution.errors);

    let mut unresolved = Vec::new();
    root.walk(&mut |n| {
        if n.ident().is_some() && n.symbol.is_none() {
            unresolved.push(n.line);
        }
    });
    assert!(unresolved.is_empty());

    // Each SymbolRef points at a declaring node in the same tree
    root.walk(&mut |n| {
        if let Some(sym) = &n.symbol {
            let decl = root.find(sym.decl).unwrap();
            assert_eq!(decl.decl.as_ref().map(|d| d.name.as_str()), n.ident());
        }
    });

    let global = resolution.table.scope(resolution.global);
    let sum = global.get("sum").unwrap();
    assert_eq!(sum.kind, SymbolKind::Function);
    assert_eq!(sum.uses.len(), 1);
    assert_eq!(sum.uses[0].line, 9);
}

#[test]
fn test_shadowing_across_blocks() {
    let source = "\
var x = \"outer\"
def f() {
  var x = 1
  {
    var x = 2.5
    x = x
  }
  return x
}";
    let mut root = parse(source);
    let resolution = resolve(&mut root);
    assert!(resolution.is_ok(), "{:?}", resolution.errors);

    let mut types_by_line = Vec::new();
    root.walk(&mut |n| {
        if n.ident() == Some("x") {
            types_by_line.push((n.line, n.ty));
        }
    });
    assert_eq!(
        types_by_line,
        vec![
            (6, ExprType::Rational),
            (6, ExprType::Rational),
            (8, ExprType::Int)
        ]
    );
}

#[test]
fn test_branch_bodies_scope_their_declarations() {
    let source = "\
var c = 1
if (c) var y = 2
elif (c) var y = 3
else var y = \"s\"
y = 4";
    let mut root = parse(source);
    let resolution = resolve(&mut root);
    assert_eq!(
        resolution.errors,
        vec![SemanticError::NameNotFound {
            name: "y".to_string(),
            line: Some(5),
        }]
    );

    let header = &root.child(0).unwrap().items()[1];
    let mut body_scopes = Vec::new();
    for branch in header.child(0).unwrap().items() {
        let body = branch.child(branch.arity() - 1).unwrap();
        assert_eq!(body.stmt_kind(), Some(StmtKind::Decl));
        body_scopes.push(body.scope);
    }
    assert_eq!(body_scopes.len(), 3);
    assert!(body_scopes.iter().all(Option::is_some));
    body_scopes.dedup();
    assert_eq!(body_scopes.len(), 3);
}

#[test]
fn test_multiple_errors_in_one_pass() {
    let source = "\
def f(a, a) {
  return b
}
def f() { }
g = 1";
    let mut root = parse(source);
    let resolution = resolve(&mut root);
    let summary: Vec<(&str, Option<usize>)> = resolution
        .errors
        .iter()
        .map(|e| match e {
            SemanticError::DuplicateDeclaration { .. } => ("dup", e.line()),
            SemanticError::NameNotFound { .. } => ("missing", e.line()),
            SemanticError::InvalidAssignmentTarget { .. } => ("target", e.line()),
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("dup", Some(1)),
            ("missing", Some(2)),
            ("dup", Some(4)),
            ("missing", Some(5)),
        ]
    );
}

#[test]
fn test_scope_annotations_on_nodes() {
    let mut root = parse("def f() { if (1) { var y = 2 } }");
    let resolution = resolve(&mut root);
    assert!(resolution.is_ok());

    let mut scoped = Vec::new();
    root.walk(&mut |n| {
        if let Some(scope) = n.scope {
            scoped.push((n.stmt_kind(), scope.index()));
        }
    });
    assert_eq!(
        scoped,
        vec![
            (Some(StmtKind::Compound), 0),
            (Some(StmtKind::Def), 1),
            (Some(StmtKind::Compound), 1),
            (Some(StmtKind::Compound), 2),
        ]
    );
    assert_eq!(resolution.table.chain(resolution.table.scopes()[2].id).len(), 3);
}

#[test]
fn test_annotated_render() {
    let (root, _) = check("var a = 1\na = a + 1").unwrap();
    let expected = "\
Stmt Compound @1 [scope 0]
  List Stmt [2] @1
    Stmt Decl ? a @1
      Expr Num(1/1) @1 : int
    Stmt Expr @2
      Expr Op(=) @2 : int
        Expr Id(a) @2 : int & -> #1 in scope 0
        Expr Op(+) @2 : int
          Expr Id(a) @2 : int & -> #1 in scope 0
          Expr Num(1/1) @2 : int
";
    assert_eq!(root.render_annotated(), expected);
}
