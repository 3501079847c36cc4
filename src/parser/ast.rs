// AST (Abstract Syntax Tree) definitions for the Pym front end

use super::rational::Rational;
use crate::semantic::scope::{ScopeId, SymbolRef};
use std::fmt;
use std::fmt::Write as _;

/// Unique identifier for AST nodes within one parse, used by scopes and
/// symbols to point back at declarations without holding references.
pub type NodeId = usize;

/// Fixed number of ordered child slots on every node.
pub const MAX_CHILDREN: usize = 4;

/// Statement variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StmtKind {
    Def,
    Decl,
    Compound,
    IfHeader,
    If,
    Elif,
    Else,
    While,
    For,
    Switch,
    Case,
    Default,
    Return,
    Expr,
}

/// Operators carried by `Expr Op` nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Assign,
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Neg, // -x
    Not, // !x
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Assign => "=",
            Operator::Or => "||",
            Operator::And => "&&",
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Add => "+",
            Operator::Sub | Operator::Neg => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::Not => "!",
        }
    }

    pub fn is_unary(self) -> bool {
        matches!(self, Operator::Neg | Operator::Not)
    }
}

/// Expression variants
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Op(Operator),
    Num(Rational),
    Str(String),
    Id(String),
    Call,
    Array,
    ArrayAccess,
}

/// Parameter variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Untyped: `x`
    Dynamic,
    /// Typed scalar: `int x`
    StaticScalar,
    /// Typed array: `int x[]` or `int x[4]`
    StaticArray,
}

/// Variable-length sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Stmt,
    Param,
    Arg,
    Elif,
    Case,
}

/// Node category plus variant
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Stmt(StmtKind),
    Expr(ExprKind),
    Param(ParamKind),
    List(ListKind),
}

/// Semantic type recorded on nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExprType {
    #[default]
    Unresolved,
    Int,
    Rational,
    String,
}

impl fmt::Display for ExprType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExprType::Unresolved => "?",
            ExprType::Int => "int",
            ExprType::Rational => "rat",
            ExprType::String => "str",
        };
        f.write_str(name)
    }
}

/// Attributes of declaring nodes (`Def`, `Decl`, parameters)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclInfo {
    pub name: String,
    pub ty: ExprType,
    /// Array length; 0 for scalars and unsized arrays
    pub size: usize,
}

impl DeclInfo {
    pub fn new(name: impl Into<String>, ty: ExprType, size: usize) -> Self {
        DeclInfo {
            name: name.into(),
            ty,
            size,
        }
    }
}

/// One AST node.
///
/// Children are exclusively owned: the fixed slots hold boxed subtrees and
/// `List` nodes own their entries in `items`. Siblings inside a list are
/// related only by position, so nothing but the parent ever reaches a node
/// through ownership. `symbol` and `scope` are annotations written by the
/// resolver and are plain handles into the symbol table.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub line: usize,
    pub kind: NodeKind,
    children: [Option<Box<Node>>; MAX_CHILDREN],
    items: Vec<Node>,
    pub decl: Option<DeclInfo>,
    pub ty: ExprType,
    pub is_addr: bool,
    pub symbol: Option<SymbolRef>,
    pub scope: Option<ScopeId>,
}

impl Node {
    pub fn new(kind: NodeKind, line: usize) -> Self {
        Node {
            id: 0,
            line,
            kind,
            children: Default::default(),
            items: Vec::new(),
            decl: None,
            ty: ExprType::Unresolved,
            is_addr: false,
            symbol: None,
            scope: None,
        }
    }

    pub fn stmt(kind: StmtKind, line: usize) -> Self {
        Node::new(NodeKind::Stmt(kind), line)
    }

    /// Expression node with its type and addressability derived from the
    /// variant: literals are typed, identifiers and index expressions are
    /// addressable.
    pub fn expr(kind: ExprKind, line: usize) -> Self {
        let ty = match &kind {
            ExprKind::Num(r) if r.is_integer() => ExprType::Int,
            ExprKind::Num(_) => ExprType::Rational,
            ExprKind::Str(_) => ExprType::String,
            _ => ExprType::Unresolved,
        };
        let is_addr = matches!(kind, ExprKind::Id(_) | ExprKind::ArrayAccess);
        let mut node = Node::new(NodeKind::Expr(kind), line);
        node.ty = ty;
        node.is_addr = is_addr;
        node
    }

    pub fn param(kind: ParamKind, line: usize, decl: DeclInfo) -> Self {
        let mut node = Node::new(NodeKind::Param(kind), line);
        node.ty = decl.ty;
        node.is_addr = true;
        node.decl = Some(decl);
        node
    }

    pub fn list(kind: ListKind, line: usize) -> Self {
        Node::new(NodeKind::List(kind), line)
    }

    pub fn list_of(kind: ListKind, line: usize, items: Vec<Node>) -> Self {
        let mut node = Node::list(kind, line);
        node.items = items;
        node
    }

    pub fn with_decl(mut self, decl: DeclInfo) -> Self {
        self.ty = decl.ty;
        self.decl = Some(decl);
        self
    }

    /// Builder form of [`Node::set_child`].
    pub fn with_child(mut self, slot: usize, child: Node) -> Self {
        self.set_child(slot, child);
        self
    }

    pub fn set_child(&mut self, slot: usize, child: Node) {
        debug_assert!(!self.is_list(), "list nodes keep entries in items");
        self.children[slot] = Some(Box::new(child));
    }

    pub fn child(&self, slot: usize) -> Option<&Node> {
        self.children.get(slot).and_then(|c| c.as_deref())
    }

    pub fn child_mut(&mut self, slot: usize) -> Option<&mut Node> {
        self.children.get_mut(slot).and_then(|c| c.as_deref_mut())
    }

    /// Filled child slots in slot order.
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter_map(|c| c.as_deref())
    }

    pub fn children_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.children.iter_mut().filter_map(|c| c.as_deref_mut())
    }

    /// Number of filled child slots.
    pub fn arity(&self) -> usize {
        self.children.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, NodeKind::List(_))
    }

    pub fn items(&self) -> &[Node] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [Node] {
        &mut self.items
    }

    pub fn push_item(&mut self, item: Node) {
        debug_assert!(self.is_list(), "only list nodes hold items");
        self.items.push(item);
    }

    /// Previous and next entries around `index` in a list node.
    pub fn siblings(&self, index: usize) -> (Option<&Node>, Option<&Node>) {
        let prev = index.checked_sub(1).and_then(|i| self.items.get(i));
        let next = self.items.get(index + 1);
        (prev, next)
    }

    pub fn stmt_kind(&self) -> Option<StmtKind> {
        match self.kind {
            NodeKind::Stmt(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn expr_kind(&self) -> Option<&ExprKind> {
        match &self.kind {
            NodeKind::Expr(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn list_kind(&self) -> Option<ListKind> {
        match self.kind {
            NodeKind::List(kind) => Some(kind),
            _ => None,
        }
    }

    /// Identifier text for `Expr Id` nodes.
    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Expr(ExprKind::Id(name)) => Some(name),
            _ => None,
        }
    }

    /// Total number of nodes in this subtree, list entries included.
    pub fn count(&self) -> usize {
        1 + self.children().map(Node::count).sum::<usize>()
            + self.items.iter().map(Node::count).sum::<usize>()
    }

    /// Visits every node in the subtree in pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
        for item in &self.items {
            item.walk(visit);
        }
    }

    /// Finds a node in this subtree by id.
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children()
            .chain(self.items.iter())
            .find_map(|n| n.find(id))
    }

    /// Indented debug rendering, one node per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        render_into(self, 0, false, &mut out);
        out
    }

    /// Like [`Node::render`], plus the resolver's annotations (type,
    /// resolved symbol, owned scope).
    pub fn render_annotated(&self) -> String {
        let mut out = String::new();
        render_into(self, 0, true, &mut out);
        out
    }

    /// One-line description used by the renderer: category, variant, details.
    pub fn label(&self) -> String {
        let mut label = match &self.kind {
            NodeKind::Stmt(kind) => format!("Stmt {:?}", kind),
            NodeKind::Expr(kind) => match kind {
                ExprKind::Op(op) if op.is_unary() => format!("Expr Op(unary {})", op.symbol()),
                ExprKind::Op(op) => format!("Expr Op({})", op.symbol()),
                ExprKind::Num(r) => format!("Expr Num({})", r),
                ExprKind::Str(s) => format!("Expr Str({:?})", s),
                ExprKind::Id(name) => format!("Expr Id({})", name),
                ExprKind::Call => "Expr Call".to_string(),
                ExprKind::Array => "Expr Array".to_string(),
                ExprKind::ArrayAccess => "Expr ArrayAccess".to_string(),
            },
            NodeKind::Param(kind) => format!("Param {:?}", kind),
            NodeKind::List(kind) => format!("List {:?} [{}]", kind, self.items.len()),
        };
        if let Some(decl) = &self.decl {
            let _ = write!(label, " {} {}", decl.ty, decl.name);
            if decl.size > 0 {
                let _ = write!(label, "[{}]", decl.size);
            } else if matches!(self.kind, NodeKind::Param(ParamKind::StaticArray)) {
                label.push_str("[]");
            }
        }
        label
    }
}

fn render_into(node: &Node, depth: usize, annotate: bool, out: &mut String) {
    let _ = write!(out, "{:indent$}{} @{}", "", node.label(), node.line, indent = depth * 2);
    if annotate {
        if matches!(node.kind, NodeKind::Expr(_)) {
            let _ = write!(out, " : {}", node.ty);
            if node.is_addr {
                out.push_str(" &");
            }
        }
        if let Some(sym) = &node.symbol {
            let _ = write!(out, " -> #{} in scope {}", sym.decl, sym.scope);
        }
        if let Some(scope) = node.scope {
            let _ = write!(out, " [scope {}]", scope);
        }
    }
    out.push('\n');
    for child in node.children() {
        render_into(child, depth + 1, annotate, out);
    }
    for item in &node.items {
        render_into(item, depth + 1, annotate, out);
    }
}

/// Structural equality: kinds, lines, attributes and shape. Node ids and
/// resolver annotations are ignored.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.line == other.line
            && self.kind == other.kind
            && self.decl == other.decl
            && self.ty == other.ty
            && self.is_addr == other.is_addr
            && self.items == other.items
            && self
                .children
                .iter()
                .zip(other.children.iter())
                .all(|(a, b)| a == b)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
