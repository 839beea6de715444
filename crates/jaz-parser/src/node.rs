//! Arena-allocated syntax tree.
//!
//! The tree is a closed tagged union: every pass downstream dispatches with
//! an exhaustive `match` over [`NodeKind`], so adding a node kind surfaces
//! every site that must handle it. Nodes are addressed by [`NodeId`] into a
//! [`NodeArena`]; resolution results live in side tables keyed by `NodeId`,
//! never on the nodes themselves.

use jaz_common::{Modifiers, Span};

/// Index of a node within its owning [`NodeArena`].
///
/// A `NodeId` is only meaningful together with the arena of the compilation
/// unit it was allocated in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Primitive value types of the language.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
}

impl Primitive {
    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Char => "char",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }

    pub fn from_keyword(kw: &str) -> Option<Primitive> {
        Some(match kw {
            "boolean" => Primitive::Boolean,
            "byte" => Primitive::Byte,
            "short" => Primitive::Short,
            "int" => Primitive::Int,
            "long" => Primitive::Long,
            "char" => Primitive::Char,
            "float" => Primitive::Float,
            "double" => Primitive::Double,
            _ => return None,
        })
    }
}

/// Literal values. Floating-point literals keep their source text so
/// regeneration is exact.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Long(i64),
    Float(String),
    Double(String),
    Char(char),
    Str(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    UShr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitXor,
    BitOr,
    And,
    Or,
}

/// The closed set of node kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    // ----- compilation unit level -----
    CompilationUnit {
        /// `package a.b;` clause; a `Name` node.
        package: Option<NodeId>,
        imports: Vec<NodeId>,
        types: Vec<NodeId>,
    },
    /// `import a.b.C;`
    ImportSingle { name: NodeId },
    /// `import a.b.*;`
    ImportOnDemand { name: NodeId },

    // ----- names -----
    /// A possibly qualified name: `c` in `a.b.c` has qualifier `a.b`.
    /// This is the node resolution annotates with a declaration.
    Name {
        qualifier: Option<NodeId>,
        ident: String,
    },

    // ----- declarations -----
    ClassDecl {
        modifiers: Modifiers,
        name: String,
        extends: Option<NodeId>,
        implements: Vec<NodeId>,
        members: Vec<NodeId>,
    },
    InterfaceDecl {
        modifiers: Modifiers,
        name: String,
        extends: Vec<NodeId>,
        members: Vec<NodeId>,
    },
    FieldDecl {
        modifiers: Modifiers,
        ty: NodeId,
        name: String,
        init: Option<NodeId>,
    },
    MethodDecl {
        modifiers: Modifiers,
        return_ty: NodeId,
        name: String,
        params: Vec<NodeId>,
        throws: Vec<NodeId>,
        /// Absent for abstract and interface methods.
        body: Option<NodeId>,
    },
    ConstructorDecl {
        modifiers: Modifiers,
        name: String,
        params: Vec<NodeId>,
        throws: Vec<NodeId>,
        /// Arguments of the leading `super(...)` call, if written.
        super_args: Option<Vec<NodeId>>,
        body: NodeId,
    },
    /// A `static { ... }` or bare `{ ... }` member; `body` is a `Block`.
    InitializerBlock {
        is_static: bool,
        body: NodeId,
    },
    Param {
        modifiers: Modifiers,
        ty: NodeId,
        name: String,
    },

    // ----- types -----
    PrimitiveType(Primitive),
    VoidType,
    /// A class or interface type; `name` is a `Name` node.
    NamedType { name: NodeId },
    ArrayType { element: NodeId },

    // ----- statements -----
    Block { stmts: Vec<NodeId> },
    LocalVarDecl {
        modifiers: Modifiers,
        ty: NodeId,
        name: String,
        init: Option<NodeId>,
    },
    ExprStmt { expr: NodeId },
    If {
        cond: NodeId,
        then_stmt: NodeId,
        else_stmt: Option<NodeId>,
    },
    While { cond: NodeId, body: NodeId },
    DoWhile { body: NodeId, cond: NodeId },
    For {
        init: Vec<NodeId>,
        cond: Option<NodeId>,
        update: Vec<NodeId>,
        body: NodeId,
    },
    Switch { selector: NodeId, cases: Vec<NodeId> },
    SwitchCase {
        /// `None` marks the `default` label.
        labels: Vec<Option<NodeId>>,
        stmts: Vec<NodeId>,
    },
    /// `break` / `continue`; the optional label is a `Name` node.
    Break { label: Option<NodeId> },
    Continue { label: Option<NodeId> },
    Return { expr: Option<NodeId> },
    Throw { expr: NodeId },
    Try {
        body: NodeId,
        catches: Vec<NodeId>,
        finally: Option<NodeId>,
    },
    Catch { param: NodeId, body: NodeId },
    Labeled { label: String, stmt: NodeId },
    EmptyStmt,

    // ----- expressions -----
    Literal { value: Literal },
    This,
    /// A bare or dotted name in expression position, before resolution.
    /// Pass 2 rewrites this node in place into one of the resolved access
    /// forms below.
    NameRef { name: NodeId },
    /// Reference to a local variable or parameter (resolved form).
    LocalRef { name: NodeId },
    /// Unqualified access to an instance field of the enclosing type
    /// (resolved form of a bare name denoting a non-static field).
    ThisFieldAccess { name: NodeId },
    /// Static member access qualified by a type (resolved form).
    TypeFieldAccess { ty: NodeId, name: NodeId },
    /// Member access qualified by an object expression.
    FieldAccess { object: NodeId, name: NodeId },
    Call { callee: NodeId, args: Vec<NodeId> },
    New { ty: NodeId, args: Vec<NodeId> },
    Cast { ty: NodeId, expr: NodeId },
    InstanceOf { expr: NodeId, ty: NodeId },
    Unary { op: UnaryOp, operand: NodeId },
    Binary { op: BinaryOp, lhs: NodeId, rhs: NodeId },
    Assign {
        /// `None` for plain `=`, the operator for compound assignment.
        op: Option<BinaryOp>,
        lhs: NodeId,
        rhs: NodeId,
    },
    ArrayAccess { array: NodeId, index: NodeId },
    Cond {
        cond: NodeId,
        then_expr: NodeId,
        else_expr: NodeId,
    },
}

#[derive(Clone, Debug)]
pub struct Node {
    pub span: Span,
    pub kind: NodeKind,
}

/// Owning arena for one compilation unit's nodes.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { span, kind });
        id
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    /// Replace a node's kind in place, preserving its identity (and with it
    /// every side-table association keyed by this `NodeId`).
    pub fn replace_kind(&mut self, id: NodeId, kind: NodeKind) {
        self.nodes[id.index()].kind = kind;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Render a `Name` node back to its dotted source form.
    pub fn name_to_string(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Name { qualifier, ident } => match qualifier {
                Some(q) => format!("{}.{}", self.name_to_string(*q), ident),
                None => ident.clone(),
            },
            other => panic!("name_to_string on non-name node {other:?}"),
        }
    }

    /// The final identifier of a `Name` node.
    pub fn name_ident(&self, id: NodeId) -> &str {
        match self.kind(id) {
            NodeKind::Name { ident, .. } => ident,
            other => panic!("name_ident on non-name node {other:?}"),
        }
    }

    /// Split a `Name` chain into its components, leftmost first.
    pub fn name_parts(&self, id: NodeId) -> Vec<&str> {
        let mut parts = Vec::new();
        self.collect_name_parts(id, &mut parts);
        parts
    }

    fn collect_name_parts<'a>(&'a self, id: NodeId, out: &mut Vec<&'a str>) {
        if let NodeKind::Name { qualifier, ident } = self.kind(id) {
            if let Some(q) = qualifier {
                self.collect_name_parts(*q, out);
            }
            out.push(ident);
        }
    }

    /// Allocate a `Name` chain for a dotted string.
    pub fn intern_dotted_name(&mut self, dotted: &str, span: Span) -> NodeId {
        let mut current: Option<NodeId> = None;
        for part in dotted.split('.') {
            let kind = NodeKind::Name {
                qualifier: current,
                ident: part.to_string(),
            };
            current = Some(self.alloc(kind, span));
        }
        // `split` yields at least one part, so the loop always allocates.
        current.unwrap_or_else(|| unreachable!("empty dotted name"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_name_round_trip() {
        let mut arena = NodeArena::new();
        let id = arena.intern_dotted_name("java.lang.Object", Span::EMPTY);
        assert_eq!(arena.name_to_string(id), "java.lang.Object");
        assert_eq!(arena.name_ident(id), "Object");
        assert_eq!(arena.name_parts(id), vec!["java", "lang", "Object"]);
    }

    #[test]
    fn replace_kind_preserves_identity() {
        let mut arena = NodeArena::new();
        let name = arena.intern_dotted_name("x", Span::EMPTY);
        let id = arena.alloc(NodeKind::NameRef { name }, Span::EMPTY);
        arena.replace_kind(id, NodeKind::LocalRef { name });
        assert!(matches!(arena.kind(id), NodeKind::LocalRef { .. }));
        assert_eq!(arena.span(id), Span::EMPTY);
    }
}
