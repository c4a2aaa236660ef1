//! The typed AST.
//!
//! Nodes are allocated out of a [`plike_base::Arena`] and reference their
//! children through `&'a` slices and references rather than an index into a
//! side table or an `Rc`-owned graph: the whole tree is built in one parse
//! pass and never mutated again, so a bump arena gives every node a stable
//! lifetime-bound reference for free. `NodeKind` is a genuine sum type, one
//! variant per AST shape, replacing a C-style tagged union.

use crate::bounds::ArrayBoundsData;
use crate::token::ParamMode;
use plike_base::{Arena, Span};

/// Arena specialised to this crate's node type; parsers hold one of these
/// for the duration of a single compilation.
pub type NodeArena<'a> = Arena<Node<'a>>;

/// One of the four built-in scalar types, or a reference to a declared
/// record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeName {
    Integer,
    Real,
    Logical,
    Character,
    Record(String),
}

/// A type annotation: base type plus pointer indirection depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: TypeName,
    pub pointer_level: u32,
}

impl TypeSpec {
    pub fn scalar(name: TypeName) -> Self {
        TypeSpec { name, pointer_level: 0 }
    }
}

/// Array-specific metadata attached to a `VarDecl`, `ArrayDecl`, `Parameter`,
/// or `RecordField` whose declaration includes `array ... of`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayInfo {
    pub dimensions: usize,
    pub bounds: ArrayBoundsData,
    pub has_dynamic_size: bool,
}

/// Binary operators, ordered here by the precedence table in spec §4.3
/// (weakest first) purely for documentation; actual precedence lives in the
/// parser's Pratt-style climb, not in this enum's declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Unary prefix operators. `Deref`/`AddrOf` carry their own node variant
/// (`UnaryOp` with `deref_count`) rather than folding into this enum because
/// `*` can chain (`**p`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
    BitNot,
    AddrOf,
    Deref,
}

/// A single AST node: its shape-specific payload plus the source span it
/// covers, for diagnostics and debug dumps.
#[derive(Debug)]
pub struct Node<'a> {
    pub kind: NodeKind<'a>,
    pub span: Span,
}

impl<'a> Node<'a> {
    pub fn new(kind: NodeKind<'a>, span: Span) -> Self {
        Node { kind, span }
    }
}

/// The tagged-union payload every [`Node`] carries, discriminated by Rust's
/// own enum tag instead of a C `kind` field plus `union`.
#[derive(Debug)]
pub enum NodeKind<'a> {
    Program {
        decls: &'a [Node<'a>],
    },
    Function {
        name: String,
        return_type: Option<TypeSpec>,
        pointer_level: u32,
        params: &'a Node<'a>,
        body: &'a Node<'a>,
    },
    Procedure {
        name: String,
        params: &'a Node<'a>,
        body: &'a Node<'a>,
    },
    ParameterList {
        params: &'a [Node<'a>],
    },
    Parameter {
        name: String,
        type_spec: Option<TypeSpec>,
        mode: ParamMode,
        pointer_level: u32,
        array_info: Option<ArrayInfo>,
        /// Set when the type was omitted from the signature and must be
        /// filled in later from a matching `var` declaration in the body.
        needs_type_declaration: bool,
    },
    VarDecl {
        name: String,
        type_spec: TypeSpec,
        is_array: bool,
        array_info: Option<ArrayInfo>,
    },
    TypeDeclaration {
        name: String,
        record: &'a Node<'a>,
    },
    RecordType {
        name: String,
        is_typedef: bool,
        fields: &'a [Node<'a>],
    },
    RecordField {
        name: String,
        type_spec: TypeSpec,
        array_info: Option<ArrayInfo>,
        nested_record: Option<&'a Node<'a>>,
    },
    Block {
        items: &'a [Node<'a>],
    },

    // Statements
    Assignment {
        target: &'a Node<'a>,
        value: &'a Node<'a>,
    },
    If {
        cond: &'a Node<'a>,
        then_branch: &'a Node<'a>,
        /// `elseif` is modelled as a nested `If` stored here (spec §3).
        else_branch: Option<&'a Node<'a>>,
    },
    While {
        cond: &'a Node<'a>,
        body: &'a Node<'a>,
    },
    For {
        var: String,
        init: &'a Node<'a>,
        end: &'a Node<'a>,
        step: Option<&'a Node<'a>>,
        body: &'a Node<'a>,
    },
    Repeat {
        body: &'a Node<'a>,
        until: &'a Node<'a>,
    },
    Return {
        value: Option<&'a Node<'a>>,
    },
    Print {
        value: &'a Node<'a>,
    },
    Read {
        target: &'a Node<'a>,
    },
    Call {
        callee: String,
        args: &'a [Node<'a>],
    },

    // Expressions
    BinaryOp {
        op: BinOp,
        lhs: &'a Node<'a>,
        rhs: &'a Node<'a>,
    },
    UnaryOp {
        op: UnOp,
        operand: &'a Node<'a>,
        /// Count of chained `*` for nested dereference (`**p`); always 1
        /// for non-`Deref` operators.
        deref_count: u32,
    },
    ArrayAccess {
        base: &'a Node<'a>,
        indices: &'a [Node<'a>],
    },
    FieldAccess {
        base: &'a Node<'a>,
        field: String,
    },
    Identifier {
        name: String,
    },
    /// A use of a variable that may need an implicit dereference inserted
    /// (an unwrapped `out`/`inout` scalar parameter use), or have it
    /// explicitly suppressed with a leading `@`.
    Variable {
        name: String,
        deref_suppressed: bool,
    },
    Number {
        /// The literal exactly as written, already normalised per spec
        /// §4.4's number-emission rules (octal `0o` -> `0`, trailing dot -> `.0`).
        text: String,
        is_real: bool,
    },
    Bool {
        value: bool,
    },
    String {
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use plike_base::Location;
    use std::rc::Rc;

    fn span() -> Span {
        Span::new(0, 1, Location::new(Rc::from("t.pl"), 1, 1))
    }

    #[test]
    fn arena_holds_nested_expression_tree() {
        let arena: NodeArena = Arena::new();
        let one = arena.alloc(Node::new(
            NodeKind::Number {
                text: "1".into(),
                is_real: false,
            },
            span(),
        ));
        let two = arena.alloc(Node::new(
            NodeKind::Number {
                text: "2".into(),
                is_real: false,
            },
            span(),
        ));
        let sum = arena.alloc(Node::new(
            NodeKind::BinaryOp {
                op: BinOp::Add,
                lhs: one,
                rhs: two,
            },
            span(),
        ));
        match &sum.kind {
            NodeKind::BinaryOp { op, lhs, rhs } => {
                assert_eq!(*op, BinOp::Add);
                assert!(matches!(lhs.kind, NodeKind::Number { .. }));
                assert!(matches!(rhs.kind, NodeKind::Number { .. }));
            }
            _ => panic!("expected BinaryOp"),
        }
    }

    #[test]
    fn if_else_branch_holds_nested_if_for_elseif() {
        let arena: NodeArena = Arena::new();
        let cond = arena.alloc(Node::new(NodeKind::Bool { value: true }, span()));
        let then_branch = arena.alloc(Node::new(NodeKind::Block { items: &[] }, span()));
        let inner_cond = arena.alloc(Node::new(NodeKind::Bool { value: false }, span()));
        let inner_then = arena.alloc(Node::new(NodeKind::Block { items: &[] }, span()));
        let elseif = arena.alloc(Node::new(
            NodeKind::If {
                cond: inner_cond,
                then_branch: inner_then,
                else_branch: None,
            },
            span(),
        ));
        let outer = Node::new(
            NodeKind::If {
                cond,
                then_branch,
                else_branch: Some(elseif),
            },
            span(),
        );
        match outer.kind {
            NodeKind::If { else_branch: Some(eb), .. } => {
                assert!(matches!(eb.kind, NodeKind::If { .. }));
            }
            _ => panic!("expected If with nested elseif"),
        }
    }
}
