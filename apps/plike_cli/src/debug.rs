//! Debug dump sinks: pretty-printed text or Graphviz DOT views of the
//! pipeline's intermediate state, per spec §6's narrow debug-dumper
//! interface. Neither sink performs semantic work and the core crates never
//! depend on this module.

use plike_base::Interner;
use plike_lang::{NodeKind, SymbolTable, Token};

/// Narrow interface the driver calls into after each enabled pipeline stage.
///
/// `dump_ast`/`dump_symbols` take no interner: plike's AST and symbol table
/// store already-resolved owned `String`s rather than interned handles (see
/// `plike_lang::ast`'s module doc), so unlike the token stream there is
/// nothing left to resolve by the time these are called.
pub trait DebugSink {
    fn dump_tokens(&mut self, tokens: &[Token], interner: &Interner);
    fn dump_ast(&mut self, root: &plike_lang::Node<'_>);
    fn dump_symbols(&mut self, table: &SymbolTable);
    fn dump_codegen_trace(&mut self, msg: &str);
}

/// Indented plain-text dumps to stdout, the default sink.
pub struct TextDebugSink;

impl TextDebugSink {
    pub fn new() -> Self {
        TextDebugSink
    }
}

impl Default for TextDebugSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugSink for TextDebugSink {
    fn dump_tokens(&mut self, tokens: &[Token], interner: &Interner) {
        println!("-- tokens --");
        for tok in tokens {
            println!("{:?} {:?} {}", tok.kind, tok.span.loc, interner.resolve(tok.lexeme));
        }
    }

    fn dump_ast(&mut self, root: &plike_lang::Node<'_>) {
        println!("-- ast --");
        print_node(root, 0);
    }

    fn dump_symbols(&mut self, table: &SymbolTable) {
        println!("-- symbols --");
        println!("{} scope(s) at depth {}", table.depth() + 1, table.depth());
    }

    fn dump_codegen_trace(&mut self, msg: &str) {
        println!("-- codegen: {msg} --");
    }
}

fn print_node(node: &plike_lang::Node<'_>, indent: usize) {
    let pad = "  ".repeat(indent);
    println!("{pad}{}", node_label(&node.kind));
    for child in node_children(&node.kind) {
        print_node(child, indent + 1);
    }
}

/// Short tag naming a node's variant, for the text dump's one-line-per-node format.
fn node_label(kind: &NodeKind<'_>) -> String {
    match kind {
        NodeKind::Program { .. } => "Program".to_string(),
        NodeKind::Function { name, .. } => format!("Function({name})"),
        NodeKind::Procedure { name, .. } => format!("Procedure({name})"),
        NodeKind::ParameterList { .. } => "ParameterList".to_string(),
        NodeKind::Parameter { name, .. } => format!("Parameter({name})"),
        NodeKind::VarDecl { name, .. } => format!("VarDecl({name})"),
        NodeKind::TypeDeclaration { name, .. } => format!("TypeDeclaration({name})"),
        NodeKind::RecordType { name, .. } => format!("RecordType({name})"),
        NodeKind::RecordField { name, .. } => format!("RecordField({name})"),
        NodeKind::Block { .. } => "Block".to_string(),
        NodeKind::Assignment { .. } => "Assignment".to_string(),
        NodeKind::If { .. } => "If".to_string(),
        NodeKind::While { .. } => "While".to_string(),
        NodeKind::For { var, .. } => format!("For({var})"),
        NodeKind::Repeat { .. } => "Repeat".to_string(),
        NodeKind::Return { .. } => "Return".to_string(),
        NodeKind::Print { .. } => "Print".to_string(),
        NodeKind::Read { .. } => "Read".to_string(),
        NodeKind::Call { callee, .. } => format!("Call({callee})"),
        NodeKind::BinaryOp { op, .. } => format!("BinaryOp({op:?})"),
        NodeKind::UnaryOp { op, .. } => format!("UnaryOp({op:?})"),
        NodeKind::ArrayAccess { .. } => "ArrayAccess".to_string(),
        NodeKind::FieldAccess { field, .. } => format!("FieldAccess(.{field})"),
        NodeKind::Identifier { name } => format!("Identifier({name})"),
        NodeKind::Variable { name, .. } => format!("Variable({name})"),
        NodeKind::Number { text, .. } => format!("Number({text})"),
        NodeKind::Bool { value } => format!("Bool({value})"),
        NodeKind::String { value } => format!("String({value:?})"),
    }
}

/// Direct child nodes, for the text/DOT dumps' tree walk. Doesn't recurse
/// into `ParameterList`/record-field children beyond one level; this is a
/// debug view, not a full tree serializer.
fn node_children<'a>(kind: &'a NodeKind<'a>) -> Vec<&'a plike_lang::Node<'a>> {
    match kind {
        NodeKind::Program { decls } => decls.iter().collect(),
        NodeKind::Function { params, body, .. } | NodeKind::Procedure { params, body, .. } => vec![*params, *body],
        NodeKind::ParameterList { params } => params.iter().collect(),
        NodeKind::TypeDeclaration { record, .. } => vec![*record],
        NodeKind::RecordType { fields, .. } => fields.iter().collect(),
        NodeKind::RecordField { nested_record, .. } => nested_record.iter().copied().collect(),
        NodeKind::Block { items } => items.iter().collect(),
        NodeKind::Assignment { target, value } => vec![*target, *value],
        NodeKind::If { cond, then_branch, else_branch } => {
            let mut v = vec![*cond, *then_branch];
            v.extend(else_branch.iter().copied());
            v
        }
        NodeKind::While { cond, body } => vec![*cond, *body],
        NodeKind::For { init, end, step, body, .. } => {
            let mut v = vec![*init, *end];
            v.extend(step.iter().copied());
            v.push(*body);
            v
        }
        NodeKind::Repeat { body, until } => vec![*body, *until],
        NodeKind::Return { value } => value.iter().copied().collect(),
        NodeKind::Print { value } | NodeKind::Read { target: value } => vec![*value],
        NodeKind::Call { args, .. } => args.iter().collect(),
        NodeKind::BinaryOp { lhs, rhs, .. } => vec![*lhs, *rhs],
        NodeKind::UnaryOp { operand, .. } => vec![*operand],
        NodeKind::ArrayAccess { base, indices } => std::iter::once(*base).chain(indices.iter()).collect(),
        NodeKind::FieldAccess { base, .. } => vec![*base],
        NodeKind::Identifier { .. } | NodeKind::Variable { .. } | NodeKind::Number { .. } | NodeKind::Bool { .. } | NodeKind::String { .. } => {
            vec![]
        }
    }
}

/// Graphviz DOT dumps: one `digraph` per call, numbering nodes as they're
/// visited, mirroring `debug_visualize_ast`/`debug_visualize_symbol_table`.
pub struct DotDebugSink {
    counter: u32,
}

impl DotDebugSink {
    pub fn new() -> Self {
        DotDebugSink { counter: 0 }
    }
}

impl Default for DotDebugSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugSink for DotDebugSink {
    fn dump_tokens(&mut self, tokens: &[Token], interner: &Interner) {
        println!("digraph tokens {{");
        for (i, tok) in tokens.iter().enumerate() {
            println!("  t{i} [label=\"{:?}: {}\"];", tok.kind, interner.resolve(tok.lexeme));
            if i > 0 {
                println!("  t{} -> t{i};", i - 1);
            }
        }
        println!("}}");
    }

    fn dump_ast(&mut self, root: &plike_lang::Node<'_>) {
        println!("digraph ast {{");
        self.counter = 0;
        self.emit_dot_node(root);
        println!("}}");
    }

    fn dump_symbols(&mut self, table: &SymbolTable) {
        println!("digraph symbols {{");
        println!("  root [label=\"global scope, depth {}\"];", table.depth());
        println!("}}");
    }

    fn dump_codegen_trace(&mut self, msg: &str) {
        eprintln!("codegen: {msg}");
    }
}

impl DotDebugSink {
    fn emit_dot_node(&mut self, node: &plike_lang::Node<'_>) -> u32 {
        let id = self.counter;
        self.counter += 1;
        println!("  n{id} [label=\"{}\"];", node_label(&node.kind).replace('"', "\\\""));
        for child in node_children(&node.kind) {
            let child_id = self.emit_dot_node(child);
            println!("  n{id} -> n{child_id};");
        }
        id
    }
}
