//! C source generation: walks the parsed program once per declaration
//! category (types, forward declarations, function bodies), mirroring the
//! teacher's `codegen_c` driver split into its own `types`/`emit` siblings.

mod emit;
mod types;

use plike_lang::{CompileConfig, Node, NodeKind, Symbol, SymbolTable};
use std::collections::HashMap;
use types::Ctx;

const PREAMBLE: &str = "#include <stdbool.h>\n#include <stdio.h>\n#include <memory.h>\n\n";

/// Per-function, declaration-ordered `(name, needs_deref, is_array)` for
/// every parameter, read straight off each `ParameterList` AST node since
/// `SymbolTable::function_parameters` makes no ordering guarantee and call
/// sites only carry positional arguments.
type CallParams = HashMap<String, Vec<(String, bool, bool)>>;

pub struct Generator<'a> {
    symtab: &'a SymbolTable,
    config: &'a CompileConfig,
}

impl<'a> Generator<'a> {
    pub fn new(symtab: &'a SymbolTable, config: &'a CompileConfig) -> Self {
        Generator { symtab, config }
    }

    pub fn generate(&self, program: &Node<'_>) -> String {
        let NodeKind::Program { decls } = &program.kind else {
            return String::new();
        };
        let call_params = build_call_params(decls, self.symtab);
        let ctx = Ctx { symtab: self.symtab, config: self.config, call_params: &call_params };

        let mut out = String::from(PREAMBLE);

        log::debug!(target: "plike_compile::codegen", "pass 1/3: type declarations");
        for decl in decls.iter() {
            if matches!(decl.kind, NodeKind::TypeDeclaration { .. }) {
                emit::emit_type_declaration(type_declaration_record(decl), self.config, &mut out);
            }
        }
        out.push('\n');

        log::debug!(target: "plike_compile::codegen", "pass 2/3: forward declarations");
        for decl in decls.iter() {
            if is_function_like(decl) {
                emit::emit_function_forward_decl(decl, &ctx, &mut out);
            }
        }
        out.push('\n');

        log::debug!(target: "plike_compile::codegen", "pass 3/3: function bodies");
        for decl in decls.iter() {
            if is_function_like(decl) {
                emit::emit_function(decl, &ctx, &mut out);
            }
        }

        log::trace!(target: "plike_compile::codegen", "generated {} bytes of C source", out.len());
        out
    }
}

fn is_function_like(decl: &Node<'_>) -> bool {
    matches!(decl.kind, NodeKind::Function { .. } | NodeKind::Procedure { .. })
}

/// `TypeDeclaration` wraps the actual `RecordType` node one level down;
/// `emit_type_declaration` wants the inner node directly.
fn type_declaration_record<'n>(decl: &'n Node<'n>) -> &'n Node<'n> {
    match &decl.kind {
        NodeKind::TypeDeclaration { record } => record,
        _ => decl,
    }
}

fn build_call_params<'n>(decls: &'n [Node<'n>], symtab: &SymbolTable) -> CallParams {
    let mut map = CallParams::new();
    for decl in decls.iter() {
        let (name, params) = match &decl.kind {
            NodeKind::Function { name, params, .. } => (name.as_str(), *params),
            NodeKind::Procedure { name, params, .. } => (name.as_str(), *params),
            _ => continue,
        };
        let NodeKind::ParameterList { params: param_nodes } = &params.kind else { continue };
        let mut ordered = Vec::new();
        for p in param_nodes.iter() {
            let NodeKind::Parameter { name: pname, .. } = &p.kind else { continue };
            let info = symtab.lookup_parameter(name, pname).and_then(Symbol::as_variable);
            let needs_deref = info.is_some_and(|v| v.needs_deref);
            let is_array = info.is_some_and(|v| v.is_array);
            ordered.push((pname.clone(), needs_deref, is_array));
        }
        map.insert(name.to_string(), ordered);
    }
    map
}
