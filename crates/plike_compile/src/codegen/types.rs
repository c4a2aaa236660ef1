//! C type mapping and the read-only context threaded through emission.
//!
//! plike's AST stores plain owned `String` identifiers rather than interned
//! symbols (see `plike_lang::ast`'s module doc), so unlike a generator built
//! over an interned AST this context carries no `Interner` — every name is
//! already resolved text by the time it reaches codegen.

use plike_lang::{ArrayIndexing, CompileConfig, Symbol, SymbolTable, TypeName, TypeSpec, VariableInfo};
use std::collections::HashMap;

/// C keywords plus runtime-surface identifiers a source name must not collide with.
const C_RESERVED: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else", "enum", "extern",
    "float", "for", "goto", "if", "inline", "int", "long", "register", "restrict", "return", "short", "signed",
    "sizeof", "static", "struct", "switch", "typedef", "union", "unsigned", "void", "volatile", "while", "_Bool",
    "_Complex", "_Imaginary", "bool", "true", "false", "printf", "scanf", "main", "NULL",
];

pub(super) fn is_c_reserved(name: &str) -> bool {
    C_RESERVED.contains(&name)
}

pub(super) fn escape_c_ident(name: &str) -> String {
    if is_c_reserved(name) {
        format!("plike_{name}")
    } else {
        name.to_string()
    }
}

/// The C spelling of a scalar base type, without pointer stars or array
/// brackets (spec §4.4's type-mapping table).
pub(super) fn base_type_str(name: &TypeName) -> String {
    match name {
        TypeName::Integer => "int".to_string(),
        TypeName::Real => "float".to_string(),
        TypeName::Logical => "bool".to_string(),
        TypeName::Character => "char".to_string(),
        TypeName::Record(r) => escape_c_ident(r),
    }
}

/// A type spec's full C spelling including pointer stars, e.g. `int*` or `Pt`.
pub(super) fn type_spec_str(spec: &TypeSpec) -> String {
    let mut s = base_type_str(&spec.name);
    for _ in 0..spec.pointer_level {
        s.push('*');
    }
    s
}

/// Read-only context threaded through every emission call: the symbol table
/// (for parameter/local type and bounds lookup, reached through the
/// still-alive function scopes described in `symtab`'s module doc) and the
/// active configuration (for the array-indexing base the bounds math needs).
pub(super) struct Ctx<'a> {
    pub symtab: &'a SymbolTable,
    pub config: &'a CompileConfig,
    /// Declaration-ordered `(name, needs_deref, is_array)` per function,
    /// read once from each `ParameterList` since the symbol table's own
    /// parameter map makes no ordering guarantee.
    pub call_params: &'a HashMap<String, Vec<(String, bool, bool)>>,
}

impl<'a> Ctx<'a> {
    pub fn indexing(&self) -> ArrayIndexing {
        self.config.array_indexing
    }

    /// A function-local name's `VariableInfo`, checking parameters first
    /// then locals; both live in the same still-alive function scope.
    pub fn variable_info(&self, function: &str, name: &str) -> Option<&'a VariableInfo> {
        let st: &'a SymbolTable = self.symtab;
        st.lookup_parameter(function, name)
            .or_else(|| st.function_locals(function).into_iter().find(|s| s.name == name))
            .and_then(Symbol::as_variable)
    }
}
