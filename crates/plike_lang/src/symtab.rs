//! The symbol table: a stack of hash-table scopes.
//!
//! The original design kept function scopes alive only long enough to
//! parse the function body, then popped them and deep-copied each
//! parameter/local into a shadow list stored on the function's own entry in
//! the global scope, purely so the generator (which runs after parsing
//! finishes) could still look them up by name. That duplication is the
//! "per-function duplicated parameter/local lists" re-architecture target:
//! here, scopes are never destroyed. `exit_scope` only moves `current` back
//! to the parent; the child scope and everything in it stays reachable
//! through [`FunctionInfo::scope`] for the rest of the compilation. A
//! function's parameters and locals are the live contents of its own scope,
//! not a second copy of them.

use crate::ast::TypeSpec;
use crate::bounds::ArrayBoundsData;
use crate::token::ParamMode;
use std::collections::HashMap;
use std::fmt;

/// Index of a [`Scope`] inside a [`SymbolTable`]'s arena-like `scopes` vec.
/// Stable for the table's whole lifetime; scopes are appended, never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
    Procedure,
    Parameter,
    Type,
}

/// Shared layout for variables and parameters (spec §3: "VariableInfo /
/// ParameterInfo share layout").
#[derive(Debug, Clone)]
pub struct VariableInfo {
    pub type_spec: TypeSpec,
    pub is_array: bool,
    pub is_pointer: bool,
    pub pointer_level: u32,
    pub bounds: Option<ArrayBoundsData>,
    pub dimensions: usize,
    pub is_parameter: bool,
    pub param_mode: Option<ParamMode>,
    pub needs_deref: bool,
    pub needs_type_declaration: bool,
    pub has_dynamic_size: bool,
}

impl VariableInfo {
    pub fn scalar(type_spec: TypeSpec) -> Self {
        VariableInfo {
            type_spec,
            is_array: false,
            is_pointer: false,
            pointer_level: 0,
            bounds: None,
            dimensions: 0,
            is_parameter: false,
            param_mode: None,
            needs_deref: false,
            needs_type_declaration: false,
            has_dynamic_size: false,
        }
    }
}

/// A declared function or procedure. `scope` points at the (still-alive)
/// function scope holding its parameters and locals.
#[derive(Debug, Clone)]
pub struct FunctionInfo {
    pub return_type: Option<TypeSpec>,
    pub is_procedure: bool,
    pub is_pointer: bool,
    pub pointer_level: u32,
    pub scope: ScopeId,
    pub has_return_var: bool,
}

#[derive(Debug, Clone)]
pub struct RecordFieldData {
    pub name: String,
    pub type_spec: TypeSpec,
    pub array_info: Option<crate::ast::ArrayInfo>,
}

#[derive(Debug, Clone)]
pub struct RecordTypeData {
    pub name: String,
    pub is_typedef: bool,
    pub is_nested: bool,
    pub fields: Vec<RecordFieldData>,
}

#[derive(Debug, Clone)]
pub enum SymbolPayload {
    Variable(VariableInfo),
    Function(FunctionInfo),
    Type(RecordTypeData),
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub scope: ScopeId,
    pub payload: SymbolPayload,
}

impl Symbol {
    pub fn as_variable(&self) -> Option<&VariableInfo> {
        match &self.payload {
            SymbolPayload::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_variable_mut(&mut self) -> Option<&mut VariableInfo> {
        match &mut self.payload {
            SymbolPayload::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionInfo> {
        match &self.payload {
            SymbolPayload::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&RecordTypeData> {
        match &self.payload {
            SymbolPayload::Type(t) => Some(t),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Scope {
    kind: ScopeKind,
    parent: Option<ScopeId>,
    symbols: HashMap<String, Symbol>,
    function_name: Option<String>,
}

/// Errors the symbol table itself can raise: duplicate declarations and
/// scope-depth overflow (spec §4.2: "scope depth bounded; overflow is a
/// fatal error").
#[derive(Debug, Clone)]
pub enum SymtabError {
    DuplicateDeclaration(String),
    ScopeOverflow,
}

impl fmt::Display for SymtabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymtabError::DuplicateDeclaration(name) => {
                write!(f, "'{name}' is already declared in this scope")
            }
            SymtabError::ScopeOverflow => write!(f, "scope nesting depth exceeded"),
        }
    }
}

impl std::error::Error for SymtabError {}

const MAX_SCOPE_DEPTH: usize = 256;

/// Stack of hash-table scopes rooted at a persistent global scope.
pub struct SymbolTable {
    scopes: Vec<Scope>,
    global: ScopeId,
    current: ScopeId,
}

impl SymbolTable {
    pub fn new() -> Self {
        let global = Scope {
            kind: ScopeKind::Global,
            parent: None,
            symbols: HashMap::new(),
            function_name: None,
        };
        SymbolTable {
            scopes: vec![global],
            global: ScopeId(0),
            current: ScopeId(0),
        }
    }

    pub fn global_scope(&self) -> ScopeId {
        self.global
    }

    pub fn current_scope(&self) -> ScopeId {
        self.current
    }

    /// Current nesting depth, counting the global scope as depth 1.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cur = Some(self.current);
        while let Some(id) = cur {
            depth += 1;
            cur = self.scopes[id.0].parent;
        }
        depth
    }

    pub fn enter_scope(&mut self, kind: ScopeKind) -> Result<ScopeId, SymtabError> {
        if self.depth() >= MAX_SCOPE_DEPTH {
            return Err(SymtabError::ScopeOverflow);
        }
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            kind,
            parent: Some(self.current),
            symbols: HashMap::new(),
            function_name: None,
        });
        self.current = id;
        Ok(id)
    }

    /// Pops back to the parent scope. The exited scope and its symbols stay
    /// allocated and reachable via any [`FunctionInfo::scope`] that points
    /// at it; nothing is freed or copied here.
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current.0].parent {
            self.current = parent;
        }
    }

    fn insert(&mut self, scope: ScopeId, symbol: Symbol) -> Result<(), SymtabError> {
        let scope = &mut self.scopes[scope.0];
        if scope.symbols.contains_key(&symbol.name) {
            return Err(SymtabError::DuplicateDeclaration(symbol.name));
        }
        scope.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    pub fn add_variable(&mut self, name: &str, info: VariableInfo) -> Result<(), SymtabError> {
        let current = self.current;
        self.insert(
            current,
            Symbol {
                name: name.to_string(),
                kind: SymbolKind::Variable,
                scope: current,
                payload: SymbolPayload::Variable(info),
            },
        )?;
        self.register_local_if_in_function(name);
        Ok(())
    }

    pub fn add_array(&mut self, name: &str, mut info: VariableInfo, bounds: ArrayBoundsData) -> Result<(), SymtabError> {
        info.is_array = true;
        info.dimensions = bounds.dimensions;
        info.bounds = Some(bounds);
        self.add_variable(name, info)
    }

    pub fn add_parameter(&mut self, name: &str, info: VariableInfo) -> Result<(), SymtabError> {
        let mut info = info;
        info.is_parameter = true;
        let current = self.current;
        self.insert(
            current,
            Symbol {
                name: name.to_string(),
                kind: SymbolKind::Parameter,
                scope: current,
                payload: SymbolPayload::Variable(info),
            },
        )
    }

    /// Declares a function or procedure in the global scope, then opens its
    /// function scope and returns the id so the caller can populate
    /// parameters/locals into it before calling [`SymbolTable::exit_scope`].
    pub fn add_function(
        &mut self,
        name: &str,
        return_type: Option<TypeSpec>,
        is_procedure: bool,
        pointer_level: u32,
    ) -> Result<ScopeId, SymtabError> {
        let fn_scope = self.enter_scope(ScopeKind::Function)?;
        self.scopes[fn_scope.0].function_name = Some(name.to_string());
        self.insert(
            self.global,
            Symbol {
                name: name.to_string(),
                kind: if is_procedure { SymbolKind::Procedure } else { SymbolKind::Function },
                scope: self.global,
                payload: SymbolPayload::Function(FunctionInfo {
                    return_type,
                    is_procedure,
                    is_pointer: pointer_level > 0,
                    pointer_level,
                    scope: fn_scope,
                    has_return_var: false,
                }),
            },
        )?;
        Ok(fn_scope)
    }

    pub fn add_type(&mut self, name: &str, record: RecordTypeData) -> Result<(), SymtabError> {
        self.insert(
            self.global,
            Symbol {
                name: name.to_string(),
                kind: SymbolKind::Type,
                scope: self.global,
                payload: SymbolPayload::Type(record),
            },
        )
    }

    /// Whether the current scope is a function scope; `add_variable`/
    /// `add_array` use this to decide whether the new symbol also counts as
    /// one of the enclosing function's locals.
    fn register_local_if_in_function(&mut self, _name: &str) {
        // Kept-alive scopes mean a local declared in a function scope is
        // already reachable through that scope directly; no shadow copy is
        // made. This hook exists so callers matching the original
        // `add_local_to_function` call site have somewhere to call into.
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        let mut cur = Some(self.current);
        while let Some(id) = cur {
            if let Some(sym) = self.scopes[id.0].symbols.get(name) {
                return Some(sym);
            }
            cur = self.scopes[id.0].parent;
        }
        None
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        let mut cur = Some(self.current);
        while let Some(id) = cur {
            if self.scopes[id.0].symbols.contains_key(name) {
                return self.scopes[id.0].symbols.get_mut(name);
            }
            cur = self.scopes[id.0].parent;
        }
        None
    }

    pub fn lookup_current_scope(&self, name: &str) -> Option<&Symbol> {
        self.scopes[self.current.0].symbols.get(name)
    }

    pub fn lookup_global(&self, name: &str) -> Option<&Symbol> {
        self.scopes[self.global.0].symbols.get(name)
    }

    pub fn lookup_type(&self, name: &str) -> Option<&RecordTypeData> {
        self.lookup_global(name).and_then(Symbol::as_type)
    }

    fn function_scope_id(&self, function_name: &str) -> Option<ScopeId> {
        self.lookup_global(function_name).and_then(Symbol::as_function).map(|f| f.scope)
    }

    /// Looks up a parameter by function name and parameter name. Resolves
    /// directly against the function's still-alive scope rather than a
    /// deep-copied shadow list, since that scope is never destroyed.
    pub fn lookup_parameter(&self, function_name: &str, param_name: &str) -> Option<&Symbol> {
        let scope_id = self.function_scope_id(function_name)?;
        let sym = self.scopes[scope_id.0].symbols.get(param_name)?;
        (sym.kind == SymbolKind::Parameter).then_some(sym)
    }

    /// All parameters declared in `function_name`'s scope, in arbitrary
    /// order (callers that need declaration order should walk the AST's
    /// `Parameter` list instead; the symbol table exists for type/bounds
    /// lookup, not signature ordering).
    pub fn function_parameters(&self, function_name: &str) -> Vec<&Symbol> {
        match self.function_scope_id(function_name) {
            Some(id) => self.scopes[id.0]
                .symbols
                .values()
                .filter(|s| s.kind == SymbolKind::Parameter)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn function_locals(&self, function_name: &str) -> Vec<&Symbol> {
        match self.function_scope_id(function_name) {
            Some(id) => self.scopes[id.0]
                .symbols
                .values()
                .filter(|s| s.kind == SymbolKind::Variable)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Propagates a late-bound type and array size discovered while parsing
    /// a body-style parameter's `var` declaration onto the parameter symbol
    /// living in the function's own scope. `type_spec` is only applied when
    /// given, since a bounds-only update (e.g. a decl-style array parameter
    /// whose size turns out to be dynamic) shouldn't clobber a type the
    /// signature already supplied.
    pub fn update_parameter_bounds_in_global(
        &mut self,
        function_name: &str,
        param_name: &str,
        type_spec: Option<TypeSpec>,
        bounds: Option<ArrayBoundsData>,
    ) {
        if let Some(scope_id) = self.function_scope_id(function_name) {
            if let Some(sym) = self.scopes[scope_id.0].symbols.get_mut(param_name) {
                if let SymbolPayload::Variable(info) = &mut sym.payload {
                    if let Some(ty) = type_spec {
                        info.pointer_level = ty.pointer_level;
                        info.is_pointer = ty.pointer_level > 0;
                        info.type_spec = ty;
                    }
                    if let Some(bounds) = bounds {
                        info.dimensions = bounds.dimensions;
                        info.is_array = true;
                        info.bounds = Some(bounds);
                    }
                    info.needs_type_declaration = false;
                }
            }
        }
    }

    /// Whether `param_name` in `function_name`'s scope is a parameter still
    /// waiting for its type (body-style parameter declaration).
    pub fn parameter_needs_type(&self, function_name: &str, param_name: &str) -> bool {
        self.lookup_parameter(function_name, param_name)
            .and_then(Symbol::as_variable)
            .map_or(false, |v| v.needs_type_declaration)
    }

    /// Patches a function's return type and pointer level once known.
    /// Needed because the trailing `: type` signature form is only parsed
    /// after `add_function` has already declared the function (the parser
    /// doesn't know the return type until after the parameter list closes).
    pub fn set_function_signature(&mut self, function_name: &str, return_type: Option<TypeSpec>, pointer_level: u32) {
        if let Some(sym) = self.scopes[self.global.0].symbols.get_mut(function_name) {
            if let SymbolPayload::Function(info) = &mut sym.payload {
                info.return_type = return_type;
                info.pointer_level = pointer_level;
                info.is_pointer = pointer_level > 0;
            }
        }
    }

    pub fn mark_has_return_var(&mut self, function_name: &str) {
        if let Some(sym) = self.scopes[self.global.0].symbols.get_mut(function_name) {
            if let SymbolPayload::Function(info) = &mut sym.payload {
                info.has_return_var = true;
            }
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{TypeName, TypeSpec};

    #[test]
    fn duplicate_declaration_in_same_scope_fails() {
        let mut table = SymbolTable::new();
        table
            .add_variable("x", VariableInfo::scalar(TypeSpec::scalar(TypeName::Integer)))
            .unwrap();
        let err = table
            .add_variable("x", VariableInfo::scalar(TypeSpec::scalar(TypeName::Integer)))
            .unwrap_err();
        assert!(matches!(err, SymtabError::DuplicateDeclaration(_)));
    }

    #[test]
    fn lookup_walks_up_parent_chain() {
        let mut table = SymbolTable::new();
        table
            .add_variable("g", VariableInfo::scalar(TypeSpec::scalar(TypeName::Integer)))
            .unwrap();
        table.enter_scope(ScopeKind::Block).unwrap();
        assert!(table.lookup("g").is_some());
        assert!(table.lookup_current_scope("g").is_none());
    }

    #[test]
    fn exit_scope_shortens_depth_but_keeps_symbols_alive() {
        let mut table = SymbolTable::new();
        let depth_before = table.depth();
        let fn_scope = table.add_function("inc", None, true, 0).unwrap();
        table
            .add_parameter(
                "n",
                VariableInfo::scalar(TypeSpec::scalar(TypeName::Integer)),
            )
            .unwrap();
        assert_eq!(table.depth(), depth_before + 1);
        table.exit_scope();
        assert_eq!(table.depth(), depth_before);
        // still reachable: parameter lives on in the kept-alive function scope.
        assert!(table.lookup_parameter("inc", "n").is_some());
        assert_eq!(table.function_parameters("inc").len(), 1);
        let _ = fn_scope;
    }

    #[test]
    fn update_parameter_bounds_reaches_into_exited_scope() {
        let mut table = SymbolTable::new();
        table.add_function("f", None, true, 0).unwrap();
        let mut info = VariableInfo::scalar(TypeSpec::scalar(TypeName::Integer));
        info.needs_type_declaration = true;
        table.add_parameter("a", info).unwrap();
        table.exit_scope();

        let bounds = ArrayBoundsData::new(vec![crate::bounds::DimensionBounds::sized(crate::bounds::Bound::Constant(10))]);
        table.update_parameter_bounds_in_global("f", "a", None, Some(bounds));
        let sym = table.lookup_parameter("f", "a").unwrap();
        let info = sym.as_variable().unwrap();
        assert!(info.is_array);
        assert!(!info.needs_type_declaration);
    }

    #[test]
    fn update_parameter_bounds_patches_type_for_body_style_parameter() {
        let mut table = SymbolTable::new();
        table.add_function("f", None, true, 0).unwrap();
        let mut info = VariableInfo::scalar(TypeSpec::scalar(TypeName::Integer));
        info.needs_type_declaration = true;
        table.add_parameter("a", info).unwrap();
        table.exit_scope();

        assert!(table.parameter_needs_type("f", "a"));
        table.update_parameter_bounds_in_global("f", "a", Some(TypeSpec::scalar(TypeName::Real)), None);
        let sym = table.lookup_parameter("f", "a").unwrap();
        let info = sym.as_variable().unwrap();
        assert_eq!(info.type_spec.name, TypeName::Real);
        assert!(!info.needs_type_declaration);
        assert!(!table.parameter_needs_type("f", "a"));
    }

    #[test]
    fn scope_overflow_is_an_error() {
        let mut table = SymbolTable::new();
        for _ in 0..MAX_SCOPE_DEPTH {
            let _ = table.enter_scope(ScopeKind::Block);
        }
        assert!(matches!(table.enter_scope(ScopeKind::Block), Err(SymtabError::ScopeOverflow)));
    }
}
