//! Declaration parsing: the top-level program, function/procedure
//! signatures and bodies, `var` declarations, and `type ... record` blocks.

use super::{BoundsParsing, Parser, StmtParsing};
use plike_lang::{
    ArrayInfo, Node, NodeKind, ParamMode, RecordFieldData, RecordTypeData, TokenKind, TypeName, TypeSpec, VariableInfo,
};

pub trait DeclParsing<'a> {
    fn parse_program(&mut self) -> &'a Node<'a>;
}

impl<'a> DeclParsing<'a> for Parser<'a> {
    fn parse_program(&mut self) -> &'a Node<'a> {
        let start = self.current.span.clone();
        let mut decls = Vec::new();
        while !self.check(TokenKind::Eof) {
            match self.parse_top_level_decl() {
                Some(decl) => decls.push(decl),
                None => {
                    if !self.check(TokenKind::Eof) {
                        self.synchronize();
                    }
                }
            }
        }
        let span = start.merge(&self.previous_span());
        log::debug!(target: "plike_compile::parser", "parsed program with {} top-level declarations", decls.len());
        self.arena.alloc(Node::new(NodeKind::Program { decls: self.arena.alloc_slice(decls) }, span))
    }
}

impl<'a> Parser<'a> {
    fn parse_top_level_decl(&mut self) -> Option<Node<'a>> {
        match self.current.kind {
            TokenKind::Type => Some(self.parse_type_declaration()),
            TokenKind::Function => Some(self.parse_function_like(false, None)),
            TokenKind::Procedure => Some(self.parse_function_like(true, None)),
            TokenKind::Integer | TokenKind::Real | TokenKind::Logical | TokenKind::Character => {
                let leading_type = self.parse_type_spec();
                self.expect(TokenKind::Function, "expected 'function' after return type");
                Some(self.parse_function_like(false, Some(leading_type)))
            }
            TokenKind::Identifier if self.peek.kind == TokenKind::Function => {
                let leading_type = self.parse_type_spec();
                self.expect(TokenKind::Function, "expected 'function' after return type");
                Some(self.parse_function_like(false, Some(leading_type)))
            }
            _ => {
                self.error("expected a declaration");
                None
            }
        }
    }

    /// Consumes a base type name (scalar keyword or record type identifier)
    /// plus any trailing pointer `*`/`DEREF` stars.
    fn parse_type_spec(&mut self) -> TypeSpec {
        let name = match self.current.kind {
            TokenKind::Integer => {
                self.advance();
                TypeName::Integer
            }
            TokenKind::Real => {
                self.advance();
                TypeName::Real
            }
            TokenKind::Logical => {
                self.advance();
                TypeName::Logical
            }
            TokenKind::Character => {
                self.advance();
                TypeName::Character
            }
            TokenKind::Identifier => TypeName::Record(self.expect_identifier_text()),
            _ => {
                self.error("expected a type name");
                TypeName::Integer
            }
        };
        let mut pointer_level = 0;
        while matches!(self.current.kind, TokenKind::Multiply | TokenKind::Deref) {
            pointer_level += 1;
            self.advance();
        }
        TypeSpec { name, pointer_level }
    }

    fn parse_function_like(&mut self, is_procedure: bool, leading_type: Option<TypeSpec>) -> Node<'a> {
        let start = self.current.span.clone();
        self.advance(); // 'function' / 'procedure'
        let name = self.expect_identifier_text();
        let prev_function = self.current_function.replace(name.clone());

        let initial_return = if is_procedure { None } else { leading_type };
        let initial_pointer_level = initial_return.as_ref().map_or(0, |t| t.pointer_level);
        if let Err(e) = self.symtab.add_function(&name, initial_return.clone(), is_procedure, initial_pointer_level) {
            self.error(format!("{e}"));
        }

        self.expect(TokenKind::LParen, "expected '('");
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            params.push(self.parse_parameter());
            while self.matches(TokenKind::Comma) {
                params.push(self.parse_parameter());
            }
        }
        self.expect(TokenKind::RParen, "expected ')'");
        let param_list_span = start.merge(&self.previous_span());
        let param_list: &'a Node<'a> =
            self.arena.alloc(Node::new(NodeKind::ParameterList { params: self.arena.alloc_slice(params) }, param_list_span));

        let mut return_type = initial_return;
        if !is_procedure && self.matches(TokenKind::Colon) {
            let ty = self.parse_type_spec();
            self.symtab.set_function_signature(&name, Some(ty.clone()), ty.pointer_level);
            return_type = Some(ty);
        }

        let body = self.parse_function_body(&name);
        self.symtab.exit_scope();
        self.current_function = prev_function;

        let span = start.merge(&self.previous_span());
        if is_procedure {
            Node::new(NodeKind::Procedure { name, params: param_list, body }, span)
        } else {
            let pointer_level = return_type.as_ref().map_or(0, |t| t.pointer_level);
            Node::new(NodeKind::Function { name, return_type, pointer_level, params: param_list, body }, span)
        }
    }

    fn parse_parameter(&mut self) -> Node<'a> {
        let start = self.current.span.clone();
        let mode = match self.current.kind {
            TokenKind::In => {
                self.advance();
                ParamMode::In
            }
            TokenKind::Out => {
                self.advance();
                ParamMode::Out
            }
            TokenKind::Inout => {
                self.advance();
                ParamMode::Inout
            }
            _ => ParamMode::In,
        };

        let mut pointer_level = 0u32;
        while matches!(self.current.kind, TokenKind::Deref | TokenKind::Multiply) {
            pointer_level += 1;
            self.advance();
        }
        let name = self.expect_identifier_text();

        let name_side_bounds = if self.check(TokenKind::LBracket) {
            let dims = self.count_dimensions_via_raw_scan();
            Some(self.parse_bounds_list(dims))
        } else {
            None
        };

        let mut type_spec = None;
        let mut type_side_bounds = None;
        if self.matches(TokenKind::Colon) {
            self.try_consume_dimension_specifier();
            if self.matches(TokenKind::Array) {
                if self.check(TokenKind::LBracket) {
                    let dims = self.count_dimensions_via_raw_scan();
                    type_side_bounds = Some(self.parse_bounds_list(dims));
                }
                self.expect(TokenKind::Of, "expected 'of'");
            }
            let mut ty = self.parse_type_spec();
            ty.pointer_level += pointer_level;
            type_spec = Some(ty);
        }

        let bounds = name_side_bounds.or(type_side_bounds);
        let needs_type_declaration = type_spec.is_none();
        let array_info = bounds.map(|b| ArrayInfo { dimensions: b.dimensions, bounds: b, has_dynamic_size: false });

        let stored_type = type_spec.clone().unwrap_or_else(|| TypeSpec::scalar(TypeName::Integer));
        let mut info = VariableInfo::scalar(stored_type);
        info.param_mode = Some(mode);
        info.pointer_level = pointer_level;
        info.is_pointer = pointer_level > 0;
        info.needs_type_declaration = needs_type_declaration;
        if let Some(ai) = &array_info {
            info.is_array = true;
            info.dimensions = ai.dimensions;
            info.bounds = Some(ai.bounds.clone());
            info.has_dynamic_size = ai.has_dynamic_size;
        }
        info.needs_deref = matches!(mode, ParamMode::Out | ParamMode::Inout) && !info.is_array;

        if let Err(e) = self.symtab.add_parameter(&name, info) {
            self.error(format!("{e}"));
        }

        let span = start.merge(&self.previous_span());
        Node::new(NodeKind::Parameter { name, type_spec, mode, pointer_level, array_info, needs_type_declaration }, span)
    }

    fn parse_function_body(&mut self, function_name: &str) -> &'a Node<'a> {
        let start = self.current.span.clone();
        let mut items = Vec::new();
        while self.check(TokenKind::Var) {
            items.extend(self.parse_var_decl());
        }
        self.default_untyped_parameters(function_name);

        self.expect(TokenKind::Begin, "expected 'begin'");
        while !matches!(
            self.current.kind,
            TokenKind::End | TokenKind::EndFunction | TokenKind::EndProcedure | TokenKind::Eof
        ) {
            match self.parse_statement() {
                Some(stmt) => items.push(stmt),
                None => break,
            }
        }
        match self.current.kind {
            TokenKind::End => {
                self.advance();
                let end_name = self.expect_identifier_text();
                if end_name != function_name {
                    self.error(format!("'end {end_name}' does not match '{function_name}'"));
                }
            }
            TokenKind::EndFunction | TokenKind::EndProcedure => {
                self.advance();
            }
            _ => self.error("expected 'end' or 'endfunction'/'endprocedure'"),
        }

        let span = start.merge(&self.previous_span());
        self.arena.alloc(Node::new(NodeKind::Block { items: self.arena.alloc_slice(items) }, span))
    }

    /// Any parameter still waiting for a type once the body has been fully
    /// parsed (no matching `var` ever supplied one) defaults to `integer`,
    /// matching how an untyped bounds-only parameter is lowered in practice.
    fn default_untyped_parameters(&mut self, function_name: &str) {
        let pending: Vec<String> = self
            .symtab
            .function_parameters(function_name)
            .iter()
            .filter(|s| s.as_variable().is_some_and(|v| v.needs_type_declaration))
            .map(|s| s.name.clone())
            .collect();
        for name in pending {
            self.symtab
                .update_parameter_bounds_in_global(function_name, &name, Some(TypeSpec::scalar(TypeName::Integer)), None);
        }
    }

    fn parse_var_decl(&mut self) -> Vec<Node<'a>> {
        let start = self.current.span.clone();
        self.advance(); // 'var'
        let mut names = vec![self.expect_identifier_text()];
        while self.matches(TokenKind::Comma) {
            names.push(self.expect_identifier_text());
        }

        let shared_bounds = if self.check(TokenKind::LBracket) {
            let dims = self.count_dimensions_via_raw_scan();
            Some(self.parse_bounds_list(dims))
        } else {
            None
        };

        self.expect(TokenKind::Colon, "expected ':'");
        self.try_consume_dimension_specifier();
        let mut has_dynamic_size = false;
        let mut type_bounds = None;
        if self.matches(TokenKind::Array) {
            if self.check(TokenKind::LBracket) {
                let dims = self.count_dimensions_via_raw_scan();
                type_bounds = Some(self.parse_bounds_list(dims));
            } else {
                has_dynamic_size = true;
            }
            self.expect(TokenKind::Of, "expected 'of'");
        }
        let type_spec = self.parse_type_spec();
        self.matches(TokenKind::Semicolon);

        let bounds = shared_bounds.or(type_bounds);
        let is_array = bounds.is_some() || has_dynamic_size;
        let array_info = bounds.map(|b| ArrayInfo { dimensions: b.dimensions, bounds: b, has_dynamic_size });

        let mut nodes = Vec::with_capacity(names.len());
        for name in names {
            self.declare_var_decl_name(&name, &type_spec, &array_info, is_array, has_dynamic_size);
            nodes.push(Node::new(
                NodeKind::VarDecl { name, type_spec: type_spec.clone(), is_array, array_info: array_info.clone() },
                start.clone(),
            ));
        }
        nodes
    }

    fn declare_var_decl_name(
        &mut self,
        name: &str,
        type_spec: &TypeSpec,
        array_info: &Option<ArrayInfo>,
        is_array: bool,
        has_dynamic_size: bool,
    ) {
        let function_name = self.current_function.clone();

        // The function's own name declares its implicit return slot; it is
        // parsed like any other `var` but never installed as an ordinary
        // local (nothing else in the function scope could be shadowing it,
        // since this is the first and only declaration with that name).
        if function_name.as_deref() == Some(name) {
            if let Some(f) = &function_name {
                self.symtab.mark_has_return_var(f);
            }
            return;
        }

        if let Some(f) = &function_name {
            if self.symtab.parameter_needs_type(f, name) {
                let bounds = array_info.as_ref().map(|ai| ai.bounds.clone());
                self.symtab.update_parameter_bounds_in_global(f, name, Some(type_spec.clone()), bounds);
                return;
            }
        }

        let mut info = VariableInfo::scalar(type_spec.clone());
        info.is_array = is_array;
        info.has_dynamic_size = has_dynamic_size;
        if let Some(ai) = array_info {
            info.dimensions = ai.dimensions;
            info.bounds = Some(ai.bounds.clone());
        }
        if let Err(e) = self.symtab.add_variable(name, info) {
            self.error(format!("{e}"));
        }
    }

    fn parse_type_declaration(&mut self) -> Node<'a> {
        let start = self.current.span.clone();
        self.advance(); // 'type'
        let name = self.expect_identifier_text();
        self.expect(TokenKind::Colon, "expected ':'");
        let record = self.parse_record_type(name.clone(), true);
        let span = start.merge(&self.previous_span());
        Node::new(NodeKind::TypeDeclaration { name, record: self.arena.alloc(record) }, span)
    }

    fn parse_record_type(&mut self, name: String, is_typedef: bool) -> Node<'a> {
        let start = self.current.span.clone();
        self.expect(TokenKind::Record, "expected 'record'");
        let mut field_data = Vec::new();
        let mut field_nodes = Vec::new();
        while !matches!(self.current.kind, TokenKind::End | TokenKind::Eof) {
            let field = self.parse_record_field();
            field_data.push(record_field_data(&field));
            field_nodes.push(field);
        }
        self.expect(TokenKind::End, "expected 'end'");

        let record_data = RecordTypeData { name: name.clone(), is_typedef, is_nested: !is_typedef, fields: field_data };
        if let Err(e) = self.symtab.add_type(&name, record_data) {
            self.error(format!("{e}"));
        }

        let span = start.merge(&self.previous_span());
        Node::new(NodeKind::RecordType { name, is_typedef, fields: self.arena.alloc_slice(field_nodes) }, span)
    }

    fn parse_record_field(&mut self) -> Node<'a> {
        let start = self.current.span.clone();
        let name = self.expect_identifier_text();
        self.expect(TokenKind::Colon, "expected ':'");
        self.try_consume_dimension_specifier();

        if self.check(TokenKind::Record) {
            self.record_counter += 1;
            let synthetic_name = format!("record_{}", self.record_counter);
            let nested = self.parse_record_type(synthetic_name.clone(), false);
            self.matches(TokenKind::Semicolon);
            let span = start.merge(&self.previous_span());
            return Node::new(
                NodeKind::RecordField {
                    name,
                    type_spec: TypeSpec::scalar(TypeName::Record(synthetic_name)),
                    array_info: None,
                    nested_record: Some(self.arena.alloc(nested)),
                },
                span,
            );
        }

        let mut has_dynamic_size = false;
        let mut bounds = None;
        if self.matches(TokenKind::Array) {
            if self.check(TokenKind::LBracket) {
                let dims = self.count_dimensions_via_raw_scan();
                bounds = Some(self.parse_bounds_list(dims));
            } else {
                has_dynamic_size = true;
            }
            self.expect(TokenKind::Of, "expected 'of'");
        }
        let type_spec = self.parse_type_spec();
        self.matches(TokenKind::Semicolon);
        let array_info = bounds.map(|b| ArrayInfo { dimensions: b.dimensions, bounds: b, has_dynamic_size });
        let span = start.merge(&self.previous_span());
        Node::new(NodeKind::RecordField { name, type_spec, array_info, nested_record: None }, span)
    }
}

fn record_field_data(field: &Node<'_>) -> RecordFieldData {
    match &field.kind {
        NodeKind::RecordField { name, type_spec, array_info, .. } => {
            RecordFieldData { name: name.clone(), type_spec: type_spec.clone(), array_info: array_info.clone() }
        }
        _ => unreachable!("parse_record_field always returns a RecordField node"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;
    use plike_lang::CompileConfig;

    fn parser<'a>(arena: &'a plike_lang::NodeArena<'a>, src: &str) -> Parser<'a> {
        Parser::new("t.pl", src, CompileConfig::default(), arena)
    }

    #[test]
    fn procedure_with_no_parameters_parses() {
        let arena = plike_lang::NodeArena::new();
        let mut p = parser(&arena, "procedure greet() begin print 1 end greet");
        let decl = p.parse_top_level_decl().unwrap();
        match decl.kind {
            NodeKind::Procedure { name, .. } => assert_eq!(name, "greet"),
            _ => panic!("expected Procedure"),
        }
        assert!(!p.diagnostics().had_error());
    }

    #[test]
    fn out_scalar_parameter_needs_deref() {
        let arena = plike_lang::NodeArena::new();
        let mut p = parser(&arena, "procedure inc(out n: integer) begin n := n + 1 end inc");
        p.parse_top_level_decl();
        let sym = p.symtab().lookup_parameter("inc", "n").expect("parameter n");
        let info = sym.as_variable().expect("variable payload");
        assert!(info.needs_deref);
    }

    #[test]
    fn array_out_parameter_never_needs_deref() {
        let arena = plike_lang::NodeArena::new();
        let mut p = parser(&arena, "procedure z(A[1..n], n: integer) begin A[1] := 0 end z");
        p.parse_top_level_decl();
        let sym = p.symtab().lookup_parameter("z", "A").expect("parameter A");
        let info = sym.as_variable().expect("variable payload");
        assert!(!info.needs_deref);
        assert!(info.is_array);
        assert_eq!(info.type_spec.name, TypeName::Integer);
    }

    #[test]
    fn untyped_bounds_only_parameter_defaults_to_integer() {
        let arena = plike_lang::NodeArena::new();
        let mut p = parser(&arena, "procedure z(A[1..n], n: integer) begin A[1] := 0 end z");
        p.parse_top_level_decl();
        let sym = p.symtab().lookup_parameter("z", "A").expect("parameter A");
        let info = sym.as_variable().expect("variable payload");
        assert!(!info.needs_type_declaration);
        assert_eq!(info.type_spec.name, TypeName::Integer);
    }

    #[test]
    fn body_style_parameter_type_patches_existing_parameter() {
        let arena = plike_lang::NodeArena::new();
        let mut p = parser(&arena, "procedure f(x) var x: real begin x := 1 end f");
        p.parse_top_level_decl();
        let params = p.symtab().function_parameters("f");
        assert_eq!(params.len(), 1);
        let info = params[0].as_variable().unwrap();
        assert_eq!(info.type_spec.name, TypeName::Real);
    }

    #[test]
    fn record_type_declaration_with_nested_anonymous_record() {
        let arena = plike_lang::NodeArena::new();
        let mut p = parser(&arena, "type point: record x: integer; inner: record y: integer; end end");
        let decl = p.parse_top_level_decl().unwrap();
        match decl.kind {
            NodeKind::TypeDeclaration { name, record } => {
                assert_eq!(name, "point");
                match &record.kind {
                    NodeKind::RecordType { fields, .. } => {
                        assert_eq!(fields.len(), 2);
                        assert!(matches!(fields[1].kind, NodeKind::RecordField { nested_record: Some(_), .. }));
                    }
                    _ => panic!("expected RecordType"),
                }
            }
            _ => panic!("expected TypeDeclaration"),
        }
    }
}
