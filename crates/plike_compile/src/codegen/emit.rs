//! Per-statement and per-expression C emission.
//!
//! Every function here either appends to an `out: &mut String` (statements,
//! declarations) or returns a `String` fragment (expressions), mirroring the
//! teacher's `codegen_stmt`/`codegen_expr` split. Indentation is four spaces
//! per level throughout, spec §4.4.

use super::types::{self, Ctx};
use plike_lang::{ArrayBoundsData, ArrayIndexing, BinOp, DimensionBounds, Node, NodeKind, Symbol, TypeName, UnOp};

const INDENT_UNIT: &str = "    ";

fn pad(indent: usize) -> String {
    INDENT_UNIT.repeat(indent)
}

// ---------------------------------------------------------------------
// Record/type declarations
// ---------------------------------------------------------------------

pub(super) fn emit_type_declaration(record: &Node<'_>, config: &plike_lang::CompileConfig, out: &mut String) {
    emit_record_type(record, config, out);
}

fn emit_record_type(node: &Node<'_>, config: &plike_lang::CompileConfig, out: &mut String) {
    let NodeKind::RecordType { name, is_typedef, fields } = &node.kind else { return };
    let c_name = types::escape_c_ident(name);
    if *is_typedef {
        out.push_str(&format!("typedef struct {c_name} {{\n"));
    } else {
        out.push_str(&format!("struct {c_name} {{\n"));
    }
    for field in *fields {
        emit_record_field(field, config, out, 1);
    }
    if *is_typedef {
        out.push_str(&format!("}} {c_name};\n\n"));
    } else {
        out.push_str("};\n\n");
    }
}

fn emit_record_field(node: &Node<'_>, config: &plike_lang::CompileConfig, out: &mut String, indent: usize) {
    let NodeKind::RecordField { name, type_spec, array_info, nested_record } = &node.kind else { return };
    let field_name = types::escape_c_ident(name);
    if let Some(nested) = nested_record {
        let NodeKind::RecordType { fields, .. } = &nested.kind else { return };
        out.push_str(&format!("{}struct {{\n", pad(indent)));
        for f in *fields {
            emit_record_field(f, config, out, indent + 1);
        }
        out.push_str(&format!("{}}} {field_name};\n", pad(indent)));
        return;
    }
    let base = types::type_spec_str(type_spec);
    match array_info {
        Some(info) => {
            let brackets = extent_brackets(&info.bounds, config.array_indexing);
            out.push_str(&format!("{}{base} {field_name}{brackets};\n", pad(indent)));
        }
        None => out.push_str(&format!("{}{base} {field_name};\n", pad(indent))),
    }
}

fn extent_brackets(bounds: &ArrayBoundsData, indexing: ArrayIndexing) -> String {
    bounds.bounds.iter().map(|d| format!("[{}]", d.extent_expr(indexing))).collect()
}

fn emit_offset_consts(name: &str, bounds: &ArrayBoundsData, ctx: &Ctx, out: &mut String, indent: usize) {
    let c_name = types::escape_c_ident(name);
    for (k, dim) in bounds.bounds.iter().enumerate() {
        if dim.using_range {
            out.push_str(&format!(
                "{}const int {c_name}_offset_{k} = {};\n",
                pad(indent),
                dim.offset_expr(ctx.indexing())
            ));
        }
    }
}

// ---------------------------------------------------------------------
// Function/procedure declarations
// ---------------------------------------------------------------------

pub(super) fn emit_function_forward_decl<'n>(decl: &'n Node<'n>, ctx: &Ctx, out: &mut String) {
    let Some((name, return_type, params, is_procedure)) = function_shape(decl) else { return };
    let ret = return_type_str(return_type, is_procedure);
    let NodeKind::ParameterList { params: param_nodes } = &params.kind else { return };
    let sig = signature_params(param_nodes, name, ctx);
    out.push_str(&format!("{ret} {}({sig});\n", types::escape_c_ident(name)));
}

pub(super) fn emit_function<'n>(decl: &'n Node<'n>, ctx: &Ctx, out: &mut String) {
    let Some((name, return_type, params, is_procedure)) = function_shape(decl) else { return };
    let body = function_body(decl);
    let c_name = types::escape_c_ident(name);
    let ret = return_type_str(return_type, is_procedure);

    let NodeKind::ParameterList { params: param_nodes } = &params.kind else { return };
    let sig = signature_params(param_nodes, name, ctx);
    out.push_str(&format!("{ret} {c_name}({sig}) {{\n"));

    let fn_info = ctx.symtab.lookup_global(name).and_then(Symbol::as_function);
    let has_return_var = fn_info.is_some_and(|f| f.has_return_var);
    if !is_procedure && !has_return_var {
        out.push_str(&format!("{}{ret} {c_name};\n", pad(1)));
    }

    for p in param_nodes {
        let NodeKind::Parameter { name: pname, .. } = &p.kind else { continue };
        if let Some(info) = ctx.variable_info(name, pname) {
            if info.is_array {
                if let Some(bounds) = &info.bounds {
                    emit_offset_consts(pname, bounds, ctx, out, 1);
                }
            }
        }
    }

    let NodeKind::Block { items } = &body.kind else { return };
    for item in items {
        emit_item(item, name, ctx, out, 1);
    }
    if !contains_top_level_return(items) {
        if is_procedure {
            out.push_str(&format!("{}return;\n", pad(1)));
        } else {
            out.push_str(&format!("{}return {c_name};\n", pad(1)));
        }
    }
    out.push_str("}\n\n");
}

fn function_shape<'n>(decl: &'n Node<'n>) -> Option<(&'n str, Option<&'n plike_lang::TypeSpec>, &'n Node<'n>, bool)> {
    match &decl.kind {
        NodeKind::Function { name, return_type, params, .. } => Some((name.as_str(), return_type.as_ref(), *params, false)),
        NodeKind::Procedure { name, params, .. } => Some((name.as_str(), None, *params, true)),
        _ => None,
    }
}

fn function_body<'n>(decl: &'n Node<'n>) -> &'n Node<'n> {
    match &decl.kind {
        NodeKind::Function { body, .. } | NodeKind::Procedure { body, .. } => *body,
        _ => unreachable!("function_body only ever called on Function/Procedure"),
    }
}

fn return_type_str(return_type: Option<&plike_lang::TypeSpec>, is_procedure: bool) -> String {
    if is_procedure {
        return "void".to_string();
    }
    return_type.map(types::type_spec_str).unwrap_or_else(|| "void".to_string())
}

fn signature_params(param_nodes: &[Node<'_>], function: &str, ctx: &Ctx) -> String {
    let strs: Vec<String> = param_nodes.iter().map(|p| emit_parameter(p, function, ctx)).collect();
    strs.join(", ")
}

fn emit_parameter(node: &Node<'_>, function: &str, ctx: &Ctx) -> String {
    let NodeKind::Parameter { name, .. } = &node.kind else { return String::new() };
    let info = ctx.variable_info(function, name);
    let base_type = info.map(|i| types::type_spec_str(&i.type_spec)).unwrap_or_else(|| "int".to_string());
    let mut stars = String::new();
    if let Some(i) = info {
        if i.needs_deref {
            stars.push('*');
        }
        for _ in 0..i.pointer_level {
            stars.push('*');
        }
    }
    let c_name = types::escape_c_ident(name);
    let brackets = info
        .and_then(|i| i.bounds.as_ref())
        .map(|b| extent_brackets(b, ctx.indexing()))
        .unwrap_or_default();
    format!("{base_type}{stars} {c_name}{brackets}")
}

fn contains_top_level_return(items: &[Node<'_>]) -> bool {
    items.iter().any(|item| matches!(item.kind, NodeKind::Return { .. }))
}

// ---------------------------------------------------------------------
// Block items (declarations interleaved with statements)
// ---------------------------------------------------------------------

fn emit_item(node: &Node<'_>, function: &str, ctx: &Ctx, out: &mut String, indent: usize) {
    match &node.kind {
        NodeKind::VarDecl { name, .. } => emit_var_decl(node, name, function, ctx, out, indent),
        _ => emit_stmt(node, function, ctx, out, indent),
    }
}

fn emit_block_body(node: &Node<'_>, function: &str, ctx: &Ctx, out: &mut String, indent: usize) {
    if let NodeKind::Block { items } = &node.kind {
        for item in items {
            emit_item(item, function, ctx, out, indent);
        }
    }
}

fn emit_var_decl(node: &Node<'_>, name: &str, function: &str, ctx: &Ctx, out: &mut String, indent: usize) {
    // The declaration matching the enclosing function's own name is the
    // implicit return slot, already emitted at the top of the body.
    if name == function {
        return;
    }
    let NodeKind::VarDecl { type_spec, is_array, array_info, .. } = &node.kind else { return };
    let c_name = types::escape_c_ident(name);
    let base = types::type_spec_str(type_spec);
    match (*is_array, array_info) {
        (true, Some(info)) => {
            let brackets = extent_brackets(&info.bounds, ctx.indexing());
            out.push_str(&format!("{}{base} {c_name}{brackets};\n", pad(indent)));
            emit_offset_consts(name, &info.bounds, ctx, out, indent);
        }
        (true, None) => out.push_str(&format!("{}{base} {c_name}[];\n", pad(indent))),
        (false, _) => out.push_str(&format!("{}{base} {c_name};\n", pad(indent))),
    }
}

// ---------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------

fn emit_stmt(node: &Node<'_>, function: &str, ctx: &Ctx, out: &mut String, indent: usize) {
    match &node.kind {
        NodeKind::Assignment { target, value } => {
            out.push_str(&format!(
                "{}{} = {};\n",
                pad(indent),
                emit_expr(target, function, ctx),
                emit_expr(value, function, ctx)
            ));
        }
        NodeKind::If { cond, then_branch, else_branch } => {
            emit_if(cond, then_branch, *else_branch, function, ctx, out, indent);
        }
        NodeKind::While { cond, body } => {
            out.push_str(&format!("{}while ({}) {{\n", pad(indent), emit_expr(cond, function, ctx)));
            emit_block_body(body, function, ctx, out, indent + 1);
            out.push_str(&format!("{}}}\n", pad(indent)));
        }
        NodeKind::For { var, init, end, step, body } => {
            emit_for(var, init, end, *step, body, function, ctx, out, indent);
        }
        NodeKind::Repeat { body, until } => {
            out.push_str(&format!("{}do {{\n", pad(indent)));
            emit_block_body(body, function, ctx, out, indent + 1);
            out.push_str(&format!("{}}} while (!({}));\n", pad(indent), emit_expr(until, function, ctx)));
        }
        NodeKind::Return { value } => emit_return(value.as_deref(), function, ctx, out, indent),
        NodeKind::Print { value } => emit_print(value, function, ctx, out, indent),
        NodeKind::Read { target } => emit_read(target, function, ctx, out, indent),
        NodeKind::Call { callee, args } => {
            out.push_str(&format!("{}{};\n", pad(indent), emit_call(callee, args, function, ctx)));
        }
        _ => {}
    }
}

fn emit_if(cond: &Node<'_>, then_branch: &Node<'_>, else_branch: Option<&Node<'_>>, function: &str, ctx: &Ctx, out: &mut String, indent: usize) {
    out.push_str(&format!("{}if ({}) {{\n", pad(indent), emit_expr(cond, function, ctx)));
    emit_block_body(then_branch, function, ctx, out, indent + 1);
    out.push_str(&format!("{}}}", pad(indent)));
    match else_branch {
        Some(eb) => emit_else_chain(eb, function, ctx, out, indent),
        None => out.push('\n'),
    }
}

/// `elseif` is modelled as a nested `If` in the else slot (spec §3); walked
/// here as `} else if (...) {` rather than an extra nested block.
fn emit_else_chain(node: &Node<'_>, function: &str, ctx: &Ctx, out: &mut String, indent: usize) {
    match &node.kind {
        NodeKind::If { cond, then_branch, else_branch } => {
            out.push_str(&format!(" else if ({}) {{\n", emit_expr(cond, function, ctx)));
            emit_block_body(then_branch, function, ctx, out, indent + 1);
            out.push_str(&format!("{}}}", pad(indent)));
            match else_branch {
                Some(eb) => emit_else_chain(eb, function, ctx, out, indent),
                None => out.push('\n'),
            }
        }
        _ => {
            out.push_str(" else {\n");
            emit_block_body(node, function, ctx, out, indent + 1);
            out.push_str(&format!("{}}}\n", pad(indent)));
        }
    }
}

fn emit_for(var: &str, init: &Node<'_>, end: &Node<'_>, step: Option<&Node<'_>>, body: &Node<'_>, function: &str, ctx: &Ctx, out: &mut String, indent: usize) {
    let c_var = types::escape_c_ident(var);
    let init_str = emit_expr(init, function, ctx);
    let end_str = emit_expr(end, function, ctx);
    let step_str = step.map(|s| render_step(s, function, ctx)).unwrap_or_else(|| "1".to_string());
    let cmp = if step.is_some_and(step_is_negative) { ">=" } else { "<=" };
    out.push_str(&format!(
        "{}for ({c_var} = {init_str}; {c_var} {cmp} {end_str}; {c_var} += {step_str}) {{\n",
        pad(indent)
    ));
    emit_block_body(body, function, ctx, out, indent + 1);
    out.push_str(&format!("{}}}\n", pad(indent)));
}

fn step_is_negative(node: &Node<'_>) -> bool {
    matches!(&node.kind, NodeKind::UnaryOp { op: UnOp::Neg, .. })
}

/// A step literal renders bare (`-1`), not parenthesised (`(-1)`) the way a
/// general negation expression would, matching spec §8 scenario 4 exactly.
fn render_step(node: &Node<'_>, function: &str, ctx: &Ctx) -> String {
    if let NodeKind::UnaryOp { op: UnOp::Neg, operand, .. } = &node.kind {
        if let NodeKind::Number { text, .. } = &operand.kind {
            return format!("-{text}");
        }
    }
    emit_expr(node, function, ctx)
}

fn emit_return(value: Option<&Node<'_>>, function: &str, ctx: &Ctx, out: &mut String, indent: usize) {
    match value {
        Some(v) => out.push_str(&format!("{}return {};\n", pad(indent), emit_expr(v, function, ctx))),
        None => {
            let is_procedure = ctx
                .symtab
                .lookup_global(function)
                .and_then(Symbol::as_function)
                .is_some_and(|f| f.is_procedure);
            if is_procedure {
                out.push_str(&format!("{}return;\n", pad(indent)));
            } else {
                out.push_str(&format!("{}return {};\n", pad(indent), types::escape_c_ident(function)));
            }
        }
    }
}

fn emit_print(value: &Node<'_>, function: &str, ctx: &Ctx, out: &mut String, indent: usize) {
    if let NodeKind::String { value: s } = &value.kind {
        out.push_str(&format!("{}printf(\"{s}\\n\");\n", pad(indent)));
        return;
    }
    let spec = format_specifier(value, function, ctx);
    let expr = emit_expr(value, function, ctx);
    out.push_str(&format!("{}printf(\"%{spec}\\n\", {expr});\n", pad(indent)));
}

fn emit_read(target: &Node<'_>, function: &str, ctx: &Ctx, out: &mut String, indent: usize) {
    let spec = format_specifier(target, function, ctx);
    let expr = emit_expr(target, function, ctx);
    out.push_str(&format!("{}scanf(\"%{spec}\", &{expr});\n", pad(indent)));
}

fn format_specifier(node: &Node<'_>, function: &str, ctx: &Ctx) -> char {
    match infer_type_name(node, function, ctx) {
        Some(TypeName::Real) => 'f',
        Some(TypeName::Character) if is_character_array(node, function, ctx) => 's',
        Some(TypeName::Character) => 'c',
        _ => 'd',
    }
}

fn is_character_array(node: &Node<'_>, function: &str, ctx: &Ctx) -> bool {
    match &node.kind {
        NodeKind::Variable { name, .. } | NodeKind::Identifier { name } => ctx
            .variable_info(function, name)
            .is_some_and(|i| i.is_array && i.type_spec.name == TypeName::Character),
        _ => false,
    }
}

fn infer_type_name(node: &Node<'_>, function: &str, ctx: &Ctx) -> Option<TypeName> {
    match &node.kind {
        NodeKind::Variable { name, .. } | NodeKind::Identifier { name } => {
            ctx.variable_info(function, name).map(|i| i.type_spec.name.clone())
        }
        NodeKind::ArrayAccess { base, .. } => infer_type_name(base, function, ctx),
        NodeKind::FieldAccess { base, field } => match infer_type_name(base, function, ctx)? {
            TypeName::Record(rname) => ctx
                .symtab
                .lookup_type(&rname)
                .and_then(|rt| rt.fields.iter().find(|f| &f.name == field).map(|f| f.type_spec.name.clone())),
            _ => None,
        },
        NodeKind::Number { is_real, .. } => Some(if *is_real { TypeName::Real } else { TypeName::Integer }),
        NodeKind::Bool { .. } => Some(TypeName::Logical),
        NodeKind::BinaryOp { lhs, .. } => infer_type_name(lhs, function, ctx),
        NodeKind::UnaryOp { operand, .. } => infer_type_name(operand, function, ctx),
        _ => None,
    }
}

// ---------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------

fn emit_expr(node: &Node<'_>, function: &str, ctx: &Ctx) -> String {
    match &node.kind {
        NodeKind::BinaryOp { op, lhs, rhs } => {
            format!("({} {} {})", emit_expr(lhs, function, ctx), binop_str(*op), emit_expr(rhs, function, ctx))
        }
        NodeKind::UnaryOp { op, operand, deref_count } => emit_unary(*op, operand, *deref_count, function, ctx),
        NodeKind::ArrayAccess { base, indices } => emit_array_access(base, indices, function, ctx),
        NodeKind::FieldAccess { base, field } => {
            format!("{}.{}", emit_expr(base, function, ctx), types::escape_c_ident(field))
        }
        NodeKind::Identifier { name } => types::escape_c_ident(name),
        NodeKind::Variable { name, deref_suppressed } => emit_variable(name, *deref_suppressed, function, ctx),
        NodeKind::Number { text, .. } => text.clone(),
        NodeKind::Bool { value } => if *value { "1" } else { "0" }.to_string(),
        NodeKind::String { value } => format!("\"{value}\""),
        NodeKind::Call { callee, args } => emit_call(callee, args, function, ctx),
        _ => String::new(),
    }
}

fn emit_variable(name: &str, suppressed: bool, function: &str, ctx: &Ctx) -> String {
    let c_name = types::escape_c_ident(name);
    if suppressed {
        return c_name;
    }
    match ctx.variable_info(function, name) {
        Some(info) if info.needs_deref => format!("*{c_name}"),
        _ => c_name,
    }
}

fn emit_unary(op: UnOp, operand: &Node<'_>, deref_count: u32, function: &str, ctx: &Ctx) -> String {
    match op {
        UnOp::Deref => {
            // The pointee name is emitted bare, bypassing `emit_variable`'s
            // implicit out/inout dereference: the explicit stars here
            // already supply every `*` the access needs.
            let base = match &operand.kind {
                NodeKind::Variable { name, .. } | NodeKind::Identifier { name } => types::escape_c_ident(name),
                _ => emit_expr(operand, function, ctx),
            };
            format!("{}{base}", "*".repeat(deref_count.max(1) as usize))
        }
        UnOp::AddrOf => format!("&{}", emit_expr(operand, function, ctx)),
        UnOp::Neg => format!("(-{})", emit_expr(operand, function, ctx)),
        UnOp::Not => format!("(!{})", emit_expr(operand, function, ctx)),
        UnOp::BitNot => format!("(~{})", emit_expr(operand, function, ctx)),
    }
}

fn emit_array_access(base: &Node<'_>, indices: &[Node<'_>], function: &str, ctx: &Ctx) -> String {
    let NodeKind::Variable { name, .. } = &base.kind else {
        let base_str = emit_expr(base, function, ctx);
        let idx_str: String = indices.iter().map(|i| format!("[{}]", emit_expr(i, function, ctx))).collect();
        return format!("{base_str}{idx_str}");
    };
    let c_name = types::escape_c_ident(name);
    let info = ctx.variable_info(function, name);
    let bounds = info.and_then(|i| i.bounds.as_ref());
    let one_based = matches!(ctx.indexing(), ArrayIndexing::One);

    let mut out = c_name.clone();
    for (k, idx) in indices.iter().enumerate() {
        let idx_str = emit_expr(idx, function, ctx);
        let dim: Option<&DimensionBounds> = bounds.and_then(|b| b.dimension(k));
        let lowered = match dim {
            Some(d) if d.using_range => {
                let offset_name = format!("{c_name}_offset_{k}");
                if one_based {
                    format!("({idx_str} - 1 - {offset_name})")
                } else {
                    format!("({idx_str} - {offset_name})")
                }
            }
            _ if one_based => format!("({idx_str} - 1)"),
            _ => idx_str,
        };
        out.push_str(&format!("[{lowered}]"));
    }
    out
}

fn emit_call(callee: &str, args: &[Node<'_>], function: &str, ctx: &Ctx) -> String {
    let c_callee = types::escape_c_ident(callee);
    let param_info = ctx.call_params.get(callee);
    let rendered: Vec<String> = args
        .iter()
        .enumerate()
        .map(|(i, arg)| {
            let needs_addr = param_info
                .and_then(|v| v.get(i))
                .is_some_and(|(_, needs_deref, is_array)| *needs_deref && !*is_array);
            let value = emit_expr(arg, function, ctx);
            if needs_addr {
                format!("&{value}")
            } else {
                value
            }
        })
        .collect();
    format!("{c_callee}({})", rendered.join(", "))
}

fn binop_str(op: BinOp) -> &'static str {
    match op {
        BinOp::Or => "||",
        BinOp::And => "&&",
        BinOp::BitOr => "|",
        BinOp::BitXor => "^",
        BinOp::BitAnd => "&",
        BinOp::Shl => "<<",
        BinOp::Shr => ">>",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::Lt => "<",
        BinOp::Gt => ">",
        BinOp::Le => "<=",
        BinOp::Ge => ">=",
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
    }
}
