//! End-to-end parse-then-generate checks for the canonical snippets.

mod common;

use common::{compile, compile_with};
use plike_lang::{ArrayIndexing, CompileConfig};

#[test]
fn procedure_with_local_assignment() {
    let c = compile("procedure p() var x: integer; begin x := 1 endprocedure");
    assert!(c.contains("void p() {"), "got:\n{c}");
    assert!(c.contains("int x;"), "got:\n{c}");
    assert!(c.contains("x = 1;"), "got:\n{c}");
}

#[test]
fn out_scalar_parameter_is_dereferenced() {
    let c = compile("procedure inc(out n: integer) begin n := n + 1 endprocedure");
    assert!(c.contains("void inc(int* n)"), "got:\n{c}");
    assert!(c.contains("*n = (*n + 1);"), "got:\n{c}");
}

#[test]
fn range_array_parameter_one_based_offset() {
    let config = CompileConfig { array_indexing: ArrayIndexing::One, ..CompileConfig::default() };
    let c = compile_with("procedure z(A[1..n], n: integer) begin A[1] := 0 endprocedure", config);
    // Lower bound 1 is a compile-time constant, so the offset folds to 0
    // rather than staying a symbolic "1 - 1" (see DimensionBounds::offset_expr).
    assert!(c.contains("A_offset_0 = 0"), "got:\n{c}");
    assert!(c.contains("A[(1 - 1 - A_offset_0)] = 0;"), "got:\n{c}");
}

#[test]
fn for_loop_with_negative_step() {
    let c = compile("procedure main() begin for i := 10 to 1 step -1 do print i endfor endprocedure");
    assert!(c.contains("for (i = 10; i >= 1; i += -1) {"), "got:\n{c}");
    assert!(c.contains("printf(\"%d\\n\", i);"), "got:\n{c}");
}

#[test]
fn if_elseif_else_chain_is_flat() {
    let c = compile(
        "procedure classify(n: integer) begin \
           if n = 0 then print 0 \
           elseif n = 1 then print 1 \
           else print 2 \
         endif endprocedure",
    );
    assert!(c.contains("} else if ("), "expected flat else-if chain, got:\n{c}");
    assert!(!c.contains("else {\n        if"), "elseif should not nest an extra block, got:\n{c}");
}

#[test]
fn record_declaration_becomes_typedef_struct() {
    let c = compile("type Pt : record x: integer; y: integer end");
    assert!(c.contains("typedef struct Pt {"), "got:\n{c}");
    assert!(c.contains("int x;"), "got:\n{c}");
    assert!(c.contains("int y;"), "got:\n{c}");
    assert!(c.contains("} Pt;"), "got:\n{c}");
}

#[test]
fn preamble_includes_standard_headers() {
    let c = compile("procedure p() begin print 1 endprocedure");
    assert!(c.contains("#include <stdio.h>"));
    assert!(c.contains("#include <stdbool.h>"));
}

#[test]
fn repeat_until_lowers_to_do_while() {
    let c = compile("procedure p() var x: integer; begin x := 0; repeat x := x + 1 until x = 5 endprocedure");
    assert!(c.contains("do {"), "got:\n{c}");
    assert!(c.contains("} while (!((x == 5)));"), "got:\n{c}");
}

#[test]
fn function_without_explicit_return_falls_back_to_name_variable() {
    let c = compile("function square(n: integer) : integer var square: integer; begin square := n * n endfunction");
    assert!(c.contains("int square(int n) {"), "got:\n{c}");
    assert!(c.contains("return square;"), "got:\n{c}");
}
