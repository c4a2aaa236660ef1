use plike_base::Diagnostics;
use plike_compile::{Generator, Parser};
use plike_lang::{CompileConfig, NodeArena, SymbolTable};

/// Parses and compiles `source` under the default dialect, panicking with the
/// collected diagnostics on any reported error.
pub fn compile(source: &str) -> String {
    compile_with(source, CompileConfig::default())
}

pub fn compile_with(source: &str, config: CompileConfig) -> String {
    let arena = NodeArena::new();
    let mut parser = Parser::new("test.pl", source, config, &arena);
    let program = parser.parse();
    let diags = parser.diagnostics();
    assert!(!diags.had_error(), "unexpected diagnostics: {}", diags.summary());
    let generator = Generator::new(parser.symtab(), &config);
    generator.generate(program)
}

/// Parses `source` and hands its diagnostics to `check`, for tests that
/// expect lexical/syntax/semantic errors rather than a clean compile.
pub fn with_diagnostics<R>(source: &str, check: impl FnOnce(&Diagnostics) -> R) -> R {
    let arena = NodeArena::new();
    let config = CompileConfig::default();
    let mut parser = Parser::new("test.pl", source, config, &arena);
    let _ = parser.parse();
    check(parser.diagnostics())
}

/// Parses `source` and hands the symbol table to `check` for invariant tests.
pub fn with_symtab<R>(source: &str, check: impl FnOnce(&SymbolTable) -> R) -> R {
    let arena = NodeArena::new();
    let config = CompileConfig::default();
    let mut parser = Parser::new("test.pl", source, config, &arena);
    let _ = parser.parse();
    check(parser.symtab())
}
