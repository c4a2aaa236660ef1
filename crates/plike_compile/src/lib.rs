//! Parser and C code generator for the plike transpiler.
//!
//! [`parser`] turns source text into an AST plus a populated symbol table;
//! the table and diagnostics collector are handed back alongside the tree
//! so a driver can decide whether to proceed to code generation. [`codegen`]
//! takes that tree and table and renders it as C source.

pub mod codegen;
pub mod parser;

pub use codegen::Generator;
pub use parser::{BoundsParsing, DeclParsing, ExprParsing, Parser, StmtParsing};
