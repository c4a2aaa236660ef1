//! Token, AST, bounds, symbol table, and configuration types shared by the
//! parser and code generator.

pub mod ast;
pub mod bounds;
pub mod config;
pub mod lexer;
pub mod symtab;
pub mod token;

pub use ast::{ArrayInfo, BinOp, Node, NodeArena, NodeKind, TypeName, TypeSpec, UnOp};
pub use bounds::{ArrayBoundsData, Bound, DimensionBounds};
pub use config::{ArrayIndexing, AssignmentStyle, CompileConfig, DebugFlags, OperatorStyle, ParameterStyle};
pub use lexer::Lexer;
pub use symtab::{
    FunctionInfo, RecordFieldData, RecordTypeData, ScopeId, ScopeKind, Symbol, SymbolKind, SymbolPayload, SymbolTable,
    SymtabError, VariableInfo,
};
pub use token::{NumberBase, ParamMode, Token, TokenKind};
