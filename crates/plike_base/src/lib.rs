//! Shared low-level infrastructure for the plike transpiler: arena
//! allocation, source spans, string interning, and diagnostics.
//!
//! Every other crate in the workspace builds on top of this one; nothing
//! here knows about Pascal syntax or C codegen.

mod arena;
mod error;
mod intern;
mod span;

pub use arena::Arena;
pub use error::{render_caret, Diagnostic, Diagnostics, ErrorKind, Severity, DEFAULT_ERROR_CAP};
pub use intern::{Interner, Symbol, SymbolEq};
pub use span::{Location, Span};
