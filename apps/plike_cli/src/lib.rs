//! `plikec` library crate: argument parsing, the compile driver, and the
//! debug dump sinks, split out from [`main`](../src/main.rs) for testability.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`cli`] | `clap` argument parsing, exit codes, the compile pipeline driver |
//! | [`debug`] | Pipeline-stage dump sinks (`--debug`) |

pub mod cli;
pub mod debug;

pub use cli::{run_cli, Cli};
