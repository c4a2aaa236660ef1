//! plikec - standalone binary.
//!
//! Thin wrapper around [`plike_cli::run_cli`], handling error display and
//! exit codes. All command logic lives in the library crate for
//! testability.
//!
//! # Exit codes
//!
//! - `0` - compiled with no reported errors
//! - `1` - source errors were reported, or the process itself failed
//!   (bad path, unreadable file, ...)

use std::process::ExitCode;

fn main() -> ExitCode {
    match plike_cli::run_cli() {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}
