//! Diagnostics: taxonomy, severities, and a bounded collector.
//!
//! Every reported problem carries a [`Span`] so the caller can print the
//! offending source line with a caret under the column, matching the
//! source-level diagnostics a Pascal-style error reporter is expected to
//! produce.

use crate::span::Span;
use std::fmt;

/// What kind of compilation phase noticed the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Semantic,
    Type,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Lexical => "lexical error",
            ErrorKind::Syntax => "syntax error",
            ErrorKind::Semantic => "semantic error",
            ErrorKind::Type => "type error",
            ErrorKind::Internal => "internal error",
        };
        f.write_str(s)
    }
}

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal error",
        };
        f.write_str(s)
    }
}

/// A single reported problem.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub severity: Severity,
    pub span: Span,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.span.loc, self.severity, self.message)
    }
}

/// Default ceiling on collected diagnostics before a fatal short-circuit, to
/// avoid cascading noise drowning the one or two mistakes the user actually
/// made.
pub const DEFAULT_ERROR_CAP: usize = 200;

/// Collects diagnostics across a whole compilation and implements panic-mode
/// recovery: while `panic_mode` is set, newly reported errors are dropped
/// (but still counted against the severity tally) until the parser calls
/// [`Diagnostics::end_panic_mode`] at the next synchronisation point.
#[derive(Debug)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    panic_mode: bool,
    cap: usize,
    suppressed: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::with_cap(DEFAULT_ERROR_CAP)
    }

    pub fn with_cap(cap: usize) -> Self {
        Diagnostics {
            entries: Vec::new(),
            panic_mode: false,
            cap,
            suppressed: 0,
        }
    }

    /// Report a diagnostic. Suppressed while in panic mode, except `Fatal`
    /// severity which always surfaces (matching "fatal errors short-circuit
    /// compilation immediately").
    pub fn report(&mut self, kind: ErrorKind, severity: Severity, span: Span, message: impl Into<String>) {
        if self.panic_mode && severity != Severity::Fatal {
            self.suppressed += 1;
            return;
        }
        if self.entries.len() >= self.cap {
            self.entries.push(Diagnostic {
                kind: ErrorKind::Internal,
                severity: Severity::Fatal,
                span,
                message: format!("too many errors ({} reported); stopping", self.cap),
            });
            return;
        }
        self.entries.push(Diagnostic {
            kind,
            severity,
            span,
            message: message.into(),
        });
    }

    pub fn begin_panic_mode(&mut self) {
        self.panic_mode = true;
    }

    pub fn end_panic_mode(&mut self) {
        self.panic_mode = false;
    }

    pub fn in_panic_mode(&self) -> bool {
        self.panic_mode
    }

    pub fn had_error(&self) -> bool {
        self.entries
            .iter()
            .any(|d| d.severity == Severity::Error || d.severity == Severity::Fatal)
    }

    pub fn had_fatal(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Fatal)
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One line per severity, e.g. `3 errors, 1 warning`.
    pub fn summary(&self) -> String {
        let warnings = self.entries.iter().filter(|d| d.severity == Severity::Warning).count();
        let errors = self.entries.iter().filter(|d| d.severity == Severity::Error).count();
        let fatals = self.entries.iter().filter(|d| d.severity == Severity::Fatal).count();
        format!(
            "{} error{}, {} warning{}{}",
            errors + fatals,
            if errors + fatals == 1 { "" } else { "s" },
            warnings,
            if warnings == 1 { "" } else { "s" },
            if fatals > 0 { " (fatal)" } else { "" }
        )
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders the source line a span points at with a caret under its column,
/// when the full source text is available to slice.
pub fn render_caret(source: &str, span: &Span) -> Option<String> {
    let line = source.lines().nth(span.loc.line.checked_sub(1)? as usize)?;
    let col = span.loc.column.saturating_sub(1) as usize;
    let caret_line: String = std::iter::repeat(' ').take(col).chain(std::iter::once('^')).collect();
    Some(format!("{line}\n{caret_line}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn span_at(line: u32, col: u32) -> Span {
        Span::new(0, 1, crate::span::Location::new(Rc::from("t.pl"), line, col))
    }

    #[test]
    fn report_collects_and_counts_severities() {
        let mut diags = Diagnostics::new();
        diags.report(ErrorKind::Syntax, Severity::Error, span_at(1, 1), "boom");
        diags.report(ErrorKind::Lexical, Severity::Warning, span_at(2, 1), "hmm");
        assert_eq!(diags.len(), 2);
        assert!(diags.had_error());
        assert_eq!(diags.summary(), "1 error, 1 warning");
    }

    #[test]
    fn panic_mode_suppresses_non_fatal() {
        let mut diags = Diagnostics::new();
        diags.begin_panic_mode();
        diags.report(ErrorKind::Syntax, Severity::Error, span_at(1, 1), "first");
        diags.report(ErrorKind::Syntax, Severity::Error, span_at(1, 2), "second");
        assert_eq!(diags.len(), 0);
        diags.end_panic_mode();
        diags.report(ErrorKind::Syntax, Severity::Error, span_at(1, 3), "third");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn fatal_errors_bypass_panic_mode() {
        let mut diags = Diagnostics::new();
        diags.begin_panic_mode();
        diags.report(ErrorKind::Internal, Severity::Fatal, span_at(1, 1), "oom");
        assert_eq!(diags.len(), 1);
        assert!(diags.had_fatal());
    }

    #[test]
    fn cap_converts_overflow_to_fatal() {
        let mut diags = Diagnostics::with_cap(2);
        diags.report(ErrorKind::Syntax, Severity::Error, span_at(1, 1), "a");
        diags.report(ErrorKind::Syntax, Severity::Error, span_at(1, 1), "b");
        diags.report(ErrorKind::Syntax, Severity::Error, span_at(1, 1), "c");
        assert_eq!(diags.len(), 3);
        assert!(diags.had_fatal());
    }

    #[test]
    fn render_caret_marks_column() {
        let src = "x := 1 +\n";
        let span = span_at(1, 8);
        let rendered = render_caret(src, &span).unwrap();
        assert!(rendered.starts_with("x := 1 +"));
        assert!(rendered.ends_with('^'));
    }
}
