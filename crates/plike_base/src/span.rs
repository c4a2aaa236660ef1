//! Source location tracking for error reporting.
//!
//! A [`Span`] is a `(line, column)` pair plus a byte offset, wide enough to
//! both slice the original source for a caret-column diagnostic and to sort
//! errors by position. Every token and every AST node carries one.

use std::fmt;
use std::rc::Rc;

/// A single point of interest in source text: the file it came from, its
/// 1-based line/column, and the byte offset `line` starts at (so callers can
/// recover the full source line without rescanning from byte 0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: Rc<str>,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(file: Rc<str>, line: u32, column: u32) -> Self {
        Self { file, line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A contiguous byte-offset range paired with the human-readable [`Location`]
/// of its start. `start`/`end` are byte offsets into the source buffer;
/// `&source[span.start..span.end]` recovers the spanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub loc: Location,
}

impl Span {
    pub fn new(start: usize, end: usize, loc: Location) -> Self {
        Self { start, end, loc }
    }

    /// Covers from the start of `self` to the end of `other`, keeping `self`'s
    /// location (the location of the leftmost token in a compound expression).
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            loc: self.loc.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: u32, column: u32) -> Location {
        Location::new(Rc::from("test.pl"), line, column)
    }

    #[test]
    fn span_len_and_empty() {
        let s = Span::new(5, 10, loc(1, 1));
        assert_eq!(s.len(), 5);
        assert!(!s.is_empty());
        let empty = Span::new(5, 5, loc(1, 1));
        assert!(empty.is_empty());
    }

    #[test]
    fn span_merge_takes_outer_bounds_and_left_location() {
        let a = Span::new(5, 10, loc(2, 3));
        let b = Span::new(8, 20, loc(2, 6));
        let merged = a.merge(&b);
        assert_eq!(merged.start, 5);
        assert_eq!(merged.end, 20);
        assert_eq!(merged.loc.column, 3);
    }

    #[test]
    fn location_display_format() {
        let l = loc(4, 9);
        assert_eq!(format!("{}", l), "test.pl:4:9");
    }
}
