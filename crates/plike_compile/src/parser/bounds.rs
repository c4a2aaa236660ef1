//! Array bounds parsing, including the bounded read-only scan over raw
//! source used to count a declaration's dimensions before any bound tokens
//! are actually consumed.

use super::Parser;
use plike_lang::{ArrayBoundsData, Bound, DimensionBounds, TokenKind};

pub trait BoundsParsing<'a> {
    fn count_dimensions_via_raw_scan(&self) -> usize;
    fn parse_bounds_list(&mut self, known_dims: usize) -> ArrayBoundsData;
    fn parse_single_dimension_bound(&mut self) -> DimensionBounds;
    fn parse_bound_endpoint(&mut self) -> Bound;
    fn try_consume_dimension_specifier(&mut self) -> Option<usize>;
}

impl<'a> BoundsParsing<'a> for Parser<'a> {
    /// Scans the source bytes from the current `[` forward, counting commas
    /// at the outermost bracket level of the first group (`[a, b]` style) or,
    /// failing that, the number of bracket groups chained one after another
    /// (`[a][b]` style). Reads `self.lexer`'s source directly; never touches
    /// the token stream, so the two-token window is untouched afterwards.
    fn count_dimensions_via_raw_scan(&self) -> usize {
        let bytes = self.source_bytes();
        let mut i = self.current.span.start;
        let mut bracket_pairs = 0usize;

        loop {
            while bytes.get(i).is_some_and(|b| b.is_ascii_whitespace()) {
                i += 1;
            }
            if bytes.get(i) != Some(&b'[') {
                break;
            }
            let mut depth = 0i32;
            let mut commas_here = 0usize;
            while i < bytes.len() {
                match bytes[i] {
                    b'[' => depth += 1,
                    b']' => {
                        depth -= 1;
                        i += 1;
                        if depth == 0 {
                            break;
                        }
                        continue;
                    }
                    b',' if depth == 1 => commas_here += 1,
                    _ => {}
                }
                i += 1;
            }
            bracket_pairs += 1;
            if commas_here > 0 {
                return commas_here + 1;
            }
        }
        bracket_pairs.max(1)
    }

    /// Consumes `known_dims` dimension bounds, accepting either a single
    /// `[b1, b2, ...]` group or `known_dims` chained `[b]` groups.
    fn parse_bounds_list(&mut self, known_dims: usize) -> ArrayBoundsData {
        let mut bounds = Vec::with_capacity(known_dims.max(1));
        for idx in 0..known_dims.max(1) {
            if idx == 0 || self.check(TokenKind::LBracket) {
                self.expect(TokenKind::LBracket, "expected '['");
            }
            if idx == 0 && self.check(TokenKind::RBracket) {
                // The first bound in a list may be left empty and inferred
                // from the element type supplied later in the declaration.
                bounds.push(DimensionBounds::sized(Bound::Variable(String::new())));
            } else {
                bounds.push(self.parse_single_dimension_bound());
            }
            if self.matches(TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RBracket, "expected ']'");
        }
        ArrayBoundsData::new(bounds)
    }

    fn parse_single_dimension_bound(&mut self) -> DimensionBounds {
        let first = self.parse_bound_endpoint();
        if self.matches(TokenKind::DotDot) {
            let second = self.parse_bound_endpoint();
            DimensionBounds::ranged(first, second)
        } else {
            DimensionBounds::sized(first)
        }
    }

    fn parse_bound_endpoint(&mut self) -> Bound {
        match self.current.kind {
            TokenKind::Number => {
                let text = self.text_of(&self.current);
                self.advance();
                match text.parse::<i64>() {
                    Ok(n) => Bound::Constant(n),
                    Err(_) => Bound::Variable(text),
                }
            }
            TokenKind::Minus => {
                self.advance();
                match self.parse_bound_endpoint() {
                    Bound::Constant(n) => Bound::Constant(-n),
                    other => other,
                }
            }
            TokenKind::Identifier => Bound::Variable(self.expect_identifier_text()),
            _ => {
                self.error("expected an array bound");
                Bound::Constant(0)
            }
        }
    }

    /// Consumes an optional `[Nd]`-style dimension hint (a digit run fused
    /// to a trailing `d`/`D`, lexed as a single identifier) and returns `N`.
    fn try_consume_dimension_specifier(&mut self) -> Option<usize> {
        if !self.check(TokenKind::Identifier) {
            return None;
        }
        let text = self.text_of(&self.current);
        let bytes = text.as_bytes();
        let Some(&last) = bytes.last() else { return None };
        if last != b'd' && last != b'D' {
            return None;
        }
        let digits = &text[..text.len() - 1];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let n = digits.parse::<usize>().ok()?;
        self.advance();
        Some(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;
    use plike_lang::{CompileConfig, NodeArena};

    fn parser<'a>(arena: &'a NodeArena<'a>, src: &str) -> Parser<'a> {
        Parser::new("t.pl", src, CompileConfig::default(), arena)
    }

    #[test]
    fn raw_scan_counts_commas_in_single_bracket_form() {
        let arena = NodeArena::new();
        let p = parser(&arena, "[1..n, 1..m]");
        assert_eq!(p.count_dimensions_via_raw_scan(), 2);
    }

    #[test]
    fn raw_scan_counts_chained_bracket_groups() {
        let arena = NodeArena::new();
        let p = parser(&arena, "[1..n][1..m][1..k]");
        assert_eq!(p.count_dimensions_via_raw_scan(), 3);
    }

    #[test]
    fn raw_scan_single_dimension() {
        let arena = NodeArena::new();
        let p = parser(&arena, "[10]");
        assert_eq!(p.count_dimensions_via_raw_scan(), 1);
    }

    #[test]
    fn bounds_list_parses_chained_form() {
        let arena = NodeArena::new();
        let mut p = parser(&arena, "[1..n][1..m]");
        let dims = p.count_dimensions_via_raw_scan();
        let data = p.parse_bounds_list(dims);
        assert_eq!(data.dimension(0).unwrap().start, Bound::Constant(1));
        assert_eq!(data.dimension(1).unwrap().start, Bound::Constant(1));
    }

    #[test]
    fn bounds_list_first_bound_may_be_empty() {
        let arena = NodeArena::new();
        let mut p = parser(&arena, "[]");
        let data = p.parse_bounds_list(1);
        assert_eq!(data.dimension(0).unwrap().start, Bound::Variable(String::new()));
    }

    #[test]
    fn bound_endpoint_handles_negative_constant() {
        let arena = NodeArena::new();
        let mut p = parser(&arena, "[-1..n]");
        let data = p.parse_bounds_list(1);
        assert_eq!(data.dimension(0).unwrap().start, Bound::Constant(-1));
    }

    #[test]
    fn dimension_specifier_consumes_nd_hint() {
        let arena = NodeArena::new();
        let mut p = parser(&arena, "2d");
        assert_eq!(p.try_consume_dimension_specifier(), Some(2));
    }

    #[test]
    fn dimension_specifier_rejects_plain_identifier() {
        let arena = NodeArena::new();
        let mut p = parser(&arena, "count");
        assert_eq!(p.try_consume_dimension_specifier(), None);
    }
}
