//! Expression parsing: a precedence climb from `or` down to `primary`
//! (spec §4.3's table, weakest first), plus the identifier-chain parsing
//! (`Call`/`ArrayAccess`/`FieldAccess`/`Variable` disambiguation) shared by
//! both expression context and assignment-target context.
//!
//! Every level returns an owned [`Node`] rather than an arena reference;
//! only when a value is actually combined into a parent node (another
//! `BinaryOp`, or handed to a caller that needs `&'a Node<'a>`) does it get
//! allocated. That keeps list-building call sites (`Call` arguments,
//! `ArrayAccess` indices) free to collect owned values into a `Vec` and
//! batch-allocate with [`plike_base::Arena::alloc_slice`].

use super::Parser;
use plike_lang::{BinOp, Node, NodeKind, NumberBase, TokenKind, UnOp};

pub trait ExprParsing<'a> {
    fn parse_expr(&mut self) -> &'a Node<'a>;
    fn parse_expr_value(&mut self) -> Node<'a>;
    fn parse_identifier_chain_value(&mut self, suppress_deref: bool) -> Node<'a>;
    fn parse_lhs_value(&mut self) -> Node<'a>;
}

impl<'a> ExprParsing<'a> for Parser<'a> {
    fn parse_expr(&mut self) -> &'a Node<'a> {
        let value = self.parse_expr_value();
        self.arena.alloc(value)
    }

    fn parse_expr_value(&mut self) -> Node<'a> {
        self.parse_or_value()
    }

    fn parse_identifier_chain_value(&mut self, suppress_deref: bool) -> Node<'a> {
        let start = self.current.span.clone();
        let name = self.expect_identifier_text();

        let mut node = if self.check(TokenKind::LParen) {
            self.parse_call_or_indexed_call(name, start.clone())
        } else {
            Node::new(NodeKind::Variable { name, deref_suppressed: suppress_deref }, start.clone())
        };

        loop {
            if self.check(TokenKind::LBracket) {
                node = self.parse_bracket_array_access(node, start.clone());
            } else if self.matches(TokenKind::Dot) {
                let field = self.expect_identifier_text();
                let span = start.merge(&self.previous_span());
                node = Node::new(NodeKind::FieldAccess { base: self.arena.alloc(node), field }, span);
            } else {
                break;
            }
        }
        node
    }

    /// Parses an assignment target or `read` target: `@name`, a chain of
    /// `*`/`DEREF` followed by a name, or a plain name/array/field chain.
    /// Implicit dereference insertion for bare `out`/`inout` scalars happens
    /// later, in code generation, against the symbol table's `needs_deref`.
    fn parse_lhs_value(&mut self) -> Node<'a> {
        let start = self.current.span.clone();
        // A `*` at statement start follows no operator character, so the
        // lexer would have tagged it `Multiply` rather than `Deref`; an
        // identifier right behind it means this is really a dereference.
        if self.check(TokenKind::Multiply) && self.peek_is_identifier() {
            self.current.kind = TokenKind::Deref;
        }
        match self.current.kind {
            TokenKind::At => {
                self.advance();
                self.parse_identifier_chain_value(true)
            }
            TokenKind::Deref => {
                let mut count = 0u32;
                while self.check(TokenKind::Deref) {
                    count += 1;
                    self.advance();
                }
                let operand = self.arena.alloc(self.parse_identifier_chain_value(false));
                let span = start.merge(&self.previous_span());
                Node::new(NodeKind::UnaryOp { op: UnOp::Deref, operand, deref_count: count }, span)
            }
            _ => self.parse_identifier_chain_value(false),
        }
    }
}

impl<'a> Parser<'a> {
    fn parse_call_or_indexed_call(&mut self, name: String, start: plike_base::Span) -> Node<'a> {
        self.advance(); // '('
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            args.push(self.parse_expr_value());
            while self.matches(TokenKind::Comma) {
                args.push(self.parse_expr_value());
            }
        }
        self.expect(TokenKind::RParen, "expected ')'");
        let span = start.merge(&self.previous_span());

        let is_known_array = self
            .symtab
            .lookup(&name)
            .and_then(plike_lang::Symbol::as_variable)
            .is_some_and(|v| v.is_array);

        if self.config.allow_mixed_array_access && is_known_array {
            let base = self.arena.alloc(Node::new(NodeKind::Variable { name, deref_suppressed: false }, start));
            Node::new(NodeKind::ArrayAccess { base, indices: self.arena.alloc_slice(args) }, span)
        } else {
            Node::new(NodeKind::Call { callee: name, args: self.arena.alloc_slice(args) }, span)
        }
    }

    fn parse_bracket_array_access(&mut self, base: Node<'a>, start: plike_base::Span) -> Node<'a> {
        let base_ref = self.arena.alloc(base);
        let mut indices = Vec::new();
        while self.check(TokenKind::LBracket) {
            self.advance();
            indices.push(self.parse_expr_value());
            while self.matches(TokenKind::Comma) {
                indices.push(self.parse_expr_value());
            }
            self.expect(TokenKind::RBracket, "expected ']'");
        }
        let span = start.merge(&self.previous_span());
        Node::new(NodeKind::ArrayAccess { base: base_ref, indices: self.arena.alloc_slice(indices) }, span)
    }

    fn parse_or_value(&mut self) -> Node<'a> {
        let mut left = self.parse_and_value();
        while self.check(TokenKind::Or) {
            self.advance();
            left = self.combine(BinOp::Or, left, self.parse_and_value());
        }
        left
    }

    fn parse_and_value(&mut self) -> Node<'a> {
        let mut left = self.parse_bitor_value();
        while self.check(TokenKind::And) {
            self.advance();
            left = self.combine(BinOp::And, left, self.parse_bitor_value());
        }
        left
    }

    fn parse_bitor_value(&mut self) -> Node<'a> {
        let mut left = self.parse_bitxor_value();
        while self.check(TokenKind::BitOr) {
            self.advance();
            left = self.combine(BinOp::BitOr, left, self.parse_bitxor_value());
        }
        left
    }

    fn parse_bitxor_value(&mut self) -> Node<'a> {
        let mut left = self.parse_bitand_value();
        while self.check(TokenKind::BitXor) {
            self.advance();
            left = self.combine(BinOp::BitXor, left, self.parse_bitand_value());
        }
        left
    }

    fn parse_bitand_value(&mut self) -> Node<'a> {
        let mut left = self.parse_shift_value();
        while self.check(TokenKind::BitAnd) {
            self.advance();
            left = self.combine(BinOp::BitAnd, left, self.parse_shift_value());
        }
        left
    }

    fn parse_shift_value(&mut self) -> Node<'a> {
        let mut left = self.parse_equality_value();
        loop {
            let op = match self.current.kind {
                TokenKind::LShift => BinOp::Shl,
                TokenKind::RShift => BinOp::Shr,
                _ => break,
            };
            self.advance();
            left = self.combine(op, left, self.parse_equality_value());
        }
        left
    }

    fn parse_equality_value(&mut self) -> Node<'a> {
        let mut left = self.parse_relational_value();
        loop {
            let op = match self.current.kind {
                TokenKind::Eq => BinOp::Eq,
                TokenKind::Ne => BinOp::Ne,
                _ => break,
            };
            self.advance();
            left = self.combine(op, left, self.parse_relational_value());
        }
        left
    }

    fn parse_relational_value(&mut self) -> Node<'a> {
        let mut left = self.parse_additive_value();
        loop {
            let op = match self.current.kind {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Le => BinOp::Le,
                TokenKind::Ge => BinOp::Ge,
                _ => break,
            };
            self.advance();
            left = self.combine(op, left, self.parse_additive_value());
        }
        left
    }

    fn parse_additive_value(&mut self) -> Node<'a> {
        let mut left = self.parse_multiplicative_value();
        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            left = self.combine(op, left, self.parse_multiplicative_value());
        }
        left
    }

    fn parse_multiplicative_value(&mut self) -> Node<'a> {
        let mut left = self.parse_unary_value();
        loop {
            let op = match self.current.kind {
                TokenKind::Multiply => BinOp::Mul,
                TokenKind::Divide => BinOp::Div,
                TokenKind::Mod => BinOp::Mod,
                _ => break,
            };
            self.advance();
            left = self.combine(op, left, self.parse_unary_value());
        }
        left
    }

    fn combine(&mut self, op: BinOp, lhs: Node<'a>, rhs: Node<'a>) -> Node<'a> {
        let lhs = self.arena.alloc(lhs);
        let rhs = self.arena.alloc(rhs);
        let span = lhs.span.merge(&rhs.span);
        Node::new(NodeKind::BinaryOp { op, lhs, rhs }, span)
    }

    fn parse_unary_value(&mut self) -> Node<'a> {
        let start = self.current.span.clone();
        match self.current.kind {
            TokenKind::Minus => {
                self.advance();
                let operand = self.arena.alloc(self.parse_unary_value());
                let span = start.merge(&self.previous_span());
                Node::new(NodeKind::UnaryOp { op: UnOp::Neg, operand, deref_count: 1 }, span)
            }
            TokenKind::Not => {
                self.advance();
                let operand = self.arena.alloc(self.parse_unary_value());
                let span = start.merge(&self.previous_span());
                Node::new(NodeKind::UnaryOp { op: UnOp::Not, operand, deref_count: 1 }, span)
            }
            TokenKind::BitNot => {
                self.advance();
                let operand = self.arena.alloc(self.parse_unary_value());
                let span = start.merge(&self.previous_span());
                Node::new(NodeKind::UnaryOp { op: UnOp::BitNot, operand, deref_count: 1 }, span)
            }
            TokenKind::Deref => {
                let mut count = 0u32;
                while self.check(TokenKind::Deref) {
                    count += 1;
                    self.advance();
                }
                let operand = self.arena.alloc(self.parse_unary_value());
                let span = start.merge(&self.previous_span());
                Node::new(NodeKind::UnaryOp { op: UnOp::Deref, operand, deref_count: count }, span)
            }
            TokenKind::AddrOf => {
                self.advance();
                let operand = self.arena.alloc(self.parse_unary_value());
                let span = start.merge(&self.previous_span());
                Node::new(NodeKind::UnaryOp { op: UnOp::AddrOf, operand, deref_count: 1 }, span)
            }
            TokenKind::At => {
                self.advance();
                // `@` only has an effect directly in front of a bare
                // variable reference; everywhere else it is a no-op.
                if self.check(TokenKind::Identifier) {
                    self.parse_identifier_chain_value(true)
                } else {
                    self.parse_unary_value()
                }
            }
            _ => self.parse_primary_value(),
        }
    }

    fn parse_primary_value(&mut self) -> Node<'a> {
        let start = self.current.span.clone();
        match self.current.kind {
            TokenKind::Number => {
                let tok = self.current.clone();
                let raw = self.text_of(&tok);
                self.advance();
                let text = normalize_number_text(&raw, tok.number_base.unwrap_or(NumberBase::Decimal));
                Node::new(NodeKind::Number { text, is_real: tok.is_real }, start)
            }
            TokenKind::True => {
                self.advance();
                Node::new(NodeKind::Bool { value: true }, start)
            }
            TokenKind::False => {
                self.advance();
                Node::new(NodeKind::Bool { value: false }, start)
            }
            TokenKind::String => {
                let value = self.text_of(&self.current);
                self.advance();
                Node::new(NodeKind::String { value }, start)
            }
            TokenKind::LParen => {
                self.advance();
                let mut inner = self.parse_expr_value();
                self.expect(TokenKind::RParen, "expected ')'");
                inner.span = start.merge(&self.previous_span());
                inner
            }
            TokenKind::Identifier => self.parse_identifier_chain_value(false),
            _ => {
                self.error("expected an expression");
                self.advance();
                Node::new(NodeKind::Bool { value: false }, start)
            }
        }
    }
}

/// Normalises a numeric literal's lexeme per spec §4.4: an octal literal's
/// `0o`/`0O` prefix becomes a bare leading `0` (C's own octal marker); every
/// other base is passed through verbatim.
fn normalize_number_text(raw: &str, base: NumberBase) -> String {
    match base {
        NumberBase::Octal => format!("0{}", raw.get(2..).unwrap_or("")),
        _ => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;
    use plike_lang::CompileConfig;

    fn parser<'a>(arena: &'a plike_lang::NodeArena<'a>, src: &str) -> Parser<'a> {
        Parser::new("t.pl", src, CompileConfig::default(), arena)
    }

    #[test]
    fn precedence_climb_binds_multiply_tighter_than_add() {
        let arena = plike_lang::NodeArena::new();
        let mut p = parser(&arena, "1 + 2 * 3");
        let expr = p.parse_expr_value();
        match expr.kind {
            NodeKind::BinaryOp { op: BinOp::Add, rhs, .. } => {
                assert!(matches!(rhs.kind, NodeKind::BinaryOp { op: BinOp::Mul, .. }));
            }
            _ => panic!("expected Add at the top"),
        }
    }

    #[test]
    fn parenthesized_expression_overrides_precedence() {
        let arena = plike_lang::NodeArena::new();
        let mut p = parser(&arena, "(1 + 2) * 3");
        let expr = p.parse_expr_value();
        match expr.kind {
            NodeKind::BinaryOp { op: BinOp::Mul, lhs, .. } => {
                assert!(matches!(lhs.kind, NodeKind::BinaryOp { op: BinOp::Add, .. }));
            }
            _ => panic!("expected Mul at the top"),
        }
    }

    #[test]
    fn call_expression_collects_arguments() {
        let arena = plike_lang::NodeArena::new();
        let mut p = parser(&arena, "foo(1, 2)");
        let expr = p.parse_expr_value();
        match expr.kind {
            NodeKind::Call { callee, args } => {
                assert_eq!(callee, "foo");
                assert_eq!(args.len(), 2);
            }
            _ => panic!("expected Call"),
        }
    }

    #[test]
    fn bracket_chain_builds_array_access() {
        let arena = plike_lang::NodeArena::new();
        let mut p = parser(&arena, "a[1][2]");
        let expr = p.parse_expr_value();
        match expr.kind {
            NodeKind::ArrayAccess { indices, .. } => assert_eq!(indices.len(), 2),
            _ => panic!("expected ArrayAccess"),
        }
    }

    #[test]
    fn field_access_chains_after_identifier() {
        let arena = plike_lang::NodeArena::new();
        let mut p = parser(&arena, "point.x");
        let expr = p.parse_expr_value();
        match expr.kind {
            NodeKind::FieldAccess { field, .. } => assert_eq!(field, "x"),
            _ => panic!("expected FieldAccess"),
        }
    }

    #[test]
    fn statement_start_star_identifier_reinterprets_as_deref() {
        let arena = plike_lang::NodeArena::new();
        let mut p = parser(&arena, "*p");
        let lhs = p.parse_lhs_value();
        assert!(matches!(lhs.kind, NodeKind::UnaryOp { op: UnOp::Deref, .. }));
    }

    #[test]
    fn at_suppresses_deref_on_bare_variable() {
        let arena = plike_lang::NodeArena::new();
        let mut p = parser(&arena, "@p");
        let lhs = p.parse_lhs_value();
        match lhs.kind {
            NodeKind::Variable { deref_suppressed, .. } => assert!(deref_suppressed),
            _ => panic!("expected Variable"),
        }
    }

    #[test]
    fn at_is_noop_around_parenthesized_expression() {
        let arena = plike_lang::NodeArena::new();
        let mut p = parser(&arena, "@(1 + 2)");
        let expr = p.parse_expr_value();
        assert!(matches!(expr.kind, NodeKind::BinaryOp { op: BinOp::Add, .. }));
    }

    #[test]
    fn octal_literal_gets_bare_zero_prefix() {
        assert_eq!(normalize_number_text("0o17", NumberBase::Octal), "017");
    }

    #[test]
    fn decimal_literal_passes_through_verbatim() {
        assert_eq!(normalize_number_text("42", NumberBase::Decimal), "42");
    }
}
