//! Statement parsing: control flow, I/O statements, and the
//! assignment-or-call disambiguation that closes out a simple statement.

use super::{ExprParsing, Parser};
use plike_lang::{Node, NodeKind, TokenKind};

pub trait StmtParsing<'a> {
    fn parse_block_until(&mut self, terminators: &[TokenKind]) -> Node<'a>;
    fn parse_statement(&mut self) -> Option<Node<'a>>;
    fn parse_if(&mut self) -> Node<'a>;
    fn parse_while(&mut self) -> Node<'a>;
    fn parse_for(&mut self) -> Node<'a>;
    fn parse_repeat(&mut self) -> Node<'a>;
    fn parse_return(&mut self) -> Node<'a>;
    fn parse_print(&mut self) -> Node<'a>;
    fn parse_read(&mut self) -> Node<'a>;
    fn parse_assignment_or_call(&mut self) -> Node<'a>;
}

impl<'a> StmtParsing<'a> for Parser<'a> {
    fn parse_block_until(&mut self, terminators: &[TokenKind]) -> Node<'a> {
        let start = self.current.span.clone();
        let mut items = Vec::new();
        while !terminators.contains(&self.current.kind) && !matches!(self.current.kind, TokenKind::Eof) {
            match self.parse_statement() {
                Some(stmt) => items.push(stmt),
                None => break,
            }
        }
        let span = start.merge(&self.previous_span());
        Node::new(NodeKind::Block { items: self.arena.alloc_slice(items) }, span)
    }

    fn parse_statement(&mut self) -> Option<Node<'a>> {
        let node = match self.current.kind {
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Repeat => self.parse_repeat(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Print => self.parse_print(),
            TokenKind::Read => self.parse_read(),
            TokenKind::Eof
            | TokenKind::End
            | TokenKind::EndIf
            | TokenKind::EndWhile
            | TokenKind::EndFor
            | TokenKind::Until
            | TokenKind::Else
            | TokenKind::ElseIf
            | TokenKind::EndFunction
            | TokenKind::EndProcedure => return None,
            _ => self.parse_assignment_or_call(),
        };
        self.matches(TokenKind::Semicolon);
        Some(node)
    }

    fn parse_if(&mut self) -> Node<'a> {
        let start = self.current.span.clone();
        self.advance(); // 'if'
        let cond = self.parse_expr();
        self.expect(TokenKind::Then, "expected 'then'");
        let then_branch = self.arena.alloc(self.parse_block_until(&[TokenKind::ElseIf, TokenKind::Else, TokenKind::EndIf]));
        let else_branch = if self.check(TokenKind::ElseIf) {
            Some(self.arena.alloc(self.parse_elseif_chain()))
        } else if self.matches(TokenKind::Else) {
            Some(self.arena.alloc(self.parse_block_until(&[TokenKind::EndIf])))
        } else {
            None
        };
        self.expect(TokenKind::EndIf, "expected 'endif'");
        let span = start.merge(&self.previous_span());
        Node::new(NodeKind::If { cond, then_branch, else_branch }, span)
    }

    fn parse_while(&mut self) -> Node<'a> {
        let start = self.current.span.clone();
        self.advance(); // 'while'
        let cond = self.parse_expr();
        self.expect(TokenKind::Do, "expected 'do'");
        let body = self.arena.alloc(self.parse_block_until(&[TokenKind::EndWhile]));
        self.expect(TokenKind::EndWhile, "expected 'endwhile'");
        let span = start.merge(&self.previous_span());
        Node::new(NodeKind::While { cond, body }, span)
    }

    fn parse_for(&mut self) -> Node<'a> {
        let start = self.current.span.clone();
        self.advance(); // 'for'
        let var = self.expect_identifier_text();
        self.expect(TokenKind::Assign, "expected assignment operator");
        let init = self.parse_expr();
        self.expect(TokenKind::To, "expected 'to'");
        let end = self.parse_expr();
        let step = if self.matches(TokenKind::Step) { Some(self.parse_expr()) } else { None };
        self.expect(TokenKind::Do, "expected 'do'");
        let body = self.arena.alloc(self.parse_block_until(&[TokenKind::EndFor]));
        self.expect(TokenKind::EndFor, "expected 'endfor'");
        let span = start.merge(&self.previous_span());
        Node::new(NodeKind::For { var, init, end, step, body }, span)
    }

    fn parse_repeat(&mut self) -> Node<'a> {
        let start = self.current.span.clone();
        self.advance(); // 'repeat'
        let body = self.arena.alloc(self.parse_block_until(&[TokenKind::Until]));
        self.expect(TokenKind::Until, "expected 'until'");
        let until = self.parse_expr();
        let span = start.merge(&self.previous_span());
        Node::new(NodeKind::Repeat { body, until }, span)
    }

    fn parse_return(&mut self) -> Node<'a> {
        let start = self.current.span.clone();
        self.advance(); // 'return'
        let value = if self.starts_expression() { Some(self.parse_expr()) } else { None };
        let span = start.merge(&self.previous_span());
        Node::new(NodeKind::Return { value }, span)
    }

    fn parse_print(&mut self) -> Node<'a> {
        let start = self.current.span.clone();
        self.advance(); // 'print'
        let value = self.parse_expr();
        let span = start.merge(&self.previous_span());
        Node::new(NodeKind::Print { value }, span)
    }

    fn parse_read(&mut self) -> Node<'a> {
        let start = self.current.span.clone();
        self.advance(); // 'read'
        let target = self.arena.alloc(self.parse_lhs_value());
        let span = start.merge(&self.previous_span());
        Node::new(NodeKind::Read { target }, span)
    }

    fn parse_assignment_or_call(&mut self) -> Node<'a> {
        let start = self.current.span.clone();
        let lhs = self.parse_lhs_value();
        if self.check(TokenKind::Assign) {
            self.advance();
            let target = self.arena.alloc(lhs);
            let value = self.parse_expr();
            let span = start.merge(&self.previous_span());
            return Node::new(NodeKind::Assignment { target, value }, span);
        }
        // No assignment operator followed: the parsed chain was itself the
        // whole statement, almost always a bare call.
        lhs
    }
}

impl<'a> Parser<'a> {
    fn parse_elseif_chain(&mut self) -> Node<'a> {
        let start = self.current.span.clone();
        self.advance(); // 'elseif'
        let cond = self.parse_expr();
        self.expect(TokenKind::Then, "expected 'then'");
        let then_branch = self.arena.alloc(self.parse_block_until(&[TokenKind::ElseIf, TokenKind::Else, TokenKind::EndIf]));
        let else_branch = if self.check(TokenKind::ElseIf) {
            Some(self.arena.alloc(self.parse_elseif_chain()))
        } else if self.matches(TokenKind::Else) {
            Some(self.arena.alloc(self.parse_block_until(&[TokenKind::EndIf])))
        } else {
            None
        };
        // `endif` terminates the whole chain and is consumed once, by the
        // outermost `parse_if`.
        let span = start.merge(&self.previous_span());
        Node::new(NodeKind::If { cond, then_branch, else_branch }, span)
    }

    fn starts_expression(&self) -> bool {
        matches!(
            self.current.kind,
            TokenKind::Number
                | TokenKind::Identifier
                | TokenKind::True
                | TokenKind::False
                | TokenKind::String
                | TokenKind::LParen
                | TokenKind::Minus
                | TokenKind::Not
                | TokenKind::BitNot
                | TokenKind::Deref
                | TokenKind::AddrOf
                | TokenKind::At
        )
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
    fn assignment_statement_builds_target_and_value() {
        let arena = plike_lang::NodeArena::new();
        let mut p = parser(&arena, "x := 1 + 2;");
        let stmt = p.parse_statement().unwrap();
        match stmt.kind {
            NodeKind::Assignment { target, value } => {
                assert!(matches!(target.kind, NodeKind::Variable { .. }));
                assert!(matches!(value.kind, NodeKind::BinaryOp { .. }));
            }
            _ => panic!("expected Assignment"),
        }
    }

    #[test]
    fn bare_call_statement_is_not_wrapped_as_assignment() {
        let arena = plike_lang::NodeArena::new();
        let mut p = parser(&arena, "foo(1, 2);");
        let stmt = p.parse_statement().unwrap();
        assert!(matches!(stmt.kind, NodeKind::Call { .. }));
    }

    #[test]
    fn elseif_chain_models_as_nested_if() {
        let arena = plike_lang::NodeArena::new();
        let mut p = parser(&arena, "if a then x := 1; elseif b then x := 2; else x := 3; endif");
        let stmt = p.parse_statement().unwrap();
        match stmt.kind {
            NodeKind::If { else_branch: Some(elseif), .. } => {
                match elseif.kind {
                    NodeKind::If { else_branch: Some(else_block), .. } => {
                        assert!(matches!(else_block.kind, NodeKind::Block { .. }));
                    }
                    _ => panic!("expected nested If for elseif"),
                }
            }
            _ => panic!("expected If with else_branch"),
        }
    }

    #[test]
    fn for_loop_with_negative_step_parses() {
        let arena = plike_lang::NodeArena::new();
        let mut p = parser(&arena, "for i := n to 1 step -1 do x := i; endfor");
        let stmt = p.parse_statement().unwrap();
        match stmt.kind {
            NodeKind::For { var, step, .. } => {
                assert_eq!(var, "i");
                assert!(step.is_some());
            }
            _ => panic!("expected For"),
        }
    }

    #[test]
    fn while_loop_parses_condition_and_body() {
        let arena = plike_lang::NodeArena::new();
        let mut p = parser(&arena, "while x < 10 do x := x + 1; endwhile");
        let stmt = p.parse_statement().unwrap();
        assert!(matches!(stmt.kind, NodeKind::While { .. }));
    }

    #[test]
    fn repeat_until_parses_condition_after_body() {
        let arena = plike_lang::NodeArena::new();
        let mut p = parser(&arena, "repeat x := x + 1; until x = 10");
        let stmt = p.parse_statement().unwrap();
        match stmt.kind {
            NodeKind::Repeat { until, .. } => assert!(matches!(until.kind, NodeKind::BinaryOp { .. })),
            _ => panic!("expected Repeat"),
        }
    }

    #[test]
    fn return_without_value_is_none() {
        let arena = plike_lang::NodeArena::new();
        let mut p = parser(&arena, "return; endfunction");
        let stmt = p.parse_statement().unwrap();
        match stmt.kind {
            NodeKind::Return { value } => assert!(value.is_none()),
            _ => panic!("expected Return"),
        }
    }

    #[test]
    fn read_target_allows_deref_chain() {
        let arena = plike_lang::NodeArena::new();
        let mut p = parser(&arena, "read *p;");
        let stmt = p.parse_statement().unwrap();
        match stmt.kind {
            NodeKind::Read { target } => assert!(matches!(target.kind, NodeKind::UnaryOp { .. })),
            _ => panic!("expected Read"),
        }
    }
}
