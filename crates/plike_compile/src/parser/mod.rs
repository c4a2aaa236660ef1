//! Recursive-descent parser: a two-token window over the lexer stream that
//! builds the AST and populates the symbol table in lockstep.
//!
//! Split by grammar category into sibling modules, each exposing its
//! operations through a trait implemented once for [`Parser`] — mirroring
//! how the lexer keeps each surface-syntax concern (keywords, numbers,
//! dotted operators) in its own scan function. Declarations, statements,
//! expressions, and the raw-source array-bounds scan each get their own
//! file and their own `*Parsing` trait.

mod bounds;
mod decl;
mod expr;
mod stmt;

pub use bounds::BoundsParsing;
pub use decl::DeclParsing;
pub use expr::ExprParsing;
pub use stmt::StmtParsing;

use plike_base::{Diagnostics, ErrorKind, Interner, Severity, Span};
use plike_lang::{CompileConfig, Lexer, Node, NodeArena, SymbolTable, Token, TokenKind};

/// Recursive-descent parser state: the lexer, a two-token lookahead window,
/// the symbol table being built in lockstep, and collected diagnostics.
pub struct Parser<'a> {
    lexer: Lexer,
    config: CompileConfig,
    arena: &'a NodeArena<'a>,
    symtab: SymbolTable,
    diags: Diagnostics,
    current: Token,
    peek: Token,
    last_span: Span,
    /// Name of the function/procedure currently being parsed, for the
    /// implicit-return-variable and body-style-parameter-type rules.
    current_function: Option<String>,
    /// Counter for synthesising `record_N` names for anonymous nested records.
    record_counter: u32,
}

impl<'a> Parser<'a> {
    pub fn new(filename: impl Into<std::rc::Rc<str>>, source: &str, config: CompileConfig, arena: &'a NodeArena<'a>) -> Self {
        let mut lexer = Lexer::new(filename, source);
        let mut diags = Diagnostics::new();
        let current = lexer.next_token(&config, &mut diags);
        let peek = lexer.next_token(&config, &mut diags);
        let last_span = current.span.clone();
        Parser {
            lexer,
            config,
            arena,
            symtab: SymbolTable::new(),
            diags,
            current,
            peek,
            last_span,
            current_function: None,
            record_counter: 0,
        }
    }

    /// Parses the whole program, returning the `Program` root node.
    pub fn parse(&mut self) -> &'a Node<'a> {
        DeclParsing::parse_program(self)
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diags
    }

    pub fn symtab(&self) -> &SymbolTable {
        &self.symtab
    }

    /// Consumes the parser, handing back the populated symbol table,
    /// collected diagnostics, and the interner that resolved every lexeme.
    pub fn into_parts(self) -> (SymbolTable, Diagnostics, Interner) {
        let interner = self.lexer.into_interner();
        (self.symtab, self.diags, interner)
    }

    fn bump(&mut self) -> Token {
        let next = self.lexer.next_token(&self.config, &mut self.diags);
        log::trace!(target: "plike_compile::parser", "consumed {:?}, lookahead now {:?}", self.current.kind, self.peek.kind);
        self.last_span = self.current.span.clone();
        std::mem::replace(&mut self.current, std::mem::replace(&mut self.peek, next))
    }

    fn advance(&mut self) -> Token {
        self.bump()
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Token {
        if self.check(kind) {
            self.advance()
        } else {
            self.error(message);
            self.current.clone()
        }
    }

    fn text_of(&self, tok: &Token) -> String {
        self.lexer.interner().resolve(tok.lexeme).to_string()
    }

    /// Raw source bytes, for the bounded read-only array-dimension scan.
    fn source_bytes(&self) -> &[u8] {
        self.lexer.source().as_bytes()
    }

    fn expect_identifier_text(&mut self) -> String {
        if self.check(TokenKind::Identifier) {
            let text = self.text_of(&self.current);
            self.advance();
            text
        } else {
            self.error("expected an identifier");
            String::new()
        }
    }

    fn peek_is_identifier(&self) -> bool {
        self.peek.kind == TokenKind::Identifier
    }

    fn previous_span(&self) -> Span {
        self.last_span.clone()
    }

    /// Records a syntax error at the current token and enters panic mode.
    /// [`Diagnostics::report`] already drops anything reported while panic
    /// mode is set, so repeated calls before the next [`Parser::synchronize`]
    /// cost nothing extra.
    fn error(&mut self, message: impl Into<String>) {
        self.diags
            .report(ErrorKind::Syntax, Severity::Error, self.current.span.clone(), message);
        self.diags.begin_panic_mode();
    }

    /// Discards tokens until a semicolon (consumed) or a declaration-start
    /// keyword (left for the caller to re-examine), then leaves panic mode.
    fn synchronize(&mut self) {
        while !matches!(self.current.kind, TokenKind::Eof) {
            if self.current.kind == TokenKind::Semicolon {
                self.advance();
                break;
            }
            if self.current.kind.is_declaration_start() {
                break;
            }
            self.advance();
        }
        self.diags.end_panic_mode();
    }
}
