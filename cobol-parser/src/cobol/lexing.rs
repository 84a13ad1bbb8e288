//! Lexer
//!
//!     This module defines the token stream contract the parsing engine consumes, and ships the
//!     stock logos-based stream that backs it.
//!
//! The Token Stream Contract
//!
//!     The parser only ever talks to a [`TokenStream`]:
//!         - `has_more()`: unconsumed input remains
//!         - `peek(rule)`: the next token, without advancing
//!         - `forward(rule)`: consume and return the next token
//!         - `peek_seq(rule, n, skip)`: up to `n` tokens ahead, skipping tokens that match
//!           `skip`, without consuming any of them
//!
//!     Every call is scoped by the [`GrammarRule`] of the production being built. Streams use it
//!     to decide what "next" means (for instance whether comment entries are folded or returned
//!     literally). The parser never re-tokenizes and never backtracks past what `peek_seq` has
//!     inspected.
//!
//! The Stock Stream
//!
//!     [`CobolLexer`] tokenizes the whole source up front with logos and then serves the contract
//!     from a cursor. It treats every grammar rule alike: all whitespace, newlines and floating
//!     comments (`*>` to end of line) are returned literally, typed as trivia. Characters logos
//!     cannot classify still come out as `Other` tokens, so no byte of the source is ever lost.

use crate::cobol::ast::range::SourceLocation;
use crate::cobol::token::{Token, TokenType};
use logos::Logos;
use serde::Serialize;

/// Identifies the production currently being built. Every parse-context frame carries one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GrammarRule {
    SourceUnit,
    ProgramUnit,
    IdentificationDivision,
    EnvironmentDivision,
    DataDivision,
    ProcedureDivision,
    Skipped,
    Custom,
}

/// The lookahead/consumption surface the parsing engine requires.
pub trait TokenStream {
    fn has_more(&self) -> bool;

    /// The next unconsumed token, or the end-of-input sentinel.
    fn peek(&mut self, rule: GrammarRule) -> Token;

    /// Consume and return the next token. At end of input returns the sentinel and stays put.
    fn forward(&mut self, rule: GrammarRule) -> Token;

    /// Up to `n` tokens ahead, skipping those `skip` accepts. Stops early at end of input and
    /// never includes the sentinel.
    fn peek_seq(&mut self, rule: GrammarRule, n: usize, skip: &dyn Fn(&Token) -> bool)
        -> Vec<Token>;
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
    #[regex(r"[ \t\x0C]+")]
    Whitespace,

    #[regex(r"\*>[^\r\n]*")]
    FloatingComment,

    #[regex(r"\r\n|\n|\r")]
    NewLine,

    #[regex(r"[A-Za-z0-9][A-Za-z0-9_\-]*")]
    Word,

    #[regex(r"'[^'\r\n]*'?")]
    #[regex(r#""[^"\r\n]*"?"#)]
    Literal,

    #[regex(r#"[^ \t\x0C\r\nA-Za-z0-9'"]"#)]
    Punctuation,
}

impl RawToken {
    fn token_type(self) -> TokenType {
        match self {
            RawToken::Whitespace | RawToken::FloatingComment => TokenType::Whitespace,
            RawToken::NewLine => TokenType::NewLine,
            RawToken::Word => TokenType::Word,
            RawToken::Literal | RawToken::Punctuation => TokenType::Other,
        }
    }
}

/// Tokenize a whole source text. The concatenation of all lexemes equals the input.
pub fn tokenize(source: &str) -> Vec<Token> {
    let locator = SourceLocation::new(source);
    let mut lexer = RawToken::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let kind = result
            .map(RawToken::token_type)
            .unwrap_or(TokenType::Other);
        let start = locator.byte_to_position(span.start);
        tokens.push(Token::new(
            lexer.slice(),
            kind,
            start.line,
            start.column,
            span,
        ));
    }

    tokens
}

/// Cursor-based token stream over a pre-tokenized source.
#[derive(Debug, Clone)]
pub struct CobolLexer {
    tokens: Vec<Token>,
    cursor: usize,
    eof: Token,
}

impl CobolLexer {
    pub fn new(source: &str) -> Self {
        let locator = SourceLocation::new(source);
        let end = locator.byte_to_position(source.len());
        Self {
            tokens: tokenize(source),
            cursor: 0,
            eof: Token::end_of_input(end.line, end.column, source.len()),
        }
    }

    /// Every token this stream produces, in order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    fn current(&self) -> Token {
        self.tokens
            .get(self.cursor)
            .cloned()
            .unwrap_or_else(|| self.eof.clone())
    }
}

impl TokenStream for CobolLexer {
    fn has_more(&self) -> bool {
        self.cursor < self.tokens.len()
    }

    fn peek(&mut self, _rule: GrammarRule) -> Token {
        self.current()
    }

    fn forward(&mut self, _rule: GrammarRule) -> Token {
        let token = self.current();
        if self.has_more() {
            self.cursor += 1;
        }
        token
    }

    fn peek_seq(
        &mut self,
        _rule: GrammarRule,
        n: usize,
        skip: &dyn Fn(&Token) -> bool,
    ) -> Vec<Token> {
        self.tokens[self.cursor..]
            .iter()
            .filter(|token| !skip(token))
            .take(n)
            .cloned()
            .collect()
    }
}
