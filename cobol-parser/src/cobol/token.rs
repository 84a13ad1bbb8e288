//! Token types shared by the lexer, the parsing engine, and tooling.
//!
//!     A token is immutable once produced. It carries its lexeme verbatim (the parser never
//!     normalizes source text; keyword comparison upper-cases on the fly) together with its
//!     zero-based line and start column and the byte span it was cut from.
//!
//!     End of input is represented by a synthetic sentinel token. It is never counted as a
//!     produced token and never becomes a leaf of the syntax tree.

use crate::cobol::ast::range::{Position, Range};
use serde::Serialize;
use std::fmt;

/// Coarse classification of a token, as far as the parser is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenType {
    Word,
    Whitespace,
    NewLine,
    EndOfInput,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub lexeme: String,
    pub kind: TokenType,
    pub line: usize,
    pub column: usize,
    pub span: std::ops::Range<usize>,
}

impl Token {
    pub fn new(
        lexeme: impl Into<String>,
        kind: TokenType,
        line: usize,
        column: usize,
        span: std::ops::Range<usize>,
    ) -> Self {
        Self {
            lexeme: lexeme.into(),
            kind,
            line,
            column,
            span,
        }
    }

    /// Sentinel returned by token streams once input is exhausted.
    pub fn end_of_input(line: usize, column: usize, offset: usize) -> Self {
        Self::new("", TokenType::EndOfInput, line, column, offset..offset)
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenType::EndOfInput
    }

    /// Whitespace or line break: the tokens `spaces()` folds and lookahead skips.
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenType::Whitespace | TokenType::NewLine)
    }

    /// True for the statement terminator used by synchronization.
    pub fn is_terminator(&self) -> bool {
        self.kind == TokenType::Other && self.lexeme == "."
    }

    /// Single-line range covering the lexeme. A newline token ends one column after it starts.
    pub fn range(&self) -> Range {
        let width = match self.kind {
            TokenType::NewLine => 1,
            _ => self.lexeme.chars().count(),
        };
        Range::new(
            self.span.clone(),
            Position::new(self.line, self.column),
            Position::new(self.line, self.column + width),
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenType::EndOfInput => write!(f, "<eof>"),
            TokenType::NewLine => write!(f, "\\n"),
            _ => write!(f, "{}", self.lexeme),
        }
    }
}
