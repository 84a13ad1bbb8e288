//! Parsing module for COBOL sources
//!
//!     Source text goes through two stages:
//!         1. Lexing: a [`TokenStream`](crate::cobol::lexing::TokenStream) over the text. See
//!            [lexing](crate::cobol::lexing).
//!         2. Analysis: the recursive-descent [engine] builds the tree and collects diagnostics.
//!
//!     Parsing never fails. Whatever the input, the result is a SourceUnit tree whose leaves,
//!     read in order, reproduce the consumed text exactly, plus the diagnostics recorded on the
//!     way. Content the grammar cannot place ends up inside Skipped nodes.
//!
//! Dialects
//!
//!     Dialect preprocessors may hand the engine a custom [`TokenStream`] of their own. Nodes they
//!     contribute use [`NodeKind::Custom`](crate::cobol::ast::NodeKind::Custom) with a dialect tag,
//!     which consumers treat like any other node.

pub mod context;
pub mod engine;
pub mod error;
pub mod similarity;

pub use engine::CobolParser;
pub use error::ParseFailure;
pub use similarity::{KeywordMatch, SimilarityMatcher, SIMILARITY_THRESHOLD};

use crate::cobol::ast::{Diagnostic, DiagnosticSeverity, Node, NodeKind};
use crate::cobol::lexing::{CobolLexer, TokenStream};
use serde::Serialize;

/// The tree and the diagnostics of one parse.
#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    root: Node,
    diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    pub fn new(root: Node, diagnostics: Vec<Diagnostic>) -> Self {
        Self { root, diagnostics }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error)
    }

    /// Every program unit in the tree, nested ones included, in source order.
    pub fn programs(&self) -> Vec<&Node> {
        self.root
            .walk()
            .into_iter()
            .filter(|(node, _)| node.kind == NodeKind::ProgramUnit)
            .map(|(node, _)| node)
            .collect()
    }

    pub fn into_parts(self) -> (Node, Vec<Diagnostic>) {
        (self.root, self.diagnostics)
    }
}

/// Parse a whole source text with the stock lexer.
pub fn parse_source(source: &str) -> ParseResult {
    parse_stream(CobolLexer::new(source))
}

/// Parse any token stream, e.g. one produced by a dialect preprocessor.
pub fn parse_stream<S: TokenStream>(stream: S) -> ParseResult {
    CobolParser::new(stream).parse()
}
