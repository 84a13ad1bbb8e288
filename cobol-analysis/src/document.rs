//! Analyzed document: one parse plus the symbol index built from it.

use crate::symbols::SymbolIndex;
use cobol_parser::cobol::ast::{Diagnostic, Node, NodeKind, Position};
use cobol_parser::cobol::parsing::{parse_source, ParseResult};
use cobol_parser::cobol::token::{Token, TokenType};

#[derive(Debug, Clone)]
pub struct DocumentAnalysis {
    parse: ParseResult,
    index: SymbolIndex,
}

impl DocumentAnalysis {
    pub fn new(parse: ParseResult) -> Self {
        let index = SymbolIndex::build(parse.root());
        Self { parse, index }
    }

    pub fn from_source(source: &str) -> Self {
        Self::new(parse_source(source))
    }

    pub fn root(&self) -> &Node {
        self.parse.root()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.parse.diagnostics()
    }

    pub fn parse_result(&self) -> &ParseResult {
        &self.parse
    }

    pub fn index(&self) -> &SymbolIndex {
        &self.index
    }

    /// The word token under `position`. A cursor right after the last character still counts.
    pub fn word_at(&self, position: Position) -> Option<&Token> {
        self.root()
            .tokens()
            .into_iter()
            .find(|t| t.kind == TokenType::Word && t.range().contains(position))
    }

    /// Nodes enclosing `position`, outermost first, Skipped subtrees excluded.
    pub fn enclosing_nodes(&self, position: Position) -> Vec<&Node> {
        let mut chain = Vec::new();
        let mut current = self.root();
        loop {
            let next = current.child_nodes().find(|child| {
                child.kind != NodeKind::Skipped
                    && child.range().is_some_and(|range| range.contains(position))
            });
            match next {
                Some(child) => {
                    chain.push(child);
                    current = child;
                }
                None => break,
            }
        }
        chain
    }
}
