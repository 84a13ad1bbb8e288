//! Concrete syntax tree
//!
//!     The tree is made of a single tagged node type rather than a type per grammar construct.
//!     A [`Node`] has a [`NodeKind`] tag, an optional dialect tag, an ordered list of children
//!     (tokens or nested nodes), and, for program units, the declared program name.
//!
//!     Every token the parser consumes becomes a child of exactly one node, so walking the
//!     leaves of the tree in order reproduces the consumed token sequence.
//!
//!     Locations are derived: a node's range is the bounding box of its leaves. An empty node
//!     has no range.

use super::range::Range;
use crate::cobol::lexing::GrammarRule;
use crate::cobol::token::Token;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    SourceUnit,
    ProgramUnit,
    IdentificationDivision,
    EnvironmentDivision,
    DataDivision,
    ProcedureDivision,
    /// Error-recovery container for tokens no production could claim.
    Skipped,
    /// Node contributed by an embedded dialect; see [`Node::dialect`].
    Custom,
}

impl NodeKind {
    /// The grammar rule active while a node of this kind is being built.
    pub fn rule(self) -> GrammarRule {
        match self {
            NodeKind::SourceUnit => GrammarRule::SourceUnit,
            NodeKind::ProgramUnit => GrammarRule::ProgramUnit,
            NodeKind::IdentificationDivision => GrammarRule::IdentificationDivision,
            NodeKind::EnvironmentDivision => GrammarRule::EnvironmentDivision,
            NodeKind::DataDivision => GrammarRule::DataDivision,
            NodeKind::ProcedureDivision => GrammarRule::ProcedureDivision,
            NodeKind::Skipped => GrammarRule::Skipped,
            NodeKind::Custom => GrammarRule::Custom,
        }
    }

    pub fn is_division(self) -> bool {
        matches!(
            self,
            NodeKind::IdentificationDivision
                | NodeKind::EnvironmentDivision
                | NodeKind::DataDivision
                | NodeKind::ProcedureDivision
        )
    }

    pub fn display_name(self) -> &'static str {
        match self {
            NodeKind::SourceUnit => "SourceUnit",
            NodeKind::ProgramUnit => "ProgramUnit",
            NodeKind::IdentificationDivision => "IdentificationDivision",
            NodeKind::EnvironmentDivision => "EnvironmentDivision",
            NodeKind::DataDivision => "DataDivision",
            NodeKind::ProcedureDivision => "ProcedureDivision",
            NodeKind::Skipped => "Skipped",
            NodeKind::Custom => "Custom",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A child of a node: either a consumed token or a nested node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum Element {
    Token(Token),
    Node(Node),
}

impl Element {
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Element::Token(token) => Some(token),
            Element::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Element::Node(node) => Some(node),
            Element::Token(_) => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Element::Node(node) if node.kind == NodeKind::Skipped)
    }

    pub fn range(&self) -> Option<Range> {
        match self {
            Element::Token(token) => Some(token.range()),
            Element::Node(node) => node.range(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub dialect: Option<String>,
    pub name: Option<String>,
    pub children: Vec<Element>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            dialect: None,
            name: None,
            children: Vec::new(),
        }
    }

    /// A dialect-owned node, e.g. an embedded SQL block allowed only in certain sections.
    pub fn custom(dialect: impl Into<String>) -> Self {
        Self {
            dialect: Some(dialect.into()),
            ..Self::new(NodeKind::Custom)
        }
    }

    pub fn with_children(mut self, children: Vec<Element>) -> Self {
        self.children = children;
        self
    }

    pub fn push_token(&mut self, token: Token) {
        self.children.push(Element::Token(token));
    }

    pub fn push_node(&mut self, node: Node) {
        self.children.push(Element::Node(node));
    }

    /// Nested nodes, skipping token children.
    pub fn child_nodes(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter_map(Element::as_node)
    }

    /// Every token under this node, depth first, in source order.
    pub fn tokens(&self) -> Vec<&Token> {
        let mut out = Vec::new();
        collect_tokens(self, &mut out);
        out
    }

    /// Bounding range of all leaves; `None` for a node without tokens.
    pub fn range(&self) -> Option<Range> {
        let ranges: Vec<Range> = self.tokens().iter().map(|token| token.range()).collect();
        Range::bounding_box(ranges.iter())
    }

    /// Depth-first iterator over this node and all nested nodes, with their depth.
    pub fn walk(&self) -> Vec<(&Node, usize)> {
        let mut out = Vec::new();
        walk_nodes(self, 0, &mut out);
        out
    }
}

fn collect_tokens<'a>(node: &'a Node, out: &mut Vec<&'a Token>) {
    for child in &node.children {
        match child {
            Element::Token(token) => out.push(token),
            Element::Node(nested) => collect_tokens(nested, out),
        }
    }
}

fn walk_nodes<'a>(node: &'a Node, depth: usize, out: &mut Vec<(&'a Node, usize)>) {
    out.push((node, depth));
    for nested in node.child_nodes() {
        walk_nodes(nested, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cobol::ast::range::Position;
    use crate::cobol::token::TokenType;

    fn word(lexeme: &str, line: usize, column: usize, offset: usize) -> Token {
        Token::new(
            lexeme,
            TokenType::Word,
            line,
            column,
            offset..offset + lexeme.len(),
        )
    }

    #[test]
    fn test_node_range_is_bounding_box_of_leaves() {
        let mut division = Node::new(NodeKind::DataDivision);
        division.push_token(word("DATA", 2, 7, 30));
        division.push_token(word("DIVISION", 2, 12, 35));

        let mut program = Node::new(NodeKind::ProgramUnit);
        program.push_token(word("ID", 0, 7, 7));
        program.push_node(division);

        let range = program.range().unwrap();
        assert_eq!(range.start, Position::new(0, 7));
        assert_eq!(range.end, Position::new(2, 20));
        assert_eq!(range.span, 7..43);
    }

    #[test]
    fn test_empty_node_has_no_range() {
        assert!(Node::new(NodeKind::SourceUnit).range().is_none());
    }

    #[test]
    fn test_custom_nodes_carry_dialect() {
        let node = Node::custom("DB2 SQL");
        assert_eq!(node.kind, NodeKind::Custom);
        assert_eq!(node.dialect.as_deref(), Some("DB2 SQL"));
        assert_eq!(node.kind.rule(), GrammarRule::Custom);
    }

    #[test]
    fn test_walk_reports_depth() {
        let inner = Node::new(NodeKind::ProcedureDivision);
        let program = Node::new(NodeKind::ProgramUnit).with_children(vec![Element::Node(inner)]);
        let root = Node::new(NodeKind::SourceUnit).with_children(vec![Element::Node(program)]);

        let kinds: Vec<_> = root.walk().iter().map(|(n, d)| (n.kind, *d)).collect();
        assert_eq!(
            kinds,
            vec![
                (NodeKind::SourceUnit, 0),
                (NodeKind::ProgramUnit, 1),
                (NodeKind::ProcedureDivision, 2),
            ]
        );
    }
}
