//! Hover
//!
//! What the cursor is on decides the content:
//!
//!     - a data item: its group hierarchy, one entry per line with growing indentation, then the
//!       item's own children one level further in
//!     - a program name: the chain of enclosing programs down to this one
//!     - a paragraph or section label: the label and its program
//!     - any other word: the program/division path that encloses it
//!
//! Positions on whitespace, punctuation or literals produce no hover.

use crate::document::DocumentAnalysis;
use crate::symbols::{LabelKind, SymbolIndex};
use cobol_parser::cobol::ast::{NodeKind, Position, Range};

#[derive(Debug, Clone, PartialEq)]
pub struct HoverResult {
    pub range: Range,
    pub contents: String,
}

pub fn hover(analysis: &DocumentAnalysis, position: Position) -> Option<HoverResult> {
    let word = analysis.word_at(position)?;
    let index = analysis.index();

    let contents = if let Some(item) = index.data_item_named(&word.lexeme) {
        cobol_block(&data_item_lines(index, item))
    } else if let Some(program) = index.program_named(&word.lexeme) {
        cobol_block(&program_lines(index, program))
    } else if let Some(label) = index.label_named(&word.lexeme) {
        let kind = match label.kind {
            LabelKind::Section => "Section",
            LabelKind::Paragraph => "Paragraph",
        };
        let owner = label
            .program
            .and_then(|p| index.programs().get(p))
            .map(|p| format!(" in program `{}`", p.name))
            .unwrap_or_default();
        format!("**{kind}** `{}`{owner}", label.name)
    } else {
        context_path(analysis, position)?
    };

    Some(HoverResult {
        range: word.range(),
        contents,
    })
}

fn data_item_lines(index: &SymbolIndex, item: usize) -> Vec<String> {
    let items = index.data_items();
    let mut lines = Vec::new();
    let mut prefix = String::new();
    for entry in index.data_lineage(item) {
        lines.push(format!("{prefix}{}", entry.display_line));
        prefix.push_str("  ");
    }
    if let Some(target) = items.get(item) {
        for child in target.children.iter().filter_map(|c| items.get(*c)) {
            lines.push(format!("{prefix}{}", child.display_line));
        }
    }
    lines
}

fn program_lines(index: &SymbolIndex, program: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut prefix = String::new();
    for entry in index.program_lineage(program) {
        lines.push(format!("{prefix}PROGRAM-ID. {}.", entry.name));
        prefix.push_str("  ");
    }
    lines
}

fn context_path(analysis: &DocumentAnalysis, position: Position) -> Option<String> {
    let parts: Vec<String> = analysis
        .enclosing_nodes(position)
        .into_iter()
        .filter_map(|node| match node.kind {
            NodeKind::ProgramUnit => node.name.as_ref().map(|name| format!("`{name}`")),
            NodeKind::IdentificationDivision => Some("IDENTIFICATION DIVISION".to_string()),
            NodeKind::EnvironmentDivision => Some("ENVIRONMENT DIVISION".to_string()),
            NodeKind::DataDivision => Some("DATA DIVISION".to_string()),
            NodeKind::ProcedureDivision => Some("PROCEDURE DIVISION".to_string()),
            NodeKind::Custom => node.dialect.clone(),
            NodeKind::SourceUnit | NodeKind::Skipped => None,
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join(" > "))
}

fn cobol_block(lines: &[String]) -> String {
    format!("```cobol\n{}\n```", lines.join("\n"))
}
