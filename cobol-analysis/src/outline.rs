//! Document outline
//!
//! Programs become modules holding their divisions; nested programs appear under the program
//! that contains them. Data divisions list their top-level entries with groups expanded, and
//! procedure divisions list sections and paragraphs in source order. Dialect nodes are shown as
//! objects named after their dialect. Skipped regions are left out.

use crate::document::DocumentAnalysis;
use crate::symbols::{LabelKind, SymbolIndex};
use cobol_parser::cobol::ast::{Node, NodeKind, Range};
use lsp_types::SymbolKind;

#[derive(Debug, Clone, PartialEq)]
pub struct CobolDocumentSymbol {
    pub name: String,
    pub detail: Option<String>,
    pub kind: SymbolKind,
    pub range: Range,
    pub selection_range: Range,
    pub children: Vec<CobolDocumentSymbol>,
}

pub fn collect_document_symbols(analysis: &DocumentAnalysis) -> Vec<CobolDocumentSymbol> {
    node_symbols(analysis.root(), analysis.index())
}

fn node_symbols(node: &Node, index: &SymbolIndex) -> Vec<CobolDocumentSymbol> {
    node.child_nodes()
        .filter_map(|child| node_symbol(child, index))
        .collect()
}

fn node_symbol(node: &Node, index: &SymbolIndex) -> Option<CobolDocumentSymbol> {
    let range = node.range()?;
    let symbol = match node.kind {
        NodeKind::ProgramUnit => {
            let program = index
                .programs()
                .iter()
                .find(|p| p.extent == range);
            CobolDocumentSymbol {
                name: node.name.clone().unwrap_or_else(|| "<program>".to_string()),
                detail: Some("program".to_string()),
                kind: SymbolKind::MODULE,
                selection_range: program.map(|p| p.range.clone()).unwrap_or_else(|| range.clone()),
                range,
                children: node_symbols(node, index),
            }
        }
        NodeKind::IdentificationDivision | NodeKind::EnvironmentDivision => {
            division_symbol(node, range, Vec::new())
        }
        NodeKind::DataDivision => {
            let children = data_symbols(index, &range);
            division_symbol(node, range, children)
        }
        NodeKind::ProcedureDivision => {
            let children = label_symbols(index, &range);
            division_symbol(node, range, children)
        }
        NodeKind::Custom => CobolDocumentSymbol {
            name: node.dialect.clone().unwrap_or_else(|| "dialect".to_string()),
            detail: Some("dialect block".to_string()),
            kind: SymbolKind::OBJECT,
            selection_range: range.clone(),
            range,
            children: node_symbols(node, index),
        },
        NodeKind::SourceUnit | NodeKind::Skipped => return None,
    };
    Some(symbol)
}

fn division_symbol(
    node: &Node,
    range: Range,
    children: Vec<CobolDocumentSymbol>,
) -> CobolDocumentSymbol {
    let name = match node.kind {
        NodeKind::IdentificationDivision => "IDENTIFICATION DIVISION",
        NodeKind::EnvironmentDivision => "ENVIRONMENT DIVISION",
        NodeKind::DataDivision => "DATA DIVISION",
        _ => "PROCEDURE DIVISION",
    };
    let selection_range = node
        .tokens()
        .into_iter()
        .find(|t| !t.is_trivia())
        .map(|t| t.range())
        .unwrap_or_else(|| range.clone());
    CobolDocumentSymbol {
        name: name.to_string(),
        detail: None,
        kind: SymbolKind::NAMESPACE,
        range,
        selection_range,
        children,
    }
}

fn within(outer: &Range, inner: &Range) -> bool {
    outer.span.start <= inner.span.start && inner.span.end <= outer.span.end
}

fn data_symbols(index: &SymbolIndex, division: &Range) -> Vec<CobolDocumentSymbol> {
    index
        .data_items()
        .iter()
        .enumerate()
        .filter(|(_, item)| item.parent.is_none() && within(division, &item.extent))
        .map(|(i, _)| data_symbol(index, i))
        .collect()
}

fn data_symbol(index: &SymbolIndex, item: usize) -> CobolDocumentSymbol {
    let items = index.data_items();
    let entry = &items[item];
    let kind = if entry.is_condition() {
        SymbolKind::ENUM_MEMBER
    } else if entry.children.iter().any(|c| items[*c].level != 88) {
        SymbolKind::STRUCT
    } else {
        SymbolKind::FIELD
    };
    CobolDocumentSymbol {
        name: entry.name.clone(),
        detail: Some(entry.display_line.clone()),
        kind,
        range: entry.extent.clone(),
        selection_range: entry.range.clone(),
        children: entry
            .children
            .iter()
            .map(|child| data_symbol(index, *child))
            .collect(),
    }
}

fn label_symbols(index: &SymbolIndex, division: &Range) -> Vec<CobolDocumentSymbol> {
    index
        .labels()
        .iter()
        .filter(|label| within(division, &label.range))
        .map(|label| CobolDocumentSymbol {
            name: label.name.clone(),
            detail: Some(
                match label.kind {
                    LabelKind::Section => "section",
                    LabelKind::Paragraph => "paragraph",
                }
                .to_string(),
            ),
            kind: match label.kind {
                LabelKind::Section => SymbolKind::NAMESPACE,
                LabelKind::Paragraph => SymbolKind::FUNCTION,
            },
            range: label.range.clone(),
            selection_range: label.range.clone(),
            children: Vec::new(),
        })
        .collect()
}
