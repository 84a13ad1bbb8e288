//! Treeviz formatter for parse trees
//!
//! One line per node, nesting drawn with box connectors, two columns per level:
//!
//! <prefix><connector> <icon> <label> (label truncated to 30 characters)
//!
//! Example:
//!
//! ⧉ SourceUnit
//! ├─ ▣ ProgramUnit HELLO
//! │ ├─ Ⓘ IdentificationDivision
//! │ └─ Ⓟ ProcedureDivision
//! └─ ∅ Skipped DTA DIVISION.
//!
//! Icons
//!     SourceUnit: ⧉
//!     ProgramUnit: ▣
//!     IdentificationDivision: Ⓘ
//!     EnvironmentDivision: Ⓔ
//!     DataDivision: Ⓓ
//!     ProcedureDivision: Ⓟ
//!     Skipped: ∅
//!     Custom: ✱
//!
//! Tokens are not drawn. Skipped nodes are labelled with their text so recovery is visible.

use crate::cobol::ast::{Node, NodeKind};
use std::collections::HashMap;

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

fn icon(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::SourceUnit => "⧉",
        NodeKind::ProgramUnit => "▣",
        NodeKind::IdentificationDivision => "Ⓘ",
        NodeKind::EnvironmentDivision => "Ⓔ",
        NodeKind::DataDivision => "Ⓓ",
        NodeKind::ProcedureDivision => "Ⓟ",
        NodeKind::Skipped => "∅",
        NodeKind::Custom => "✱",
    }
}

fn label(node: &Node) -> String {
    let detail = match node.kind {
        NodeKind::ProgramUnit => node.name.clone(),
        NodeKind::Custom => node.dialect.clone(),
        NodeKind::Skipped => {
            let text: String = node
                .tokens()
                .iter()
                .map(|token| token.lexeme.as_str())
                .collect();
            Some(text.split_whitespace().collect::<Vec<_>>().join(" "))
        }
        _ => None,
    };
    let label = match detail {
        Some(detail) if !detail.is_empty() => format!("{} {}", node.kind, detail),
        _ => node.kind.to_string(),
    };
    truncate(&label, 30)
}

fn format_node(
    node: &Node,
    prefix: &str,
    is_last: bool,
    show_linum: bool,
    output: &mut String,
) {
    let connector = if is_last { "└─" } else { "├─" };
    let linum_prefix = match node.range() {
        Some(range) if show_linum => format!("{:02} ", range.start.line + 1),
        _ if show_linum => "   ".to_string(),
        _ => String::new(),
    };

    output.push_str(&format!(
        "{}{}{} {} {}\n",
        linum_prefix,
        prefix,
        connector,
        icon(node.kind),
        label(node)
    ));

    let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    format_children(node, &child_prefix, show_linum, output);
}

fn format_children(node: &Node, prefix: &str, show_linum: bool, output: &mut String) {
    let children: Vec<&Node> = node.child_nodes().collect();
    let count = children.len();
    for (i, child) in children.into_iter().enumerate() {
        format_node(child, prefix, i + 1 == count, show_linum, output);
    }
}

pub fn to_treeviz_str(root: &Node) -> String {
    to_treeviz_str_with_params(root, &HashMap::new())
}

pub fn to_treeviz_str_with_params(root: &Node, params: &HashMap<String, String>) -> String {
    let show_linum = params
        .get("show-linum")
        .map(|v| v != "false")
        .unwrap_or(false);

    let mut output = format!("{} {}\n", icon(root.kind), label(root));
    format_children(root, "", show_linum, &mut output);
    output
}
