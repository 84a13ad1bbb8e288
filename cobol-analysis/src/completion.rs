use crate::document::DocumentAnalysis;
use crate::symbols::LabelKind;
use cobol_parser::cobol::ast::Position;
use lsp_types::CompletionItemKind;
use std::collections::BTreeSet;

/// Describes a semantic completion candidate that can be translated into protocol specific items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCandidate {
    pub label: String,
    pub detail: Option<String>,
    pub kind: CompletionItemKind,
    pub insert_text: Option<String>,
}

impl CompletionCandidate {
    pub fn new(label: impl Into<String>, kind: CompletionItemKind) -> Self {
        Self {
            label: label.into(),
            detail: None,
            kind,
            insert_text: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Produce completion candidates for the word being typed at `position`.
///
/// Document symbols come first (data items, labels, programs), then the reserved words from
/// `keywords`. Matching is a case-insensitive prefix test; an empty prefix offers everything.
/// Each label appears once.
pub fn completion_items(
    analysis: &DocumentAnalysis,
    text: &str,
    position: Position,
    keywords: &[String],
) -> Vec<CompletionCandidate> {
    let prefix = typed_prefix(text, position).to_uppercase();
    let mut seen = BTreeSet::new();
    let mut items = Vec::new();

    for candidate in symbol_candidates(analysis).chain(keyword_candidates(keywords)) {
        if !candidate.label.to_uppercase().starts_with(&prefix) {
            continue;
        }
        if seen.insert(candidate.label.to_uppercase()) {
            items.push(candidate);
        }
    }
    items
}

fn symbol_candidates(analysis: &DocumentAnalysis) -> impl Iterator<Item = CompletionCandidate> + '_ {
    let index = analysis.index();

    let data_items = index
        .data_items()
        .iter()
        .filter(|item| !item.is_filler())
        .map(|item| {
            let kind = if item.is_condition() {
                CompletionItemKind::ENUM_MEMBER
            } else {
                CompletionItemKind::VARIABLE
            };
            CompletionCandidate::new(&item.name, kind).with_detail(&item.display_line)
        });

    let labels = index.labels().iter().map(|label| {
        let detail = match label.kind {
            LabelKind::Section => "section",
            LabelKind::Paragraph => "paragraph",
        };
        CompletionCandidate::new(&label.name, CompletionItemKind::FUNCTION).with_detail(detail)
    });

    let programs = index.programs().iter().map(|program| {
        CompletionCandidate::new(&program.name, CompletionItemKind::MODULE).with_detail("program")
    });

    data_items.chain(labels).chain(programs)
}

fn keyword_candidates(keywords: &[String]) -> impl Iterator<Item = CompletionCandidate> + '_ {
    keywords.iter().map(|keyword| {
        CompletionCandidate::new(keyword, CompletionItemKind::KEYWORD).with_detail("keyword")
    })
}

/// Word characters immediately left of the cursor on its line.
fn typed_prefix(text: &str, position: Position) -> String {
    let Some(line) = text.split('\n').nth(position.line) else {
        return String::new();
    };
    let before: Vec<char> = line
        .trim_end_matches('\r')
        .chars()
        .take(position.column)
        .collect();
    let start = before
        .iter()
        .rposition(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        .map_or(0, |i| i + 1);
    before[start..].iter().collect()
}
