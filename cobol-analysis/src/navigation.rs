//! Definition, references and document highlights
//!
//! All three start from the word under the cursor and compare names case-insensitively.
//! References and highlights cover every occurrence of the word, declared or not; definitions
//! only resolve names the symbol index knows.

use crate::document::DocumentAnalysis;
use cobol_parser::cobol::ast::{Position, Range};
use lsp_types::DocumentHighlightKind;

#[derive(Debug, Clone, PartialEq)]
pub struct CobolHighlight {
    pub range: Range,
    pub kind: DocumentHighlightKind,
}

pub fn goto_definition(analysis: &DocumentAnalysis, position: Position) -> Vec<Range> {
    analysis
        .word_at(position)
        .map(|word| analysis.index().definitions(&word.lexeme))
        .unwrap_or_default()
}

pub fn find_references(
    analysis: &DocumentAnalysis,
    position: Position,
    include_declaration: bool,
) -> Vec<Range> {
    let Some(word) = analysis.word_at(position) else {
        return Vec::new();
    };
    let index = analysis.index();
    let occurrences = index.occurrences(&word.lexeme);
    if include_declaration {
        return occurrences.to_vec();
    }
    let declarations = index.definitions(&word.lexeme);
    occurrences
        .iter()
        .filter(|range| !declarations.contains(range))
        .cloned()
        .collect()
}

/// Declarations are marked as writes, every other occurrence as a read.
pub fn document_highlights(analysis: &DocumentAnalysis, position: Position) -> Vec<CobolHighlight> {
    let Some(word) = analysis.word_at(position) else {
        return Vec::new();
    };
    let index = analysis.index();
    let declarations = index.definitions(&word.lexeme);
    index
        .occurrences(&word.lexeme)
        .iter()
        .map(|range| CobolHighlight {
            range: range.clone(),
            kind: if declarations.contains(range) {
                DocumentHighlightKind::WRITE
            } else {
                DocumentHighlightKind::READ
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cobol_parser::cobol::testing::samples;

    fn analysis() -> DocumentAnalysis {
        DocumentAnalysis::from_source(samples::FULL)
    }

    #[test]
    fn test_definition_from_usage() {
        // "    MOVE 0 TO TOTAL." on line 12
        let targets = goto_definition(&analysis(), Position::new(12, 16));
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].start, Position::new(9, 3));
    }

    #[test]
    fn test_definition_of_program_from_end_program() {
        let targets = goto_definition(&analysis(), Position::new(16, 13));
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].start, Position::new(1, 12));
    }

    #[test]
    fn test_definition_of_unknown_word_is_empty() {
        assert!(goto_definition(&analysis(), Position::new(14, 5)).is_empty());
        assert!(goto_definition(&analysis(), Position::new(99, 0)).is_empty());
    }

    #[test]
    fn test_references_with_and_without_declaration() {
        let analysis = analysis();
        let all = find_references(&analysis, Position::new(12, 16), true);
        assert_eq!(all.len(), 3);
        let usages = find_references(&analysis, Position::new(12, 16), false);
        assert_eq!(usages.len(), 2);
        assert!(usages.iter().all(|r| r.start.line > 9));
    }

    #[test]
    fn test_highlights_mark_declaration_as_write() {
        let highlights = document_highlights(&analysis(), Position::new(7, 6));
        let kinds: Vec<_> = highlights.iter().map(|h| h.kind).collect();
        assert_eq!(
            kinds,
            vec![DocumentHighlightKind::WRITE, DocumentHighlightKind::READ]
        );
    }
}
