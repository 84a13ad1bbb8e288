//! Conversions between parser/analysis types and protocol types
//!
//! Positions are passed through unchanged: lines are zero-based and columns count characters.

use cobol_analysis::outline::CobolDocumentSymbol;
use cobol_parser::cobol::ast::{
    Diagnostic as AstDiagnostic, DiagnosticSeverity as AstSeverity, Position as AstPosition,
    Range as AstRange,
};
use lsp_types::{Diagnostic, DiagnosticSeverity, DocumentSymbol, NumberOrString, Position, Range};

pub fn to_lsp_position(position: &AstPosition) -> Position {
    Position::new(position.line as u32, position.column as u32)
}

pub fn to_lsp_range(range: &AstRange) -> Range {
    Range {
        start: to_lsp_position(&range.start),
        end: to_lsp_position(&range.end),
    }
}

pub fn from_lsp_position(position: Position) -> AstPosition {
    AstPosition::new(position.line as usize, position.character as usize)
}

fn to_lsp_severity(severity: AstSeverity) -> DiagnosticSeverity {
    match severity {
        AstSeverity::Error => DiagnosticSeverity::ERROR,
        AstSeverity::Warning => DiagnosticSeverity::WARNING,
        AstSeverity::Information => DiagnosticSeverity::INFORMATION,
        AstSeverity::Hint => DiagnosticSeverity::HINT,
    }
}

pub fn to_lsp_diagnostic(diagnostic: &AstDiagnostic) -> Diagnostic {
    Diagnostic {
        range: to_lsp_range(&diagnostic.range),
        severity: Some(to_lsp_severity(diagnostic.severity)),
        code: diagnostic.code.clone().map(NumberOrString::String),
        source: Some(diagnostic.source.clone()),
        message: diagnostic.message.clone(),
        ..Default::default()
    }
}

pub fn to_lsp_diagnostics(diagnostics: &[AstDiagnostic]) -> Vec<Diagnostic> {
    diagnostics.iter().map(to_lsp_diagnostic).collect()
}

#[allow(deprecated)]
pub fn to_document_symbol(symbol: &CobolDocumentSymbol) -> DocumentSymbol {
    DocumentSymbol {
        name: symbol.name.clone(),
        detail: symbol.detail.clone(),
        kind: symbol.kind,
        deprecated: None,
        range: to_lsp_range(&symbol.range),
        selection_range: to_lsp_range(&symbol.selection_range),
        children: if symbol.children.is_empty() {
            None
        } else {
            Some(symbol.children.iter().map(to_document_symbol).collect())
        },
        tags: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cobol_parser::cobol::parsing::parse_source;
    use cobol_parser::cobol::testing::samples;

    #[test]
    fn diagnostics_keep_code_source_and_severity() {
        let parse = parse_source(samples::MISSPELLED_DIVISION);
        let converted = to_lsp_diagnostics(parse.diagnostics());
        assert_eq!(converted.len(), parse.diagnostics().len());

        let first = &converted[0];
        assert_eq!(first.severity, Some(DiagnosticSeverity::ERROR));
        assert_eq!(first.source.as_deref(), Some("cobol-parser"));
        assert!(matches!(first.code, Some(NumberOrString::String(_))));
        assert!(first.message.contains("DTA"));
    }

    #[test]
    fn positions_round_trip() {
        let lsp = Position::new(3, 11);
        let ast = from_lsp_position(lsp);
        assert_eq!(ast, AstPosition::new(3, 11));
        assert_eq!(to_lsp_position(&ast), lsp);
    }
}
