//! Diagnostics produced while parsing
//!
//! Diagnostics are collected by the parsing engine as it matches keywords and recovers from
//! errors. They are structured so that the language server can translate them one-to-one into
//! protocol diagnostics; nothing in this crate depends on the protocol itself.

use super::range::Range;
use serde::Serialize;
use std::fmt;

/// Source tag attached to every diagnostic raised by the parser
pub const PARSER_SOURCE: &str = "cobol-parser";

/// Diagnostic severity levels matching LSP protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Information,
    Hint,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Error => write!(f, "error"),
            DiagnosticSeverity::Warning => write!(f, "warning"),
            DiagnosticSeverity::Information => write!(f, "info"),
            DiagnosticSeverity::Hint => write!(f, "hint"),
        }
    }
}

/// Structured diagnostic for LSP consumption
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub range: Range,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub code: Option<String>,
    pub source: String,
}

impl Diagnostic {
    pub fn new(range: Range, severity: DiagnosticSeverity, message: impl Into<String>) -> Self {
        Self {
            range,
            severity,
            message: message.into(),
            code: None,
            source: PARSER_SOURCE.to_string(),
        }
    }

    pub fn error(range: Range, message: impl Into<String>) -> Self {
        Self::new(range, DiagnosticSeverity::Error, message)
    }

    pub fn warning(range: Range, message: impl Into<String>) -> Self {
        Self::new(range, DiagnosticSeverity::Warning, message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]: {} at {}",
            self.severity, self.source, self.message, self.range.start
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cobol::ast::range::Position;

    #[test]
    fn test_diagnostic_creation() {
        let range = Range::new(0..10, Position::new(1, 0), Position::new(1, 10));
        let diag = Diagnostic::error(range, "Test error").with_code("test-001");

        assert_eq!(diag.severity, DiagnosticSeverity::Error);
        assert_eq!(diag.message, "Test error");
        assert_eq!(diag.code, Some("test-001".to_string()));
        assert_eq!(diag.source, PARSER_SOURCE);
    }

    #[test]
    fn test_diagnostic_display() {
        let range = Range::new(0..4, Position::new(2, 7), Position::new(2, 11));
        let diag = Diagnostic::warning(range, "close enough");
        assert_eq!(diag.to_string(), "warning [cobol-parser]: close enough at 2:7");
    }
}
