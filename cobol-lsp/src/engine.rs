//! Language engine seam
//!
//! The orchestrator hands document text to a [`LanguageEngine`] and stores whatever analysis
//! comes back. The default engine runs the COBOL parser; semantic passes can be layered in by
//! providing another implementation.

use cobol_analysis::DocumentAnalysis;
use cobol_parser::cobol::parsing::parse_source;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("analysis engine failed: {0}")]
    Failed(String),
}

/// Turns document text into an analysis. Runs on a blocking worker thread.
pub trait LanguageEngine: Send + Sync + 'static {
    fn analyze(&self, text: &str) -> Result<DocumentAnalysis, EngineError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultEngine;

impl DefaultEngine {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageEngine for DefaultEngine {
    fn analyze(&self, text: &str) -> Result<DocumentAnalysis, EngineError> {
        let parse = parse_source(text);
        debug!(
            diagnostics = parse.diagnostics().len(),
            programs = parse.programs().len(),
            "parsed document"
        );
        Ok(DocumentAnalysis::new(parse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cobol_parser::cobol::testing::samples;

    #[test]
    fn default_engine_never_fails() {
        let engine = DefaultEngine::new();
        for text in ["", "HELLO.", samples::FULL, samples::MISSPELLED_DIVISION] {
            assert!(engine.analyze(text).is_ok());
        }
    }

    #[test]
    fn default_engine_reports_parser_diagnostics() {
        let analysis = DefaultEngine.analyze(samples::MISSPELLED_DIVISION).unwrap();
        assert!(!analysis.diagnostics().is_empty());
        let clean = DefaultEngine.analyze(samples::FULL).unwrap();
        assert!(clean.diagnostics().is_empty());
    }
}
