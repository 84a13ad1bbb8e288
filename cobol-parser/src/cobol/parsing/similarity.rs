//! Fuzzy keyword matching
//!
//!     Every keyword comparison the parser makes goes through [`SimilarityMatcher`]: the
//!     single-keyword test, first-match-of-alternatives, and required consumption alike. Both
//!     sides are upper-cased before comparing.
//!
//!         - equal: matched, no diagnostic
//!         - Jaro-Winkler score above [`SIMILARITY_THRESHOLD`]: matched, with a warning at the
//!           token's range naming the likely misspelling
//!         - otherwise: not matched, no diagnostic
//!
//!     Lookahead probes use [`SimilarityMatcher::probe`], which applies the same decision but
//!     never reports, so a misspelled keyword is reported once, by the comparison that consumes it.

use crate::cobol::ast::Diagnostic;
use crate::cobol::token::Token;

pub const SIMILARITY_THRESHOLD: f64 = 0.85;

/// Outcome of comparing a lexeme with an expected keyword.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeywordMatch {
    Exact,
    Similar { score: f64 },
    Mismatch,
}

impl KeywordMatch {
    pub fn is_accepted(self) -> bool {
        !matches!(self, KeywordMatch::Mismatch)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityMatcher;

impl SimilarityMatcher {
    pub fn new() -> Self {
        Self
    }

    pub fn compare(&self, actual: &str, expected: &str) -> KeywordMatch {
        if actual.is_empty() || expected.is_empty() {
            return KeywordMatch::Mismatch;
        }
        let actual = actual.to_uppercase();
        let expected = expected.to_uppercase();
        if actual == expected {
            return KeywordMatch::Exact;
        }
        let score = strsim::jaro_winkler(&actual, &expected);
        if score > SIMILARITY_THRESHOLD {
            KeywordMatch::Similar { score }
        } else {
            KeywordMatch::Mismatch
        }
    }

    /// Decide without reporting.
    pub fn probe(&self, token: &Token, expected: &str) -> bool {
        self.compare(&token.lexeme, expected).is_accepted()
    }

    /// Decide, pushing a near-miss warning into `diagnostics` when the match is not exact.
    pub fn accept(&self, token: &Token, expected: &str, diagnostics: &mut Vec<Diagnostic>) -> bool {
        match self.compare(&token.lexeme, expected) {
            KeywordMatch::Exact => true,
            KeywordMatch::Similar { .. } => {
                diagnostics.push(near_miss(token, expected));
                true
            }
            KeywordMatch::Mismatch => false,
        }
    }
}

fn near_miss(token: &Token, expected: &str) -> Diagnostic {
    Diagnostic::warning(
        token.range(),
        format!(
            "Possible misspelling: '{}' was accepted as '{}'",
            token.lexeme, expected
        ),
    )
    .with_code("similar-keyword")
}
