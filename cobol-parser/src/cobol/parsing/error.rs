//! Parse failures
//!
//! A [`ParseFailure`] is the signal a production returns when a required keyword or token is
//! absent. It travels up with `?` to the nearest recovery boundary: the program-unit handler,
//! which degrades the partial unit to a Skipped subtree, and the source-unit loop, which
//! synchronizes to the next statement. The matching diagnostic has already been recorded by the
//! time the failure is returned, so boundaries never need to report it again.

use crate::cobol::ast::{Diagnostic, Range};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseFailure {
    #[error("Unexpected token '{found}'. Expect: '{expected}'")]
    UnexpectedToken {
        found: String,
        expected: String,
        range: Range,
    },

    #[error("Unexpected token '{found}'. Expected: {}", quote_all(.expected))]
    NoAlternative {
        found: String,
        expected: Vec<String>,
        range: Range,
    },

    #[error("Unexpected end of input. Expect: {expected}")]
    UnexpectedEndOfInput { expected: String, range: Range },
}

impl ParseFailure {
    pub fn range(&self) -> &Range {
        match self {
            ParseFailure::UnexpectedToken { range, .. }
            | ParseFailure::NoAlternative { range, .. }
            | ParseFailure::UnexpectedEndOfInput { range, .. } => range,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.range().clone(), self.to_string()).with_code("syntax-error")
    }
}

pub(crate) fn quote_all<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| format!("'{}'", item.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}
