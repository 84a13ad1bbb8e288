//! Syntax tree model: ranges, tagged nodes, and diagnostics.

pub mod diagnostics;
pub mod node;
pub mod range;

pub use diagnostics::{Diagnostic, DiagnosticSeverity};
pub use node::{Element, Node, NodeKind};
pub use range::{Position, Range, SourceLocation};
