//! Editor features over parsed COBOL documents
//!
//!     This crate turns a parse result into the answers an editor asks for. It knows nothing
//!     about the protocol transport: results use the parser's own ranges and positions, with
//!     `lsp-types` only for the kind enums, and the language server converts them at the edge.
//!
//!     - [document]: one parse plus its symbol index
//!     - [symbols]: programs, labels, data items and word occurrences
//!     - [outline]: document symbols
//!     - [hover]: hierarchical descriptions
//!     - [completion]: prefix-filtered candidates
//!     - [navigation]: definition, references, highlights

pub mod completion;
pub mod document;
pub mod hover;
pub mod navigation;
pub mod outline;
pub mod symbols;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use document::DocumentAnalysis;
