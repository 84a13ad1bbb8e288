//! Language Server Protocol (LSP) implementation for COBOL
//!
//!     This crate wires the COBOL parser and the analysis layer into a tower-lsp server. The
//!     protocol handlers are thin: they translate requests into calls on the feature layer
//!     (cobol-analysis) and translate the results back.
//!
//! Architecture
//!
//!     LSP Layer (tower-lsp):
//!         - JSON-RPC transport, capability negotiation, request routing
//!
//!     Server Layer (this crate):
//!         - [`server::CobolLanguageServer`] implements the LanguageServer trait
//!         - [`analysis::AnalysisOrchestrator`] classifies opened documents, dispatches
//!           analyses as background tasks, and commits results to the [`documents::DocumentStore`]
//!         - [`communications::Communications`] is the seam for everything pushed to the client
//!           (diagnostics, progress, notices); [`engine::LanguageEngine`] is the seam to the parser
//!
//!     Feature Layer (cobol-analysis):
//!         - Hover, completion, definition, references, highlights and outline over a parsed
//!           document. Pure functions with dense unit tests.
//!
//! Document lifecycle
//!
//!     didOpen classifies the document by uri extension and language identifier. Supported
//!     documents get a pending model and an analysis task; the rest produce a single notice.
//!     didChange always re-analyses and publishes the resulting diagnostics. didClose drops the
//!     model. Analyses are version-stamped, so a slow analysis of an older text can never replace
//!     the result for a newer one.
//!
//!     Feature requests never wait for an analysis in flight. They answer from whatever model is
//!     committed at the time, and answer `None` for unknown or still-pending documents.
//!
//! Usage
//!
//!     $ cobol-lsp [--config PATH] [--log-filter FILTER]
//!     Starts the language server on stdin/stdout. Logs go to stderr.

pub mod analysis;
pub mod communications;
pub mod convert;
pub mod documents;
pub mod engine;
pub mod features;
pub mod server;

#[cfg(test)]
pub(crate) mod test_support;

pub use server::CobolLanguageServer;
