//! # cobol-parser
//!
//! An error-tolerant parser for the outline of COBOL sources: program units, their divisions,
//! nested programs and `END PROGRAM` trailers.
//!
//! File Layout
//!
//! src/cobol
//!   ├── lexing      Token stream contract and the stock logos lexer
//!   ├── token       Token type shared by lexer and parser
//!   ├── parsing     Recursive-descent engine, parse context, keyword similarity
//!   ├── ast         Node tree, ranges and diagnostics
//!   ├── formats     Tree renderings (treeviz)
//!   └── testing     Verified fixtures and tree assertions
//!
//! The engine never rejects input. Malformed regions are kept in Skipped nodes, near-miss
//! keywords are accepted with a warning, and every token of the source stays in the tree.
//!
//! ```rust,ignore
//! use cobol_parser::cobol::parsing::parse_source;
//!
//! let result = parse_source("IDENTIFICATION DIVISION. PROGRAM-ID. HELLO.");
//! assert!(result.diagnostics().is_empty());
//! ```

pub mod cobol;
