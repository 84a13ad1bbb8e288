//! Main module for the COBOL parsing library

pub mod ast;
pub mod formats;
pub mod lexing;
pub mod parsing;
pub mod testing;
pub mod token;
