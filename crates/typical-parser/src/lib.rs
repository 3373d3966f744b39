//! Reference parser for Typical schema source text
//!
//! Produces the [`typical_core::Schema`] AST the analysis crate consumes.
//! Parsing stops at the first error.

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::ParserError;

use typical_core::{Schema, SyntaxError};

use crate::lexer::LineIndex;
use crate::parser::Parser;

pub fn parse_schema(source: &str) -> Result<Schema, ParserError> {
    let tokens = lexer::tokenize(source)?;
    let eof = LineIndex::new(source).end();
    Parser::new(tokens, eof).parse_schema()
}

/// Parse into the result shape the workspace notifications accept
pub fn parse_document(source: &str) -> Result<Schema, SyntaxError> {
    parse_schema(source).map_err(SyntaxError::from)
}
