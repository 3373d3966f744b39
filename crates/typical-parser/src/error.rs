use thiserror::Error;
use typical_core::{Range, SyntaxError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("Invalid token '{text}'")]
    InvalidToken { text: String, range: Range },

    #[error("Expected {expected}, found {found}")]
    Unexpected {
        expected: String,
        found: String,
        range: Range,
    },

    #[error("Expected {expected}, found end of input")]
    UnexpectedEof { expected: String, range: Range },

    #[error("Index {text} is out of range")]
    IndexOutOfRange { text: String, range: Range },

    #[error("Type nesting exceeds {limit} levels")]
    NestingTooDeep { limit: usize, range: Range },
}

impl ParserError {
    pub fn range(&self) -> Range {
        match self {
            ParserError::InvalidToken { range, .. }
            | ParserError::Unexpected { range, .. }
            | ParserError::UnexpectedEof { range, .. }
            | ParserError::IndexOutOfRange { range, .. }
            | ParserError::NestingTooDeep { range, .. } => *range,
        }
    }
}

impl From<ParserError> for SyntaxError {
    fn from(err: ParserError) -> Self {
        SyntaxError::new(err.to_string(), err.range())
    }
}
