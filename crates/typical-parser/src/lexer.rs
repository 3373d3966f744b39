//! Tokenizer for schema source text

use std::fmt;

use logos::Logos;
use typical_core::{Position, Range};

use crate::error::ParserError;

#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    // === Keywords ===
    #[token("import")]
    Import,
    #[token("as")]
    As,
    #[token("struct")]
    Struct,
    #[token("choice")]
    Choice,
    #[token("deleted")]
    Deleted,
    #[token("asymmetric")]
    Asymmetric,
    #[token("optional")]
    Optional,
    #[token("required")]
    Required,

    // === Punctuation ===
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(":")]
    Colon,
    #[token("=")]
    Equals,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,

    // === Literals ===
    /// Quoted import path, quotes stripped
    #[regex(r"'[^'\n]*'", |lex| {
        let slice = lex.slice();
        slice[1..slice.len() - 1].to_string()
    })]
    Path(String),

    /// Digits as written; range checking happens in the parser
    #[regex(r"[0-9]+", |lex| lex.slice().to_string())]
    Integer(String),

    #[regex(r"[_a-zA-Z][_a-zA-Z0-9]*", |lex| lex.slice().to_string())]
    Identifier(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Import => write!(f, "'import'"),
            Token::As => write!(f, "'as'"),
            Token::Struct => write!(f, "'struct'"),
            Token::Choice => write!(f, "'choice'"),
            Token::Deleted => write!(f, "'deleted'"),
            Token::Asymmetric => write!(f, "'asymmetric'"),
            Token::Optional => write!(f, "'optional'"),
            Token::Required => write!(f, "'required'"),
            Token::LBrace => write!(f, "'{{'"),
            Token::RBrace => write!(f, "'}}'"),
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
            Token::Colon => write!(f, "':'"),
            Token::Equals => write!(f, "'='"),
            Token::Comma => write!(f, "','"),
            Token::Dot => write!(f, "'.'"),
            Token::Path(path) => write!(f, "path '{}'", path),
            Token::Integer(digits) => write!(f, "integer {}", digits),
            Token::Identifier(name) => write!(f, "identifier '{}'", name),
        }
    }
}

/// Maps byte offsets to line and character positions
pub struct LineIndex<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(source: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(offset, _)| offset + 1))
            .collect();
        Self {
            source,
            line_starts,
        }
    }

    /// Characters are counted as Unicode scalar values
    pub fn position(&self, offset: usize) -> Position {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let start = self.line_starts[line];
        let character = self
            .source
            .get(start..offset)
            .map(|text| text.chars().count())
            .unwrap_or(offset - start);
        Position::new(line as u32, character as u32)
    }

    pub fn range(&self, span: std::ops::Range<usize>) -> Range {
        Range::new(self.position(span.start), self.position(span.end))
    }

    /// Zero-width range at the end of the source
    pub fn end(&self) -> Range {
        let end = self.position(self.source.len());
        Range::new(end, end)
    }
}

/// Tokenize `source`, stopping at the first character no token accepts
pub fn tokenize(source: &str) -> Result<Vec<(Token, Range)>, ParserError> {
    let index = LineIndex::new(source);
    let mut tokens = Vec::new();

    let mut lexer = Token::lexer(source);
    while let Some(token) = lexer.next() {
        let range = index.range(lexer.span());
        match token {
            Ok(token) => tokens.push((token, range)),
            Err(()) => {
                return Err(ParserError::InvalidToken {
                    text: lexer.slice().to_string(),
                    range,
                })
            }
        }
    }

    Ok(tokens)
}
