//! Recursive-descent parser from tokens to the schema AST
//!
//! ```text
//! schema      := import* declaration*
//! import      := 'import' PATH ('as' IDENT)?
//! declaration := ('struct' | 'choice') IDENT '{' member* '}'
//! member      := 'deleted' INT+ | field
//! field       := rule? IDENT (':' type)? '=' INT ','?
//! rule        := 'asymmetric' | 'optional' | 'required'
//! type        := '[' type ']' | IDENT ('.' IDENT)?
//! ```

use tracing::trace;
use typical_core::{
    Declaration, DeclarationKind, Deleted, Field, FieldRule, Import, Primitive, Range, Schema,
    Spanned, Type,
};

use crate::error::ParserError;
use crate::lexer::Token;

/// Deepest `[...]` nesting a field type may use
pub const MAX_TYPE_DEPTH: usize = 64;

pub struct Parser {
    tokens: Vec<(Token, Range)>,
    pos: usize,
    eof: Range,
}

impl Parser {
    /// `eof` is where errors about missing trailing input point
    pub fn new(tokens: Vec<(Token, Range)>, eof: Range) -> Self {
        Self {
            tokens,
            pos: 0,
            eof,
        }
    }

    pub fn parse_schema(mut self) -> Result<Schema, ParserError> {
        let mut schema = Schema::default();

        while self.check(&Token::Import) {
            schema.imports.push(self.parse_import()?);
        }
        while self.peek().is_some() {
            schema.declarations.push(self.parse_declaration()?);
        }

        trace!(
            imports = schema.imports.len(),
            declarations = schema.declarations.len(),
            "parsed schema"
        );
        Ok(schema)
    }

    fn parse_import(&mut self) -> Result<Import, ParserError> {
        let start = self.expect(Token::Import, "'import'")?;

        let path = match self.advance() {
            Some((Token::Path(path), range)) => Spanned::new(path, range),
            other => return Err(self.unexpected(other, "import path")),
        };

        let alias = if self.eat(&Token::As).is_some() {
            Some(self.expect_identifier("import alias")?)
        } else {
            None
        };

        let end = alias.as_ref().map(|a| a.range).unwrap_or(path.range);
        Ok(Import {
            path,
            alias,
            range: start.to(end),
        })
    }

    fn parse_declaration(&mut self) -> Result<Declaration, ParserError> {
        let (kind, start) = match self.advance() {
            Some((Token::Struct, range)) => (DeclarationKind::Struct, range),
            Some((Token::Choice, range)) => (DeclarationKind::Choice, range),
            other => return Err(self.unexpected(other, "'struct' or 'choice'")),
        };
        let name = self.expect_identifier("declaration name")?;
        self.expect(Token::LBrace, "'{'")?;

        let mut fields = Vec::new();
        let mut deleted = Vec::new();
        let end = loop {
            if let Some(range) = self.eat(&Token::RBrace) {
                break range;
            }
            if self.check(&Token::Deleted) {
                deleted.push(self.parse_deleted()?);
            } else {
                fields.push(self.parse_field()?);
            }
        };

        Ok(Declaration {
            kind,
            name,
            fields,
            deleted,
            range: start.to(end),
        })
    }

    fn parse_deleted(&mut self) -> Result<Deleted, ParserError> {
        let start = self.expect(Token::Deleted, "'deleted'")?;

        let mut indexes = vec![self.parse_index()?];
        while matches!(self.peek(), Some(Token::Integer(_))) {
            indexes.push(self.parse_index()?);
        }

        let end = indexes.last().map(|index| index.range).unwrap_or(start);
        Ok(Deleted {
            indexes,
            range: start.to(end),
        })
    }

    fn parse_field(&mut self) -> Result<Field, ParserError> {
        let rule_token = match self.peek() {
            Some(Token::Asymmetric) => Some(FieldRule::Asymmetric),
            Some(Token::Optional) => Some(FieldRule::Optional),
            Some(Token::Required) => Some(FieldRule::Required),
            _ => None,
        };
        let rule_range = match rule_token {
            Some(_) => self.advance().map(|(_, range)| range),
            None => None,
        };

        let name = self.expect_identifier("field name")?;
        let ty = if self.eat(&Token::Colon).is_some() {
            self.parse_type(0)?
        } else {
            Type::Primitive {
                kind: Primitive::Unit,
                range: name.range,
            }
        };

        self.expect(Token::Equals, "'='")?;
        let index = self.parse_index()?;
        self.eat(&Token::Comma);

        let start = rule_range.unwrap_or(name.range);
        Ok(Field {
            rule: rule_token,
            range: start.to(index.range),
            name,
            ty,
            index,
        })
    }

    fn parse_type(&mut self, depth: usize) -> Result<Type, ParserError> {
        if let Some(open) = self.eat(&Token::LBracket) {
            if depth >= MAX_TYPE_DEPTH {
                return Err(ParserError::NestingTooDeep {
                    limit: MAX_TYPE_DEPTH,
                    range: open,
                });
            }
            let element = self.parse_type(depth + 1)?;
            let close = self.expect(Token::RBracket, "']'")?;
            return Ok(Type::Array {
                element: Box::new(element),
                range: open.to(close),
            });
        }

        let first = self.expect_identifier("type")?;
        if self.eat(&Token::Dot).is_some() {
            let name = self.expect_identifier("type name")?;
            return Ok(Type::Imported {
                module: first,
                name,
            });
        }

        Ok(match Primitive::from_keyword(&first.value) {
            Some(kind) => Type::Primitive {
                kind,
                range: first.range,
            },
            None => Type::Local { name: first },
        })
    }

    fn parse_index(&mut self) -> Result<Spanned<u64>, ParserError> {
        match self.advance() {
            Some((Token::Integer(digits), range)) => match digits.parse::<u64>() {
                Ok(value) => Ok(Spanned::new(value, range)),
                Err(_) => Err(ParserError::IndexOutOfRange {
                    text: digits,
                    range,
                }),
            },
            other => Err(self.unexpected(other, "index")),
        }
    }

    fn expect_identifier(&mut self, what: &str) -> Result<Spanned<String>, ParserError> {
        match self.advance() {
            Some((Token::Identifier(name), range)) => Ok(Spanned::new(name, range)),
            other => Err(self.unexpected(other, what)),
        }
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<Range, ParserError> {
        match self.advance() {
            Some((found, range)) if found == token => Ok(range),
            other => Err(self.unexpected(other, what)),
        }
    }

    fn unexpected(&self, found: Option<(Token, Range)>, expected: &str) -> ParserError {
        match found {
            Some((token, range)) => ParserError::Unexpected {
                expected: expected.to_string(),
                found: token.to_string(),
                range,
            },
            None => ParserError::UnexpectedEof {
                expected: expected.to_string(),
                range: self.eof,
            },
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn check(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    fn advance(&mut self) -> Option<(Token, Range)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    /// Consume `token` if it is next
    fn eat(&mut self, token: &Token) -> Option<Range> {
        if self.check(token) {
            self.advance().map(|(_, range)| range)
        } else {
            None
        }
    }
}
