//! Recursive-descent parser
//!
//! Turns the token stream into a [`Program`]. Statement rules live in
//! [`stmt`], expression rules in [`expr`].

pub mod ast;
mod expr;
mod stmt;

pub use ast::{BinOp, Builtin, Expr, Program, Stmt, TypeName};

use crate::frontend::lexer::{Keyword, Token, TokenKind};
use crate::util::span::Span;
use tracing::debug;

/// Parse errors
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("Expected {expected} but found {found} at {span}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },
    #[error("'{keyword}' statements are not supported at {span}")]
    Unsupported { keyword: String, span: Span },
    #[error("Unknown function '{name}' at {span} (expected length or size)")]
    UnknownFunction { name: String, span: Span },
}

/// Parse a token stream into a program
pub fn parse(tokens: &[Token]) -> Result<Program, ParseError> {
    debug!("Parsing {} tokens", tokens.len());
    let mut parser = Parser::new(tokens);
    let program = parser.parse_program()?;
    debug!("Parsed {} top-level statements", program.statements.len());
    Ok(program)
}

/// Parser state: a cursor over the token slice
pub(crate) struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();
        while !self.at_end() {
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    /// Current token, `None` at end of input
    fn current(&self) -> Option<&'a Token> {
        self.tokens
            .get(self.pos)
            .filter(|t| !matches!(t.kind, TokenKind::Eof))
    }

    fn current_kind(&self) -> Option<&'a TokenKind> {
        self.current().map(|t| &t.kind)
    }

    fn at_end(&self) -> bool {
        self.current().is_none()
    }

    /// Span of the current token (or the end of input)
    fn current_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.span)
            .unwrap_or_default()
    }

    /// Span of the most recently consumed token
    fn previous_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span)
            .unwrap_or_default()
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.current()?;
        self.pos += 1;
        Some(token)
    }

    /// Consume the current token if it equals `kind`
    fn eat(
        &mut self,
        kind: &TokenKind,
    ) -> bool {
        if self.current_kind() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(
        &mut self,
        kind: &TokenKind,
    ) -> Result<&'a Token, ParseError> {
        match self.current() {
            Some(token) if &token.kind == kind => {
                self.pos += 1;
                Ok(token)
            }
            _ => Err(self.error(kind.to_string())),
        }
    }

    fn expect_keyword(
        &mut self,
        keyword: Keyword,
    ) -> Result<&'a Token, ParseError> {
        self.expect(&TokenKind::Keyword(keyword))
    }

    fn expect_identifier(&mut self) -> Result<(String, Span), ParseError> {
        match self.current() {
            Some(Token {
                kind: TokenKind::Identifier(name),
                span,
                ..
            }) => {
                self.pos += 1;
                Ok((name.clone(), *span))
            }
            _ => Err(self.error("identifier")),
        }
    }

    fn error(
        &self,
        expected: impl Into<String>,
    ) -> ParseError {
        let expected = expected.into();
        match self.current() {
            Some(token) => ParseError::UnexpectedToken {
                expected,
                found: token.kind.to_string(),
                span: token.span,
            },
            None => ParseError::UnexpectedEof { expected },
        }
    }
}
