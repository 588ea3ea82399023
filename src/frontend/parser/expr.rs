//! Expression parsing
//!
//! Precedence, loosest first: comparison (non-associative), `+ -`, `* /`.

use super::ast::{BinOp, Builtin, Expr};
use super::{ParseError, Parser};
use crate::frontend::lexer::{Token, TokenKind};

impl<'a> Parser<'a> {
    pub(super) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_additive()?;
        let op = match self.current_kind() {
            Some(TokenKind::EqEq) => BinOp::Eq,
            Some(TokenKind::Neq) => BinOp::Neq,
            Some(TokenKind::Lt) => BinOp::Lt,
            Some(TokenKind::Le) => BinOp::Le,
            Some(TokenKind::Gt) => BinOp::Gt,
            Some(TokenKind::Ge) => BinOp::Ge,
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.parse_additive()?;
        Ok(binary(op, left, right))
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.current_kind() {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Sub,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_term()?;
            left = binary(op, left, right);
        }
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_primary()?;
        loop {
            let op = match self.current_kind() {
                Some(TokenKind::Star) => BinOp::Mul,
                Some(TokenKind::Slash) => BinOp::Div,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_primary()?;
            left = binary(op, left, right);
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let Some(token) = self.current() else {
            return Err(self.error("expression"));
        };
        match &token.kind {
            TokenKind::StringLiteral(value) => {
                self.pos += 1;
                Ok(Expr::Str(value.clone(), token.span))
            }
            TokenKind::Number(value) => {
                self.pos += 1;
                Ok(Expr::Int(*value, token.span))
            }
            TokenKind::LParen => {
                self.pos += 1;
                let inner = self.parse_expression()?;
                self.expect(&TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::LBrace => self.parse_array_literal(),
            TokenKind::Identifier(name) => {
                self.pos += 1;
                match self.current_kind() {
                    Some(TokenKind::LParen) => self.parse_call(name, token),
                    Some(TokenKind::LBracket) => self.parse_index_or_slice(name, token),
                    _ => Ok(Expr::Ident(name.clone(), token.span)),
                }
            }
            _ => Err(self.error("expression")),
        }
    }

    /// `{ expr (, expr)* }`
    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect(&TokenKind::LBrace)?.span;
        let mut elements = vec![self.parse_expression()?];
        while self.eat(&TokenKind::Comma) {
            elements.push(self.parse_expression()?);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Expr::Array(elements, start.merge(self.previous_span())))
    }

    /// `length(expr)` / `size(expr)`
    fn parse_call(
        &mut self,
        name: &str,
        token: &Token,
    ) -> Result<Expr, ParseError> {
        let func = Builtin::from_name(name).ok_or_else(|| ParseError::UnknownFunction {
            name: name.to_string(),
            span: token.span,
        })?;
        self.expect(&TokenKind::LParen)?;
        let arg = self.parse_expression()?;
        self.expect(&TokenKind::RParen)?;
        Ok(Expr::Call {
            func,
            arg: Box::new(arg),
            span: token.span.merge(self.previous_span()),
        })
    }

    /// `name[expr]` or `name[expr:expr]`
    fn parse_index_or_slice(
        &mut self,
        name: &str,
        token: &Token,
    ) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LBracket)?;
        let first = self.parse_expression()?;
        if self.eat(&TokenKind::Colon) {
            let end = self.parse_expression()?;
            self.expect(&TokenKind::RBracket)?;
            return Ok(Expr::Slice {
                name: name.to_string(),
                start: Box::new(first),
                end: Box::new(end),
                span: token.span.merge(self.previous_span()),
            });
        }
        self.expect(&TokenKind::RBracket)?;
        Ok(Expr::Index {
            name: name.to_string(),
            index: Box::new(first),
            span: token.span.merge(self.previous_span()),
        })
    }
}

fn binary(
    op: BinOp,
    left: Expr,
    right: Expr,
) -> Expr {
    let span = left.span().merge(right.span());
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
        span,
    }
}
