//! Statement parsing

use super::ast::{Stmt, TypeName};
use super::{ParseError, Parser};
use crate::frontend::lexer::{Keyword, TokenKind};

impl<'a> Parser<'a> {
    pub(super) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.current_kind() {
            Some(TokenKind::Keyword(Keyword::String | Keyword::Int | Keyword::Array)) => {
                self.parse_declaration()
            }
            Some(TokenKind::Keyword(Keyword::For)) => self.parse_for_each(),
            Some(TokenKind::Keyword(Keyword::While)) => self.parse_while(),
            Some(TokenKind::Keyword(kw @ (Keyword::If | Keyword::Else | Keyword::Return | Keyword::In))) => {
                Err(ParseError::Unsupported {
                    keyword: kw.as_str().to_string(),
                    span: self.current_span(),
                })
            }
            Some(TokenKind::Cout) => self.parse_print(),
            Some(TokenKind::Identifier(_)) => self.parse_assignment(),
            _ => Err(self.error("statement")),
        }
    }

    /// `TYPE IDENT = expr ;`
    fn parse_declaration(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current_span();
        let ty = match self.advance().map(|t| &t.kind) {
            Some(TokenKind::Keyword(kw)) => TypeName::from_keyword(kw.as_str()),
            _ => None,
        }
        .ok_or_else(|| self.error("type name"))?;
        let (name, _) = self.expect_identifier()?;
        self.expect(&TokenKind::Assign)?;
        let expr = self.parse_expression()?;
        self.expect(&TokenKind::Semicolon)?;
        Ok(Stmt::Declaration {
            ty,
            name,
            expr,
            span: start.merge(self.previous_span()),
        })
    }

    /// `IDENT = expr ;`
    fn parse_assignment(&mut self) -> Result<Stmt, ParseError> {
        let (name, start) = self.expect_identifier()?;
        self.expect(&TokenKind::Assign)?;
        let expr = self.parse_expression()?;
        self.expect(&TokenKind::Semicolon)?;
        Ok(Stmt::Assignment {
            name,
            expr,
            span: start.merge(self.previous_span()),
        })
    }

    /// `cout << expr ;`
    fn parse_print(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect(&TokenKind::Cout)?.span;
        self.expect(&TokenKind::Shl)?;
        let expr = self.parse_expression()?;
        self.expect(&TokenKind::Semicolon)?;
        Ok(Stmt::Print {
            expr,
            span: start.merge(self.previous_span()),
        })
    }

    /// `for ( IDENT in IDENT ) block`
    fn parse_for_each(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect_keyword(Keyword::For)?.span;
        self.expect(&TokenKind::LParen)?;
        let (var, _) = self.expect_identifier()?;
        self.expect_keyword(Keyword::In)?;
        let (iterable, _) = self.expect_identifier()?;
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(Stmt::ForEach {
            var,
            iterable,
            body,
            span: start.merge(self.previous_span()),
        })
    }

    /// `while ( expr ) block`
    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect_keyword(Keyword::While)?.span;
        self.expect(&TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(Stmt::While {
            condition,
            body,
            span: start.merge(self.previous_span()),
        })
    }

    /// `{ stmt* }`
    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut body = Vec::new();
        loop {
            match self.current_kind() {
                Some(TokenKind::RBrace) => break,
                None => return Err(self.error("'}'")),
                Some(_) => body.push(self.parse_statement()?),
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(body)
    }
}
