//! IR text format reader
//!
//! One instruction per line, blank lines ignored:
//!
//! ```text
//! string name = expr      declaration
//! name = expr             assignment
//! print expr
//! L0:
//! goto L0
//! if cond goto L0
//! ```
//!
//! A `tN = expr` line reads back as a temp assignment unless `tN` is also
//! declared as a source variable or assigned more than once, in which case
//! it is an ordinary assignment.
//!
//! Lines are tokenized with the source lexer, so literals and operators
//! follow the same lexical rules as source programs.

use super::{is_temp_name, Expr, Instruction, IrError};
use crate::frontend::lexer::{tokenize, Keyword, Token, TokenKind};
use crate::frontend::parser::ast::{BinOp, Builtin, TypeName};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Parse a whole IR listing
pub fn parse_program(text: &str) -> Result<Vec<Instruction>, IrError> {
    let mut instructions = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if let Some(instruction) = parse_line(line, index + 1)? {
            instructions.push(instruction);
        }
    }
    demote_source_temps(&mut instructions);
    debug!("Read {} IR instructions", instructions.len());
    Ok(instructions)
}

/// Turn `tN` assignments that belong to a source variable back into `Assign`
fn demote_source_temps(instructions: &mut [Instruction]) {
    let mut declared: HashSet<String> = HashSet::new();
    let mut definitions: HashMap<String, usize> = HashMap::new();
    for instruction in instructions.iter() {
        match instruction {
            Instruction::Declare { name, .. } => {
                declared.insert(name.clone());
            }
            Instruction::TempAssign { temp, .. } => {
                *definitions.entry(temp.clone()).or_default() += 1;
            }
            _ => {}
        }
    }

    for instruction in instructions.iter_mut() {
        let Instruction::TempAssign { temp, value } = instruction else {
            continue;
        };
        let reused = definitions.get(temp.as_str()).is_some_and(|&n| n > 1);
        if declared.contains(temp.as_str()) || reused {
            debug!("'{}' is a source variable, reading as an assignment", temp);
            let name = std::mem::take(temp);
            let value = value.clone();
            *instruction = Instruction::Assign { name, value };
        }
    }
}

/// Parse one line; `Ok(None)` for blank lines
pub fn parse_line(
    line: &str,
    line_no: usize,
) -> Result<Option<Instruction>, IrError> {
    let malformed = |reason: &str| IrError::Malformed {
        line: line_no,
        text: line.trim().to_string(),
        reason: reason.to_string(),
    };

    let mut tokens = tokenize(line).map_err(|e| malformed(&e.to_string()))?;
    tokens.retain(|t| !matches!(t.kind, TokenKind::Eof));
    if tokens.is_empty() {
        return Ok(None);
    }

    let kinds: Vec<&TokenKind> = tokens.iter().map(|t| &t.kind).collect();
    let instruction = match kinds.as_slice() {
        [TokenKind::Identifier(name), TokenKind::Colon] => Instruction::Label(name.clone()),
        [TokenKind::Keyword(kw), TokenKind::Identifier(name), TokenKind::Assign, ..] => {
            let ty = TypeName::from_keyword(kw.as_str())
                .ok_or_else(|| malformed("expected a type keyword"))?;
            Instruction::Declare {
                ty,
                name: name.clone(),
                value: parse_expr(&tokens[3..]).map_err(|r| malformed(&r))?,
            }
        }
        [TokenKind::Identifier(name), TokenKind::Assign, ..] => {
            let value = parse_expr(&tokens[2..]).map_err(|r| malformed(&r))?;
            if is_temp_name(name) {
                Instruction::TempAssign {
                    temp: name.clone(),
                    value,
                }
            } else {
                Instruction::Assign {
                    name: name.clone(),
                    value,
                }
            }
        }
        [TokenKind::Identifier(word), TokenKind::Identifier(label)] if word == "goto" => {
            Instruction::Goto(label.clone())
        }
        [TokenKind::Keyword(Keyword::If), .., TokenKind::Identifier(word), TokenKind::Identifier(label)]
            if word == "goto" =>
        {
            let cond = parse_expr(&tokens[1..tokens.len() - 2]).map_err(|r| malformed(&r))?;
            Instruction::IfGoto {
                cond,
                target: label.clone(),
            }
        }
        [TokenKind::Identifier(word), ..] if word == "print" => {
            Instruction::Print(parse_expr(&tokens[1..]).map_err(|r| malformed(&r))?)
        }
        _ => return Err(malformed("unrecognised instruction")),
    };
    Ok(Some(instruction))
}

fn parse_expr(tokens: &[Token]) -> Result<Expr, String> {
    if tokens.is_empty() {
        return Err("missing expression".to_string());
    }
    let mut parser = ExprReader { tokens, pos: 0 };
    let expr = parser.comparison()?;
    match parser.peek() {
        None => Ok(expr),
        Some(kind) => Err(format!("unexpected {}", kind)),
    }
}

struct ExprReader<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> ExprReader<'a> {
    fn peek(&self) -> Option<&'a TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn bump(&mut self) -> Option<&'a TokenKind> {
        let kind = self.peek()?;
        self.pos += 1;
        Some(kind)
    }

    fn expect(
        &mut self,
        kind: &TokenKind,
    ) -> Result<(), String> {
        match self.bump() {
            Some(found) if found == kind => Ok(()),
            Some(found) => Err(format!("expected {} but found {}", kind, found)),
            None => Err(format!("expected {}", kind)),
        }
    }

    fn comparison(&mut self) -> Result<Expr, String> {
        let lhs = self.additive()?;
        let op = match self.peek() {
            Some(TokenKind::EqEq) => BinOp::Eq,
            Some(TokenKind::Neq) => BinOp::Neq,
            Some(TokenKind::Lt) => BinOp::Lt,
            Some(TokenKind::Le) => BinOp::Le,
            Some(TokenKind::Gt) => BinOp::Gt,
            Some(TokenKind::Ge) => BinOp::Ge,
            _ => return Ok(lhs),
        };
        self.pos += 1;
        let rhs = self.additive()?;
        Ok(Expr::binary(op, lhs, rhs))
    }

    fn additive(&mut self) -> Result<Expr, String> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            lhs = Expr::binary(op, lhs, self.term()?);
        }
    }

    fn term(&mut self) -> Result<Expr, String> {
        let mut lhs = self.primary()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Star) => BinOp::Mul,
                Some(TokenKind::Slash) => BinOp::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            lhs = Expr::binary(op, lhs, self.primary()?);
        }
    }

    fn primary(&mut self) -> Result<Expr, String> {
        match self.bump() {
            Some(TokenKind::Number(n)) => Ok(Expr::Int(*n)),
            Some(TokenKind::Minus) => match self.bump() {
                Some(TokenKind::Number(n)) => Ok(Expr::Int(-n)),
                _ => Err("expected a number after '-'".to_string()),
            },
            Some(TokenKind::StringLiteral(s)) => Ok(Expr::Str(s.clone())),
            Some(TokenKind::LParen) => {
                let inner = self.comparison()?;
                self.expect(&TokenKind::RParen)?;
                Ok(inner)
            }
            Some(TokenKind::LBrace) => {
                let mut elements = Vec::new();
                if self.peek() != Some(&TokenKind::RBrace) {
                    elements.push(self.comparison()?);
                    while self.peek() == Some(&TokenKind::Comma) {
                        self.pos += 1;
                        elements.push(self.comparison()?);
                    }
                }
                self.expect(&TokenKind::RBrace)?;
                Ok(Expr::Array(elements))
            }
            Some(TokenKind::Identifier(name)) => match self.peek() {
                Some(TokenKind::LParen) => self.call(name),
                Some(TokenKind::LBracket) => self.subscript(name),
                _ => Ok(Expr::Ident(name.clone())),
            },
            Some(other) => Err(format!("unexpected {}", other)),
            None => Err("unexpected end of expression".to_string()),
        }
    }

    fn call(
        &mut self,
        name: &str,
    ) -> Result<Expr, String> {
        self.expect(&TokenKind::LParen)?;
        let expr = if let Some(func) = Builtin::from_name(name) {
            Expr::Call {
                func,
                arg: Box::new(self.comparison()?),
            }
        } else {
            let handle = match self.bump() {
                Some(TokenKind::Identifier(handle)) => handle.clone(),
                _ => return Err(format!("{}() expects a variable name", name)),
            };
            match name {
                "iterator" => Expr::Iterator(handle),
                "next" => Expr::Next(handle),
                "has_next" => Expr::HasNext(handle),
                _ => return Err(format!("unknown function '{}'", name)),
            }
        };
        self.expect(&TokenKind::RParen)?;
        Ok(expr)
    }

    fn subscript(
        &mut self,
        name: &str,
    ) -> Result<Expr, String> {
        self.expect(&TokenKind::LBracket)?;
        let first = self.comparison()?;
        let expr = if self.peek() == Some(&TokenKind::Colon) {
            self.pos += 1;
            Expr::Slice {
                name: name.to_string(),
                start: Box::new(first),
                end: Box::new(self.comparison()?),
            }
        } else {
            Expr::Index {
                name: name.to_string(),
                index: Box::new(first),
            }
        };
        self.expect(&TokenKind::RBracket)?;
        Ok(expr)
    }
}
