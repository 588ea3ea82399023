//! Abstract Syntax Tree types

use crate::util::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// Declared type keyword (`string`, `int`, `array`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeName {
    String,
    Int,
    Array,
}

impl TypeName {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeName::String => "string",
            TypeName::Int => "int",
            TypeName::Array => "array",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "string" => Some(TypeName::String),
            "int" => Some(TypeName::Int),
            "array" => Some(TypeName::Array),
            _ => None,
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinOp {
    /// Source spelling
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Eq => "==",
            BinOp::Neq => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "+" => BinOp::Add,
            "-" => BinOp::Sub,
            "*" => BinOp::Mul,
            "/" => BinOp::Div,
            "==" => BinOp::Eq,
            "!=" => BinOp::Neq,
            "<" => BinOp::Lt,
            "<=" => BinOp::Le,
            ">" => BinOp::Gt,
            ">=" => BinOp::Ge,
            _ => return None,
        })
    }

    /// Relational or equality operator
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Neq | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge
        )
    }

    /// Binding strength (higher binds tighter)
    pub fn precedence(&self) -> u8 {
        match self {
            BinOp::Mul | BinOp::Div => 3,
            BinOp::Add | BinOp::Sub => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Built-in functions callable from source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Builtin {
    Length,
    Size,
}

impl Builtin {
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Length => "length",
            Builtin::Size => "size",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "length" => Some(Builtin::Length),
            "size" => Some(Builtin::Size),
            _ => None,
        }
    }
}

/// Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String, Span),
    Str(String, Span),
    Int(i64, Span),
    Array(Vec<Expr>, Span),
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    Index {
        name: String,
        index: Box<Expr>,
        span: Span,
    },
    /// `name[start:end]`, end inclusive
    Slice {
        name: String,
        start: Box<Expr>,
        end: Box<Expr>,
        span: Span,
    },
    Call {
        func: Builtin,
        arg: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Ident(_, span)
            | Expr::Str(_, span)
            | Expr::Int(_, span)
            | Expr::Array(_, span) => *span,
            Expr::Binary { span, .. }
            | Expr::Index { span, .. }
            | Expr::Slice { span, .. }
            | Expr::Call { span, .. } => *span,
        }
    }
}

/// Statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Declaration {
        ty: TypeName,
        name: String,
        expr: Expr,
        span: Span,
    },
    Assignment {
        name: String,
        expr: Expr,
        span: Span,
    },
    Print {
        expr: Expr,
        span: Span,
    },
    ForEach {
        var: String,
        iterable: String,
        body: Vec<Stmt>,
        span: Span,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Declaration { span, .. }
            | Stmt::Assignment { span, .. }
            | Stmt::Print { span, .. }
            | Stmt::ForEach { span, .. }
            | Stmt::While { span, .. } => *span,
        }
    }
}

/// Whole program
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    /// Render the tree in the `├─ Node` outline used by `starrlang ast`
    pub fn to_tree(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "├─ Program");
        for stmt in &self.statements {
            write_stmt(&mut out, stmt, 1);
        }
        out
    }
}

fn write_stmt(
    out: &mut String,
    stmt: &Stmt,
    depth: usize,
) {
    let pad = "  ".repeat(depth);
    match stmt {
        Stmt::Declaration { ty, name, expr, .. } => {
            let _ = writeln!(out, "{pad}├─ Declaration");
            let _ = writeln!(out, "{pad}  └─ type: {ty}");
            let _ = writeln!(out, "{pad}  └─ name: {name}");
            let _ = writeln!(out, "{pad}  └─ expression:");
            write_expr(out, expr, depth + 2);
        }
        Stmt::Assignment { name, expr, .. } => {
            let _ = writeln!(out, "{pad}├─ Assignment");
            let _ = writeln!(out, "{pad}  └─ name: {name}");
            let _ = writeln!(out, "{pad}  └─ expression:");
            write_expr(out, expr, depth + 2);
        }
        Stmt::Print { expr, .. } => {
            let _ = writeln!(out, "{pad}├─ Print");
            write_expr(out, expr, depth + 1);
        }
        Stmt::ForEach {
            var,
            iterable,
            body,
            ..
        } => {
            let _ = writeln!(out, "{pad}├─ ForEachLoop");
            let _ = writeln!(out, "{pad}  └─ var: {var}");
            let _ = writeln!(out, "{pad}  └─ iterable: {iterable}");
            let _ = writeln!(out, "{pad}  └─ body:");
            for s in body {
                write_stmt(out, s, depth + 2);
            }
        }
        Stmt::While {
            condition, body, ..
        } => {
            let _ = writeln!(out, "{pad}├─ WhileLoop");
            let _ = writeln!(out, "{pad}  └─ condition:");
            write_expr(out, condition, depth + 2);
            let _ = writeln!(out, "{pad}  └─ body:");
            for s in body {
                write_stmt(out, s, depth + 2);
            }
        }
    }
}

fn write_expr(
    out: &mut String,
    expr: &Expr,
    depth: usize,
) {
    let pad = "  ".repeat(depth);
    match expr {
        Expr::Ident(name, _) => {
            let _ = writeln!(out, "{pad}├─ Identifier");
            let _ = writeln!(out, "{pad}  └─ name: {name}");
        }
        Expr::Str(value, _) => {
            let _ = writeln!(out, "{pad}├─ StringLiteral");
            let _ = writeln!(out, "{pad}  └─ value: \"{value}\"");
        }
        Expr::Int(value, _) => {
            let _ = writeln!(out, "{pad}├─ IntLiteral");
            let _ = writeln!(out, "{pad}  └─ value: {value}");
        }
        Expr::Array(elements, _) => {
            let _ = writeln!(out, "{pad}├─ ArrayLiteral");
            let _ = writeln!(out, "{pad}  └─ elements:");
            for e in elements {
                write_expr(out, e, depth + 2);
            }
        }
        Expr::Binary {
            op, left, right, ..
        } => {
            let _ = writeln!(out, "{pad}├─ BinaryOp ({op})");
            write_expr(out, left, depth + 1);
            write_expr(out, right, depth + 1);
        }
        Expr::Index { name, index, .. } => {
            let _ = writeln!(out, "{pad}├─ IndexExpr");
            let _ = writeln!(out, "{pad}  └─ name: {name}");
            write_expr(out, index, depth + 1);
        }
        Expr::Slice {
            name, start, end, ..
        } => {
            let _ = writeln!(out, "{pad}├─ SliceExpr");
            let _ = writeln!(out, "{pad}  └─ name: {name}");
            write_expr(out, start, depth + 1);
            write_expr(out, end, depth + 1);
        }
        Expr::Call { func, arg, .. } => {
            let _ = writeln!(out, "{pad}├─ Call ({})", func.name());
            write_expr(out, arg, depth + 1);
        }
    }
}
