//! Intermediate Representation
//!
//! 扁平的三地址指令序列。控制流只用标签和跳转表达；
//! for-each 循环通过内部的迭代器协议（`iterator` / `has_next` / `next`）降级。
//!
//! `Display` 输出是一行一条指令的文本格式，[`text::parse_program`] 可以把它读回来。

pub mod text;

use crate::frontend::parser::ast::{BinOp, Builtin, TypeName};
use serde::{Deserialize, Serialize};
use std::fmt;

/// IR 错误（结构性错误，意味着 IR 本身有缺陷）
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum IrError {
    #[error("instruction {index}: label '{label}' is defined more than once")]
    DuplicateLabel { label: String, index: usize },
    #[error("instruction {index} ({instruction}): jump target '{label}' does not exist")]
    MissingLabel {
        label: String,
        index: usize,
        instruction: String,
    },
    #[error("line {line}: {reason}: `{text}`")]
    Malformed {
        line: usize,
        text: String,
        reason: String,
    },
}

/// Expression embedded in an instruction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expr {
    Ident(String),
    Str(String),
    Int(i64),
    Array(Vec<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Index {
        name: String,
        index: Box<Expr>,
    },
    /// `name[start:end]`, end inclusive
    Slice {
        name: String,
        start: Box<Expr>,
        end: Box<Expr>,
    },
    Call {
        func: Builtin,
        arg: Box<Expr>,
    },
    /// `iterator(x)`: wrap the current value of `x`
    Iterator(String),
    /// `next(t)`: advance iterator `t`
    Next(String),
    /// `has_next(t)`
    HasNext(String),
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn binary(
        op: BinOp,
        lhs: Expr,
        rhs: Expr,
    ) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Visit every variable name this expression reads
    pub fn for_each_read<'a>(
        &'a self,
        f: &mut impl FnMut(&'a str),
    ) {
        match self {
            Expr::Ident(name) | Expr::Iterator(name) | Expr::Next(name) | Expr::HasNext(name) => {
                f(name)
            }
            Expr::Str(_) | Expr::Int(_) => {}
            Expr::Array(elements) => {
                for element in elements {
                    element.for_each_read(f);
                }
            }
            Expr::Binary { lhs, rhs, .. } => {
                lhs.for_each_read(f);
                rhs.for_each_read(f);
            }
            Expr::Index { name, index } => {
                f(name);
                index.for_each_read(f);
            }
            Expr::Slice { name, start, end } => {
                f(name);
                start.for_each_read(f);
                end.for_each_read(f);
            }
            Expr::Call { arg, .. } => arg.for_each_read(f),
        }
    }

    pub fn reads(
        &self,
        var: &str,
    ) -> bool {
        let mut found = false;
        self.for_each_read(&mut |name| found |= name == var);
        found
    }

    /// Rename reads of `from` to `to`, returns whether anything changed
    ///
    /// Iterator handles inside `next`/`has_next` are never renamed: those
    /// calls mutate the handle they name.
    pub fn rename_reads(
        &mut self,
        from: &str,
        to: &str,
    ) -> bool {
        match self {
            Expr::Ident(name) | Expr::Iterator(name) => rename(name, from, to),
            Expr::Next(_) | Expr::HasNext(_) | Expr::Str(_) | Expr::Int(_) => false,
            Expr::Array(elements) => elements
                .iter_mut()
                .fold(false, |changed, e| e.rename_reads(from, to) | changed),
            Expr::Binary { lhs, rhs, .. } => {
                let l = lhs.rename_reads(from, to);
                rhs.rename_reads(from, to) | l
            }
            Expr::Index { name, index } => {
                let n = rename(name, from, to);
                index.rename_reads(from, to) | n
            }
            Expr::Slice { name, start, end } => {
                let n = rename(name, from, to);
                let s = start.rename_reads(from, to);
                end.rename_reads(from, to) | s | n
            }
            Expr::Call { arg, .. } => arg.rename_reads(from, to),
        }
    }

    /// Whether the expression drives the iterator protocol (`iterator(..)` or `next(..)`)
    pub fn uses_iterator_protocol(&self) -> bool {
        match self {
            Expr::Iterator(_) | Expr::Next(_) => true,
            Expr::Array(elements) => elements.iter().any(Expr::uses_iterator_protocol),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.uses_iterator_protocol() || rhs.uses_iterator_protocol()
            }
            Expr::Index { index, .. } => index.uses_iterator_protocol(),
            Expr::Slice { start, end, .. } => {
                start.uses_iterator_protocol() || end.uses_iterator_protocol()
            }
            Expr::Call { arg, .. } => arg.uses_iterator_protocol(),
            _ => false,
        }
    }

    /// Name of the aliased variable when the expression is a bare identifier
    pub fn as_alias(&self) -> Option<&str> {
        match self {
            Expr::Ident(name) => Some(name),
            _ => None,
        }
    }
}

fn rename(
    name: &mut String,
    from: &str,
    to: &str,
) -> bool {
    if name == from {
        *name = to.to_string();
        true
    } else {
        false
    }
}

impl fmt::Display for Expr {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Expr::Ident(name) => write!(f, "{}", name),
            Expr::Str(value) => write!(f, "\"{}\"", value),
            Expr::Int(value) => write!(f, "{}", value),
            Expr::Array(elements) => {
                write!(f, "{{")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "}}")
            }
            Expr::Binary { op, lhs, rhs } => {
                write_operand(f, lhs)?;
                write!(f, " {} ", op)?;
                write_operand(f, rhs)
            }
            Expr::Index { name, index } => write!(f, "{}[{}]", name, index),
            Expr::Slice { name, start, end } => write!(f, "{}[{}:{}]", name, start, end),
            Expr::Call { func, arg } => write!(f, "{}({})", func.name(), arg),
            Expr::Iterator(name) => write!(f, "iterator({})", name),
            Expr::Next(name) => write!(f, "next({})", name),
            Expr::HasNext(name) => write!(f, "has_next({})", name),
        }
    }
}

/// Nested binaries are always parenthesized so the text parses back to the same tree
fn write_operand(
    f: &mut fmt::Formatter<'_>,
    operand: &Expr,
) -> fmt::Result {
    match operand {
        Expr::Binary { .. } => write!(f, "({})", operand),
        _ => write!(f, "{}", operand),
    }
}

/// IR instruction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instruction {
    /// First binding of a source variable
    Declare {
        ty: TypeName,
        name: String,
        value: Expr,
    },
    Assign {
        name: String,
        value: Expr,
    },
    /// Assignment into a compiler temporary (`t0`, `t1`, ...)
    TempAssign {
        temp: String,
        value: Expr,
    },
    Print(Expr),
    Label(String),
    Goto(String),
    IfGoto {
        cond: Expr,
        target: String,
    },
}

impl Instruction {
    /// Name written by this instruction
    pub fn target(&self) -> Option<&str> {
        match self {
            Instruction::Declare { name, .. } | Instruction::Assign { name, .. } => Some(name),
            Instruction::TempAssign { temp, .. } => Some(temp),
            _ => None,
        }
    }

    /// The embedded expression (right-hand side, printed value or condition)
    pub fn expr(&self) -> Option<&Expr> {
        match self {
            Instruction::Declare { value, .. }
            | Instruction::Assign { value, .. }
            | Instruction::TempAssign { value, .. } => Some(value),
            Instruction::Print(expr) => Some(expr),
            Instruction::IfGoto { cond, .. } => Some(cond),
            Instruction::Label(_) | Instruction::Goto(_) => None,
        }
    }

    pub fn expr_mut(&mut self) -> Option<&mut Expr> {
        match self {
            Instruction::Declare { value, .. }
            | Instruction::Assign { value, .. }
            | Instruction::TempAssign { value, .. } => Some(value),
            Instruction::Print(expr) => Some(expr),
            Instruction::IfGoto { cond, .. } => Some(cond),
            Instruction::Label(_) | Instruction::Goto(_) => None,
        }
    }

    /// Label this instruction may transfer control to
    pub fn jump_target(&self) -> Option<&str> {
        match self {
            Instruction::Goto(target) | Instruction::IfGoto { target, .. } => Some(target),
            _ => None,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Instruction::Label(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_assignment(&self) -> bool {
        self.target().is_some()
    }

    /// `t = iterator(x)`: the instruction right before a for-each header label
    pub fn iterator_source(&self) -> Option<(&str, &str)> {
        match self {
            Instruction::TempAssign {
                temp,
                value: Expr::Iterator(iterable),
            }
            | Instruction::Assign {
                name: temp,
                value: Expr::Iterator(iterable),
            } => Some((temp, iterable)),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Instruction::Declare { ty, name, value } => write!(f, "{} {} = {}", ty, name, value),
            Instruction::Assign { name, value } => write!(f, "{} = {}", name, value),
            Instruction::TempAssign { temp, value } => write!(f, "{} = {}", temp, value),
            Instruction::Print(expr) => write!(f, "print {}", expr),
            Instruction::Label(name) => write!(f, "{}:", name),
            Instruction::Goto(target) => write!(f, "goto {}", target),
            Instruction::IfGoto { cond, target } => write!(f, "if {} goto {}", cond, target),
        }
    }
}

/// Render a whole instruction list, one instruction per line
pub fn format_program(instructions: &[Instruction]) -> String {
    let mut out = String::new();
    for instruction in instructions {
        out.push_str(&instruction.to_string());
        out.push('\n');
    }
    out
}

/// Whether `name` has the shape of a compiler temporary (`t` + digits)
pub fn is_temp_name(name: &str) -> bool {
    name.len() > 1
        && name.starts_with('t')
        && name[1..].bytes().all(|b| b.is_ascii_digit())
}
