//! Expression evaluation
//!
//! `Ok(None)` is the failure sentinel: the value could not be computed and
//! the caller should drop it (assignments) or print `None`.

use super::value::{display_result, IterState, Value};
use super::{EvalMode, EvaluationError};
use crate::frontend::parser::ast::BinOp;
use crate::middle::ir::Expr;
use indexmap::IndexMap;
use std::cmp::Ordering;
use tracing::debug;

pub(super) type Eval = Result<Option<Value>, EvaluationError>;

pub(super) struct Evaluator<'a> {
    pub(super) variables: &'a mut IndexMap<String, Value>,
    pub(super) mode: EvalMode,
}

impl<'a> Evaluator<'a> {
    /// Lenient mode continues with `fallback`, strict mode fails
    fn degrade(
        &self,
        error: EvaluationError,
        fallback: Option<Value>,
    ) -> Eval {
        match self.mode {
            EvalMode::Strict => Err(error),
            EvalMode::Lenient => {
                debug!("{} (continuing with {})", error, display_result(fallback.as_ref()));
                Ok(fallback)
            }
        }
    }

    pub(super) fn eval(
        &mut self,
        expr: &Expr,
    ) -> Eval {
        match expr {
            Expr::Str(s) => Ok(Some(Value::Str(s.clone()))),
            Expr::Int(n) => Ok(Some(Value::Int(*n))),
            Expr::Array(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    match self.eval(element)? {
                        Some(value) => items.push(value),
                        None => return Ok(None),
                    }
                }
                Ok(Some(Value::Seq(items)))
            }
            Expr::Ident(name) => match self.variables.get(name) {
                Some(value) => Ok(Some(value.clone())),
                // best effort: echo the name itself
                None => self.degrade(
                    EvaluationError::UndefinedVariable(name.clone()),
                    Some(Value::Str(name.clone())),
                ),
            },
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                match (lhs, rhs) {
                    (Some(lhs), Some(rhs)) => self.binary(*op, lhs, rhs),
                    _ => Ok(None),
                }
            }
            Expr::Index { name, index } => self.index(name, index),
            Expr::Slice { name, start, end } => self.slice(name, start, end),
            Expr::Call { func, arg } => {
                let Some(value) = self.eval(arg)? else {
                    return Ok(None);
                };
                match value.len() {
                    Some(len) => Ok(Some(Value::Int(len as i64))),
                    None => self.degrade(
                        EvaluationError::NotASequence {
                            name: func.name().to_string(),
                            found: value.type_name(),
                        },
                        None,
                    ),
                }
            }
            Expr::Iterator(name) => {
                let Some(value) = self.variable(name)? else {
                    return Ok(None);
                };
                match value.elements() {
                    Some(items) => Ok(Some(Value::Iter(IterState { items, index: 0 }))),
                    None => self.degrade(
                        EvaluationError::NotASequence {
                            name: name.clone(),
                            found: value.type_name(),
                        },
                        None,
                    ),
                }
            }
            Expr::Next(handle) => self.next(handle),
            Expr::HasNext(handle) => Ok(self.has_next(handle)?.map(Value::Bool)),
        }
    }

    /// Evaluate a jump condition
    pub(super) fn condition(
        &mut self,
        cond: &Expr,
    ) -> Result<bool, EvaluationError> {
        if let Expr::HasNext(handle) = cond {
            return Ok(self.has_next(handle)?.unwrap_or(false));
        }
        Ok(self.eval(cond)?.is_some_and(|value| value.is_truthy()))
    }

    /// Current value of a variable, without the echo fallback
    fn variable(
        &self,
        name: &str,
    ) -> Eval {
        match self.variables.get(name) {
            Some(value) => Ok(Some(value.clone())),
            None => self.degrade(EvaluationError::UndefinedVariable(name.to_string()), None),
        }
    }

    fn position(
        &mut self,
        expr: &Expr,
        name: &str,
        base: &Value,
    ) -> Result<Option<i64>, EvaluationError> {
        let Some(value) = self.eval(expr)? else {
            return Ok(None);
        };
        match value.as_number() {
            Some(n) => Ok(Some(n)),
            None => {
                self.degrade(
                    EvaluationError::TypeMismatch {
                        op: format!("{}[...]", name),
                        left: base.type_name(),
                        right: value.type_name(),
                    },
                    None,
                )?;
                Ok(None)
            }
        }
    }

    fn index(
        &mut self,
        name: &str,
        index: &Expr,
    ) -> Eval {
        let Some(base) = self.variable(name)? else {
            return Ok(None);
        };
        let Some(items) = base.elements() else {
            return self.degrade(
                EvaluationError::NotASequence {
                    name: name.to_string(),
                    found: base.type_name(),
                },
                None,
            );
        };
        let Some(i) = self.position(index, name, &base)? else {
            return Ok(None);
        };
        match usize::try_from(i).ok().and_then(|i| items.get(i)) {
            Some(item) => Ok(Some(item.clone())),
            None => self.degrade(
                EvaluationError::IndexOutOfRange {
                    name: name.to_string(),
                    index: i,
                    len: items.len(),
                },
                None,
            ),
        }
    }

    /// Inclusive slice, bounds clamped to the sequence
    fn slice(
        &mut self,
        name: &str,
        start: &Expr,
        end: &Expr,
    ) -> Eval {
        let Some(base) = self.variable(name)? else {
            return Ok(None);
        };
        let Some(items) = base.elements() else {
            return self.degrade(
                EvaluationError::NotASequence {
                    name: name.to_string(),
                    found: base.type_name(),
                },
                None,
            );
        };
        let (Some(start), Some(end)) = (
            self.position(start, name, &base)?,
            self.position(end, name, &base)?,
        ) else {
            return Ok(None);
        };

        let len = items.len();
        let from = usize::try_from(start.max(0)).unwrap_or(0);
        if from >= len {
            return self.degrade(
                EvaluationError::IndexOutOfRange {
                    name: name.to_string(),
                    index: start,
                    len,
                },
                None,
            );
        }
        let selected: &[Value] = match usize::try_from(end) {
            Ok(to) if to >= from => &items[from..=to.min(len - 1)],
            _ => &[],
        };

        Ok(Some(match base {
            Value::Str(_) => Value::Str(
                selected
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<String>(),
            ),
            _ => Value::Seq(selected.to_vec()),
        }))
    }

    fn next(
        &mut self,
        handle: &str,
    ) -> Eval {
        let step = match self.variables.get_mut(handle) {
            Some(Value::Iter(state)) => match state.items.get(state.index).cloned() {
                Some(item) => {
                    state.index += 1;
                    Ok(item)
                }
                None => Err(EvaluationError::IteratorExhausted(handle.to_string())),
            },
            _ => Err(EvaluationError::NotAnIterator(handle.to_string())),
        };
        match step {
            Ok(item) => Ok(Some(item)),
            Err(error) => self.degrade(error, None),
        }
    }

    fn has_next(
        &self,
        handle: &str,
    ) -> Result<Option<bool>, EvaluationError> {
        match self.variables.get(handle) {
            Some(Value::Iter(state)) => Ok(Some(state.has_next())),
            _ => {
                self.degrade(EvaluationError::NotAnIterator(handle.to_string()), None)?;
                Ok(Some(false))
            }
        }
    }

    fn binary(
        &self,
        op: BinOp,
        lhs: Value,
        rhs: Value,
    ) -> Eval {
        let mismatch = |lhs: &Value, rhs: &Value| EvaluationError::TypeMismatch {
            op: op.symbol().to_string(),
            left: lhs.type_name(),
            right: rhs.type_name(),
        };
        let overflow = || EvaluationError::Overflow {
            op: op.symbol().to_string(),
        };

        match op {
            BinOp::Add => match (&lhs, &rhs) {
                (Value::Int(a), Value::Int(b)) => match a.checked_add(*b) {
                    Some(n) => Ok(Some(Value::Int(n))),
                    None => self.degrade(overflow(), None),
                },
                (Value::Str(a), Value::Str(b)) => Ok(Some(Value::Str(format!("{}{}", a, b)))),
                _ => self.degrade(
                    mismatch(&lhs, &rhs),
                    Some(Value::Str(format!("{}{}", lhs, rhs))),
                ),
            },
            BinOp::Sub | BinOp::Mul | BinOp::Div => {
                let (Value::Int(a), Value::Int(b)) = (&lhs, &rhs) else {
                    return self.degrade(mismatch(&lhs, &rhs), Some(Value::Int(0)));
                };
                let result = match op {
                    BinOp::Sub => a.checked_sub(*b),
                    BinOp::Mul => a.checked_mul(*b),
                    _ if *b == 0 => {
                        return self.degrade(EvaluationError::DivisionByZero, Some(Value::Int(0)))
                    }
                    _ => floor_div(*a, *b),
                };
                match result {
                    Some(n) => Ok(Some(Value::Int(n))),
                    None => self.degrade(overflow(), None),
                }
            }
            _ => match compare(&lhs, &rhs) {
                Some(ordering) => Ok(Some(Value::Bool(matches_ordering(op, ordering)))),
                None => match op {
                    BinOp::Eq => Ok(Some(Value::Bool(lhs == rhs))),
                    BinOp::Neq => Ok(Some(Value::Bool(lhs != rhs))),
                    _ => self.degrade(mismatch(&lhs, &rhs), Some(Value::Bool(false))),
                },
            },
        }
    }
}

/// Order two values; digit-only strings compare as numbers
fn compare(
    lhs: &Value,
    rhs: &Value,
) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (lhs.as_number(), rhs.as_number()) {
        return Some(a.cmp(&b));
    }
    match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn matches_ordering(
    op: BinOp,
    ordering: Ordering,
) -> bool {
    match op {
        BinOp::Eq => ordering == Ordering::Equal,
        BinOp::Neq => ordering != Ordering::Equal,
        BinOp::Lt => ordering == Ordering::Less,
        BinOp::Le => ordering != Ordering::Greater,
        BinOp::Gt => ordering == Ordering::Greater,
        BinOp::Ge => ordering != Ordering::Less,
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => false,
    }
}

/// Floor division, rounding toward negative infinity
fn floor_div(
    a: i64,
    b: i64,
) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        Some(q - 1)
    } else {
        Some(q)
    }
}
