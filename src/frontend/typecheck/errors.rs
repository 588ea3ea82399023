//! 语义错误

use super::types::Type;
use crate::frontend::parser::ast::{BinOp, TypeName};
use crate::util::span::Span;
use thiserror::Error;

/// 语义分析错误
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypeError {
    #[error("Variable '{name}' already declared (at {span})")]
    AlreadyDeclared { name: String, span: Span },

    #[error("Variable '{name}' not declared (at {span})")]
    Undeclared { name: String, span: Span },

    #[error("Cannot assign {found} to {expected} (at {span})")]
    DeclMismatch {
        expected: TypeName,
        found: Type,
        span: Span,
    },

    #[error("Cannot assign {found} to '{name}' of type {expected} (at {span})")]
    AssignMismatch {
        name: String,
        expected: Type,
        found: Type,
        span: Span,
    },

    #[error("Array elements must all have the same type (at {span})")]
    HeterogeneousArray { span: Span },

    #[error("Arrays can only contain strings or ints, found {found} (at {span})")]
    InvalidElement { found: Type, span: Span },

    #[error("Cannot slice or index '{name}' of type {ty} (at {span})")]
    NotSliceable { name: String, ty: Type, span: Span },

    #[error("Slice indices must be non-negative (at {span})")]
    NegativeSliceBound { span: Span },

    #[error("Slice start index {start} > end index {end} (at {span})")]
    InvertedSlice { start: i64, end: i64, span: Span },

    #[error("Slice and index bounds must be int, found {found} (at {span})")]
    NonIntegerBound { found: Type, span: Span },

    #[error("Cannot assign slice to variable '{name}' (at {span})")]
    SliceAssignment { name: String, span: Span },

    #[error("Operator '{op}' cannot be applied to {left} and {right} (at {span})")]
    InvalidOperands {
        op: BinOp,
        left: Type,
        right: Type,
        span: Span,
    },

    #[error("Comparison results can only be used as a while condition (at {span})")]
    BoolValue { span: Span },

    #[error("while condition must be a comparison, int or string, found {found} (at {span})")]
    InvalidCondition { found: Type, span: Span },

    #[error("Cannot iterate over '{name}' of type {ty} (at {span})")]
    NotIterable { name: String, ty: Type, span: Span },

    #[error("Loop variable '{name}' already declared (at {span})")]
    LoopVarDeclared { name: String, span: Span },

    #[error("{func}() expects a string or array, found {found} (at {span})")]
    InvalidArgument {
        func: &'static str,
        found: Type,
        span: Span,
    },
}
