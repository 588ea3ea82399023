//! IR interpreter
//!
//! Executes an instruction list directly: a program counter, a label map
//! built once up front, and a variable store. Output is the ordered list of
//! printed lines.
//!
//! Evaluation problems (index out of range, division by zero, type
//! mismatches) are handled according to [`EvalMode`]: lenient mode degrades
//! to a sentinel or fallback value and keeps running, strict mode stops with
//! an [`EvaluationError`].

mod eval;
pub mod executor;
pub mod value;


pub use executor::{run, Interpreter};
pub use value::{IterState, Value};

use crate::middle::ir::IrError;
use serde::{Deserialize, Serialize};

/// How evaluation problems are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvalMode {
    /// Degrade to a sentinel / fallback value and continue
    #[default]
    Lenient,
    /// Stop with an [`EvaluationError`]
    Strict,
}

/// Evaluation error, surfaced in strict mode
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("index {index} out of range for '{name}' of length {len}")]
    IndexOutOfRange { name: String, index: i64, len: usize },
    #[error("division by zero")]
    DivisionByZero,
    #[error("unsupported operand types for {op}: {left} and {right}")]
    TypeMismatch {
        op: String,
        left: &'static str,
        right: &'static str,
    },
    #[error("integer overflow in {op}")]
    Overflow { op: String },
    #[error("variable '{0}' is not defined")]
    UndefinedVariable(String),
    #[error("'{name}' of type {found} is not a string or array")]
    NotASequence { name: String, found: &'static str },
    #[error("'{0}' is not an iterator")]
    NotAnIterator(String),
    #[error("iterator '{0}' is exhausted")]
    IteratorExhausted(String),
}

/// Interpreter failure
#[derive(Debug, thiserror::Error)]
pub enum InterpreterError {
    /// The IR itself is broken
    #[error(transparent)]
    Structure(#[from] IrError),
    #[error("instruction {index} (`{instruction}`): {source}")]
    Evaluation {
        index: usize,
        instruction: String,
        #[source]
        source: EvaluationError,
    },
    #[error("failed to write program output: {0}")]
    Output(#[from] std::io::Error),
}
