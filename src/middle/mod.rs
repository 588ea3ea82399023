//! Middle end
//!
//! IR definition and text format, IR generation from the checked AST,
//! structural validation and the optimizer.

pub mod ir;
pub mod ir_gen;
pub mod optimizer;
pub mod validate;

pub use ir::{format_program, Expr, Instruction, IrError};
pub use ir_gen::{generate, IrGenerator};
pub use optimizer::{optimize, OptLevel, OptimizationReport, Optimizer};
pub use validate::validate;
