//! 语义分析 / 类型检查
//!
//! 输入解析后的 [`Program`]，输出按声明顺序排列的 [`SymbolTable`]。
//! 通过检查的 AST 保证不会再出现类型错误，IR 生成可以直接信任它。

mod check;
pub mod errors;
pub mod types;

pub use check::TypeChecker;
pub use errors::TypeError;
pub use types::{ElemType, SymbolTable, Type};

use crate::frontend::parser::ast::Program;

/// 检查程序
pub fn check(program: &Program) -> Result<SymbolTable, TypeError> {
    TypeChecker::new().check_program(program)
}
