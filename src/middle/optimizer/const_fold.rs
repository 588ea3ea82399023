//! 常量折叠
//!
//! 保留的扩展点：语言中没有值得折叠的纯常量运算，这一遍不做任何改动。

use super::Pass;
use crate::middle::ir::Instruction;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantFolding;

impl Pass for ConstantFolding {
    fn name(&self) -> &'static str {
        "constant-folding"
    }

    fn run(
        &self,
        _code: &mut Vec<Instruction>,
    ) -> bool {
        false
    }
}
