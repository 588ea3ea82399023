//! 冗余跳转删除（O2）：紧跟着目标标签的 `goto`

use super::Pass;
use crate::middle::ir::Instruction;

#[derive(Debug, Clone, Copy, Default)]
pub struct RedundantJumpRemoval;

impl Pass for RedundantJumpRemoval {
    fn name(&self) -> &'static str {
        "redundant-jump-removal"
    }

    fn run(
        &self,
        code: &mut Vec<Instruction>,
    ) -> bool {
        let redundant: Vec<bool> = (0..code.len())
            .map(|i| match (&code[i], code.get(i + 1)) {
                (Instruction::Goto(target), Some(Instruction::Label(label))) => target == label,
                _ => false,
            })
            .collect();
        let before = code.len();
        let mut flags = redundant.into_iter();
        code.retain(|_| !flags.next().unwrap_or(false));
        code.len() != before
    }
}
