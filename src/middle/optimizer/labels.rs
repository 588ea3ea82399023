//! 冗余标签删除：没有任何跳转指向的标签

use super::Pass;
use crate::middle::ir::Instruction;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default)]
pub struct RedundantLabelRemoval;

impl Pass for RedundantLabelRemoval {
    fn name(&self) -> &'static str {
        "redundant-label-removal"
    }

    fn run(
        &self,
        code: &mut Vec<Instruction>,
    ) -> bool {
        let targets: HashSet<String> = code
            .iter()
            .filter_map(|i| i.jump_target().map(str::to_string))
            .collect();
        let before = code.len();
        code.retain(|i| i.label().map_or(true, |label| targets.contains(label)));
        code.len() != before
    }
}
