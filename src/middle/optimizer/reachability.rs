//! 不可达代码删除
//!
//! 从第 0 条指令出发做工作表遍历：标签和普通指令落到下一条，
//! `goto` 只到目标，条件跳转同时到目标和下一条。

use super::Pass;
use crate::middle::ir::Instruction;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Copy, Default)]
pub struct UnreachableCodeRemoval;

/// 每条指令是否可从入口到达
pub fn reachable(code: &[Instruction]) -> Vec<bool> {
    let labels: HashMap<&str, usize> = code
        .iter()
        .enumerate()
        .filter_map(|(i, instr)| instr.label().map(|l| (l, i)))
        .collect();

    let mut seen = vec![false; code.len()];
    let mut worklist = VecDeque::new();
    if !code.is_empty() {
        worklist.push_back(0);
    }

    while let Some(index) = worklist.pop_front() {
        if index >= code.len() || seen[index] {
            continue;
        }
        seen[index] = true;
        match &code[index] {
            Instruction::Goto(target) => {
                if let Some(&next) = labels.get(target.as_str()) {
                    worklist.push_back(next);
                }
            }
            Instruction::IfGoto { target, .. } => {
                if let Some(&next) = labels.get(target.as_str()) {
                    worklist.push_back(next);
                }
                worklist.push_back(index + 1);
            }
            _ => worklist.push_back(index + 1),
        }
    }
    seen
}

impl Pass for UnreachableCodeRemoval {
    fn name(&self) -> &'static str {
        "unreachable-code-removal"
    }

    fn run(
        &self,
        code: &mut Vec<Instruction>,
    ) -> bool {
        let seen = reachable(code);
        let before = code.len();
        let mut flags = seen.into_iter();
        code.retain(|_| flags.next().unwrap_or(true));
        code.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middle::ir::format_program;
    use crate::middle::ir::text::parse_program;

    #[test]
    fn test_drops_code_after_goto() {
        let mut code = parse_program("goto L0\nprint 1\nprint 2\nL0:\nprint 3\n").unwrap();
        assert!(UnreachableCodeRemoval.run(&mut code));
        assert_eq!(format_program(&code), "goto L0\nL0:\nprint 3\n");
    }

    #[test]
    fn test_conditional_keeps_both_edges() {
        let text = "L0:\nif x goto L1\ngoto L2\nL1:\nprint x\ngoto L0\nL2:\n";
        let mut code = parse_program(text).unwrap();
        assert!(!UnreachableCodeRemoval.run(&mut code));
        assert_eq!(format_program(&code), text);
    }

    #[test]
    fn test_unreferenced_island() {
        let mut code = parse_program("goto L1\nL0:\nprint 1\nL1:\n").unwrap();
        assert_eq!(reachable(&code), vec![true, false, false, true]);
        assert!(UnreachableCodeRemoval.run(&mut code));
        assert_eq!(format_program(&code), "goto L1\nL1:\n");
    }

    #[test]
    fn test_empty_program() {
        let mut code = Vec::new();
        assert!(!UnreachableCodeRemoval.run(&mut code));
    }
}
