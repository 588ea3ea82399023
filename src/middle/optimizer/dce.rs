//! 死代码消除
//!
//! 先求"被使用"变量集合：打印、条件跳转、迭代器协议赋值的右侧是种子，
//! 被使用变量的赋值右侧读取的变量也被使用。反向扫描直到不动点。
//! 目标不在集合中的赋值被删除，迭代器协议赋值除外。

use super::Pass;
use crate::middle::ir::Instruction;
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct DeadCodeElimination {
    max_iterations: usize,
}

impl DeadCodeElimination {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    /// Variables whose values may be observed; `None` if the bound was hit
    pub fn used_variables<'a>(
        &self,
        code: &'a [Instruction],
    ) -> Option<HashSet<&'a str>> {
        let mut used: HashSet<&'a str> = HashSet::new();
        for instruction in code {
            let seeds = match instruction {
                Instruction::Print(expr) | Instruction::IfGoto { cond: expr, .. } => Some(expr),
                _ if is_protected(instruction) => instruction.expr(),
                _ => None,
            };
            if let Some(expr) = seeds {
                expr.for_each_read(&mut |name| {
                    used.insert(name);
                });
            }
        }

        for iteration in 0..self.max_iterations {
            let mut grew = false;
            for instruction in code.iter().rev() {
                let (Some(target), Some(value)) = (instruction.target(), instruction.expr()) else {
                    continue;
                };
                if !used.contains(target) {
                    continue;
                }
                value.for_each_read(&mut |name| {
                    grew |= used.insert(name);
                });
            }
            if !grew {
                debug!("Liveness converged after {} iterations", iteration + 1);
                return Some(used);
            }
        }
        None
    }
}

/// Assignments that drive the iterator protocol are never removed
fn is_protected(instruction: &Instruction) -> bool {
    instruction.is_assignment()
        && instruction
            .expr()
            .is_some_and(|value| value.uses_iterator_protocol())
}

impl Pass for DeadCodeElimination {
    fn name(&self) -> &'static str {
        "dead-code-elimination"
    }

    fn run(
        &self,
        code: &mut Vec<Instruction>,
    ) -> bool {
        let Some(used) = self.used_variables(code) else {
            warn!(
                "Liveness analysis did not converge within {} iterations; skipping dead-code elimination",
                self.max_iterations
            );
            return false;
        };
        let keep: Vec<bool> = code
            .iter()
            .map(|instruction| match instruction.target() {
                Some(target) => used.contains(target) || is_protected(instruction),
                None => true,
            })
            .collect();
        let before = code.len();
        let mut flags = keep.into_iter();
        code.retain(|_| flags.next().unwrap_or(true));
        code.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middle::ir::text::parse_program;
    use crate::middle::ir::format_program;

    fn run(text: &str) -> (String, bool) {
        let mut code = parse_program(text).unwrap();
        let changed = DeadCodeElimination::new(64).run(&mut code);
        (format_program(&code), changed)
    }

    #[test]
    fn test_removes_unused_declaration() {
        let (out, changed) = run("string unused = \"X\"\nstring s = \"a\"\nprint s\n");
        assert!(changed);
        assert_eq!(out, "string s = \"a\"\nprint s\n");
    }

    #[test]
    fn test_transitive_use_through_temps() {
        let (out, changed) = run("int a = 1\nt0 = a + 1\nint b = t0\nprint b\n");
        assert!(!changed);
        assert_eq!(out, "int a = 1\nt0 = a + 1\nint b = t0\nprint b\n");
    }

    #[test]
    fn test_use_before_definition_in_loop() {
        let text = "int i = 0\nL0:\nif i goto L1\ngoto L2\nL1:\nt0 = i - 1\ni = t0\ngoto L0\nL2:\n";
        let (out, changed) = run(text);
        assert!(!changed);
        assert_eq!(out, text);
    }

    #[test]
    fn test_keeps_iterator_protocol() {
        let text = "array a = {\"x\"}\nt0 = iterator(a)\nL0:\nif has_next(t0) goto L1\ngoto L2\nL1:\nstring v = next(t0)\ngoto L0\nL2:\n";
        let (out, changed) = run(text);
        assert!(!changed);
        assert_eq!(out, text);
    }

    #[test]
    fn test_bound_hit_keeps_everything() {
        let mut code = parse_program("int a = 1\nint b = a\nint c = b\nprint c\nint d = 5\n").unwrap();
        let original = code.clone();
        assert!(!DeadCodeElimination::new(1).run(&mut code));
        assert_eq!(code, original);
    }
}
