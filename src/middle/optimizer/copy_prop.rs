//! 复制传播
//!
//! 正向扫描，记录 `x = y` 形式的纯别名，之后右侧读取 `x` 的地方改为读取 `y`。
//! 替换在结构化的表达式上进行，天然按整个名字匹配；赋值目标从不改写。
//!
//! 别名失效的时机：
//! - 任何标签处（控制流汇合点）清空全部别名
//! - 重新定义 `x` 时删除键 `x`、值为 `x` 的别名，以及值为某个读取了 `x` 的临时变量的别名
//!
//! `x = t` 且 `t` 读取了旧的 `x` 时不建立别名。

use super::Pass;
use crate::middle::ir::{Expr, Instruction};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, Default)]
pub struct CopyPropagation;

impl Pass for CopyPropagation {
    fn name(&self) -> &'static str {
        "copy-propagation"
    }

    fn run(
        &self,
        code: &mut Vec<Instruction>,
    ) -> bool {
        let mut aliases: IndexMap<String, String> = IndexMap::new();
        // temp -> every variable its definition reads, through nested temps
        let mut temp_reads: HashMap<String, HashSet<String>> = HashMap::new();
        let mut changed = false;

        for instruction in code.iter_mut() {
            if matches!(instruction, Instruction::Label(_)) {
                aliases.clear();
                continue;
            }

            if let Some(expr) = instruction.expr_mut() {
                for (from, to) in &aliases {
                    changed |= expr.rename_reads(from, to);
                }
            }

            let Some(target) = instruction.target().map(str::to_string) else {
                continue;
            };

            aliases.shift_remove(&target);
            aliases.retain(|_, source| {
                source != &target
                    && !temp_reads
                        .get(source.as_str())
                        .is_some_and(|reads| reads.contains(&target))
            });

            if let Instruction::TempAssign { temp, value } = &*instruction {
                let mut reads = HashSet::new();
                value.for_each_read(&mut |name| {
                    reads.insert(name.to_string());
                    if let Some(inner) = temp_reads.get(name) {
                        reads.extend(inner.iter().cloned());
                    }
                });
                temp_reads.insert(temp.clone(), reads);
            }

            if let Some(source) = instruction.expr().and_then(Expr::as_alias) {
                // `x = t` where `t` read the old `x` is not a stable alias
                let self_referential = temp_reads
                    .get(source)
                    .is_some_and(|reads| reads.contains(&target));
                if source != target && !self_referential {
                    aliases.insert(target, source.to_string());
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middle::ir::format_program;
    use crate::middle::ir::text::parse_program;

    fn run(text: &str) -> (String, bool) {
        let mut code = parse_program(text).unwrap();
        let changed = CopyPropagation.run(&mut code);
        (format_program(&code), changed)
    }

    #[test]
    fn test_simple_alias() {
        let (out, changed) = run("string a = \"x\"\nstring b = a\nprint b\n");
        assert!(changed);
        assert_eq!(out, "string a = \"x\"\nstring b = a\nprint a\n");
    }

    #[test]
    fn test_whole_name_only() {
        let (out, _) = run("int a = 1\nint b = a\nint bb = 2\nt0 = bb + b\nprint t0\n");
        assert_eq!(out, "int a = 1\nint b = a\nint bb = 2\nt0 = bb + a\nprint t0\n");
    }

    #[test]
    fn test_target_never_rewritten() {
        let (out, _) = run("int a = 1\nint b = a\nb = 5\nprint b\n");
        assert_eq!(out, "int a = 1\nint b = a\nb = 5\nprint b\n");
    }

    #[test]
    fn test_redefining_source_drops_alias() {
        let (out, _) = run("int a = 1\nint b = a\na = 2\nprint b\n");
        assert_eq!(out, "int a = 1\nint b = a\na = 2\nprint b\n");
    }

    #[test]
    fn test_redefining_temp_input_drops_alias() {
        let text = "int x = 1\nt0 = x + 1\nint y = t0\nx = 5\nprint y\n";
        let (out, changed) = run(text);
        assert!(!changed);
        assert_eq!(out, text);
    }

    #[test]
    fn test_self_update_is_not_an_alias() {
        let text = "int a = 1\nt0 = a + 1\na = t0\nprint a\n";
        let (out, changed) = run(text);
        assert!(!changed);
        assert_eq!(out, text);
    }

    #[test]
    fn test_labels_clear_aliases() {
        let text = "int a = 1\nint b = a\nL0:\nprint b\na = 3\ngoto L0\n";
        let (out, changed) = run(text);
        assert!(!changed);
        assert_eq!(out, text);
    }

    #[test]
    fn test_rewrites_slice_base_and_condition() {
        let (out, _) = run("array a = {1}\narray b = a\nprint b[0:0]\nif b goto L0\nL0:\n");
        assert_eq!(out, "array a = {1}\narray b = a\nprint a[0:0]\nif a goto L0\nL0:\n");
    }
}
