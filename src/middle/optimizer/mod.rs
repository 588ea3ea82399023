//! IR 优化器
//!
//! 按固定顺序运行的若干遍（pass）：
//!
//! 1. 死代码消除（活跃性驱动）
//! 2. 常量折叠（保留的扩展点，目前不做任何事）
//! 3. 复制传播
//! 4. 冗余标签删除
//! 5. 不可达代码删除
//! 6. 冗余跳转删除（仅 O2）
//!
//! 整个序列重复执行直到某一轮没有任何改动（受 `max_rounds` 限制），
//! 因此对已优化的输入再次优化不会产生任何变化。

mod const_fold;
mod copy_prop;
mod dce;
mod jumps;
mod labels;
mod reachability;

pub use const_fold::ConstantFolding;
pub use copy_prop::CopyPropagation;
pub use dce::DeadCodeElimination;
pub use jumps::RedundantJumpRemoval;
pub use labels::RedundantLabelRemoval;
pub use reachability::UnreachableCodeRemoval;

use crate::middle::ir::Instruction;
use crate::util::config::OptimizerConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// 优化级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OptLevel {
    /// 不优化
    O0,
    /// 标准五遍
    #[default]
    O1,
    /// 额外删除冗余跳转
    O2,
}

impl FromStr for OptLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches(['O', 'o']) {
            "0" => Ok(OptLevel::O0),
            "1" => Ok(OptLevel::O1),
            "2" => Ok(OptLevel::O2),
            _ => Err(format!("invalid optimization level '{}' (expected 0, 1 or 2)", s)),
        }
    }
}

impl fmt::Display for OptLevel {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            OptLevel::O0 => write!(f, "O0"),
            OptLevel::O1 => write!(f, "O1"),
            OptLevel::O2 => write!(f, "O2"),
        }
    }
}

/// 单个优化遍
pub trait Pass {
    fn name(&self) -> &'static str;

    /// Rewrite `code` in place, returning whether anything changed
    fn run(
        &self,
        code: &mut Vec<Instruction>,
    ) -> bool;
}

/// 一次 pass 执行的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassResult {
    pub pass: String,
    pub changed: bool,
    pub before: usize,
    pub after: usize,
}

/// 优化报告
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub level: OptLevel,
    pub original: usize,
    pub optimized: usize,
    /// 每一轮中各 pass 的结果
    pub rounds: Vec<Vec<PassResult>>,
    /// 是否在轮数上限内收敛
    pub converged: bool,
}

impl OptimizationReport {
    pub fn reduction(&self) -> usize {
        self.original.saturating_sub(self.optimized)
    }

    /// Whether any pass changed anything in any round
    pub fn changed(&self) -> bool {
        self.rounds.iter().flatten().any(|r| r.changed)
    }
}

impl fmt::Display for OptimizationReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "Optimization level: {}", self.level)?;
        for (i, round) in self.rounds.iter().enumerate() {
            writeln!(f, "Round {}:", i + 1)?;
            for result in round {
                writeln!(
                    f,
                    "  {:<28} {:>4} -> {:<4} {}",
                    result.pass,
                    result.before,
                    result.after,
                    if result.changed { "changed" } else { "-" }
                )?;
            }
        }
        writeln!(f, "Original instructions:  {}", self.original)?;
        writeln!(f, "Optimized instructions: {}", self.optimized)?;
        let percent = if self.original == 0 {
            0.0
        } else {
            self.reduction() as f64 * 100.0 / self.original as f64
        };
        write!(f, "Reduction: {} ({:.1}%)", self.reduction(), percent)
    }
}

/// 优化器
#[derive(Debug, Clone)]
pub struct Optimizer {
    level: OptLevel,
    max_rounds: usize,
    max_liveness_iterations: usize,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(&OptimizerConfig::default())
    }
}

impl Optimizer {
    pub fn new(config: &OptimizerConfig) -> Self {
        Self {
            level: config.level,
            max_rounds: config.max_rounds.max(1),
            max_liveness_iterations: config.max_liveness_iterations.max(1),
        }
    }

    pub fn with_level(level: OptLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    pub fn level(&self) -> OptLevel {
        self.level
    }

    /// Pass sequence for the configured level
    pub fn passes(&self) -> Vec<Box<dyn Pass>> {
        let mut passes: Vec<Box<dyn Pass>> = Vec::new();
        if self.level == OptLevel::O0 {
            return passes;
        }
        passes.push(Box::new(DeadCodeElimination::new(self.max_liveness_iterations)));
        passes.push(Box::new(ConstantFolding));
        passes.push(Box::new(CopyPropagation));
        passes.push(Box::new(RedundantLabelRemoval));
        if self.level == OptLevel::O2 {
            passes.push(Box::new(RedundantJumpRemoval));
        }
        passes.push(Box::new(UnreachableCodeRemoval));
        passes
    }

    /// Optimize an instruction list
    pub fn optimize(
        &self,
        code: &[Instruction],
    ) -> (Vec<Instruction>, OptimizationReport) {
        let mut code = code.to_vec();
        let mut report = OptimizationReport {
            level: self.level,
            original: code.len(),
            ..Default::default()
        };
        let passes = self.passes();

        if passes.is_empty() {
            report.optimized = code.len();
            report.converged = true;
            return (code, report);
        }

        for round in 0..self.max_rounds {
            let mut results = Vec::with_capacity(passes.len());
            for pass in &passes {
                let before = code.len();
                let changed = pass.run(&mut code);
                debug!(
                    "round {} {}: {} -> {} ({})",
                    round + 1,
                    pass.name(),
                    before,
                    code.len(),
                    if changed { "changed" } else { "unchanged" }
                );
                results.push(PassResult {
                    pass: pass.name().to_string(),
                    changed,
                    before,
                    after: code.len(),
                });
            }
            let changed = results.iter().any(|r| r.changed);
            report.rounds.push(results);
            if !changed {
                report.converged = true;
                break;
            }
        }

        if !report.converged {
            warn!(
                "Optimizer did not reach a fixed point within {} rounds; using the current result",
                self.max_rounds
            );
        }
        report.optimized = code.len();
        debug!(
            "Optimized {} -> {} instructions in {} rounds",
            report.original,
            report.optimized,
            report.rounds.len()
        );
        (code, report)
    }
}

/// Optimize with the default (O1) settings
pub fn optimize(code: &[Instruction]) -> Vec<Instruction> {
    Optimizer::default().optimize(code).0
}

#[cfg(test)]
mod tests;
