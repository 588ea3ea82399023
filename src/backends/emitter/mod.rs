//! Python emitter
//!
//! 将线性 IR 重建为结构化的 Python 源码。
//!
//! Loops are recovered from their label/jump skeleton (see [`loops`]),
//! compiler temporaries are inlined back into the expressions that use them,
//! and anything that does not fit a recognised shape is kept as a comment so
//! the output never silently loses an instruction.

mod expr;
mod loops;

use crate::middle::ir::{Expr, Instruction, IrError};
use crate::middle::validate::validate;
use crate::util::config::EmitterConfig;
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub const HEADER: &str = "# Generated Python Code";

/// Python source emitter
#[derive(Debug, Clone, Default)]
pub struct Emitter {
    config: EmitterConfig,
}

impl Emitter {
    pub fn new(config: &EmitterConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Translate an instruction list into Python source
    ///
    /// The list is validated first; a missing or duplicate label is reported
    /// instead of producing half-structured output.
    pub fn emit(
        &self,
        code: &[Instruction],
    ) -> Result<String, IrError> {
        validate(code)?;
        debug!("Emitting Python for {} instructions", code.len());

        let mut writer = Writer::new(code, &self.config);
        if self.config.header {
            writer.lines.push(HEADER.to_string());
            writer.lines.push(String::new());
        }
        writer.emit_block(0..code.len(), 0);

        if writer.lines.is_empty() {
            return Ok(String::new());
        }
        let mut out = writer.lines.join("\n");
        out.push('\n');
        Ok(out)
    }
}

/// Emit with the default configuration
pub fn emit(code: &[Instruction]) -> Result<String, IrError> {
    Emitter::default().emit(code)
}

/// Output buffer plus the temp definitions used for inlining
///
/// Only temps with a single definition that is never also a source
/// assignment target are inlined; any other temp is written out as a plain
/// assignment.
struct Writer<'a> {
    code: &'a [Instruction],
    config: &'a EmitterConfig,
    temps: HashMap<&'a str, &'a Expr>,
    lines: Vec<String>,
}

impl<'a> Writer<'a> {
    fn new(
        code: &'a [Instruction],
        config: &'a EmitterConfig,
    ) -> Self {
        let mut definitions: HashMap<&'a str, Vec<&'a Expr>> = HashMap::new();
        let mut assigned: HashSet<&'a str> = HashSet::new();
        for instruction in code {
            match instruction {
                Instruction::TempAssign { temp, value } => {
                    definitions.entry(temp.as_str()).or_default().push(value)
                }
                Instruction::Declare { name, .. } | Instruction::Assign { name, .. } => {
                    assigned.insert(name.as_str());
                }
                _ => {}
            }
        }
        let temps = definitions
            .into_iter()
            .filter(|(temp, values)| values.len() == 1 && !assigned.contains(temp))
            .map(|(temp, values)| (temp, values[0]))
            .collect();
        Self {
            code,
            config,
            temps,
            lines: Vec::new(),
        }
    }

    fn push(
        &mut self,
        depth: usize,
        line: String,
    ) {
        let indent = " ".repeat(depth * self.config.indent_width);
        self.lines.push(format!("{}{}", indent, line));
    }

    /// Emit `range` as an indented body, `pass` if it produced nothing
    fn emit_body(
        &mut self,
        range: std::ops::Range<usize>,
        depth: usize,
    ) {
        let before = self.lines.len();
        self.emit_block(range, depth);
        if self.lines.len() == before {
            self.push(depth, "pass".to_string());
        }
    }

    fn emit_block(
        &mut self,
        range: std::ops::Range<usize>,
        depth: usize,
    ) {
        let code = self.code;
        let mut i = range.start;
        while i < range.end {
            if let Some(found) = loops::match_for(code, i).filter(|l| l.resume <= range.end) {
                debug!("for loop over '{}' at instruction {}", found.iterable, i);
                self.push(depth, format!("for {} in {}:", found.var, found.iterable));
                self.emit_body(found.body, depth + 1);
                i = found.resume;
                continue;
            }
            if let Some(found) = loops::match_while(code, i, self.config.while_lookahead)
                .filter(|l| l.resume <= range.end)
            {
                debug!("while loop at instruction {}", i);
                let cond = self.py_expr(found.cond);
                self.push(depth, format!("while {}:", cond));
                self.emit_body(found.body, depth + 1);
                i = found.resume;
                continue;
            }
            self.emit_instruction(&code[i], depth);
            i += 1;
        }
    }

    fn emit_instruction(
        &mut self,
        instruction: &Instruction,
        depth: usize,
    ) {
        match instruction {
            Instruction::TempAssign { value, .. } if value.uses_iterator_protocol() => {
                self.push(depth, format!("# {}", instruction));
            }
            Instruction::TempAssign { temp, value } => {
                // inlined where used
                if !self.temps.contains_key(temp.as_str()) {
                    debug!("temp '{}' is not inlinable, keeping its assignment", temp);
                    let value = self.py_expr(value);
                    self.push(depth, format!("{} = {}", temp, value));
                }
            }
            Instruction::Declare { name, value, .. } | Instruction::Assign { name, value } => {
                if value.uses_iterator_protocol() {
                    self.push(depth, format!("# {}", instruction));
                } else {
                    let value = self.py_expr(value);
                    self.push(depth, format!("{} = {}", name, value));
                }
            }
            Instruction::Print(expr) => {
                let value = self.py_expr(expr);
                self.push(depth, format!("print({})", value));
            }
            Instruction::Label(_) | Instruction::Goto(_) | Instruction::IfGoto { .. } => {
                self.push(depth, format!("# {}", instruction));
            }
        }
    }
}
