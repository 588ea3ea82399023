//! Interpreter executor
//!
//! Fetch / dispatch loop over the instruction list. The program counter
//! advances by one unless a jump redirected it.

use super::eval::Evaluator;
use super::value::{display_result, Value};
use super::{EvalMode, InterpreterError};
use crate::middle::ir::{Instruction, IrError};
use crate::middle::validate::label_positions;
use crate::util::config::InterpreterConfig;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use tracing::debug;

/// The IR interpreter
///
/// Owns its instruction list, label map and variable store; nothing is
/// shared between runs.
pub struct Interpreter {
    code: Vec<Instruction>,
    labels: HashMap<String, usize>,
    variables: IndexMap<String, Value>,
    output: Vec<String>,
    pc: usize,
    steps: u64,
    mode: EvalMode,
    /// Printed lines are streamed here instead of collected
    stdout: Option<Box<dyn Write>>,
}

impl fmt::Debug for Interpreter {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Interpreter")
            .field("instructions", &self.code.len())
            .field("labels", &self.labels)
            .field("variables", &self.variables)
            .field("output", &self.output)
            .field("pc", &self.pc)
            .field("steps", &self.steps)
            .field("mode", &self.mode)
            .field(
                "stdout",
                &if self.stdout.is_some() {
                    "Some(...)"
                } else {
                    "None"
                },
            )
            .finish()
    }
}

impl Interpreter {
    /// Load a program in lenient mode
    ///
    /// Fails if the IR is structurally broken (duplicate or missing labels).
    pub fn new(code: &[Instruction]) -> Result<Self, InterpreterError> {
        Self::with_mode(code, EvalMode::default())
    }

    pub fn with_config(
        code: &[Instruction],
        config: &InterpreterConfig,
    ) -> Result<Self, InterpreterError> {
        Self::with_mode(code, config.mode)
    }

    pub fn with_mode(
        code: &[Instruction],
        mode: EvalMode,
    ) -> Result<Self, InterpreterError> {
        let labels = label_positions(code)?;
        Ok(Self {
            code: code.to_vec(),
            labels,
            variables: IndexMap::new(),
            output: Vec::new(),
            pc: 0,
            steps: 0,
            mode,
            stdout: None,
        })
    }

    /// Stream printed lines to `stdout` instead of collecting them
    pub fn set_stdout(
        &mut self,
        stdout: Box<dyn Write>,
    ) {
        self.stdout = Some(stdout);
    }

    /// Run to completion, returning the collected output
    pub fn run(&mut self) -> Result<&[String], InterpreterError> {
        debug!(
            "Executing {} instructions ({:?} mode)",
            self.code.len(),
            self.mode
        );
        while self.step()? {}
        debug!(
            "Execution finished after {} steps, {} lines printed",
            self.steps,
            self.output.len()
        );
        Ok(&self.output)
    }

    /// Execute one instruction; `Ok(false)` once the program has finished
    pub fn step(&mut self) -> Result<bool, InterpreterError> {
        let Some(instruction) = self.code.get(self.pc) else {
            return Ok(false);
        };
        let index = self.pc;
        let mut next = index + 1;
        let mut printed = None;

        let mut evaluator = Evaluator {
            variables: &mut self.variables,
            mode: self.mode,
        };
        let result = match instruction {
            Instruction::Label(_) => Ok(()),
            Instruction::Declare { name, value, .. }
            | Instruction::Assign { name, value }
            | Instruction::TempAssign { temp: name, value } => {
                evaluator.eval(value).map(|result| match result {
                    Some(value) => {
                        evaluator.variables.insert(name.clone(), value);
                    }
                    None => debug!("Assignment to '{}' dropped: no value", name),
                })
            }
            Instruction::Print(expr) => evaluator
                .eval(expr)
                .map(|value| printed = Some(display_result(value.as_ref()))),
            Instruction::Goto(target) => {
                next = resolve(&self.labels, target, index, instruction)?;
                Ok(())
            }
            Instruction::IfGoto { cond, target } => match evaluator.condition(cond) {
                Ok(true) => {
                    next = resolve(&self.labels, target, index, instruction)?;
                    Ok(())
                }
                Ok(false) => Ok(()),
                Err(error) => Err(error),
            },
        };

        result.map_err(|source| InterpreterError::Evaluation {
            index,
            instruction: instruction.to_string(),
            source,
        })?;

        if let Some(line) = printed {
            match self.stdout.as_mut() {
                Some(out) => writeln!(out, "{}", line)?,
                None => self.output.push(line),
            }
        }
        self.pc = next;
        self.steps += 1;
        Ok(true)
    }

    /// Printed lines so far (empty when streaming to stdout)
    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn into_output(self) -> Vec<String> {
        self.output
    }

    /// Variable store in definition order, iterator handles hidden
    pub fn variables(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.variables
            .iter()
            .filter(|(_, value)| !matches!(value, Value::Iter(_)))
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn variable(
        &self,
        name: &str,
    ) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn mode(&self) -> EvalMode {
        self.mode
    }
}

fn resolve(
    labels: &HashMap<String, usize>,
    target: &str,
    index: usize,
    instruction: &Instruction,
) -> Result<usize, IrError> {
    labels
        .get(target)
        .copied()
        .ok_or_else(|| IrError::MissingLabel {
            label: target.to_string(),
            index,
            instruction: instruction.to_string(),
        })
}

/// Run an instruction list in lenient mode and return its output
pub fn run(code: &[Instruction]) -> Result<Vec<String>, InterpreterError> {
    let mut interpreter = Interpreter::new(code)?;
    interpreter.run()?;
    Ok(interpreter.into_output())
}
