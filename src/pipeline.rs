//! 编译流水线
//!
//! Runs the phases in order and stops at the first failure. Every phase error
//! is folded into a single [`PipelineError`] naming the phase, so callers get
//! one descriptive message whatever went wrong.

use crate::backends::emitter::Emitter;
use crate::backends::interpreter::{Interpreter, InterpreterError};
use crate::frontend::{check, parse, tokenize, Program, SymbolTable, Token};
use crate::middle::ir::Instruction;
use crate::middle::ir_gen::generate;
use crate::middle::optimizer::{OptimizationReport, Optimizer};
use crate::middle::validate::validate;
use crate::util::config::Config;
use std::fmt;
use tracing::debug;

/// 编译阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Lexing,
    Parsing,
    TypeChecking,
    IrGeneration,
    Optimization,
    Interpretation,
    Emission,
}

impl fmt::Display for Phase {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            Phase::Lexing => "Lexer",
            Phase::Parsing => "Parse",
            Phase::TypeChecking => "Type",
            Phase::IrGeneration => "IR generation",
            Phase::Optimization => "Optimization",
            Phase::Interpretation => "Runtime",
            Phase::Emission => "Emit",
        };
        write!(f, "{}", name)
    }
}

/// 管道错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{phase} error: {message}")]
pub struct PipelineError {
    pub phase: Phase,
    pub message: String,
}

impl PipelineError {
    pub fn new(
        phase: Phase,
        error: impl fmt::Display,
    ) -> Self {
        Self {
            phase,
            message: error.to_string(),
        }
    }
}

/// Everything the front and middle phases produced for one source text
#[derive(Debug, Clone)]
pub struct Compilation {
    pub tokens: Vec<Token>,
    pub program: Program,
    pub symbols: SymbolTable,
    /// IR straight out of the generator
    pub ir: Vec<Instruction>,
    pub optimized: Vec<Instruction>,
    pub report: OptimizationReport,
}

/// Phase-ordered driver configured once
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Lex, parse and check
    pub fn analyze(
        &self,
        source: &str,
    ) -> Result<(Vec<Token>, Program, SymbolTable), PipelineError> {
        let tokens = tokenize(source).map_err(|e| PipelineError::new(Phase::Lexing, e))?;
        debug!("Lexed {} tokens", tokens.len());
        let program = parse(&tokens).map_err(|e| PipelineError::new(Phase::Parsing, e))?;
        debug!("Parsed {} statements", program.statements.len());
        let symbols = check(&program).map_err(|e| PipelineError::new(Phase::TypeChecking, e))?;
        debug!("Type check passed, {} symbols", symbols.len());
        Ok((tokens, program, symbols))
    }

    /// Run every phase up to and including optimization
    pub fn compile(
        &self,
        source: &str,
    ) -> Result<Compilation, PipelineError> {
        let (tokens, program, symbols) = self.analyze(source)?;

        let ir = generate(&program, &symbols);
        validate(&ir).map_err(|e| PipelineError::new(Phase::IrGeneration, e))?;
        debug!("Generated {} IR instructions", ir.len());

        let (optimized, report) = self.optimize(&ir)?;
        Ok(Compilation {
            tokens,
            program,
            symbols,
            ir,
            optimized,
            report,
        })
    }

    /// Optimize already-generated IR and re-validate the result
    pub fn optimize(
        &self,
        ir: &[Instruction],
    ) -> Result<(Vec<Instruction>, OptimizationReport), PipelineError> {
        let (optimized, report) = Optimizer::new(&self.config.optimizer).optimize(ir);
        validate(&optimized).map_err(|e| PipelineError::new(Phase::Optimization, e))?;
        Ok((optimized, report))
    }

    /// Execute IR to completion, returning the finished interpreter
    pub fn execute(
        &self,
        code: &[Instruction],
    ) -> Result<Interpreter, PipelineError> {
        let mut interpreter = Interpreter::with_config(code, &self.config.interpreter)
            .map_err(|e| PipelineError::new(runtime_phase(&e), e))?;
        interpreter
            .run()
            .map_err(|e| PipelineError::new(runtime_phase(&e), e))?;
        Ok(interpreter)
    }

    pub fn emit(
        &self,
        code: &[Instruction],
    ) -> Result<String, PipelineError> {
        Emitter::new(&self.config.emitter)
            .emit(code)
            .map_err(|e| PipelineError::new(Phase::Emission, e))
    }

    /// Compile and interpret `source`, returning printed lines
    pub fn run(
        &self,
        source: &str,
    ) -> Result<Vec<String>, PipelineError> {
        let compilation = self.compile(source)?;
        Ok(self.execute(&compilation.optimized)?.into_output())
    }

    /// Compile `source` to Python
    pub fn to_python(
        &self,
        source: &str,
    ) -> Result<String, PipelineError> {
        let compilation = self.compile(source)?;
        self.emit(&compilation.optimized)
    }
}

/// Broken IR is reported as an IR problem, everything else as a runtime one
fn runtime_phase(error: &InterpreterError) -> Phase {
    match error {
        InterpreterError::Structure(_) => Phase::IrGeneration,
        _ => Phase::Interpretation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::interpreter::EvalMode;

    #[test]
    fn test_run_end_to_end() {
        let out = Pipeline::default()
            .run(r#"array arr = {"A", "B", "C", "D"}; cout << arr[1:3];"#)
            .unwrap();
        assert_eq!(out, vec!["['B', 'C', 'D']"]);
    }

    #[test]
    fn test_phase_named_in_error() {
        let err = Pipeline::default().run("string s = 5;").unwrap_err();
        assert_eq!(err.phase, Phase::TypeChecking);
        assert!(err.to_string().starts_with("Type error: "));

        let err = Pipeline::default().run("int x = 1 @ 2;").unwrap_err();
        assert_eq!(err.phase, Phase::Lexing);

        let err = Pipeline::default().run("cout << ;").unwrap_err();
        assert_eq!(err.phase, Phase::Parsing);
    }

    #[test]
    fn test_strict_mode_from_config() {
        let mut config = Config::default();
        config.interpreter.mode = EvalMode::Strict;
        let err = Pipeline::new(&config).run("cout << 5 / 0;").unwrap_err();
        assert_eq!(err.phase, Phase::Interpretation);
        assert!(err.message.contains("division by zero"));

        assert_eq!(Pipeline::default().run("cout << 5 / 0;").unwrap(), vec!["0"]);
    }

    #[test]
    fn test_compilation_keeps_both_ir_versions() {
        let compilation = Pipeline::default()
            .compile(r#"string unused = "x"; cout << "hi";"#)
            .unwrap();
        assert_eq!(compilation.ir.len(), 2);
        assert_eq!(compilation.optimized.len(), 1);
        assert_eq!(compilation.report.reduction(), 1);
    }
}
