//! Starrlang
//!
//! An educational compiler pipeline for a small imperative language: typed
//! declarations, strings, integers, arrays with inclusive slicing, for-each
//! and while loops, and `cout` printing.
//!
//! ```text
//! source -> lexer -> parser -> typecheck -> IR generator -> optimizer
//!                                                              |
//!                                                  +-----------+-----------+
//!                                                  |                       |
//!                                             interpreter           Python emitter
//! ```
//!
//! # Example
//!
//! ```no_run
//! use starrlang::{run, Result};
//!
//! fn main() -> Result<()> {
//!     let output = run(r#"array names = {"Alice", "Bob"}; for (n in names) { cout << n; }"#)?;
//!     assert_eq!(output, vec!["Alice", "Bob"]);
//!     Ok(())
//! }
//! ```

#![warn(rust_2018_idioms)]

pub mod backends;
pub mod frontend;
pub mod middle;
pub mod pipeline;
pub mod samples;

// Utility modules
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};
pub use pipeline::{Compilation, Phase, Pipeline, PipelineError};
pub use thiserror::Error;

use std::fs;
use std::path::Path;
use tracing::debug;

/// Language version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Language name
pub const NAME: &str = "Starrlang";

/// Compile source code through optimization with default settings
pub fn compile(source: &str) -> Result<Compilation> {
    Ok(Pipeline::default().compile(source)?)
}

/// Compile and interpret source code, returning the printed lines
pub fn run(source: &str) -> Result<Vec<String>> {
    debug!("run called on {} bytes of source", source.len());
    Ok(Pipeline::default().run(source)?)
}

/// Compile source code to Python
pub fn emit(source: &str) -> Result<String> {
    Ok(Pipeline::default().to_python(source)?)
}

/// Run a source file
pub fn run_file(path: &Path) -> Result<Vec<String>> {
    debug!("Running file {}", path.display());
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    run(&source).with_context(|| format!("Failed to run: {}", path.display()))
}

/// Compile a source file to Python
pub fn emit_file(path: &Path) -> Result<String> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    emit(&source).with_context(|| format!("Failed to emit: {}", path.display()))
}
