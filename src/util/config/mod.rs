//! Starrlang configuration system
//!
//! Project-level configuration with defaults for every field.
//!
//! # Configuration hierarchy
//!
//! ```text
//! Priority (high → low):
//! 1. CLI arguments
//! 2. Explicit config file (--config)
//! 3. Project-level (./starrlang.toml)
//! 4. Default values
//! ```
//!
//! # Example
//!
//! ```toml
//! [optimizer]
//! level = "O2"
//! max_rounds = 8
//!
//! [interpreter]
//! mode = "strict"
//!
//! [emitter]
//! indent_width = 2
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::backends::interpreter::EvalMode;
use crate::middle::optimizer::OptLevel;

/// Project config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "starrlang.toml";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Optimizer settings
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    /// Interpreter settings
    #[serde(default)]
    pub interpreter: InterpreterConfig,
    /// Emitter settings
    #[serde(default)]
    pub emitter: EmitterConfig,
}

/// Optimizer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Optimization level
    #[serde(default)]
    pub level: OptLevel,
    /// Upper bound on whole-pipeline rounds before giving up on a fixed point
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,
    /// Upper bound on liveness iterations inside dead-code elimination
    #[serde(default = "default_max_liveness_iterations")]
    pub max_liveness_iterations: usize,
}

fn default_max_rounds() -> usize {
    16
}

fn default_max_liveness_iterations() -> usize {
    64
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            level: OptLevel::default(),
            max_rounds: default_max_rounds(),
            max_liveness_iterations: default_max_liveness_iterations(),
        }
    }
}

/// Interpreter configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InterpreterConfig {
    /// Lenient (sentinel) or strict (typed error) evaluation
    #[serde(default)]
    pub mode: EvalMode,
}

/// Emitter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitterConfig {
    /// Spaces per indentation level
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,
    /// Emit the `# Generated Python Code` header
    #[serde(default = "default_header")]
    pub header: bool,
    /// How far past a while header the back edge is searched for
    #[serde(default = "default_while_lookahead")]
    pub while_lookahead: usize,
}

fn default_indent_width() -> usize {
    4
}

fn default_header() -> bool {
    true
}

fn default_while_lookahead() -> usize {
    512
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            indent_width: default_indent_width(),
            header: default_header(),
            while_lookahead: default_while_lookahead(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Config parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(
        content: &str,
        origin: &Path,
    ) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Render configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = Config::from_toml(&content, path)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Project config path inside `dir`
pub fn project_config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Resolve configuration: explicit file, else `starrlang.toml` in `dir`, else defaults
pub fn discover_config(
    explicit: Option<&Path>,
    dir: &Path,
) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return load_config(path);
    }

    let project = project_config_path(dir);
    if project.exists() {
        return load_config(&project);
    }

    Ok(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = Config::from_toml("", Path::new("empty.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.optimizer.level, OptLevel::O1);
        assert_eq!(config.optimizer.max_rounds, 16);
        assert_eq!(config.interpreter.mode, EvalMode::Lenient);
        assert_eq!(config.emitter.indent_width, 4);
        assert!(config.emitter.header);
    }

    #[test]
    fn test_partial_sections() {
        let text = r#"
            [optimizer]
            level = "O2"

            [interpreter]
            mode = "strict"
        "#;
        let config = Config::from_toml(text, Path::new("starrlang.toml")).unwrap();
        assert_eq!(config.optimizer.level, OptLevel::O2);
        assert_eq!(config.optimizer.max_liveness_iterations, 64);
        assert_eq!(config.interpreter.mode, EvalMode::Strict);
        assert_eq!(config.emitter.while_lookahead, 512);
    }

    #[test]
    fn test_malformed_file_reports_path() {
        let err = Config::from_toml("[optimizer\nlevel=", Path::new("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = Config::default();
        config.optimizer.level = OptLevel::O0;
        config.emitter.header = false;
        let text = config.to_toml().unwrap();
        let back = Config::from_toml(&text, Path::new("x.toml")).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_discover_prefers_project_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            project_config_path(dir.path()),
            "[emitter]\nindent_width = 2\n",
        )
        .unwrap();
        let config = discover_config(None, dir.path()).unwrap();
        assert_eq!(config.emitter.indent_width, 2);

        let empty = tempfile::tempdir().unwrap();
        assert_eq!(discover_config(None, empty.path()).unwrap(), Config::default());
    }
}
