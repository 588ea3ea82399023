//! Starrlang - CLI

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use starrlang::backends::interpreter::EvalMode;
use starrlang::frontend::{parse, tokenize};
use starrlang::middle::ir::text::parse_program;
use starrlang::middle::ir::{format_program, Instruction};
use starrlang::middle::optimizer::OptLevel;
use starrlang::samples::{self, Sample};
use starrlang::util::config::discover_config;
use starrlang::util::logger;
use starrlang::{Pipeline, NAME, VERSION};
use std::fs;
use std::path::{Path, PathBuf};

/// Educational compiler pipeline: IR, optimizer, interpreter and Python emitter
#[derive(Parser, Debug)]
#[command(name = "starrlang")]
#[command(author = "Starrlang Team")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (default: ./starrlang.toml if present)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Optimization level: O0, O1 or O2
    #[arg(short = 'O', value_name = "LEVEL", global = true)]
    opt_level: Option<OptLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile and interpret a source file
    Run {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the final variable store
        #[arg(long)]
        vars: bool,

        /// Stop on evaluation errors instead of degrading
        #[arg(long)]
        strict: bool,
    },

    /// Compile a source file to Python
    Emit {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },

    /// Print the IR of a source file
    Ir {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the optimized IR instead of the generated one
        #[arg(long)]
        optimized: bool,

        /// Print the optimization report
        #[arg(long)]
        report: bool,

        /// Print instructions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the token stream
    Tokens {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the syntax tree
    Ast {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Type check a source file and print its symbol table
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the symbol table as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interpret a textual IR file
    IrRun {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Optimize before running
        #[arg(long)]
        optimize: bool,
    },

    /// Translate a textual IR file to Python
    IrEmit {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Evaluate code from the command line
    Eval {
        #[arg(value_name = "CODE")]
        code: String,
    },

    /// Run the built-in sample programs
    Samples {
        /// Only this sample
        #[arg(value_name = "NAME")]
        name: Option<String>,
    },

    /// Print version information
    Version,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_cli(args.verbose);

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let mut config = discover_config(args.config.as_deref(), &cwd)?;
    if let Some(level) = args.opt_level {
        config.optimizer.level = level;
    }

    match args.command {
        Commands::Run { file, vars, strict } => {
            if strict {
                config.interpreter.mode = EvalMode::Strict;
            }
            let pipeline = Pipeline::new(&config);
            let source = read(&file)?;
            let compilation = pipeline
                .compile(&source)
                .with_context(|| format!("Failed to compile: {}", file.display()))?;
            let interpreter = pipeline
                .execute(&compilation.optimized)
                .with_context(|| format!("Failed to run: {}", file.display()))?;
            print_lines(interpreter.output());
            if vars {
                println!("{}", "--- Variables ---".bold());
                for (name, value) in interpreter.variables() {
                    println!("{} = {}", name, value.repr());
                }
            }
        }
        Commands::Emit { file, output } => {
            let python = Pipeline::new(&config)
                .to_python(&read(&file)?)
                .with_context(|| format!("Failed to emit: {}", file.display()))?;
            match output {
                Some(out) => fs::write(&out, python)
                    .with_context(|| format!("Failed to write: {}", out.display()))?,
                None => print!("{}", python),
            }
        }
        Commands::Ir {
            file,
            optimized,
            report,
            json,
        } => {
            let compilation = Pipeline::new(&config)
                .compile(&read(&file)?)
                .with_context(|| format!("Failed to compile: {}", file.display()))?;
            let code = if optimized {
                &compilation.optimized
            } else {
                &compilation.ir
            };
            print_ir(code, json)?;
            if report {
                print!("{}", compilation.report);
            }
        }
        Commands::Tokens { file } => {
            let tokens = tokenize(&read(&file)?)
                .with_context(|| format!("Failed to tokenize: {}", file.display()))?;
            for token in tokens {
                let position = token.span.start.to_string();
                let kind = token.kind.to_string();
                println!("{:<8} {:<16} {}", position, kind, token.text);
            }
        }
        Commands::Ast { file } => {
            let tokens = tokenize(&read(&file)?)
                .with_context(|| format!("Failed to tokenize: {}", file.display()))?;
            let program =
                parse(&tokens).with_context(|| format!("Failed to parse: {}", file.display()))?;
            print!("{}", program.to_tree());
        }
        Commands::Check { file, json } => {
            let (_, _, symbols) = Pipeline::new(&config)
                .analyze(&read(&file)?)
                .with_context(|| format!("Failed to check: {}", file.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&symbols)?);
            } else {
                for (name, ty) in symbols.iter() {
                    println!("{}: {}", name, ty);
                }
                eprintln!("{}", "Check passed!".green());
            }
        }
        Commands::IrRun { file, optimize } => {
            let pipeline = Pipeline::new(&config);
            let mut code = read_ir(&file)?;
            if optimize {
                code = pipeline.optimize(&code)?.0;
            }
            let interpreter = pipeline
                .execute(&code)
                .with_context(|| format!("Failed to run: {}", file.display()))?;
            print_lines(interpreter.output());
        }
        Commands::IrEmit { file } => {
            let code = read_ir(&file)?;
            print!("{}", Pipeline::new(&config).emit(&code)?);
        }
        Commands::Eval { code } => {
            let output = Pipeline::new(&config)
                .run(&code)
                .context("Failed to evaluate code")?;
            print_lines(&output);
        }
        Commands::Samples { name } => {
            let selected: Vec<&Sample> = match name {
                Some(name) => match samples::find(&name) {
                    Some(sample) => vec![sample],
                    None => bail!("Unknown sample '{}'", name),
                },
                None => samples::SAMPLES.iter().collect(),
            };
            let pipeline = Pipeline::new(&config);
            for sample in selected {
                show_sample(&pipeline, sample)?;
            }
        }
        Commands::Version => {
            println!("{} {}", NAME, VERSION);
        }
    }

    Ok(())
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

fn read_ir(path: &Path) -> Result<Vec<Instruction>> {
    let text = read(path)?;
    parse_program(&text).with_context(|| format!("Failed to parse IR: {}", path.display()))
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

fn print_ir(
    code: &[Instruction],
    json: bool,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(code)?);
    } else {
        print!("{}", format_program(code));
    }
    Ok(())
}

fn show_sample(
    pipeline: &Pipeline,
    sample: &Sample,
) -> Result<()> {
    println!("{}", format!("=== {} ===", sample.name).bold().cyan());
    println!("{}", sample.source);

    let compilation = pipeline
        .compile(sample.source)
        .with_context(|| format!("Sample '{}' failed to compile", sample.name))?;
    println!("{}", "--- Optimized IR ---".bold());
    print!("{}", format_program(&compilation.optimized));
    print!("{}", compilation.report);

    println!("{}", "--- Output ---".bold());
    print_lines(pipeline.execute(&compilation.optimized)?.output());

    println!("{}", "--- Python ---".bold());
    print!("{}", pipeline.emit(&compilation.optimized)?);
    println!();
    Ok(())
}
