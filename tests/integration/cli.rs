//! The `starrlang` binary

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const FOR_EACH: &str = r#"array names = {"Alice", "Bob"};
for (name in names) {
    cout << name;
}
"#;

fn starrlang(
    dir: &Path,
    args: &[&str],
) -> Output {
    Command::new(env!("CARGO_BIN_EXE_starrlang"))
        .args(args)
        .current_dir(dir)
        .env_remove("STARRLANG_LOG")
        .output()
        .expect("failed to spawn starrlang")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn workspace(source: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.starr"), source).unwrap();
    dir
}

#[test]
fn test_run_prints_output() {
    let dir = workspace(FOR_EACH);
    let output = starrlang(dir.path(), &["run", "main.starr"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "Alice\nBob\n");
}

#[test]
fn test_run_vars_lists_store() {
    let dir = workspace("int x = 2; string s = \"hi\"; cout << x;");
    let output = starrlang(dir.path(), &["run", "main.starr", "--vars", "-O", "O0"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("2\n"));
    assert!(text.contains("x = 2\n"));
    assert!(text.contains("s = 'hi'\n"));
}

#[test]
fn test_strict_flag_fails_on_division_by_zero() {
    let dir = workspace("cout << 1 / 0;");
    assert_eq!(stdout(&starrlang(dir.path(), &["run", "main.starr"])), "0\n");

    let output = starrlang(dir.path(), &["run", "main.starr", "--strict"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("division by zero"));
}

#[test]
fn test_emit_to_file() {
    let dir = workspace(FOR_EACH);
    let output = starrlang(dir.path(), &["emit", "main.starr", "-o", "out.py"]);
    assert!(output.status.success());
    let python = fs::read_to_string(dir.path().join("out.py")).unwrap();
    assert!(python.starts_with("# Generated Python Code\n"));
    assert!(python.contains("for name in names:\n    print(name)\n"));
}

#[test]
fn test_project_config_is_discovered() {
    let dir = workspace(FOR_EACH);
    fs::write(
        dir.path().join("starrlang.toml"),
        "[emitter]\nheader = false\nindent_width = 2\n",
    )
    .unwrap();
    let output = starrlang(dir.path(), &["emit", "main.starr"]);
    assert_eq!(
        stdout(&output),
        "names = [\"Alice\", \"Bob\"]\nfor name in names:\n  print(name)\n"
    );
}

#[test]
fn test_malformed_config_is_an_error() {
    let dir = workspace(FOR_EACH);
    fs::write(dir.path().join("custom.toml"), "[optimizer]\nlevel = \"O9\"\n").unwrap();
    let output = starrlang(dir.path(), &["--config", "custom.toml", "run", "main.starr"]);
    assert!(!output.status.success());
}

#[test]
fn test_ir_round_trips_through_ir_run() {
    let dir = workspace(FOR_EACH);
    let output = starrlang(dir.path(), &["ir", "main.starr", "--optimized"]);
    assert!(output.status.success());
    let ir = stdout(&output);
    assert!(ir.contains("if has_next(t0) goto L1\n"));
    fs::write(dir.path().join("main.ir"), &ir).unwrap();

    let run = starrlang(dir.path(), &["ir-run", "main.ir"]);
    assert_eq!(stdout(&run), "Alice\nBob\n");
    let emitted = starrlang(dir.path(), &["ir-emit", "main.ir"]);
    assert!(stdout(&emitted).contains("for name in names:"));
}

#[test]
fn test_ir_json_and_report() {
    let dir = workspace("string unused = \"x\"; cout << 1;");
    let output = starrlang(dir.path(), &["ir", "main.starr", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed.as_array().map(Vec::len), Some(2));

    let output = starrlang(dir.path(), &["ir", "main.starr", "--optimized", "--report"]);
    let text = stdout(&output);
    assert!(text.starts_with("print 1\n"));
    assert!(text.contains("Original instructions:  2"));
    assert!(text.contains("Optimized instructions: 1"));
}

#[test]
fn test_check_reports_type_errors() {
    let dir = workspace("int x = \"nope\";");
    let output = starrlang(dir.path(), &["check", "main.starr"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Type error"));

    let dir = workspace("int x = 1; array a = {\"s\"};");
    let output = starrlang(dir.path(), &["check", "main.starr"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "x: int\na: array<string>\n");
}

#[test]
fn test_eval_and_samples() {
    let dir = tempfile::tempdir().unwrap();
    let output = starrlang(dir.path(), &["eval", "string m = \"Hello World\"; cout << m[0:4];"]);
    assert_eq!(stdout(&output), "Hello\n");

    let output = starrlang(dir.path(), &["samples", "dead code test"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("['X', 'Y', 'Z']"));

    let output = starrlang(dir.path(), &["samples", "nope"]);
    assert!(!output.status.success());
}
