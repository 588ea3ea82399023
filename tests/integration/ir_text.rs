//! Persisted IR text

use starrlang::backends::emitter::emit;
use starrlang::backends::interpreter::run;
use starrlang::middle::ir::text::parse_program;
use starrlang::middle::ir::{format_program, IrError};
use starrlang::samples::SAMPLES;

#[test]
fn test_sample_ir_reloads_with_same_behaviour() {
    for sample in SAMPLES {
        let compilation = starrlang::compile(sample.source).unwrap();
        let text = format_program(&compilation.optimized);
        let reloaded = parse_program(&text).unwrap();
        assert_eq!(reloaded, compilation.optimized, "{}", sample.name);
        assert_eq!(
            run(&reloaded).unwrap(),
            starrlang::run(sample.source).unwrap(),
            "{}",
            sample.name
        );
    }
}

#[test]
fn test_hand_written_ir() {
    let text = "\
int n = 3
L0:
t0 = n > 0
if t0 goto L1
goto L2
L1:
print n
t1 = n - 1
n = t1
goto L0
L2:
";
    let code = parse_program(text).unwrap();
    assert_eq!(run(&code).unwrap(), vec!["3", "2", "1"]);
    let python = emit(&code).unwrap();
    assert!(python.contains("while n > 0:\n    print(n)\n    n = n - 1\n"));
}

#[test]
fn test_temp_shaped_variable_survives_save_and_reload() {
    let source = "int t0 = 1; t0 = t0 + 1; cout << t0;";
    let compilation = starrlang::compile(source).unwrap();
    let reloaded = parse_program(&format_program(&compilation.optimized)).unwrap();
    assert_eq!(reloaded, compilation.optimized);
    assert_eq!(run(&reloaded).unwrap(), vec!["2"]);

    let direct = emit(&compilation.optimized).unwrap();
    assert_eq!(emit(&reloaded).unwrap(), direct);
    assert!(direct.ends_with("t0 = 1\nt0 = t0 + 1\nprint(t0)\n"), "{}", direct);
}

#[test]
fn test_malformed_line_reports_position() {
    let err = parse_program("print 1\nthis is not ir\n").unwrap_err();
    assert!(matches!(err, IrError::Malformed { line: 2, .. }), "{:?}", err);
}
