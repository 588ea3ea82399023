//! End-to-end behaviour through the library entry points

use starrlang::backends::interpreter::EvalMode;
use starrlang::middle::ir::Instruction;
use starrlang::middle::optimizer::OptLevel;
use starrlang::util::config::Config;
use starrlang::{Phase, Pipeline};

#[test]
fn test_slice_inclusivity() {
    let out = starrlang::run(r#"array arr = {"A", "B", "C", "D"}; cout << arr[1:3];"#).unwrap();
    assert_eq!(out, vec!["['B', 'C', 'D']"]);
}

#[test]
fn test_for_each_round_trip() {
    let source = r#"array names = {"Alice", "Bob"}; for (name in names) { cout << name; }"#;
    assert_eq!(starrlang::run(source).unwrap(), vec!["Alice", "Bob"]);

    let python = starrlang::emit(source).unwrap();
    assert!(python.contains("for name in names:\n    print(name)\n"));
    assert_eq!(python.matches("print(").count(), 1);
    for raw in ["iterator(", "next(", "has_next("] {
        assert!(!python.contains(raw), "{} leaked into:\n{}", raw, python);
    }
}

#[test]
fn test_dead_code_elimination_end_to_end() {
    let compilation = starrlang::compile(
        r#"string a = "First"; string b = a; string c = b; string unused = "Dead code"; cout << c;"#,
    )
    .unwrap();
    assert_eq!(
        compilation.optimized,
        vec![
            Instruction::Declare {
                ty: starrlang::frontend::parser::ast::TypeName::String,
                name: "a".into(),
                value: starrlang::middle::ir::Expr::Str("First".into()),
            },
            Instruction::Print(starrlang::middle::ir::Expr::ident("a")),
        ]
    );
    assert_eq!(compilation.report.original, 5);
    assert_eq!(compilation.report.optimized, 2);
}

#[test]
fn test_o0_keeps_generated_ir() {
    let mut config = Config::default();
    config.optimizer.level = OptLevel::O0;
    let compilation = Pipeline::new(&config)
        .compile(r#"string unused = "x"; cout << 1;"#)
        .unwrap();
    assert_eq!(compilation.ir, compilation.optimized);
    assert!(compilation.report.rounds.is_empty());
}

#[test]
fn test_errors_stop_the_pipeline() {
    let cases = [
        ("string s = \"unterminated;", Phase::Lexing),
        ("cout << arr[1:2]", Phase::Parsing),
        ("if (x) { }", Phase::Parsing),
        ("cout << missing;", Phase::TypeChecking),
        ("int x = 1; int x = 2;", Phase::TypeChecking),
        ("array a = {1, \"b\"};", Phase::TypeChecking),
    ];
    for (source, phase) in cases {
        let err = Pipeline::default().run(source).unwrap_err();
        assert_eq!(err.phase, phase, "{}: {}", source, err);
        assert!(err.to_string().contains(" error: "));
    }
}

#[test]
fn test_lenient_and_strict_out_of_range() {
    let source = r#"array a = {"x"}; cout << a[3];"#;
    assert_eq!(starrlang::run(source).unwrap(), vec!["None"]);

    let mut config = Config::default();
    config.interpreter.mode = EvalMode::Strict;
    let err = Pipeline::new(&config).run(source).unwrap_err();
    assert_eq!(err.phase, Phase::Interpretation);
    assert!(err.message.contains("out of range"), "{}", err.message);
}

#[test]
fn test_while_with_nested_for() {
    let source = r#"
        array words = {"ab", "cd"};
        int round = 0;
        while (round < 2) {
            for (w in words) { cout << w[round]; }
            round = round + 1;
        }
    "#;
    assert_eq!(starrlang::run(source).unwrap(), vec!["a", "c", "b", "d"]);
    let python = starrlang::emit(source).unwrap();
    assert!(python.contains(
        "while round < 2:\n    for w in words:\n        print(w[round])\n    round = round + 1\n"
    ));
}

#[test]
fn test_nested_loop_aliases_survive_optimization() {
    let source = r#"
        array words = {"x", "y"};
        int total = 0;
        int i = 0;
        int step = 0;
        int alias = 0;
        while (i < 3) {
            step = i;
            for (w in words) {
                total = total + step;
                alias = total;
                cout << alias;
            }
            i = i + 1;
        }
        cout << total;
    "#;
    let expected = vec!["0", "0", "1", "2", "4", "6", "6"];
    for level in [OptLevel::O0, OptLevel::O1, OptLevel::O2] {
        let mut config = Config::default();
        config.optimizer.level = level;
        assert_eq!(Pipeline::new(&config).run(source).unwrap(), expected, "{}", level);
    }

    let python = starrlang::emit(source).unwrap();
    assert!(python.contains("while i < 3:\n    step = i\n    for w in words:\n"), "{}", python);
}

#[test]
fn test_emitter_respects_config() {
    let mut config = Config::default();
    config.emitter.header = false;
    config.emitter.indent_width = 2;
    let python = Pipeline::new(&config)
        .to_python(r#"array xs = {"a"}; for (x in xs) { cout << x; }"#)
        .unwrap();
    assert_eq!(python, "xs = [\"a\"]\nfor x in xs:\n  print(x)\n");
}

#[test]
fn test_samples_run_at_every_level() {
    for level in [OptLevel::O0, OptLevel::O1, OptLevel::O2] {
        let mut config = Config::default();
        config.optimizer.level = level;
        let pipeline = Pipeline::new(&config);
        let baseline = Pipeline::default();
        for sample in starrlang::samples::SAMPLES {
            assert_eq!(
                pipeline.run(sample.source).unwrap(),
                baseline.run(sample.source).unwrap(),
                "{} at {}",
                sample.name,
                level
            );
        }
    }
}

#[test]
fn test_run_file_reports_missing_file() {
    let err = starrlang::run_file(std::path::Path::new("no/such/file.starr")).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to read file"));
}
