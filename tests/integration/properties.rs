//! Property tests over generated programs
//!
//! Programs are built from a fixed prelude plus random statements that always
//! type check and always terminate: reassignments only add or subtract so no
//! value overflows, and every while loop counts its own fresh variable up to a
//! small bound. One compound statement nests a for-each inside a while loop.

use proptest::prelude::*;
use starrlang::backends::emitter::emit;
use starrlang::backends::interpreter::run;
use starrlang::middle::ir::text::parse_program;
use starrlang::middle::ir::{format_program, is_temp_name, Instruction};
use starrlang::middle::optimizer::{OptLevel, Optimizer};
use starrlang::middle::validate::validate;
use std::collections::HashSet;

const PRELUDE: &str = r#"
int a = 3;
int b = 7;
string s = "ab";
array xs = {"p", "q", "r"};
array ns = {1, 2, 3};
"#;

fn literal() -> impl Strategy<Value = String> {
    (0i64..10).prop_map(|n| n.to_string())
}

/// Additive expression over `var` and literals, at most four leaves
fn additive(var: &'static str) -> impl Strategy<Value = String> {
    let leaf = prop_oneof![Just(var.to_string()), literal()];
    leaf.prop_recursive(2, 4, 2, |inner| {
        (inner.clone(), prop_oneof![Just("+"), Just("-")], inner)
            .prop_map(|(l, op, r)| format!("({} {} {})", l, op, r))
    })
}

/// Printable expression; may multiply or divide since it is never stored
fn printable() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![Just("a".to_string()), Just("b".to_string()), literal()];
    leaf.prop_recursive(2, 4, 2, |inner| {
        (
            inner.clone(),
            prop_oneof![Just("+"), Just("-"), Just("*"), Just("/")],
            inner,
        )
            .prop_map(|(l, op, r)| format!("{} {} {}", l, op, r))
    })
}

/// One statement; `#` is replaced by the statement's index
fn statement() -> impl Strategy<Value = String> {
    prop_oneof![simple_statement(), compound_statement()]
}

fn simple_statement() -> impl Strategy<Value = String> {
    prop_oneof![
        printable().prop_map(|e| format!("cout << {};", e)),
        additive("b").prop_map(|e| format!("a = {};", e)),
        additive("a").prop_map(|e| format!("b = {};", e)),
        Just("cout << s;".to_string()),
        Just("s = s + \"x\";".to_string()),
        (0i64..3, 0i64..3).prop_map(|(i, j)| {
            let (i, j) = (i.min(j), i.max(j));
            format!("cout << xs[{}:{}];", i, j)
        }),
    ]
}

fn compound_statement() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("for (v in xs) { cout << v; }".to_string()),
        Just("for (n in ns) { a = a + n; }".to_string()),
        (1i64..4).prop_map(|k| format!(
            "int w# = 0; while (w# < {}) {{ w# = w# + 1; cout << a; }}",
            k
        )),
        (1i64..3).prop_map(|k| format!(
            "int m# = 0; while (m# < {}) {{ m# = m# + 1; for (v in xs) {{ cout << v; b = b + m#; }} }}",
            k
        )),
        printable().prop_map(|e| "int u# = ".to_string() + &e + ";"),
        Just("int c# = a; cout << c#;".to_string()),
        Just("string d# = s; string e# = d#; cout << e#;".to_string()),
    ]
}

fn program() -> impl Strategy<Value = String> {
    prop::collection::vec(statement(), 0..16).prop_map(|stmts| {
        let body: Vec<String> = stmts
            .iter()
            .enumerate()
            .map(|(i, stmt)| stmt.replace('#', &i.to_string()))
            .collect();
        format!("{}{}", PRELUDE, body.join("\n"))
    })
}

fn lower(source: &str) -> Vec<Instruction> {
    starrlang::compile(source)
        .unwrap_or_else(|e| panic!("{}\n{}", e, source))
        .ir
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_optimizer_is_idempotent(source in program()) {
        let ir = lower(&source);
        for level in [OptLevel::O1, OptLevel::O2] {
            let optimizer = Optimizer::with_level(level);
            let (once, _) = optimizer.optimize(&ir);
            let (twice, report) = optimizer.optimize(&once);
            prop_assert_eq!(&once, &twice);
            prop_assert!(!report.changed());
        }
    }

    #[test]
    fn prop_optimizer_never_grows(source in program()) {
        let ir = lower(&source);
        let (optimized, report) = Optimizer::with_level(OptLevel::O2).optimize(&ir);
        prop_assert!(optimized.len() <= ir.len());
        prop_assert_eq!(report.original - report.reduction(), optimized.len());
    }

    #[test]
    fn prop_labels_stay_intact(source in program()) {
        let (optimized, _) = Optimizer::default().optimize(&lower(&source));
        prop_assert!(validate(&optimized).is_ok());

        let targets: HashSet<&str> = optimized.iter().filter_map(Instruction::jump_target).collect();
        for label in optimized.iter().filter_map(Instruction::label) {
            prop_assert!(targets.contains(label), "unreferenced label {}", label);
        }
    }

    #[test]
    fn prop_optimization_preserves_output(source in program()) {
        let ir = lower(&source);
        let expected = run(&ir).unwrap();
        for level in [OptLevel::O1, OptLevel::O2] {
            let (optimized, _) = Optimizer::with_level(level).optimize(&ir);
            prop_assert_eq!(&run(&optimized).unwrap(), &expected, "{}", source);
        }
    }

    #[test]
    fn prop_emitter_hides_internals(source in program()) {
        let (optimized, _) = Optimizer::default().optimize(&lower(&source));
        let python = emit(&optimized).unwrap();
        prop_assert!(!python.contains("has_next("));
        prop_assert!(!python.contains("goto"));
        for word in python.split(|c: char| !c.is_ascii_alphanumeric() && c != '_') {
            prop_assert!(!is_temp_name(word), "temporary {} in\n{}", word, python);
        }
    }

    #[test]
    fn prop_saved_ir_emits_the_same_python(source in program()) {
        let (optimized, _) = Optimizer::default().optimize(&lower(&source));
        let reloaded = parse_program(&format_program(&optimized)).unwrap();
        prop_assert_eq!(&reloaded, &optimized);
        prop_assert_eq!(emit(&reloaded).unwrap(), emit(&optimized).unwrap());
    }
}
