use super::*;
use crate::frontend::{check, parse, tokenize};
use crate::middle::ir::format_program;
use crate::middle::ir_gen::generate;
use crate::middle::validate::validate;

fn lower(source: &str) -> Vec<Instruction> {
    let program = parse(&tokenize(source).unwrap()).unwrap();
    let symbols = check(&program).unwrap();
    generate(&program, &symbols)
}

#[test]
fn test_unused_declaration_removed() {
    let ir = lower(r#"string unused = "X"; string s = "hello"; cout << s;"#);
    let optimized = optimize(&ir);
    assert!(optimized.iter().all(|i| i.target() != Some("unused")));
    assert_eq!(format_program(&optimized), "string s = \"hello\"\nprint s\n");
}

#[test]
fn test_alias_chain_collapses() {
    let ir = lower(r#"string a = "x"; string b = a; string c = b; cout << c;"#);
    let optimized = optimize(&ir);
    assert_eq!(format_program(&optimized), "string a = \"x\"\nprint a\n");
}

#[test]
fn test_for_each_shape_survives() {
    let source = r#"array names = {"Alice", "Bob"}; for (name in names) { cout << name; }"#;
    let ir = lower(source);
    let optimized = optimize(&ir);
    assert_eq!(optimized, ir);
}

#[test]
fn test_unused_loop_variable_still_iterates() {
    let ir = lower(r#"array a = {"x", "y"}; int n = 0; for (v in a) { n = n + 1; } cout << n;"#);
    let optimized = optimize(&ir);
    assert!(optimized
        .iter()
        .any(|i| matches!(i, Instruction::Declare { value: crate::middle::ir::Expr::Next(_), .. })));
    assert!(validate(&optimized).is_ok());
}

#[test]
fn test_idempotent() {
    let ir = lower(
        r#"array arr = {"A", "B", "C", "D"}; string unused = "X"; array copy = arr[1:3]; string s = "hello"; string part = s[1:3];
           int i = 0; int j = i; while (j < 2) { j = j + 1; cout << j; }
           for (x in arr) { string y = x; cout << y; } cout << copy; cout << part;"#,
    );
    let once = optimize(&ir);
    assert!(once.len() < ir.len());
    let twice = optimize(&once);
    assert_eq!(once, twice);
    assert!(validate(&once).is_ok());
}

#[test]
fn test_o0_is_identity() {
    let ir = lower(r#"string unused = "X";"#);
    let (out, report) = Optimizer::with_level(OptLevel::O0).optimize(&ir);
    assert_eq!(out, ir);
    assert!(report.rounds.is_empty());
    assert!(report.converged);
}

#[test]
fn test_report_counts_and_rounds() {
    let ir = lower(r#"string unused = "X"; string s = "a"; cout << s;"#);
    let (out, report) = Optimizer::default().optimize(&ir);
    assert_eq!(report.original, 3);
    assert_eq!(report.optimized, out.len());
    assert_eq!(report.reduction(), 1);
    assert!(report.converged);
    assert!(report.changed());
    // last round is the one that confirmed the fixed point
    assert!(report.rounds.last().unwrap().iter().all(|r| !r.changed));
    let names: Vec<_> = report.rounds[0].iter().map(|r| r.pass.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "dead-code-elimination",
            "constant-folding",
            "copy-propagation",
            "redundant-label-removal",
            "unreachable-code-removal"
        ]
    );
    let text = report.to_string();
    assert!(text.contains("Original instructions:  3"));
    assert!(text.contains("Reduction: 1"));
}

#[test]
fn test_o2_adds_jump_removal() {
    let passes = Optimizer::with_level(OptLevel::O2).passes();
    assert!(passes.iter().any(|p| p.name() == "redundant-jump-removal"));
    let code = crate::middle::ir::text::parse_program("print 1\ngoto L0\nL0:\nprint 2\n").unwrap();
    let (out, _) = Optimizer::with_level(OptLevel::O2).optimize(&code);
    assert_eq!(format_program(&out), "print 1\nprint 2\n");
    let (out, _) = Optimizer::with_level(OptLevel::O1).optimize(&code);
    assert_eq!(format_program(&out), "print 1\ngoto L0\nL0:\nprint 2\n");
}

#[test]
fn test_round_bound_reports_unconverged() {
    let config = OptimizerConfig {
        max_rounds: 1,
        ..Default::default()
    };
    let ir = lower(r#"string a = "x"; string b = a; cout << b;"#);
    let (_, report) = Optimizer::new(&config).optimize(&ir);
    assert_eq!(report.rounds.len(), 1);
    assert!(!report.converged);
}

#[test]
fn test_opt_level_parsing() {
    assert_eq!("2".parse::<OptLevel>(), Ok(OptLevel::O2));
    assert_eq!("O0".parse::<OptLevel>(), Ok(OptLevel::O0));
    assert!("3".parse::<OptLevel>().is_err());
}
