//! Malformed input must come back as an error, never a panic

use colcalc_formula::{
    evaluate, parse_formula, tokenize, Environment, FormulaValue, MAX_NESTING_DEPTH,
};
use proptest::prelude::*;

fn env() -> Environment {
    Environment::new()
        .with("A", 3i64)
        .with("B", "text")
        .with("C", 0.5)
        .with("D", FormulaValue::Nil)
}

#[test]
fn deeply_nested_formula_is_an_error_marker() {
    for depth in [MAX_NESTING_DEPTH + 1, 2_000, 50_000] {
        let formula = format!("={}{{A}}{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(
            evaluate(&formula, &env()),
            FormulaValue::text("#ERROR: Formula is nested too deeply")
        );
    }

    let within = format!(
        "={}{{A}}{}",
        "(".repeat(MAX_NESTING_DEPTH),
        ")".repeat(MAX_NESTING_DEPTH)
    );
    assert_eq!(evaluate(&within, &env()), FormulaValue::Integer(3));
}

#[test]
fn long_operator_chain_is_an_error_marker() {
    let long = format!("=1{}", "+1".repeat(100_000));
    assert!(evaluate(&long, &env()).is_error_marker());

    let concat = format!("={}", "{B} & ".repeat(10_000) + "{B}");
    assert!(evaluate(&concat, &env()).is_error_marker());

    let short = format!("=0{}", "+1".repeat(MAX_NESTING_DEPTH));
    assert_eq!(evaluate(&short, &env()), FormulaValue::Integer(MAX_NESTING_DEPTH as i64));
}

proptest! {
    #[test]
    fn tokenize_never_panics(input in "\\PC*") {
        let _ = tokenize(&input);
    }

    #[test]
    fn parse_never_panics(input in "\\PC*") {
        let _ = parse_formula(&format!("={}", input));
    }

    #[test]
    fn formula_shaped_input_never_panics(
        input in r#"[-+*/&=<>!(),\[\]{}"0-9.A-D ]{0,40}|(IF|SUM|LEFT|SPLIT|ROUND|DATE)\([{}A-D0-9, "-]{0,20}\)"#
    ) {
        let _ = parse_formula(&format!("={}", input));
        let _ = evaluate(&format!("={}", input), &env());
    }

    #[test]
    fn evaluate_never_panics(input in "\\PC*") {
        let result = evaluate(&format!("={}", input), &env());
        // Either a value or an error marker, nothing else to check
        let _ = result.is_error_marker();
    }

    #[test]
    fn numeric_functions_never_panic(a in any::<i64>(), b in any::<i64>()) {
        for name in ["ROUND", "SPLIT(\"a,b\", \",\",", "LEFT(\"abc\",", "MIN", "MAX", "SUM"] {
            let formula = if name.ends_with(',') {
                format!("={}{})", name, a)
            } else {
                format!("={}({}, {})", name, a, b)
            };
            let _ = evaluate(&formula, &env());
        }
        let _ = evaluate(&format!("={} / {}", a, b), &env());
        let _ = evaluate(&format!("={} * {} - {}", a, b, a), &env());
        let _ = evaluate(&format!("=DATE({}, {}, {})", a, b, a), &env());
    }
}
