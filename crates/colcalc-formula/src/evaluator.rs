//! Formula evaluator
//!
//! Walks a formula AST against an [`Environment`]. Errors propagate with `?`
//! up to [`evaluate`], the single place where they become `#ERROR: ` text.

use std::cmp::Ordering;

use crate::ast::{BinaryOperator, Expr, UnaryOperator};
use crate::environment::Environment;
use crate::error::{FormulaError, FormulaResult};
use crate::functions::Function;
use crate::parser::parse_formula;
use crate::template::evaluate_template;
use crate::value::FormulaValue;

/// Prefix of the text returned for a failed formula
pub const ERROR_PREFIX: &str = "#ERROR: ";

/// Check if stored or returned text is an error marker
pub fn is_error_marker(text: &str) -> bool {
    text.starts_with(ERROR_PREFIX)
}

/// `#ERROR: <message>` text for a failed formula
pub fn error_marker(error: &FormulaError) -> FormulaValue {
    FormulaValue::Text(format!("{}{}", ERROR_PREFIX, error))
}

/// Evaluate a formula or template against an environment
///
/// Text starting with `=` is a formula; anything else is a template. A
/// failing formula yields `#ERROR: <message>` text instead of an error.
///
/// # Example
/// ```rust
/// use colcalc_formula::{evaluate, Environment, FormulaValue};
///
/// let env = Environment::new().with("Price", 20i64).with("Qty", 3i64);
/// assert_eq!(evaluate("={Price} * {Qty}", &env), FormulaValue::Integer(60));
/// assert_eq!(evaluate("{Qty} items", &env), FormulaValue::text("3 items"));
/// assert!(evaluate("={Price} / 0", &env).is_error_marker());
/// ```
pub fn evaluate(formula: &str, env: &Environment) -> FormulaValue {
    match try_evaluate(formula, env) {
        Ok(value) => value,
        Err(e) => error_marker(&e),
    }
}

/// Evaluate a formula or template, keeping the structured error
pub fn try_evaluate(formula: &str, env: &Environment) -> FormulaResult<FormulaValue> {
    if formula.starts_with('=') {
        let expr = parse_formula(formula)?;
        evaluate_node(&expr, env)
    } else {
        Ok(FormulaValue::Text(evaluate_template(formula, env)))
    }
}

/// Evaluate a parsed expression
pub fn evaluate_node(expr: &Expr, env: &Environment) -> FormulaResult<FormulaValue> {
    match expr {
        // === Literals ===
        Expr::Number(n) => Ok((*n).into()),
        Expr::String(s) => Ok(FormulaValue::Text(s.clone())),
        Expr::Boolean(b) => Ok(FormulaValue::Boolean(*b)),

        // === References ===
        Expr::ColumnRef(r) => Ok(env.lookup(&r.name, r.index)),

        // === Operators ===
        Expr::BinaryOp { op, left, right } => evaluate_binary_op(*op, left, right, env),
        Expr::UnaryOp { op, operand } => evaluate_unary_op(*op, operand, env),

        // === Functions ===
        Expr::Function { name, args } => evaluate_function(name, args, env),
    }
}

/// Evaluate a binary operation
fn evaluate_binary_op(
    op: BinaryOperator,
    left: &Expr,
    right: &Expr,
    env: &Environment,
) -> FormulaResult<FormulaValue> {
    // Evaluate operands first
    let left_val = evaluate_node(left, env)?;
    let right_val = evaluate_node(right, env)?;

    match op {
        // Arithmetic operators
        BinaryOperator::Add => Ok(left_val.to_number().add(right_val.to_number()).into()),
        BinaryOperator::Subtract => Ok(left_val.to_number().sub(right_val.to_number()).into()),
        BinaryOperator::Multiply => Ok(left_val.to_number().mul(right_val.to_number()).into()),
        BinaryOperator::Divide => left_val
            .to_number()
            .div(right_val.to_number())
            .map(FormulaValue::from)
            .ok_or(FormulaError::DivisionByZero),

        // Equality compares values
        BinaryOperator::Equal => Ok(FormulaValue::Boolean(values_equal(&left_val, &right_val))),
        BinaryOperator::NotEqual => {
            Ok(FormulaValue::Boolean(!values_equal(&left_val, &right_val)))
        }

        // Ordering compares numbers numerically, everything else as text
        BinaryOperator::LessThan => Ok(FormulaValue::Boolean(
            compare_values(&left_val, &right_val) == Some(Ordering::Less),
        )),
        BinaryOperator::LessEqual => Ok(FormulaValue::Boolean(matches!(
            compare_values(&left_val, &right_val),
            Some(Ordering::Less | Ordering::Equal)
        ))),
        BinaryOperator::GreaterThan => Ok(FormulaValue::Boolean(
            compare_values(&left_val, &right_val) == Some(Ordering::Greater),
        )),
        BinaryOperator::GreaterEqual => Ok(FormulaValue::Boolean(matches!(
            compare_values(&left_val, &right_val),
            Some(Ordering::Greater | Ordering::Equal)
        ))),

        // Concatenation
        BinaryOperator::Concat => Ok(FormulaValue::Text(format!("{}{}", left_val, right_val))),
    }
}

/// Value equality after unwrapping typed results
///
/// Integers and floats compare numerically; values of different kinds are
/// never equal.
fn values_equal(left: &FormulaValue, right: &FormulaValue) -> bool {
    let (left, right) = (left.plain(), right.plain());
    if left.is_numeric() && right.is_numeric() {
        return left.to_number().compare(right.to_number()) == Some(Ordering::Equal);
    }
    left == right
}

/// Ordering for `< <= > >=`
///
/// `None` only for NaN, which makes every ordering comparison false.
fn compare_values(left: &FormulaValue, right: &FormulaValue) -> Option<Ordering> {
    if left.is_numeric() && right.is_numeric() {
        left.to_number().compare(right.to_number())
    } else {
        Some(left.to_string().cmp(&right.to_string()))
    }
}

/// Evaluate a unary operation
fn evaluate_unary_op(
    op: UnaryOperator,
    operand: &Expr,
    env: &Environment,
) -> FormulaResult<FormulaValue> {
    let val = evaluate_node(operand, env)?;

    match op {
        UnaryOperator::Negate => Ok(val.to_number().neg().into()),
    }
}

/// Evaluate a function call
///
/// Arguments are evaluated left to right and unwrapped before the function
/// is looked up, so argument errors win over unknown names.
fn evaluate_function(name: &str, args: &[Expr], env: &Environment) -> FormulaResult<FormulaValue> {
    let mut evaluated_args = Vec::with_capacity(args.len());
    for arg in args {
        evaluated_args.push(evaluate_node(arg, env)?.into_plain());
    }

    Function::lookup(name)?.call(&evaluated_args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{TypedKind, TypedResult};
    use pretty_assertions::assert_eq;

    fn eval(formula: &str) -> FormulaValue {
        evaluate(formula, &Environment::new())
    }

    fn eval_with(formula: &str, env: &Environment) -> FormulaValue {
        evaluate(formula, env)
    }

    fn text(s: &str) -> FormulaValue {
        FormulaValue::text(s)
    }

    #[test]
    fn test_evaluate_literals() {
        assert_eq!(eval("=42"), FormulaValue::Integer(42));
        assert_eq!(eval("=3.14"), FormulaValue::Float(3.14));
        assert_eq!(eval("=\"Hello\""), text("Hello"));
        assert_eq!(eval("=TRUE"), FormulaValue::Boolean(true));
    }

    #[test]
    fn test_evaluate_precedence() {
        assert_eq!(eval("=2 + 3 * 4"), FormulaValue::Integer(14));
        assert_eq!(eval("=(2 + 3) * 4"), FormulaValue::Integer(20));
        assert_eq!(eval("=10 - 4 - 3"), FormulaValue::Integer(3));
        assert_eq!(eval("=-2 * 3"), FormulaValue::Integer(-6));
    }

    #[test]
    fn test_evaluate_division() {
        assert_eq!(eval("=10 / 2"), FormulaValue::Integer(5));
        assert_eq!(eval("=7 / 2"), FormulaValue::Float(3.5));
        assert_eq!(eval("=1.5 / 0.5"), FormulaValue::Float(3.0));
        assert_eq!(eval("=1 / 0"), text("#ERROR: Division by zero"));
        assert_eq!(eval("=1 / \"abc\""), text("#ERROR: Division by zero"));
    }

    #[test]
    fn test_evaluate_division_by_zero_column() {
        let env = Environment::new().with("A", 100i64).with("B", 0i64);
        assert!(is_error_marker(&eval_with("={A} / {B}", &env).to_string()));
    }

    #[test]
    fn test_evaluate_coercion() {
        let env = Environment::new().with("Qty", "3").with("Price", "2.5");
        assert_eq!(eval_with("={Qty} + 1", &env), FormulaValue::Integer(4));
        assert_eq!(eval_with("={Qty} * {Price}", &env), FormulaValue::Float(7.5));
        assert_eq!(eval("=\"abc\" + 1"), FormulaValue::Integer(1));
        assert_eq!(eval("=TRUE + TRUE"), FormulaValue::Integer(2));
    }

    #[test]
    fn test_evaluate_missing_reference_is_nil() {
        assert_eq!(eval("={Missing}"), FormulaValue::Nil);
        assert_eq!(eval("={Missing} & \"x\""), text("x"));
        assert_eq!(eval("={Missing} + 5"), FormulaValue::Integer(5));
    }

    #[test]
    fn test_evaluate_concatenation() {
        let env = Environment::new().with("First", "A").with("Last", "B");
        assert_eq!(eval_with("={First} & \" \" & {Last}", &env), text("A B"));
        assert_eq!(eval_with("={First} \" \" {Last}", &env), text("A B"));
        assert_eq!(eval("=1.0 & \"|\" & 2 & TRUE"), text("1.0|2true"));
    }

    #[test]
    fn test_evaluate_indexed_references() {
        let env = Environment::new()
            .with("Name", "Alice")
            .with("Name[0]", "Alice")
            .with("Name[1]", "Bob");
        assert_eq!(
            eval_with("={Name}[0] & \" and \" & {Name}[1]", &env),
            text("Alice and Bob")
        );
        assert_eq!(eval_with("={Name}[2]", &env), FormulaValue::Nil);
    }

    #[test]
    fn test_evaluate_comparison() {
        assert_eq!(eval("=1 = 1.0"), FormulaValue::Boolean(true));
        assert_eq!(eval("=1 != 2"), FormulaValue::Boolean(true));
        assert_eq!(eval("=\"1\" = 1"), FormulaValue::Boolean(false));
        assert_eq!(eval("=2 < 10"), FormulaValue::Boolean(true));
        // Lexical when either side is not numeric
        assert_eq!(eval("=\"2\" < \"10\""), FormulaValue::Boolean(false));
        assert_eq!(eval("=\"apple\" < \"banana\""), FormulaValue::Boolean(true));
        assert_eq!(eval("=3 >= 3"), FormulaValue::Boolean(true));
        assert_eq!(eval("=1 + 1 = 2"), FormulaValue::Boolean(true));
    }

    #[test]
    fn test_evaluate_typed_results_unwrap() {
        let env = Environment::new().with(
            "Price",
            FormulaValue::Typed(TypedResult::new(
                TypedKind::Currency,
                FormulaValue::Float(2.5),
            )),
        );
        assert_eq!(eval_with("={Price} * 2", &env), FormulaValue::Float(5.0));
        assert_eq!(eval_with("={Price} = 2.5", &env), FormulaValue::Boolean(true));
        assert_eq!(
            eval("=DATE(2024,3,15) = \"2024-03-15\""),
            FormulaValue::Boolean(true)
        );
        assert_eq!(eval("=UPPER(DATE(\"2024-03-15\"))"), text("2024-03-15"));
    }

    #[test]
    fn test_evaluate_if() {
        let active = Environment::new().with("Active", true).with("Name", "alice");
        let inactive = Environment::new().with("Active", false).with("Name", "alice");
        let formula = "=IF({Active}, UPPER({Name}), \"Inactive\")";
        assert_eq!(eval_with(formula, &active), text("ALICE"));
        assert_eq!(eval_with(formula, &inactive), text("Inactive"));

        for falsy in ["0", "\"\"", "\"0\"", "FALSE", "{Missing}", "0.0"] {
            assert_eq!(
                eval(&format!("=IF({}, \"T\", \"F\")", falsy)),
                text("F"),
                "{} should be falsy",
                falsy
            );
        }
        for truthy in ["1", "\"no\"", "-1", "TRUE", "\"0.0\""] {
            assert_eq!(
                eval(&format!("=IF({}, \"T\", \"F\")", truthy)),
                text("T"),
                "{} should be truthy",
                truthy
            );
        }
    }

    #[test]
    fn test_evaluate_nested_functions() {
        let env = Environment::new().with("A", 50i64).with("B", 20i64);
        assert_eq!(
            eval_with("=IF(AND({A}>0,{B}<100),{A}*{B}/100,0)", &env),
            FormulaValue::Integer(10)
        );
        assert_eq!(
            eval("=CONCAT(LEFT(\"Hello\", 2), LEN(\"abc\"), ROUND(2.5))"),
            text("He33")
        );
    }

    #[test]
    fn test_evaluate_function_errors() {
        assert_eq!(eval("=FOO(1)"), text("#ERROR: Unknown function: FOO"));
        assert_eq!(
            eval("=UPPER(1, 2)"),
            text("#ERROR: Wrong number of arguments for UPPER: expected 1, got 2")
        );
        assert_eq!(
            eval("=MIN(1)"),
            text("#ERROR: Wrong number of arguments for MIN: expected at least 2, got 1")
        );
        assert_eq!(
            eval("=DATE(2024, 2, 30)"),
            text("#ERROR: Invalid date: 2024-02-30")
        );
        // Both branches are evaluated
        assert_eq!(
            eval("=IF(TRUE, 1, 1/0)"),
            text("#ERROR: Division by zero")
        );
        // Argument errors surface before the unknown name
        assert_eq!(eval("=FOO(1/0)"), text("#ERROR: Division by zero"));
    }

    #[test]
    fn test_evaluate_syntax_errors() {
        assert_eq!(eval("=1 +"), text("#ERROR: Unexpected end of expression"));
        assert_eq!(eval("=\"abc"), text("#ERROR: Unterminated string"));
        assert_eq!(eval("=1 % 2"), text("#ERROR: Unexpected character: %"));
        assert!(try_evaluate("=(1", &Environment::new())
            .unwrap_err()
            .is_syntax());
    }

    #[test]
    fn test_evaluate_template_mode() {
        let env = Environment::new().with("First", "Ada").with("Last", "Lovelace");
        assert_eq!(eval_with("{First}   {Last}", &env), text("Ada Lovelace"));
        assert_eq!(eval_with("Hello {Nobody}!", &env), text("Hello !"));
        assert_eq!(eval_with("1 + 1", &env), text("1 + 1"));
    }

    #[test]
    fn test_error_marker() {
        assert!(is_error_marker("#ERROR: Division by zero"));
        assert!(!is_error_marker("#ERROR"));
        assert!(eval("=1/0").is_error_marker());
        assert!(!eval("=1/1").is_error_marker());
    }
}
