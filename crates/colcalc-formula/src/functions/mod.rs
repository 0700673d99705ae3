//! Built-in functions
//!
//! The function set is closed: [`Function`] names every built-in, and
//! [`Function::call`] checks arity before dispatching to the implementation.
//! Implementations receive arguments that are already evaluated and stripped
//! of any typed-result wrapper.

pub mod cast;
pub mod date;
pub mod logical;
pub mod math;
pub mod text;

use std::fmt;

use crate::error::{FormulaError, FormulaResult};
use crate::value::FormulaValue;

/// Function implementation signature
pub type FunctionImpl = fn(&[FormulaValue]) -> FormulaResult<FormulaValue>;

static NIL: FormulaValue = FormulaValue::Nil;

/// Argument at `index`, or nil when absent
pub(crate) fn arg(args: &[FormulaValue], index: usize) -> &FormulaValue {
    args.get(index).unwrap_or(&NIL)
}

/// Number of arguments a function accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly n
    Exact(usize),
    /// Between min and max, inclusive
    Range(usize, usize),
    /// n or more
    AtLeast(usize),
    /// One of two counts, nothing in between
    Either(usize, usize),
}

impl Arity {
    /// Check an argument count against this arity
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::Range(min, max) => (min..=max).contains(&count),
            Arity::AtLeast(min) => count >= min,
            Arity::Either(a, b) => count == a || count == b,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::Range(min, max) => write!(f, "{} to {}", min, max),
            Arity::AtLeast(min) => write!(f, "at least {}", min),
            Arity::Either(a, b) => write!(f, "{} or {}", a, b),
        }
    }
}

/// Function grouping, used when listing built-ins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Control,
    Text,
    Logical,
    Numeric,
    Utility,
    Cast,
    TypedCast,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Control => "control",
            Category::Text => "text",
            Category::Logical => "logical",
            Category::Numeric => "numeric",
            Category::Utility => "utility",
            Category::Cast => "cast",
            Category::TypedCast => "typed cast",
        }
    }
}

/// Built-in function identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    // Control
    If,

    // Text
    Upper,
    Lower,
    Trim,
    Len,
    Left,
    Right,
    Replace,
    Contains,
    Concat,
    Split,

    // Logical
    And,
    Or,
    Not,

    // Numeric
    Round,
    Abs,
    Floor,
    Ceil,
    Min,
    Max,
    Sum,

    // Utility
    Coalesce,

    // Plain casts
    Number,
    Text,
    Boolean,

    // Typed casts
    Currency,
    Date,
    Time,
    Datetime,
}

impl Function {
    /// Every built-in, in listing order
    pub const ALL: [Function; 29] = [
        Function::If,
        Function::Upper,
        Function::Lower,
        Function::Trim,
        Function::Len,
        Function::Left,
        Function::Right,
        Function::Replace,
        Function::Contains,
        Function::Concat,
        Function::Split,
        Function::And,
        Function::Or,
        Function::Not,
        Function::Round,
        Function::Abs,
        Function::Floor,
        Function::Ceil,
        Function::Min,
        Function::Max,
        Function::Sum,
        Function::Coalesce,
        Function::Number,
        Function::Text,
        Function::Boolean,
        Function::Currency,
        Function::Date,
        Function::Time,
        Function::Datetime,
    ];

    /// Look up a function by name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Function> {
        let upper = name.to_ascii_uppercase();
        Self::ALL.iter().copied().find(|f| f.name() == upper)
    }

    /// Look up a function by name, failing with `Unknown function`
    pub fn lookup(name: &str) -> FormulaResult<Function> {
        Self::from_name(name).ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))
    }

    /// Function name (uppercase)
    pub fn name(&self) -> &'static str {
        match self {
            Function::If => "IF",
            Function::Upper => "UPPER",
            Function::Lower => "LOWER",
            Function::Trim => "TRIM",
            Function::Len => "LEN",
            Function::Left => "LEFT",
            Function::Right => "RIGHT",
            Function::Replace => "REPLACE",
            Function::Contains => "CONTAINS",
            Function::Concat => "CONCAT",
            Function::Split => "SPLIT",
            Function::And => "AND",
            Function::Or => "OR",
            Function::Not => "NOT",
            Function::Round => "ROUND",
            Function::Abs => "ABS",
            Function::Floor => "FLOOR",
            Function::Ceil => "CEIL",
            Function::Min => "MIN",
            Function::Max => "MAX",
            Function::Sum => "SUM",
            Function::Coalesce => "COALESCE",
            Function::Number => "NUMBER",
            Function::Text => "TEXT",
            Function::Boolean => "BOOLEAN",
            Function::Currency => "CURRENCY",
            Function::Date => "DATE",
            Function::Time => "TIME",
            Function::Datetime => "DATETIME",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            Function::If => Arity::Range(2, 3),
            Function::Upper | Function::Lower | Function::Trim | Function::Len => Arity::Exact(1),
            Function::Left | Function::Right | Function::Contains => Arity::Exact(2),
            Function::Replace => Arity::Range(3, 4),
            Function::Concat => Arity::AtLeast(1),
            Function::Split => Arity::Exact(3),
            Function::And | Function::Or => Arity::AtLeast(2),
            Function::Not => Arity::Exact(1),
            Function::Round => Arity::Range(1, 2),
            Function::Abs | Function::Floor | Function::Ceil => Arity::Exact(1),
            Function::Min | Function::Max => Arity::AtLeast(2),
            Function::Sum | Function::Coalesce => Arity::AtLeast(1),
            Function::Number | Function::Text | Function::Boolean | Function::Currency => {
                Arity::Exact(1)
            }
            Function::Date => Arity::Either(1, 3),
            Function::Time | Function::Datetime => Arity::Range(1, 2),
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Function::If => Category::Control,
            Function::Upper
            | Function::Lower
            | Function::Trim
            | Function::Len
            | Function::Left
            | Function::Right
            | Function::Replace
            | Function::Contains
            | Function::Concat
            | Function::Split => Category::Text,
            Function::And | Function::Or | Function::Not => Category::Logical,
            Function::Round
            | Function::Abs
            | Function::Floor
            | Function::Ceil
            | Function::Min
            | Function::Max
            | Function::Sum => Category::Numeric,
            Function::Coalesce => Category::Utility,
            Function::Number | Function::Text | Function::Boolean => Category::Cast,
            Function::Currency | Function::Date | Function::Time | Function::Datetime => {
                Category::TypedCast
            }
        }
    }

    /// Call shape, for listings
    pub fn signature(&self) -> &'static str {
        match self {
            Function::If => "IF(cond, then[, else])",
            Function::Upper => "UPPER(text)",
            Function::Lower => "LOWER(text)",
            Function::Trim => "TRIM(text)",
            Function::Len => "LEN(text)",
            Function::Left => "LEFT(text, n)",
            Function::Right => "RIGHT(text, n)",
            Function::Replace => "REPLACE(text, old, new[, count])",
            Function::Contains => "CONTAINS(text, needle)",
            Function::Concat => "CONCAT(value, ...)",
            Function::Split => "SPLIT(text, delimiter, index)",
            Function::And => "AND(a, b, ...)",
            Function::Or => "OR(a, b, ...)",
            Function::Not => "NOT(a)",
            Function::Round => "ROUND(n[, decimals])",
            Function::Abs => "ABS(n)",
            Function::Floor => "FLOOR(n)",
            Function::Ceil => "CEIL(n)",
            Function::Min => "MIN(a, b, ...)",
            Function::Max => "MAX(a, b, ...)",
            Function::Sum => "SUM(a, ...)",
            Function::Coalesce => "COALESCE(a, ...)",
            Function::Number => "NUMBER(x)",
            Function::Text => "TEXT(x)",
            Function::Boolean => "BOOLEAN(x)",
            Function::Currency => "CURRENCY(x)",
            Function::Date => "DATE(text) | DATE(year, month, day)",
            Function::Time => "TIME(text) | TIME(hour, minute)",
            Function::Datetime => "DATETIME(text) | DATETIME(date, time)",
        }
    }

    fn implementation(&self) -> FunctionImpl {
        match self {
            Function::If => logical::fn_if,
            Function::Upper => text::fn_upper,
            Function::Lower => text::fn_lower,
            Function::Trim => text::fn_trim,
            Function::Len => text::fn_len,
            Function::Left => text::fn_left,
            Function::Right => text::fn_right,
            Function::Replace => text::fn_replace,
            Function::Contains => text::fn_contains,
            Function::Concat => text::fn_concat,
            Function::Split => text::fn_split,
            Function::And => logical::fn_and,
            Function::Or => logical::fn_or,
            Function::Not => logical::fn_not,
            Function::Round => math::fn_round,
            Function::Abs => math::fn_abs,
            Function::Floor => math::fn_floor,
            Function::Ceil => math::fn_ceil,
            Function::Min => math::fn_min,
            Function::Max => math::fn_max,
            Function::Sum => math::fn_sum,
            Function::Coalesce => logical::fn_coalesce,
            Function::Number => cast::fn_number,
            Function::Text => cast::fn_text,
            Function::Boolean => cast::fn_boolean,
            Function::Currency => cast::fn_currency,
            Function::Date => date::fn_date,
            Function::Time => date::fn_time,
            Function::Datetime => date::fn_datetime,
        }
    }

    /// Check the argument count, then run the function
    pub fn call(&self, args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
        self.check_arity(args.len())?;
        (self.implementation())(args)
    }

    /// Fail with `Wrong number of arguments` unless `count` is accepted
    pub fn check_arity(&self, count: usize) -> FormulaResult<()> {
        let arity = self.arity();
        if arity.accepts(count) {
            Ok(())
        } else {
            Err(FormulaError::ArgumentCount {
                function: self.name().to_string(),
                expected: arity.to_string(),
                actual: count,
            })
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_name() {
        assert_eq!(Function::from_name("upper"), Some(Function::Upper));
        assert_eq!(Function::from_name("DateTime"), Some(Function::Datetime));
        assert_eq!(Function::from_name("VLOOKUP"), None);
        assert_eq!(
            Function::lookup("NOPE").unwrap_err().to_string(),
            "Unknown function: NOPE"
        );
    }

    #[test]
    fn test_all_names_round_trip() {
        for function in Function::ALL {
            assert_eq!(Function::from_name(function.name()), Some(function));
        }
    }

    #[test]
    fn test_arity_display() {
        assert_eq!(Arity::Exact(2).to_string(), "2");
        assert_eq!(Arity::Range(2, 3).to_string(), "2 to 3");
        assert_eq!(Arity::AtLeast(1).to_string(), "at least 1");
        assert_eq!(Arity::Either(1, 3).to_string(), "1 or 3");
    }

    #[test]
    fn test_arity_checked_before_call() {
        let err = Function::Date
            .call(&[FormulaValue::Integer(2024), FormulaValue::Integer(3)])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Wrong number of arguments for DATE: expected 1 or 3, got 2"
        );

        let err = Function::And.call(&[FormulaValue::Boolean(true)]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Wrong number of arguments for AND: expected at least 2, got 1"
        );
    }
}
