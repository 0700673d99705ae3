//! Runtime values
//!
//! [`FormulaValue`] is what flows through evaluation. Numbers keep their
//! integer/float distinction so the storage formatter can tell a `number`
//! column from a `decimal` one. [`TypedResult`] is the only way a value carries
//! a currency/date/time/datetime type; every operator and function sees the
//! inner value instead.

use std::cmp::Ordering;
use std::fmt;

use colcalc_core::ColumnType;

/// Value types during formula evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    /// Absent value (unmapped column reference, empty source value)
    Nil,
    /// Value produced by a typed-cast function
    Typed(TypedResult),
}

/// Result type carried by a [`TypedResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypedKind {
    Currency,
    Date,
    Time,
    Datetime,
}

impl TypedKind {
    /// Column type a result of this kind is stored as
    pub fn column_type(&self) -> ColumnType {
        match self {
            TypedKind::Currency => ColumnType::Currency,
            TypedKind::Date => ColumnType::Date,
            TypedKind::Time => ColumnType::Time,
            TypedKind::Datetime => ColumnType::Datetime,
        }
    }
}

/// A value annotated with its declared result type
///
/// Currency wraps a float; date, time and datetime wrap their canonical text
/// (`YYYY-MM-DD`, `HH:MM`, `YYYY-MM-DDTHH:MM`).
#[derive(Debug, Clone, PartialEq)]
pub struct TypedResult {
    pub kind: TypedKind,
    pub value: Box<FormulaValue>,
}

impl TypedResult {
    /// Wrap a value
    pub fn new(kind: TypedKind, value: FormulaValue) -> Self {
        Self {
            kind,
            value: Box::new(value),
        }
    }
}

/// Numeric view of a value after coercion
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Value as a float
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// Value truncated to an integer
    pub fn as_i64(self) -> i64 {
        match self {
            Number::Int(i) => i,
            Number::Float(f) => f.trunc() as i64,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Int(i) => i == 0,
            Number::Float(f) => f == 0.0,
        }
    }

    /// Integer addition, promoting to float on overflow
    pub fn add(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_add(b)
                .map(Number::Int)
                .unwrap_or(Number::Float(a as f64 + b as f64)),
            (a, b) => Number::Float(a.as_f64() + b.as_f64()),
        }
    }

    pub fn sub(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_sub(b)
                .map(Number::Int)
                .unwrap_or(Number::Float(a as f64 - b as f64)),
            (a, b) => Number::Float(a.as_f64() - b.as_f64()),
        }
    }

    pub fn mul(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_mul(b)
                .map(Number::Int)
                .unwrap_or(Number::Float(a as f64 * b as f64)),
            (a, b) => Number::Float(a.as_f64() * b.as_f64()),
        }
    }

    /// Division; `None` when the divisor is zero
    ///
    /// Two integers divide to an integer only when the division is exact.
    pub fn div(self, other: Number) -> Option<Number> {
        if other.is_zero() {
            return None;
        }
        let result = match (self, other) {
            (Number::Int(a), Number::Int(b)) if a.checked_rem(b) == Some(0) => a
                .checked_div(b)
                .map(Number::Int)
                .unwrap_or(Number::Float(a as f64 / b as f64)),
            (a, b) => Number::Float(a.as_f64() / b.as_f64()),
        };
        Some(result)
    }

    pub fn neg(self) -> Number {
        match self {
            Number::Int(i) => i
                .checked_neg()
                .map(Number::Int)
                .unwrap_or(Number::Float(-(i as f64))),
            Number::Float(f) => Number::Float(-f),
        }
    }

    /// Numeric ordering; integers compare exactly
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }

    /// Float that holds an integral value in `i64` range becomes an integer
    pub fn from_integral_f64(f: f64) -> Number {
        if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
            Number::Int(f as i64)
        } else {
            Number::Float(f)
        }
    }
}

impl From<Number> for FormulaValue {
    fn from(n: Number) -> Self {
        match n {
            Number::Int(i) => FormulaValue::Integer(i),
            Number::Float(f) => FormulaValue::Float(f),
        }
    }
}

impl FormulaValue {
    /// Create a text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        FormulaValue::Text(s.into())
    }

    /// Strip any typed-result wrapper
    pub fn plain(&self) -> &FormulaValue {
        match self {
            FormulaValue::Typed(typed) => typed.value.plain(),
            v => v,
        }
    }

    /// Strip any typed-result wrapper, by value
    pub fn into_plain(self) -> FormulaValue {
        match self {
            FormulaValue::Typed(typed) => typed.value.into_plain(),
            v => v,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self.plain(), FormulaValue::Nil)
    }

    /// Check if the value is an integer or float
    pub fn is_numeric(&self) -> bool {
        matches!(
            self.plain(),
            FormulaValue::Integer(_) | FormulaValue::Float(_)
        )
    }

    /// Numeric coercion
    ///
    /// Text containing `.` parses as a float, other text as an integer;
    /// unparsable text, nil and false are 0, true is 1.
    pub fn to_number(&self) -> Number {
        match self.plain() {
            FormulaValue::Integer(i) => Number::Int(*i),
            FormulaValue::Float(f) => Number::Float(*f),
            FormulaValue::Boolean(true) => Number::Int(1),
            FormulaValue::Boolean(false) | FormulaValue::Nil => Number::Int(0),
            FormulaValue::Text(s) => {
                let s = s.trim();
                if s.contains('.') {
                    s.parse().map(Number::Float).unwrap_or(Number::Float(0.0))
                } else {
                    s.parse().map(Number::Int).unwrap_or(Number::Int(0))
                }
            }
            FormulaValue::Typed(_) => Number::Int(0),
        }
    }

    /// Truthiness used by IF, AND, OR, NOT, COALESCE and BOOLEAN
    pub fn is_truthy(&self) -> bool {
        match self.plain() {
            FormulaValue::Nil | FormulaValue::Boolean(false) => false,
            FormulaValue::Text(s) => !(s.is_empty() || s == "0"),
            FormulaValue::Integer(i) => *i != 0,
            FormulaValue::Float(f) => *f != 0.0,
            _ => true,
        }
    }

    /// Check if this is an `#ERROR: ` marker produced by [`crate::evaluate`]
    pub fn is_error_marker(&self) -> bool {
        matches!(self, FormulaValue::Text(s) if crate::evaluator::is_error_marker(s))
    }

    /// Type name, for messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FormulaValue::Integer(_) => "integer",
            FormulaValue::Float(_) => "float",
            FormulaValue::Text(_) => "text",
            FormulaValue::Boolean(_) => "boolean",
            FormulaValue::Nil => "nil",
            FormulaValue::Typed(typed) => match typed.kind {
                TypedKind::Currency => "currency",
                TypedKind::Date => "date",
                TypedKind::Time => "time",
                TypedKind::Datetime => "datetime",
            },
        }
    }
}

/// Default string form of a float: shortest round-trip digits, with a
/// fractional part even when integral (`10.0`)
pub fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    }
}

/// Stringification used by `&`, text functions and template mode
impl fmt::Display for FormulaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaValue::Integer(i) => write!(f, "{}", i),
            FormulaValue::Float(n) => f.write_str(&format_float(*n)),
            FormulaValue::Text(s) => f.write_str(s),
            FormulaValue::Boolean(b) => write!(f, "{}", b),
            FormulaValue::Nil => Ok(()),
            FormulaValue::Typed(typed) => fmt::Display::fmt(&typed.value, f),
        }
    }
}

impl From<&str> for FormulaValue {
    fn from(s: &str) -> Self {
        FormulaValue::Text(s.to_string())
    }
}

impl From<String> for FormulaValue {
    fn from(s: String) -> Self {
        FormulaValue::Text(s)
    }
}

impl From<i64> for FormulaValue {
    fn from(i: i64) -> Self {
        FormulaValue::Integer(i)
    }
}

impl From<f64> for FormulaValue {
    fn from(f: f64) -> Self {
        FormulaValue::Float(f)
    }
}

impl From<bool> for FormulaValue {
    fn from(b: bool) -> Self {
        FormulaValue::Boolean(b)
    }
}
