//! Formula Abstract Syntax Tree types

use std::fmt;

use crate::value::Number;

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // === Literals ===
    /// Integer or float literal
    Number(Number),
    /// String literal
    String(String),
    /// Boolean literal
    Boolean(bool),

    // === References ===
    /// Column reference, resolved through the value environment
    ColumnRef(ColumnRef),

    // === Operators ===
    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr>,
    },

    // === Function call ===
    Function { name: String, args: Vec<Expr> },
}

/// Column reference with optional positional index
///
/// `{Name}` resolves to the first column called `Name`; `{Name}[i]` to the
/// i-th (0-based) column of that name in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub name: String,
    pub index: Option<usize>,
}

impl ColumnRef {
    /// Create a reference
    pub fn new<S: Into<String>>(name: S, index: Option<usize>) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }

    /// Environment key: `Name` or `Name[i]`
    pub fn key(&self) -> String {
        environment_key(&self.name, self.index)
    }
}

/// Build an environment lookup key from a column name and optional index
pub fn environment_key(name: &str, index: Option<usize>) -> String {
    match index {
        Some(i) => format!("{}[{}]", name, i),
        None => name.to_string(),
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{{{}}}[{}]", self.name, i),
            None => write!(f, "{{{}}}", self.name),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,

    // Text
    Concat,
}

impl BinaryOperator {
    /// Operator as written in a formula
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Equal => "=",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::Concat => "&",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
}
