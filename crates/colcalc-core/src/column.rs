//! Column types

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::validation::ValueFormat;

/// Declared type of a table column
///
/// For computed columns this is the *declared result type*: it starts out as
/// [`ColumnType::Text`] and is updated from the type inferred for each
/// evaluation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ColumnType {
    /// Free text
    #[default]
    Text,
    /// Whole number
    Number,
    /// Floating-point number
    Decimal,
    /// Monetary amount, two decimal places
    Currency,
    /// Stored as "1" / "0"
    Boolean,
    /// Calendar date (YYYY-MM-DD)
    Date,
    /// Time of day (HH:MM)
    Time,
    /// Date and time (YYYY-MM-DDTHH:MM)
    Datetime,
    /// Email address
    Email,
    /// Web address
    Url,
    /// One of a fixed set of options
    Select,
    /// Reference to a record in another table
    Link,
}

impl ColumnType {
    /// All column types, in display order
    pub const ALL: [ColumnType; 12] = [
        ColumnType::Text,
        ColumnType::Number,
        ColumnType::Decimal,
        ColumnType::Currency,
        ColumnType::Boolean,
        ColumnType::Date,
        ColumnType::Time,
        ColumnType::Datetime,
        ColumnType::Email,
        ColumnType::Url,
        ColumnType::Select,
        ColumnType::Link,
    ];

    /// Lowercase type name as stored in the schema
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Number => "number",
            ColumnType::Decimal => "decimal",
            ColumnType::Currency => "currency",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::Time => "time",
            ColumnType::Datetime => "datetime",
            ColumnType::Email => "email",
            ColumnType::Url => "url",
            ColumnType::Select => "select",
            ColumnType::Link => "link",
        }
    }

    /// Whether values of this type are numeric
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Number | ColumnType::Decimal | ColumnType::Currency
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        ColumnType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| Error::UnknownColumnType(s.to_string()))
    }
}

/// Column definition in a table schema
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Column {
    /// Display name; not required to be unique within a table
    pub name: String,
    /// Declared type (declared result type for computed columns)
    pub column_type: ColumnType,
    /// Formula text for computed columns
    pub formula: Option<String>,
    /// Optional format check applied to stored values
    pub validation: Option<ValueFormat>,
}

impl Column {
    /// Create a new data column
    pub fn new<S: Into<String>>(name: S, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            formula: None,
            validation: None,
        }
    }

    /// Create a new computed column
    ///
    /// The declared type starts as text until the first evaluation.
    pub fn computed<S: Into<String>, F: Into<String>>(name: S, formula: F) -> Self {
        Self {
            name: name.into(),
            column_type: ColumnType::Text,
            formula: Some(formula.into()),
            validation: None,
        }
    }

    /// Attach a value format check
    pub fn with_validation(mut self, format: ValueFormat) -> Self {
        self.validation = Some(format);
        self
    }

    /// Check if this column derives its value from a formula
    pub fn is_computed(&self) -> bool {
        self.formula.is_some()
    }

    /// Formula text, if computed
    pub fn formula(&self) -> Option<&str> {
        self.formula.as_deref()
    }
}
