//! Table schema type

use crate::column::Column;
use crate::error::{Error, Result};
use crate::record::Record;
use crate::validation::{validate_format, validate_type, ValidationOptions};

/// A user-defined table: an ordered list of columns
///
/// Column order matters: it is the declaration order used to index duplicate
/// column names and the order computed columns are evaluated in.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table {
    name: String,
    columns: Vec<Column>,
}

impl Table {
    /// Create a new empty table
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Create a table from a list of columns
    pub fn with_columns<S: Into<String>>(name: S, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Get the table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a column, returning its index
    pub fn add_column(&mut self, column: Column) -> usize {
        self.columns.push(column);
        self.columns.len() - 1
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// All columns in declaration order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get a column by index
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Get a mutable column by index
    pub fn column_mut(&mut self, index: usize) -> Result<&mut Column> {
        let count = self.columns.len();
        self.columns
            .get_mut(index)
            .ok_or(Error::ColumnOutOfBounds(index, count))
    }

    /// Index of the first column with this name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Index of the first column with this name, or `ColumnNotFound`
    pub fn find_column(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    /// Computed columns with their indices
    pub fn computed_columns(&self) -> impl Iterator<Item = (usize, &Column)> {
        self.columns.iter().enumerate().filter(|(_, c)| c.is_computed())
    }

    /// Non-computed columns with their indices
    pub fn source_columns(&self) -> impl Iterator<Item = (usize, &Column)> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_computed())
    }

    /// Create an empty record shaped for this table
    pub fn new_record(&self) -> Record {
        Record::new(self.columns.len())
    }

    /// Check a record's source values against their column types and formats
    ///
    /// Computed columns are skipped; their values are produced, not entered.
    pub fn validate_record(&self, record: &Record, options: &ValidationOptions) -> Result<()> {
        if record.width() != self.columns.len() {
            return Err(Error::RecordWidth {
                expected: self.columns.len(),
                actual: record.width(),
            });
        }

        for (index, column) in self.source_columns() {
            let value = record.get(index).unwrap_or("");

            let mut outcome = validate_type(column.column_type, value);
            if outcome.is_valid() {
                if let Some(format) = &column.validation {
                    outcome = validate_format(format, value, options);
                }
            }

            if let Some(message) = outcome.message() {
                return Err(Error::InvalidValue {
                    column: column.name.clone(),
                    message: message.to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnType;
    use crate::validation::ValueFormat;
    use pretty_assertions::assert_eq;

    fn people() -> Table {
        Table::with_columns(
            "People",
            vec![
                Column::new("Name", ColumnType::Text),
                Column::new("Age", ColumnType::Number),
                Column::new("Name", ColumnType::Text),
                Column::computed("Label", "{Name} ({Age})"),
            ],
        )
    }

    #[test]
    fn test_column_lookup() {
        let table = people();
        assert_eq!(table.column_count(), 4);
        assert_eq!(table.column_index("Name"), Some(0));
        assert_eq!(table.column_index("Missing"), None);
        assert!(table.column(9).is_none());
    }

    #[test]
    fn test_find_column() {
        let table = people();
        assert_eq!(table.find_column("Age").unwrap(), 1);
        let err = table.find_column("Missing").unwrap_err();
        assert!(matches!(err, Error::ColumnNotFound(ref name) if name == "Missing"));
        assert_eq!(err.to_string(), "Column not found: Missing");
    }

    #[test]
    fn test_computed_and_source_columns() {
        let table = people();
        let computed: Vec<usize> = table.computed_columns().map(|(i, _)| i).collect();
        let source: Vec<usize> = table.source_columns().map(|(i, _)| i).collect();
        assert_eq!(computed, vec![3]);
        assert_eq!(source, vec![0, 1, 2]);
    }

    #[test]
    fn test_column_mut_out_of_bounds() {
        let mut table = people();
        assert!(matches!(
            table.column_mut(7),
            Err(Error::ColumnOutOfBounds(7, 4))
        ));
        table.column_mut(3).unwrap().column_type = ColumnType::Number;
        assert_eq!(table.column(3).unwrap().column_type, ColumnType::Number);
    }

    #[test]
    fn test_validate_record() {
        let mut table = people();
        table.add_column(
            Column::new("Code", ColumnType::Text)
                .with_validation(ValueFormat::Pattern("[A-Z]+".into())),
        );
        let opts = ValidationOptions::default();

        let mut record = table.new_record();
        record.set(0, "Alice").unwrap();
        record.set(1, "42").unwrap();
        record.set(4, "ABC").unwrap();
        assert!(table.validate_record(&record, &opts).is_ok());

        record.set(1, "forty").unwrap();
        let err = table.validate_record(&record, &opts).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { ref column, .. } if column == "Age"));

        record.set(1, "42").unwrap();
        record.set(4, "abc").unwrap();
        assert!(table.validate_record(&record, &opts).is_err());

        let short = Record::new(2);
        assert!(matches!(
            table.validate_record(&short, &opts),
            Err(Error::RecordWidth { expected: 5, actual: 2 })
        ));
    }
}
