//! Computed-column recalculation
//!
//! Evaluates every computed column of a table against a record's source
//! values, writes the formatted results back into the record and keeps each
//! computed column's declared type in step with what its formula produces.
//!
//! # Example
//!
//! ```rust
//! use colcalc::prelude::*;
//!
//! let mut table = Table::new("Orders");
//! table.add_column(Column::new("Qty", ColumnType::Number));
//! table.add_column(Column::new("Price", ColumnType::Currency));
//! table.add_column(Column::computed("Total", "=CURRENCY({Qty} * {Price})"));
//!
//! let mut record = table.new_record();
//! record.set(0, "3").unwrap();
//! record.set(1, "2.5").unwrap();
//!
//! let stats = table.recompute_record(&mut record).unwrap();
//! assert_eq!(stats.evaluations, 1);
//! assert_eq!(record.get(2), Some("7.50"));
//! assert_eq!(table.columns()[2].column_type, ColumnType::Currency);
//! ```

use colcalc_formula::{error_marker, format_for_storage, try_evaluate, Diagnostic, ERROR_PREFIX};
use tracing::{debug, info, warn};

use crate::{check_formula, Environment, Error, Record, Result, Table};

/// Options for recomputation
#[derive(Debug, Clone)]
pub struct RecomputeOptions {
    /// Update a computed column's declared type when its result type changes
    pub update_declared_types: bool,
    /// Leave the previous stored value in place when a formula fails,
    /// instead of storing the `#ERROR: ` marker
    pub skip_error_markers: bool,
    /// Abort on the first failing formula
    pub stop_on_error: bool,
}

impl Default for RecomputeOptions {
    fn default() -> Self {
        Self {
            update_declared_types: true,
            skip_error_markers: false,
            stop_on_error: false,
        }
    }
}

/// Statistics from a recomputation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecomputeStats {
    /// Records processed
    pub records: usize,
    /// Formulas evaluated
    pub evaluations: usize,
    /// Formulas that produced an error marker
    pub errors: usize,
    /// Declared column types changed
    pub type_changes: usize,
}

impl RecomputeStats {
    fn merge(&mut self, other: &RecomputeStats) {
        self.records += other.records;
        self.evaluations += other.evaluations;
        self.errors += other.errors;
        self.type_changes += other.type_changes;
    }
}

/// Extension trait for Table to add recomputation methods
pub trait TableCalculationExt {
    /// Recompute all computed columns of one record with default options
    fn recompute_record(&mut self, record: &mut Record) -> Result<RecomputeStats>;

    /// Recompute all computed columns of one record with custom options
    fn recompute_record_with_options(
        &mut self,
        record: &mut Record,
        options: &RecomputeOptions,
    ) -> Result<RecomputeStats>;

    /// Recompute every record with default options
    fn recompute_records(&mut self, records: &mut [Record]) -> Result<RecomputeStats>;

    /// Recompute every record with custom options
    fn recompute_records_with_options(
        &mut self,
        records: &mut [Record],
        options: &RecomputeOptions,
    ) -> Result<RecomputeStats>;

    /// Static problems in the computed columns' formulas, by column index
    fn check_formulas(&self) -> Vec<(usize, Diagnostic)>;
}

impl TableCalculationExt for Table {
    fn recompute_record(&mut self, record: &mut Record) -> Result<RecomputeStats> {
        self.recompute_record_with_options(record, &RecomputeOptions::default())
    }

    fn recompute_record_with_options(
        &mut self,
        record: &mut Record,
        options: &RecomputeOptions,
    ) -> Result<RecomputeStats> {
        let engine = RecomputeEngine::new(self, options);
        engine.recompute(self, record)
    }

    fn recompute_records(&mut self, records: &mut [Record]) -> Result<RecomputeStats> {
        self.recompute_records_with_options(records, &RecomputeOptions::default())
    }

    fn recompute_records_with_options(
        &mut self,
        records: &mut [Record],
        options: &RecomputeOptions,
    ) -> Result<RecomputeStats> {
        let engine = RecomputeEngine::new(self, options);
        let mut stats = RecomputeStats::default();

        for record in records.iter_mut() {
            let record_stats = engine.recompute(self, record)?;
            stats.merge(&record_stats);
        }

        info!(
            table = self.name(),
            records = stats.records,
            evaluations = stats.evaluations,
            errors = stats.errors,
            type_changes = stats.type_changes,
            "recomputed table"
        );
        Ok(stats)
    }

    fn check_formulas(&self) -> Vec<(usize, Diagnostic)> {
        let known: Vec<&str> = self
            .source_columns()
            .map(|(_, column)| column.name.as_str())
            .collect();

        self.computed_columns()
            .filter_map(|(index, column)| column.formula().map(|f| (index, f)))
            .flat_map(|(index, formula)| {
                check_formula(formula, &known)
                    .into_iter()
                    .map(move |d| (index, d))
            })
            .collect()
    }
}

/// A computed column captured before the run
struct ComputedColumn {
    index: usize,
    name: String,
    formula: String,
}

/// The recomputation engine
///
/// Formulas are snapshotted up front so declared types can be updated on the
/// table while iterating.
struct RecomputeEngine<'a> {
    options: &'a RecomputeOptions,
    computed: Vec<ComputedColumn>,
}

impl<'a> RecomputeEngine<'a> {
    fn new(table: &Table, options: &'a RecomputeOptions) -> Self {
        let computed = table
            .computed_columns()
            .filter_map(|(index, column)| {
                column.formula().map(|formula| ComputedColumn {
                    index,
                    name: column.name.clone(),
                    formula: formula.to_string(),
                })
            })
            .collect();

        Self { options, computed }
    }

    /// Recompute one record
    fn recompute(&self, table: &mut Table, record: &mut Record) -> Result<RecomputeStats> {
        let width = table.column_count();
        if record.width() > width {
            return Err(Error::RecordWidth {
                expected: width,
                actual: record.width(),
            });
        }
        // Columns added since the record was stored
        record.resize(width);

        let mut stats = RecomputeStats {
            records: 1,
            ..RecomputeStats::default()
        };

        // Computed columns never see each other, so one environment serves all
        let env = Environment::for_record(table, record);

        for column in &self.computed {
            stats.evaluations += 1;

            let value = try_evaluate(&column.formula, &env).unwrap_or_else(|e| error_marker(&e));

            // Includes results that merely spell out the marker, such as `="#ERROR: x"`
            if value.is_error_marker() {
                stats.errors += 1;
                let marker = value.to_string();
                let message = marker.strip_prefix(ERROR_PREFIX).unwrap_or(&marker);
                warn!(column = %column.name, error = %message, "formula failed");

                if self.options.stop_on_error {
                    return Err(Error::Formula(format!("{}: {}", column.name, message)));
                }
                if self.options.skip_error_markers {
                    continue;
                }
                // Marker is stored, but must not change the declared type
                record.set(column.index, marker)?;
                continue;
            }

            let stored = format_for_storage(&value);
            debug!(
                column = %column.name,
                value = %stored.text,
                result_type = %stored.result_type,
                "evaluated computed column"
            );
            record.set(column.index, stored.text)?;

            if self.options.update_declared_types {
                let target = table.column_mut(column.index)?;
                if target.column_type != stored.result_type {
                    debug!(
                        column = %column.name,
                        from = %target.column_type,
                        to = %stored.result_type,
                        "declared type changed"
                    );
                    target.column_type = stored.result_type;
                    stats.type_changes += 1;
                }
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Column, ColumnType};
    use pretty_assertions::assert_eq;

    fn people() -> Table {
        Table::with_columns(
            "People",
            vec![
                Column::new("First", ColumnType::Text),
                Column::new("Last", ColumnType::Text),
                Column::new("Age", ColumnType::Number),
                Column::computed("Full Name", "{First} {Last}"),
                Column::computed("Next Age", "={Age} + 1"),
            ],
        )
    }

    fn record(values: &[&str]) -> Record {
        Record::from_values(values.iter().map(|v| Some(*v)))
    }

    #[test]
    fn test_recompute_record() {
        let mut table = people();
        let mut rec = record(&["Ada", "Lovelace", "36", "", ""]);

        let stats = table.recompute_record(&mut rec).unwrap();

        assert_eq!(rec.get(3), Some("Ada Lovelace"));
        assert_eq!(rec.get(4), Some("37"));
        assert_eq!(
            stats,
            RecomputeStats {
                records: 1,
                evaluations: 2,
                errors: 0,
                // Next Age went from text to number
                type_changes: 1,
            }
        );
        assert_eq!(table.columns()[4].column_type, ColumnType::Number);
        assert_eq!(table.columns()[3].column_type, ColumnType::Text);
    }

    #[test]
    fn test_recompute_short_record_grows() {
        let mut table = people();
        let mut rec = record(&["Ada", "Lovelace", "36"]);
        table.recompute_record(&mut rec).unwrap();
        assert_eq!(rec.width(), 5);
        assert_eq!(rec.get(4), Some("37"));
    }

    #[test]
    fn test_recompute_wide_record_rejected() {
        let mut table = people();
        let mut rec = record(&["a", "b", "1", "", "", "extra"]);
        assert!(matches!(
            table.recompute_record(&mut rec),
            Err(Error::RecordWidth {
                expected: 5,
                actual: 6
            })
        ));
    }

    #[test]
    fn test_error_marker_keeps_declared_type() {
        let mut table = Table::with_columns(
            "T",
            vec![
                Column::new("A", ColumnType::Number),
                Column::new("B", ColumnType::Number),
                Column {
                    column_type: ColumnType::Decimal,
                    ..Column::computed("Ratio", "={A} / {B}")
                },
            ],
        );
        let mut rec = record(&["1", "0", "0.5"]);

        let stats = table.recompute_record(&mut rec).unwrap();

        assert_eq!(rec.get(2), Some("#ERROR: Division by zero"));
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.type_changes, 0);
        assert_eq!(table.columns()[2].column_type, ColumnType::Decimal);
    }

    #[test]
    fn test_marker_text_result_counts_as_error() {
        let mut table = Table::with_columns(
            "T",
            vec![
                Column::new("A", ColumnType::Number),
                Column {
                    column_type: ColumnType::Number,
                    ..Column::computed("Spelled", "=\"#ERROR: \" & {A}")
                },
            ],
        );
        let mut rec = record(&["7", ""]);

        let stats = table.recompute_record(&mut rec).unwrap();

        assert_eq!(rec.get(1), Some("#ERROR: 7"));
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.type_changes, 0);
        assert_eq!(table.columns()[1].column_type, ColumnType::Number);

        let stop = RecomputeOptions {
            stop_on_error: true,
            ..RecomputeOptions::default()
        };
        let err = table
            .recompute_record_with_options(&mut rec, &stop)
            .unwrap_err();
        assert_eq!(err.to_string(), "Formula error: Spelled: 7");
    }

    #[test]
    fn test_error_options() {
        let mut table = Table::with_columns(
            "T",
            vec![
                Column::new("A", ColumnType::Number),
                Column::computed("Bad", "=NOPE({A})"),
            ],
        );

        let skip = RecomputeOptions {
            skip_error_markers: true,
            ..RecomputeOptions::default()
        };
        let mut rec = record(&["1", "previous"]);
        table.recompute_record_with_options(&mut rec, &skip).unwrap();
        assert_eq!(rec.get(1), Some("previous"));

        let stop = RecomputeOptions {
            stop_on_error: true,
            ..RecomputeOptions::default()
        };
        let err = table
            .recompute_record_with_options(&mut rec, &stop)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Formula error: Bad: Unknown function: NOPE"
        );
    }

    #[test]
    fn test_declared_types_frozen() {
        let mut table = people();
        let options = RecomputeOptions {
            update_declared_types: false,
            ..RecomputeOptions::default()
        };
        let mut rec = record(&["Ada", "Lovelace", "36", "", ""]);
        let stats = table
            .recompute_record_with_options(&mut rec, &options)
            .unwrap();
        assert_eq!(stats.type_changes, 0);
        assert_eq!(table.columns()[4].column_type, ColumnType::Text);
    }

    #[test]
    fn test_recompute_records_aggregates() {
        let mut table = people();
        let mut records = vec![
            record(&["Ada", "Lovelace", "36", "", ""]),
            record(&["Alan", "Turing", "", "", ""]),
        ];

        let stats = table.recompute_records(&mut records).unwrap();

        assert_eq!(stats.records, 2);
        assert_eq!(stats.evaluations, 4);
        assert_eq!(stats.type_changes, 1);
        // Missing number is nil, which is 0 in arithmetic
        assert_eq!(records[1].get(4), Some("1"));
    }

    #[test]
    fn test_check_formulas() {
        let mut table = people();
        table.add_column(Column::computed("Broken", "=LEFT({Frist})"));
        let diagnostics = table.check_formulas();
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|(index, _)| *index == 5));
    }
}
