//! colcalc CLI - evaluate, check and apply computed-column formulas

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use colcalc::prelude::*;
use colcalc::{check_formula, evaluate, format_for_storage, Function};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, warn};

#[derive(Parser)]
#[command(name = "colcalc")]
#[command(author, version, about = "Computed-column formula tool")]
struct Cli {
    /// Log progress to stderr (-v for info, -vv for debug output)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a formula or template and print the stored value and its type
    Eval {
        /// Formula (starting with '=') or template
        formula: String,

        /// Source column value, NAME=VALUE (repeatable, order matters for
        /// duplicate names)
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
        values: Vec<(String, String)>,

        /// Declared type of a source column, NAME=TYPE (default: text)
        #[arg(long = "type", value_name = "NAME=TYPE", value_parser = parse_assignment)]
        types: Vec<(String, String)>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report problems in a formula without evaluating it
    Check {
        /// Formula (starting with '=') or template
        formula: String,

        /// Known source column name (repeatable)
        #[arg(short, long = "column", value_name = "NAME")]
        columns: Vec<String>,
    },

    /// List the built-in functions
    Functions,

    /// Add computed columns to a CSV file and fill them for every row
    Recompute {
        /// Input CSV file with a header row
        input: PathBuf,

        /// Computed column, NAME=FORMULA (repeatable)
        #[arg(short, long, value_name = "NAME=FORMULA", value_parser = parse_assignment)]
        computed: Vec<(String, String)>,

        /// Declared type of a source column, NAME=TYPE (default: text)
        #[arg(short, long = "type", value_name = "NAME=TYPE", value_parser = parse_assignment)]
        types: Vec<(String, String)>,

        /// Output CSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stop at the first failing formula instead of storing an error marker
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Eval {
            formula,
            values,
            types,
            json,
        } => eval(&formula, &values, &types, json),
        Commands::Check { formula, columns } => check(&formula, &columns),
        Commands::Functions => list_functions(),
        Commands::Recompute {
            input,
            computed,
            types,
            output,
            strict,
        } => recompute(&input, &computed, &types, output.as_deref(), strict),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

/// Split `NAME=VALUE` at the first '='
fn parse_assignment(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, _)) if name.trim().is_empty() => Err(format!("missing name in '{}'", s)),
        Some((name, value)) => Ok((name.trim().to_string(), value.to_string())),
        None => Err(format!("expected NAME=VALUE, got '{}'", s)),
    }
}

/// Resolve `--type` pairs, rejecting unknown type names
fn declared_types(types: &[(String, String)]) -> Result<Vec<(String, ColumnType)>> {
    types
        .iter()
        .map(|(name, type_name)| {
            let column_type = type_name
                .parse::<ColumnType>()
                .with_context(|| format!("Invalid type for column '{}'", name))?;
            Ok((name.clone(), column_type))
        })
        .collect()
}

fn type_of(name: &str, types: &[(String, ColumnType)]) -> ColumnType {
    types
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, t)| *t)
        .unwrap_or_default()
}

/// Reject `--type` for a column the data does not have
fn check_typed_columns(types: &[(String, ColumnType)], table: &Table) -> Result<()> {
    for (name, _) in types {
        table.find_column(name).with_context(|| format!("Invalid --type {}", name))?;
    }
    Ok(())
}

fn eval(
    formula: &str,
    values: &[(String, String)],
    types: &[(String, String)],
    json: bool,
) -> Result<ExitCode> {
    let types = declared_types(types)?;

    let mut table = Table::new("eval");
    for (name, _) in values {
        table.add_column(Column::new(name.as_str(), type_of(name, &types)));
    }
    check_typed_columns(&types, &table)?;

    let record = Record::from_values(values.iter().map(|(_, v)| Some(v.as_str())));
    let env = Environment::for_record(&table, &record);
    debug!(bindings = env.len(), "built environment");

    let value = evaluate(formula, &env);
    let stored = format_for_storage(&value);
    let failed = value.is_error_marker();

    if json {
        let doc = serde_json::json!({
            "value": stored.text,
            "type": stored.result_type.as_str(),
            "error": failed,
        });
        println!("{}", doc);
    } else {
        println!("{}\t{}", stored.text, stored.result_type);
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn check(formula: &str, columns: &[String]) -> Result<ExitCode> {
    let diagnostics = check_formula(formula, columns);
    if diagnostics.is_empty() {
        println!("OK");
        return Ok(ExitCode::SUCCESS);
    }

    for diagnostic in &diagnostics {
        println!("{}", diagnostic);
    }
    Ok(ExitCode::FAILURE)
}

fn list_functions() -> Result<ExitCode> {
    let mut stdout = io::stdout().lock();
    for function in Function::ALL {
        writeln!(
            stdout,
            "{:<10} {:<12} {:<12} {}",
            function.name(),
            function.arity().to_string(),
            function.category().as_str(),
            function.signature()
        )
        .context("Failed to write to stdout")?;
    }
    Ok(ExitCode::SUCCESS)
}

fn recompute(
    input: &Path,
    computed: &[(String, String)],
    types: &[(String, String)],
    output: Option<&Path>,
    strict: bool,
) -> Result<ExitCode> {
    if computed.is_empty() {
        bail!("Nothing to compute: pass at least one --computed NAME=FORMULA");
    }
    let types = declared_types(types)?;

    let mut reader = csv::Reader::from_path(input)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header of '{}'", input.display()))?
        .clone();

    let table_name = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "table".to_string());
    let mut table = Table::new(table_name);
    for name in headers.iter() {
        table.add_column(Column::new(name, type_of(name, &types)));
    }
    check_typed_columns(&types, &table)?;
    for (name, formula) in computed {
        table.add_column(Column::computed(name.as_str(), formula.as_str()));
    }

    for (index, diagnostic) in table.check_formulas() {
        let name = table.column(index).map(|c| c.name.as_str()).unwrap_or("");
        warn!(column = %name, "{}", diagnostic);
    }

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("Failed to read row {}", line + 1))?;
        records.push(Record::from_values(row.iter().map(Some)));
    }

    let options = RecomputeOptions {
        stop_on_error: strict,
        ..RecomputeOptions::default()
    };
    let stats = table
        .recompute_records_with_options(&mut records, &options)
        .context("Failed to recompute")?;

    eprintln!(
        "Computed {} values over {} rows ({} errors)",
        stats.evaluations, stats.records, stats.errors
    );
    for (_, column) in table.computed_columns() {
        eprintln!("  {}: {}", column.name, column.column_type);
    }

    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create '{}'", path.display()))?;
            write_csv(file, &table, &records)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            eprintln!("Wrote {} rows to '{}'", records.len(), path.display());
        }
        None => write_csv(io::stdout().lock(), &table, &records)
            .context("Failed to write to stdout")?,
    }

    Ok(if stats.errors > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn write_csv<W: Write>(out: W, table: &Table, records: &[Record]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(table.columns().iter().map(|c| c.name.as_str()))?;
    for record in records {
        writer.write_record(record.values().map(|v| v.unwrap_or("")))?;
    }
    writer.flush()?;
    Ok(())
}
