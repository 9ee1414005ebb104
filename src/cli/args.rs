//! CLI argument parsing
//!
//! ```text
//! sqlpilot [options] <command> [command-args]
//!
//! COMMANDS:
//!   ask <question...>          Run the full pipeline
//!   exec <sql...>              Execute SQL directly (no model involved)
//!   schema [table column]      Describe tables, or list a column's values
//!   schema stats <table> <col...>
//!                              Column stats over rows matching --filter
//!   log [YYYY-MM-DD]           Print a day's audit records (default today)
//!
//! OPTIONS:
//!   --home <path>              Home directory (config, store, logs)
//!   --column <name>            Selected column (ask; repeatable)
//!   --filter <col=value>       Selected value (ask, schema stats; repeatable)
//!   --json                     Compact JSON output
//!   --version                  Show version
//!   --help                     Show help
//! ```

use crate::cli::{Error, Result};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Parsed CLI arguments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    pub command: Option<Command>,

    /// Home directory (explicitly set or None for resolution)
    pub home: Option<String>,

    /// `--column` values, in order
    pub columns: Vec<String>,

    /// `--filter` values grouped by column, in order
    pub selected_values: BTreeMap<String, Vec<String>>,

    pub json_output: bool,
    pub show_version: bool,
    pub show_help: bool,
}

/// CLI commands
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ask { question: String },
    Exec { sql: String },
    Schema(SchemaTarget),
    Log { date: Option<NaiveDate> },
}

/// What `schema` describes
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaTarget {
    /// Every table with its columns
    Catalog,
    /// Distinct values of one column
    Values { table: String, column: String },
    /// Stats for columns of one table
    Stats { table: String, columns: Vec<String> },
}

/// Parse CLI arguments (first item is the program name)
pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut iter = args.into_iter();
    let _program = iter.next();

    let mut args_out = Args::default();
    let mut positional = Vec::new();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--version" | "-v" => args_out.show_version = true,
            "--help" | "-h" => args_out.show_help = true,
            "--json" => args_out.json_output = true,
            "--home" => {
                let path = iter
                    .next()
                    .ok_or_else(|| Error::MissingArgument("--home requires a path".to_string()))?;
                args_out.home = Some(path);
            }
            "--column" => {
                let column = iter.next().ok_or_else(|| {
                    Error::MissingArgument("--column requires a name".to_string())
                })?;
                args_out.columns.push(column);
            }
            "--filter" => {
                let raw = iter.next().ok_or_else(|| {
                    Error::MissingArgument("--filter requires col=value".to_string())
                })?;
                let (column, value) = parse_filter(&raw)?;
                args_out
                    .selected_values
                    .entry(column)
                    .or_default()
                    .push(value);
            }
            arg if arg.starts_with("--") => {
                return Err(Error::InvalidArgs(format!("Unknown option: {}", arg)));
            }
            other => positional.push(other.to_string()),
        }
    }

    if !positional.is_empty() {
        args_out.command = Some(parse_command(positional)?);
    }

    Ok(args_out)
}

fn parse_filter(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((column, value)) if !column.trim().is_empty() => {
            Ok((column.trim().to_string(), value.to_string()))
        }
        _ => Err(Error::InvalidArgs(format!(
            "--filter expects col=value, got '{}'",
            raw
        ))),
    }
}

fn parse_command(positional: Vec<String>) -> Result<Command> {
    let mut iter = positional.into_iter();
    let first = iter
        .next()
        .ok_or_else(|| Error::InvalidArgs("Expected command".to_string()))?;
    let rest: Vec<String> = iter.collect();

    match first.as_str() {
        "ask" => {
            if rest.is_empty() {
                return Err(Error::MissingArgument("ask requires a question".to_string()));
            }
            Ok(Command::Ask {
                question: rest.join(" "),
            })
        }
        "exec" => {
            if rest.is_empty() {
                return Err(Error::MissingArgument("exec requires SQL".to_string()));
            }
            Ok(Command::Exec { sql: rest.join(" ") })
        }
        "schema" => match rest.as_slice() {
            [] => Ok(Command::Schema(SchemaTarget::Catalog)),
            [kind, table, columns @ ..] if kind == "stats" && !columns.is_empty() => {
                Ok(Command::Schema(SchemaTarget::Stats {
                    table: table.clone(),
                    columns: columns.to_vec(),
                }))
            }
            [table, column] => Ok(Command::Schema(SchemaTarget::Values {
                table: table.clone(),
                column: column.clone(),
            })),
            _ => Err(Error::InvalidArgs(
                "schema takes no arguments, <table> <column>, or stats <table> <col...>"
                    .to_string(),
            )),
        },
        "log" => match rest.as_slice() {
            [] => Ok(Command::Log { date: None }),
            [date] => {
                let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
                    Error::InvalidArgs(format!("log date must be YYYY-MM-DD, got '{}'", date))
                })?;
                Ok(Command::Log { date: Some(date) })
            }
            _ => Err(Error::InvalidArgs("log takes at most one date".to_string())),
        },
        other => Err(Error::UnknownCommand(other.to_string())),
    }
}
