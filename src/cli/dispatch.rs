//! CLI command dispatch
//!
//! - ask: full pipeline (synthesize → validate → execute → audit)
//! - exec: direct execution against the store
//! - schema: catalog description, one column's distinct values, or column stats
//! - log: audit records for a day

use crate::audit::AuditLogger;
use crate::cli::args::{Command, SchemaTarget};
use crate::cli::home::resolve_home;
use crate::cli::logging::init_logging;
use crate::cli::{Args, Error, Result, EXIT_FAILURE, EXIT_SETUP_ERROR, EXIT_SUCCESS};
use crate::config::Config;
use crate::execution::{render_schema_context, ExecutionGateway, ExecutionResult, RowSet, SqlStore};
use crate::llm::{create_adapter, ModalGateway};
use crate::pipeline::{QueryPipeline, QueryRequest, QueryResponse, Synthesizer};
use chrono::Local;
use serde_json::Value as JsonValue;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, error};

/// Exit code wrapper for CLI operations
pub type ExitCode = i32;

/// Run the parsed command and return the exit code
///
/// Called from main() after argument parsing and --help/--version handling.
pub fn run_cli_mode(args: Args) -> ExitCode {
    let Some(command) = args.command.clone() else {
        eprintln!("Error: no command given (try --help)");
        return EXIT_FAILURE;
    };

    let home = match resolve_home(args.home.clone()) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_SETUP_ERROR;
        }
    };

    let config = match Config::load(&home) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_SETUP_ERROR;
        }
    };

    // Held until return so the file writer flushes
    let _log_guard = match init_logging(&config.audit.log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: diagnostics file disabled: {:#}", e);
            None
        }
    };
    debug!(home = %home.display(), "Resolved home directory");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match run_command(&command, &args, &config, &mut out) {
        Ok(true) => EXIT_SUCCESS,
        Ok(false) => EXIT_FAILURE,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            EXIT_SETUP_ERROR
        }
    }
}

/// Execute one command, writing its output to `out`
///
/// `Ok(false)` means the command ran but reported a failure payload.
pub fn run_command<W: Write>(
    command: &Command,
    args: &Args,
    config: &Config,
    out: &mut W,
) -> Result<bool> {
    match command {
        Command::Ask { question } => {
            let request = QueryRequest {
                user_query: question.clone(),
                columns: args.columns.clone(),
                selected_values: args.selected_values.clone(),
            };
            let response = ask(&request, config)?;
            if args.json_output {
                writeln!(out, "{}", response.to_json())?;
            } else {
                write_response(out, &response)?;
            }
            Ok(response.is_success())
        }
        Command::Exec { sql } => {
            let store = open_store(config)?;
            let result = store.execute(sql);
            if args.json_output {
                writeln!(out, "{}", result.to_json())?;
            } else {
                match &result {
                    ExecutionResult::Success(rows) => write_rows(out, rows)?,
                    ExecutionResult::Failure { error } => writeln!(out, "error: {}", error)?,
                }
            }
            Ok(result.is_success())
        }
        Command::Schema(SchemaTarget::Catalog) => {
            let store = open_store(config)?;
            let tables = store.describe_schema()?;
            if args.json_output {
                writeln!(out, "{}", serde_json::to_string(&tables)?)?;
            } else {
                writeln!(out, "{}", render_schema_context(&tables))?;
            }
            Ok(true)
        }
        Command::Schema(SchemaTarget::Values { table, column }) => {
            let store = open_store(config)?;
            let values = store.distinct_values(table, column)?;
            if args.json_output {
                writeln!(out, "{}", serde_json::to_string(&values)?)?;
            } else {
                for value in values {
                    writeln!(out, "{}", value)?;
                }
            }
            Ok(true)
        }
        Command::Schema(SchemaTarget::Stats { table, columns }) => {
            let store = open_store(config)?;
            let stats = store.column_stats(table, columns, &args.selected_values)?;
            if args.json_output {
                writeln!(out, "{}", serde_json::to_string(&stats)?)?;
                return Ok(true);
            }
            for (column, stat) in &stats {
                write!(
                    out,
                    "{}: unique={} nulls={} sample=[{}]",
                    column,
                    stat.unique_values,
                    stat.null_count,
                    stat.sample_values.join(", ")
                )?;
                if let Some(n) = &stat.numeric {
                    write!(
                        out,
                        " min={} max={} mean={} median={}",
                        n.min, n.max, n.mean, n.median
                    )?;
                }
                writeln!(out)?;
            }
            Ok(true)
        }
        Command::Log { date } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let logger = AuditLogger::new(&config.audit.log_dir);
            let records = logger
                .read_partition(date)
                .map_err(|e| Error::Store(e.to_string()))?;
            for record in records {
                if args.json_output {
                    writeln!(out, "{}", serde_json::to_string(&record)?)?;
                } else {
                    let status = if record.success { "ok" } else { "FAIL" };
                    let detail = record
                        .final_sql
                        .as_deref()
                        .filter(|_| record.success)
                        .or(record.error.as_deref())
                        .unwrap_or("");
                    writeln!(
                        out,
                        "{} {:<4} {} | {}",
                        record.timestamp.format("%H:%M:%S"),
                        status,
                        record.user_query,
                        detail
                    )?;
                }
            }
            Ok(true)
        }
    }
}

/// Wire up gateway, store and audit logger from config, then run one request
pub fn ask(request: &QueryRequest, config: &Config) -> Result<QueryResponse> {
    let adapter = create_adapter(&config.llm)?;
    let store = open_store(config)?;

    let synthesizer = if config.store.schema_context {
        Synthesizer::with_schema_context(render_schema_context(&store.describe_schema()?))
    } else {
        Synthesizer::new()
    };

    let pipeline = QueryPipeline::new(
        Arc::new(ModalGateway::new(adapter)),
        Arc::new(store),
        Arc::new(AuditLogger::new(&config.audit.log_dir)),
    )
    .with_synthesizer(synthesizer);

    Ok(pipeline.run(request))
}

fn open_store(config: &Config) -> Result<SqlStore> {
    if let Some(parent) = config.store.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(SqlStore::open(&config.store.path)?)
}

fn write_response<W: Write>(out: &mut W, response: &QueryResponse) -> Result<()> {
    match response {
        QueryResponse::Success {
            sql_query,
            comments,
            rows,
            ..
        } => {
            writeln!(out, "SQL: {}", sql_query)?;
            if !comments.is_empty() {
                writeln!(out, "Comments: {}", comments)?;
            }
            writeln!(out)?;
            write_rows(out, rows)
        }
        QueryResponse::Failure { error } => {
            writeln!(out, "error: {}", error)?;
            Ok(())
        }
    }
}

fn write_rows<W: Write>(out: &mut W, rows: &RowSet) -> Result<()> {
    writeln!(out, "{}", rows.columns.join("\t"))?;
    for row in &rows.rows {
        let cells: Vec<String> = rows
            .columns
            .iter()
            .map(|c| match row.get(c) {
                Some(JsonValue::String(s)) => s.clone(),
                Some(JsonValue::Null) | None => String::new(),
                Some(other) => other.to_string(),
            })
            .collect();
        writeln!(out, "{}", cells.join("\t"))?;
    }
    writeln!(out, "({} rows)", rows.row_count)?;
    Ok(())
}
