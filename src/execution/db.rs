//! Relational store: SQLite connection management and statement execution
//!
//! ## Architecture
//!
//! - `SqlStore::open()` — open (or create) a database file
//! - `SqlStore::open_in_memory()` — scratch store for tests and dry runs
//! - `ExecutionGateway::execute()` — run one statement, materialize rows
//!
//! The connection sits behind a mutex: SQLite connections are `Send` but not
//! `Sync`, and each statement is independent (no cross-request transaction).

use crate::execution::result::{ExecutionGateway, ExecutionResult, Row, RowSet};
use anyhow::{Context, Result};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::Value as JsonValue;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Store handle
pub struct SqlStore {
    conn: Mutex<Connection>,
}

impl SqlStore {
    /// Open the database at `path`, creating the file if missing
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open store at {}", path.display()))?;
        debug!(path = %path.display(), "store opened");
        Ok(Self::from_connection(conn))
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory store")?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Lock the connection
    ///
    /// Exposed for setup code and schema queries.
    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a batch of statements (DDL, fixtures); no rows returned
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn()
            .execute_batch(sql)
            .context("Failed to execute batch")?;
        Ok(())
    }

    fn run_query(&self, sql: &str) -> rusqlite::Result<RowSet> {
        let conn = self.conn();
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([])?;
        while let Some(row) = cursor.next()? {
            let mut record = Row::new();
            for (idx, name) in columns.iter().enumerate() {
                record.insert(name.clone(), to_json(row.get_ref(idx)?));
            }
            rows.push(record);
        }

        Ok(RowSet::new(columns, rows))
    }
}

impl ExecutionGateway for SqlStore {
    fn execute(&self, sql: &str) -> ExecutionResult {
        match self.run_query(sql) {
            Ok(rows) => {
                debug!(columns = rows.columns.len(), rows = rows.row_count, "statement executed");
                ExecutionResult::Success(rows)
            }
            Err(e) => {
                warn!(error = %e, "statement failed");
                ExecutionResult::Failure {
                    error: e.to_string(),
                }
            }
        }
    }
}

/// SQLite value → JSON value
///
/// BLOBs become lowercase hex strings; non-finite floats become null.
pub fn to_json(value: ValueRef<'_>) -> JsonValue {
    match value {
        ValueRef::Null => JsonValue::Null,
        ValueRef::Integer(i) => JsonValue::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        ValueRef::Text(bytes) => JsonValue::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => {
            JsonValue::String(bytes.iter().map(|b| format!("{:02x}", b)).collect())
        }
    }
}
