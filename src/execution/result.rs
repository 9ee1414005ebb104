//! Execution results

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

/// One row: column name → value
pub type Row = Map<String, JsonValue>;

/// Materialized result set
///
/// `columns` is populated even when `rows` is empty. Rows keep the order the
/// engine returned them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub row_count: usize,
}

impl RowSet {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        let row_count = rows.len();
        Self {
            columns,
            rows,
            row_count,
        }
    }
}

/// Outcome of running one statement
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    Success(RowSet),
    Failure { error: String },
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success(_))
    }

    pub fn rows(&self) -> Option<&RowSet> {
        match self {
            ExecutionResult::Success(rows) => Some(rows),
            ExecutionResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ExecutionResult::Success(_) => None,
            ExecutionResult::Failure { error } => Some(error),
        }
    }

    /// Wire shape: `{success, columns, rows, row_count}` or `{success, error}`
    pub fn to_json(&self) -> JsonValue {
        match self {
            ExecutionResult::Success(rows) => serde_json::json!({
                "success": true,
                "columns": rows.columns,
                "rows": rows.rows,
                "row_count": rows.row_count,
            }),
            ExecutionResult::Failure { error } => serde_json::json!({
                "success": false,
                "error": error,
            }),
        }
    }
}

/// Runs already-vetted SQL against the relational store
///
/// Trust boundary: implementations do no validation, sanitization or
/// parameterization. Whatever the validator stage emits is run as-is.
/// Implementations must never panic or return an error for a bad
/// statement; they report it as [`ExecutionResult::Failure`].
pub trait ExecutionGateway: Send + Sync {
    fn execute(&self, sql: &str) -> ExecutionResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_count_tracks_rows() {
        let mut row = Row::new();
        row.insert("a".to_string(), JsonValue::from(1));
        let set = RowSet::new(vec!["a".to_string()], vec![row.clone(), row]);
        assert_eq!(set.row_count, 2);
    }

    #[test]
    fn test_failure_json() {
        let result = ExecutionResult::Failure {
            error: "no such table: x".to_string(),
        };
        assert_eq!(result.to_json()["success"], false);
        assert_eq!(result.error(), Some("no such table: x"));
        assert!(result.rows().is_none());
    }
}
