//! Audit records

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// What a pipeline run reports to the audit trail
///
/// The logger stamps it with a timestamp when it is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub run_id: Uuid,
    pub success: bool,
    pub user_query: String,
    pub selected_columns: Vec<String>,
    pub selected_values: BTreeMap<String, Vec<String>>,
    /// Synthesized statement, kept even when validation later failed
    pub draft_sql: Option<String>,
    /// Validated statement (the one executed)
    pub final_sql: Option<String>,
    pub comments: Option<String>,
    pub error: Option<String>,
}

/// Persisted record, one NDJSON line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Local>,
    pub run_id: Uuid,
    pub success: bool,
    pub user_query: String,
    pub selected_columns: Vec<String>,
    pub selected_values: BTreeMap<String, Vec<String>>,
    pub draft_sql: Option<String>,
    pub final_sql: Option<String>,
    pub comments: Option<String>,
    pub error: Option<String>,
}

impl AuditRecord {
    pub fn stamped(timestamp: DateTime<Local>, entry: AuditEntry) -> Self {
        Self {
            timestamp,
            run_id: entry.run_id,
            success: entry.success,
            user_query: entry.user_query,
            selected_columns: entry.selected_columns,
            selected_values: entry.selected_values,
            draft_sql: entry.draft_sql,
            final_sql: entry.final_sql,
            comments: entry.comments,
            error: entry.error,
        }
    }
}
