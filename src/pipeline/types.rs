//! Pipeline data model
//!
//! Request/response shapes at the pipeline boundary, the user's selection
//! context, the immutable query context handed to the validator, and the
//! terminal outcome of a run.

use crate::execution::RowSet;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Columns of interest and permitted filter values, as chosen by the user
///
/// Untrusted input. Empty columns and empty filters are valid and mean "no
/// restriction". Values per column behave as a set: duplicates are dropped,
/// first occurrence order is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionContext {
    columns: Vec<String>,
    selected_values: BTreeMap<String, Vec<String>>,
}

impl SelectionContext {
    pub fn new<I>(columns: Vec<String>, selected_values: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut filters: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (column, values) in selected_values {
            let entry = filters.entry(column).or_default();
            for value in values {
                if !entry.contains(&value) {
                    entry.push(value);
                }
            }
        }
        Self {
            columns,
            selected_values: filters,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn selected_values(&self) -> &BTreeMap<String, Vec<String>> {
        &self.selected_values
    }

    /// No columns and no filters
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.selected_values.is_empty()
    }
}

/// Question + draft SQL + selections, built once per run
///
/// No setters: once built it is only read (by the validator and the audit
/// trail).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryContext {
    user_query: String,
    draft_sql: String,
    selections: SelectionContext,
}

impl QueryContext {
    pub(crate) fn new(user_query: String, draft_sql: String, selections: SelectionContext) -> Self {
        Self {
            user_query,
            draft_sql,
            selections,
        }
    }

    pub fn user_query(&self) -> &str {
        &self.user_query
    }

    pub fn draft_sql(&self) -> &str {
        &self.draft_sql
    }

    pub fn selections(&self) -> &SelectionContext {
        &self.selections
    }
}

/// Terminal result of synthesis + validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Success { sql: String, comments: String },
    SynthesisFailed { reason: String },
    ValidationFailed { reason: String },
    NotApplicable { reason: String },
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Success { .. })
    }

    /// Failure reason, if this is a failure variant
    pub fn reason(&self) -> Option<&str> {
        match self {
            PipelineOutcome::Success { .. } => None,
            PipelineOutcome::SynthesisFailed { reason }
            | PipelineOutcome::ValidationFailed { reason }
            | PipelineOutcome::NotApplicable { reason } => Some(reason),
        }
    }
}

/// Orchestrator states, in the order a run can visit them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Synthesizing,
    Synthesized,
    NotApplicable,
    SynthesisFailed,
    ContextBuilt,
    Validating,
    Validated,
    ValidationFailed,
}

impl PipelineStage {
    /// No transition leaves a terminal stage
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineStage::NotApplicable
                | PipelineStage::SynthesisFailed
                | PipelineStage::Validated
                | PipelineStage::ValidationFailed
        )
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Received => "received",
            PipelineStage::Synthesizing => "synthesizing",
            PipelineStage::Synthesized => "synthesized",
            PipelineStage::NotApplicable => "not_applicable",
            PipelineStage::SynthesisFailed => "synthesis_failed",
            PipelineStage::ContextBuilt => "context_built",
            PipelineStage::Validating => "validating",
            PipelineStage::Validated => "validated",
            PipelineStage::ValidationFailed => "validation_failed",
        };
        f.write_str(name)
    }
}

/// Inbound request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub user_query: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub selected_values: BTreeMap<String, Vec<String>>,
}

impl QueryRequest {
    pub fn new(user_query: &str) -> Self {
        Self {
            user_query: user_query.to_string(),
            ..Self::default()
        }
    }

    pub fn selections(&self) -> SelectionContext {
        SelectionContext::new(self.columns.clone(), self.selected_values.clone())
    }
}

/// Outbound response
///
/// Failures carry only the originating stage's reason; partial progress is
/// never exposed here.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResponse {
    Success {
        user_query: String,
        sql_query: String,
        comments: String,
        rows: RowSet,
    },
    Failure {
        error: String,
    },
}

impl QueryResponse {
    pub fn failure(error: impl Into<String>) -> Self {
        QueryResponse::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, QueryResponse::Success { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            QueryResponse::Success { .. } => None,
            QueryResponse::Failure { error } => Some(error),
        }
    }

    /// Wire shape
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            QueryResponse::Success {
                user_query,
                sql_query,
                comments,
                rows,
            } => serde_json::json!({
                "success": true,
                "user_query": user_query,
                "sql_query": sql_query,
                "comments": comments,
                "columns": rows.columns,
                "data": rows.rows,
                "count": rows.row_count,
            }),
            QueryResponse::Failure { error } => serde_json::json!({
                "success": false,
                "error": error,
            }),
        }
    }
}

impl Serialize for QueryResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_values_dedup_keeps_first_order() {
        let selections = SelectionContext::new(
            vec!["region".to_string()],
            vec![(
                "region".to_string(),
                vec!["West".to_string(), "East".to_string(), "West".to_string()],
            )],
        );
        assert_eq!(selections.selected_values()["region"], vec!["West", "East"]);
    }

    #[test]
    fn test_empty_selection_is_valid() {
        let selections = SelectionContext::new(vec![], Vec::new());
        assert!(selections.is_empty());
    }

    #[test]
    fn test_request_defaults_missing_collections() {
        let request: QueryRequest = serde_json::from_str(r#"{"user_query":"hi"}"#).unwrap();
        assert!(request.columns.is_empty());
        assert!(request.selected_values.is_empty());
    }

    #[test]
    fn test_failure_response_shape() {
        let json = QueryResponse::failure("boom").to_json();
        assert_eq!(json, serde_json::json!({"success": false, "error": "boom"}));
    }

    #[test]
    fn test_outcome_reason() {
        let outcome = PipelineOutcome::NotApplicable {
            reason: "nope".to_string(),
        };
        assert_eq!(outcome.reason(), Some("nope"));
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_terminal_stages() {
        assert!(PipelineStage::Validated.is_terminal());
        assert!(!PipelineStage::Validating.is_terminal());
        assert_eq!(PipelineStage::ContextBuilt.to_string(), "context_built");
    }
}
