//! SQL validator / repairer
//!
//! Sends the encoded [`QueryContext`] to the validation model and reads back
//! `{"updated_sql": ..., "comments": ...}`.
//!
//! Protocol (single gateway session):
//! 1. switch to validation mode
//! 2. encode the context
//! 3. invoke
//! 4. decode; any failure becomes an error value
//! 5. session drop restores generation mode, on every path
//!
//! Step 5 is the session guard's `Drop`, so it also runs if anything between
//! 1 and 4 panics.

use crate::error::PipelineError;
use crate::llm::{InferenceGateway, ModalGateway, Mode};
use crate::pipeline::response_parse::{decode_object, string_field};
use crate::pipeline::types::QueryContext;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

pub const UPDATED_SQL_FIELD: &str = "updated_sql";
pub const COMMENTS_FIELD: &str = "comments";

/// Repaired statement plus the model's rationale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSql {
    pub sql: String,
    pub comments: String,
}

/// Decode a raw validation reply
///
/// Both fields are required. `comments` may also be an array of strings,
/// which is joined with newlines.
pub fn parse_validation_response(raw: &str) -> Result<ValidatedSql, PipelineError> {
    let object = decode_object(raw).map_err(PipelineError::MalformedModelResponse)?;

    let sql =
        string_field(&object, UPDATED_SQL_FIELD).map_err(PipelineError::MalformedModelResponse)?;

    let comments = match object.get(COMMENTS_FIELD) {
        Some(JsonValue::String(s)) => s.clone(),
        Some(JsonValue::Array(items)) => {
            let lines: Option<Vec<&str>> = items.iter().map(|i| i.as_str()).collect();
            lines
                .ok_or_else(|| {
                    PipelineError::MalformedModelResponse(format!(
                        "field `{}` must hold strings only",
                        COMMENTS_FIELD
                    ))
                })?
                .join("\n")
        }
        Some(_) => {
            return Err(PipelineError::MalformedModelResponse(format!(
                "field `{}` is not a string",
                COMMENTS_FIELD
            )))
        }
        None => {
            return Err(PipelineError::MalformedModelResponse(format!(
                "missing `{}` field",
                COMMENTS_FIELD
            )))
        }
    };

    if sql.trim().is_empty() {
        return Err(PipelineError::ValidationRejected(
            "validator returned an empty statement".to_string(),
        ));
    }

    Ok(ValidatedSql { sql, comments })
}

/// Validation stage
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    /// Reconcile the draft with the user's selections
    pub fn validate<G: InferenceGateway>(
        &self,
        gateway: &ModalGateway<G>,
        context: &QueryContext,
    ) -> Result<ValidatedSql, PipelineError> {
        let mut session = gateway.session();
        session.set_mode(Mode::Validation);

        let payload = context.encode().map_err(|e| {
            PipelineError::ValidationRejected(format!("could not encode query context: {}", e))
        })?;
        debug!(payload_len = payload.len(), "validation payload encoded");

        let raw = session.invoke(&payload).map_err(|e| {
            warn!(error = %e, "validation call failed");
            PipelineError::GatewayUnavailable(e)
        })?;

        parse_validation_response(&raw)
    }
}
