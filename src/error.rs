//! Pipeline error taxonomy
//!
//! Every stage converts its failures into one of these at its own boundary.
//! The orchestrator then folds them into a terminal `PipelineOutcome`, so none
//! of them ever reaches a caller as a raw error.

use crate::llm::GatewayError;

/// User-facing message for the "not applicable" sentinel
pub const NOT_APPLICABLE_MESSAGE: &str = "Invalid query or question not related to database";

/// Pipeline errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// Inference gateway failed (timeout, unreachable, empty...)
    #[error("{0}")]
    GatewayUnavailable(#[from] GatewayError),

    /// Model answered, but not in the expected structured shape
    #[error("malformed response: {0}")]
    MalformedModelResponse(String),

    /// Synthesizer judged the question unanswerable against the schema
    #[error("{}", NOT_APPLICABLE_MESSAGE)]
    NotApplicableQuery,

    /// Validator produced a well-formed but unusable answer
    #[error("validation rejected: {0}")]
    ValidationRejected(String),

    /// Store rejected the statement
    #[error("execution error: {0}")]
    ExecutionError(String),

    /// Audit trail could not be written (non-fatal)
    #[error("audit logging error: {0}")]
    LoggingError(String),
}
