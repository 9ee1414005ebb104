//! sqlpilot: natural-language questions to validated, executed SQL
//!
//! A question goes through two model passes (generation, then validation
//! against the user's column/value selections), the validated statement is
//! run against the relational store, and every run leaves one audit record.

pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod execution;
pub mod llm;
pub mod pipeline;

// Re-export pipeline entry points
pub use pipeline::{PipelineOutcome, QueryPipeline, QueryRequest, QueryResponse, SelectionContext};

// Re-export gateways
pub use execution::{ExecutionGateway, ExecutionResult, RowSet, SqlStore};
pub use llm::{InferenceGateway, ModalGateway, Mode};

pub use audit::{AuditLogger, AuditRecord};
pub use config::Config;
pub use error::PipelineError;
