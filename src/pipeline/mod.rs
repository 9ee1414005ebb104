//! Question → SQL pipeline
//!
//! ## Architecture
//!
//! - `synthesizer.rs` — question to draft SQL (generation mode)
//! - `context.rs` — draft + selections into the validator payload
//! - `validator.rs` — payload to validated SQL + comments (validation mode)
//! - `orchestrator.rs` — runs the stages, executes, audits
//! - `response_parse.rs` — shared decoding of model replies
//! - `types.rs` — request/response and stage types

pub mod context;
pub mod orchestrator;
pub mod response_parse;
pub mod synthesizer;
pub mod types;
pub mod validator;

pub use context::build_query_context;
pub use orchestrator::{PlanReport, QueryPipeline};
pub use synthesizer::{parse_synthesis_response, DraftSql, Synthesizer};
pub use types::{
    PipelineOutcome, PipelineStage, QueryContext, QueryRequest, QueryResponse, SelectionContext,
};
pub use validator::{parse_validation_response, ValidatedSql, Validator};
