//! Query pipeline orchestrator
//!
//! ```text
//! Received → Synthesizing → { Synthesized | NotApplicable | SynthesisFailed }
//! Synthesized → ContextBuilt → Validating → { Validated | ValidationFailed }
//! Validated → execution → audit
//! ```
//!
//! Strictly linear: no stage is retried, and a validation failure ends the
//! run. Every stage error is folded into a [`PipelineOutcome`] variant here;
//! nothing propagates to the caller. Every run, whatever its outcome, hands
//! exactly one entry to the audit logger, including a run that unwinds out
//! of a panicking adapter.

use crate::audit::{AuditEntry, AuditLogger};
use crate::execution::{ExecutionGateway, ExecutionResult};
use crate::llm::{InferenceGateway, ModalGateway};
use crate::pipeline::context::build_query_context;
use crate::pipeline::synthesizer::{DraftSql, Synthesizer};
use crate::pipeline::types::{
    PipelineOutcome, PipelineStage, QueryRequest, QueryResponse, SelectionContext,
};
use crate::pipeline::validator::Validator;
use crate::error::PipelineError;
use std::sync::Arc;
use tracing::{info, info_span, warn};
use uuid::Uuid;

/// Result of synthesis + validation for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanReport {
    pub run_id: Uuid,
    pub outcome: PipelineOutcome,
    /// Draft from the synthesizer, if it produced one
    pub draft_sql: Option<String>,
    /// States visited, in order
    pub stages: Vec<PipelineStage>,
}

impl PlanReport {
    pub fn final_stage(&self) -> Option<PipelineStage> {
        self.stages.last().copied()
    }
}

/// Synthesizer → context → validator → execution → audit
pub struct QueryPipeline<G, E> {
    gateway: Arc<ModalGateway<G>>,
    executor: Arc<E>,
    audit: Arc<AuditLogger>,
    synthesizer: Synthesizer,
    validator: Validator,
}

impl<G: InferenceGateway, E: ExecutionGateway> QueryPipeline<G, E> {
    pub fn new(gateway: Arc<ModalGateway<G>>, executor: Arc<E>, audit: Arc<AuditLogger>) -> Self {
        Self {
            gateway,
            executor,
            audit,
            synthesizer: Synthesizer::new(),
            validator: Validator::new(),
        }
    }

    /// Replace the synthesizer (e.g. one carrying schema context)
    pub fn with_synthesizer(mut self, synthesizer: Synthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn gateway(&self) -> &ModalGateway<G> {
        &self.gateway
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Synthesis + validation only; no execution, no audit
    pub fn plan(&self, request: &QueryRequest) -> PlanReport {
        self.plan_with_id(Uuid::new_v4(), request)
    }

    fn plan_with_id(&self, run_id: Uuid, request: &QueryRequest) -> PlanReport {
        let mut report = PlanReport {
            run_id,
            outcome: PipelineOutcome::SynthesisFailed {
                reason: String::new(),
            },
            draft_sql: None,
            stages: Vec::new(),
        };
        let enter = |report: &mut PlanReport, stage: PipelineStage| {
            info!(%stage, "pipeline stage");
            report.stages.push(stage);
        };

        enter(&mut report, PipelineStage::Received);
        enter(&mut report, PipelineStage::Synthesizing);

        let draft = match self
            .synthesizer
            .synthesize(&self.gateway, &request.user_query)
        {
            Ok(DraftSql::Sql(sql)) => sql,
            Ok(DraftSql::NotApplicable) => {
                enter(&mut report, PipelineStage::NotApplicable);
                report.outcome = PipelineOutcome::NotApplicable {
                    reason: PipelineError::NotApplicableQuery.to_string(),
                };
                return report;
            }
            Err(e) => {
                warn!(error = %e, "synthesis failed");
                enter(&mut report, PipelineStage::SynthesisFailed);
                report.outcome = PipelineOutcome::SynthesisFailed {
                    reason: e.to_string(),
                };
                return report;
            }
        };
        enter(&mut report, PipelineStage::Synthesized);
        report.draft_sql = Some(draft.clone());

        let selections: SelectionContext = request.selections();
        let context = build_query_context(&request.user_query, &draft, selections);
        enter(&mut report, PipelineStage::ContextBuilt);

        enter(&mut report, PipelineStage::Validating);
        match self.validator.validate(&self.gateway, &context) {
            Ok(validated) => {
                enter(&mut report, PipelineStage::Validated);
                report.outcome = PipelineOutcome::Success {
                    sql: validated.sql,
                    comments: validated.comments,
                };
            }
            Err(e) => {
                warn!(error = %e, "validation failed");
                enter(&mut report, PipelineStage::ValidationFailed);
                report.outcome = PipelineOutcome::ValidationFailed {
                    reason: e.to_string(),
                };
            }
        }

        report
    }

    /// Full run: plan, execute if validated, audit, respond
    pub fn run(&self, request: &QueryRequest) -> QueryResponse {
        let run_id = Uuid::new_v4();
        let span = info_span!("query", %run_id);
        let _entered = span.enter();
        info!(user_query = %request.user_query, "query received");

        let mut audit = RunAudit::new(
            &self.audit,
            AuditEntry {
                run_id,
                success: false,
                user_query: request.user_query.clone(),
                selected_columns: request.columns.clone(),
                selected_values: request.selections().selected_values().clone(),
                draft_sql: None,
                final_sql: None,
                comments: None,
                error: None,
            },
        );

        let report = self.plan_with_id(run_id, request);
        audit.entry.draft_sql = report.draft_sql.clone();

        let response = match report.outcome {
            PipelineOutcome::Success { sql, comments } => {
                audit.entry.final_sql = Some(sql.clone());
                audit.entry.comments = Some(comments.clone());
                match self.executor.execute(&sql) {
                    ExecutionResult::Success(rows) => {
                        info!(rows = rows.row_count, "query executed");
                        audit.entry.success = true;
                        QueryResponse::Success {
                            user_query: request.user_query.clone(),
                            sql_query: sql,
                            comments,
                            rows,
                        }
                    }
                    ExecutionResult::Failure { error } => {
                        let reason = PipelineError::ExecutionError(error).to_string();
                        audit.entry.error = Some(reason.clone());
                        QueryResponse::failure(reason)
                    }
                }
            }
            PipelineOutcome::SynthesisFailed { reason }
            | PipelineOutcome::ValidationFailed { reason }
            | PipelineOutcome::NotApplicable { reason } => {
                audit.entry.error = Some(reason.clone());
                QueryResponse::failure(reason)
            }
        };

        audit.completed = true;
        drop(audit);
        response
    }
}

const ABORTED_RUN: &str = "run aborted before completion";

/// Writes a run's audit entry when the run ends.
///
/// A run that unwinds before completing (a panicking adapter or executor)
/// is still recorded, as a failure.
struct RunAudit<'a> {
    logger: &'a AuditLogger,
    entry: AuditEntry,
    completed: bool,
}

impl<'a> RunAudit<'a> {
    fn new(logger: &'a AuditLogger, entry: AuditEntry) -> Self {
        Self {
            logger,
            entry,
            completed: false,
        }
    }
}

impl Drop for RunAudit<'_> {
    fn drop(&mut self) {
        let mut entry = self.entry.clone();
        if !self.completed {
            warn!(run_id = %entry.run_id, "{}", ABORTED_RUN);
            entry.success = false;
            entry.error = Some(ABORTED_RUN.to_string());
        }
        self.logger.record(entry);
    }
}
