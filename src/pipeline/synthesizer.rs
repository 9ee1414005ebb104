//! SQL synthesizer
//!
//! Natural-language question → draft SQL via the generation model.
//!
//! The model answers `{"sql_ans": "<sql>"}`, or `{"sql_ans": "nan"}` when the
//! question cannot be answered from the schema. Sentinel detection happens
//! here, once; downstream code only sees [`DraftSql`].

use crate::error::PipelineError;
use crate::llm::{InferenceGateway, ModalGateway, Mode};
use crate::pipeline::response_parse::{decode_object, string_field};
use tracing::{debug, warn};

/// Field carrying the draft statement
pub const SQL_FIELD: &str = "sql_ans";

/// Reserved `sql_ans` value meaning "no valid SQL applies"
pub const NOT_APPLICABLE_SENTINEL: &str = "nan";

/// Classified generation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftSql {
    /// Candidate statement, passed on untouched
    Sql(String),
    /// Model explicitly judged the question unanswerable
    NotApplicable,
}

/// Classify a raw generation reply
///
/// Malformed replies (not a JSON object, `sql_ans` missing or not a string)
/// become `MalformedModelResponse`. No SQL syntax checking happens here.
pub fn parse_synthesis_response(raw: &str) -> Result<DraftSql, PipelineError> {
    let object = decode_object(raw).map_err(PipelineError::MalformedModelResponse)?;
    let sql = string_field(&object, SQL_FIELD).map_err(PipelineError::MalformedModelResponse)?;

    if sql.trim().eq_ignore_ascii_case(NOT_APPLICABLE_SENTINEL) {
        return Ok(DraftSql::NotApplicable);
    }

    Ok(DraftSql::Sql(sql))
}

/// Generation stage
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    /// Rendered schema description appended to every prompt
    schema_context: Option<String>,
}

impl Synthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema_context(schema_context: impl Into<String>) -> Self {
        let schema_context = schema_context.into();
        Self {
            schema_context: (!schema_context.trim().is_empty()).then_some(schema_context),
        }
    }

    pub fn schema_context(&self) -> Option<&str> {
        self.schema_context.as_deref()
    }

    /// Prompt for the generation model
    ///
    /// The question always comes first, on its own.
    pub fn build_prompt(&self, question: &str) -> String {
        match &self.schema_context {
            Some(schema) => format!("{}\n\nSchema:\n{}", question.trim(), schema),
            None => question.trim().to_string(),
        }
    }

    /// Ask the generation model for a draft
    pub fn synthesize<G: InferenceGateway>(
        &self,
        gateway: &ModalGateway<G>,
        question: &str,
    ) -> Result<DraftSql, PipelineError> {
        let prompt = self.build_prompt(question);

        let raw = {
            let mut session = gateway.session();
            session.set_mode(Mode::Generation);
            session.invoke(&prompt)
        };

        let raw = raw.map_err(|e| {
            warn!(error = %e, "generation call failed");
            PipelineError::GatewayUnavailable(e)
        })?;
        debug!(reply_len = raw.len(), "generation reply received");

        parse_synthesis_response(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::adapters::stub::StubAdapter;
    use crate::llm::GatewayError;

    #[test]
    fn test_parse_valid_sql() {
        let draft = parse_synthesis_response(r#"{"sql_ans": "SELECT region FROM sampledb"}"#);
        assert_eq!(
            draft.unwrap(),
            DraftSql::Sql("SELECT region FROM sampledb".to_string())
        );
    }

    #[test]
    fn test_parse_sentinel() {
        assert_eq!(
            parse_synthesis_response(r#"{"sql_ans": "nan"}"#).unwrap(),
            DraftSql::NotApplicable
        );
        assert_eq!(
            parse_synthesis_response(r#"{"sql_ans": " NaN "}"#).unwrap(),
            DraftSql::NotApplicable
        );
    }

    #[test]
    fn test_parse_missing_field() {
        let err = parse_synthesis_response(r#"{"sql": "SELECT 1"}"#).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedModelResponse(_)));
        assert!(err.to_string().contains("sql_ans"));
    }

    #[test]
    fn test_parse_non_string_field() {
        let err = parse_synthesis_response(r#"{"sql_ans": null}"#).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedModelResponse(_)));
    }

    #[test]
    fn test_parse_fenced_reply() {
        let raw = "```json\n{\"sql_ans\": \"SELECT 1\"}\n```";
        assert_eq!(
            parse_synthesis_response(raw).unwrap(),
            DraftSql::Sql("SELECT 1".to_string())
        );
    }

    #[test]
    fn test_sql_passed_untouched() {
        // Not valid SQL, but syntax is the validator's concern
        let draft = parse_synthesis_response(r#"{"sql_ans": "SELEC  oops"}"#).unwrap();
        assert_eq!(draft, DraftSql::Sql("SELEC  oops".to_string()));
    }

    #[test]
    fn test_prompt_with_schema() {
        let synthesizer = Synthesizer::with_schema_context("sampledb(region TEXT)");
        let prompt = synthesizer.build_prompt(" total by region ");
        assert!(prompt.starts_with("total by region\n"));
        assert!(prompt.ends_with("sampledb(region TEXT)"));
        assert!(Synthesizer::with_schema_context("  ").schema_context().is_none());
    }

    #[test]
    fn test_synthesize_uses_generation_mode() {
        let gateway = ModalGateway::new(StubAdapter::new());
        let draft = Synthesizer::new().synthesize(&gateway, "hello").unwrap();
        assert_eq!(draft, DraftSql::Sql("SELECT 'hello' AS question".to_string()));
        assert_eq!(gateway.inner().calls()[0].0, Mode::Generation);
    }

    #[test]
    fn test_synthesize_gateway_failure() {
        let gateway = ModalGateway::new(
            StubAdapter::new()
                .with_failure(Mode::Generation, GatewayError::Timeout("60s".to_string())),
        );
        let err = Synthesizer::new().synthesize(&gateway, "hello").unwrap_err();
        assert!(matches!(err, PipelineError::GatewayUnavailable(GatewayError::Timeout(_))));
    }
}
