//! Stub adapter
//!
//! Answers without network calls. Used by tests and by `provider = "stub"`
//! for dry runs against a real store.
//!
//! Default behavior:
//! - generation: `{"sql_ans": "SELECT '<first prompt line>' AS question"}`
//! - validation: echoes `generated_sql` from the validator payload back as
//!   `updated_sql`, with a fixed comment
//!
//! Both can be overridden with a fixed reply or a fixed error per mode.

use crate::llm::adapters::GatewayError;
use crate::llm::{InferenceGateway, Mode};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Scripted answer for one mode
#[derive(Debug, Clone)]
pub enum StubReply {
    Text(String),
    Fail(GatewayError),
}

/// Stub adapter for testing (returns fake responses)
#[derive(Debug, Default)]
pub struct StubAdapter {
    replies: HashMap<Mode, StubReply>,
    calls: Mutex<Vec<(Mode, String)>>,
}

impl StubAdapter {
    /// Create new stub adapter with echoing default behavior
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a fixed text reply for a mode
    pub fn with_reply(mut self, mode: Mode, text: &str) -> Self {
        self.replies.insert(mode, StubReply::Text(text.to_string()));
        self
    }

    /// Script a failure for a mode
    pub fn with_failure(mut self, mode: Mode, error: GatewayError) -> Self {
        self.replies.insert(mode, StubReply::Fail(error));
        self
    }

    /// Every `(mode, prompt)` pair seen so far, oldest first
    pub fn calls(&self) -> Vec<(Mode, String)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls made in the given mode
    pub fn call_count(&self, mode: Mode) -> usize {
        self.calls().iter().filter(|(m, _)| *m == mode).count()
    }

    fn default_reply(mode: Mode, prompt: &str) -> Result<String, GatewayError> {
        match mode {
            Mode::Generation => {
                let question = prompt.lines().next().unwrap_or_default().trim();
                let literal = question.replace('\'', "''");
                Ok(serde_json::json!({
                    "sql_ans": format!("SELECT '{}' AS question", literal)
                })
                .to_string())
            }
            Mode::Validation => {
                let payload: JsonValue = serde_json::from_str(prompt)?;
                let sql = payload
                    .get("generated_sql")
                    .and_then(|s| s.as_str())
                    .ok_or_else(|| {
                        GatewayError::InvalidResponse("payload has no generated_sql".to_string())
                    })?;
                Ok(serde_json::json!({
                    "updated_sql": sql,
                    "comments": "stub validator: query left unchanged"
                })
                .to_string())
            }
        }
    }
}

impl InferenceGateway for StubAdapter {
    fn invoke(&self, mode: Mode, prompt: &str) -> Result<String, GatewayError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((mode, prompt.to_string()));

        match self.replies.get(&mode) {
            Some(StubReply::Text(text)) => Ok(text.clone()),
            Some(StubReply::Fail(err)) => Err(err.clone()),
            None => Self::default_reply(mode, prompt),
        }
    }

    fn provider_name(&self) -> &str {
        "stub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_generation_echoes_first_line() {
        let adapter = StubAdapter::new();
        let text = adapter
            .invoke(Mode::Generation, "what's up\n\nSchema:\nt(a)")
            .unwrap();
        let json: JsonValue = serde_json::from_str(&text).unwrap();
        assert_eq!(json["sql_ans"], "SELECT 'what''s up' AS question");
    }

    #[test]
    fn test_stub_validation_echoes_generated_sql() {
        let adapter = StubAdapter::new();
        let payload = r#"{"user_query":"q","generated_sql":"SELECT 2","user_selections":{}}"#;
        let text = adapter.invoke(Mode::Validation, payload).unwrap();
        let json: JsonValue = serde_json::from_str(&text).unwrap();
        assert_eq!(json["updated_sql"], "SELECT 2");
        assert!(json["comments"].is_string());
    }

    #[test]
    fn test_stub_scripted_reply_and_failure() {
        let adapter = StubAdapter::new()
            .with_reply(Mode::Generation, "custom response")
            .with_failure(Mode::Validation, GatewayError::EmptyResponse);
        assert_eq!(adapter.invoke(Mode::Generation, "x").unwrap(), "custom response");
        assert_eq!(
            adapter.invoke(Mode::Validation, "x"),
            Err(GatewayError::EmptyResponse)
        );
        assert_eq!(adapter.call_count(Mode::Generation), 1);
        assert_eq!(adapter.call_count(Mode::Validation), 1);
    }

    #[test]
    fn test_stub_provider_name() {
        assert_eq!(StubAdapter::new().provider_name(), "stub");
    }
}
