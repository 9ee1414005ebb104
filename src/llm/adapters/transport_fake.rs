//! Fake transport for testing
//!
//! Uses fixture strings instead of real HTTP calls. Requests are recorded so
//! tests can assert on what an adapter actually sent.

use crate::llm::adapters::transport_types::{GatewayError, SyncTransport};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// One captured request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub body: String,
}

/// Fake transport for testing (uses fixture strings)
#[derive(Debug, Default)]
pub struct FakeTransport {
    /// Response body to return when no per-model body matches
    pub response_body: String,
    /// Response bodies keyed by the `model` field of the request
    pub model_responses: HashMap<String, String>,
    /// Error to return (if set)
    pub error: Option<GatewayError>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeTransport {
    /// Create fake transport with given response
    pub fn new(response: &str) -> Self {
        Self {
            response_body: response.to_string(),
            ..Self::default()
        }
    }

    /// Create fake transport answering per model name
    pub fn with_model_responses(responses: &[(&str, &str)]) -> Self {
        Self {
            model_responses: responses
                .iter()
                .map(|(model, body)| (model.to_string(), body.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    /// Create fake transport that returns a network error
    pub fn with_error(msg: &str) -> Self {
        Self::failing(GatewayError::Unreachable(msg.to_string()))
    }

    /// Create fake transport that returns the given error
    pub fn failing(error: GatewayError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    /// Requests seen so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn response_for(&self, body: &str) -> String {
        let model = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("model").and_then(|m| m.as_str()).map(String::from));
        model
            .and_then(|m| self.model_responses.get(&m).cloned())
            .unwrap_or_else(|| self.response_body.clone())
    }
}

impl SyncTransport for FakeTransport {
    fn post_json(
        &self,
        url: &str,
        _headers: &[(&str, &str)],
        body: &str,
    ) -> Result<String, GatewayError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                url: url.to_string(),
                body: body.to_string(),
            });
        if let Some(ref err) = self.error {
            return Err(err.clone());
        }
        Ok(self.response_for(body))
    }
}
