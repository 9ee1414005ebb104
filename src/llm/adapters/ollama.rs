//! Ollama adapter
//!
//! Local Ollama HTTP API. Each mode is served by its own model; the
//! system prompt for a mode lives in that model's Modelfile.

use crate::llm::adapters::transport::{SyncTransport, Transport, UreqTransport};
use crate::llm::adapters::GatewayError;
use crate::llm::{InferenceGateway, Mode, ModelRoster};
use tracing::debug;

pub use crate::llm::adapters::ollama_parse::parse_generate_response;

/// Ollama adapter (local HTTP API)
#[derive(Debug)]
pub struct OllamaAdapter {
    /// Host (e.g., 127.0.0.1)
    host: String,
    /// Port (e.g., 11434)
    port: u16,
    /// Model per mode
    roster: ModelRoster,
    /// HTTP transport
    transport: Transport,
}

impl OllamaAdapter {
    /// Create new Ollama adapter
    pub fn new(host: String, port: u16, roster: ModelRoster, timeout_secs: u64) -> Self {
        Self {
            host,
            port,
            roster,
            transport: Transport::Real(UreqTransport::with_timeout(timeout_secs)),
        }
    }

    /// Create adapter with custom transport (for testing)
    pub fn with_transport(host: String, port: u16, roster: ModelRoster, transport: Transport) -> Self {
        Self {
            host,
            port,
            roster,
            transport,
        }
    }

    /// Build base URL
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn roster(&self) -> &ModelRoster {
        &self.roster
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Build generate request body
    pub fn build_request(&self, mode: Mode, prompt: &str) -> String {
        serde_json::json!({
            "model": self.roster.model_for(mode),
            "prompt": prompt,
            "stream": false
        })
        .to_string()
    }
}

impl InferenceGateway for OllamaAdapter {
    fn invoke(&self, mode: Mode, prompt: &str) -> Result<String, GatewayError> {
        let url = format!("{}/api/generate", self.base_url());
        let body = self.build_request(mode, prompt);
        debug!(%mode, model = self.roster.model_for(mode), "ollama generate");

        let headers = [("Content-Type", "application/json")];

        let response = self.transport.post_json(&url, &headers, &body)?;
        parse_generate_response(&response)
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::adapters::transport::FakeTransport;

    fn adapter(transport: FakeTransport) -> OllamaAdapter {
        OllamaAdapter::with_transport(
            "127.0.0.1".to_string(),
            11434,
            ModelRoster::default(),
            Transport::Fake(transport),
        )
    }

    #[test]
    fn test_base_url() {
        let a = adapter(FakeTransport::new(""));
        assert_eq!(a.base_url(), "http://127.0.0.1:11434");
    }

    #[test]
    fn test_request_uses_model_for_mode() {
        let a = adapter(FakeTransport::new(""));
        let gen: serde_json::Value =
            serde_json::from_str(&a.build_request(Mode::Generation, "q")).unwrap();
        let val: serde_json::Value =
            serde_json::from_str(&a.build_request(Mode::Validation, "q")).unwrap();
        assert_eq!(gen["model"], "sqls");
        assert_eq!(val["model"], "checker");
        assert_eq!(gen["stream"], false);
        assert_eq!(gen["prompt"], "q");
    }

    #[test]
    fn test_invoke_extracts_response_text() {
        let a = adapter(FakeTransport::new(r#"{"response":"hello","done":true}"#));
        let text = a.invoke(Mode::Generation, "hi").unwrap();
        assert_eq!(text, "hello");

        let Transport::Fake(fake) = a.transport() else {
            panic!("expected fake transport");
        };
        let requests = fake.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://127.0.0.1:11434/api/generate");
    }

    #[test]
    fn test_invoke_propagates_transport_error() {
        let a = adapter(FakeTransport::with_error("connection refused"));
        let result = a.invoke(Mode::Validation, "hi");
        assert!(matches!(result, Err(GatewayError::Unreachable(_))));
    }
}
