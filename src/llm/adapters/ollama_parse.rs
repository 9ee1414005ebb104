//! Ollama response parsing
//!
//! Public functions for parsing Ollama `/api/generate` responses.

use crate::llm::adapters::GatewayError;
use serde_json::Value as JsonValue;

/// Parse a non-streaming `/api/generate` response
///
/// Returns the `response` field. A blank field is `EmptyResponse`, a missing
/// one is `InvalidResponse`.
pub fn parse_generate_response(response: &str) -> Result<String, GatewayError> {
    if response.trim().is_empty() {
        return Err(GatewayError::EmptyResponse);
    }

    let json: JsonValue = serde_json::from_str(response)?;

    if let Some(err) = json.get("error").and_then(|e| e.as_str()) {
        return Err(GatewayError::InvalidResponse(format!(
            "provider error: {}",
            err
        )));
    }

    let content = json
        .get("response")
        .and_then(|c| c.as_str())
        .ok_or_else(|| GatewayError::InvalidResponse("Missing response field".to_string()))?;

    let content = content.trim();
    if content.is_empty() {
        return Err(GatewayError::EmptyResponse);
    }

    Ok(content.to_string())
}
