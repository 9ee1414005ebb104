//! Structured model reply decoding
//!
//! Both model stages answer with a JSON object. Models frequently wrap it in
//! a single Markdown code fence; that wrapper is stripped before decoding.

use regex::Regex;
use serde_json::{Map, Value as JsonValue};
use std::sync::OnceLock;

fn fence_pattern() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE
        .get_or_init(|| Regex::new(r"(?s)\A```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?```\z").ok())
        .as_ref()
}

/// Remove one surrounding code fence, if present
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let body = fence_pattern()
        .and_then(|re| re.captures(trimmed))
        .and_then(|c| c.get(1));
    match body {
        Some(body) => body.as_str().trim(),
        None => trimmed,
    }
}

/// Decode a reply into a JSON object
///
/// The error string names what was wrong, for the malformed-response reason.
pub fn decode_object(raw: &str) -> Result<Map<String, JsonValue>, String> {
    let body = strip_code_fence(raw);
    match serde_json::from_str::<JsonValue>(body) {
        Ok(JsonValue::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a JSON object, got {}", kind_of(&other))),
        Err(e) => Err(format!("not valid JSON ({})", e)),
    }
}

/// Required string field
pub fn string_field(map: &Map<String, JsonValue>, field: &str) -> Result<String, String> {
    match map.get(field) {
        Some(JsonValue::String(s)) => Ok(s.clone()),
        Some(other) => Err(format!("field `{}` is {}, not a string", field, kind_of(other))),
        None => Err(format!("missing `{}` field", field)),
    }
}

fn kind_of(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
