//! Query context builder
//!
//! Pairs the question, the draft SQL and the user's selections into the
//! immutable record the validator works from.

use crate::pipeline::types::{QueryContext, SelectionContext};

/// Build the context for one run
///
/// Pure; never fails. Empty selections are carried as-is.
pub fn build_query_context(
    user_query: &str,
    draft_sql: &str,
    selections: SelectionContext,
) -> QueryContext {
    QueryContext::new(user_query.to_string(), draft_sql.to_string(), selections)
}

impl QueryContext {
    /// Payload understood by the validation model
    pub fn to_validator_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "user_selections": {
                "columns": self.selections().columns(),
                "selected_values": self.selections().selected_values(),
            },
            "user_query": self.user_query(),
            "generated_sql": self.draft_sql(),
        })
    }

    /// Textual encoding sent as the validation prompt
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_validator_payload())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selections() -> SelectionContext {
        SelectionContext::new(
            vec!["item".to_string(), "units".to_string()],
            vec![("region".to_string(), vec!["West".to_string()])],
        )
    }

    #[test]
    fn test_build_preserves_inputs() {
        let ctx = build_query_context("q", "SELECT 1", selections());
        assert_eq!(ctx.user_query(), "q");
        assert_eq!(ctx.draft_sql(), "SELECT 1");
        assert_eq!(ctx.selections(), &selections());
    }

    #[test]
    fn test_payload_shape() {
        let ctx = build_query_context("top item in the west", "SELECT item", selections());
        let payload = ctx.to_validator_payload();
        assert_eq!(payload["user_query"], "top item in the west");
        assert_eq!(payload["generated_sql"], "SELECT item");
        assert_eq!(
            payload["user_selections"]["columns"],
            serde_json::json!(["item", "units"])
        );
        assert_eq!(
            payload["user_selections"]["selected_values"],
            serde_json::json!({"region": ["West"]})
        );
    }

    #[test]
    fn test_empty_selections_encode() {
        let ctx = build_query_context("q", "SELECT 1", SelectionContext::default());
        let encoded: serde_json::Value = serde_json::from_str(&ctx.encode().unwrap()).unwrap();
        assert_eq!(encoded["user_selections"]["columns"], serde_json::json!([]));
        assert_eq!(encoded["user_selections"]["selected_values"], serde_json::json!({}));
    }
}
