//! Wire types of the assistant service.
//!
//! - `GET  {base}/history/{session_id}` -> [`HistoryResponse`]
//! - `POST {base}/chat` with [`ChatRequest`] -> [`ChatResponse`]
//! - `POST {base}/clear_session/{session_id}` -> any 2xx, body ignored
//!
//! Non-success responses may carry an [`ErrorBody`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use newsbot_core::Role;

/// Body of `POST /chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub user_message: &'a str,
    pub session_id: &'a str,
}

/// Successful answer of `POST /chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub bot_response: String,
    /// Server-authoritative session id; may differ from the one sent.
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub has_context: Option<bool>,
}

/// Answer of `GET /history/{session_id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryResponse {
    /// Absent, `null` and `[]` all mean "no history".
    #[serde(default)]
    pub history: Option<Vec<HistoryEntry>>,
}

impl HistoryResponse {
    /// Entries in remote order, empty when absent.
    pub fn into_entries(self) -> Vec<HistoryEntry> {
        self.history.unwrap_or_default()
    }
}

/// One remote history entry. Carries no client-stable id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_context: Option<bool>,
}

/// Error body of a non-success response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    /// The detail as display text.
    ///
    /// FastAPI-style validation errors put a list in `detail`; those are
    /// rendered as their JSON text.
    pub fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_absent_or_null_is_empty() {
        let absent: HistoryResponse = serde_json::from_str("{}").unwrap();
        assert!(absent.into_entries().is_empty());

        let null: HistoryResponse = serde_json::from_str(r#"{"history": null}"#).unwrap();
        assert!(null.into_entries().is_empty());
    }

    #[test]
    fn test_history_preserves_order() {
        let body = r#"{"history": [
            {"role": "user", "content": "first"},
            {"role": "assistant", "content": "second", "has_context": true}
        ]}"#;
        let entries = serde_json::from_str::<HistoryResponse>(body)
            .unwrap()
            .into_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].role, Role::User);
        assert_eq!(entries[1].content, "second");
        assert_eq!(entries[1].has_context, Some(true));
    }

    #[test]
    fn test_history_rejects_unknown_role() {
        let body = r#"{"history": [{"role": "system", "content": "x"}]}"#;
        assert!(serde_json::from_str::<HistoryResponse>(body).is_err());
    }

    #[test]
    fn test_chat_request_wire_names() {
        let body = serde_json::to_value(ChatRequest {
            user_message: "hi",
            session_id: "session_1",
        })
        .unwrap();
        assert_eq!(body["user_message"], "hi");
        assert_eq!(body["session_id"], "session_1");
    }

    #[test]
    fn test_error_body_detail_text() {
        let plain: ErrorBody = serde_json::from_str(r#"{"detail": "overloaded"}"#).unwrap();
        assert_eq!(plain.detail_text().as_deref(), Some("overloaded"));

        let list: ErrorBody =
            serde_json::from_str(r#"{"detail": [{"msg": "field required"}]}"#).unwrap();
        assert_eq!(
            list.detail_text().as_deref(),
            Some(r#"[{"msg":"field required"}]"#)
        );

        let missing: ErrorBody = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.detail_text(), None);
    }
}
