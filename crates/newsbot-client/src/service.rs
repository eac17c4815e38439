//! The seam between the conversation engine and the remote service.

use async_trait::async_trait;

use newsbot_core::SessionId;

use crate::error::ClientError;
use crate::protocol::{ChatResponse, HistoryEntry};

/// A decoded chat answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    /// Assistant text.
    pub text: String,
    /// Session id the service considers authoritative, if it sent one.
    pub session_id: Option<SessionId>,
    pub has_context: Option<bool>,
}

impl ChatReply {
    /// Reply without session reassignment or context flag.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            session_id: None,
            has_context: None,
        }
    }
}

impl From<ChatResponse> for ChatReply {
    fn from(response: ChatResponse) -> Self {
        Self {
            text: response.bot_response,
            // A blank id is treated as "not sent".
            session_id: response
                .session_id
                .as_deref()
                .and_then(|id| SessionId::parse(id).ok()),
            has_context: response.has_context,
        }
    }
}

/// Operations the client needs from the assistant service.
#[async_trait]
pub trait NewsService: Send + Sync {
    /// Fetch the remote history of a session, in remote order.
    async fn history(&self, session_id: &SessionId) -> Result<Vec<HistoryEntry>, ClientError>;

    /// Submit one user message.
    async fn chat(&self, session_id: &SessionId, text: &str) -> Result<ChatReply, ClientError>;

    /// Ask the service to drop the server-side history of a session.
    async fn clear_session(&self, session_id: &SessionId) -> Result<(), ClientError>;
}
