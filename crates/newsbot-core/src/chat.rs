//! Chat message types for the conversation transcript.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ids::MessageId;

/// Greeting shown at the top of every transcript.
pub const WELCOME_TEXT: &str =
    "Hello! I'm your RAG NewsBot. Ask me anything about recent news and events.";

/// Placeholder shown while a restored session is hydrated on startup.
pub const LOADING_CONVERSATION_TEXT: &str = "Loading your conversation...";

/// Placeholder shown while a selected history entry is hydrated.
pub const LOADING_HISTORY_TEXT: &str = "Loading chat history...";

/// Prefix of inline failure messages.
const FAILURE_PREFIX: &str = "Error: ";

/// Role of a message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message typed by the user.
    User,
    /// Message produced by the news assistant (or by the client on its behalf).
    Assistant,
}

impl Role {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(CoreError::UnknownRole(other.to_owned())),
        }
    }
}

/// A message in the transcript. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique id within the transcript.
    pub id: MessageId,
    /// Visible text.
    pub content: String,
    /// Who speaks the message.
    pub role: Role,
    /// When the message was created locally.
    pub created_at: DateTime<Utc>,
    /// Whether the answer was grounded in retrieved news context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_context: Option<bool>,
    /// Set only on inline failure entries produced by the client.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
}

impl Message {
    /// Create a new message with a fresh id.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            content: content.into(),
            role,
            created_at: Utc::now(),
            has_context: None,
            failed: false,
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// The synthetic welcome message that heads every transcript.
    pub fn welcome(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::welcome(),
            ..Self::assistant(content)
        }
    }

    /// The transient placeholder shown while history loads.
    pub fn loading(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::loading(),
            ..Self::assistant(content)
        }
    }

    /// An inline failure entry carrying the failure reason as visible text.
    pub fn failure(reason: &str) -> Self {
        Self {
            failed: true,
            ..Self::assistant(format!("{}{}", FAILURE_PREFIX, reason))
        }
    }

    /// Attach the context flag reported by the service.
    pub fn with_context(mut self, has_context: Option<bool>) -> Self {
        self.has_context = has_context;
        self
    }

    /// Whether this is the loading placeholder.
    pub fn is_loading(&self) -> bool {
        self.id == MessageId::loading()
    }

    /// Whether this is an inline failure entry.
    pub fn is_failure(&self) -> bool {
        self.failed
    }
}
