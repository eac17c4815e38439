//! Newtype wrappers for identifiers to ensure type safety.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::CoreError;

/// Prefix for client-generated session identifiers.
const SESSION_PREFIX: &str = "session_";

/// Well-known id of the synthetic welcome message.
const WELCOME_ID: &str = "welcome";

/// Well-known id of the transient loading placeholder.
const LOADING_ID: &str = "loading";

/// Identifier of a conversation session.
///
/// Scopes a transcript and its remote history. Client-generated ids look like
/// `session_<uuid>`, but the server may hand out ids of any shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new SessionId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new globally unique SessionId.
    pub fn generate() -> Self {
        Self(format!("{}{}", SESSION_PREFIX, Uuid::new_v4()))
    }

    /// Parse an id received from outside (storage, server), rejecting blanks.
    pub fn parse(id: &str) -> Result<Self, CoreError> {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidSessionId(id.to_owned()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Get the inner string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identifier of a single transcript message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// Create a new MessageId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random MessageId.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Id of the synthetic welcome message.
    pub fn welcome() -> Self {
        Self(WELCOME_ID.to_owned())
    }

    /// Id of the loading placeholder.
    pub fn loading() -> Self {
        Self(LOADING_ID.to_owned())
    }

    /// Get the inner string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}
