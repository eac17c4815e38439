//! Conversation summaries shown in the history list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::SessionId;

/// Longest first message used verbatim as a title.
pub const TITLE_MAX_CHARS: usize = 20;

/// Derive a summary title from the first user message.
///
/// Messages of up to [`TITLE_MAX_CHARS`] characters are used as-is. Longer
/// ones keep one character less and gain a `...` suffix, so
/// `"What happened in the election?"` becomes `"What happened in th..."`.
/// Counts `char`s so multi-byte text is never split.
pub fn derive_title(first_message: &str) -> String {
    if first_message.chars().count() <= TITLE_MAX_CHARS {
        return first_message.to_owned();
    }
    let head: String = first_message.chars().take(TITLE_MAX_CHARS - 1).collect();
    format!("{}...", head)
}

/// A derived index entry describing one session.
///
/// Never hand-edited: built from the first user message of the session and
/// only touched afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Session this summary describes.
    pub id: SessionId,
    /// Truncated first user message.
    pub title: String,
    /// Last time the session was active.
    pub timestamp: DateTime<Utc>,
    /// Full first user message.
    pub preview: String,
    /// Placeholder entry not backed by a real session.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub seed: bool,
}

impl ConversationSummary {
    /// Build the summary of a session from its first user message.
    pub fn from_first_message(
        id: SessionId,
        first_message: &str,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: derive_title(first_message),
            timestamp,
            preview: first_message.to_owned(),
            seed: false,
        }
    }

    /// Build a placeholder entry.
    pub fn seed(id: impl Into<SessionId>, preview: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            seed: true,
            ..Self::from_first_message(id.into(), preview, timestamp)
        }
    }
}
