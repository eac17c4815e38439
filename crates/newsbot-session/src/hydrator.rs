//! The History Hydrator: rebuilds a transcript from the remote history.

use std::time::Duration;

use tracing::{debug, warn};

use newsbot_client::{ClientError, HistoryEntry, NewsService};
use newsbot_core::{Message, SessionId};

use crate::deadline::bounded;

/// Outcome of one hydration request.
#[derive(Debug)]
pub enum HydrationResult {
    /// Remote history mapped to local messages, in remote order.
    Restored(Vec<Message>),
    /// The service has no history for the session.
    Empty,
    /// The request failed. The transcript falls back to the welcome message.
    Failed(ClientError),
}

impl HydrationResult {
    /// Map remote entries, giving each a fresh local id.
    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        if entries.is_empty() {
            return Self::Empty;
        }
        Self::Restored(
            entries
                .into_iter()
                .map(|entry| {
                    Message::new(entry.role, entry.content).with_context(entry.has_context)
                })
                .collect(),
        )
    }

    /// The transcript this result settles to: the welcome message followed by
    /// any restored messages.
    pub fn into_messages(self, welcome_text: &str) -> Vec<Message> {
        let mut messages = vec![Message::welcome(welcome_text)];
        if let Self::Restored(restored) = self {
            messages.extend(restored);
        }
        messages
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Fetch and map the remote history of `session_id`.
///
/// Never fails: errors are logged and returned as [`HydrationResult::Failed`].
pub async fn hydrate(
    service: &dyn NewsService,
    session_id: &SessionId,
    timeout: Duration,
) -> HydrationResult {
    match bounded(timeout, service.history(session_id)).await {
        Ok(entries) => {
            debug!(session_id = %session_id, count = entries.len(), "Fetched remote history");
            HydrationResult::from_entries(entries)
        }
        Err(e) => {
            warn!(session_id = %session_id, error = %e, "Hydration failed; starting from welcome message");
            HydrationResult::Failed(e)
        }
    }
}
