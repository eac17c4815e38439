//! Messages between the UI thread and the backend task.

use newsbot_core::SessionId;
use newsbot_session::ConversationSnapshot;

/// Events sent from the backend to the UI thread.
#[derive(Debug)]
pub enum UiEvent {
    /// Fresh view of the conversation after a state change.
    Snapshot(ConversationSnapshot),
}

/// Commands sent from the UI thread to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    /// Submit the text in the input box.
    Submit(String),

    /// Start the conversation over.
    Reset,

    /// Open a history entry.
    SelectHistory(SessionId),

    /// Quit the application.
    Quit,
}
