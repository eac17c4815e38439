//! Core domain errors.

use thiserror::Error;

/// Core domain errors for NewsBot.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Session identifier was empty or blank.
    #[error("Invalid session id: {0:?}")]
    InvalidSessionId(String),

    /// Role string not recognized.
    #[error("Unknown message role: {0}")]
    UnknownRole(String),

    /// A message with this id is already in the transcript.
    #[error("Duplicate message id: {0}")]
    DuplicateMessageId(String),
}
