//! Error types for the service client.

use std::time::Duration;

use thiserror::Error;

/// Text used when nothing better describes a failed request.
pub const GENERIC_FAILURE: &str = "Could not get a response.";

/// Detail substituted when an error response body cannot be decoded.
pub const UNDECODABLE_ERROR_BODY: &str = "Network response was not ok.";

/// Errors that can occur when talking to the assistant service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Failed to establish connection.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Base URL or path could not form a valid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Transport-level HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status.
    #[error("HTTP error! status: {status}")]
    Status {
        status: u16,
        /// `detail` from the error body, if any.
        detail: Option<String>,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// No answer within the configured bound.
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The request task died before producing a result.
    #[error("request aborted: {0}")]
    Aborted(String),
}

impl ClientError {
    /// Human-readable reason shown to the user in the transcript.
    pub fn reason(&self) -> String {
        let reason = match self {
            ClientError::Status {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => detail.clone(),
            ClientError::Connection(msg)
            | ClientError::Serialization(msg)
            | ClientError::Aborted(msg) => msg.clone(),
            other => other.to_string(),
        };
        if reason.trim().is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            reason
        }
    }
}
