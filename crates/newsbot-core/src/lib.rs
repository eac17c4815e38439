//! NewsBot Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/HTTP
//! - Durable storage
//! - Runtime specifics
//!
//! All types here represent the conversation domain of the NewsBot client:
//! sessions, transcript messages and the summaries shown in the history list.

pub mod chat;
pub mod error;
pub mod ids;
pub mod summary;

// Re-export commonly used types
pub use chat::{Message, Role, LOADING_CONVERSATION_TEXT, LOADING_HISTORY_TEXT, WELCOME_TEXT};
pub use error::CoreError;
pub use ids::{MessageId, SessionId};
pub use summary::{derive_title, ConversationSummary, TITLE_MAX_CHARS};
