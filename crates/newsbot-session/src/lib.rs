//! Conversation session & synchronization engine.
//!
//! The crate is organized bottom-up:
//! - `store` - durable key/value storage (file-backed or in-memory)
//! - `session` - the Session Store: one durable session id per profile
//! - `transcript` - the append-only message log of the active session
//! - `history` - the History Index of conversation summaries
//! - `hydrator` - rebuilds a transcript from the remote history
//! - `engine` - the Conversation Engine state machine (no I/O)
//! - `runtime` - drives the engine against a [`NewsService`] on tokio
//!
//! [`NewsService`]: newsbot_client::NewsService

pub mod config;
pub mod deadline;
pub mod engine;
pub mod history;
pub mod hydrator;
pub mod runtime;
pub mod session;
pub mod store;
pub mod transcript;

#[cfg(test)]
pub(crate) mod testing;

pub use config::EngineConfig;
pub use engine::{
    ChatCommand, ClearCommand, Conversation, ConversationSnapshot, Effect, HydrateCommand,
    ResetOutcome, Selection, Ticket,
};
pub use history::HistoryIndex;
pub use hydrator::{hydrate, HydrationResult};
pub use runtime::{Completion, Intent, SessionRuntime};
pub use session::{SessionOrigin, SessionStore, HISTORY_KEY, SESSION_KEY};
pub use store::{DurableStore, FileStore, MemoryStore, StoreError};
pub use transcript::Transcript;
