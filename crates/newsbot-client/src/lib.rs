//! Client library for the NewsBot assistant service.
//!
//! Provides the wire types of the remote contract, the [`NewsService`] seam
//! the conversation engine talks to, and a reqwest-backed [`HttpClient`].

pub mod error;
pub mod http;
pub mod protocol;
pub mod service;

pub use error::ClientError;
pub use http::HttpClient;
pub use protocol::{ChatRequest, ChatResponse, ErrorBody, HistoryEntry, HistoryResponse};
pub use service::{ChatReply, NewsService};
