//! Engine configuration.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};

use newsbot_core::{ConversationSummary, WELCOME_TEXT};

/// Default base URL of the assistant service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default bound on every request to the service.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration shared by the engine and its runtime.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the assistant service, without trailing `/`.
    pub base_url: String,
    /// Bound on every chat, history and clear request.
    pub request_timeout: Duration,
    /// Directory holding durable client state. `None` means ephemeral.
    pub data_dir: Option<PathBuf>,
    /// Text of the welcome message heading every transcript.
    pub welcome_text: String,
    /// Suggested topics listed in an empty history until the first real
    /// conversation replaces them.
    pub seed_topics: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            data_dir: default_data_dir(),
            welcome_text: WELCOME_TEXT.to_string(),
            seed_topics: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Set the base URL, trimming trailing slashes.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        self.data_dir = data_dir;
        self
    }

    pub fn with_welcome_text(mut self, text: impl Into<String>) -> Self {
        self.welcome_text = text.into();
        self
    }

    pub fn with_seed_topics(mut self, topics: Vec<String>) -> Self {
        self.seed_topics = topics;
        self
    }

    /// Seed entries for the configured topics, blank topics skipped.
    pub fn seed_summaries(&self, now: DateTime<Utc>) -> Vec<ConversationSummary> {
        self.seed_topics
            .iter()
            .map(|topic| topic.trim())
            .filter(|topic| !topic.is_empty())
            .enumerate()
            .map(|(n, topic)| ConversationSummary::seed(format!("seed_{}", n + 1), topic, now))
            .collect()
    }
}

/// Platform data directory for the client, e.g. `~/.local/share/newsbot`.
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("newsbot"))
}
