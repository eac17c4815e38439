//! The Session Store: one durable session id per profile.

use std::path::Path;

use tracing::{debug, info, warn};

use newsbot_core::{ConversationSummary, SessionId};

use crate::store::{DurableStore, FileStore, StoreError};

/// Durable key holding the current session id.
pub const SESSION_KEY: &str = "newsBotSessionId";

/// Durable key holding the serialized History Index.
pub const HISTORY_KEY: &str = "newsBotChatHistory";

/// Where the current session id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOrigin {
    /// Read back from durable storage.
    Restored,
    /// Generated on this run and persisted.
    Created,
    /// Generated on this run; storage is unavailable so it will not survive.
    Ephemeral,
}

/// Owns the durable session id and the persisted history list.
///
/// Storage failures never escape: they are logged and the store degrades to
/// an in-memory session for the rest of the process.
pub struct SessionStore {
    backend: Option<Box<dyn DurableStore>>,
    current: Option<SessionId>,
    origin: Option<SessionOrigin>,
}

impl SessionStore {
    /// Store backed by the given durable storage.
    pub fn new(backend: Box<dyn DurableStore>) -> Self {
        Self {
            backend: Some(backend),
            current: None,
            origin: None,
        }
    }

    /// Store without durable storage.
    pub fn ephemeral() -> Self {
        Self {
            backend: None,
            current: None,
            origin: None,
        }
    }

    /// Open a file-backed store in `data_dir`, falling back to ephemeral.
    pub fn open(data_dir: Option<&Path>) -> Self {
        let Some(dir) = data_dir else {
            warn!("No data directory available; session will not survive restarts");
            return Self::ephemeral();
        };

        match FileStore::open(dir) {
            Ok(store) => {
                debug!(dir = %dir.display(), "Opened session storage");
                Self::new(Box::new(store))
            }
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Session storage unavailable; using ephemeral session");
                Self::ephemeral()
            }
        }
    }

    /// Return the current session id, reading or creating it on first use.
    ///
    /// Generates an id at most once per profile; repeated calls return the
    /// same id until [`set_session_id`](Self::set_session_id) replaces it.
    pub fn get_or_create_session_id(&mut self) -> SessionId {
        if let Some(id) = &self.current {
            return id.clone();
        }

        let (id, origin) = match self.read_stored_id() {
            Ok(Some(id)) => {
                debug!(session_id = %id, "Restored session");
                (id, SessionOrigin::Restored)
            }
            Ok(None) => {
                let id = SessionId::generate();
                let origin = if self.persist_id(&id) {
                    info!(session_id = %id, "Created new session");
                    SessionOrigin::Created
                } else {
                    SessionOrigin::Ephemeral
                };
                (id, origin)
            }
            Err(e) => {
                warn!(error = %e, "Could not read session id; using ephemeral session");
                self.backend = None;
                (SessionId::generate(), SessionOrigin::Ephemeral)
            }
        };

        self.current = Some(id.clone());
        self.origin = Some(origin);
        id
    }

    /// Overwrite the session id (server-authoritative reassignment or switch).
    pub fn set_session_id(&mut self, id: SessionId) {
        self.persist_id(&id);
        self.current = Some(id);
    }

    /// Origin of the current id, once one has been obtained.
    pub fn origin(&self) -> Option<SessionOrigin> {
        self.origin
    }

    /// Whether values written now will survive a restart.
    pub fn is_durable(&self) -> bool {
        self.backend.is_some()
    }

    /// Load the persisted history list. Missing or corrupt data yields `[]`.
    pub fn load_summaries(&self) -> Vec<ConversationSummary> {
        let Some(backend) = &self.backend else {
            return Vec::new();
        };

        let loaded: Result<Vec<ConversationSummary>, StoreError> =
            backend.load(HISTORY_KEY).and_then(|raw| match raw {
                Some(raw) => Ok(serde_json::from_str(&raw)?),
                None => Ok(Vec::new()),
            });

        match loaded {
            Ok(summaries) => summaries,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable chat history");
                Vec::new()
            }
        }
    }

    /// Persist the history list. Failures are logged.
    pub fn save_summaries(&mut self, summaries: &[ConversationSummary]) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };

        let result = serde_json::to_string(summaries)
            .map_err(StoreError::from)
            .and_then(|json| backend.save(HISTORY_KEY, &json));
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist chat history");
        }
    }

    /// Full application reset: drop the stored session id and history.
    ///
    /// The next [`get_or_create_session_id`](Self::get_or_create_session_id)
    /// generates a fresh id.
    pub fn forget(&mut self) -> Result<(), StoreError> {
        self.current = None;
        self.origin = None;
        if let Some(backend) = self.backend.as_mut() {
            backend.remove(SESSION_KEY)?;
            backend.remove(HISTORY_KEY)?;
        }
        Ok(())
    }

    fn read_stored_id(&self) -> Result<Option<SessionId>, StoreError> {
        let Some(backend) = &self.backend else {
            return Ok(None);
        };
        // A blank or malformed value counts as absent.
        Ok(backend
            .load(SESSION_KEY)?
            .and_then(|raw| SessionId::parse(&raw).ok()))
    }

    /// Write the id; on failure degrade to ephemeral. Returns whether it stuck.
    fn persist_id(&mut self, id: &SessionId) -> bool {
        let Some(backend) = self.backend.as_mut() else {
            return false;
        };
        match backend.save(SESSION_KEY, id.as_str()) {
            Ok(()) => true,
            Err(e) => {
                warn!(session_id = %id, error = %e, "Could not persist session id; continuing without durable storage");
                self.backend = None;
                self.origin = Some(SessionOrigin::Ephemeral);
                false
            }
        }
    }
}
