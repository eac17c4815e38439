//! Test doubles shared by the engine, hydrator and runtime tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use newsbot_client::{ChatReply, ClientError, HistoryEntry, NewsService};
use newsbot_core::SessionId;

use crate::store::{DurableStore, MemoryStore, StoreError};

/// Scripted [`NewsService`] that records every call.
///
/// Queued replies are consumed in order; once a queue is empty chat echoes
/// the text and history is empty.
#[derive(Default)]
pub(crate) struct FakeService {
    chat_replies: Mutex<VecDeque<Result<ChatReply, ClientError>>>,
    history_replies: Mutex<VecDeque<Result<Vec<HistoryEntry>, ClientError>>>,
    gate: Option<Arc<Notify>>,
    chat_delay: Option<Duration>,
    panic_on_chat: bool,
    fail_clear: bool,
    chat_calls: AtomicUsize,
    history_calls: AtomicUsize,
    clear_calls: AtomicUsize,
    chat_sessions: Mutex<Vec<SessionId>>,
    history_sessions: Mutex<Vec<SessionId>>,
}

impl FakeService {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_chat_reply(self, reply: Result<ChatReply, ClientError>) -> Self {
        self.chat_replies.lock().unwrap().push_back(reply);
        self
    }

    pub(crate) fn with_history(self, reply: Result<Vec<HistoryEntry>, ClientError>) -> Self {
        self.history_replies.lock().unwrap().push_back(reply);
        self
    }

    /// Hold every chat request until the gate is notified.
    pub(crate) fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub(crate) fn with_chat_delay(mut self, delay: Duration) -> Self {
        self.chat_delay = Some(delay);
        self
    }

    pub(crate) fn panicking(mut self) -> Self {
        self.panic_on_chat = true;
        self
    }

    pub(crate) fn failing_clear(mut self) -> Self {
        self.fail_clear = true;
        self
    }

    pub(crate) fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn clear_calls(&self) -> usize {
        self.clear_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn chat_sessions(&self) -> Vec<SessionId> {
        self.chat_sessions.lock().unwrap().clone()
    }

    pub(crate) fn history_sessions(&self) -> Vec<SessionId> {
        self.history_sessions.lock().unwrap().clone()
    }
}

#[async_trait]
impl NewsService for FakeService {
    async fn history(&self, session_id: &SessionId) -> Result<Vec<HistoryEntry>, ClientError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.history_sessions.lock().unwrap().push(session_id.clone());
        let reply = self.history_replies.lock().unwrap().pop_front();
        reply.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn chat(&self, session_id: &SessionId, text: &str) -> Result<ChatReply, ClientError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        self.chat_sessions.lock().unwrap().push(session_id.clone());

        if self.panic_on_chat {
            panic!("fake service exploded");
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(delay) = self.chat_delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self.chat_replies.lock().unwrap().pop_front();
        reply.unwrap_or_else(|| Ok(ChatReply::text(format!("echo: {}", text))))
    }

    async fn clear_session(&self, _session_id: &SessionId) -> Result<(), ClientError> {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_clear {
            return Err(ClientError::Connection("connection refused".to_string()));
        }
        Ok(())
    }
}

/// One [`MemoryStore`] shared between handles, to model a reload.
#[derive(Clone, Default)]
pub(crate) struct SharedStore(Arc<Mutex<MemoryStore>>);

impl SharedStore {
    pub(crate) fn value(&self, key: &str) -> Option<String> {
        self.0.lock().unwrap().load(key).unwrap()
    }
}

impl DurableStore for SharedStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.0.lock().unwrap().load(key)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.0.lock().unwrap().save(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.0.lock().unwrap().remove(key)
    }
}
