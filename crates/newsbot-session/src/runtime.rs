//! Async driver for the Conversation Engine.
//!
//! [`SessionRuntime`] owns the engine and the Session Store and runs every
//! request the engine asks for as a tokio task. Completions come back over a
//! channel and are applied one at a time, so all state transitions stay on
//! the caller's task.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use newsbot_client::{ChatReply, ClientError, NewsService};
use newsbot_core::{SessionId, LOADING_CONVERSATION_TEXT};

use crate::config::EngineConfig;
use crate::deadline::bounded;
use crate::engine::{
    ChatCommand, ClearCommand, Conversation, ConversationSnapshot, Effect, HydrateCommand, Ticket,
};
use crate::history::HistoryIndex;
use crate::hydrator::{hydrate, HydrationResult};
use crate::session::{SessionOrigin, SessionStore};
use crate::store::StoreError;

/// User intents accepted by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Submit(String),
    Reset,
    SelectHistory(SessionId),
}

/// Result of a finished request task.
#[derive(Debug)]
pub enum Completion {
    Chat {
        ticket: Ticket,
        result: Result<ChatReply, ClientError>,
    },
    Hydration {
        ticket: Ticket,
        result: HydrationResult,
    },
    Cleared {
        session_id: SessionId,
        result: Result<(), ClientError>,
    },
}

/// Drives a [`Conversation`] against a [`NewsService`].
pub struct SessionRuntime {
    conversation: Conversation,
    store: SessionStore,
    service: Arc<dyn NewsService>,
    request_timeout: Duration,
    chat: Option<(Ticket, CancellationToken)>,
    hydration: Option<CancellationToken>,
    outstanding: usize,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
}

impl SessionRuntime {
    /// Build the runtime without issuing any request.
    pub fn open(
        config: &EngineConfig,
        service: Arc<dyn NewsService>,
        mut store: SessionStore,
    ) -> Self {
        let session_id = store.get_or_create_session_id();
        let mut history = HistoryIndex::from_entries(store.load_summaries());
        if history.is_empty() {
            let seeds = config.seed_summaries(Utc::now());
            if !seeds.is_empty() {
                history = HistoryIndex::with_seeds(seeds);
            }
        }
        debug!(session_id = %session_id, summaries = history.len(), "Opened conversation");

        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            conversation: Conversation::new(session_id, history, &config.welcome_text),
            store,
            service,
            request_timeout: config.request_timeout,
            chat: None,
            hydration: None,
            outstanding: 0,
            completion_tx,
            completion_rx,
        }
    }

    /// Build the runtime and hydrate a restored session.
    ///
    /// A freshly created session cannot have remote history, so it starts
    /// from the welcome message without a request.
    pub fn start(
        config: &EngineConfig,
        service: Arc<dyn NewsService>,
        store: SessionStore,
    ) -> Self {
        let mut runtime = Self::open(config, service, store);
        if runtime.store.origin() == Some(SessionOrigin::Restored) {
            runtime.hydrate_current(LOADING_CONVERSATION_TEXT);
        }
        runtime
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        self.conversation.snapshot()
    }

    /// Whether request tasks are still running.
    pub fn is_busy(&self) -> bool {
        self.outstanding > 0
    }

    /// Apply one user intent.
    pub fn handle_intent(&mut self, intent: Intent) {
        match intent {
            Intent::Submit(text) => {
                if let Some(command) = self.conversation.submit(&text) {
                    self.spawn_chat(command);
                }
            }
            Intent::Reset => {
                let outcome = self.conversation.reset();
                if let Some(ticket) = outcome.cancelled {
                    self.cancel_chat(ticket);
                }
                self.cancel_hydration();
                self.spawn_clear(outcome.clear);
            }
            Intent::SelectHistory(id) => {
                let Some(selection) = self.conversation.select_history(&id) else {
                    debug!(session_id = %id, "Ignoring selection of unknown history entry");
                    return;
                };
                if let Some(ticket) = selection.cancelled {
                    self.cancel_chat(ticket);
                }
                self.apply_effects(selection.effects);
                self.cancel_hydration();
                self.spawn_hydration(selection.hydrate);
            }
        }
    }

    /// Show `loading_text` and re-fetch the active session's history.
    pub fn hydrate_current(&mut self, loading_text: &str) {
        self.cancel_hydration();
        let command = self.conversation.begin_hydration(loading_text);
        self.spawn_hydration(command);
    }

    /// Wait for the next finished request. Pending forever when idle.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        let completion = self.completion_rx.recv().await?;
        self.outstanding = self.outstanding.saturating_sub(1);
        Some(completion)
    }

    /// Apply a finished request to the engine.
    pub fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Chat { ticket, result } => {
                if matches!(&self.chat, Some((t, _)) if *t == ticket) {
                    self.chat = None;
                }
                let effects = self.conversation.complete_submit(ticket, result);
                self.apply_effects(effects);
            }
            Completion::Hydration { ticket, result } => {
                let effects = self.conversation.complete_hydration(ticket, result);
                if !self.conversation.is_hydrating() {
                    self.hydration = None;
                }
                self.apply_effects(effects);
            }
            Completion::Cleared { session_id, result } => match result {
                Ok(()) => debug!(session_id = %session_id, "Remote history cleared"),
                Err(e) => {
                    warn!(session_id = %session_id, error = %e, "Failed to clear remote history")
                }
            },
        }
    }

    /// Run until every outstanding request has completed.
    pub async fn settle(&mut self) {
        while self.outstanding > 0 {
            match self.next_completion().await {
                Some(completion) => self.handle_completion(completion),
                None => break,
            }
        }
    }

    /// Full application reset: drop the stored session and history and start
    /// over on a fresh session.
    pub fn forget(&mut self) -> Result<SessionId, StoreError> {
        if let Some(ticket) = self.chat.as_ref().map(|(ticket, _)| *ticket) {
            self.cancel_chat(ticket);
        }
        self.cancel_hydration();
        self.store.forget()?;

        let session_id = self.store.get_or_create_session_id();
        self.conversation.forget(session_id.clone());
        info!(session_id = %session_id, "Forgot all conversations");
        Ok(session_id)
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::PersistSession(id) => self.store.set_session_id(id),
                Effect::PersistHistory => {
                    let summaries = self.conversation.history().persistable();
                    self.store.save_summaries(&summaries);
                }
            }
        }
    }

    fn cancel_chat(&mut self, ticket: Ticket) {
        if matches!(&self.chat, Some((current, _)) if *current == ticket) {
            if let Some((_, token)) = self.chat.take() {
                debug!(ticket = ticket.value(), "Cancelling chat request");
                token.cancel();
            }
        }
    }

    fn cancel_hydration(&mut self) {
        if let Some(token) = self.hydration.take() {
            token.cancel();
        }
    }

    fn spawn_chat(&mut self, command: ChatCommand) {
        let ChatCommand {
            ticket,
            session_id,
            text,
        } = command;
        let service = Arc::clone(&self.service);
        let timeout = self.request_timeout;

        let token = self.spawn_request(
            async move { bounded(timeout, service.chat(&session_id, &text)).await },
            move |result| Completion::Chat { ticket, result },
        );
        self.chat = Some((ticket, token));
    }

    fn spawn_hydration(&mut self, command: HydrateCommand) {
        let HydrateCommand { ticket, session_id } = command;
        let service = Arc::clone(&self.service);
        let timeout = self.request_timeout;

        let token = self.spawn_request(
            async move {
                Ok::<_, ClientError>(hydrate(service.as_ref(), &session_id, timeout).await)
            },
            move |result| Completion::Hydration {
                ticket,
                result: result.unwrap_or_else(HydrationResult::Failed),
            },
        );
        self.hydration = Some(token);
    }

    fn spawn_clear(&mut self, command: ClearCommand) {
        let ClearCommand { session_id } = command;
        let service = Arc::clone(&self.service);
        let timeout = self.request_timeout;
        let id = session_id.clone();

        self.spawn_request(
            async move { bounded(timeout, service.clear_session(&id)).await },
            move |result| Completion::Cleared { session_id, result },
        );
    }

    /// Run `request` on its own task and deliver exactly one completion.
    ///
    /// A panic or cancellation of the request still produces a completion
    /// (as [`ClientError::Aborted`]), so the engine is never left pending.
    fn spawn_request<T, Fut, Wrap>(&mut self, request: Fut, wrap: Wrap) -> CancellationToken
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
        Wrap: FnOnce(Result<T, ClientError>) -> Completion + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let tx = self.completion_tx.clone();
        self.outstanding += 1;

        tokio::spawn(async move {
            let mut handle = tokio::spawn(request);
            let result = tokio::select! {
                _ = cancelled.cancelled() => {
                    handle.abort();
                    Err(ClientError::Aborted("request cancelled".to_string()))
                }
                joined = &mut handle => joined.unwrap_or_else(|e| Err(join_failure(e))),
            };
            let _ = tx.send(wrap(result));
        });

        token
    }
}

fn join_failure(err: JoinError) -> ClientError {
    if err.is_panic() {
        ClientError::Aborted("request task panicked".to_string())
    } else {
        ClientError::Aborted("request cancelled".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{HISTORY_KEY, SESSION_KEY};
    use crate::store::{DurableStore, MemoryStore};
    use crate::testing::{FakeService, SharedStore};
    use newsbot_client::HistoryEntry;
    use newsbot_core::{ConversationSummary, Role, LOADING_HISTORY_TEXT};
    use tokio::sync::Notify;

    fn config() -> EngineConfig {
        EngineConfig::default()
            .with_data_dir(None)
            .with_welcome_text("Welcome!")
    }

    fn fresh_store() -> SessionStore {
        SessionStore::new(Box::new(MemoryStore::new()))
    }

    fn restored_store(session: &str) -> SharedStore {
        let mut shared = SharedStore::default();
        shared.save(SESSION_KEY, session).unwrap();
        shared
    }

    fn entry(role: Role, content: &str) -> HistoryEntry {
        HistoryEntry {
            role,
            content: content.to_string(),
            has_context: None,
        }
    }

    fn contents(runtime: &SessionRuntime) -> Vec<String> {
        runtime
            .snapshot()
            .messages
            .into_iter()
            .map(|m| m.content)
            .collect()
    }

    #[tokio::test]
    async fn test_fresh_session_starts_without_hydration() {
        let service = Arc::new(FakeService::new());
        let mut runtime = SessionRuntime::start(&config(), service.clone(), fresh_store());
        runtime.settle().await;

        assert_eq!(contents(&runtime), vec!["Welcome!"]);
        assert_eq!(service.history_calls(), 0);
    }

    #[tokio::test]
    async fn test_restored_session_is_hydrated() {
        let shared = restored_store("session_old");
        let service = Arc::new(FakeService::new().with_history(Ok(vec![
            entry(Role::User, "What happened in the election?"),
            entry(Role::Assistant, "Turnout was high."),
        ])));

        let mut runtime = SessionRuntime::start(
            &config(),
            service.clone(),
            SessionStore::new(Box::new(shared.clone())),
        );
        assert_eq!(contents(&runtime), vec![LOADING_CONVERSATION_TEXT]);
        assert!(runtime.snapshot().hydrating);

        runtime.settle().await;

        assert_eq!(
            contents(&runtime),
            vec!["Welcome!", "What happened in the election?", "Turnout was high."]
        );
        assert_eq!(service.history_sessions(), vec![SessionId::new("session_old")]);

        let stored: Vec<ConversationSummary> =
            serde_json::from_str(&shared.value(HISTORY_KEY).unwrap()).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "What happened in th...");
    }

    #[tokio::test]
    async fn test_seed_topics_listed_until_first_exchange() {
        let shared = SharedStore::default();
        let config = config().with_seed_topics(vec!["Markets".to_string()]);
        let service = Arc::new(FakeService::new());
        let mut runtime = SessionRuntime::start(
            &config,
            service,
            SessionStore::new(Box::new(shared.clone())),
        );

        let history = runtime.snapshot().history;
        assert_eq!(history.len(), 1);
        assert!(history[0].seed);

        runtime.handle_intent(Intent::Submit("real question".to_string()));
        runtime.settle().await;

        let history = runtime.snapshot().history;
        assert_eq!(history.len(), 1);
        assert!(!history[0].seed);
        assert_eq!(history[0].preview, "real question");

        let stored: Vec<ConversationSummary> =
            serde_json::from_str(&shared.value(HISTORY_KEY).unwrap()).unwrap();
        assert_eq!(stored.len(), 1);
        assert!(!stored[0].seed);
    }

    #[tokio::test]
    async fn test_back_to_back_submissions_send_one_request() {
        let gate = Arc::new(Notify::new());
        let service = Arc::new(FakeService::new().with_gate(gate.clone()));
        let mut runtime = SessionRuntime::start(&config(), service.clone(), fresh_store());

        runtime.handle_intent(Intent::Submit("first".to_string()));
        runtime.handle_intent(Intent::Submit("second".to_string()));
        assert!(runtime.snapshot().pending);
        assert_eq!(contents(&runtime), vec!["Welcome!", "first"]);

        gate.notify_one();
        runtime.settle().await;

        assert_eq!(service.chat_calls(), 1);
        assert_eq!(contents(&runtime), vec!["Welcome!", "first", "echo: first"]);
        assert!(!runtime.snapshot().pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_reply_times_out() {
        let service = Arc::new(FakeService::new().with_chat_delay(Duration::from_secs(120)));
        let mut runtime = SessionRuntime::start(&config(), service, fresh_store());

        runtime.handle_intent(Intent::Submit("hello".to_string()));
        runtime.settle().await;

        let snapshot = runtime.snapshot();
        assert!(!snapshot.pending);
        assert_eq!(
            snapshot.messages.last().unwrap().content,
            "Error: request timed out after 60s"
        );
    }

    #[tokio::test]
    async fn test_panicking_request_releases_pending() {
        let service = Arc::new(FakeService::new().panicking());
        let mut runtime = SessionRuntime::start(&config(), service, fresh_store());

        runtime.handle_intent(Intent::Submit("hello".to_string()));
        runtime.settle().await;

        let snapshot = runtime.snapshot();
        assert!(!snapshot.pending);
        let last = snapshot.messages.last().unwrap();
        assert!(last.is_failure());
        assert_eq!(last.content, "Error: request task panicked");
    }

    #[tokio::test]
    async fn test_server_error_detail_shown_inline() {
        let service = Arc::new(FakeService::new().with_chat_reply(Err(ClientError::Status {
            status: 500,
            detail: Some("overloaded".to_string()),
        })));
        let mut runtime = SessionRuntime::start(&config(), service, fresh_store());

        runtime.handle_intent(Intent::Submit("hello".to_string()));
        runtime.settle().await;

        assert_eq!(contents(&runtime), vec!["Welcome!", "hello", "Error: overloaded"]);
        assert!(runtime.snapshot().history.is_empty());
    }

    #[tokio::test]
    async fn test_reset_cancels_in_flight_request() {
        let gate = Arc::new(Notify::new());
        let service = Arc::new(FakeService::new().with_gate(gate.clone()));
        let mut runtime = SessionRuntime::start(&config(), service.clone(), fresh_store());
        let session = runtime.snapshot().session_id;

        runtime.handle_intent(Intent::Submit("slow".to_string()));
        runtime.handle_intent(Intent::Reset);
        runtime.settle().await;
        gate.notify_one();

        let snapshot = runtime.snapshot();
        assert_eq!(contents(&runtime), vec!["Welcome!"]);
        assert!(!snapshot.pending);
        assert_eq!(snapshot.session_id, session);
        assert_eq!(service.clear_calls(), 1);
        assert!(!runtime.is_busy());
    }

    #[tokio::test]
    async fn test_reset_survives_clear_failure() {
        let service = Arc::new(FakeService::new().failing_clear());
        let mut runtime = SessionRuntime::start(&config(), service.clone(), fresh_store());

        runtime.handle_intent(Intent::Submit("hello".to_string()));
        runtime.settle().await;
        runtime.handle_intent(Intent::Reset);
        runtime.settle().await;

        assert_eq!(contents(&runtime), vec!["Welcome!"]);
        assert_eq!(service.clear_calls(), 1);
    }

    #[tokio::test]
    async fn test_reassigned_session_is_persisted() {
        let shared = SharedStore::default();
        let service = Arc::new(FakeService::new().with_chat_reply(Ok(ChatReply {
            session_id: Some(SessionId::new("session_server")),
            ..ChatReply::text("hi")
        })));
        let mut runtime = SessionRuntime::start(
            &config(),
            service.clone(),
            SessionStore::new(Box::new(shared.clone())),
        );

        runtime.handle_intent(Intent::Submit("hello".to_string()));
        runtime.settle().await;
        runtime.handle_intent(Intent::Submit("again".to_string()));
        runtime.settle().await;

        assert_eq!(shared.value(SESSION_KEY).as_deref(), Some("session_server"));
        assert_eq!(
            service.chat_sessions().last(),
            Some(&SessionId::new("session_server"))
        );
        let stored: Vec<ConversationSummary> =
            serde_json::from_str(&shared.value(HISTORY_KEY).unwrap()).unwrap();
        assert_eq!(stored[0].id, SessionId::new("session_server"));
    }

    #[tokio::test]
    async fn test_select_history_switches_and_hydrates() {
        let mut shared = restored_store("session_current");
        let older = ConversationSummary::from_first_message(
            SessionId::new("session_older"),
            "Older question",
            chrono::Utc::now(),
        );
        shared
            .save(HISTORY_KEY, &serde_json::to_string(&vec![older]).unwrap())
            .unwrap();

        let service = Arc::new(
            FakeService::new()
                .with_history(Ok(vec![]))
                .with_history(Ok(vec![
                    entry(Role::User, "Older question"),
                    entry(Role::Assistant, "Older answer"),
                ])),
        );
        let mut runtime = SessionRuntime::start(
            &config(),
            service.clone(),
            SessionStore::new(Box::new(shared.clone())),
        );
        runtime.settle().await;

        runtime.handle_intent(Intent::SelectHistory(SessionId::new("session_older")));
        assert_eq!(contents(&runtime), vec![LOADING_HISTORY_TEXT]);
        runtime.settle().await;

        let snapshot = runtime.snapshot();
        assert_eq!(snapshot.session_id, SessionId::new("session_older"));
        assert_eq!(
            snapshot.active_history,
            Some(SessionId::new("session_older"))
        );
        assert_eq!(
            contents(&runtime),
            vec!["Welcome!", "Older question", "Older answer"]
        );
        assert_eq!(
            service.history_sessions(),
            vec![
                SessionId::new("session_current"),
                SessionId::new("session_older")
            ]
        );
        assert_eq!(shared.value(SESSION_KEY).as_deref(), Some("session_older"));
    }

    #[tokio::test]
    async fn test_select_unknown_entry_is_noop() {
        let service = Arc::new(FakeService::new());
        let mut runtime = SessionRuntime::start(&config(), service.clone(), fresh_store());

        runtime.handle_intent(Intent::SelectHistory(SessionId::new("missing")));
        assert!(!runtime.is_busy());
        assert_eq!(service.history_calls(), 0);
    }

    #[tokio::test]
    async fn test_forget_starts_fresh_session() {
        let shared = SharedStore::default();
        let service = Arc::new(FakeService::new());
        let mut runtime = SessionRuntime::start(
            &config(),
            service,
            SessionStore::new(Box::new(shared.clone())),
        );
        runtime.handle_intent(Intent::Submit("hello".to_string()));
        runtime.settle().await;
        let old = runtime.snapshot().session_id;

        let fresh = runtime.forget().unwrap();

        assert_ne!(fresh, old);
        assert!(runtime.snapshot().history.is_empty());
        assert_eq!(shared.value(HISTORY_KEY), None);
        assert_eq!(shared.value(SESSION_KEY).as_deref(), Some(fresh.as_str()));
    }
}
