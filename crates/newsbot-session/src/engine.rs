//! The Conversation Engine.
//!
//! A state machine with no I/O. Intents (`submit`, `reset`, `select_history`)
//! mutate the state and return the request the caller must issue; the caller
//! feeds results back through the `complete_*` methods. Every request carries
//! a [`Ticket`] so a result that arrives after a reset or selection
//! superseded it is recognized and dropped.

use chrono::Utc;
use tracing::{debug, error, info, warn};

use newsbot_client::{ChatReply, ClientError};
use newsbot_core::{ConversationSummary, Message, SessionId, LOADING_HISTORY_TEXT};

use crate::history::HistoryIndex;
use crate::hydrator::HydrationResult;
use crate::transcript::Transcript;

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// A chat submission to send.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCommand {
    pub ticket: Ticket,
    pub session_id: SessionId,
    pub text: String,
}

/// A history fetch to send.
#[derive(Debug, Clone, PartialEq)]
pub struct HydrateCommand {
    pub ticket: Ticket,
    pub session_id: SessionId,
}

/// A best-effort remote clear to send. Its result never reaches the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ClearCommand {
    pub session_id: SessionId,
}

/// Result of [`Conversation::reset`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResetOutcome {
    pub clear: ClearCommand,
    /// Submission abandoned by the reset, if one was in flight.
    pub cancelled: Option<Ticket>,
}

/// Result of [`Conversation::select_history`].
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub hydrate: HydrateCommand,
    /// Submission abandoned by the switch, if one was in flight.
    pub cancelled: Option<Ticket>,
    pub effects: Vec<Effect>,
}

/// Durable writes requested by a state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// The active session id changed and must be stored.
    PersistSession(SessionId),
    /// The History Index changed and must be stored.
    PersistHistory,
}

/// Read-only view of the engine for presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSnapshot {
    pub session_id: SessionId,
    pub messages: Vec<Message>,
    /// A submission is outstanding; drives the typing indicator.
    pub pending: bool,
    /// The transcript is the loading placeholder.
    pub hydrating: bool,
    pub history: Vec<ConversationSummary>,
    pub active_history: Option<SessionId>,
}

/// One conversation: the active session, its transcript and the history list.
#[derive(Debug)]
pub struct Conversation {
    session_id: SessionId,
    transcript: Transcript,
    pending: Option<Ticket>,
    hydrating: Option<Ticket>,
    history: HistoryIndex,
    active_history: Option<SessionId>,
    welcome_text: String,
    next_ticket: u64,
}

impl Conversation {
    /// Start with a welcome-only transcript.
    pub fn new(session_id: SessionId, history: HistoryIndex, welcome_text: &str) -> Self {
        Self {
            session_id,
            transcript: Transcript::welcome(welcome_text),
            pending: None,
            hydrating: None,
            history,
            active_history: None,
            welcome_text: welcome_text.to_owned(),
            next_ticket: 0,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_hydrating(&self) -> bool {
        self.hydrating.is_some()
    }

    pub fn history(&self) -> &HistoryIndex {
        &self.history
    }

    pub fn active_history(&self) -> Option<&SessionId> {
        self.active_history.as_ref()
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            session_id: self.session_id.clone(),
            messages: self.transcript.messages().to_vec(),
            pending: self.is_pending(),
            hydrating: self.is_hydrating(),
            history: self.history.entries().to_vec(),
            active_history: self.active_history.clone(),
        }
    }

    /// Accept a user message and return the request to send.
    ///
    /// No-op (`None`) when the text is blank, a submission is outstanding, or
    /// the loading placeholder is showing.
    pub fn submit(&mut self, text: &str) -> Option<ChatCommand> {
        if text.trim().is_empty() {
            return None;
        }
        if self.is_pending() {
            debug!(session_id = %self.session_id, "Submission rejected: request in flight");
            return None;
        }
        if self.is_hydrating() {
            debug!(session_id = %self.session_id, "Submission rejected: history still loading");
            return None;
        }

        self.push(Message::user(text));
        let ticket = self.issue_ticket();
        self.pending = Some(ticket);
        Some(ChatCommand {
            ticket,
            session_id: self.session_id.clone(),
            text: text.to_owned(),
        })
    }

    /// Apply the result of a chat request.
    pub fn complete_submit(
        &mut self,
        ticket: Ticket,
        result: Result<ChatReply, ClientError>,
    ) -> Vec<Effect> {
        if self.pending != Some(ticket) {
            debug!(ticket = ticket.value(), "Ignoring stale chat completion");
            return Vec::new();
        }
        self.pending = None;

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!(session_id = %self.session_id, error = %e, "Chat request failed");
                self.push(Message::failure(&e.reason()));
                return Vec::new();
            }
        };

        let mut effects = Vec::new();
        self.push(Message::assistant(reply.text).with_context(reply.has_context));

        if let Some(assigned) = reply.session_id.filter(|id| id != &self.session_id) {
            info!(old = %self.session_id, new = %assigned, "Service reassigned session");
            self.session_id = assigned.clone();
            effects.push(Effect::PersistSession(assigned));
        }

        if self.record_activity() {
            effects.push(Effect::PersistHistory);
        }
        effects
    }

    /// Back to a welcome-only transcript, keeping the session id.
    pub fn reset(&mut self) -> ResetOutcome {
        let cancelled = self.pending.take();
        self.hydrating = None;
        self.transcript = Transcript::welcome(&self.welcome_text);
        self.active_history = None;
        info!(session_id = %self.session_id, "Conversation reset");

        ResetOutcome {
            clear: ClearCommand {
                session_id: self.session_id.clone(),
            },
            cancelled,
        }
    }

    /// Show the loading placeholder and return the history fetch to send.
    pub fn begin_hydration(&mut self, loading_text: &str) -> HydrateCommand {
        let ticket = self.issue_ticket();
        self.hydrating = Some(ticket);
        self.transcript = Transcript::loading(loading_text);
        HydrateCommand {
            ticket,
            session_id: self.session_id.clone(),
        }
    }

    /// Replace the placeholder with the hydrated transcript.
    pub fn complete_hydration(&mut self, ticket: Ticket, result: HydrationResult) -> Vec<Effect> {
        if self.hydrating != Some(ticket) {
            debug!(ticket = ticket.value(), "Ignoring stale hydration");
            return Vec::new();
        }
        self.hydrating = None;

        let messages = result.into_messages(&self.welcome_text);
        if let Err(e) = self.transcript.replace(messages) {
            error!(error = %e, "Hydrated transcript rejected");
            self.transcript = Transcript::welcome(&self.welcome_text);
        }

        let Some(first) = self.transcript.first_user_message() else {
            return Vec::new();
        };
        self.active_history = Some(self.session_id.clone());
        if self.history.contains(&self.session_id) {
            return Vec::new();
        }
        let summary = ConversationSummary::from_first_message(
            self.session_id.clone(),
            &first.content,
            Utc::now(),
        );
        if self.record_summary(summary) {
            vec![Effect::PersistHistory]
        } else {
            Vec::new()
        }
    }

    /// Open a history entry. `None` when `id` is not in the index.
    ///
    /// A real entry other than the active session becomes the active session.
    /// Seeds only move the selection. Either way the (possibly new) active
    /// session is hydrated.
    pub fn select_history(&mut self, id: &SessionId) -> Option<Selection> {
        let summary = self.history.get(id)?.clone();
        let cancelled = self.pending.take();
        let mut effects = Vec::new();

        self.active_history = Some(summary.id.clone());
        if !summary.seed && summary.id != self.session_id {
            info!(from = %self.session_id, to = %summary.id, "Switching session");
            self.session_id = summary.id.clone();
            effects.push(Effect::PersistSession(summary.id));
        }

        let hydrate = self.begin_hydration(LOADING_HISTORY_TEXT);
        Some(Selection {
            hydrate,
            cancelled,
            effects,
        })
    }

    /// Full application reset onto a fresh session. Returns any abandoned
    /// submission.
    pub fn forget(&mut self, session_id: SessionId) -> Option<Ticket> {
        let cancelled = self.pending.take();
        self.hydrating = None;
        self.history.clear();
        self.active_history = None;
        self.transcript = Transcript::welcome(&self.welcome_text);
        self.session_id = session_id;
        cancelled
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }

    fn push(&mut self, message: Message) {
        if let Err(e) = self.transcript.append(message) {
            error!(error = %e, "Dropped message");
        }
    }

    /// After a successful exchange: touch the session's summary, creating it
    /// from the user message just answered if there is none yet.
    fn record_activity(&mut self) -> bool {
        let now = Utc::now();
        if self.history.touch(&self.session_id, now) {
            self.active_history = Some(self.session_id.clone());
            return true;
        }
        let Some(answered) = self.transcript.last_user_message() else {
            return false;
        };
        let summary = ConversationSummary::from_first_message(
            self.session_id.clone(),
            &answered.content,
            now,
        );
        self.active_history = Some(self.session_id.clone());
        self.record_summary(summary)
    }

    fn record_summary(&mut self, summary: ConversationSummary) -> bool {
        if self.history.has_seeds() {
            self.history.replace_seed_with_real(summary)
        } else {
            self.history.upsert(summary)
        }
    }
}
