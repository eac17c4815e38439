//! UI state for rendering.

use newsbot_core::{Role, SessionId};
use newsbot_session::ConversationSnapshot;
use newsbot_ui::{ChatMessage, ChatRole, SidebarEntry};

/// Pane receiving key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Input,
    Sidebar,
}

/// Snapshot of data for rendering (no async, no locks).
#[derive(Debug, Default)]
pub struct UiState {
    /// Latest engine snapshot; `None` until the backend reports in.
    pub conversation: Option<ConversationSnapshot>,

    pub focus: Focus,

    /// Text being typed.
    pub input: String,

    /// Cursor position in the input, in characters.
    pub input_cursor: usize,

    /// Highlighted sidebar row.
    pub selected_history: usize,

    /// Status message to display in footer.
    pub status_message: Option<String>,
}

impl UiState {
    /// Whether Enter may submit: no reply outstanding and history loaded.
    pub fn can_submit(&self) -> bool {
        match &self.conversation {
            Some(c) => !c.pending && !c.hydrating,
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.conversation.as_ref().is_some_and(|c| c.pending)
    }

    /// Take the input for submission, leaving the box empty.
    ///
    /// `None` when the text is blank or submission is blocked.
    pub fn take_input(&mut self) -> Option<String> {
        if !self.can_submit() || self.input.trim().is_empty() {
            return None;
        }
        self.input_cursor = 0;
        Some(std::mem::take(&mut self.input))
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_idx = self.byte_index(self.input_cursor);
        self.input.insert(byte_idx, c);
        self.input_cursor += 1;
    }

    /// Delete the character before the cursor (unicode-safe).
    pub fn backspace(&mut self) {
        if self.input_cursor == 0 {
            return;
        }
        self.input_cursor -= 1;
        let byte_idx = self.byte_index(self.input_cursor);
        self.input.remove(byte_idx);
    }

    /// Delete the character under the cursor.
    pub fn delete(&mut self) {
        if self.input_cursor < self.input.chars().count() {
            let byte_idx = self.byte_index(self.input_cursor);
            self.input.remove(byte_idx);
        }
    }

    pub fn cursor_left(&mut self) {
        self.input_cursor = self.input_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        if self.input_cursor < self.input.chars().count() {
            self.input_cursor += 1;
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Input => Focus::Sidebar,
            Focus::Sidebar => Focus::Input,
        };
    }

    pub fn select_prev_history(&mut self) {
        self.selected_history = self.selected_history.saturating_sub(1);
    }

    pub fn select_next_history(&mut self) {
        if self.selected_history + 1 < self.history_len() {
            self.selected_history += 1;
        }
    }

    /// Session id of the highlighted sidebar row.
    pub fn selected_history_id(&self) -> Option<SessionId> {
        self.conversation
            .as_ref()?
            .history
            .get(self.selected_history)
            .map(|s| s.id.clone())
    }

    /// Replace the snapshot, keeping the sidebar selection in range.
    pub fn apply_snapshot(&mut self, snapshot: ConversationSnapshot) {
        self.conversation = Some(snapshot);
        self.selected_history = self
            .selected_history
            .min(self.history_len().saturating_sub(1));
    }

    /// Transcript mapped for the chat widget.
    pub fn chat_messages(&self) -> Vec<ChatMessage> {
        let Some(conversation) = &self.conversation else {
            return Vec::new();
        };
        conversation
            .messages
            .iter()
            .map(|m| {
                let role = match m.role {
                    Role::User => ChatRole::User,
                    Role::Assistant => ChatRole::Assistant,
                };
                ChatMessage {
                    contextualized: m.has_context == Some(true),
                    failed: m.is_failure(),
                    placeholder: m.is_loading(),
                    ..ChatMessage::new(role, m.content.clone(), m.created_at)
                }
            })
            .collect()
    }

    /// History list mapped for the sidebar widget.
    pub fn sidebar_entries(&self) -> Vec<SidebarEntry> {
        let Some(conversation) = &self.conversation else {
            return Vec::new();
        };
        conversation
            .history
            .iter()
            .map(|s| SidebarEntry {
                title: s.title.clone(),
                preview: s.preview.clone(),
                timestamp: s.timestamp,
                active: conversation.active_history.as_ref() == Some(&s.id),
            })
            .collect()
    }

    fn history_len(&self) -> usize {
        self.conversation.as_ref().map_or(0, |c| c.history.len())
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }
}
