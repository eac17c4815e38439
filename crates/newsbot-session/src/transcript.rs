//! The append-only message log of the active session.

use std::collections::HashSet;

use newsbot_core::{CoreError, Message, MessageId, Role};

/// Ordered messages of the active session.
///
/// Messages are only ever appended or the whole log is swapped at once;
/// nothing is reordered or edited in place. Ids are unique within the log.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    ids: HashSet<MessageId>,
}

impl Transcript {
    /// Transcript holding only the welcome message.
    pub fn welcome(text: &str) -> Self {
        Self::single(Message::welcome(text))
    }

    /// Transcript holding only the loading placeholder.
    pub fn loading(text: &str) -> Self {
        Self::single(Message::loading(text))
    }

    fn single(message: Message) -> Self {
        let mut ids = HashSet::with_capacity(1);
        ids.insert(message.id.clone());
        Self {
            messages: vec![message],
            ids,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Append one message. Rejects an id already present.
    pub fn append(&mut self, message: Message) -> Result<(), CoreError> {
        if self.ids.contains(&message.id) {
            return Err(CoreError::DuplicateMessageId(message.id.into_inner()));
        }
        self.ids.insert(message.id.clone());
        self.messages.push(message);
        Ok(())
    }

    /// Swap the whole log at once. Rejects duplicate ids, leaving `self` untouched.
    pub fn replace(&mut self, messages: Vec<Message>) -> Result<(), CoreError> {
        let mut ids = HashSet::with_capacity(messages.len());
        for message in &messages {
            if !ids.insert(message.id.clone()) {
                return Err(CoreError::DuplicateMessageId(message.id.to_string()));
            }
        }
        self.messages = messages;
        self.ids = ids;
        Ok(())
    }

    /// Whether the log is just the loading placeholder.
    pub fn is_loading(&self) -> bool {
        matches!(self.messages.as_slice(), [only] if only.is_loading())
    }

    pub fn has_user_message(&self) -> bool {
        self.first_user_message().is_some()
    }

    pub fn first_user_message(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.role == Role::User)
    }

    /// The most recent user message.
    pub fn last_user_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::User)
    }
}
