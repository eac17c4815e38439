//! The History Index: conversation summaries, most recently active first.

use chrono::{DateTime, Utc};
use tracing::debug;

use newsbot_core::{ConversationSummary, SessionId};

/// Ordered list of [`ConversationSummary`] entries.
///
/// At most one entry per session id. New and touched entries move to the
/// front. Entries are never removed by normal operation; only
/// [`clear`](Self::clear) empties the list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryIndex {
    entries: Vec<ConversationSummary>,
}

impl HistoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index pre-filled with placeholder entries.
    pub fn with_seeds(seeds: Vec<ConversationSummary>) -> Self {
        let mut index = Self::new();
        for seed in seeds.into_iter().rev() {
            index.upsert(ConversationSummary { seed: true, ..seed });
        }
        index
    }

    /// Rebuild from persisted entries, keeping their order.
    ///
    /// Seeds and repeated ids are dropped.
    pub fn from_entries(entries: Vec<ConversationSummary>) -> Self {
        let mut index = Self::new();
        for entry in entries.into_iter().filter(|e| !e.seed) {
            if !index.contains(&entry.id) {
                index.entries.push(entry);
            }
        }
        index
    }

    /// Insert at the front unless an entry with the same id exists.
    ///
    /// Returns whether the list changed.
    pub fn upsert(&mut self, summary: ConversationSummary) -> bool {
        if self.contains(&summary.id) {
            return false;
        }
        debug!(session_id = %summary.id, title = %summary.title, "Recorded conversation summary");
        self.entries.insert(0, summary);
        true
    }

    /// Drop every seed, then upsert the real summary.
    pub fn replace_seed_with_real(&mut self, summary: ConversationSummary) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| !e.seed);
        let removed = before != self.entries.len();
        self.upsert(summary) || removed
    }

    /// Mark a session active at `at`, moving its entry to the front.
    ///
    /// Returns `false` if no entry exists for `id`.
    pub fn touch(&mut self, id: &SessionId, at: DateTime<Utc>) -> bool {
        let Some(pos) = self.entries.iter().position(|e| &e.id == id) else {
            return false;
        };
        let mut entry = self.entries.remove(pos);
        entry.timestamp = at;
        self.entries.insert(0, entry);
        true
    }

    pub fn get(&self, id: &SessionId) -> Option<&ConversationSummary> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.get(id).is_some()
    }

    pub fn entries(&self) -> &[ConversationSummary] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_seeds(&self) -> bool {
        self.entries.iter().any(|e| e.seed)
    }

    /// Entries worth persisting (seeds excluded).
    pub fn persistable(&self) -> Vec<ConversationSummary> {
        self.entries.iter().filter(|e| !e.seed).cloned().collect()
    }

    /// Full application reset.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
