//! Prompt entries and the immutable history list built from them.

use std::sync::Arc;

use serde::Serialize;

/// A single user prompt harvested from a session log.
///
/// Two entries are duplicates iff both `timestamp` and `text` are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PromptEntry {
    /// Prompt text, trimmed and never empty.
    pub text: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

impl PromptEntry {
    /// Build an entry, trimming the text. Returns `None` for blank text.
    #[must_use]
    pub fn new(text: &str, timestamp: i64) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            text: trimmed.to_string(),
            timestamp,
        })
    }
}

/// Ordered prompt history, ascending by timestamp.
///
/// Lists are never edited after construction; a refresh produces a new list
/// and the owner swaps it in. Cloning is cheap (shared storage).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryList {
    entries: Arc<[PromptEntry]>,
}

impl HistoryList {
    /// An empty history.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap entries that are already sorted, deduplicated and capped.
    pub(crate) fn from_normalized(entries: Vec<PromptEntry>) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        Self {
            entries: entries.into(),
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[PromptEntry] {
        &self.entries
    }

    /// Iterate entries, oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, PromptEntry> {
        self.entries.iter()
    }

    /// The most recent entry, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&PromptEntry> {
        self.entries.last()
    }

    /// Prompt texts, oldest first.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.text.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a HistoryList {
    type Item = &'a PromptEntry;
    type IntoIter = std::slice::Iter<'a, PromptEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
