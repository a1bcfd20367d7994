//! Reverse incremental search over prompt history.
//!
//! [`SearchEditor`] wraps any [`LineEditor`]. While idle it forwards every
//! key except the search hotkey. While searching it captures text input as
//! the query, shows the current match in place of the bottom border, and
//! lets the user cycle, accept or cancel:
//!
//! ```text
//! Idle --hotkey--> Searching --Enter--> Idle (match text in buffer)
//!                            --Esc / cancel--> Idle (saved text restored)
//! ```

mod keys;
pub mod render;

pub use keys::{KeyBinding, SearchKeys};

use crossterm::event::{KeyCode, KeyEvent};
use regex::{Regex, RegexBuilder};
use tracing::{debug, trace};

use crate::editor::{typed_char, BorderStyle, Chrome, InputOutcome, LineEditor};
use crate::model::{HistoryList, PromptEntry};

/// Compile a query as a case-insensitive pattern.
///
/// `None` when the query is not a valid pattern.
#[must_use]
pub fn compile_query(query: &str) -> Option<Regex> {
    RegexBuilder::new(query).case_insensitive(true).build().ok()
}

/// History entries matching `query`, most recent first.
///
/// An empty query or an invalid pattern matches nothing.
#[must_use]
pub fn find_matches(history: &HistoryList, query: &str) -> Vec<PromptEntry> {
    if query.is_empty() {
        return Vec::new();
    }
    let Some(pattern) = compile_query(query) else {
        trace!(query, "Query is not a valid pattern");
        return Vec::new();
    };
    history
        .iter()
        .rev()
        .filter(|entry| pattern.is_match(&entry.text))
        .cloned()
        .collect()
}

/// An in-progress search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchSession {
    query: String,
    matches: Vec<PromptEntry>,
    cursor: Option<usize>,
    saved_text: String,
}

impl SearchSession {
    /// Start a search, remembering the editor text to restore on cancel.
    #[must_use]
    pub fn new(saved_text: String) -> Self {
        Self {
            saved_text,
            ..Self::default()
        }
    }

    /// The query typed so far.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Current matches, most recent first.
    #[must_use]
    pub fn matches(&self) -> &[PromptEntry] {
        &self.matches
    }

    /// Index of the highlighted match.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// The highlighted match.
    #[must_use]
    pub fn current(&self) -> Option<&PromptEntry> {
        self.cursor.and_then(|i| self.matches.get(i))
    }

    /// Editor text from before the search started.
    #[must_use]
    pub fn saved_text(&self) -> &str {
        &self.saved_text
    }

    /// Append to the query and rematch.
    pub fn push(&mut self, c: char, history: &HistoryList) {
        self.query.push(c);
        self.rematch(history);
    }

    /// Drop the last query character and rematch. No-op on an empty query.
    pub fn pop(&mut self, history: &HistoryList) {
        if self.query.pop().is_some() {
            self.rematch(history);
        }
    }

    /// Advance to the next older match, wrapping to the newest.
    pub fn cycle(&mut self) {
        if !self.matches.is_empty() {
            self.cursor = Some(self.cursor.map_or(0, |i| (i + 1) % self.matches.len()));
        }
    }

    fn rematch(&mut self, history: &HistoryList) {
        self.matches = find_matches(history, &self.query);
        self.cursor = (!self.matches.is_empty()).then_some(0);
    }
}

/// Search state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Keys go to the editor.
    #[default]
    Idle,
    /// Keys drive the search.
    Searching(SearchSession),
}

/// A [`LineEditor`] with reverse incremental search layered on top.
#[derive(Debug, Clone)]
pub struct SearchEditor<E> {
    inner: E,
    keys: SearchKeys,
    history: HistoryList,
    mode: SearchMode,
}

impl<E: LineEditor> SearchEditor<E> {
    /// Wrap `inner`, styling its border once.
    pub fn new(mut inner: E, keys: SearchKeys, border: BorderStyle) -> Self {
        inner.set_border_style(border);
        Self {
            inner,
            keys,
            history: HistoryList::empty(),
            mode: SearchMode::Idle,
        }
    }

    /// The wrapped editor.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Current search state.
    pub fn mode(&self) -> &SearchMode {
        &self.mode
    }

    /// Check if a search is in progress.
    pub fn is_searching(&self) -> bool {
        matches!(self.mode, SearchMode::Searching(_))
    }

    /// The history searches run against.
    pub fn history(&self) -> &HistoryList {
        &self.history
    }

    fn handle_searching(&mut self, key: KeyEvent) -> InputOutcome {
        let SearchMode::Searching(session) = &mut self.mode else {
            return InputOutcome::Ignored;
        };

        if self.keys.hotkey.matches(&key) {
            session.cycle();
            trace!(cursor = ?session.cursor(), "Cycled search match");
            return InputOutcome::Handled;
        }
        if key.code == KeyCode::Esc || self.keys.cancel.matches(&key) {
            let saved = std::mem::take(&mut session.saved_text);
            self.mode = SearchMode::Idle;
            self.inner.set_text(&saved);
            debug!("Search cancelled");
            return InputOutcome::Handled;
        }
        if key.code == KeyCode::Enter {
            let text = match session.current() {
                Some(entry) => entry.text.clone(),
                None => std::mem::take(&mut session.saved_text),
            };
            self.mode = SearchMode::Idle;
            self.inner.set_text(&text);
            debug!("Search accepted");
            return InputOutcome::Handled;
        }
        if key.code == KeyCode::Backspace {
            session.pop(&self.history);
            return InputOutcome::Handled;
        }
        if let Some(c) = typed_char(&key) {
            session.push(c, &self.history);
            return InputOutcome::Handled;
        }

        // Anything else edits the buffer underneath; the search stays open.
        self.inner.handle_input(key);
        InputOutcome::Handled
    }
}

impl<E: LineEditor> LineEditor for SearchEditor<E> {
    fn text(&self) -> String {
        self.inner.text()
    }

    fn set_text(&mut self, text: &str) {
        self.inner.set_text(text);
    }

    fn handle_input(&mut self, key: KeyEvent) -> InputOutcome {
        match self.mode {
            SearchMode::Searching(_) => self.handle_searching(key),
            SearchMode::Idle if self.keys.hotkey.matches(&key) => {
                self.mode = SearchMode::Searching(SearchSession::new(self.inner.text()));
                debug!(entries = self.history.len(), "Search started");
                InputOutcome::Handled
            }
            SearchMode::Idle => self.inner.handle_input(key),
        }
    }

    fn render(&self, width: u16, chrome: Chrome) -> Vec<String> {
        match &self.mode {
            SearchMode::Idle => self.inner.render(width, chrome),
            SearchMode::Searching(session) => {
                let lines = self.inner.render(width, Chrome::Locked);
                render::overlay(lines, session, &self.keys, usize::from(width))
            }
        }
    }

    fn set_history(&mut self, history: HistoryList) {
        self.inner.set_history(history.clone());
        self.history = history;
    }

    fn set_border_style(&mut self, style: BorderStyle) {
        self.inner.set_border_style(style);
    }
}
