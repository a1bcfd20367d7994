//! Background history refresh.
//!
//! On session start or switch the editor first gets history built from the
//! active session alone, then a full pass over sibling logs runs on the
//! tokio runtime. Its result is applied only if, when it arrives:
//!
//! 1. no newer refresh has started,
//! 2. the editor text is what it was when the refresh started, and
//! 3. the list differs from the one already applied.
//!
//! [`RefreshController`] owns the generation counter behind the first check.
//! [`PromptHistory`] is what a host holds: it wires both passes to an editor
//! and hands finished passes back through a channel drained between input
//! events with [`PromptHistory::apply_pending`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

use crate::editor::LineEditor;
use crate::error::{Result, RewindError};
use crate::history::HistoryAggregator;
use crate::model::{HistoryList, SessionRecord};
use crate::parser::{parse_records_lenient, PromptParser};

/// Identity and preconditions of one refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTicket {
    generation: u64,
    text_snapshot: String,
    applied: HistoryList,
}

impl RefreshTicket {
    /// Generation this refresh belongs to.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Editor text when the refresh started.
    #[must_use]
    pub fn text_snapshot(&self) -> &str {
        &self.text_snapshot
    }
}

/// Why a finished refresh was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// A newer refresh started after this one.
    Superseded,
    /// The user edited the buffer meanwhile.
    TextChanged,
    /// Nothing new was found.
    Unchanged,
}

/// Generation counter for refresh passes.
#[derive(Debug, Clone, Default)]
pub struct RefreshController {
    generation: u64,
}

impl RefreshController {
    /// Create a controller at generation zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The latest generation handed out.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a refresh, invalidating every earlier ticket.
    ///
    /// `applied` is the list the editor holds right now.
    pub fn begin(&mut self, editor_text: String, applied: HistoryList) -> RefreshTicket {
        self.generation += 1;
        RefreshTicket {
            generation: self.generation,
            text_snapshot: editor_text,
            applied,
        }
    }

    /// Decide whether `result` for `ticket` may replace the editor history.
    pub fn check(
        &self,
        ticket: &RefreshTicket,
        current_text: &str,
        result: &HistoryList,
    ) -> std::result::Result<(), Skip> {
        if ticket.generation != self.generation {
            return Err(Skip::Superseded);
        }
        if ticket.text_snapshot != current_text {
            return Err(Skip::TextChanged);
        }
        if *result == ticket.applied {
            return Err(Skip::Unchanged);
        }
        Ok(())
    }

    /// `true` when [`check`](Self::check) passes.
    #[must_use]
    pub fn should_apply(&self, ticket: &RefreshTicket, current_text: &str, result: &HistoryList) -> bool {
        self.check(ticket, current_text, result).is_ok()
    }
}

/// The session whose prompts seed history.
#[derive(Debug, Clone, Default)]
pub struct ActiveSession {
    /// The session's own log, excluded from the sibling scan.
    pub log_path: Option<PathBuf>,
    /// Records already loaded for the session.
    pub records: Vec<SessionRecord>,
}

impl ActiveSession {
    /// A session with no log on disk yet.
    #[must_use]
    pub fn in_memory(records: Vec<SessionRecord>) -> Self {
        Self {
            log_path: None,
            records,
        }
    }

    /// Load a session from its log file.
    ///
    /// Malformed lines are skipped.
    pub fn from_log(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| RewindError::from_io_at(&path, e))?;
        Ok(Self {
            records: parse_records_lenient(&content),
            log_path: Some(path),
        })
    }
}

/// A finished full pass waiting to be applied.
#[derive(Debug)]
pub struct RefreshOutcome {
    /// The refresh this result belongs to.
    pub ticket: RefreshTicket,
    /// The merged history.
    pub history: HistoryList,
}

/// Prompt history wired to a host editor.
#[derive(Debug)]
pub struct PromptHistory {
    aggregator: Arc<HistoryAggregator>,
    controller: RefreshController,
    tx: mpsc::UnboundedSender<RefreshOutcome>,
    rx: mpsc::UnboundedReceiver<RefreshOutcome>,
}

impl PromptHistory {
    /// Create a host object around `aggregator`.
    #[must_use]
    pub fn new(aggregator: HistoryAggregator) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            aggregator: Arc::new(aggregator),
            controller: RefreshController::new(),
            tx,
            rx,
        }
    }

    /// The aggregator used for both passes.
    #[must_use]
    pub fn aggregator(&self) -> &HistoryAggregator {
        &self.aggregator
    }

    /// The generation counter.
    #[must_use]
    pub fn controller(&self) -> &RefreshController {
        &self.controller
    }

    /// Session-start hook.
    pub fn on_session_start<E: LineEditor>(
        &mut self,
        editor: &mut E,
        cwd: &Path,
        session: &ActiveSession,
    ) -> RefreshTicket {
        debug!("Session started");
        self.refresh(editor, cwd, session)
    }

    /// Session-switch hook.
    pub fn on_session_switch<E: LineEditor>(
        &mut self,
        editor: &mut E,
        cwd: &Path,
        session: &ActiveSession,
    ) -> RefreshTicket {
        debug!("Session switched");
        self.refresh(editor, cwd, session)
    }

    #[instrument(level = "debug", skip_all, fields(cwd = %cwd.display(), records = session.records.len()))]
    fn refresh<E: LineEditor>(
        &mut self,
        editor: &mut E,
        cwd: &Path,
        session: &ActiveSession,
    ) -> RefreshTicket {
        let current = PromptParser::now()
            .with_filter(self.aggregator.filter().clone())
            .parse_records(&session.records);

        let immediate = self.aggregator.build_immediate(&current);
        debug!(entries = immediate.len(), "Applying immediate history");
        editor.set_history(immediate.clone());

        let ticket = self.controller.begin(editor.text(), immediate);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let aggregator = Arc::clone(&self.aggregator);
                let tx = self.tx.clone();
                let cwd = cwd.to_path_buf();
                let exclude = session.log_path.clone();
                let task_ticket = ticket.clone();
                handle.spawn(async move {
                    let history = aggregator.build_full(&current, &cwd, exclude.as_deref()).await;
                    // The receiver is gone once the host shuts down.
                    let _ = tx.send(RefreshOutcome {
                        ticket: task_ticket,
                        history,
                    });
                });
            }
            Err(e) => warn!(error = %e, "No async runtime, skipping full history pass"),
        }

        ticket
    }

    /// Apply one finished pass if it is still wanted.
    pub fn apply_outcome<E: LineEditor>(&mut self, editor: &mut E, outcome: RefreshOutcome) -> bool {
        let generation = outcome.ticket.generation;
        match self
            .controller
            .check(&outcome.ticket, &editor.text(), &outcome.history)
        {
            Ok(()) => {
                debug!(generation, entries = outcome.history.len(), "Applying full history");
                editor.set_history(outcome.history);
                true
            }
            Err(reason) => {
                debug!(generation, ?reason, "Discarding full history");
                false
            }
        }
    }

    /// Apply every finished pass without blocking. Returns how many were
    /// applied.
    pub fn apply_pending<E: LineEditor>(&mut self, editor: &mut E) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.rx.try_recv() {
            if self.apply_outcome(editor, outcome) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next finished pass.
    pub async fn next_outcome(&mut self) -> Option<RefreshOutcome> {
        self.rx.recv().await
    }
}
