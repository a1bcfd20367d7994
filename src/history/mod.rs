//! History aggregation.
//!
//! Two passes build a [`HistoryList`] for a working directory:
//!
//! - [`HistoryAggregator::build_immediate`] uses only the active session's
//!   prompts and never touches the file system.
//! - [`HistoryAggregator::build_full`] also tail-reads sibling session logs,
//!   newest first, until the cross-file prompt budget is spent.
//!
//! Both end in [`merge_history`]: sort ascending by timestamp, drop
//! `(timestamp, text)` duplicates keeping the first, keep the newest
//! `max_entries`.

use std::collections::HashSet;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::discovery::SessionDirectory;
use crate::model::{HistoryList, PromptEntry};
use crate::parser::{PromptFilter, PromptParser};
use crate::tail::read_tail;

/// Maximum entries in a history list.
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Maximum prompts taken from sibling session logs in one pass.
pub const DEFAULT_CROSS_FILE_BUDGET: usize = 30;

/// Bytes read from the end of each sibling session log.
pub const DEFAULT_TAIL_BYTES: u64 = 128 * 1024;

/// Size limits for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLimits {
    /// Cap on the merged list.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    /// Cap on prompts harvested from sibling logs.
    #[serde(default = "default_cross_file_budget")]
    pub cross_file_budget: usize,
    /// Tail window per sibling log, in bytes.
    #[serde(default = "default_tail_bytes")]
    pub tail_bytes: u64,
}

impl Default for HistoryLimits {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            cross_file_budget: DEFAULT_CROSS_FILE_BUDGET,
            tail_bytes: DEFAULT_TAIL_BYTES,
        }
    }
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

fn default_cross_file_budget() -> usize {
    DEFAULT_CROSS_FILE_BUDGET
}

fn default_tail_bytes() -> u64 {
    DEFAULT_TAIL_BYTES
}

/// Merge prompt sources into a sorted, deduplicated, capped history.
#[must_use]
pub fn merge_history(
    current: impl IntoIterator<Item = PromptEntry>,
    cross: impl IntoIterator<Item = PromptEntry>,
    max_entries: usize,
) -> HistoryList {
    let mut all: Vec<PromptEntry> = current.into_iter().chain(cross).collect();

    // Stable: among equal timestamps the earlier source wins dedup.
    all.sort_by_key(|e| e.timestamp);

    let keep: Vec<bool> = {
        let mut seen: HashSet<(i64, &str)> = HashSet::with_capacity(all.len());
        all.iter()
            .map(|e| seen.insert((e.timestamp, e.text.as_str())))
            .collect()
    };
    let mut deduped: Vec<PromptEntry> = all
        .into_iter()
        .zip(keep)
        .filter_map(|(entry, keep)| keep.then_some(entry))
        .collect();

    let overflow = deduped.len().saturating_sub(max_entries);
    deduped.drain(..overflow);

    HistoryList::from_normalized(deduped)
}

/// Builds history lists for a working directory.
#[derive(Debug, Clone)]
pub struct HistoryAggregator {
    sessions: SessionDirectory,
    limits: HistoryLimits,
    filter: PromptFilter,
}

impl HistoryAggregator {
    /// Create an aggregator over `sessions` with default limits and filter.
    #[must_use]
    pub fn new(sessions: SessionDirectory) -> Self {
        Self {
            sessions,
            limits: HistoryLimits::default(),
            filter: PromptFilter::default(),
        }
    }

    /// Override the size limits.
    #[must_use]
    pub fn with_limits(mut self, limits: HistoryLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Override the prompt filter used for sibling logs.
    #[must_use]
    pub fn with_filter(mut self, filter: PromptFilter) -> Self {
        self.filter = filter;
        self
    }

    /// The prompt filter.
    #[must_use]
    pub fn filter(&self) -> &PromptFilter {
        &self.filter
    }

    /// History from the active session's prompts only.
    #[must_use]
    pub fn build_immediate(&self, current: &[PromptEntry]) -> HistoryList {
        merge_history(current.iter().cloned(), std::iter::empty(), self.limits.max_entries)
    }

    /// History from the active session plus sibling logs for `cwd`.
    ///
    /// `exclude` is the active session's own log. Never fails: unreadable
    /// logs contribute nothing.
    #[instrument(level = "debug", skip_all, fields(cwd = %cwd.display(), current = current.len()))]
    pub async fn build_full(
        &self,
        current: &[PromptEntry],
        cwd: &Path,
        exclude: Option<&Path>,
    ) -> HistoryList {
        let cross = self.harvest_siblings(cwd, exclude).await;
        debug!(cross = cross.len(), "Harvested sibling prompts");
        merge_history(current.iter().cloned(), cross, self.limits.max_entries)
    }

    async fn harvest_siblings(&self, cwd: &Path, exclude: Option<&Path>) -> Vec<PromptEntry> {
        let budget = self.limits.cross_file_budget;
        let mut harvested = Vec::new();
        if budget == 0 {
            return harvested;
        }

        let mut parser =
            PromptParser::new(Utc::now().timestamp_millis()).with_filter(self.filter.clone());

        for log in self.sessions.sibling_logs(cwd, exclude).await {
            let remaining = budget - harvested.len();
            if remaining == 0 {
                break;
            }

            let tail = read_tail(&log.path, self.limits.tail_bytes).await;
            if tail.is_empty() {
                continue;
            }

            let mut prompts = parser.parse_lines(&tail);
            // Newest prompts of a log are at its end.
            let skip = prompts.len().saturating_sub(remaining);
            prompts.drain(..skip);
            trace!(path = %log.path.display(), taken = prompts.len(), "Harvested log");
            harvested.extend(prompts);
        }

        harvested
    }
}
