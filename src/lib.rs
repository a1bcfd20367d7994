//! prompt-rewind: cross-session prompt history and reverse search for
//! terminal line editors.
//!
//! A coding-agent session writes its conversation to an append-only JSONL
//! log, one file per session, grouped by working directory. This crate turns
//! those logs into a prompt history for the editor the user types into:
//!
//! - History shows up immediately from the active session, then grows to
//!   include recent prompts from sibling sessions of the same directory once
//!   a background pass has tail-read their logs.
//! - A reverse incremental search (Ctrl+R by default) filters that history
//!   by a case-insensitive pattern, most recent match first.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use prompt_rewind::discovery::SessionDirectory;
//! use prompt_rewind::history::HistoryAggregator;
//!
//! # async fn demo() -> prompt_rewind::Result<()> {
//! let sessions = SessionDirectory::discover(None)?;
//! let aggregator = HistoryAggregator::new(sessions);
//!
//! let history = aggregator
//!     .build_full(&[], Path::new("/home/me/project"), None)
//!     .await;
//! for entry in &history {
//!     println!("{}", entry.text);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`tail`]: Bounded reads of the end of a log file
//! - [`parser`]: Log lines to prompt entries, with content filtering
//! - [`model`]: Prompt entries, history lists and log records
//! - [`discovery`]: Sessions root and sibling log listing
//! - [`history`]: Immediate and full aggregation passes
//! - [`refresh`]: Background refresh with stale-result suppression
//! - [`editor`]: The line-editor boundary and a basic editor
//! - [`search`]: Reverse incremental search and its overlay
//! - [`config`]: Configuration management
//! - [`cli`], [`tui`]: The `rewind` binary
//! - [`error`]: Error types and handling

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod cli;
pub mod config;
pub mod discovery;
pub mod editor;
pub mod error;
pub mod history;
pub mod model;
pub mod parser;
pub mod refresh;
pub mod search;
pub mod tail;
pub mod tui;

// Re-export commonly used types at the crate root
pub use error::{Result, RewindError};
pub use model::{HistoryList, PromptEntry};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::discovery::SessionDirectory;
    pub use crate::editor::{BasicEditor, LineEditor};
    pub use crate::error::{Result, RewindError};
    pub use crate::history::{HistoryAggregator, HistoryLimits};
    pub use crate::model::{HistoryList, PromptEntry, SessionRecord};
    pub use crate::parser::PromptParser;
    pub use crate::refresh::{ActiveSession, PromptHistory};
    pub use crate::search::{SearchEditor, SearchKeys};
}
