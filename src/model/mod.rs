//! Core data structures.
//!
//! - [`PromptEntry`] / [`HistoryList`]: the prompt corpus handed to the editor
//! - [`SessionRecord`] and friends: the subset of a session log line we read

mod prompt;
mod record;

pub use prompt::*;
pub use record::*;
