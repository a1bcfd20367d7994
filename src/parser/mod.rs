//! Prompt extraction from session logs.
//!
//! Turns newline-delimited session records (or records already held in
//! memory by the active session) into [`PromptEntry`] values:
//! - malformed lines are skipped, never fatal
//! - only user-authored messages with text segments are kept
//! - skill blocks are stripped and boilerplate messages dropped (see [`filter`])
//!
//! # Example
//!
//! ```rust
//! use prompt_rewind::parser::PromptParser;
//!
//! let log = r#"{"type":"message","message":{"role":"user","content":"hello","timestamp":1}}
//! not json
//! {"type":"message","message":{"role":"assistant","content":"hi"}}"#;
//!
//! let mut parser = PromptParser::new(0);
//! let prompts = parser.parse_lines(log);
//! assert_eq!(prompts.len(), 1);
//! assert_eq!(parser.stats().lines_skipped, 1);
//! ```

pub mod filter;

use chrono::Utc;
use tracing::{debug, trace};

pub use filter::{PromptFilter, DEFAULT_BOILERPLATE_PATTERNS};

use crate::error::RewindError;
use crate::model::{PromptEntry, SessionRecord};

/// Statistics from the most recent parse call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Lines seen (including blank ones).
    pub lines_processed: usize,
    /// Blank lines.
    pub empty_lines: usize,
    /// Lines that were not valid records.
    pub lines_skipped: usize,
    /// Records that were not user messages with text.
    pub records_ignored: usize,
    /// User messages removed by the content filter.
    pub prompts_filtered: usize,
    /// Prompts produced.
    pub prompts_parsed: usize,
}

/// Extracts prompts from session records.
///
/// The parser holds no state between calls other than the statistics of the
/// last call; the same input always yields the same prompts.
#[derive(Debug, Clone)]
pub struct PromptParser {
    filter: PromptFilter,
    fallback_timestamp: i64,
    stats: ParseStats,
}

impl PromptParser {
    /// Create a parser that stamps records lacking any timestamp with
    /// `fallback_timestamp` (epoch millis).
    #[must_use]
    pub fn new(fallback_timestamp: i64) -> Self {
        Self {
            filter: PromptFilter::default(),
            fallback_timestamp,
            stats: ParseStats::default(),
        }
    }

    /// Create a parser whose fallback timestamp is the current time.
    #[must_use]
    pub fn now() -> Self {
        Self::new(Utc::now().timestamp_millis())
    }

    /// Replace the content filter.
    #[must_use]
    pub fn with_filter(mut self, filter: PromptFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Statistics of the last parse call.
    #[must_use]
    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// Parse a newline-delimited batch of raw log lines.
    pub fn parse_lines(&mut self, content: &str) -> Vec<PromptEntry> {
        self.stats = ParseStats::default();
        let mut prompts = Vec::new();

        for (index, line) in content.lines().enumerate() {
            self.stats.lines_processed += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                self.stats.empty_lines += 1;
                continue;
            }

            match serde_json::from_str::<SessionRecord>(trimmed) {
                Ok(record) => {
                    if let Some(prompt) = self.extract(&record) {
                        prompts.push(prompt);
                    }
                }
                Err(e) => {
                    self.stats.lines_skipped += 1;
                    let err = RewindError::parse_with_source(index + 1, "invalid session record", e);
                    trace!(error = %err, "Skipping malformed line");
                }
            }
        }

        self.finish(prompts)
    }

    /// Parse records already held in memory.
    pub fn parse_records<'a, I>(&mut self, records: I) -> Vec<PromptEntry>
    where
        I: IntoIterator<Item = &'a SessionRecord>,
    {
        self.stats = ParseStats::default();
        let prompts = records
            .into_iter()
            .filter_map(|record| {
                self.stats.lines_processed += 1;
                self.extract(record)
            })
            .collect();
        self.finish(prompts)
    }

    fn extract(&mut self, record: &SessionRecord) -> Option<PromptEntry> {
        let Some(raw) = record.user_text() else {
            self.stats.records_ignored += 1;
            return None;
        };
        let Some(text) = self.filter.apply(&raw) else {
            self.stats.prompts_filtered += 1;
            return None;
        };
        let prompt = PromptEntry::new(&text, record.resolved_timestamp(self.fallback_timestamp));
        if prompt.is_some() {
            self.stats.prompts_parsed += 1;
        }
        prompt
    }

    fn finish(&self, prompts: Vec<PromptEntry>) -> Vec<PromptEntry> {
        debug!(
            prompts = prompts.len(),
            lines = self.stats.lines_processed,
            skipped = self.stats.lines_skipped,
            filtered = self.stats.prompts_filtered,
            "Prompt extraction complete"
        );
        prompts
    }
}

impl Default for PromptParser {
    fn default() -> Self {
        Self::now()
    }
}

/// Parse raw JSON lines into records, dropping malformed ones.
///
/// Used by hosts that keep the active session's records in memory.
pub fn parse_records_lenient(content: &str) -> Vec<SessionRecord> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn user_line(text: &str, ts: i64) -> String {
        serde_json::json!({
            "type": "message",
            "timestamp": "2025-01-01T00:00:00Z",
            "message": {"role": "user", "content": [{"type": "text", "text": text}], "timestamp": ts}
        })
        .to_string()
    }

    #[test]
    fn test_parse_empty() {
        let mut parser = PromptParser::new(0);
        assert!(parser.parse_lines("").is_empty());
        assert_eq!(parser.stats().lines_processed, 0);
    }

    #[test]
    fn test_malformed_lines_do_not_abort_batch() {
        let content = [
            user_line("first", 1),
            "{not json".to_string(),
            String::new(),
            user_line("second", 2),
            r#"{"type":"message"#.to_string(),
        ]
        .join("\n");

        let mut parser = PromptParser::new(0);
        let prompts = parser.parse_lines(&content);

        assert_eq!(
            prompts,
            vec![
                PromptEntry::new("first", 1).unwrap(),
                PromptEntry::new("second", 2).unwrap(),
            ]
        );
        let stats = parser.stats();
        assert_eq!(stats.lines_processed, 5);
        assert_eq!(stats.empty_lines, 1);
        assert_eq!(stats.lines_skipped, 2);
        assert_eq!(stats.prompts_parsed, 2);
    }

    #[test]
    fn test_filters_skill_blocks_and_boilerplate() {
        let content = [
            user_line(r#"<skill name="x">injected</skill>hello"#, 1),
            user_line("# Review Guidelines\n- rule", 2),
            user_line("<skill>only</skill>", 3),
        ]
        .join("\n");

        let mut parser = PromptParser::new(0);
        let prompts = parser.parse_lines(&content);

        assert_eq!(prompts, vec![PromptEntry::new("hello", 1).unwrap()]);
        assert_eq!(parser.stats().prompts_filtered, 2);
    }

    #[test]
    fn test_ignores_non_user_records() {
        let content = [
            r#"{"type":"session","id":"s","cwd":"/tmp","timestamp":"2025-01-01T00:00:00Z"}"#,
            r#"{"type":"message","message":{"role":"assistant","content":[{"type":"text","text":"answer"}]}}"#,
            r#"{"type":"message","message":{"role":"toolResult","toolCallId":"1","content":[{"type":"text","text":"out"}]}}"#,
        ]
        .join("\n");

        let mut parser = PromptParser::new(0);
        assert!(parser.parse_lines(&content).is_empty());
        assert_eq!(parser.stats().records_ignored, 3);
    }

    #[test]
    fn test_fallback_timestamp_applies_when_record_has_none() {
        let mut parser = PromptParser::new(99);
        let prompts =
            parser.parse_lines(r#"{"type":"message","message":{"role":"user","content":"x"}}"#);
        assert_eq!(prompts[0].timestamp, 99);
    }

    #[test]
    fn test_parse_records_matches_parse_lines() {
        let content = [user_line("a", 1), user_line("  ", 2), user_line("b", 3)].join("\n");
        let records = parse_records_lenient(&content);
        assert_eq!(records.len(), 3);

        let mut from_lines = PromptParser::new(0);
        let mut from_records = PromptParser::new(0);
        assert_eq!(
            from_lines.parse_lines(&content),
            from_records.parse_records(&records)
        );
    }

    #[test]
    fn test_custom_filter() {
        let mut parser =
            PromptParser::new(0).with_filter(PromptFilter::from_patterns(&["^/"]));
        let content = [user_line("/model opus", 1), user_line("real prompt", 2)].join("\n");
        let prompts = parser.parse_lines(&content);
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].text, "real prompt");
    }
}
