//! History command implementation.
//!
//! Prints the merged prompt history for the working directory, oldest
//! first, the same list the interactive prompt navigates.

use std::io::{self, Write};

use chrono::{DateTime, Local};

use crate::cli::{Cli, HistoryArgs};
use crate::editor::single_line;
use crate::error::Result;
use crate::model::PromptEntry;

use super::Context;

/// Run the history command.
pub fn run(cli: &Cli, args: &HistoryArgs) -> Result<()> {
    let ctx = Context::from_cli(cli)?;
    let session = ctx.active_session(args.session.as_deref())?;
    let history = ctx.full_history(&session)?;

    let entries = history.entries();
    let skip = args
        .limit
        .map_or(0, |limit| entries.len().saturating_sub(limit));

    let mut stdout = io::stdout().lock();
    if args.json {
        write_json(&mut stdout, &entries[skip..])
    } else {
        write_text(&mut stdout, &entries[skip..])
    }
}

/// Write entries as a JSON array of `{"text", "timestamp"}` objects.
fn write_json<W: Write>(writer: &mut W, entries: &[PromptEntry]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, entries)?;
    writeln!(writer)?;
    Ok(())
}

/// Write one line per entry: local time, then the flattened prompt.
fn write_text<W: Write>(writer: &mut W, entries: &[PromptEntry]) -> Result<()> {
    for entry in entries {
        writeln!(writer, "{}  {}", format_timestamp(entry.timestamp), single_line(&entry.text))?;
    }
    Ok(())
}

/// Format epoch millis as local time.
pub(crate) fn format_timestamp(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|utc| utc.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "????-??-?? ??:??:??".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<PromptEntry> {
        vec![
            PromptEntry::new("first\nline", 1_700_000_000_000).unwrap(),
            PromptEntry::new("second", 1_700_000_001_000).unwrap(),
        ]
    }

    #[test]
    fn test_write_json_shape() {
        let mut out = Vec::new();
        write_json(&mut out, &entries()).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed[0]["text"], "first\nline");
        assert_eq!(parsed[1]["timestamp"], 1_700_000_001_000_i64);
    }

    #[test]
    fn test_write_text_flattens_lines() {
        let mut out = Vec::new();
        write_text(&mut out, &entries()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("  first line"));
        assert!(lines[1].ends_with("  second"));
    }
}
