//! Search overlay rendering.
//!
//! While searching, the editor's bottom border is replaced by the prompt
//! line and a status line is appended below it. Every produced line fits in
//! the given width; width is measured in terminal columns.

use regex::RegexBuilder;

use super::{compile_query, SearchKeys, SearchSession};
use crate::editor::{display_width, single_line, truncate_to_width};

/// Inverse video on.
pub const HIGHLIGHT_ON: &str = "\x1b[7m";
/// Inverse video off.
pub const HIGHLIGHT_OFF: &str = "\x1b[27m";

const NO_MATCH: &str = "(no match)";
const FAILED: &str = "(failed)";

/// Replace the last editor line with the search prompt and append the status
/// line, if any.
#[must_use]
pub fn overlay(
    mut lines: Vec<String>,
    session: &SearchSession,
    keys: &SearchKeys,
    width: usize,
) -> Vec<String> {
    let prompt = prompt_line(session, width);
    match lines.last_mut() {
        Some(last) => *last = prompt,
        None => lines.push(prompt),
    }
    if let Some(status) = status_line(session, keys, width) {
        lines.push(status);
    }
    lines
}

/// `(reverse-i-search)'<query>': <match>` with occurrences highlighted.
#[must_use]
pub fn prompt_line(session: &SearchSession, width: usize) -> String {
    let prefix = format!("(reverse-i-search)'{}': ", single_line(session.query()));
    let prefix_width = display_width(&prefix);
    if prefix_width >= width {
        return truncate_to_width(&prefix, width).to_string();
    }
    let available = width - prefix_width;

    let body = match session.current() {
        Some(entry) => {
            let flat = single_line(&entry.text);
            highlight(truncate_to_width(&flat, available), session.query())
        }
        None => truncate_to_width(NO_MATCH, available).to_string(),
    };
    prefix + &body
}

/// `[i/n] hit Enter to select, <cancel> to cancel`, `(failed)`, or nothing
/// before the first character is typed.
#[must_use]
pub fn status_line(session: &SearchSession, keys: &SearchKeys, width: usize) -> Option<String> {
    let text = match session.cursor() {
        Some(cursor) if !session.matches().is_empty() => format!(
            "[{}/{}] hit Enter to select, {} to cancel",
            cursor + 1,
            session.matches().len(),
            keys.cancel
        ),
        _ if !session.query().is_empty() => FAILED.to_string(),
        _ => return None,
    };
    Some(truncate_to_width(&text, width).to_string())
}

/// Wrap case-insensitive literal occurrences of `query` in inverse video.
///
/// Leaves `text` untouched when `query` is empty or not a valid pattern.
#[must_use]
pub fn highlight(text: &str, query: &str) -> String {
    if query.is_empty() || compile_query(query).is_none() {
        return text.to_string();
    }
    let Ok(literal) = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    else {
        return text.to_string();
    };

    let mut out = String::with_capacity(text.len() + 16);
    let mut last = 0;
    for m in literal.find_iter(text) {
        out.push_str(&text[last..m.start()]);
        out.push_str(HIGHLIGHT_ON);
        out.push_str(m.as_str());
        out.push_str(HIGHLIGHT_OFF);
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::merge_history;
    use crate::model::{HistoryList, PromptEntry};
    use pretty_assertions::assert_eq;

    fn history(texts: &[&str]) -> HistoryList {
        let entries: Vec<_> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| PromptEntry::new(t, i as i64).unwrap())
            .collect();
        merge_history(entries, Vec::new(), 100)
    }

    fn searching(texts: &[&str], query: &str) -> SearchSession {
        let list = history(texts);
        let mut session = SearchSession::new("draft".into());
        for c in query.chars() {
            session.push(c, &list);
        }
        session
    }

    #[test]
    fn test_prompt_line_with_match() {
        let session = searching(&["Fix the build"], "fix");
        assert_eq!(
            prompt_line(&session, 80),
            format!("(reverse-i-search)'fix': {HIGHLIGHT_ON}Fix{HIGHLIGHT_OFF} the build")
        );
    }

    #[test]
    fn test_prompt_line_without_match() {
        let session = searching(&["alpha"], "zz");
        assert_eq!(prompt_line(&session, 80), "(reverse-i-search)'zz': (no match)");
    }

    #[test]
    fn test_prompt_line_truncates_to_width() {
        let session = searching(&["a very long prompt that will not fit"], "very");
        let line = prompt_line(&session, 30);
        let visible = line.replace(HIGHLIGHT_ON, "").replace(HIGHLIGHT_OFF, "");
        assert_eq!(visible, "(reverse-i-search)'very': a ve");
        assert_eq!(display_width(&visible), 30);
    }

    #[test]
    fn test_prompt_line_narrower_than_prefix() {
        let session = searching(&["abc"], "a");
        assert_eq!(prompt_line(&session, 5), "(reve");
    }

    #[test]
    fn test_multiline_match_is_flattened() {
        let session = searching(&["first line\nsecond"], "second");
        assert!(prompt_line(&session, 80).starts_with("(reverse-i-search)'second': first line "));
    }

    #[test]
    fn test_status_lines() {
        let keys = SearchKeys::default();
        let session = searching(&["foo a", "foo b"], "foo");
        assert_eq!(
            status_line(&session, &keys, 80).unwrap(),
            "[1/2] hit Enter to select, Ctrl+G to cancel"
        );

        let failed = searching(&["foo"], "bar");
        assert_eq!(status_line(&failed, &keys, 80).unwrap(), "(failed)");

        let fresh = SearchSession::new(String::new());
        assert_eq!(status_line(&fresh, &keys, 80), None);
    }

    #[test]
    fn test_highlight_is_case_insensitive_literal() {
        assert_eq!(
            highlight("a.b A.B axb", "a.b"),
            format!("{HIGHLIGHT_ON}a.b{HIGHLIGHT_OFF} {HIGHLIGHT_ON}A.B{HIGHLIGHT_OFF} axb")
        );
    }

    #[test]
    fn test_highlight_disabled_for_invalid_pattern() {
        assert_eq!(highlight("call f(x", "f("), "call f(x");
        assert_eq!(highlight("text", ""), "text");
    }

    #[test]
    fn test_overlay_replaces_bottom_border() {
        let keys = SearchKeys::default();
        let session = searching(&["foo"], "foo");
        let lines = vec!["top".to_string(), "body".to_string(), "bottom".to_string()];
        let out = overlay(lines, &session, &keys, 80);
        assert_eq!(out.len(), 4);
        assert_eq!(out[1], "body");
        assert!(out[2].starts_with("(reverse-i-search)'foo': "));
        assert!(out[3].starts_with("[1/1]"));
    }
}
