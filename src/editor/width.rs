//! Display-width helpers for terminal rendering.

use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

/// Terminal columns taken by `text`.
#[must_use]
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Longest prefix of `text` fitting in `max_width` columns.
///
/// Never splits a wide character: one that would straddle the limit is
/// dropped whole.
#[must_use]
pub fn truncate_to_width(text: &str, max_width: usize) -> &str {
    let mut used = 0;
    for (index, c) in text.char_indices() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width {
            return &text[..index];
        }
        used += w;
    }
    text
}

/// Collapse line breaks so multi-line text fits on one terminal row.
#[must_use]
pub fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r', '\t'], " ")
}
