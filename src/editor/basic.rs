//! A minimal bordered line editor.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::Stylize;
use unicode_width::UnicodeWidthChar;

use super::{typed_char, BorderStyle, Chrome, InputOutcome, LineEditor};
use crate::model::HistoryList;

const CURSOR_ON: &str = "\x1b[7m";
const CURSOR_OFF: &str = "\x1b[27m";

/// Single-buffer editor with Up/Down history navigation.
///
/// Renders as the buffer between two horizontal rules. The cursor is drawn
/// in inverse video.
#[derive(Debug, Clone, Default)]
pub struct BasicEditor {
    buffer: String,
    /// Byte offset into `buffer`, always on a char boundary.
    cursor: usize,
    history: HistoryList,
    /// Index into `history` while browsing with Up/Down.
    browsing: Option<usize>,
    /// Buffer saved when browsing started.
    draft: String,
    border: BorderStyle,
}

impl BasicEditor {
    /// Create an empty editor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor position as a byte offset.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The history currently wired to this editor.
    #[must_use]
    pub fn history(&self) -> &HistoryList {
        &self.history
    }

    fn insert(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
        self.browsing = None;
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.buffer[..self.cursor].char_indices().next_back().map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.buffer[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }

    fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.buffer.replace_range(prev..self.cursor, "");
            self.cursor = prev;
            self.browsing = None;
        }
    }

    fn delete(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.buffer.replace_range(self.cursor..next, "");
            self.browsing = None;
        }
    }

    fn line_start(&self) -> usize {
        self.buffer[..self.cursor].rfind('\n').map_or(0, |i| i + 1)
    }

    fn line_end(&self) -> usize {
        self.buffer[self.cursor..]
            .find('\n')
            .map_or(self.buffer.len(), |i| self.cursor + i)
    }

    fn history_up(&mut self) {
        let len = self.history.len();
        let target = match self.browsing {
            None if len > 0 => {
                self.draft = self.buffer.clone();
                len - 1
            }
            Some(i) if i > 0 => i - 1,
            _ => return,
        };
        self.show_history(target);
    }

    fn history_down(&mut self) {
        match self.browsing {
            Some(i) if i + 1 < self.history.len() => self.show_history(i + 1),
            Some(_) => {
                self.browsing = None;
                let draft = std::mem::take(&mut self.draft);
                self.replace_buffer(draft);
            }
            None => {}
        }
    }

    fn show_history(&mut self, index: usize) {
        if let Some(entry) = self.history.entries().get(index) {
            self.replace_buffer(entry.text.clone());
            self.browsing = Some(index);
        }
    }

    fn replace_buffer(&mut self, text: String) {
        self.buffer = text;
        self.cursor = self.buffer.len();
    }

    fn render_line(&self, line: &str, cursor: Option<usize>, width: usize) -> String {
        // (byte offset in line, char) pairs plus a trailing cell for an end cursor.
        let mut cells: Vec<(usize, char)> = line.char_indices().collect();
        if cursor == Some(line.len()) {
            cells.push((line.len(), ' '));
        }

        // Scroll horizontally so the cursor stays visible.
        let mut start = 0;
        if let Some(cursor) = cursor {
            let cursor_cell = cells.iter().position(|&(i, _)| i == cursor).unwrap_or(0);
            let mut span: usize = cells[..=cursor_cell.min(cells.len().saturating_sub(1))]
                .iter()
                .map(|&(_, c)| c.width().unwrap_or(0))
                .sum();
            while span > width && start < cursor_cell {
                span -= cells[start].1.width().unwrap_or(0);
                start += 1;
            }
        }

        let mut out = String::new();
        let mut used = 0;
        for &(offset, c) in &cells[start..] {
            let w = c.width().unwrap_or(0);
            if used + w > width {
                break;
            }
            used += w;
            if cursor == Some(offset) {
                out.push_str(CURSOR_ON);
                out.push(c);
                out.push_str(CURSOR_OFF);
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl LineEditor for BasicEditor {
    fn text(&self) -> String {
        self.buffer.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.replace_buffer(text.to_string());
        self.browsing = None;
    }

    fn handle_input(&mut self, key: KeyEvent) -> InputOutcome {
        if let Some(c) = typed_char(&key) {
            self.insert(c);
            return InputOutcome::Handled;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter
                if key
                    .modifiers
                    .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
            {
                self.insert('\n');
            }
            KeyCode::Enter => {
                self.browsing = None;
                self.draft.clear();
                self.cursor = 0;
                return InputOutcome::Submitted(std::mem::take(&mut self.buffer));
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => {
                if let Some(prev) = self.prev_boundary() {
                    self.cursor = prev;
                }
            }
            KeyCode::Right => {
                if let Some(next) = self.next_boundary() {
                    self.cursor = next;
                }
            }
            KeyCode::Home => self.cursor = self.line_start(),
            KeyCode::End => self.cursor = self.line_end(),
            KeyCode::Char('a') if ctrl => self.cursor = self.line_start(),
            KeyCode::Char('e') if ctrl => self.cursor = self.line_end(),
            KeyCode::Char('u') if ctrl => {
                self.replace_buffer(String::new());
                self.browsing = None;
            }
            KeyCode::Up => self.history_up(),
            KeyCode::Down => self.history_down(),
            _ => return InputOutcome::Ignored,
        }
        InputOutcome::Handled
    }

    fn render(&self, width: u16, chrome: Chrome) -> Vec<String> {
        let width = usize::from(width);
        let rule = "─"
            .repeat(width)
            .with(self.border.color_for(chrome))
            .to_string();

        let mut lines = vec![rule.clone()];
        let mut offset = 0;
        for line in self.buffer.split('\n') {
            let end = offset + line.len();
            let cursor = (self.cursor >= offset && self.cursor <= end).then(|| self.cursor - offset);
            lines.push(self.render_line(line, cursor, width));
            offset = end + 1;
        }
        lines.push(rule);
        lines
    }

    fn set_history(&mut self, history: HistoryList) {
        self.history = history;
        // Indices into the old list mean nothing now; the buffer stays.
        self.browsing = None;
    }

    fn set_border_style(&mut self, style: BorderStyle) {
        self.border = style;
    }
}
