//! The line-editor boundary.
//!
//! The history core never edits text itself. It talks to an editor through
//! [`LineEditor`]: read and replace the buffer, forward keys it does not
//! consume, render, and swap in a new history list. [`BasicEditor`] is a
//! small single-buffer implementation used by the interactive prompt.

mod basic;
mod width;

pub use basic::BasicEditor;
pub use width::{display_width, single_line, truncate_to_width};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::Color;

use crate::model::HistoryList;

/// What happened to a key handed to an editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// The key changed state or was consumed.
    Handled,
    /// The user submitted the buffer.
    Submitted(String),
    /// The key has no meaning here.
    Ignored,
}

/// Which border colour a render should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Chrome {
    /// Regular editing.
    #[default]
    Normal,
    /// Input is captured by an overlay (reverse search).
    Locked,
}

/// Border colours, set once when an editor is wired up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderStyle {
    /// Colour while editing.
    pub normal: Color,
    /// Colour while an overlay holds the input.
    pub locked: Color,
}

impl Default for BorderStyle {
    fn default() -> Self {
        Self {
            normal: Color::DarkGrey,
            locked: Color::Yellow,
        }
    }
}

impl BorderStyle {
    /// Colour for `chrome`.
    #[must_use]
    pub const fn color_for(&self, chrome: Chrome) -> Color {
        match chrome {
            Chrome::Normal => self.normal,
            Chrome::Locked => self.locked,
        }
    }
}

/// Capabilities the history core needs from an editable text component.
pub trait LineEditor {
    /// Current buffer contents.
    fn text(&self) -> String;

    /// Replace the buffer contents.
    fn set_text(&mut self, text: &str);

    /// Default key handling.
    fn handle_input(&mut self, key: KeyEvent) -> InputOutcome;

    /// Render to terminal lines no wider than `width` columns.
    fn render(&self, width: u16, chrome: Chrome) -> Vec<String>;

    /// Replace the history the editor navigates with Up/Down.
    fn set_history(&mut self, history: HistoryList);

    /// Configure border colours.
    fn set_border_style(&mut self, style: BorderStyle);
}

/// The character a key types, if it is plain text input.
///
/// Keys carrying Ctrl, Alt or other modifiers besides Shift are control
/// input, not text.
#[must_use]
pub fn typed_char(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c) if (key.modifiers - KeyModifiers::SHIFT).is_empty() => Some(c),
        _ => None,
    }
}
