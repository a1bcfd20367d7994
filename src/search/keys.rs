//! Key binding specs such as `ctrl+r`.

use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::error::RewindError;

/// A key plus modifiers, parsed from `"[ctrl+][alt+][shift+]<key>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    /// The key.
    pub code: KeyCode,
    /// Required modifiers.
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    /// Bind `code` with `modifiers`.
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// `Ctrl+<c>`.
    #[must_use]
    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Check if `key` triggers this binding.
    ///
    /// Letters compare case-insensitively, since terminals report Ctrl+R
    /// as either `r` or `R`.
    #[must_use]
    pub fn matches(&self, key: &KeyEvent) -> bool {
        if key.modifiers != self.modifiers {
            return false;
        }
        match (self.code, key.code) {
            (KeyCode::Char(a), KeyCode::Char(b)) => a.eq_ignore_ascii_case(&b),
            (a, b) => a == b,
        }
    }
}

impl FromStr for KeyBinding {
    type Err = RewindError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| RewindError::InvalidKeyBinding {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let lowered = spec.trim().to_ascii_lowercase();
        let mut parts: Vec<&str> = lowered.split('+').collect();
        let key = parts.pop().filter(|k| !k.is_empty()).ok_or_else(|| invalid("missing key"))?;

        let mut modifiers = KeyModifiers::NONE;
        for part in parts {
            let flag = match part {
                "ctrl" | "control" => KeyModifiers::CONTROL,
                "alt" | "meta" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                other => return Err(invalid(&format!("unknown modifier '{other}'"))),
            };
            if modifiers.contains(flag) {
                return Err(invalid(&format!("modifier '{part}' repeated")));
            }
            modifiers |= flag;
        }

        let code = match key {
            "esc" | "escape" => KeyCode::Esc,
            "enter" | "return" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "backspace" => KeyCode::Backspace,
            "space" => KeyCode::Char(' '),
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return Err(invalid(&format!("unknown key '{other}'"))),
                }
            }
        };

        Ok(Self::new(code, modifiers))
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            f.write_str("Ctrl+")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            f.write_str("Alt+")?;
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            f.write_str("Shift+")?;
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("Space"),
            KeyCode::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            KeyCode::Esc => f.write_str("Esc"),
            KeyCode::Enter => f.write_str("Enter"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Keys that drive reverse search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchKeys {
    /// Enters search, then cycles to the next older match.
    pub hotkey: KeyBinding,
    /// Leaves search restoring the saved text. Esc always cancels too.
    pub cancel: KeyBinding,
}

impl Default for SearchKeys {
    fn default() -> Self {
        Self {
            hotkey: KeyBinding::ctrl('r'),
            cancel: KeyBinding::ctrl('g'),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ctrl+r", KeyCode::Char('r'), KeyModifiers::CONTROL)]
    #[case("Ctrl+G", KeyCode::Char('g'), KeyModifiers::CONTROL)]
    #[case("alt+shift+x", KeyCode::Char('x'), KeyModifiers::ALT.union(KeyModifiers::SHIFT))]
    #[case("esc", KeyCode::Esc, KeyModifiers::NONE)]
    #[case("ctrl+space", KeyCode::Char(' '), KeyModifiers::CONTROL)]
    fn test_parse_valid(#[case] spec: &str, #[case] code: KeyCode, #[case] modifiers: KeyModifiers) {
        assert_eq!(spec.parse::<KeyBinding>().unwrap(), KeyBinding::new(code, modifiers));
    }

    #[rstest]
    #[case("")]
    #[case("ctrl+")]
    #[case("hyper+r")]
    #[case("ctrl+ctrl+r")]
    #[case("ctrl+pagedown")]
    fn test_parse_invalid(#[case] spec: &str) {
        let err = spec.parse::<KeyBinding>().unwrap_err();
        assert!(matches!(err, RewindError::InvalidKeyBinding { .. }));
    }

    #[test]
    fn test_matches_ignores_letter_case() {
        let binding = KeyBinding::ctrl('r');
        assert!(binding.matches(&KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL)));
        assert!(binding.matches(&KeyEvent::new(KeyCode::Char('R'), KeyModifiers::CONTROL)));
        assert!(!binding.matches(&KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_display() {
        assert_eq!(KeyBinding::ctrl('g').to_string(), "Ctrl+G");
        assert_eq!(KeyBinding::new(KeyCode::Esc, KeyModifiers::NONE).to_string(), "Esc");
    }
}
