//! Content filtering for harvested prompts.
//!
//! Two kinds of text are not prompts a user would want to recall:
//! - `<skill ...>...</skill>` blocks that tools splice into the message
//! - extension boilerplate (for example a message that opens with a
//!   `# Review Guidelines` heading) that stands in for a whole message

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Patterns that mark an entire message as injected boilerplate.
pub const DEFAULT_BOILERPLATE_PATTERNS: &[&str] = &[r"^#\s*Review Guidelines\b"];

/// Matches a skill block, across lines, non-greedy.
static SKILL_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<skill\b[^>]*>.*?</skill>").unwrap());

/// Decides whether raw message text is a recallable prompt.
#[derive(Debug, Clone)]
pub struct PromptFilter {
    boilerplate: Vec<Regex>,
}

impl Default for PromptFilter {
    fn default() -> Self {
        Self::from_patterns(DEFAULT_BOILERPLATE_PATTERNS)
    }
}

impl PromptFilter {
    /// Build a filter from boilerplate regexes. Invalid patterns are skipped.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Self {
        let boilerplate = patterns
            .iter()
            .filter_map(|p| match Regex::new(p.as_ref()) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(pattern = p.as_ref(), error = %e, "Ignoring invalid boilerplate pattern");
                    None
                }
            })
            .collect();
        Self { boilerplate }
    }

    /// Number of active boilerplate patterns.
    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.boilerplate.len()
    }

    /// Clean `raw` into prompt text, or `None` if nothing recallable is left.
    #[must_use]
    pub fn apply(&self, raw: &str) -> Option<String> {
        let stripped = strip_skill_blocks(raw);
        let trimmed = stripped.trim();
        if trimmed.is_empty() || self.is_boilerplate(trimmed) {
            return None;
        }
        Some(trimmed.to_string())
    }

    fn is_boilerplate(&self, text: &str) -> bool {
        self.boilerplate.iter().any(|re| re.is_match(text))
    }
}

/// Remove every `<skill ...>...</skill>` block from `text`.
#[must_use]
pub fn strip_skill_blocks(text: &str) -> std::borrow::Cow<'_, str> {
    SKILL_BLOCK.replace_all(text, "")
}
