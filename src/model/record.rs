//! Session log records.
//!
//! Only the fields needed to recover user prompts are modelled; everything
//! else in a line is ignored by serde. A line looks like:
//!
//! ```json
//! {"type":"message","timestamp":"2025-01-02T03:04:05.000Z",
//!  "message":{"role":"user","content":[{"type":"text","text":"hi"}],"timestamp":1735787045000}}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Record type discriminator for message records.
pub const MESSAGE_RECORD_TYPE: &str = "message";

/// Role discriminator for user-authored messages.
pub const USER_ROLE: &str = "user";

/// One line of a session log.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionRecord {
    /// Record discriminator (`"message"`, `"session"`, `"model_change"`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Record-level timestamp in epoch millis.
    #[serde(default, deserialize_with = "deserialize_timestamp_millis")]
    pub timestamp: Option<i64>,
    /// Message payload for message records.
    #[serde(default)]
    pub message: Option<RecordMessage>,
}

/// The message nested in a message record.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordMessage {
    /// Author role (`"user"`, `"assistant"`, `"toolResult"`, ...).
    pub role: String,
    /// Message body.
    #[serde(default)]
    pub content: MessageContent,
    /// Message-level timestamp in epoch millis.
    #[serde(default, deserialize_with = "deserialize_timestamp_millis")]
    pub timestamp: Option<i64>,
}

/// Message body: either a bare string or a list of segments.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text body.
    Text(String),
    /// Ordered content segments.
    Segments(Vec<ContentSegment>),
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Segments(Vec::new())
    }
}

/// One content segment. Non-text segments (images, tool calls) carry no `text`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentSegment {
    /// Segment type (`"text"`, `"image"`, ...).
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Text for text segments.
    #[serde(default)]
    pub text: Option<String>,
}

impl ContentSegment {
    fn as_text(&self) -> Option<&str> {
        match self.kind.as_deref() {
            None | Some("text") => self.text.as_deref(),
            Some(_) => None,
        }
    }
}

impl SessionRecord {
    /// The user message of this record, if it is a user-authored message.
    #[must_use]
    pub fn user_message(&self) -> Option<&RecordMessage> {
        if self.kind != MESSAGE_RECORD_TYPE {
            return None;
        }
        self.message.as_ref().filter(|m| m.role == USER_ROLE)
    }

    /// Concatenated text of a user message, or `None` when this record is not
    /// a user message or has no text segments.
    #[must_use]
    pub fn user_text(&self) -> Option<String> {
        self.user_message()?.content.joined_text()
    }

    /// Message timestamp, falling back to the record timestamp, then `fallback`.
    #[must_use]
    pub fn resolved_timestamp(&self, fallback: i64) -> i64 {
        self.message
            .as_ref()
            .and_then(|m| m.timestamp)
            .or(self.timestamp)
            .unwrap_or(fallback)
    }
}

impl MessageContent {
    /// Concatenate text segments in order; `None` if there are none.
    #[must_use]
    pub fn joined_text(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Segments(segments) => {
                let mut texts = segments.iter().filter_map(ContentSegment::as_text).peekable();
                texts.peek()?;
                Some(texts.collect())
            }
        }
    }
}

/// Accept epoch millis (integer or float) or an RFC 3339 string.
///
/// Unrecognised values become `None` instead of failing the whole line.
fn deserialize_timestamp_millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s
            .parse::<DateTime<Utc>>()
            .ok()
            .map(|dt| dt.timestamp_millis()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> SessionRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_user_text_from_segments() {
        let r = record(
            r#"{"type":"message","message":{"role":"user","content":[{"type":"text","text":"a"},{"type":"image","data":"..."},{"type":"text","text":"b"}]}}"#,
        );
        assert_eq!(r.user_text().as_deref(), Some("ab"));
    }

    #[test]
    fn test_user_text_from_plain_string() {
        let r = record(r#"{"type":"message","message":{"role":"user","content":"plain"}}"#);
        assert_eq!(r.user_text().as_deref(), Some("plain"));
    }

    #[test]
    fn test_non_user_and_non_message_records() {
        let assistant = record(
            r#"{"type":"message","message":{"role":"assistant","content":[{"type":"text","text":"x"}]}}"#,
        );
        assert!(assistant.user_text().is_none());

        let header = record(r#"{"type":"session","id":"abc","cwd":"/tmp"}"#);
        assert!(header.user_text().is_none());
    }

    #[test]
    fn test_user_message_without_text_segments() {
        let r = record(
            r#"{"type":"message","message":{"role":"user","content":[{"type":"image","data":"..."}]}}"#,
        );
        assert!(r.user_text().is_none());
    }

    #[test]
    fn test_timestamp_resolution_order() {
        let both = record(
            r#"{"type":"message","timestamp":"2025-01-01T00:00:00Z","message":{"role":"user","content":"x","timestamp":42}}"#,
        );
        assert_eq!(both.resolved_timestamp(7), 42);

        let record_only = record(
            r#"{"type":"message","timestamp":"2025-01-01T00:00:00Z","message":{"role":"user","content":"x"}}"#,
        );
        assert_eq!(record_only.resolved_timestamp(7), 1_735_689_600_000);

        let neither = record(r#"{"type":"message","message":{"role":"user","content":"x"}}"#);
        assert_eq!(neither.resolved_timestamp(7), 7);
    }

    #[test]
    fn test_unparseable_timestamp_is_none() {
        let r = record(
            r#"{"type":"message","timestamp":"yesterday","message":{"role":"user","content":"x","timestamp":null}}"#,
        );
        assert_eq!(r.resolved_timestamp(9), 9);
    }
}
