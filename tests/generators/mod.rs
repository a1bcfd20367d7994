//! Synthetic session log generators.
//!
//! Builds a temporary sessions root laid out like the real one: one
//! directory per working directory, one JSONL log per session.

#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use prompt_rewind::discovery::encode_cwd;
use serde_json::json;
use tempfile::TempDir;

/// A user prompt record with a message-level timestamp.
pub fn user_line(text: &str, timestamp: i64) -> String {
    json!({
        "type": "message",
        "timestamp": timestamp,
        "message": {
            "role": "user",
            "content": [{"type": "text", "text": text}],
            "timestamp": timestamp,
        }
    })
    .to_string()
}

/// A user prompt whose content is a bare string.
pub fn user_string_line(text: &str, timestamp: i64) -> String {
    json!({
        "type": "message",
        "message": {"role": "user", "content": text, "timestamp": timestamp}
    })
    .to_string()
}

/// An assistant reply, never part of history.
pub fn assistant_line(text: &str, timestamp: i64) -> String {
    json!({
        "type": "message",
        "timestamp": timestamp,
        "message": {
            "role": "assistant",
            "content": [{"type": "text", "text": text}],
            "timestamp": timestamp,
        }
    })
    .to_string()
}

/// `count` user prompts named `<prefix> <i>`, one second apart from `start`.
pub fn numbered_prompts(prefix: &str, count: usize, start: i64) -> Vec<String> {
    (0..count)
        .map(|i| user_line(&format!("{prefix} {i}"), start + i as i64 * 1000))
        .collect()
}

/// A temporary sessions root.
pub struct SessionsTree {
    root: TempDir,
}

impl SessionsTree {
    /// Create an empty sessions root.
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().expect("create sessions root"),
        }
    }

    /// Path of the sessions root.
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Session directory for `cwd`.
    pub fn dir_for(&self, cwd: &Path) -> PathBuf {
        self.root.path().join(encode_cwd(cwd))
    }

    /// Write a session log for `cwd`, last modified `age_secs` ago.
    pub fn write_log(&self, cwd: &Path, name: &str, lines: &[String], age_secs: u64) -> PathBuf {
        let dir = self.dir_for(cwd);
        fs::create_dir_all(&dir).expect("create session dir");
        let path = dir.join(name);

        let mut file = File::create(&path).expect("create session log");
        for line in lines {
            writeln!(file, "{line}").expect("write session log");
        }
        file.flush().expect("flush session log");
        file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
            .expect("set mtime");
        path
    }
}
