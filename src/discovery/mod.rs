//! Session log discovery.
//!
//! Session logs live under a sessions root, one directory per working
//! directory (see [`encode_cwd`]), one `*.jsonl` file per session. This
//! module only lists and stats them; it never writes.

mod paths;

pub use paths::*;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tokio::fs;
use tracing::{debug, trace};

use crate::error::{Result, RewindError};

/// A session log file and its modification time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLog {
    /// Path to the `.jsonl` file.
    pub path: PathBuf,
    /// Last modification time.
    pub modified: SystemTime,
}

/// The sessions root and the per-directory session folders under it.
#[derive(Debug, Clone)]
pub struct SessionDirectory {
    root: PathBuf,
}

impl SessionDirectory {
    /// Use `root` as the sessions root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Locate the sessions root (see [`discover_sessions_root`]).
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        discover_sessions_root(explicit).map(Self::new)
    }

    /// Get the root path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the session logs for `cwd`.
    #[must_use]
    pub fn dir_for_cwd(&self, cwd: &Path) -> PathBuf {
        self.root.join(encode_cwd(cwd))
    }

    /// Session logs for `cwd`, most recently modified first, without `exclude`.
    ///
    /// Unreadable directories or entries contribute nothing.
    pub async fn sibling_logs(&self, cwd: &Path, exclude: Option<&Path>) -> Vec<SessionLog> {
        let dir = self.dir_for_cwd(cwd);
        let mut entries = match open_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!(error = %e, "No readable session directory");
                return Vec::new();
            }
        };

        let excluded = match exclude {
            Some(path) => Some(canonical_or_self(path).await),
            None => None,
        };

        let mut logs = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    debug!(dir = %dir.display(), error = %e, "Stopped listing session directory");
                    break;
                }
            };

            let path = entry.path();
            if !is_session_log(&path) {
                continue;
            }
            if let Some(excluded) = &excluded {
                if path == *excluded || canonical_or_self(&path).await == *excluded {
                    trace!(path = %path.display(), "Skipping active session log");
                    continue;
                }
            }

            // Files may vanish between listing and stat.
            let modified = match entry.metadata().await.and_then(|m| {
                if m.is_file() {
                    m.modified()
                } else {
                    Err(std::io::Error::other("not a regular file"))
                }
            }) {
                Ok(modified) => modified,
                Err(e) => {
                    trace!(path = %path.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            logs.push(SessionLog { path, modified });
        }

        logs.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.path.cmp(&b.path)));
        debug!(dir = %dir.display(), count = logs.len(), "Listed sibling session logs");
        logs
    }
}

async fn open_dir(dir: &Path) -> Result<fs::ReadDir> {
    fs::read_dir(dir)
        .await
        .map_err(|e| RewindError::from_dir_io_at(dir, e))
}

async fn canonical_or_self(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .await
        .unwrap_or_else(|_| path.to_path_buf())
}
