//! Sessions root discovery and working-directory encoding.

use std::path::{Path, PathBuf};

use crate::error::{Result, RewindError};

/// Environment variable overriding the sessions root.
pub const SESSIONS_DIR_ENV: &str = "REWIND_SESSIONS_DIR";

/// Default sessions root, relative to the home directory.
pub const DEFAULT_SESSIONS_SUBDIR: &str = ".pi/agent/sessions";

/// Extension of session log files.
pub const SESSION_LOG_EXTENSION: &str = "jsonl";

/// Locate the sessions root.
///
/// Checks, in order: an explicit override, `REWIND_SESSIONS_DIR`, then
/// `~/.pi/agent/sessions`. The directory does not have to exist yet; a
/// missing root simply means there is no cross-session history.
pub fn discover_sessions_root(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Ok(env_path) = std::env::var(SESSIONS_DIR_ENV) {
        if !env_path.is_empty() {
            return Ok(PathBuf::from(env_path));
        }
    }

    let home = home_directory().ok_or_else(|| RewindError::SessionsRootNotFound {
        expected_path: PathBuf::from("~").join(DEFAULT_SESSIONS_SUBDIR),
    })?;
    Ok(home.join(DEFAULT_SESSIONS_SUBDIR))
}

/// Get the user's home directory.
pub fn home_directory() -> Option<PathBuf> {
    directories::UserDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

/// Encode a working directory into its session directory name.
///
/// Leading separators are dropped and `/`, `\` and `:` become `-`:
/// `/home/user/proj` → `--home-user-proj--`.
#[must_use]
pub fn encode_cwd(cwd: &Path) -> String {
    let raw = cwd.to_string_lossy();
    let trimmed = raw.trim_start_matches(['/', '\\']);
    let encoded = trimmed.replace(['/', '\\', ':'], "-");
    format!("--{encoded}--")
}

/// Check whether `path` looks like a session log.
#[must_use]
pub fn is_session_log(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == SESSION_LOG_EXTENSION)
        .unwrap_or(false)
}
