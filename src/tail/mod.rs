//! Bounded tail reads of append-only session logs.
//!
//! Only the last `max_bytes` of a file are read. When the window starts past
//! the first byte, the text up to and including the first newline is dropped
//! because it is almost certainly the back half of a line. That line is lost
//! for this read; older prompts matter least, so nothing tries to recover it.
//!
//! Failures never propagate: a missing, unreadable or empty file reads as
//! the empty string, which callers treat as "skip this file".

use std::io::SeekFrom;
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, instrument, trace};

use crate::error::{Result, RewindError};

/// Read the decoded tail of `path`, at most `max_bytes` long.
///
/// Returns an empty string on any I/O failure.
#[instrument(level = "debug", skip_all, fields(path = %path.display(), max_bytes = max_bytes))]
pub async fn read_tail(path: &Path, max_bytes: u64) -> String {
    match try_read_tail(path, max_bytes).await {
        Ok(text) => text,
        Err(e) => {
            debug!(error = %e, "Tail read failed, treating file as empty");
            String::new()
        }
    }
}

async fn try_read_tail(path: &Path, max_bytes: u64) -> Result<String> {
    let mut file = File::open(path)
        .await
        .map_err(|e| RewindError::from_io_at(path, e))?;

    // The size observed here bounds the read; later appends are ignored.
    let size = file
        .metadata()
        .await
        .map_err(|e| RewindError::from_io_at(path, e))?
        .len();
    if size == 0 {
        return Ok(String::new());
    }

    let start = size.saturating_sub(max_bytes);
    let window = size - start;
    trace!(size, start, window, "Reading tail window");

    file.seek(SeekFrom::Start(start))
        .await
        .map_err(|e| RewindError::io(format!("Failed to seek in {}", path.display()), e))?;

    let mut bytes = Vec::with_capacity(usize::try_from(window).unwrap_or(0));
    file.take(window)
        .read_to_end(&mut bytes)
        .await
        .map_err(|e| RewindError::io(format!("Failed to read {}", path.display()), e))?;

    Ok(decode_tail(&bytes, start > 0))
}

/// Decode a tail window, dropping the leading partial line when the window
/// does not start at the beginning of the file.
#[must_use]
pub fn decode_tail(bytes: &[u8], starts_mid_file: bool) -> String {
    let body = if starts_mid_file {
        match bytes.iter().position(|&b| b == b'\n') {
            Some(newline) => &bytes[newline + 1..],
            None => &bytes[bytes.len()..],
        }
    } else {
        bytes
    };
    String::from_utf8_lossy(body).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_budget_covers_whole_file() {
        let content = "line one\nline two\nline three\n";
        let file = write_temp(content);
        assert_eq!(read_tail(file.path(), 1024).await, content);
        assert_eq!(read_tail(file.path(), content.len() as u64).await, content);
    }

    #[tokio::test]
    async fn test_partial_first_line_is_dropped() {
        let file = write_temp("aaaa\nbbbb\ncccc\n");
        // Window is "a\nbbbb\ncccc\n"; the dangling "a" goes.
        assert_eq!(read_tail(file.path(), 12).await, "bbbb\ncccc\n");
    }

    #[tokio::test]
    async fn test_window_starting_on_line_boundary_still_drops_one_line() {
        let file = write_temp("aaaa\nbbbb\ncccc\n");
        // Window starts exactly at "bbbb"; the first line is dropped anyway.
        assert_eq!(read_tail(file.path(), 10).await, "cccc\n");
    }

    #[tokio::test]
    async fn test_window_without_newline_is_empty() {
        let file = write_temp("aaaaaaaaaaaaaaaa");
        assert_eq!(read_tail(file.path(), 4).await, "");
    }

    #[tokio::test]
    async fn test_missing_and_empty_files_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_tail(&dir.path().join("nope.jsonl"), 100).await, "");

        let empty = write_temp("");
        assert_eq!(read_tail(empty.path(), 100).await, "");
    }

    #[tokio::test]
    async fn test_directory_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_tail(dir.path(), 100).await, "");
    }

    #[test]
    fn test_decode_tail_handles_invalid_utf8() {
        let decoded = decode_tail(b"ok\xff\n", false);
        assert!(decoded.starts_with("ok"));
        assert!(decoded.ends_with('\n'));
    }
}
