use std::fs;
use std::mem;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::types::*;
use super::writer::{write_history, HistoryError};

/// Parse the journal text. Malformed content is tolerated: whatever can
/// be read is kept and the rest is dropped with a warning.
pub fn parse_history(text: &str) -> HistoryLog {
    let mut lines = text.lines();
    let recording = !matches!(lines.next().map(str::trim), Some("off"));

    let mut entries = Vec::new();
    let mut pending = Vec::new();
    let mut old_path: Option<PathBuf> = None;

    for line in lines {
        if line.is_empty() {
            if let Some(dangling) = old_path.take() {
                warn!(path = ?dangling, "History pair without a new path, dropping it");
            }
            // Two blank lines in a row end the journal
            if pending.is_empty() {
                break;
            }
            entries.push(HistoryEntry::new(mem::take(&mut pending)));
            if entries.len() == HISTORY_CAPACITY {
                break;
            }
            continue;
        }

        match old_path.take() {
            None => old_path = Some(PathBuf::from(line)),
            Some(old) => pending.push(RenamePair::new(old, line)),
        }
    }

    if let Some(dangling) = old_path {
        warn!(path = ?dangling, "History pair without a new path, dropping it");
    }
    if !pending.is_empty() && entries.len() < HISTORY_CAPACITY {
        entries.push(HistoryEntry::new(pending));
    }

    debug!(entries = entries.len(), recording, "History parsed");

    HistoryLog::from_parts(recording, entries)
}

/// Read and parse a history file
pub fn read_history(path: &Path) -> Result<HistoryLog, HistoryError> {
    let text = fs::read_to_string(path).map_err(|source| HistoryError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(parse_history(&text))
}

/// Read the journal, creating it with recording on when it does not exist
pub fn load_or_create(path: &Path) -> Result<HistoryLog, HistoryError> {
    if path.exists() {
        return read_history(path);
    }

    info!(path = ?path, "No history file, creating one");
    let log = HistoryLog::new();
    write_history(&log, path)?;
    Ok(log)
}
