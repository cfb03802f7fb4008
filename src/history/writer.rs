use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use super::types::HistoryLog;

/// Error types for history operations
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("Failed to write history file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read history file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Render the journal in its line-oriented text form.
///
/// The first line is `on` or `off`, then each batch as old/new path line
/// pairs followed by a blank line.
pub fn format_history(log: &HistoryLog) -> String {
    let mut text = String::new();
    text.push_str(if log.is_recording() { "on" } else { "off" });
    text.push('\n');

    for entry in log.entries() {
        for pair in &entry.pairs {
            text.push_str(&pair.old.to_string_lossy());
            text.push('\n');
            text.push_str(&pair.new.to_string_lossy());
            text.push('\n');
        }
        text.push('\n');
    }

    text
}

/// Replace the journal file with the current log
pub fn write_history(log: &HistoryLog, path: &Path) -> Result<(), HistoryError> {
    let write_error = |source| HistoryError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }

    // Write to temporary file first
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    {
        let file = File::create(&temp_path).map_err(write_error)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(format_history(log).as_bytes()).map_err(write_error)?;
        writer.flush().map_err(write_error)?;
    }

    // Atomic rename
    fs::rename(&temp_path, path).map_err(write_error)?;

    info!(path = ?path, entries = log.len(), "History written");

    Ok(())
}
