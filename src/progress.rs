//! Progress output for user-facing status updates.
//!
//! Renames are reported one line at a time on stderr while a batch runs.
//! In verbose mode the reporter is silent and tracing carries the same
//! information.

use colored::Colorize;
use std::io::{self, IsTerminal, Write};

use crate::rename::Rejection;

/// Progress reporter for user-facing output
pub struct Progress {
    writer: Box<dyn Write>,
    /// When true, all output is suppressed (verbose mode uses tracing instead)
    silent: bool,
    /// When true, output is colorized
    colors_enabled: bool,
}

/// Check if we should use colors in output
pub fn should_use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }
    io::stderr().is_terminal()
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    /// Create a new progress reporter writing to stderr
    pub fn new() -> Self {
        Self::new_with_ui(false, should_use_colors())
    }

    /// When `verbose` is set, output is suppressed (tracing handles it)
    pub fn new_with_ui(verbose: bool, colors_enabled: bool) -> Self {
        Self {
            writer: Box::new(io::stderr()),
            silent: verbose,
            colors_enabled,
        }
    }

    #[cfg(test)]
    pub fn with_writer(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            silent: false,
            colors_enabled: false,
        }
    }

    /// A reporter that prints nothing
    pub fn silent() -> Self {
        Self {
            writer: Box::new(io::sink()),
            silent: true,
            colors_enabled: false,
        }
    }

    /// Report starting a batch
    pub fn batch_start(&mut self, total: usize, operation: &str) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = writeln!(
                self.writer,
                "{}",
                format!("{}: renaming {} entries", operation, total).bold()
            );
        } else {
            let _ = writeln!(self.writer, "{}: renaming {} entries", operation, total);
        }
    }

    /// Report progress on a single rename
    pub fn rename_progress(&mut self, current: usize, total: usize, from: &str, to: &str) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let counter = format!("[{}/{}]", current, total);
            let _ = writeln!(
                self.writer,
                "{} {} {} {}",
                counter.cyan(),
                from.dimmed(),
                "→".cyan(),
                to
            );
        } else {
            let _ = writeln!(self.writer, "[{}/{}] {} -> {}", current, total, from, to);
        }
    }

    /// Report an entry that could not be renamed
    pub fn rejected(&mut self, rejection: &Rejection) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = writeln!(self.writer, "{} {}", "✗".red().bold(), rejection.to_string().red());
        } else {
            let _ = writeln!(self.writer, "{}", rejection);
        }
    }

    /// Report an error during operation (non-fatal)
    pub fn warn(&mut self, message: &str) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = writeln!(self.writer, "{} {}", "!".yellow().bold(), message.yellow());
        } else {
            let _ = writeln!(self.writer, "Warning: {}", message);
        }
    }

    /// Report the end of a batch
    pub fn rename_complete(&mut self, renamed: usize, failed: usize) {
        if self.silent {
            return;
        }
        let summary = if failed == 0 {
            format!("{} entries renamed", renamed)
        } else {
            format!("{} entries renamed, {} failed", renamed, failed)
        };
        if self.colors_enabled {
            let mark = if failed == 0 { "✓".green().bold() } else { "!".yellow().bold() };
            let _ = writeln!(self.writer, "{} {}", mark, summary);
        } else {
            let _ = writeln!(self.writer, "Done. {}.", summary);
        }
    }

    /// Report a batch declined at the confirmation prompt
    pub fn cancelled(&mut self) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = writeln!(self.writer, "{}", "Cancelled, nothing renamed.".dimmed());
        } else {
            let _ = writeln!(self.writer, "Cancelled, nothing renamed.");
        }
    }

    /// Report that a batch was added to the history
    pub fn history_recorded(&mut self, path: &std::path::Path) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = writeln!(
                self.writer,
                "{}",
                format!("Recorded in history: {}", path.display()).dimmed()
            );
        } else {
            let _ = writeln!(self.writer, "Recorded in history: {}", path.display());
        }
    }

    /// Report starting an undo
    pub fn undo_start(&mut self, total: usize, index: usize) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = writeln!(
                self.writer,
                "{}",
                format!("Undoing history entry {} ({} renames)", index, total).bold()
            );
        } else {
            let _ = writeln!(self.writer, "Undoing history entry {} ({} renames)", index, total);
        }
    }

    /// Report undo complete
    pub fn undo_complete(&mut self, restored: usize, failed: usize) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            if failed == 0 {
                let _ = writeln!(
                    self.writer,
                    "{} {}",
                    "✓".green().bold(),
                    format!("{} names restored", restored).green()
                );
            } else {
                let _ = writeln!(
                    self.writer,
                    "{} {}",
                    "!".yellow().bold(),
                    format!("{} names restored, {} failed", restored, failed).yellow()
                );
            }
        } else if failed == 0 {
            let _ = writeln!(self.writer, "Undo complete. {} names restored.", restored);
        } else {
            let _ = writeln!(self.writer, "Undo finished. {} names restored, {} failed.", restored, failed);
        }
    }
}
