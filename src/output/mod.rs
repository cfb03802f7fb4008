use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::history::{HistoryLog, RenamePair};
use crate::rename::{ExecutionReport, RenamePlan};
use crate::scanner::FilenameEntry;
use crate::undo::{can_undo, UndoPlan};

/// Print the selected entries with their ids
pub fn display_listing(entries: &[&FilenameEntry], writer: &mut impl Write) -> io::Result<()> {
    if entries.is_empty() {
        writeln!(writer, "No entries selected.")?;
        return Ok(());
    }

    let width = entries.iter().map(|e| e.id.0.to_string().len()).max().unwrap_or(1);
    for entry in entries {
        let marker = if entry.is_dir { "/" } else { "" };
        writeln!(writer, "{:>width$}  {}{}", entry.id.0, entry.name(), marker, width = width)?;
    }
    writeln!(writer)?;
    writeln!(writer, "{} entries", entries.len())?;

    Ok(())
}

/// Listing export: the working directories, a blank line, then every name
/// followed by `separator`
pub fn write_listing_file(
    directories: &[PathBuf],
    entries: &[&FilenameEntry],
    separator: &str,
    writer: &mut impl Write,
) -> io::Result<()> {
    writeln!(writer, "Directories:")?;
    for dir in directories {
        writeln!(writer, "{}", dir.display())?;
    }
    writeln!(writer)?;

    for entry in entries {
        write!(writer, "{}{}", entry.name(), separator)?;
    }

    Ok(())
}

/// Show what a batch would do before it is confirmed
pub fn display_preview(plan: &RenamePlan, dry_run: bool, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "========================================")?;
    writeln!(writer, "{}", if dry_run { "              DRY RUN" } else { "              PREVIEW" })?;
    writeln!(writer, "========================================")?;
    writeln!(writer)?;
    writeln!(writer, "Operation:  {}", plan.kind.description())?;
    writeln!(writer, "Matched:    {}", plan.matched)?;
    writeln!(writer)?;

    if plan.is_empty() {
        writeln!(writer, "No filenames to change.")?;
    } else {
        writeln!(writer, "Planned changes:")?;
        writeln!(writer)?;

        for (i, op) in plan.batch.operations().iter().enumerate() {
            writeln!(writer, "  {}. {}", i + 1, op.source_name)?;
            writeln!(writer, "     -> {}", op.destination_name)?;
        }
        writeln!(writer)?;
    }

    if !plan.rejections.is_empty() {
        writeln!(writer, "Skipped:")?;
        for rejection in &plan.rejections {
            writeln!(writer, "  [!] {}", rejection)?;
        }
        writeln!(writer)?;
    }

    // Summary
    writeln!(writer, "----------------------------------------")?;
    writeln!(writer, "Summary:")?;
    writeln!(writer, "  {} entries would be renamed", plan.len())?;
    if !plan.rejections.is_empty() {
        writeln!(writer, "  {} entries skipped", plan.rejections.len())?;
    }

    if dry_run {
        writeln!(writer)?;
        writeln!(writer, "Run without --dry to apply these changes.")?;
    }

    Ok(())
}

/// Show the reverse renames an undo would perform
pub fn display_undo_preview(plan: &UndoPlan, dry_run: bool, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "Undo of history entry {}:", plan.index)?;
    writeln!(writer)?;

    for op in &plan.operations {
        writeln!(writer, "  {} -> {}", op.source_name, op.destination_name)?;
    }

    writeln!(writer)?;
    writeln!(writer, "{} names would be restored.", plan.operations.len())?;
    if dry_run {
        writeln!(writer, "Run without --dry to apply these changes.")?;
    }

    Ok(())
}

/// Display execution results (non-dry-run)
pub fn display_execution_result(report: &ExecutionReport, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "Successfully renamed {} entries.", report.renamed.len())?;

    if !report.failed.is_empty() {
        writeln!(writer, "  {} renames failed:", report.failed.len())?;
        for failure in &report.failed {
            writeln!(writer, "    {}", failure)?;
        }
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct HistoryView<'a> {
    recording: bool,
    entries: Vec<HistoryEntryView<'a>>,
}

#[derive(Debug, Serialize)]
struct HistoryEntryView<'a> {
    index: usize,
    directory: Option<PathBuf>,
    undoable: bool,
    pairs: &'a [RenamePair],
}

fn history_view(log: &HistoryLog) -> HistoryView<'_> {
    HistoryView {
        recording: log.is_recording(),
        entries: log
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| HistoryEntryView {
                index,
                directory: entry.directory().map(PathBuf::from),
                undoable: can_undo(log, index),
                pairs: &entry.pairs,
            })
            .collect(),
    }
}

/// List journal entries, most recent first
pub fn display_history(log: &HistoryLog, writer: &mut impl Write) -> io::Result<()> {
    let view = history_view(log);

    writeln!(writer, "Recording: {}", if view.recording { "on" } else { "off" })?;
    writeln!(writer)?;

    if view.entries.is_empty() {
        writeln!(writer, "History is empty.")?;
        return Ok(());
    }

    for entry in &view.entries {
        let directory = entry
            .directory
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_default();
        let status = if entry.undoable { "" } else { "  [stale]" };
        writeln!(
            writer,
            "{}: {} renames in {}{}",
            entry.index,
            entry.pairs.len(),
            directory,
            status
        )?;

        if let Some(first) = entry.pairs.first() {
            let name = |p: &PathBuf| {
                p.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default()
            };
            writeln!(writer, "   {} -> {}", name(&first.old), name(&first.new))?;
            if entry.pairs.len() > 1 {
                writeln!(writer, "   ... and {} more", entry.pairs.len() - 1)?;
            }
        }
    }

    Ok(())
}

/// Pretty JSON for `--json`
pub fn write_json(value: &impl Serialize, writer: &mut impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)
}

pub fn write_history_json(log: &HistoryLog, writer: &mut impl Write) -> io::Result<()> {
    write_json(&history_view(log), writer)
}
