//! Undo of a recorded batch.
//!
//! An undo is checked against the disk before anything moves: every path
//! the batch produced must still be there and every original name must be
//! free. A stale entry is left in the journal untouched.

use serde::Serialize;
use std::path::Path;

use tracing::{debug, error, info};

use crate::history::{HistoryLog, RenamePair};
use crate::progress::Progress;
use crate::rename::{execute, DiskProbe, ExecutionReport, PathProbe, RenameOperation};

#[derive(Debug, thiserror::Error)]
pub enum UndoError {
    #[error("History entry {index} does not exist (the journal has {len} entries)")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("History entry {index} no longer matches the disk: {}", .problems.join("; "))]
    StaleHistory { index: usize, problems: Vec<String> },
}

/// Reverse renames for one journal entry, ready to apply
#[derive(Debug, Clone, Serialize)]
pub struct UndoPlan {
    pub index: usize,
    pub operations: Vec<RenameOperation>,
}

/// Result of applying an undo
#[derive(Debug)]
pub struct UndoReport {
    pub index: usize,
    pub report: ExecutionReport,
    /// The journal entry is gone; otherwise the pairs that failed remain
    pub entry_removed: bool,
}

/// Check journal entry `index` against the disk and build its reverse pass
pub fn prepare_undo(log: &HistoryLog, index: usize) -> Result<UndoPlan, UndoError> {
    prepare_undo_with(log, index, &DiskProbe)
}

pub fn prepare_undo_with(log: &HistoryLog, index: usize, probe: &impl PathProbe) -> Result<UndoPlan, UndoError> {
    let entry = log.get(index).ok_or(UndoError::IndexOutOfBounds {
        index,
        len: log.len(),
    })?;

    let mut operations = Vec::with_capacity(entry.len());
    let mut problems = Vec::new();

    // Reverse order, so a chain inside the batch unwinds cleanly
    for pair in entry.pairs.iter().rev() {
        debug!(from = ?pair.new, to = ?pair.old, "Checking undo pair");

        let op = RenameOperation::new(None, pair.new.clone(), pair.old.clone());

        if !probe.exists(&pair.new) {
            problems.push(format!("'{}' not found", pair.new.display()));
            continue;
        }
        let taken = if op.is_case_only() {
            probe.taken_by_other(&pair.new, &pair.old)
        } else {
            probe.exists(&pair.old)
        };
        if taken {
            problems.push(format!("'{}' already exists", pair.old.display()));
            continue;
        }

        operations.push(op);
    }

    if !problems.is_empty() {
        error!("Undo validation failed:");
        for problem in &problems {
            error!("  - {}", problem);
        }
        return Err(UndoError::StaleHistory { index, problems });
    }

    Ok(UndoPlan { index, operations })
}

/// Whether journal entry `index` could be undone right now
pub fn can_undo(log: &HistoryLog, index: usize) -> bool {
    prepare_undo(log, index).is_ok()
}

/// Apply a prepared undo and update the journal
pub fn commit_undo(log: &mut HistoryLog, plan: &UndoPlan, progress: &mut Progress) -> UndoReport {
    progress.undo_start(plan.operations.len(), plan.index);
    info!(index = plan.index, renames = plan.operations.len(), "Undoing history entry");

    let report = execute(&plan.operations, progress);

    let restored: Vec<&Path> = report.renamed.iter().map(|op| op.destination_path.as_path()).collect();
    let before = log.len();
    log.retain_pairs(plan.index, |pair: &RenamePair| !restored.contains(&pair.old.as_path()));
    let entry_removed = log.len() < before;

    progress.undo_complete(report.renamed.len(), report.failed.len());

    UndoReport {
        index: plan.index,
        report,
        entry_removed,
    }
}

/// Validate and apply journal entry `index`
pub fn undo(log: &mut HistoryLog, index: usize, progress: &mut Progress) -> Result<UndoReport, UndoError> {
    let plan = prepare_undo(log, index)?;
    Ok(commit_undo(log, &plan, progress))
}
