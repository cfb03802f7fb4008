use std::fs;
use std::io;
use tracing::{info, warn};

use super::conflict::{DiskProbe, PathProbe};
use super::types::{ExecutionReport, RenameOperation, Rejection, SkipReason};
use crate::progress::Progress;

/// Apply renames one at a time. A failure is recorded for that entry and
/// the remaining entries are still attempted.
pub fn execute(operations: &[RenameOperation], progress: &mut Progress) -> ExecutionReport {
    let mut report = ExecutionReport::default();
    let total = operations.len();

    for (i, op) in operations.iter().enumerate() {
        progress.rename_progress(i + 1, total, &op.source_name, &op.destination_name);

        match rename_one(op) {
            Ok(()) => {
                info!("Renamed: {} -> {}", op.source_name, op.destination_name);
                report.renamed.push(op.clone());
            }
            Err(e) => {
                warn!(from = %op.source_name, to = %op.destination_name, error = %e, "Rename failed");
                let rejection = Rejection::new(
                    op.id,
                    op.source_name.clone(),
                    SkipReason::Filesystem {
                        message: e.to_string(),
                    },
                );
                progress.rejected(&rejection);
                report.failed.push(rejection);
            }
        }
    }

    report
}

fn rename_one(op: &RenameOperation) -> io::Result<()> {
    // The target may have appeared since the batch was checked, and
    // fs::rename would silently replace it on Unix
    let taken = if op.is_case_only() {
        DiskProbe.taken_by_other(&op.source_path, &op.destination_path)
    } else {
        DiskProbe.exists(&op.destination_path)
    };
    if taken {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("\"{}\" already exists", op.destination_name),
        ));
    }

    fs::rename(&op.source_path, &op.destination_path)
}
