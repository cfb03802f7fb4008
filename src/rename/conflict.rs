use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::types::{fold_path, RenameBatch, RenameOperation, Rejection, SkipReason};
use crate::scanner::{file_name, EntryId};

/// Answers whether a path is already taken on disk
pub trait PathProbe {
    fn exists(&self, path: &Path) -> bool;

    /// Whether `a` and `b` name the same filesystem entry. Fakes treat a
    /// pair that differs only by case as one entry, the way a
    /// case-insensitive filesystem does.
    fn same_entry(&self, a: &Path, b: &Path) -> bool {
        fold_path(a) == fold_path(b)
    }

    /// `target` is held by something other than `source` itself
    fn taken_by_other(&self, source: &Path, target: &Path) -> bool {
        self.exists(target) && !self.same_entry(source, target)
    }
}

/// Queries the real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskProbe;

impl PathProbe for DiskProbe {
    fn exists(&self, path: &Path) -> bool {
        // symlink_metadata so a dangling link still counts as taken
        path.symlink_metadata().is_ok()
    }

    fn same_entry(&self, a: &Path, b: &Path) -> bool {
        same_file(a, b)
    }
}

#[cfg(unix)]
fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::symlink_metadata(a), fs::symlink_metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

impl<F> PathProbe for F
where
    F: Fn(&Path) -> bool,
{
    fn exists(&self, path: &Path) -> bool {
        self(path)
    }
}

/// A proposed rename before conflict checking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: Option<EntryId>,
    pub source: PathBuf,
    pub target: PathBuf,
}

impl Candidate {
    pub fn new(id: Option<EntryId>, source: PathBuf, target: PathBuf) -> Self {
        Self { id, source, target }
    }
}

/// Keep candidates whose targets are free, in order.
///
/// A candidate is rejected when its target already exists on disk or when
/// an earlier accepted candidate claims the same target (compared without
/// case). A case-only rename passes the disk check only when the existing
/// target is the source entry itself, as on a case-insensitive filesystem;
/// a distinct file whose name differs only by case still blocks it.
/// Unchanged candidates are dropped without a rejection.
pub fn check_conflicts(candidates: Vec<Candidate>, probe: &impl PathProbe) -> (RenameBatch, Vec<Rejection>) {
    let mut batch = RenameBatch::new();
    let mut rejections = Vec::new();
    let mut claimed: HashSet<String> = HashSet::new();

    for candidate in candidates {
        if candidate.source == candidate.target {
            debug!(path = ?candidate.source, "Name unchanged, skipping");
            continue;
        }

        let op = RenameOperation::new(candidate.id, candidate.source, candidate.target);
        let folded = fold_path(&op.destination_path);

        let taken_in_batch = claimed.contains(&folded);
        let taken_on_disk = if op.is_case_only() {
            probe.taken_by_other(&op.source_path, &op.destination_path)
        } else {
            probe.exists(&op.destination_path)
        };

        if taken_in_batch || taken_on_disk {
            warn!(
                from = %op.source_name,
                to = %op.destination_name,
                in_batch = taken_in_batch,
                "Target name already taken"
            );
            rejections.push(Rejection::new(
                op.id,
                op.source_name.clone(),
                SkipReason::Conflict {
                    target: file_name(&op.destination_path),
                },
            ));
            continue;
        }

        claimed.insert(folded);
        batch.push(op);
    }

    (batch, rejections)
}
