use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::rename::RenameOperation;

/// Most batches the journal keeps; older ones are evicted
pub const HISTORY_CAPACITY: usize = 10;

/// One rename inside a recorded batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamePair {
    /// Path before the batch
    pub old: PathBuf,
    /// Path the batch produced
    pub new: PathBuf,
}

impl RenamePair {
    pub fn new(old: impl Into<PathBuf>, new: impl Into<PathBuf>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }
}

impl From<&RenameOperation> for RenamePair {
    fn from(op: &RenameOperation) -> Self {
        Self::new(op.source_path.clone(), op.destination_path.clone())
    }
}

/// One committed batch, in the order its renames were applied
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub pairs: Vec<RenamePair>,
}

impl HistoryEntry {
    pub fn new(pairs: Vec<RenamePair>) -> Self {
        Self { pairs }
    }

    pub fn from_operations(operations: &[RenameOperation]) -> Self {
        Self::new(operations.iter().map(RenamePair::from).collect())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Directory of the first renamed path
    pub fn directory(&self) -> Option<&Path> {
        self.pairs.first().and_then(|pair| pair.old.parent())
    }
}

/// The journal: committed batches, most recent first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryLog {
    recording_enabled: bool,
    entries: Vec<HistoryEntry>,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryLog {
    pub fn new() -> Self {
        Self {
            recording_enabled: true,
            entries: Vec::new(),
        }
    }

    pub(crate) fn from_parts(recording_enabled: bool, entries: Vec<HistoryEntry>) -> Self {
        let mut log = Self {
            recording_enabled,
            entries,
        };
        log.entries.retain(|entry| !entry.is_empty());
        log.entries.truncate(HISTORY_CAPACITY);
        log
    }

    /// Add a committed batch at the front.
    ///
    /// Returns false when recording is off or the batch is empty.
    pub fn record(&mut self, entry: HistoryEntry) -> bool {
        if !self.recording_enabled || entry.is_empty() {
            return false;
        }
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_CAPACITY);
        true
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn remove(&mut self, index: usize) -> Option<HistoryEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    /// Keep only the pairs of entry `index` matching `keep`, dropping the
    /// entry once nothing is left.
    pub fn retain_pairs(&mut self, index: usize, keep: impl Fn(&RenamePair) -> bool) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.pairs.retain(|pair| keep(pair));
            if entry.is_empty() {
                self.entries.remove(index);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Flip recording; existing entries are kept. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.recording_enabled = !self.recording_enabled;
        self.recording_enabled
    }

    pub fn is_recording(&self) -> bool {
        self.recording_enabled
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
