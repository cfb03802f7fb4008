use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::scanner::{file_name, EntryId};

/// Which batch operation produced a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Replace,
    Between,
    BetweenInclusive,
    Dots,
    Lowercase,
    Capitalize,
    Series,
    Subtitles,
    Undo,
}

impl OperationKind {
    pub fn description(&self) -> &'static str {
        match self {
            OperationKind::Replace => "Pattern replace",
            OperationKind::Between => "Replace between patterns",
            OperationKind::BetweenInclusive => "Replace between patterns (inclusive)",
            OperationKind::Dots => "Periods to spaces",
            OperationKind::Lowercase => "Lowercase",
            OperationKind::Capitalize => "Capitalize words",
            OperationKind::Series => "Series episode names",
            OperationKind::Subtitles => "Match subtitle names",
            OperationKind::Undo => "Undo",
        }
    }
}

/// A single rename, planned or performed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameOperation {
    /// Listing entry being renamed, when the operation came from the listing
    pub id: Option<EntryId>,
    pub source_path: PathBuf,
    pub source_name: String,
    pub destination_path: PathBuf,
    pub destination_name: String,
}

impl RenameOperation {
    pub fn new(id: Option<EntryId>, source_path: PathBuf, destination_path: PathBuf) -> Self {
        let source_name = file_name(&source_path);
        let destination_name = file_name(&destination_path);

        Self {
            id,
            source_path,
            source_name,
            destination_path,
            destination_name,
        }
    }

    /// Target differs from the source only by letter case
    pub fn is_case_only(&self) -> bool {
        self.source_path != self.destination_path
            && fold_path(&self.source_path) == fold_path(&self.destination_path)
    }

    pub fn reversed(&self) -> Self {
        Self::new(
            self.id,
            self.destination_path.clone(),
            self.source_path.clone(),
        )
    }
}

pub(crate) fn fold_path(path: &std::path::Path) -> String {
    path.to_string_lossy().to_lowercase()
}

/// Ordered, conflict-free set of renames
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RenameBatch {
    operations: Vec<RenameOperation>,
}

impl RenameBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the conflict checker builds batches, which keeps targets unique
    pub(crate) fn push(&mut self, op: RenameOperation) {
        self.operations.push(op);
    }

    pub fn operations(&self) -> &[RenameOperation] {
        &self.operations
    }

    pub fn target_of(&self, id: EntryId) -> Option<&PathBuf> {
        self.operations
            .iter()
            .find(|op| op.id == Some(id))
            .map(|op| &op.destination_path)
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }
}

/// Why an entry was left out of a batch or failed to rename
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Target exists on disk or is claimed by another entry
    Conflict { target: String },
    /// Both patterns found, nothing between them
    DegenerateSpan,
    /// `#index N` beyond the filename length
    IndexOutOfBounds { index: usize, len: usize },
    /// The rename call itself failed
    Filesystem { message: String },
    /// The computed name equals the current one
    AlreadyNamed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Conflict { target } => write!(f, "filename \"{}\" already exists", target),
            SkipReason::DegenerateSpan => write!(f, "nothing between the patterns"),
            SkipReason::IndexOutOfBounds { index, len } => {
                write!(f, "index {} is beyond the name length {}", index, len)
            }
            SkipReason::Filesystem { message } => write!(f, "{}", message),
            SkipReason::AlreadyNamed => write!(f, "already named properly"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub id: Option<EntryId>,
    pub name: String,
    pub reason: SkipReason,
}

impl Rejection {
    pub fn new(id: Option<EntryId>, name: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            id,
            name: name.into(),
            reason,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cannot rename \"{}\": {}", self.name, self.reason)
    }
}

/// Result of planning a batch: what will be renamed and what was skipped
#[derive(Debug, Clone, Serialize)]
pub struct RenamePlan {
    pub kind: OperationKind,
    pub batch: RenameBatch,
    pub rejections: Vec<Rejection>,
    /// Entries the patterns selected, before conflicts were removed
    pub matched: usize,
}

impl RenamePlan {
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            batch: RenameBatch::new(),
            rejections: Vec::new(),
            matched: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    pub fn len(&self) -> usize {
        self.batch.len()
    }
}

/// Outcome of applying a batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionReport {
    pub renamed: Vec<RenameOperation>,
    pub failed: Vec<Rejection>,
}

impl ExecutionReport {
    pub fn all_failed(&self) -> bool {
        self.renamed.is_empty() && !self.failed.is_empty()
    }
}
