use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::pattern::split_extension;

#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("Failed to read directory: {0}")]
    IoError(#[from] std::io::Error),
}

/// Stable key of a listed entry, assigned once per listing refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EntryId(pub u32);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilenameEntry {
    pub id: EntryId,
    pub path: PathBuf,
    pub is_dir: bool,
}

impl FilenameEntry {
    pub fn new(id: EntryId, path: PathBuf, is_dir: bool) -> Self {
        Self { id, path, is_dir }
    }

    pub fn name(&self) -> String {
        file_name(&self.path)
    }

    /// Stem and extension. Directories never have an extension.
    pub fn stem_and_extension(&self) -> (String, String) {
        let name = self.name();
        if self.is_dir {
            return (name, String::new());
        }
        let (stem, ext) = split_extension(&name);
        (stem.to_string(), ext.to_string())
    }

    /// Same directory, different filename
    pub fn sibling(&self, new_name: &str) -> PathBuf {
        self.path
            .parent()
            .map(|p| p.join(new_name))
            .unwrap_or_else(|| PathBuf::from(new_name))
    }
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Entries of one listing, ordered and keyed by [`EntryId`].
#[derive(Debug, Clone, Default)]
pub struct FileList {
    entries: BTreeMap<EntryId, FilenameEntry>,
    /// Entries left out because their path is not valid UTF-8
    unreadable: Vec<PathBuf>,
}

impl FileList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: PathBuf, is_dir: bool) -> EntryId {
        let id = EntryId(self.entries.len() as u32);
        self.entries.insert(id, FilenameEntry::new(id, path, is_dir));
        id
    }

    pub fn get(&self, id: EntryId) -> Option<&FilenameEntry> {
        self.entries.get(&id)
    }

    /// Point an entry at its new path, provided it still sits at `expected`.
    pub fn update_path(&mut self, id: EntryId, expected: &Path, new_path: &Path) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) if entry.path == expected => {
                entry.path = new_path.to_path_buf();
                true
            }
            _ => false,
        }
    }

    pub fn find_by_path(&self, path: &Path) -> Option<EntryId> {
        self.entries
            .values()
            .find(|entry| entry.path == path)
            .map(|entry| entry.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilenameEntry> {
        self.entries.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = EntryId> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Paths that were found but could not be listed
    pub fn unreadable(&self) -> &[PathBuf] {
        &self.unreadable
    }
}

/// List every entry (files and directories) of the given directories.
///
/// Each directory is read in name order, directories in the order given.
/// Ids are handed out sequentially across the whole listing. Paths in
/// `exclude` (the history journal) are left out. A path that is not valid
/// UTF-8 is never listed, since every rename is computed on text; it is
/// kept in [`FileList::unreadable`] instead.
pub fn list_filenames(directories: &[PathBuf], exclude: &[PathBuf]) -> Result<FileList, ScannerError> {
    let excluded: Vec<PathBuf> = exclude.iter().map(|p| normalize(p)).collect();
    let mut list = FileList::new();

    for dir in directories {
        for (path, is_dir) in scan_directory(dir)? {
            if excluded.contains(&normalize(&path)) {
                trace!(path = ?path, "Skipping excluded entry");
                continue;
            }
            if path.to_str().is_none() {
                warn!(path = ?path, "Skipping entry whose path is not valid UTF-8");
                list.unreadable.push(path);
                continue;
            }
            list.push(path, is_dir);
        }
    }

    debug!(count = list.len(), "Listing complete");
    Ok(list)
}

pub fn scan_directory(target: &Path) -> Result<Vec<(PathBuf, bool)>, ScannerError> {
    debug!(path = ?target, "Scanning directory");

    if !target.exists() {
        return Err(ScannerError::PathNotFound(target.to_path_buf()));
    }

    if !target.is_dir() {
        return Err(ScannerError::NotADirectory(target.to_path_buf()));
    }

    let read_dir = fs::read_dir(target).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            ScannerError::PermissionDenied(target.to_path_buf())
        } else {
            ScannerError::IoError(e)
        }
    })?;

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = entry?;
        let path = entry.path();
        let is_dir = path.is_dir();

        trace!(entry = ?path, is_dir, "Found entry");
        entries.push((path, is_dir));
    }

    entries.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));

    Ok(entries)
}

fn normalize(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
