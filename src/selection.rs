//! Narrowing the listing down to the entries an operation works on.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use thiserror::Error;
use tracing::debug;

use crate::pattern::Matcher;
use crate::scanner::{EntryId, FileList, FilenameEntry};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Invalid index list entry: \"{0}\" (expected ids like 0,3-5)")]
    InvalidIndexList(String),

    #[error("Id {id} is not in the listing of {len} entries")]
    IndexOutOfBounds { id: u32, len: usize },

    #[error("Ids {low}-{high} run past the listing of {len} entries")]
    RangeOutOfBounds { low: u32, high: u32, len: usize },

    #[error("This filter would leave nothing selected")]
    EmptyResult,

    #[error("This filter did not remove anything")]
    NothingRemoved,
}

/// Inclusive run of ids from an index list; a single id is a one-id range
pub type IdRange = RangeInclusive<u32>;

/// Parse `0,3-5,9` into id ranges. Ranges are inclusive and may be written
/// backwards. They are kept as ranges, so `0-4000000000` costs nothing
/// until it is checked against a listing.
pub fn parse_index_list(raw: &str) -> Result<Vec<IdRange>, SelectionError> {
    let mut ids = Vec::new();

    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let invalid = || SelectionError::InvalidIndexList(token.to_string());

        match token.split_once('-') {
            Some((from, to)) => {
                let from: u32 = from.trim().parse().map_err(|_| invalid())?;
                let to: u32 = to.trim().parse().map_err(|_| invalid())?;
                let (low, high) = if from <= to { (from, to) } else { (to, from) };
                ids.push(low..=high);
            }
            None => {
                let id: u32 = token.parse().map_err(|_| invalid())?;
                ids.push(id..=id);
            }
        }
    }

    Ok(ids)
}

/// The ids currently selected from a listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<EntryId>,
}

impl Selection {
    /// Everything in the listing
    pub fn all(listing: &FileList) -> Self {
        Self {
            ids: listing.ids().collect(),
        }
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = EntryId> + '_ {
        self.ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected entries in id order
    pub fn entries<'a>(&self, listing: &'a FileList) -> Vec<&'a FilenameEntry> {
        self.ids.iter().filter_map(|id| listing.get(*id)).collect()
    }

    /// Keep only `ids`. Ids missing from the listing are returned as errors
    /// and otherwise ignored.
    pub fn only(&mut self, listing: &FileList, ids: &[IdRange]) -> Result<Vec<SelectionError>, SelectionError> {
        let (wanted, missing) = split_known(listing, ids);
        self.apply(self.ids.intersection(&wanted).copied().collect())?;
        Ok(missing)
    }

    /// Drop `ids` from the selection
    pub fn skip(&mut self, listing: &FileList, ids: &[IdRange]) -> Result<Vec<SelectionError>, SelectionError> {
        let (unwanted, missing) = split_known(listing, ids);
        self.apply(self.ids.difference(&unwanted).copied().collect())?;
        Ok(missing)
    }

    /// Keep the names containing `pattern`, or drop them when `keep` is false
    pub fn find(&mut self, listing: &FileList, pattern: &str, keep: bool) -> Result<(), SelectionError> {
        let matcher = Matcher::compile(pattern);
        self.filter(listing, |entry| {
            let name: Vec<char> = entry.name().chars().collect();
            matcher.find_first(&name).is_some() == keep
        })
    }

    pub fn files_only(&mut self, listing: &FileList) -> Result<(), SelectionError> {
        self.filter(listing, |entry| !entry.is_dir)
    }

    pub fn dirs_only(&mut self, listing: &FileList) -> Result<(), SelectionError> {
        self.filter(listing, |entry| entry.is_dir)
    }

    fn filter(&mut self, listing: &FileList, keep: impl Fn(&FilenameEntry) -> bool) -> Result<(), SelectionError> {
        let kept = self
            .ids
            .iter()
            .copied()
            .filter(|id| listing.get(*id).map(&keep).unwrap_or(false))
            .collect();
        self.apply(kept)
    }

    // Refuse a result that is empty or identical
    fn apply(&mut self, next: BTreeSet<EntryId>) -> Result<(), SelectionError> {
        if next.is_empty() {
            return Err(SelectionError::EmptyResult);
        }
        if next == self.ids {
            return Err(SelectionError::NothingRemoved);
        }
        debug!(before = self.ids.len(), after = next.len(), "Selection narrowed");
        self.ids = next;
        Ok(())
    }
}

fn split_known(listing: &FileList, ranges: &[IdRange]) -> (BTreeSet<EntryId>, Vec<SelectionError>) {
    let len = listing.len();
    let mut known = BTreeSet::new();
    let mut missing = Vec::new();

    for range in ranges {
        known.extend(listing.ids().filter(|id| range.contains(&id.0)));

        let (low, high) = (*range.start(), *range.end());
        if (high as usize) < len {
            continue;
        }
        if low == high {
            missing.push(SelectionError::IndexOutOfBounds { id: low, len });
        } else {
            missing.push(SelectionError::RangeOutOfBounds { low, high, len });
        }
    }

    (known, missing)
}
