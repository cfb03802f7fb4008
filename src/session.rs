//! The state one run works on: the listing of the working directories, the
//! selection narrowed from it and the history journal.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::history::{HistoryEntry, HistoryLog};
use crate::progress::Progress;
use crate::rename::{self, BoundaryMode, CaseMode, DiskProbe, ExecutionReport, RenameError, RenamePlan};
use crate::scanner::{list_filenames, FileList, FilenameEntry, ScannerError};
use crate::selection::{IdRange, Selection, SelectionError};
use crate::undo::{self, UndoError, UndoPlan, UndoReport};

/// What committing a batch did
#[derive(Debug)]
pub struct CommitOutcome {
    pub report: ExecutionReport,
    /// The batch went into the journal
    pub recorded: bool,
}

pub struct RenameSession {
    directories: Vec<PathBuf>,
    /// Never listed, the journal file itself
    exclude: Vec<PathBuf>,
    listing: FileList,
    selection: Selection,
    history: HistoryLog,
}

impl RenameSession {
    pub fn open(directories: Vec<PathBuf>, exclude: Vec<PathBuf>, history: HistoryLog) -> Result<Self, ScannerError> {
        let listing = list_filenames(&directories, &exclude)?;
        let selection = Selection::all(&listing);

        info!(
            directories = directories.len(),
            entries = listing.len(),
            history_entries = history.len(),
            "Session opened"
        );

        Ok(Self {
            directories,
            exclude,
            listing,
            selection,
            history,
        })
    }

    /// Re-read the directories. Ids are reassigned and everything is selected.
    pub fn reload(&mut self) -> Result<(), ScannerError> {
        self.listing = list_filenames(&self.directories, &self.exclude)?;
        self.selection = Selection::all(&self.listing);
        debug!(entries = self.listing.len(), "Listing reloaded");
        Ok(())
    }

    /// Add every listed subdirectory as a working directory and re-read the
    /// listing. Returns the directories that were new.
    pub fn add_subdirectories(&mut self) -> Result<Vec<PathBuf>, ScannerError> {
        let added: Vec<PathBuf> = self
            .listing
            .iter()
            .filter(|entry| entry.is_dir && !self.directories.contains(&entry.path))
            .map(|entry| entry.path.clone())
            .collect();

        if !added.is_empty() {
            self.directories.extend(added.iter().cloned());
            self.reload()?;
            info!(added = added.len(), directories = self.directories.len(), "Subdirectories added");
        }

        Ok(added)
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    pub fn listing(&self) -> &FileList {
        &self.listing
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Selected entries in id order
    pub fn selected(&self) -> Vec<FilenameEntry> {
        self.selection.entries(&self.listing).into_iter().cloned().collect()
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryLog {
        &mut self.history
    }

    pub fn into_history(self) -> HistoryLog {
        self.history
    }

    pub fn select_only(&mut self, ids: &[IdRange]) -> Result<Vec<SelectionError>, SelectionError> {
        self.selection.only(&self.listing, ids)
    }

    pub fn select_skip(&mut self, ids: &[IdRange]) -> Result<Vec<SelectionError>, SelectionError> {
        self.selection.skip(&self.listing, ids)
    }

    pub fn select_matching(&mut self, pattern: &str) -> Result<(), SelectionError> {
        self.selection.find(&self.listing, pattern, true)
    }

    pub fn exclude_matching(&mut self, pattern: &str) -> Result<(), SelectionError> {
        self.selection.find(&self.listing, pattern, false)
    }

    pub fn select_files(&mut self) -> Result<(), SelectionError> {
        self.selection.files_only(&self.listing)
    }

    pub fn select_dirs(&mut self) -> Result<(), SelectionError> {
        self.selection.dirs_only(&self.listing)
    }

    pub fn plan_replace(&self, pattern: &str, replacement: &str) -> Result<RenamePlan, RenameError> {
        rename::plan_replace(&self.selected(), pattern, replacement, &DiskProbe)
    }

    pub fn plan_between(
        &self,
        left: &str,
        right: &str,
        replacement: &str,
        mode: BoundaryMode,
    ) -> Result<RenamePlan, RenameError> {
        rename::plan_between(&self.selected(), left, right, replacement, mode, &DiskProbe)
    }

    pub fn plan_dots(&self) -> Result<RenamePlan, RenameError> {
        rename::plan_dots(&self.selected(), &DiskProbe)
    }

    pub fn plan_case(&self, mode: CaseMode) -> Result<RenamePlan, RenameError> {
        rename::plan_case(&self.selected(), mode, &DiskProbe)
    }

    pub fn plan_series(&self) -> Result<RenamePlan, RenameError> {
        rename::plan_series(&self.selected(), &DiskProbe)
    }

    /// List a directory whose entries take the selected files' names
    pub fn list_subtitles(&self, subtitle_dir: &Path) -> Result<FileList, ScannerError> {
        list_filenames(&[subtitle_dir.to_path_buf()], &self.exclude)
    }

    /// Pair the selected files with the entries of another listing
    pub fn plan_subtitles(&self, subtitles: &FileList) -> Result<RenamePlan, RenameError> {
        let entries: Vec<FilenameEntry> = subtitles.iter().cloned().collect();
        rename::plan_subtitles(&self.selected(), &entries, &DiskProbe)
    }

    /// Apply a confirmed plan, keep the listing in step and record the
    /// renames that succeeded
    pub fn commit(&mut self, plan: &RenamePlan, progress: &mut Progress) -> CommitOutcome {
        progress.batch_start(plan.len(), plan.kind.description());
        let report = rename::execute(plan.batch.operations(), progress);

        for op in &report.renamed {
            if let Some(id) = op.id {
                self.listing.update_path(id, &op.source_path, &op.destination_path);
            }
        }

        let recorded = self.history.record(HistoryEntry::from_operations(&report.renamed));
        info!(
            renamed = report.renamed.len(),
            failed = report.failed.len(),
            recorded,
            "Batch committed"
        );
        progress.rename_complete(report.renamed.len(), report.failed.len());

        CommitOutcome { report, recorded }
    }

    pub fn prepare_undo(&self, index: usize) -> Result<UndoPlan, UndoError> {
        undo::prepare_undo(&self.history, index)
    }

    pub fn commit_undo(&mut self, plan: &UndoPlan, progress: &mut Progress) -> UndoReport {
        let result = undo::commit_undo(&mut self.history, plan, progress);

        for op in &result.report.renamed {
            if let Some(id) = self.listing.find_by_path(&op.source_path) {
                self.listing.update_path(id, &op.source_path, &op.destination_path);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn names(session: &RenameSession) -> Vec<String> {
        session.listing().iter().map(|e| e.name()).collect()
    }

    fn open(dir: &Path) -> RenameSession {
        RenameSession::open(vec![dir.to_path_buf()], Vec::new(), HistoryLog::new()).unwrap()
    }

    #[test]
    fn test_commit_renames_and_records() {
        let dir = tempdir().unwrap();
        for name in ["clip01.mp4", "clip02.mp4", "clip03.mp4"] {
            fs::write(dir.path().join(name), name).unwrap();
        }
        let mut session = open(dir.path());

        let plan = session.plan_replace("clip", "scene_").unwrap();
        let outcome = session.commit(&plan, &mut Progress::silent());

        assert_eq!(outcome.report.renamed.len(), 3);
        assert!(outcome.recorded);
        assert_eq!(session.history().len(), 1);
        assert_eq!(names(&session), vec!["scene_01.mp4", "scene_02.mp4", "scene_03.mp4"]);
        assert!(dir.path().join("scene_02.mp4").exists());
    }

    #[test]
    fn test_undo_restores_and_shrinks_history() {
        let dir = tempdir().unwrap();
        for name in ["a.txt", "b.txt", "c.txt"] {
            fs::write(dir.path().join(name), name).unwrap();
        }
        let mut session = open(dir.path());

        let plan = session.plan_replace("#begin", "new_").unwrap();
        session.commit(&plan, &mut Progress::silent());
        assert_eq!(session.history().len(), 1);

        let undo_plan = session.prepare_undo(0).unwrap();
        let result = session.commit_undo(&undo_plan, &mut Progress::silent());

        assert_eq!(result.report.renamed.len(), 3);
        assert!(session.history().is_empty());
        assert_eq!(names(&session), vec!["a.txt", "b.txt", "c.txt"]);
        for name in ["a.txt", "b.txt", "c.txt"] {
            assert!(dir.path().join(name).exists());
        }
    }

    #[test]
    fn test_recording_disabled() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.b.txt"), "").unwrap();
        let mut session = open(dir.path());
        session.history_mut().toggle();

        let plan = session.plan_dots().unwrap();
        let outcome = session.commit(&plan, &mut Progress::silent());

        assert!(!outcome.recorded);
        assert!(session.history().is_empty());
        assert!(dir.path().join("a b.txt").exists());
    }

    #[test]
    fn test_selection_limits_the_batch() {
        let dir = tempdir().unwrap();
        for name in ["one.txt", "two.txt", "three.txt"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let mut session = open(dir.path());

        // Listing order: one, three, two
        session.select_skip(&[1..=1]).unwrap();
        let plan = session.plan_case(CaseMode::Capitalize).unwrap();

        let targets: Vec<&str> = plan.batch.operations().iter().map(|op| op.destination_name.as_str()).collect();
        assert_eq!(targets, vec!["One.txt", "Two.txt"]);
    }

    #[test]
    fn test_subtitles_from_other_directory() {
        let videos = tempdir().unwrap();
        let subs = tempdir().unwrap();
        fs::write(videos.path().join("Show 01.mkv"), "").unwrap();
        fs::write(subs.path().join("track1.srt"), "").unwrap();
        let mut session = open(videos.path());

        let subtitles = session.list_subtitles(subs.path()).unwrap();
        let plan = session.plan_subtitles(&subtitles).unwrap();
        session.commit(&plan, &mut Progress::silent());

        assert!(subs.path().join("Show 01.srt").exists());
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_reload_picks_up_changes() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        let mut session = open(dir.path());

        fs::write(dir.path().join("b.txt"), "").unwrap();
        session.reload().unwrap();

        assert_eq!(session.listing().len(), 2);
        assert_eq!(session.selection().len(), 2);
    }

    #[test]
    fn test_add_subdirectories() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("season1")).unwrap();
        fs::write(dir.path().join("season1").join("ep01.mkv"), "").unwrap();
        fs::write(dir.path().join("cover.jpg"), "").unwrap();
        let mut session = open(dir.path());

        let added = session.add_subdirectories().unwrap();

        assert_eq!(added, vec![dir.path().join("season1")]);
        assert_eq!(session.directories().len(), 2);
        assert_eq!(names(&session), vec!["cover.jpg", "season1", "ep01.mkv"]);
        assert!(session.add_subdirectories().unwrap().is_empty());
    }

    #[test]
    fn test_lowercase_leaves_distinct_case_twin_alone() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Clip.txt"), "upper").unwrap();
        fs::write(dir.path().join("clip.txt"), "lower").unwrap();
        if fs::read_dir(dir.path()).unwrap().count() < 2 {
            // Case-insensitive filesystem
            return;
        }
        let mut session = open(dir.path());

        let plan = session.plan_case(CaseMode::Lower).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.rejections.len(), 1);

        session.commit(&plan, &mut Progress::silent());
        assert_eq!(fs::read_to_string(dir.path().join("Clip.txt")).unwrap(), "upper");
        assert_eq!(fs::read_to_string(dir.path().join("clip.txt")).unwrap(), "lower");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_name_is_never_renamed() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().unwrap();
        let raw = dir.path().join(OsStr::from_bytes(b"CAF\xE9.TXT"));
        fs::write(&raw, "x").unwrap();
        fs::write(dir.path().join("Plain.TXT"), "").unwrap();
        let mut session = open(dir.path());
        assert_eq!(session.listing().unreadable(), &[raw.clone()]);

        let plan = session.plan_case(CaseMode::Lower).unwrap();
        session.commit(&plan, &mut Progress::silent());

        assert!(raw.exists());
        assert!(dir.path().join("plain.txt").exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }
}
