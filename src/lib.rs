pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod output;
pub mod pattern;
pub mod progress;
pub mod prompt;
pub mod rename;
pub mod scanner;
pub mod selection;
pub mod session;
pub mod undo;

pub use config::Config;
pub use error::{AppError, ExitCode};
pub use history::{HistoryEntry, HistoryError, HistoryLog, RenamePair};
pub use pattern::{Keyword, Matcher, Pattern, PatternError, TextMatch};
pub use rename::{
    locate, BoundaryMode, CaseMode, ExecutionReport, OperationKind, RenameError, RenameOperation, RenamePlan,
    Rejection, SkipReason,
};
pub use scanner::{list_filenames, scan_directory, EntryId, FileList, FilenameEntry, ScannerError};
pub use selection::{parse_index_list, IdRange, Selection, SelectionError};
pub use session::{CommitOutcome, RenameSession};
pub use undo::{prepare_undo, undo, UndoError, UndoPlan, UndoReport};
