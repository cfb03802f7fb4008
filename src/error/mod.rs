mod codes;

pub use codes::ExitCode;

use crate::history::HistoryError;
use crate::pattern::PatternError;
use crate::rename::RenameError;
use crate::scanner::ScannerError;
use crate::selection::SelectionError;
use crate::undo::UndoError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("No filenames contain this pattern")]
    NoMatch,

    #[error("Invalid pattern: {message}")]
    InvalidPattern { message: String },

    #[error("No entry can be renamed")]
    NothingToRename { rejected: Vec<String> },

    #[error("Every rename in the batch failed")]
    RenameFailed { failures: Vec<String> },

    #[error("History file error: {message}")]
    HistoryError { path: Option<PathBuf>, message: String },

    #[error("History entry {index} is stale")]
    StaleHistory { index: usize, problems: Vec<String> },

    #[error("{message}")]
    IndexOutOfBounds { message: String },

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            AppError::DirectoryNotFound { .. } => ExitCode::DirectoryNotFound,
            AppError::NotADirectory { .. } => ExitCode::DirectoryNotFound,
            AppError::PermissionDenied { .. } => ExitCode::PermissionError,
            AppError::InvalidArguments(_) => ExitCode::InvalidArguments,
            AppError::NoMatch => ExitCode::NoMatch,
            AppError::InvalidPattern { .. } => ExitCode::InvalidPattern,
            AppError::NothingToRename { .. } => ExitCode::RenameError,
            AppError::RenameFailed { .. } => ExitCode::RenameError,
            AppError::HistoryError { .. } => ExitCode::HistoryError,
            AppError::StaleHistory { .. } => ExitCode::StaleHistory,
            AppError::IndexOutOfBounds { .. } => ExitCode::IndexOutOfBounds,
            AppError::Other(_) => ExitCode::GeneralError,
        }
    }

    pub fn detailed_message(&self) -> String {
        match self {
            AppError::DirectoryNotFound { path } => {
                format!(
                    "The specified directory does not exist:\n  {}\n\n\
                     Please verify the path and try again.",
                    path.display()
                )
            }

            AppError::NotADirectory { path } => {
                format!(
                    "The specified path is not a directory:\n  {}\n\n\
                     Please provide a valid directory path.",
                    path.display()
                )
            }

            AppError::PermissionDenied { path } => {
                format!(
                    "Permission denied when accessing:\n  {}\n\n\
                     Please check file permissions or run with appropriate privileges.",
                    path.display()
                )
            }

            AppError::InvalidArguments(message) => {
                format!("{}\n\nRun with --help for usage.", message)
            }

            AppError::NoMatch => String::from(
                "No filenames contain this pattern.\n\n\
                 Nothing was renamed. Check the pattern, or run `list` to see\n\
                 the selected names.",
            ),

            AppError::InvalidPattern { message } => {
                let mut msg = format!("Invalid pattern: {}\n\n", message);
                msg.push_str("Patterns may use:\n");
                msg.push_str("  #begin     start of the name\n");
                msg.push_str("  #end       end of the name, before the extension\n");
                msg.push_str("  #ext       the extension\n");
                msg.push_str("  #index N   character position N\n");
                msg.push_str("  ?          any digit\n");
                msg.push_str("  *          zero or one character\n");
                msg
            }

            AppError::NothingToRename { rejected } => {
                let mut msg = String::from("No entry can be renamed:\n");
                for line in rejected.iter().take(10) {
                    msg.push_str(&format!("  - {}\n", line));
                }
                if rejected.len() > 10 {
                    msg.push_str(&format!("  ... and {} more\n", rejected.len() - 10));
                }
                msg
            }

            AppError::RenameFailed { failures } => {
                let mut msg = String::from("Every rename in the batch failed:\n");
                for line in failures.iter().take(10) {
                    msg.push_str(&format!("  - {}\n", line));
                }
                msg.push_str("\nCheck file permissions and ensure no files are open.");
                msg
            }

            AppError::HistoryError { path, message } => {
                let path_info = path
                    .as_ref()
                    .map(|p| format!("File: {}\n", p.display()))
                    .unwrap_or_default();

                format!(
                    "History file error:\n  {}\n{}\n\
                     Check that the history file location is writable.",
                    message, path_info
                )
            }

            AppError::StaleHistory { index, problems } => {
                let mut msg = format!("History entry {} no longer matches the disk:\n", index);
                for problem in problems {
                    msg.push_str(&format!("  - {}\n", problem));
                }
                msg.push_str("\nThe entry was kept. Nothing was renamed.");
                msg
            }

            AppError::IndexOutOfBounds { message } => message.clone(),

            AppError::Other(message) => message.clone(),
        }
    }
}

impl From<ScannerError> for AppError {
    fn from(err: ScannerError) -> Self {
        match err {
            ScannerError::PathNotFound(path) => AppError::DirectoryNotFound { path },
            ScannerError::NotADirectory(path) => AppError::NotADirectory { path },
            ScannerError::PermissionDenied(path) => AppError::PermissionDenied { path },
            ScannerError::IoError(e) => AppError::Other(format!("I/O error: {}", e)),
        }
    }
}

impl From<PatternError> for AppError {
    fn from(err: PatternError) -> Self {
        AppError::InvalidPattern {
            message: err.to_string(),
        }
    }
}

impl From<RenameError> for AppError {
    fn from(err: RenameError) -> Self {
        match err {
            RenameError::Pattern(e) => e.into(),
            RenameError::NoMatch => AppError::NoMatch,
        }
    }
}

impl From<HistoryError> for AppError {
    fn from(err: HistoryError) -> Self {
        let path = match &err {
            HistoryError::WriteError { path, .. } | HistoryError::ReadError { path, .. } => Some(path.clone()),
        };
        AppError::HistoryError {
            path,
            message: err.to_string(),
        }
    }
}

impl From<UndoError> for AppError {
    fn from(err: UndoError) -> Self {
        match err {
            UndoError::IndexOutOfBounds { .. } => AppError::IndexOutOfBounds {
                message: err.to_string(),
            },
            UndoError::StaleHistory { index, problems } => AppError::StaleHistory { index, problems },
        }
    }
}

impl From<SelectionError> for AppError {
    fn from(err: SelectionError) -> Self {
        match err {
            SelectionError::InvalidIndexList(_) => AppError::InvalidArguments(err.to_string()),
            SelectionError::IndexOutOfBounds { .. } | SelectionError::RangeOutOfBounds { .. } => {
                AppError::IndexOutOfBounds {
                    message: err.to_string(),
                }
            }
            SelectionError::EmptyResult | SelectionError::NothingRemoved => AppError::Other(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let err = AppError::DirectoryNotFound {
            path: PathBuf::from("/test"),
        };
        assert_eq!(err.exit_code(), ExitCode::DirectoryNotFound);

        assert_eq!(AppError::NoMatch.exit_code(), ExitCode::NoMatch);

        let err = AppError::PermissionDenied {
            path: PathBuf::from("/test"),
        };
        assert_eq!(err.exit_code(), ExitCode::PermissionError);
    }

    #[test]
    fn test_detailed_message_includes_context() {
        let err = AppError::StaleHistory {
            index: 2,
            problems: vec!["'/m/x.txt' not found".to_string()],
        };

        let msg = err.detailed_message();
        assert!(msg.contains("History entry 2"));
        assert!(msg.contains("/m/x.txt"));
        assert!(msg.contains("kept"));
    }

    #[test]
    fn test_scanner_error_conversion() {
        let scanner_err = ScannerError::PathNotFound(PathBuf::from("/missing"));
        let app_err: AppError = scanner_err.into();
        assert_eq!(app_err.exit_code(), ExitCode::DirectoryNotFound);
    }

    #[test]
    fn test_rename_error_conversion() {
        let app_err: AppError = RenameError::Pattern(PatternError::IndexParseFailed("#index x".to_string())).into();
        assert_eq!(app_err.exit_code(), ExitCode::InvalidPattern);
        assert!(app_err.detailed_message().contains("#index N"));

        let app_err: AppError = RenameError::NoMatch.into();
        assert_eq!(app_err.exit_code(), ExitCode::NoMatch);
    }

    #[test]
    fn test_undo_error_conversion() {
        let app_err: AppError = UndoError::IndexOutOfBounds { index: 4, len: 1 }.into();
        assert_eq!(app_err.exit_code(), ExitCode::IndexOutOfBounds);
        assert!(app_err.to_string().contains("History entry 4"));
    }

    #[test]
    fn test_selection_error_conversion() {
        let app_err: AppError = SelectionError::InvalidIndexList("x".to_string()).into();
        assert_eq!(app_err.exit_code(), ExitCode::InvalidArguments);
    }
}
