use std::env;
use std::path::PathBuf;

/// Environment variable overriding the journal location
pub const ENV_HISTORY_FILE: &str = "PATREN_HISTORY_FILE";

/// Journal file name inside the data directory
pub const HISTORY_FILENAME: &str = "RenameHistory.txt";

/// Runtime configuration
///
/// Built from the environment (a `.env` file in the working directory is
/// loaded first) and then overlaid with command-line arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub history_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let history_file = env::var_os(ENV_HISTORY_FILE)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_history_path);

        Self { history_file }
    }

    /// Command-line override of the journal location
    pub fn with_history_file(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.history_file = path;
        }
        self
    }
}

/// `<data dir>/patren/RenameHistory.txt`, or the current directory when the
/// platform has no data directory
pub fn default_history_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("patren").join(HISTORY_FILENAME))
        .unwrap_or_else(|| PathBuf::from(HISTORY_FILENAME))
}
