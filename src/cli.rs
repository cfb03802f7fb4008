use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "patren")]
#[command(author, version, about, long_about = None)]
#[command(about = "Batch-rename files with positional keywords, wildcards and sequence counters")]
pub struct Args {
    /// Working directory (repeat for several)
    #[arg(short = 'd', long = "dir", value_name = "DIR", default_value = ".", global = true)]
    pub dirs: Vec<PathBuf>,

    /// Preview changes without renaming anything
    #[arg(long, global = true)]
    pub dry: bool,

    /// Skip the confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// History journal location
    #[arg(long, value_name = "FILE", global = true)]
    pub history_file: Option<PathBuf>,

    /// Print previews and history as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Also work in every subdirectory of the listed directories
    #[arg(long, global = true)]
    pub add_subdirs: bool,

    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Narrowing applied to the listing before the operation runs
#[derive(ClapArgs, Debug, Default)]
pub struct SelectionArgs {
    /// Keep only these ids (e.g. 0,3-5)
    #[arg(long, value_name = "LIST", global = true)]
    pub only: Option<String>,

    /// Leave out these ids (e.g. 0,3-5)
    #[arg(long, value_name = "LIST", global = true)]
    pub skip: Option<String>,

    /// Keep names containing this pattern
    #[arg(long, value_name = "PATTERN", global = true, allow_hyphen_values = true)]
    pub find: Option<String>,

    /// Leave out names containing this pattern
    #[arg(long, value_name = "PATTERN", global = true, allow_hyphen_values = true)]
    pub exclude: Option<String>,

    /// Only files
    #[arg(long, global = true, conflicts_with = "dirs_only")]
    pub files_only: bool,

    /// Only directories
    #[arg(long, global = true)]
    pub dirs_only: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the selected entries with their ids
    List {
        /// Write the directories and names to FILE instead
        #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "RenameFileList.txt")]
        save: Option<PathBuf>,
        /// Text written after each name in the saved listing
        #[arg(long, default_value = "\n", hide_default_value = true)]
        separator: String,
    },

    /// Replace a pattern in every selected name
    Replace {
        /// Text, wildcard pattern or keyword (#begin, #end, #ext, "#index N")
        #[arg(allow_hyphen_values = true)]
        pattern: String,
        /// New text; #^ is the sequence number, ? a captured digit
        #[arg(allow_hyphen_values = true)]
        replacement: String,
    },

    /// Replace the text between two patterns
    Between {
        /// Left pattern; empty means #begin
        #[arg(allow_hyphen_values = true)]
        left: String,
        /// Right pattern; empty means #end
        #[arg(allow_hyphen_values = true)]
        right: String,
        #[arg(allow_hyphen_values = true)]
        replacement: String,
        /// Replace the patterns themselves too
        #[arg(short, long)]
        include: bool,
    },

    /// Turn periods into spaces, keeping the extension
    Dots,

    /// Lowercase whole names
    Lower,

    /// Capitalize the first letter of each word
    Cap,

    /// Normalize episode names such as show.name.S01E02.720p.mkv
    Series,

    /// Give the entries of DIR the names of the selected files
    Subs {
        /// Directory holding the subtitle files
        dir: PathBuf,
    },

    /// Show or manage the rename history
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },

    /// Undo a batch from the history
    Undo {
        /// History entry, 0 is the most recent
        #[arg(default_value_t = 0)]
        index: usize,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    /// Erase every entry
    Clear,
    /// Turn recording on or off
    Toggle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_between_with_empty_left() {
        let args = Args::parse_from(["patren", "-d", "/m", "between", "", "-", "x", "--include"]);

        assert_eq!(args.dirs, vec![PathBuf::from("/m")]);
        match args.command {
            Command::Between {
                left,
                right,
                replacement,
                include,
            } => {
                assert_eq!(left, "");
                assert_eq!(right, "-");
                assert_eq!(replacement, "x");
                assert!(include);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::parse_from(["patren", "undo", "2", "--dry", "--history-file", "/tmp/h.txt"]);

        assert!(args.dry);
        assert_eq!(args.history_file, Some(PathBuf::from("/tmp/h.txt")));
        assert!(matches!(args.command, Command::Undo { index: 2 }));
        assert_eq!(args.dirs, vec![PathBuf::from(".")]);
    }

    #[test]
    fn test_history_actions() {
        let args = Args::parse_from(["patren", "history"]);
        assert!(matches!(args.command, Command::History { action: None }));

        let args = Args::parse_from(["patren", "history", "toggle"]);
        assert!(matches!(
            args.command,
            Command::History {
                action: Some(HistoryAction::Toggle)
            }
        ));
    }

    #[test]
    fn test_selection_args() {
        let args = Args::parse_from(["patren", "--only", "0,2-3", "--files-only", "lower"]);
        assert_eq!(args.selection.only.as_deref(), Some("0,2-3"));
        assert!(args.selection.files_only);
        assert!(matches!(args.command, Command::Lower));
    }

    #[test]
    fn test_list_save_defaults() {
        let args = Args::parse_from(["patren", "--add-subdirs", "list", "--save"]);
        assert!(args.add_subdirs);
        match args.command {
            Command::List { save, separator } => {
                assert_eq!(save, Some(PathBuf::from("RenameFileList.txt")));
                assert_eq!(separator, "\n");
            }
            other => panic!("unexpected command {:?}", other),
        }

        let args = Args::parse_from(["patren", "list", "--save", "out.txt", "--separator", ";"]);
        assert!(matches!(
            args.command,
            Command::List { save: Some(ref p), ref separator } if p == &PathBuf::from("out.txt") && separator == ";"
        ));
    }
}
