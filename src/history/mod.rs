mod reader;
mod types;
mod writer;

pub use reader::{load_or_create, parse_history, read_history};
pub use types::*;
pub use writer::{format_history, write_history, HistoryError};
