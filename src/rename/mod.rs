mod composer;
mod conflict;
mod executor;
mod locator;
mod operations;
mod types;

pub use composer::{compose, expand_sequence, splice, substitute_digits, ComposeContext, SEQUENCE_TOKEN};
pub use conflict::{check_conflicts, Candidate, DiskProbe, PathProbe};
pub use executor::execute;
pub use locator::{locate, locate_in, resolve_bound, BoundaryMode, Bound, LocateError, Located, MatchSpan, SearchFrom, Subject};
pub use operations::{
    capitalize_words, dots_to_spaces, plan_between, plan_case, plan_dots, plan_replace, plan_series, plan_subtitles,
    CaseMode, RenameError,
};
pub use types::{ExecutionReport, OperationKind, RenameBatch, RenameOperation, RenamePlan, Rejection, SkipReason};
pub(crate) use types::fold_path;
