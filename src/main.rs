use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use patren::cli::{Args, Command, HistoryAction, SelectionArgs};
use patren::config::Config;
use patren::error::AppError;
use patren::history::{load_or_create, write_history};
use patren::logging;
use patren::output::{
    display_execution_result, display_history, display_listing, display_preview, display_undo_preview, write_history_json,
    write_json, write_listing_file,
};
use patren::progress::{should_use_colors, Progress};
use patren::prompt::{AutoConfirm, Confirm, LineConfirm};
use patren::rename::{BoundaryMode, CaseMode, ExecutionReport, RenamePlan};
use patren::scanner::{FileList, FilenameEntry};
use patren::selection::{parse_index_list, SelectionError};
use patren::session::RenameSession;

fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    logging::init(args.verbose);

    if let Err(e) = run(args) {
        error!("{}", e);
        eprintln!("\nError: {}", e.detailed_message());
        std::process::exit(e.exit_code().into());
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let config = Config::from_env().with_history_file(args.history_file.clone());
    debug!(history_file = ?config.history_file, "Configuration loaded");

    let mut progress = Progress::new_with_ui(args.verbose > 0, should_use_colors());
    let mut confirm: Box<dyn Confirm> = if args.yes {
        Box::new(AutoConfirm)
    } else {
        Box::new(LineConfirm::stdin())
    };

    let history = load_or_create(&config.history_file)?;
    let mut session = RenameSession::open(args.dirs.clone(), vec![config.history_file.clone()], history)?;
    if args.add_subdirs {
        let added = session.add_subdirectories()?;
        if added.is_empty() {
            progress.warn("No new directories found.");
        }
        for dir in &added {
            info!(path = ?dir, "Working directory added");
        }
    }
    report_unreadable(session.listing(), &mut progress);
    apply_selection(&mut session, &args.selection, &mut progress)?;

    let mut stdout = io::stdout();

    let history_changed = match &args.command {
        Command::List { save, separator } => {
            let entries = session.selection().entries(session.listing());
            if let Some(path) = save {
                save_listing(path, session.directories(), &entries, separator)?;
                writeln!(stdout, "Listing written to {}", path.display()).map_err(display_error)?;
            } else if args.json {
                write_json(&entries, &mut stdout).map_err(display_error)?;
            } else {
                display_listing(&entries, &mut stdout).map_err(display_error)?;
            }
            false
        }

        Command::History { action: None } => {
            if args.json {
                write_history_json(session.history(), &mut stdout).map_err(display_error)?;
            } else {
                display_history(session.history(), &mut stdout).map_err(display_error)?;
            }
            false
        }

        Command::History {
            action: Some(HistoryAction::Clear),
        } => {
            session.history_mut().clear();
            info!("History cleared");
            writeln!(stdout, "History cleared.").map_err(display_error)?;
            true
        }

        Command::History {
            action: Some(HistoryAction::Toggle),
        } => {
            let recording = session.history_mut().toggle();
            info!(recording, "History recording toggled");
            writeln!(stdout, "History recording is {}.", if recording { "on" } else { "off" })
                .map_err(display_error)?;
            true
        }

        Command::Undo { index } => {
            let plan = session.prepare_undo(*index)?;

            if args.json {
                write_json(&plan, &mut stdout).map_err(display_error)?;
            } else {
                display_undo_preview(&plan, args.dry, &mut stdout).map_err(display_error)?;
            }

            if args.dry {
                false
            } else if !confirm.confirm(plan.operations.len()) {
                progress.cancelled();
                false
            } else {
                let result = session.commit_undo(&plan, &mut progress);
                check_report(&result.report)?;
                if !args.json {
                    display_execution_result(&result.report, &mut stdout).map_err(display_error)?;
                }
                true
            }
        }

        command => {
            let plan = build_plan(&session, command, &mut progress)?;
            run_batch(&mut session, &plan, &args, &config, confirm.as_mut(), &mut progress)?
        }
    };

    // The journal is written once, at the end of a successful run
    if history_changed {
        write_history(session.history(), &config.history_file)?;
        debug!(path = ?config.history_file, "History saved");
    }

    Ok(())
}

fn build_plan(session: &RenameSession, command: &Command, progress: &mut Progress) -> Result<RenamePlan, AppError> {
    let plan = match command {
        Command::Replace { pattern, replacement } => session.plan_replace(pattern, replacement)?,
        Command::Between {
            left,
            right,
            replacement,
            include,
        } => session.plan_between(left, right, replacement, BoundaryMode::from_include(*include))?,
        Command::Dots => session.plan_dots()?,
        Command::Lower => session.plan_case(CaseMode::Lower)?,
        Command::Cap => session.plan_case(CaseMode::Capitalize)?,
        Command::Series => session.plan_series()?,
        Command::Subs { dir } => {
            let subtitles = session.list_subtitles(dir)?;
            report_unreadable(&subtitles, progress);
            session.plan_subtitles(&subtitles)?
        }
        Command::List { .. } | Command::History { .. } | Command::Undo { .. } => {
            return Err(AppError::Other(format!("{:?} does not rename anything", command)));
        }
    };

    Ok(plan)
}

/// Preview, confirm and commit a batch. Returns whether the journal changed.
fn run_batch(
    session: &mut RenameSession,
    plan: &RenamePlan,
    args: &Args,
    config: &Config,
    confirm: &mut dyn Confirm,
    progress: &mut Progress,
) -> Result<bool, AppError> {
    let mut stdout = io::stdout();

    if plan.is_empty() && !plan.rejections.is_empty() {
        return Err(AppError::NothingToRename {
            rejected: plan.rejections.iter().map(|r| r.to_string()).collect(),
        });
    }

    if args.json {
        write_json(plan, &mut stdout).map_err(display_error)?;
    } else {
        display_preview(plan, args.dry, &mut stdout).map_err(display_error)?;
    }

    if plan.is_empty() || args.dry {
        return Ok(false);
    }

    if !confirm.confirm(plan.len()) {
        progress.cancelled();
        return Ok(false);
    }

    let outcome = session.commit(plan, progress);
    check_report(&outcome.report)?;

    if !args.json {
        display_execution_result(&outcome.report, &mut stdout).map_err(display_error)?;
    }
    if outcome.recorded {
        progress.history_recorded(&config.history_file);
    }

    Ok(outcome.recorded)
}

fn check_report(report: &ExecutionReport) -> Result<(), AppError> {
    if report.all_failed() {
        return Err(AppError::RenameFailed {
            failures: report.failed.iter().map(|f| f.to_string()).collect(),
        });
    }
    Ok(())
}

fn apply_selection(
    session: &mut RenameSession,
    selection: &SelectionArgs,
    progress: &mut Progress,
) -> Result<(), AppError> {
    if let Some(list) = &selection.only {
        let ids = parse_index_list(list)?;
        let missing = session.select_only(&ids)?;
        report_missing(&missing, progress);
    }
    if let Some(list) = &selection.skip {
        let ids = parse_index_list(list)?;
        let missing = session.select_skip(&ids)?;
        report_missing(&missing, progress);
    }
    if let Some(pattern) = &selection.find {
        session.select_matching(pattern)?;
    }
    if let Some(pattern) = &selection.exclude {
        session.exclude_matching(pattern)?;
    }
    if selection.files_only {
        session.select_files()?;
    }
    if selection.dirs_only {
        session.select_dirs()?;
    }

    debug!(selected = session.selection().len(), "Selection applied");
    Ok(())
}

fn report_missing(missing: &[SelectionError], progress: &mut Progress) {
    for err in missing {
        progress.warn(&err.to_string());
    }
}

fn report_unreadable(listing: &FileList, progress: &mut Progress) {
    for path in listing.unreadable() {
        progress.warn(&format!(
            "Skipping \"{}\": the name is not valid UTF-8 and cannot be renamed",
            path.display()
        ));
    }
}

fn save_listing(
    path: &Path,
    directories: &[PathBuf],
    entries: &[&FilenameEntry],
    separator: &str,
) -> Result<(), AppError> {
    let write_error = |e: io::Error| AppError::Other(format!("Failed to write {}: {}", path.display(), e));

    let mut writer = BufWriter::new(File::create(path).map_err(write_error)?);
    write_listing_file(directories, entries, separator, &mut writer).map_err(write_error)?;
    writer.flush().map_err(write_error)
}

fn display_error(e: io::Error) -> AppError {
    AppError::Other(format!("Failed to display output: {}", e))
}
