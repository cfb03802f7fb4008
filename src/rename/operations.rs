//! Batch planners. Each one turns the current selection into a
//! [`RenamePlan`] without touching the filesystem.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info, trace};

use super::composer::{compose, splice, ComposeContext};
use super::conflict::{check_conflicts, Candidate, PathProbe};
use super::locator::{locate_in, BoundaryMode, LocateError, Subject};
use super::types::{OperationKind, RenamePlan, Rejection, SkipReason};
use crate::pattern::{replace_all_ignore_case, split_extension, Keyword, Matcher, Pattern, PatternError, TextMatch};
use crate::scanner::FilenameEntry;

// Episode code such as S01E02, in any letter case
static EPISODE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[Ss][0-9]{2}[Ee][0-9]{2}").unwrap());

const RESOLUTIONS: [&str; 4] = ["360p", "480p", "720p", "1080p"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenameError {
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] PatternError),

    #[error("No filenames contain this pattern")]
    NoMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMode {
    Lower,
    Capitalize,
}

/// Replace one pattern in every selected name that contains it.
pub fn plan_replace(
    entries: &[FilenameEntry],
    pattern: &str,
    replacement: &str,
    probe: &impl PathProbe,
) -> Result<RenamePlan, RenameError> {
    let pattern = Pattern::parse(pattern)?;
    debug!(pattern = %pattern, kind = ?pattern.kind(), "Planning replace");

    let matched: Vec<(&FilenameEntry, Subject)> = entries
        .iter()
        .filter_map(|entry| {
            let subject = Subject::for_entry(entry);
            matches_single(&pattern, &subject, entry.is_dir).then_some((entry, subject))
        })
        .collect();

    if matched.is_empty() {
        return Err(RenameError::NoMatch);
    }

    let use_digits = pattern.captures_digits() && replacement.contains('?');
    let total = matched.len();
    let mut candidates = Vec::with_capacity(total);

    for (i, (entry, subject)) in matched.iter().enumerate() {
        let found = match &pattern {
            Pattern::Text(matcher) => matcher.find_first(subject.chars()),
            Pattern::Keyword(_) => None,
        };
        let extension = subject.extension();
        let digits = found.as_ref().filter(|_| use_digits).map(|f| f.digits.as_slice());
        let text = compose(
            replacement,
            &ComposeContext {
                extension: &extension,
                ordinal: i + 1,
                total,
                digits,
            },
        );

        let new_name = apply_single(&pattern, subject, found.as_ref(), &text);
        trace!(from = %entry.name(), to = %new_name, "Candidate");
        candidates.push(Candidate::new(Some(entry.id), entry.path.clone(), entry.sibling(&new_name)));
    }

    Ok(finish(OperationKind::Replace, total, candidates, Vec::new(), probe))
}

fn matches_single(pattern: &Pattern, subject: &Subject, is_dir: bool) -> bool {
    match pattern {
        Pattern::Keyword(Keyword::Begin) | Pattern::Keyword(Keyword::End) => true,
        Pattern::Keyword(Keyword::Ext) => !is_dir && subject.has_extension(),
        Pattern::Keyword(Keyword::Index(index)) => *index <= subject.len(),
        Pattern::Text(matcher) => matcher.find_first(subject.chars()).is_some(),
    }
}

fn apply_single(pattern: &Pattern, subject: &Subject, found: Option<&TextMatch>, text: &str) -> String {
    let name = subject.text();
    let stem_len = subject.stem_len();

    match pattern {
        Pattern::Keyword(Keyword::Begin) => splice(&name, 0, 0, text),
        Pattern::Keyword(Keyword::End) => splice(&name, stem_len, stem_len, text),
        Pattern::Keyword(Keyword::Ext) => splice(&name, stem_len, subject.len(), text),
        Pattern::Keyword(Keyword::Index(index)) => splice(&name, *index, *index, text),
        Pattern::Text(_) => match found {
            // Every occurrence of the text the wildcards resolved to
            Some(m) => {
                let concrete: String = subject.chars()[m.start..m.end].iter().collect();
                replace_all_ignore_case(&name, &concrete, text)
            }
            None => name,
        },
    }
}

/// Replace what lies between two patterns.
///
/// An empty left pattern means `#begin`, an empty right one `#end`.
pub fn plan_between(
    entries: &[FilenameEntry],
    left: &str,
    right: &str,
    replacement: &str,
    mode: BoundaryMode,
    probe: &impl PathProbe,
) -> Result<RenamePlan, RenameError> {
    let left = if left.is_empty() {
        Pattern::Keyword(Keyword::Begin)
    } else {
        Pattern::parse(left)?
    };
    let right = if right.is_empty() {
        Pattern::Keyword(Keyword::End)
    } else {
        Pattern::parse(right)?
    };
    let kind = match mode {
        BoundaryMode::Exclude => OperationKind::Between,
        BoundaryMode::Include => OperationKind::BetweenInclusive,
    };
    debug!(left = %left, right = %right, ?mode, "Planning between");

    let mut located = Vec::new();
    let mut rejections = Vec::new();

    for entry in entries {
        let subject = Subject::for_entry(entry);
        match locate_in(&subject, &left, &right, mode) {
            Ok(span) => located.push((entry, subject, span)),
            Err(LocateError::NoMatch) => {}
            Err(LocateError::DegenerateSpan) => {
                rejections.push(Rejection::new(Some(entry.id), entry.name(), SkipReason::DegenerateSpan));
            }
            Err(LocateError::IndexOutOfBounds { index, len }) => {
                rejections.push(Rejection::new(
                    Some(entry.id),
                    entry.name(),
                    SkipReason::IndexOutOfBounds { index, len },
                ));
            }
        }
    }

    if located.is_empty() && rejections.is_empty() {
        return Err(RenameError::NoMatch);
    }

    let use_digits = (left.captures_digits() || right.captures_digits()) && replacement.contains('?');
    let total = located.len();
    let mut candidates = Vec::with_capacity(total);

    for (i, (entry, subject, span)) in located.iter().enumerate() {
        let extension = subject.extension();
        let text = compose(
            replacement,
            &ComposeContext {
                extension: &extension,
                ordinal: i + 1,
                total,
                digits: use_digits.then_some(span.digits.as_slice()),
            },
        );
        let new_name = splice(&subject.text(), span.start, span.end, &text);
        candidates.push(Candidate::new(Some(entry.id), entry.path.clone(), entry.sibling(&new_name)));
    }

    Ok(finish(kind, total, candidates, rejections, probe))
}

/// Periods to spaces, keeping a leading dot and the extension.
pub fn plan_dots(entries: &[FilenameEntry], probe: &impl PathProbe) -> Result<RenamePlan, RenameError> {
    let candidates: Vec<Candidate> = entries
        .iter()
        .filter_map(|entry| {
            dots_to_spaces(&entry.name(), entry.is_dir)
                .map(|new_name| Candidate::new(Some(entry.id), entry.path.clone(), entry.sibling(&new_name)))
        })
        .collect();

    if candidates.is_empty() {
        return Err(RenameError::NoMatch);
    }

    Ok(finish(OperationKind::Dots, candidates.len(), candidates, Vec::new(), probe))
}

pub fn plan_case(entries: &[FilenameEntry], mode: CaseMode, probe: &impl PathProbe) -> Result<RenamePlan, RenameError> {
    let kind = match mode {
        CaseMode::Lower => OperationKind::Lowercase,
        CaseMode::Capitalize => OperationKind::Capitalize,
    };

    let candidates: Vec<Candidate> = entries
        .iter()
        .filter_map(|entry| {
            let name = entry.name();
            let new_name = match mode {
                CaseMode::Lower => name.to_lowercase(),
                CaseMode::Capitalize => capitalize_words(&name),
            };
            (new_name != name)
                .then(|| Candidate::new(Some(entry.id), entry.path.clone(), entry.sibling(&new_name)))
        })
        .collect();

    if candidates.is_empty() {
        return Err(RenameError::NoMatch);
    }

    Ok(finish(kind, candidates.len(), candidates, Vec::new(), probe))
}

/// Normalize episode names: `show.name.S01E02.720p.web.mkv` becomes
/// `Show Name s01e02 [720p].mkv`.
pub fn plan_series(entries: &[FilenameEntry], probe: &impl PathProbe) -> Result<RenamePlan, RenameError> {
    let mut candidates = Vec::new();
    let mut rejections = Vec::new();
    let mut matched = 0;

    for entry in entries {
        let original = entry.name();
        let Some(new_name) = series_name(&original, entry.is_dir) else {
            trace!(name = %original, "No episode code");
            continue;
        };
        matched += 1;

        if new_name == original {
            rejections.push(Rejection::new(Some(entry.id), original, SkipReason::AlreadyNamed));
            continue;
        }
        candidates.push(Candidate::new(Some(entry.id), entry.path.clone(), entry.sibling(&new_name)));
    }

    if matched == 0 {
        return Err(RenameError::NoMatch);
    }

    Ok(finish(OperationKind::Series, matched, candidates, rejections, probe))
}

fn series_name(original: &str, is_dir: bool) -> Option<String> {
    let spaced = dots_to_spaces(original, is_dir).unwrap_or_else(|| original.to_string());
    let mut name = capitalize_words(&spaced);

    let code = EPISODE_REGEX.find(&name)?;
    let range = code.range();
    let normalized = format!("s{}e{}", &code.as_str()[1..3], &code.as_str()[4..6]);
    name.replace_range(range, &normalized);

    let folded = name.to_lowercase();
    let tag = RESOLUTIONS
        .iter()
        .find(|res| folded.contains(**res))
        .map(|res| format!(" [{}]", res))
        .unwrap_or_default();

    let subject = if is_dir {
        Subject::directory(&name)
    } else {
        Subject::file(&name)
    };
    let left = Pattern::Text(Matcher::compile(&normalized));
    let right = Pattern::Keyword(Keyword::End);

    // Nothing after the episode code leaves the name as it is
    if let Ok(span) = locate_in(&subject, &left, &right, BoundaryMode::Exclude) {
        name = splice(&name, span.start, span.end, &tag);
    }

    Some(name)
}

/// Give the selected files' stems to the entries of another directory,
/// pairing them in order. Each renamed entry keeps its own extension.
pub fn plan_subtitles(
    entries: &[FilenameEntry],
    subtitles: &[FilenameEntry],
    probe: &impl PathProbe,
) -> Result<RenamePlan, RenameError> {
    let candidates: Vec<Candidate> = entries
        .iter()
        .filter(|entry| !entry.is_dir)
        .zip(subtitles.iter().filter(|sub| !sub.is_dir))
        .map(|(video, sub)| {
            let (stem, _) = video.stem_and_extension();
            let (_, ext) = sub.stem_and_extension();
            Candidate::new(None, sub.path.clone(), sub.sibling(&format!("{}{}", stem, ext)))
        })
        .collect();

    if candidates.is_empty() {
        return Err(RenameError::NoMatch);
    }

    Ok(finish(OperationKind::Subtitles, candidates.len(), candidates, Vec::new(), probe))
}

fn finish(
    kind: OperationKind,
    matched: usize,
    candidates: Vec<Candidate>,
    mut rejections: Vec<Rejection>,
    probe: &impl PathProbe,
) -> RenamePlan {
    let (batch, conflicts) = check_conflicts(candidates, probe);
    rejections.extend(conflicts);

    info!(
        operation = kind.description(),
        matched,
        accepted = batch.len(),
        rejected = rejections.len(),
        "Batch planned"
    );

    RenamePlan {
        kind,
        batch,
        rejections,
        matched,
    }
}

/// Replace periods in the stem with spaces. `None` when there are none.
pub fn dots_to_spaces(name: &str, is_dir: bool) -> Option<String> {
    let (prefix, rest) = match name.strip_prefix('.') {
        Some(rest) => (".", rest),
        None => ("", name),
    };
    let (stem, ext) = if is_dir { (rest, "") } else { split_extension(rest) };

    if !stem.contains('.') {
        return None;
    }

    Some(format!("{}{}{}", prefix, stem.replace('.', " "), ext))
}

/// Uppercase the first character and every lowercase character after a space.
pub fn capitalize_words(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut previous: Option<char> = None;

    for c in name.chars() {
        let word_start = matches!(previous, None | Some(' '));
        if word_start && c.is_lowercase() {
            result.extend(c.to_uppercase());
        } else {
            result.push(c);
        }
        previous = Some(c);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::EntryId;
    use std::path::{Path, PathBuf};

    fn nothing_exists(_: &Path) -> bool {
        false
    }

    fn files(names: &[&str]) -> Vec<FilenameEntry> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| FilenameEntry::new(EntryId(i as u32), PathBuf::from("/media").join(name), false))
            .collect()
    }

    fn targets(plan: &RenamePlan) -> Vec<String> {
        plan.batch
            .operations()
            .iter()
            .map(|op| op.destination_name.clone())
            .collect()
    }

    #[test]
    fn test_replace_with_sequence() {
        let entries = files(&["clip01.mp4", "clip02.mp4"]);
        let plan = plan_replace(&entries, "clip??", "scene_#^", &nothing_exists).unwrap();
        assert_eq!(targets(&plan), vec!["scene_1.mp4", "scene_2.mp4"]);
        assert_eq!(plan.matched, 2);
    }

    #[test]
    fn test_replace_literal_keeps_remaining_text() {
        let entries = files(&["clip01.mp4", "clip02.mp4", "other.txt"]);
        let plan = plan_replace(&entries, "clip", "scene_#^", &nothing_exists).unwrap();
        assert_eq!(targets(&plan), vec!["scene_101.mp4", "scene_202.mp4"]);
    }

    #[test]
    fn test_replace_sequence_width_for_twelve() {
        let names: Vec<String> = (1..=12).map(|i| format!("img{}.png", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let plan = plan_replace(&files(&refs), "img", "photo#^_", &nothing_exists).unwrap();
        let out = targets(&plan);
        assert_eq!(out[0], "photo01_1.png");
        assert_eq!(out[11], "photo12_12.png");
    }

    #[test]
    fn test_replace_every_occurrence_case_insensitive() {
        let plan = plan_replace(&files(&["Foo_foo.txt"]), "FOO", "bar", &nothing_exists).unwrap();
        assert_eq!(targets(&plan), vec!["bar_bar.txt"]);
    }

    #[test]
    fn test_replace_digits_from_pattern() {
        let plan = plan_replace(&files(&["Show S01E07.mkv"]), "S??E??", "?x?", &nothing_exists).unwrap();
        assert_eq!(targets(&plan), vec!["Show 0x1.mkv"]);
    }

    #[test]
    fn test_replace_keywords() {
        let entries = files(&["clip.mp4"]);
        let begin = plan_replace(&entries, "#begin", "new_", &nothing_exists).unwrap();
        assert_eq!(targets(&begin), vec!["new_clip.mp4"]);

        let end = plan_replace(&entries, "#end", "_hd", &nothing_exists).unwrap();
        assert_eq!(targets(&end), vec!["clip_hd.mp4"]);

        let ext = plan_replace(&entries, "#ext", ".mkv", &nothing_exists).unwrap();
        assert_eq!(targets(&ext), vec!["clip.mkv"]);

        let index = plan_replace(&entries, "#index 2", "-", &nothing_exists).unwrap();
        assert_eq!(targets(&index), vec!["cl-ip.mp4"]);
    }

    #[test]
    fn test_replace_ext_skips_directories() {
        let entries = vec![
            FilenameEntry::new(EntryId(0), PathBuf::from("/media/folder.d"), true),
            FilenameEntry::new(EntryId(1), PathBuf::from("/media/noext"), false),
        ];
        assert_eq!(
            plan_replace(&entries, "#ext", ".txt", &nothing_exists).unwrap_err(),
            RenameError::NoMatch
        );
    }

    #[test]
    fn test_replace_no_match() {
        assert_eq!(
            plan_replace(&files(&["a.txt"]), "zzz", "y", &nothing_exists).unwrap_err(),
            RenameError::NoMatch
        );
    }

    #[test]
    fn test_replace_invalid_index() {
        assert!(matches!(
            plan_replace(&files(&["a.txt"]), "#index x", "y", &nothing_exists),
            Err(RenameError::Pattern(PatternError::IndexParseFailed(_)))
        ));
    }

    #[test]
    fn test_two_files_to_same_name() {
        let plan = plan_replace(&files(&["a1.txt", "a2.txt"]), "a?", "out", &nothing_exists).unwrap();
        assert_eq!(targets(&plan), vec!["out.txt"]);
        assert_eq!(plan.rejections.len(), 1);
        assert_eq!(plan.rejections[0].name, "a2.txt");
    }

    #[test]
    fn test_between_to_end() {
        let plan = plan_between(
            &files(&["show_ep05_final.mkv"]),
            "ep",
            "#end",
            "",
            BoundaryMode::Exclude,
            &nothing_exists,
        )
        .unwrap();
        assert_eq!(targets(&plan), vec!["show_ep.mkv"]);
        assert_eq!(plan.kind, OperationKind::Between);
    }

    #[test]
    fn test_between_empty_patterns_default_to_stem() {
        let plan = plan_between(&files(&["old.txt"]), "", "", "new", BoundaryMode::Exclude, &nothing_exists).unwrap();
        assert_eq!(targets(&plan), vec!["new.txt"]);
    }

    #[test]
    fn test_between_inclusive_with_sequence() {
        let entries = files(&["a [x] b.txt", "c [y] d.txt", "plain.txt"]);
        let plan = plan_between(&entries, "[", "]", "#^", BoundaryMode::Include, &nothing_exists).unwrap();
        assert_eq!(targets(&plan), vec!["a 1 b.txt", "c 2 d.txt"]);
        assert_eq!(plan.kind, OperationKind::BetweenInclusive);
    }

    #[test]
    fn test_between_digits_injected() {
        let plan = plan_between(
            &files(&["ep12 - part3.mkv"]),
            "ep??",
            "part?",
            "_?_",
            BoundaryMode::Include,
            &nothing_exists,
        )
        .unwrap();
        assert_eq!(targets(&plan), vec!["_1_.mkv"]);
    }

    #[test]
    fn test_between_reports_out_of_bounds_index() {
        let entries = files(&["ab.txt", "abcdefgh.txt"]);
        let plan = plan_between(&entries, "#index 5", "#index 7", "", BoundaryMode::Exclude, &nothing_exists).unwrap();

        assert_eq!(targets(&plan), vec!["abcdeh.txt"]);
        assert_eq!(plan.rejections.len(), 1);
        assert_eq!(plan.rejections[0].name, "ab.txt");
        assert_eq!(plan.rejections[0].reason, SkipReason::IndexOutOfBounds { index: 7, len: 6 });
    }

    #[test]
    fn test_between_reports_degenerate_span() {
        let entries = files(&["xaby.txt", "xa1b.txt"]);
        let plan = plan_between(&entries, "a", "b", "", BoundaryMode::Exclude, &nothing_exists).unwrap();

        assert_eq!(targets(&plan), vec!["xab.txt"]);
        assert_eq!(plan.rejections[0].name, "xaby.txt");
        assert_eq!(plan.rejections[0].reason, SkipReason::DegenerateSpan);
    }

    #[test]
    fn test_between_no_match() {
        assert_eq!(
            plan_between(&files(&["a.txt"]), "x", "y", "", BoundaryMode::Exclude, &nothing_exists).unwrap_err(),
            RenameError::NoMatch
        );
    }

    #[test]
    fn test_dots() {
        let plan = plan_dots(&files(&["Show.S01E02.mkv", "plain.txt", ".hidden.file.txt"]), &nothing_exists).unwrap();
        assert_eq!(targets(&plan), vec!["Show S01E02.mkv", ".hidden file.txt"]);
    }

    #[test]
    fn test_dots_to_spaces_directory_has_no_extension() {
        assert_eq!(dots_to_spaces("my.folder", true).as_deref(), Some("my folder"));
        assert_eq!(dots_to_spaces("my.folder", false), None);
        assert_eq!(dots_to_spaces(".bashrc", false), None);
    }

    #[test]
    fn test_case_modes() {
        let entries = files(&["My File.TXT", "the quick fox.mp3"]);
        let lower = plan_case(&entries, CaseMode::Lower, &nothing_exists).unwrap();
        assert_eq!(targets(&lower), vec!["my file.txt"]);

        let cap = plan_case(&entries, CaseMode::Capitalize, &nothing_exists).unwrap();
        assert_eq!(targets(&cap), vec!["The Quick Fox.mp3"]);
    }

    #[test]
    fn test_capitalize_words() {
        assert_eq!(capitalize_words("hello big world"), "Hello Big World");
        assert_eq!(capitalize_words("already Fine"), "Already Fine");
        assert_eq!(capitalize_words("x-ray vision"), "X-ray Vision");
    }

    #[test]
    fn test_series() {
        let entries = files(&[
            "show.name.S01E02.720p.web.mkv",
            "Show Name s01e03.mkv",
            "notes.txt",
        ]);
        let plan = plan_series(&entries, &nothing_exists).unwrap();

        assert_eq!(targets(&plan), vec!["Show Name s01e02 [720p].mkv"]);
        assert_eq!(plan.matched, 2);
        assert_eq!(plan.rejections.len(), 1);
        assert_eq!(plan.rejections[0].reason, SkipReason::AlreadyNamed);
    }

    #[test]
    fn test_series_drops_trailing_text_without_resolution() {
        assert_eq!(
            series_name("the.show.s02e10.extended.cut.mkv", false).as_deref(),
            Some("The Show s02e10.mkv")
        );
        assert_eq!(series_name("no episode.mkv", false), None);
    }

    #[test]
    fn test_series_resolution_ignores_case() {
        assert_eq!(
            series_name("Show.S01E02.1080P.WEB.mkv", false).as_deref(),
            Some("Show s01e02 [1080p].mkv")
        );
    }

    #[test]
    fn test_subtitles_take_video_stems() {
        let videos = files(&["Episode 1.mkv", "Episode 2.mkv"]);
        let subs = vec![
            FilenameEntry::new(EntryId(0), PathBuf::from("/subs/a.srt"), false),
            FilenameEntry::new(EntryId(1), PathBuf::from("/subs/b.ass"), false),
            FilenameEntry::new(EntryId(2), PathBuf::from("/subs/c.srt"), false),
        ];

        let plan = plan_subtitles(&videos, &subs, &nothing_exists).unwrap();

        assert_eq!(targets(&plan), vec!["Episode 1.srt", "Episode 2.ass"]);
        assert_eq!(plan.batch.operations()[0].source_path, PathBuf::from("/subs/a.srt"));
    }
}
