//! Boundary computation for "between" operations.
//!
//! The left pattern is searched from the start of the name and the right
//! pattern from the end, so `between "." and "."` selects everything from
//! the first dot to the last one. Whichever bound ends up first in the name
//! leads the span, independent of which side it was given on.

use thiserror::Error;
use tracing::trace;

use crate::pattern::{split_extension, Keyword, Pattern};
use crate::scanner::FilenameEntry;

/// Whether the bounding patterns belong to the replaced span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryMode {
    /// Replace what lies between the patterns
    Exclude,
    /// Replace the patterns too
    Include,
}

impl BoundaryMode {
    pub fn from_include(include: bool) -> Self {
        if include {
            BoundaryMode::Include
        } else {
            BoundaryMode::Exclude
        }
    }
}

/// A filename prepared for matching: characters plus the stem length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    chars: Vec<char>,
    stem_len: usize,
}

impl Subject {
    /// A file name: the extension starts at the last dot (not a leading one)
    pub fn file(name: &str) -> Self {
        let (stem, _) = split_extension(name);
        Self {
            chars: name.chars().collect(),
            stem_len: stem.chars().count(),
        }
    }

    /// A directory name has no extension
    pub fn directory(name: &str) -> Self {
        let chars: Vec<char> = name.chars().collect();
        let stem_len = chars.len();
        Self { chars, stem_len }
    }

    pub fn for_entry(entry: &FilenameEntry) -> Self {
        let name = entry.name();
        if entry.is_dir {
            Self::directory(&name)
        } else {
            Self::file(&name)
        }
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn stem_len(&self) -> usize {
        self.stem_len
    }

    pub fn has_extension(&self) -> bool {
        self.stem_len < self.chars.len()
    }

    pub fn extension(&self) -> String {
        self.chars[self.stem_len..].iter().collect()
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }
}

/// Where one pattern sits in a filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
    /// Marks a position rather than text (`#begin`, `#end`, `#index`)
    pub zero_width: bool,
}

impl MatchSpan {
    fn position(at: usize) -> Self {
        Self {
            start: at,
            end: at,
            zero_width: true,
        }
    }

    fn range(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            zero_width: false,
        }
    }

    pub fn width(&self) -> usize {
        self.end - self.start
    }

    /// `at` lies strictly inside this span's text
    fn strictly_contains(&self, at: usize) -> bool {
        self.start < at && at < self.end
    }
}

/// A pattern resolved against a filename, with the digits its `?` matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub span: MatchSpan,
    pub digits: Vec<char>,
}

/// The `[start, end)` range selected for replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub start: usize,
    pub end: usize,
    /// Digits captured by the left pattern followed by the right pattern's
    pub digits: Vec<char>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocateError {
    #[error("pattern not found")]
    NoMatch,

    #[error("nothing between the patterns")]
    DegenerateSpan,

    #[error("index {index} is beyond the name length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFrom {
    Start,
    End,
}

/// Resolve one pattern against a filename.
pub fn resolve_bound(subject: &Subject, pattern: &Pattern, from: SearchFrom) -> Result<Bound, LocateError> {
    let span = match pattern {
        Pattern::Keyword(Keyword::Begin) => MatchSpan::position(0),
        Pattern::Keyword(Keyword::End) => MatchSpan::position(subject.stem_len()),
        Pattern::Keyword(Keyword::Ext) => MatchSpan::range(subject.stem_len(), subject.len()),
        Pattern::Keyword(Keyword::Index(index)) => {
            if *index > subject.len() {
                return Err(LocateError::IndexOutOfBounds {
                    index: *index,
                    len: subject.len(),
                });
            }
            MatchSpan::position(*index)
        }
        Pattern::Text(matcher) => {
            let found = match from {
                SearchFrom::Start => matcher.find_first(subject.chars()),
                SearchFrom::End => matcher.find_last(subject.chars()),
            }
            .ok_or(LocateError::NoMatch)?;

            return Ok(Bound {
                span: MatchSpan::range(found.start, found.end),
                digits: found.digits,
            });
        }
    };

    Ok(Bound {
        span,
        digits: Vec::new(),
    })
}

/// Compute the span between `left` and `right` in a file name.
pub fn locate(name: &str, left: &Pattern, right: &Pattern, mode: BoundaryMode) -> Result<Located, LocateError> {
    locate_in(&Subject::file(name), left, right, mode)
}

pub fn locate_in(
    subject: &Subject,
    left: &Pattern,
    right: &Pattern,
    mode: BoundaryMode,
) -> Result<Located, LocateError> {
    let left_bound = resolve_bound(subject, left, SearchFrom::Start)?;
    let right_bound = resolve_bound(subject, right, SearchFrom::End)?;
    let (l, r) = (&left_bound.span, &right_bound.span);

    trace!(
        left = %left,
        right = %right,
        left_at = l.start,
        right_at = r.start,
        "Resolved bounds"
    );

    // Same start, including two identical #index positions
    if l.start == r.start {
        return Err(LocateError::DegenerateSpan);
    }

    // A position keyword may not split the other pattern's text
    if (l.zero_width && r.strictly_contains(l.start)) || (r.zero_width && l.strictly_contains(r.start)) {
        return Err(LocateError::DegenerateSpan);
    }

    let (lead, trail) = if l.start < r.start { (l, r) } else { (r, l) };

    let (start, end) = match mode {
        BoundaryMode::Exclude => (lead.end, trail.start),
        BoundaryMode::Include => (lead.start, trail.end.max(lead.end)),
    };

    if start >= end {
        return Err(LocateError::DegenerateSpan);
    }

    let mut digits = left_bound.digits;
    digits.extend(right_bound.digits);

    Ok(Located { start, end, digits })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(raw: &str) -> Pattern {
        Pattern::parse(raw).unwrap()
    }

    fn excised(name: &str, located: &Located) -> String {
        name.chars().skip(located.start).take(located.end - located.start).collect()
    }

    #[test]
    fn test_literal_to_end_exclusive() {
        let name = "show_ep05_final.mkv";
        let located = locate(name, &p("ep"), &p("#end"), BoundaryMode::Exclude).unwrap();
        assert_eq!(excised(name, &located), "05_final");
    }

    #[test]
    fn test_literal_pair_inclusive() {
        let name = "a[tag]b.txt";
        let located = locate(name, &p("["), &p("]"), BoundaryMode::Include).unwrap();
        assert_eq!(excised(name, &located), "[tag]");
        let located = locate(name, &p("["), &p("]"), BoundaryMode::Exclude).unwrap();
        assert_eq!(excised(name, &located), "tag");
    }

    #[test]
    fn test_first_left_last_right() {
        let name = "a.b.c.txt";
        let located = locate(name, &p("."), &p("."), BoundaryMode::Exclude).unwrap();
        assert_eq!(excised(name, &located), "b.c");
    }

    #[test]
    fn test_swapped_order_gives_same_span() {
        let name = "intro [720p] (x264).mkv";
        for mode in [BoundaryMode::Exclude, BoundaryMode::Include] {
            let forward = locate(name, &p("["), &p(")"), mode).unwrap();
            let backward = locate(name, &p(")"), &p("["), mode).unwrap();
            assert_eq!((forward.start, forward.end), (backward.start, backward.end));
        }
    }

    #[test]
    fn test_begin_to_end_is_the_stem() {
        let name = "Show.S01E02.mkv";
        let located = locate(name, &p("#begin"), &p("#end"), BoundaryMode::Exclude).unwrap();
        assert_eq!(excised(name, &located), "Show.S01E02");
        let located = locate(name, &p("#begin"), &p("#end"), BoundaryMode::Include).unwrap();
        assert_eq!(excised(name, &located), "Show.S01E02");
    }

    #[test]
    fn test_ext_bound_width() {
        let name = "clip.mp4";
        let located = locate(name, &p("#begin"), &p("#ext"), BoundaryMode::Include).unwrap();
        assert_eq!(excised(name, &located), "clip.mp4");
        let located = locate(name, &p("#ext"), &p("#begin"), BoundaryMode::Exclude).unwrap();
        assert_eq!(excised(name, &located), "clip");
    }

    #[test]
    fn test_index_positions() {
        let name = "abcdef.txt";
        let located = locate(name, &p("#index 1"), &p("#index 4"), BoundaryMode::Exclude).unwrap();
        assert_eq!(excised(name, &located), "bcd");
        let swapped = locate(name, &p("#index 4"), &p("#index 1"), BoundaryMode::Include).unwrap();
        assert_eq!(excised(name, &swapped), "bcd");
    }

    #[test]
    fn test_identical_index_is_degenerate() {
        assert_eq!(
            locate("abcdef", &p("#index 2"), &p("#index 2"), BoundaryMode::Exclude),
            Err(LocateError::DegenerateSpan)
        );
    }

    #[test]
    fn test_index_out_of_bounds() {
        assert_eq!(
            locate("abc", &p("#index 9"), &p("#end"), BoundaryMode::Exclude),
            Err(LocateError::IndexOutOfBounds { index: 9, len: 3 })
        );
        assert!(locate("abc", &p("#index 3"), &p("#begin"), BoundaryMode::Exclude).is_ok());
    }

    #[test]
    fn test_index_inside_text_is_degenerate() {
        assert_eq!(
            locate("xxabcxx", &p("abc"), &p("#index 3"), BoundaryMode::Include),
            Err(LocateError::DegenerateSpan)
        );
    }

    #[test]
    fn test_index_with_literal_in_either_order() {
        let name = "abc_def";
        let located = locate(name, &p("#index 0"), &p("_"), BoundaryMode::Exclude).unwrap();
        assert_eq!(excised(name, &located), "abc");
        let located = locate(name, &p("_"), &p("#index 0"), BoundaryMode::Exclude).unwrap();
        assert_eq!(excised(name, &located), "abc");
    }

    #[test]
    fn test_adjacent_patterns_are_degenerate_when_excluded() {
        assert_eq!(
            locate("xaby", &p("a"), &p("b"), BoundaryMode::Exclude),
            Err(LocateError::DegenerateSpan)
        );
        let located = locate("xaby", &p("a"), &p("b"), BoundaryMode::Include).unwrap();
        assert_eq!((located.start, located.end), (1, 3));
    }

    #[test]
    fn test_missing_pattern_is_no_match() {
        assert_eq!(
            locate("abc.txt", &p("zz"), &p("#end"), BoundaryMode::Exclude),
            Err(LocateError::NoMatch)
        );
        assert_eq!(
            locate("abc.txt", &p("#begin"), &p("zz"), BoundaryMode::Exclude),
            Err(LocateError::NoMatch)
        );
    }

    #[test]
    fn test_same_start_is_degenerate() {
        assert_eq!(
            locate("abc.txt", &p("#begin"), &p("a"), BoundaryMode::Include),
            Err(LocateError::DegenerateSpan)
        );
    }

    #[test]
    fn test_wildcards_capture_digits_left_then_right() {
        let name = "ep12 - part3.mkv";
        let located = locate(name, &p("ep??"), &p("part?"), BoundaryMode::Exclude).unwrap();
        assert_eq!(excised(name, &located), " - ");
        assert_eq!(located.digits, vec!['1', '2', '3']);
    }

    #[test]
    fn test_case_insensitive_bounds() {
        let name = "Movie.PART1.avi";
        let located = locate(name, &p("movie"), &p("part1"), BoundaryMode::Exclude).unwrap();
        assert_eq!(excised(name, &located), ".");
    }

    #[test]
    fn test_directory_subject_has_no_extension() {
        let subject = Subject::directory("season.one");
        let located = locate_in(&subject, &p("."), &p("#end"), BoundaryMode::Exclude).unwrap();
        assert_eq!((located.start, located.end), (7, 10));
    }

    #[test]
    fn test_exclude_never_contains_markers_include_always_does() {
        let cases = [
            ("alpha-[beta]-gamma.txt", "[", "]"),
            ("one_two_three", "one", "three"),
            ("x(1)y(2)z", "(", ")"),
            ("track 07 - title.flac", "track ", " - "),
        ];

        for (name, left, right) in cases {
            let excluded = locate(name, &p(left), &p(right), BoundaryMode::Exclude).unwrap();
            let kept: String = name
                .chars()
                .take(excluded.start)
                .chain(name.chars().skip(excluded.end))
                .collect();
            assert!(kept.contains(left) && kept.contains(right), "{}", name);

            let included = locate(name, &p(left), &p(right), BoundaryMode::Include).unwrap();
            let cut = excised(name, &included);
            assert!(cut.starts_with(left) && cut.ends_with(right), "{}", name);
        }
    }
}
