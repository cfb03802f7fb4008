mod matcher;
mod types;

pub use matcher::{Matcher, TextMatch, Token};
pub use types::{Keyword, Pattern, PatternError, PatternKind};

/// Split a filename into `(stem, extension)`, the extension keeping its dot.
///
/// A leading dot does not start an extension (`.bashrc` has none) and a
/// trailing dot is an extension of its own (`notes.` -> `("notes", ".")`).
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(idx) => name.split_at(idx),
    }
}

/// Length in characters, which is the unit of every offset in this crate.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub(crate) fn chars_match(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// First case-insensitive occurrence of `needle` in `haystack` at or after `from`.
pub(crate) fn find_ignore_case(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&start| {
        needle
            .iter()
            .zip(&haystack[start..])
            .all(|(n, h)| chars_match(*n, *h))
    })
}

/// Last case-insensitive occurrence of `needle` in `haystack`.
pub(crate) fn rfind_ignore_case(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).rev().find(|&start| {
        needle
            .iter()
            .zip(&haystack[start..])
            .all(|(n, h)| chars_match(*n, *h))
    })
}

/// Replace every case-insensitive occurrence of `pattern` in `origin`.
///
/// Matching ignores case, the inserted text is used verbatim.
pub fn replace_all_ignore_case(origin: &str, pattern: &str, replacement: &str) -> String {
    let haystack: Vec<char> = origin.chars().collect();
    let needle: Vec<char> = pattern.chars().collect();
    if needle.is_empty() {
        return origin.to_string();
    }

    let mut result = String::with_capacity(origin.len());
    let mut cursor = 0;
    while let Some(pos) = find_ignore_case(&haystack, &needle, cursor) {
        result.extend(&haystack[cursor..pos]);
        result.push_str(replacement);
        cursor = pos + needle.len();
    }
    result.extend(&haystack[cursor..]);
    result
}
