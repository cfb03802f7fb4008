use crate::pattern::Keyword;

/// Token expanded into the entry's ordinal within the matched set
pub const SEQUENCE_TOKEN: &str = "#^";

/// Per-entry inputs for building replacement text
#[derive(Debug, Clone, Copy)]
pub struct ComposeContext<'a> {
    /// Extension of the entry being renamed, with its dot
    pub extension: &'a str,
    /// 1-based position of the entry within the matched set
    pub ordinal: usize,
    /// Size of the matched set
    pub total: usize,
    /// Digits captured by the search patterns, when they had `?`
    pub digits: Option<&'a [char]>,
}

/// Build the replacement text for one entry.
///
/// A replacement that is exactly `#begin` or `#end` means "nothing", and
/// `#ext` means the entry's extension. Otherwise `#^` becomes the
/// zero-padded ordinal and each `?` takes the next captured digit.
pub fn compose(replacement: &str, ctx: &ComposeContext<'_>) -> String {
    match Keyword::from_replacement(replacement) {
        Some(Keyword::Begin) | Some(Keyword::End) => return String::new(),
        Some(Keyword::Ext) => return ctx.extension.to_string(),
        _ => {}
    }

    let text = expand_sequence(replacement, ctx.ordinal, ctx.total);
    match ctx.digits {
        Some(digits) => substitute_digits(&text, digits),
        None => text,
    }
}

/// Replace every `#^` with `ordinal`, zero-padded to the digit count of `total`.
pub fn expand_sequence(replacement: &str, ordinal: usize, total: usize) -> String {
    if !replacement.contains(SEQUENCE_TOKEN) {
        return replacement.to_string();
    }
    let width = total.max(1).to_string().len();
    let number = format!("{:0width$}", ordinal, width = width);
    replacement.replace(SEQUENCE_TOKEN, &number)
}

/// Fill `?` placeholders left to right with captured digits, starting over
/// from the first digit when the replacement needs more than were captured.
/// With nothing captured the placeholders stay as they are.
pub fn substitute_digits(replacement: &str, digits: &[char]) -> String {
    if digits.is_empty() {
        return replacement.to_string();
    }

    let mut cycle = digits.iter().cycle();
    replacement
        .chars()
        .map(|c| match c {
            '?' => cycle.next().copied().unwrap_or(c),
            other => other,
        })
        .collect()
}

/// Replace the characters `[start, end)` of `name` with `text`.
pub fn splice(name: &str, start: usize, end: usize, text: &str) -> String {
    let mut result: String = name.chars().take(start).collect();
    result.push_str(text);
    result.extend(name.chars().skip(end));
    result
}
