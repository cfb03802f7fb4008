use std::fmt;

use thiserror::Error;

use super::matcher::Matcher;

/// Positional keywords understood in patterns and replacements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// Position 0 of the filename
    Begin,
    /// Position where the extension starts (stem length)
    End,
    /// The extension text itself
    Ext,
    /// A literal character offset
    Index(usize),
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keyword::Begin => write!(f, "#begin"),
            Keyword::End => write!(f, "#end"),
            Keyword::Ext => write!(f, "#ext"),
            Keyword::Index(n) => write!(f, "#index {}", n),
        }
    }
}

impl Keyword {
    /// Recognize a replacement keyword. Only `#begin`, `#end` and `#ext`
    /// have a meaning on the replacement side.
    pub fn from_replacement(raw: &str) -> Option<Keyword> {
        match raw.to_lowercase().as_str() {
            "#begin" => Some(Keyword::Begin),
            "#end" => Some(Keyword::End),
            "#ext" => Some(Keyword::Ext),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Keyword,
    Literal,
    Wildcard,
}

/// A resolved search pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Keyword(Keyword),
    /// Literal text or text with `?`/`*` wildcards
    Text(Matcher),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("Pattern is empty")]
    Empty,

    #[error("Cannot read an index number from \"{0}\" (expected #index <N>)")]
    IndexParseFailed(String),
}

impl Pattern {
    /// Classify a raw pattern string.
    ///
    /// Keywords are recognized case-insensitively in priority order
    /// `#begin`, `#end`, `#ext`, `#index N`. Anything else is compiled into
    /// a [`Matcher`] where `?` is a capturable digit and `*` is zero or one
    /// arbitrary character. A pattern starting with `#index` that has no
    /// valid number is an error rather than a literal.
    pub fn parse(raw: &str) -> Result<Pattern, PatternError> {
        let folded = raw.to_lowercase();

        match folded.as_str() {
            "#begin" => return Ok(Pattern::Keyword(Keyword::Begin)),
            "#end" => return Ok(Pattern::Keyword(Keyword::End)),
            "#ext" => return Ok(Pattern::Keyword(Keyword::Ext)),
            _ => {}
        }

        if let Some(rest) = folded.strip_prefix("#index") {
            let index = rest
                .trim()
                .parse::<usize>()
                .map_err(|_| PatternError::IndexParseFailed(raw.to_string()))?;
            return Ok(Pattern::Keyword(Keyword::Index(index)));
        }

        if raw.is_empty() {
            return Err(PatternError::Empty);
        }

        Ok(Pattern::Text(Matcher::compile(raw)))
    }

    pub fn kind(&self) -> PatternKind {
        match self {
            Pattern::Keyword(_) => PatternKind::Keyword,
            Pattern::Text(m) if m.has_wildcards() => PatternKind::Wildcard,
            Pattern::Text(_) => PatternKind::Literal,
        }
    }

    pub fn keyword(&self) -> Option<Keyword> {
        match self {
            Pattern::Keyword(k) => Some(*k),
            Pattern::Text(_) => None,
        }
    }

    /// Whether the pattern can capture digits for `?` in a replacement
    pub fn captures_digits(&self) -> bool {
        match self {
            Pattern::Keyword(_) => false,
            Pattern::Text(m) => m.has_digit_capture(),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Keyword(k) => k.fmt(f),
            Pattern::Text(m) => f.write_str(m.raw()),
        }
    }
}
