use super::{chars_match, rfind_ignore_case};

/// One step of the wildcard automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A character matched case-insensitively
    Literal(char),
    /// `?`: any ASCII digit, captured
    Digit,
    /// `*`: zero or one arbitrary character
    OptionalAny,
}

/// A compiled text pattern.
///
/// Every character except `?` and `*` is literal, including characters that
/// would be special to a regex engine (`\ / ^ ] .`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matcher {
    raw: String,
    tokens: Vec<Token>,
}

/// A located occurrence, in character offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch {
    pub start: usize,
    pub end: usize,
    /// Digits matched by `?`, left to right
    pub digits: Vec<char>,
}

impl TextMatch {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

impl Matcher {
    pub fn compile(raw: &str) -> Self {
        let tokens = raw
            .chars()
            .map(|c| match c {
                '?' => Token::Digit,
                '*' => Token::OptionalAny,
                other => Token::Literal(other),
            })
            .collect();

        Self {
            raw: raw.to_string(),
            tokens,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn has_wildcards(&self) -> bool {
        self.tokens.iter().any(|t| !matches!(t, Token::Literal(_)))
    }

    pub fn has_digit_capture(&self) -> bool {
        self.tokens.contains(&Token::Digit)
    }

    /// Leftmost non-empty match. `*` prefers consuming a character.
    pub fn find_first(&self, name: &[char]) -> Option<TextMatch> {
        self.find_from(name, 0)
    }

    /// Last occurrence of the concrete text matched by the final
    /// non-overlapping left-to-right match.
    ///
    /// The wildcards are resolved against the filename first, then the
    /// resulting literal text is searched from the right, so an overlapping
    /// later occurrence of the same text wins.
    pub fn find_last(&self, name: &[char]) -> Option<TextMatch> {
        let mut last = None;
        let mut cursor = 0;
        while let Some(m) = self.find_from(name, cursor) {
            cursor = m.end;
            last = Some(m);
        }

        let last = last?;
        let concrete = &name[last.start..last.end];
        let start = rfind_ignore_case(name, concrete)?;
        Some(TextMatch {
            start,
            end: start + concrete.len(),
            digits: last.digits,
        })
    }

    /// Resolve the wildcards against `name`, returning the concrete text of
    /// the first match.
    pub fn resolve(&self, name: &[char]) -> Option<String> {
        self.find_first(name)
            .map(|m| name[m.start..m.end].iter().collect())
    }

    fn find_from(&self, name: &[char], from: usize) -> Option<TextMatch> {
        if self.tokens.is_empty() {
            return None;
        }

        let mut walk = Walk::new(&self.tokens, name);
        for start in from..=name.len() {
            walk.digits.clear();
            if let Some(end) = walk.run(0, start) {
                if end > start {
                    return Some(TextMatch {
                        start,
                        end,
                        digits: walk.digits,
                    });
                }
            }
        }
        None
    }
}

/// Depth-first walk over the tokens. `*` tries consuming a character
/// before skipping it. Whether the tokens from `t` match at `pos` does not
/// depend on how the walk got there, so each failed `(t, pos)` state is
/// remembered and never explored twice, bounding the work by
/// `tokens * name` per search.
struct Walk<'a> {
    tokens: &'a [Token],
    name: &'a [char],
    failed: Vec<bool>,
    digits: Vec<char>,
}

impl<'a> Walk<'a> {
    fn new(tokens: &'a [Token], name: &'a [char]) -> Self {
        Self {
            tokens,
            name,
            failed: vec![false; tokens.len() * (name.len() + 1)],
            digits: Vec::new(),
        }
    }

    fn run(&mut self, t: usize, pos: usize) -> Option<usize> {
        if t == self.tokens.len() {
            return Some(pos);
        }

        let slot = t * (self.name.len() + 1) + pos;
        if self.failed[slot] {
            return None;
        }

        let end = self.step(t, pos);
        if end.is_none() {
            self.failed[slot] = true;
        }
        end
    }

    fn step(&mut self, t: usize, pos: usize) -> Option<usize> {
        match self.tokens[t] {
            Token::Literal(expected) => {
                let actual = *self.name.get(pos)?;
                if chars_match(expected, actual) {
                    self.run(t + 1, pos + 1)
                } else {
                    None
                }
            }
            Token::Digit => {
                let actual = *self.name.get(pos)?;
                if !actual.is_ascii_digit() {
                    return None;
                }
                let mark = self.digits.len();
                self.digits.push(actual);
                let end = self.run(t + 1, pos + 1);
                if end.is_none() {
                    self.digits.truncate(mark);
                }
                end
            }
            Token::OptionalAny => {
                if pos < self.name.len() {
                    let mark = self.digits.len();
                    if let Some(end) = self.run(t + 1, pos + 1) {
                        return Some(end);
                    }
                    self.digits.truncate(mark);
                }
                self.run(t + 1, pos)
            }
        }
    }
}
