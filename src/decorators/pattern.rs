use regex::{Captures, Regex};

use super::filter::{FilterCursor, Predicate};
use crate::cursor::{Cursor, CursorError};
use crate::value::{Array, Key, Value};

/// What a regex filter does with the subject of each position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RegexMode {
    /// Accept when the pattern matches; values pass through unchanged.
    #[default]
    Match,
    /// Accept when the pattern matches; the value becomes the capture groups.
    GetMatch,
    /// Always accept; the value becomes every match, grouped per capture group.
    AllMatches,
    /// Accept when splitting yields more than one piece; the value becomes the pieces.
    Split,
    /// Accept when the pattern matches; the subject is rewritten with the replacement.
    Replace(String),
}

/// Regex filter flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegexFlags {
    /// Match against the key rather than the value.
    pub use_key: bool,
    /// Invert the accept decision.
    pub invert_match: bool,
}

impl RegexFlags {
    /// Match against keys.
    pub fn with_use_key(mut self, use_key: bool) -> Self {
        self.use_key = use_key;
        self
    }

    /// Invert the accept decision.
    pub fn with_invert_match(mut self, invert_match: bool) -> Self {
        self.invert_match = invert_match;
        self
    }
}

/// Predicate testing values or keys against a compiled pattern.
///
/// Container subjects are never matched. They are rejected, unless the
/// predicate accepts containers (the recursive variant), in which case
/// non-empty containers pass so descent can happen.
#[derive(Debug, Clone)]
pub struct RegexPredicate {
    regex: Regex,
    mode: RegexMode,
    flags: RegexFlags,
    accept_containers: bool,
    projected_current: Option<Value>,
    projected_key: Option<Value>,
}

impl RegexPredicate {
    /// Compile `pattern`. An invalid pattern is a construction failure.
    pub fn new(pattern: &str, mode: RegexMode) -> Result<Self, CursorError> {
        Ok(Self::from_regex(Regex::new(pattern)?, mode))
    }

    /// Use an already compiled pattern.
    pub fn from_regex(regex: Regex, mode: RegexMode) -> Self {
        Self {
            regex,
            mode,
            flags: RegexFlags::default(),
            accept_containers: false,
            projected_current: None,
            projected_key: None,
        }
    }

    /// Replace the flags.
    pub fn with_flags(mut self, flags: RegexFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Accept non-empty container subjects instead of rejecting them.
    pub fn with_accept_containers(mut self, accept: bool) -> Self {
        self.accept_containers = accept;
        self
    }

    /// Compiled pattern.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Current mode.
    pub fn mode(&self) -> &RegexMode {
        &self.mode
    }

    /// Switch mode; takes effect at the next accept.
    pub fn set_mode(&mut self, mode: RegexMode) {
        self.mode = mode;
    }

    /// Current flags.
    pub fn flags(&self) -> RegexFlags {
        self.flags
    }

    /// Replace the flags; takes effect at the next accept.
    pub fn set_flags(&mut self, flags: RegexFlags) {
        self.flags = flags;
    }

    fn evaluate(&mut self, text: &str) -> bool {
        match &self.mode {
            RegexMode::Match => self.regex.is_match(text),
            RegexMode::GetMatch => match self.regex.captures(text) {
                Some(captures) => {
                    self.projected_current = Some(Value::Array(self.group_row(&captures)));
                    true
                }
                None => false,
            },
            RegexMode::AllMatches => {
                self.projected_current = Some(Value::Array(self.pattern_order(text)));
                true
            }
            RegexMode::Split => {
                let pieces: Array = self
                    .regex
                    .split(text)
                    .map(Value::from)
                    .collect();
                let accepted = pieces.len() > 1;
                self.projected_current = Some(Value::Array(pieces));
                accepted
            }
            RegexMode::Replace(replacement) => {
                if !self.regex.is_match(text) {
                    return false;
                }
                let replaced =
                    Value::from(self.regex.replace_all(text, replacement.as_str()).into_owned());
                if self.flags.use_key {
                    self.projected_key = Some(replaced);
                } else {
                    self.projected_current = Some(replaced);
                }
                true
            }
        }
    }

    /// Numbered groups up to the last one that participated, unmatched
    /// groups in between as empty strings. Named groups precede their number.
    fn group_row(&self, captures: &Captures<'_>) -> Array {
        let last = (0..captures.len())
            .rev()
            .find(|&i| captures.get(i).is_some())
            .unwrap_or(0);
        let mut row = Array::new();
        for (index, name) in self.regex.capture_names().enumerate().take(last + 1) {
            let text = captures.get(index).map_or("", |m| m.as_str());
            if let Some(name) = name {
                row.set(Key::from(name), Value::from(text));
            }
            row.set(Key::Int(index as i64), Value::from(text));
        }
        row
    }

    /// One list per capture group, each holding that group's text in every match.
    fn pattern_order(&self, text: &str) -> Array {
        let all: Vec<Captures<'_>> = self.regex.captures_iter(text).collect();
        let mut grouped = Array::new();
        for (index, name) in self.regex.capture_names().enumerate() {
            let column: Array = all
                .iter()
                .map(|captures| Value::from(captures.get(index).map_or("", |m| m.as_str())))
                .collect();
            if let Some(name) = name {
                grouped.set(Key::from(name), Value::Array(column.clone()));
            }
            grouped.set(Key::Int(index as i64), Value::Array(column));
        }
        grouped
    }
}

impl Predicate for RegexPredicate {
    fn accept(&mut self, inner: &dyn Cursor) -> Result<bool, CursorError> {
        self.projected_current = None;
        self.projected_key = None;

        let subject = if self.flags.use_key {
            inner.key()?
        } else {
            inner.current()?
        };
        if let Some(container) = subject.as_container() {
            return Ok(self.accept_containers && !container.is_empty());
        }

        let accepted = self.evaluate(&subject.to_string());
        Ok(accepted != self.flags.invert_match)
    }

    fn projected_current(&self) -> Option<&Value> {
        self.projected_current.as_ref()
    }

    fn projected_key(&self) -> Option<&Value> {
        self.projected_key.as_ref()
    }
}

/// Filter driven by a regular expression.
pub type RegexFilterCursor<C> = FilterCursor<C, RegexPredicate>;

impl<C: Cursor> FilterCursor<C, RegexPredicate> {
    /// Filter `inner` through `pattern`.
    pub fn regex(
        inner: C,
        pattern: &str,
        mode: RegexMode,
        flags: RegexFlags,
    ) -> Result<Self, CursorError> {
        Ok(Self::new(inner, RegexPredicate::new(pattern, mode)?.with_flags(flags)))
    }
}
