//! Container keys
//!
//! Keys are either integers or strings. The derived ordering places every
//! integer key before every string key, integers by value and strings
//! lexically. Sequence cursors rely on exactly this order for their key
//! snapshots.

use std::fmt;

use super::Value;

/// Key of an [`Array`](super::Array) entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Integer key.
    Int(i64),
    /// String key.
    Str(String),
}

impl Key {
    /// Normalise a dynamic value into a key.
    ///
    /// Canonical decimal strings ("7", "-3") become integer keys, booleans
    /// become 0/1, floats truncate and null maps to the empty string.
    /// Containers cannot be keys.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Key::Str(String::new())),
            Value::Bool(flag) => Some(Key::Int(i64::from(*flag))),
            Value::Int(n) => Some(Key::Int(*n)),
            Value::Float(f) => Some(Key::Int(f.trunc() as i64)),
            Value::Str(s) => Some(Key::from(s.as_str())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Integer payload, if any.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Key::Int(n) => Some(*n),
            Key::Str(_) => None,
        }
    }

    /// Convert into the value reported by a cursor's `key()`.
    pub fn to_value(&self) -> Value {
        match self {
            Key::Int(n) => Value::Int(*n),
            Key::Str(s) => Value::Str(s.clone()),
        }
    }
}

fn canonical_int(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    if s == "-0" {
        return None;
    }
    s.parse().ok()
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        match canonical_int(s) {
            Some(n) => Key::Int(n),
            None => Key::Str(s.to_string()),
        }
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        match canonical_int(&s) {
            Some(n) => Key::Int(n),
            None => Key::Str(s),
        }
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        match key {
            Key::Int(n) => Value::Int(n),
            Key::Str(s) => Value::Str(s),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(n) => write!(f, "{n}"),
            Key::Str(s) => f.write_str(s),
        }
    }
}
