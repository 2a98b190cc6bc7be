//! Dynamic values and ordered containers
//!
//! Minimal realisation of the runtime's boxed value type: scalars, ordered
//! key→value arrays and attribute-bearing objects. Cursors read and yield
//! these values; containers are the storage that sequence cursors snapshot.

mod key;

pub use key::Key;

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Dynamically-typed value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Null-equivalent, also returned by invalid cursors.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// String.
    Str(String),
    /// Ordered key→value container.
    Array(Array),
    /// Object with a class name and attributes.
    Object(Object),
}

impl Value {
    /// Whether the value is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether the value is an array.
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Whether the value is an object.
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Whether the value is a string.
    pub fn is_string(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    /// Borrow the array payload.
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Borrow the string payload.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer payload.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Container view: arrays directly, objects through their attributes.
    pub fn as_container(&self) -> Option<&Array> {
        match self {
            Value::Array(array) => Some(array),
            Value::Object(object) => Some(&object.properties),
            _ => None,
        }
    }

    /// Truthiness in the runtime's sense.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(flag) => *flag,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty() && s != "0",
            Value::Array(array) => !array.is_empty(),
            Value::Object(_) => true,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null | Value::Bool(false) => Ok(()),
            Value::Bool(true) => f.write_str("1"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::Array(_) => f.write_str("Array"),
            Value::Object(_) => f.write_str("Object"),
        }
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Array> for Value {
    fn from(array: Array) -> Self {
        Value::Array(array)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(flag) => Value::Bool(flag),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Array(
                fields
                    .into_iter()
                    .map(|(k, v)| (Key::from(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Insertion-ordered container with unique keys.
///
/// Entries and the key→slot index live behind `Rc` and are copied only on
/// write, so cloning an array (and every nested value holding one) is O(1).
/// Lookups go through the index and are O(1) on average.
#[derive(Clone, Default)]
pub struct Array {
    entries: Rc<Vec<(Key, Value)>>,
    slots: Rc<HashMap<Key, usize>>,
    next_index: i64,
}

impl Array {
    /// Create an empty array.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the array holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a value by key.
    pub fn get(&self, key: &Key) -> Option<&Value> {
        let slot = *self.slots.get(key)?;
        self.entries.get(slot).map(|(_, v)| v)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &Key) -> bool {
        self.slots.contains_key(key)
    }

    /// Insert or overwrite. Overwrites keep the original insertion slot.
    pub fn set(&mut self, key: Key, value: Value) {
        if let Key::Int(n) = key {
            if n >= self.next_index {
                self.next_index = n.saturating_add(1);
            }
        }
        if let Some(&slot) = self.slots.get(&key) {
            Rc::make_mut(&mut self.entries)[slot].1 = value;
            return;
        }
        let entries = Rc::make_mut(&mut self.entries);
        Rc::make_mut(&mut self.slots).insert(key.clone(), entries.len());
        entries.push((key, value));
    }

    /// Append under the next free integer key and return that key.
    pub fn push(&mut self, value: Value) -> Key {
        let key = Key::Int(self.next_index);
        self.set(key.clone(), value);
        key
    }

    /// Remove an entry, returning its value. Later entries shift down one slot.
    pub fn unset(&mut self, key: &Key) -> Option<Value> {
        let slot = Rc::make_mut(&mut self.slots).remove(key)?;
        let entries = Rc::make_mut(&mut self.entries);
        let (_, value) = entries.remove(slot);
        let slots = Rc::make_mut(&mut self.slots);
        for (index, (key, _)) in entries.iter().enumerate().skip(slot) {
            slots.insert(key.clone(), index);
        }
        Some(value)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> + '_ {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> + '_ {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Whether both arrays share the same storage.
    pub fn ptr_eq(&self, other: &Array) -> bool {
        Rc::ptr_eq(&self.entries, &other.entries)
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.next_index == other.next_index && self.entries == other.entries
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut array = Array::new();
        for value in iter {
            array.push(value);
        }
        array
    }
}

impl<K: Into<Key>> FromIterator<(K, Value)> for Array {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut array = Array::new();
        for (key, value) in iter {
            array.set(key.into(), value);
        }
        array
    }
}

/// Object: a class name plus attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    /// Class name, used for diagnostics only.
    pub class: String,
    /// Attribute storage.
    pub properties: Array,
}

impl Object {
    /// Create an object from its attributes.
    pub fn new(class: impl Into<String>, properties: Array) -> Self {
        Self {
            class: class.into(),
            properties,
        }
    }
}

#[cfg(feature = "serde")]
mod serialize {
    use serde::ser::{Serialize, SerializeMap, Serializer};

    use super::{Array, Key, Value};

    impl Serialize for Key {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }

    impl Serialize for Array {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (key, value) in self.iter() {
                map.serialize_entry(key, value)?;
            }
            map.end()
        }
    }

    impl Serialize for Value {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Value::Null => serializer.serialize_unit(),
                Value::Bool(flag) => serializer.serialize_bool(*flag),
                Value::Int(n) => serializer.serialize_i64(*n),
                Value::Float(x) => serializer.serialize_f64(*x),
                Value::Str(s) => serializer.serialize_str(s),
                Value::Array(array) => array.serialize(serializer),
                Value::Object(object) => object.properties.serialize(serializer),
            }
        }
    }
}
