//! Sequence cursors
//!
//! Leaf cursors over a container. Construction computes a key snapshot:
//! integer keys ascending by value, then string keys ascending lexically.
//! The position is an index into that snapshot, never into the container.
//! Every write through `set`/`unset`/`append` recomputes the snapshot, so a
//! held position may afterwards refer to a different key.

use crate::cursor::{Cursor, CursorError, RecursiveCursor};
use crate::value::{Array, Key, Value};

fn snapshot(storage: &Array) -> Vec<Key> {
    let mut keys: Vec<Key> = storage.keys().cloned().collect();
    keys.sort();
    keys
}

/// Cursor over a snapshot of a container's keys.
#[derive(Debug, Clone)]
pub struct SequenceCursor {
    storage: Array,
    keys: Vec<Key>,
    position: usize,
}

impl SequenceCursor {
    /// Create a cursor over `storage`.
    pub fn new(storage: Array) -> Self {
        let keys = snapshot(&storage);
        Self {
            storage,
            keys,
            position: 0,
        }
    }

    /// Create a cursor over an array value or an object's attributes.
    pub fn from_value(value: Value) -> Result<Self, CursorError> {
        match value {
            Value::Array(array) => Ok(Self::new(array)),
            Value::Object(object) => Ok(Self::new(object.properties)),
            other => Err(CursorError::construction(
                "SequenceCursor",
                format!("expected an array or object, got {other:?}"),
            )),
        }
    }

    /// Backing container.
    pub fn storage(&self) -> &Array {
        &self.storage
    }

    /// Consume the cursor and return the backing container.
    pub fn into_storage(self) -> Array {
        self.storage
    }

    /// Current index into the key snapshot.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the container is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Read an entry by key.
    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.storage.get(key)
    }

    /// Whether `key` exists in the container.
    pub fn contains_key(&self, key: &Key) -> bool {
        self.storage.contains_key(key)
    }

    /// Write through to the container and recompute the key snapshot.
    pub fn set(&mut self, key: Key, value: Value) {
        self.storage.set(key, value);
        self.keys = snapshot(&self.storage);
    }

    /// Remove an entry and recompute the key snapshot.
    pub fn unset(&mut self, key: &Key) -> Option<Value> {
        let removed = self.storage.unset(key);
        self.keys = snapshot(&self.storage);
        removed
    }

    /// Append under the next integer key and recompute the key snapshot.
    pub fn append(&mut self, value: Value) -> Key {
        let key = self.storage.push(value);
        self.keys = snapshot(&self.storage);
        key
    }

    /// Jump to an index in the key snapshot.
    pub fn seek(&mut self, position: i64) -> Result<(), CursorError> {
        match usize::try_from(position) {
            Ok(index) if index < self.keys.len() => {
                self.position = index;
                Ok(())
            }
            _ => Err(CursorError::bounds(
                position,
                format!("sequence holds {} entries", self.keys.len()),
            )),
        }
    }

    fn current_key(&self) -> Option<&Key> {
        self.keys.get(self.position)
    }

    fn current_value(&self) -> Option<&Value> {
        self.current_key().and_then(|key| self.storage.get(key))
    }
}

impl Cursor for SequenceCursor {
    fn rewind(&mut self) -> Result<(), CursorError> {
        self.position = 0;
        Ok(())
    }

    fn valid(&self) -> bool {
        self.position < self.keys.len()
    }

    fn current(&self) -> Result<Value, CursorError> {
        Ok(self.current_value().cloned().unwrap_or_default())
    }

    fn key(&self) -> Result<Value, CursorError> {
        Ok(self.current_key().map(Key::to_value).unwrap_or_default())
    }

    fn next(&mut self) -> Result<(), CursorError> {
        self.position = self.position.saturating_add(1);
        Ok(())
    }
}

/// Sequence cursor that treats nested containers as children.
#[derive(Debug, Clone)]
pub struct RecursiveSequenceCursor {
    sequence: SequenceCursor,
    child_arrays_only: bool,
}

impl RecursiveSequenceCursor {
    /// Create a recursive cursor over `storage`.
    pub fn new(storage: Array) -> Self {
        Self {
            sequence: SequenceCursor::new(storage),
            child_arrays_only: false,
        }
    }

    /// Create a recursive cursor over an array value or an object's attributes.
    pub fn from_value(value: Value) -> Result<Self, CursorError> {
        Ok(Self {
            sequence: SequenceCursor::from_value(value)?,
            child_arrays_only: false,
        })
    }

    /// When set, objects are leaves and only arrays have children.
    pub fn with_child_arrays_only(mut self, enabled: bool) -> Self {
        self.child_arrays_only = enabled;
        self
    }

    /// Underlying flat cursor.
    pub fn sequence(&self) -> &SequenceCursor {
        &self.sequence
    }

    /// Mutable access to the underlying flat cursor.
    pub fn sequence_mut(&mut self) -> &mut SequenceCursor {
        &mut self.sequence
    }
}

impl Cursor for RecursiveSequenceCursor {
    fn rewind(&mut self) -> Result<(), CursorError> {
        self.sequence.rewind()
    }

    fn valid(&self) -> bool {
        self.sequence.valid()
    }

    fn current(&self) -> Result<Value, CursorError> {
        self.sequence.current()
    }

    fn key(&self) -> Result<Value, CursorError> {
        self.sequence.key()
    }

    fn next(&mut self) -> Result<(), CursorError> {
        self.sequence.next()
    }

    fn as_recursive(&self) -> Option<&dyn RecursiveCursor> {
        Some(self)
    }

    fn as_recursive_mut(&mut self) -> Option<&mut dyn RecursiveCursor> {
        Some(self)
    }
}

impl RecursiveCursor for RecursiveSequenceCursor {
    fn has_children(&self) -> bool {
        match self.sequence.current_value() {
            Some(Value::Array(_)) => true,
            Some(Value::Object(_)) => !self.child_arrays_only,
            _ => false,
        }
    }

    fn get_children(&mut self) -> Result<Box<dyn RecursiveCursor>, CursorError> {
        if !self.has_children() {
            return Err(CursorError::dispatch(
                self.type_name(),
                "getChildren",
                "current element is not a container",
            ));
        }
        // Containers clone shallowly; the child shares the parent's storage.
        let value = self.sequence.current_value().cloned().unwrap_or_default();
        let children = Self::from_value(value)?.with_child_arrays_only(self.child_arrays_only);
        Ok(Box::new(children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::CursorExt;
    use crate::value::Object;

    fn keyed(pairs: &[(&str, i64)]) -> Array {
        pairs
            .iter()
            .map(|(k, v)| (Key::from(*k), Value::Int(*v)))
            .collect()
    }

    #[test]
    fn test_string_keys_sorted_lexically() {
        let mut cursor = SequenceCursor::new(keyed(&[("b", 2), ("a", 1)]));
        assert_eq!(
            cursor.keys().expect("keys"),
            vec![Value::from("a"), Value::from("b")]
        );
    }

    #[test]
    fn test_int_keys_precede_string_keys() {
        let mut array = Array::new();
        array.set(Key::from("z"), Value::from("zed"));
        array.set(Key::Int(3), Value::from("three"));
        array.set(Key::from("a"), Value::from("ay"));
        array.set(Key::Int(-1), Value::from("minus"));
        let mut cursor = SequenceCursor::new(array);
        assert_eq!(
            cursor.keys().expect("keys"),
            vec![Value::Int(-1), Value::Int(3), Value::from("a"), Value::from("z")]
        );
    }

    #[test]
    fn test_invalid_cursor_reads_null() {
        let mut cursor = SequenceCursor::new(Array::new());
        cursor.rewind().expect("rewind");
        assert!(!cursor.valid());
        assert_eq!(cursor.current().expect("current"), Value::Null);
        assert_eq!(cursor.key().expect("key"), Value::Null);
    }

    #[test]
    fn test_unset_recomputes_snapshot_under_stale_position() {
        let mut cursor = SequenceCursor::new(keyed(&[("a", 1), ("b", 2), ("c", 3)]));
        cursor.rewind().expect("rewind");
        cursor.next().expect("next");
        assert_eq!(cursor.current().expect("current"), Value::Int(2));

        cursor.unset(&Key::from("a"));
        // Position 1 now points at "c".
        assert_eq!(cursor.key().expect("key"), Value::from("c"));
        assert_eq!(cursor.current().expect("current"), Value::Int(3));
    }

    #[test]
    fn test_set_inserts_into_sorted_snapshot() {
        let mut cursor = SequenceCursor::new(keyed(&[("b", 2)]));
        cursor.rewind().expect("rewind");
        cursor.set(Key::from("a"), Value::Int(1));
        assert_eq!(cursor.key().expect("key"), Value::from("a"));
        assert_eq!(cursor.len(), 2);
    }

    #[test]
    fn test_seek_bounds() {
        let mut cursor = SequenceCursor::new(keyed(&[("a", 1), ("b", 2)]));
        cursor.seek(1).expect("in range");
        assert_eq!(cursor.current().expect("current"), Value::Int(2));
        assert!(matches!(cursor.seek(2), Err(CursorError::Bounds { .. })));
        assert!(matches!(cursor.seek(-1), Err(CursorError::Bounds { .. })));
    }

    #[test]
    fn test_object_attributes_become_container() {
        let object = Object::new("Point", keyed(&[("y", 2), ("x", 1)]));
        let mut cursor = SequenceCursor::from_value(Value::Object(object)).expect("object");
        assert_eq!(cursor.values().expect("values"), vec![Value::Int(1), Value::Int(2)]);
        assert!(SequenceCursor::from_value(Value::Int(3))
            .expect_err("scalar")
            .is_construction());
    }

    #[test]
    fn test_recursive_children() {
        let mut root = Array::new();
        root.push(Value::from(vec!["x", "y"]));
        root.push(Value::from("leaf"));
        let mut cursor = RecursiveSequenceCursor::new(root);
        cursor.rewind().expect("rewind");
        assert!(cursor.has_children());
        let mut children = cursor.get_children().expect("children");
        assert_eq!(
            children.values().expect("values"),
            vec![Value::from("x"), Value::from("y")]
        );

        cursor.next().expect("next");
        assert!(!cursor.has_children());
        assert!(cursor.get_children().err().expect("leaf").is_dispatch());
    }

    #[test]
    fn test_child_arrays_only_treats_objects_as_leaves() {
        let mut root = Array::new();
        root.push(Value::Object(Object::new("Thing", keyed(&[("a", 1)]))));
        let mut cursor = RecursiveSequenceCursor::new(root.clone());
        cursor.rewind().expect("rewind");
        assert!(cursor.has_children());

        let mut arrays_only = RecursiveSequenceCursor::new(root).with_child_arrays_only(true);
        arrays_only.rewind().expect("rewind");
        assert!(!arrays_only.has_children());
    }

    #[test]
    fn test_long_pass_reads_by_index() {
        let mut cursor = SequenceCursor::new((0..200_000).map(Value::Int).collect());
        assert_eq!(cursor.count_entries().expect("count"), 200_000);
        cursor.seek(199_999).expect("last");
        assert_eq!(cursor.current().expect("current"), Value::Int(199_999));
    }

    #[test]
    fn test_descent_shares_nested_storage() {
        let nested: Array = (0..3).map(Value::Int).collect();
        let mut root = Array::new();
        root.push(Value::Array(nested.clone()));
        let mut cursor = RecursiveSequenceCursor::new(root);
        cursor.rewind().expect("rewind");

        let current = cursor.current().expect("current");
        assert!(current.as_array().is_some_and(|array| array.ptr_eq(&nested)));
        let mut children = cursor.get_children().expect("children");
        assert_eq!(children.count_entries().expect("count"), 3);
    }
}
