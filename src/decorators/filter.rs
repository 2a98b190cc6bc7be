use std::fmt;
use std::rc::Rc;

use crate::cursor::{Cursor, CursorError};
use crate::dispatch::{Callback, CallbackRegistry};
use crate::value::Value;

/// Acceptance test applied by a [`FilterCursor`] at each inner position.
pub trait Predicate {
    /// Whether the inner cursor's current position is accepted.
    fn accept(&mut self, inner: &dyn Cursor) -> Result<bool, CursorError>;

    /// Replacement for `current()` at the last accepted position.
    fn projected_current(&self) -> Option<&Value> {
        None
    }

    /// Replacement for `key()` at the last accepted position.
    fn projected_key(&self) -> Option<&Value> {
        None
    }
}

impl<F> Predicate for F
where
    F: FnMut(&dyn Cursor) -> Result<bool, CursorError>,
{
    fn accept(&mut self, inner: &dyn Cursor) -> Result<bool, CursorError> {
        self(inner)
    }
}

/// Filter whose acceptance test has not been provided.
///
/// Every call to `accept` fails with [`CursorError::AbstractMethod`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Unimplemented;

impl Predicate for Unimplemented {
    fn accept(&mut self, _inner: &dyn Cursor) -> Result<bool, CursorError> {
        Err(CursorError::AbstractMethod {
            type_name: "FilterCursor",
            method: "accept",
        })
    }
}

/// Accepts positions for which a callback returns `true`.
///
/// The callback sees the current value, or the key when `use_key` is set.
#[derive(Clone)]
pub struct CallbackPredicate {
    callback: Callback,
    use_key: bool,
}

impl CallbackPredicate {
    /// Create a predicate from a closure.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Value) -> Result<bool, CursorError> + 'static,
    {
        Self::from_callback(Rc::new(callback))
    }

    /// Create a predicate from a shared callback.
    pub fn from_callback(callback: Callback) -> Self {
        Self {
            callback,
            use_key: false,
        }
    }

    /// Create a predicate from a callback registered under `name`.
    pub fn from_registry(registry: &CallbackRegistry, name: &str) -> Result<Self, CursorError> {
        registry.resolve(name).map(Self::from_callback)
    }

    /// Test keys instead of values.
    pub fn with_use_key(mut self, use_key: bool) -> Self {
        self.use_key = use_key;
        self
    }
}

impl Predicate for CallbackPredicate {
    fn accept(&mut self, inner: &dyn Cursor) -> Result<bool, CursorError> {
        let subject = if self.use_key {
            inner.key()?
        } else {
            inner.current()?
        };
        (self.callback)(&subject)
    }
}

impl fmt::Debug for CallbackPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackPredicate")
            .field("use_key", &self.use_key)
            .finish_non_exhaustive()
    }
}

/// Accepts only positions that have children.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParentPredicate;

impl Predicate for ParentPredicate {
    fn accept(&mut self, inner: &dyn Cursor) -> Result<bool, CursorError> {
        Ok(inner
            .as_recursive()
            .is_some_and(|recursive| recursive.has_children()))
    }
}

/// Cursor yielding only the inner positions accepted by a predicate.
///
/// After `rewind` and `next` the inner cursor is either invalid or sits on
/// an accepted position, so `valid` simply delegates.
#[derive(Debug, Clone)]
pub struct FilterCursor<C, P> {
    inner: C,
    predicate: P,
}

/// Filter driven by a callback.
pub type CallbackFilterCursor<C> = FilterCursor<C, CallbackPredicate>;

impl<C: Cursor, P: Predicate> FilterCursor<C, P> {
    /// Wrap `inner` with `predicate`.
    pub fn new(inner: C, predicate: P) -> Self {
        Self { inner, predicate }
    }

    /// Evaluate the predicate at the inner cursor's current position.
    pub fn accept(&mut self) -> Result<bool, CursorError> {
        self.predicate.accept(&self.inner)
    }

    /// Wrapped cursor.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Mutable access to the wrapped cursor.
    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    /// Consume the decorator and return the wrapped cursor.
    pub fn into_inner(self) -> C {
        self.inner
    }

    /// The acceptance test.
    pub fn predicate(&self) -> &P {
        &self.predicate
    }

    /// Mutable access to the acceptance test; changes apply from the next
    /// accept onwards.
    pub fn predicate_mut(&mut self) -> &mut P {
        &mut self.predicate
    }

    fn fetch(&mut self) -> Result<(), CursorError> {
        while self.inner.valid() {
            if self.predicate.accept(&self.inner)? {
                return Ok(());
            }
            self.inner.next()?;
        }
        Ok(())
    }
}

impl<C: Cursor> FilterCursor<C, CallbackPredicate> {
    /// Filter `inner` through a closure applied to each value.
    pub fn callback<F>(inner: C, callback: F) -> Self
    where
        F: Fn(&Value) -> Result<bool, CursorError> + 'static,
    {
        Self::new(inner, CallbackPredicate::new(callback))
    }
}

impl<C: Cursor, P: Predicate> Cursor for FilterCursor<C, P> {
    fn rewind(&mut self) -> Result<(), CursorError> {
        self.inner.rewind()?;
        self.fetch()
    }

    fn valid(&self) -> bool {
        self.inner.valid()
    }

    fn current(&self) -> Result<Value, CursorError> {
        if !self.valid() {
            return Ok(Value::Null);
        }
        match self.predicate.projected_current() {
            Some(value) => Ok(value.clone()),
            None => self.inner.current(),
        }
    }

    fn key(&self) -> Result<Value, CursorError> {
        if !self.valid() {
            return Ok(Value::Null);
        }
        match self.predicate.projected_key() {
            Some(key) => Ok(key.clone()),
            None => self.inner.key(),
        }
    }

    fn next(&mut self) -> Result<(), CursorError> {
        self.inner.next()?;
        self.fetch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::CursorExt;
    use crate::sequence::{RecursiveSequenceCursor, SequenceCursor};
    use crate::value::{Array, Key};

    fn one_to(n: i64) -> SequenceCursor {
        SequenceCursor::new((1..=n).map(Value::Int).collect())
    }

    fn is_even(value: &Value) -> Result<bool, CursorError> {
        Ok(value.as_int().is_some_and(|n| n % 2 == 0))
    }

    #[test]
    fn test_callback_filter_keeps_evens() {
        let mut cursor = FilterCursor::callback(one_to(6), is_even);
        assert_eq!(
            cursor.values().expect("values"),
            vec![Value::Int(2), Value::Int(4), Value::Int(6)]
        );
        assert!(!cursor.valid());
        assert_eq!(cursor.current().expect("current"), Value::Null);
    }

    #[test]
    fn test_callback_filter_on_keys() {
        let storage: Array = [("apple", 1), ("banana", 2), ("avocado", 3)]
            .into_iter()
            .map(|(k, v)| (Key::from(k), Value::Int(v)))
            .collect();
        let predicate = CallbackPredicate::new(|key| {
            Ok(key.as_str().is_some_and(|k| k.starts_with('a')))
        })
        .with_use_key(true);
        let mut cursor = FilterCursor::new(SequenceCursor::new(storage), predicate);
        assert_eq!(
            cursor.keys().expect("keys"),
            vec![Value::from("apple"), Value::from("avocado")]
        );
    }

    #[test]
    fn test_unimplemented_accept_always_fails() {
        let mut cursor = FilterCursor::new(one_to(3), Unimplemented);
        let err = cursor.rewind().expect_err("abstract accept");
        assert!(matches!(err, CursorError::AbstractMethod { method: "accept", .. }));
        assert!(cursor.accept().is_err());
    }

    #[test]
    fn test_empty_inner_never_calls_predicate() {
        let mut cursor = FilterCursor::new(SequenceCursor::new(Array::new()), Unimplemented);
        cursor.rewind().expect("nothing to accept");
        assert!(!cursor.valid());
    }

    #[test]
    fn test_callback_errors_propagate() {
        let mut cursor = FilterCursor::callback(one_to(3), |value| {
            if value.as_int() == Some(2) {
                Err(CursorError::callback_failure("two is not allowed"))
            } else {
                Ok(true)
            }
        });
        cursor.rewind().expect("first element accepted");
        assert!(matches!(cursor.next(), Err(CursorError::Callback(_))));
    }

    #[test]
    fn test_closure_predicate() {
        let mut seen = 0;
        let mut cursor = FilterCursor::new(one_to(4), |inner: &dyn Cursor| -> Result<bool, CursorError> {
            seen += 1;
            Ok(inner.key()?.as_int().is_some_and(|k| k >= 2))
        });
        assert_eq!(cursor.values().expect("values"), vec![Value::Int(3), Value::Int(4)]);
        drop(cursor);
        assert_eq!(seen, 4);
    }

    #[test]
    fn test_registry_backed_callback() {
        let mut registry = CallbackRegistry::new();
        registry.register("odd", "accept odd integers", |value| {
            Ok(value.as_int().is_some_and(|n| n % 2 != 0))
        });
        let predicate = CallbackPredicate::from_registry(&registry, "odd").expect("registered");
        let mut cursor = FilterCursor::new(one_to(5), predicate);
        assert_eq!(
            cursor.values().expect("values"),
            vec![Value::Int(1), Value::Int(3), Value::Int(5)]
        );
        assert!(CallbackPredicate::from_registry(&registry, "missing")
            .expect_err("unknown")
            .is_construction());
    }

    #[test]
    fn test_parent_predicate_keeps_branches() {
        let mut root = Array::new();
        root.push(Value::from("leaf"));
        root.push(Value::from(vec![1]));
        root.push(Value::from(vec![2]));
        let mut cursor = FilterCursor::new(RecursiveSequenceCursor::new(root), ParentPredicate);
        assert_eq!(cursor.keys().expect("keys"), vec![Value::Int(1), Value::Int(2)]);
    }
}
