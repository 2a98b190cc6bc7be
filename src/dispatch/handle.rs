use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use super::{invoke, Operation, Reply};
use crate::cursor::{Cursor, CursorError};
use crate::value::Value;

/// Shared, late-bound reference to a cursor.
///
/// Used where a decorator holds cursors it does not own exclusively
/// (append and multiple joins): the caller keeps a clone of the handle and may
/// keep driving or detach the cursor. Identity is reference identity.
///
/// As a [`Cursor`] the handle applies the suppression policy: dispatch
/// failures while rewinding, advancing or testing validity are logged and
/// treated as a no-op (or as "invalid"). Every other failure of those
/// operations, and every failure on `current`/`key`, propagates.
#[derive(Clone)]
pub struct CursorHandle {
    inner: Rc<RefCell<Box<dyn Cursor>>>,
}

impl CursorHandle {
    /// Wrap a cursor into a new handle.
    pub fn new<C: Cursor + 'static>(cursor: C) -> Self {
        Self::from_boxed(Box::new(cursor))
    }

    /// Wrap an already boxed cursor.
    pub fn from_boxed(cursor: Box<dyn Cursor>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(cursor)),
        }
    }

    /// Whether both handles refer to the same cursor.
    pub fn ptr_eq(&self, other: &CursorHandle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Dispatch an operation on the referenced cursor.
    ///
    /// Fails with a dispatch error when the cursor is already in use further
    /// up the call stack (for example a join that contains itself).
    pub fn invoke(&self, operation: Operation) -> Result<Reply, CursorError> {
        let mut cursor = self.inner.try_borrow_mut().map_err(|_| {
            CursorError::dispatch("CursorHandle", operation.name(), "cursor is already in use")
        })?;
        invoke(&mut **cursor, operation)
    }

    /// Run a closure against the referenced cursor.
    pub fn with<R>(&self, f: impl FnOnce(&mut dyn Cursor) -> R) -> Result<R, CursorError> {
        let mut cursor = self.inner.try_borrow_mut().map_err(|_| {
            CursorError::dispatch("CursorHandle", "with", "cursor is already in use")
        })?;
        Ok(f(&mut **cursor))
    }

    /// `Ok(None)` for a suppressed dispatch failure.
    fn suppress(
        &self,
        operation: Operation,
        result: Result<Reply, CursorError>,
    ) -> Result<Option<Reply>, CursorError> {
        match result {
            Ok(reply) => Ok(Some(reply)),
            Err(e) if e.is_dispatch() => {
                debug!(%operation, error = %e, "suppressed dispatch failure");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn value(&self, operation: Operation) -> Result<Value, CursorError> {
        let reply = self.invoke(operation)?;
        Ok(reply.into_value().unwrap_or_default())
    }
}

impl Cursor for CursorHandle {
    fn rewind(&mut self) -> Result<(), CursorError> {
        self.suppress(Operation::Rewind, self.invoke(Operation::Rewind))?;
        Ok(())
    }

    fn valid(&self) -> bool {
        // `valid` can only fail to dispatch; anything else reads as invalid too.
        self.suppress(Operation::Valid, self.invoke(Operation::Valid))
            .ok()
            .flatten()
            .and_then(|reply| reply.flag())
            .unwrap_or(false)
    }

    fn current(&self) -> Result<Value, CursorError> {
        self.value(Operation::Current)
    }

    fn key(&self) -> Result<Value, CursorError> {
        self.value(Operation::Key)
    }

    fn next(&mut self) -> Result<(), CursorError> {
        self.suppress(Operation::Next, self.invoke(Operation::Next))?;
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        self.inner
            .try_borrow()
            .map(|cursor| cursor.type_name())
            .unwrap_or("CursorHandle")
    }
}

impl fmt::Debug for CursorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorHandle")
            .field("cursor", &self.type_name())
            .field("shared", &Rc::strong_count(&self.inner))
            .finish()
    }
}
