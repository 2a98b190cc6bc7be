use std::cell::RefCell;

use tracing::debug;

use crate::cursor::{Cursor, CursorError};
use crate::value::Value;

/// Cursor that rewinds its inner cursor whenever it runs out.
///
/// Over a non-empty inner cursor it never becomes invalid. Over an empty one
/// `valid()` attempts a single rewind and then reports `false`.
#[derive(Debug)]
pub struct InfiniteCursor<C> {
    inner: RefCell<C>,
}

impl<C: Cursor> InfiniteCursor<C> {
    /// Wrap `inner`.
    pub fn new(inner: C) -> Self {
        Self {
            inner: RefCell::new(inner),
        }
    }

    /// Consume the decorator and return the wrapped cursor.
    pub fn into_inner(self) -> C {
        self.inner.into_inner()
    }

    fn busy(&self, operation: &str) -> CursorError {
        CursorError::dispatch("InfiniteCursor", operation, "inner cursor is already in use")
    }
}

impl<C: Cursor> Cursor for InfiniteCursor<C> {
    fn rewind(&mut self) -> Result<(), CursorError> {
        self.inner.get_mut().rewind()
    }

    fn valid(&self) -> bool {
        let Ok(mut inner) = self.inner.try_borrow_mut() else {
            return false;
        };
        if inner.valid() {
            return true;
        }
        if let Err(e) = inner.rewind() {
            debug!(error = %e, "infinite cursor could not restart");
            return false;
        }
        inner.valid()
    }

    fn current(&self) -> Result<Value, CursorError> {
        let inner = self.inner.try_borrow().map_err(|_| self.busy("current"))?;
        inner.current()
    }

    fn key(&self) -> Result<Value, CursorError> {
        let inner = self.inner.try_borrow().map_err(|_| self.busy("key"))?;
        inner.key()
    }

    fn next(&mut self) -> Result<(), CursorError> {
        let inner = self.inner.get_mut();
        inner.next()?;
        if !inner.valid() {
            inner.rewind()?;
        }
        Ok(())
    }
}
