use tracing::trace;

use crate::cursor::{Cursor, CursorError};
use crate::value::Value;

/// Cursor that forwards only the first rewind.
///
/// Later rewinds are ignored, so the inner cursor can be consumed in several
/// passes (for example across a `foreach`-style loop that always rewinds).
#[derive(Debug, Clone)]
pub struct NoRewindCursor<C> {
    inner: C,
    rewound: bool,
}

impl<C: Cursor> NoRewindCursor<C> {
    /// Wrap `inner`.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            rewound: false,
        }
    }

    /// Wrapped cursor.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Consume the decorator and return the wrapped cursor.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Cursor> Cursor for NoRewindCursor<C> {
    fn rewind(&mut self) -> Result<(), CursorError> {
        if self.rewound {
            trace!("rewind ignored");
            return Ok(());
        }
        self.rewound = true;
        self.inner.rewind()
    }

    fn valid(&self) -> bool {
        self.inner.valid()
    }

    fn current(&self) -> Result<Value, CursorError> {
        self.inner.current()
    }

    fn key(&self) -> Result<Value, CursorError> {
        self.inner.key()
    }

    fn next(&mut self) -> Result<(), CursorError> {
        self.inner.next()
    }
}
