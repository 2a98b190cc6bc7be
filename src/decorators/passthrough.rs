use crate::cursor::{Cursor, CursorError};
use crate::sequence::SequenceCursor;
use crate::value::{Array, Object, Value};

/// Something that can hand out a cursor over its contents.
pub trait Aggregate {
    /// Fresh cursor over the aggregate.
    fn cursor(&self) -> Result<Box<dyn Cursor>, CursorError>;
}

impl Aggregate for Array {
    fn cursor(&self) -> Result<Box<dyn Cursor>, CursorError> {
        Ok(Box::new(SequenceCursor::new(self.clone())))
    }
}

impl Aggregate for Object {
    fn cursor(&self) -> Result<Box<dyn Cursor>, CursorError> {
        Ok(Box::new(SequenceCursor::new(self.properties.clone())))
    }
}

/// Decorator that forwards every operation unchanged.
#[derive(Debug, Clone)]
pub struct PassthroughCursor<C> {
    inner: C,
}

impl<C: Cursor> PassthroughCursor<C> {
    /// Wrap `inner`.
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    /// Wrapped cursor.
    pub fn get_inner_iterator(&self) -> &C {
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
}

impl PassthroughCursor<Box<dyn Cursor>> {
    /// Wrap the cursor produced by an aggregate.
    pub fn from_aggregate(aggregate: &dyn Aggregate) -> Result<Self, CursorError> {
        Ok(Self::new(aggregate.cursor()?))
    }
}

impl<C: Cursor> Cursor for PassthroughCursor<C> {
    fn rewind(&mut self) -> Result<(), CursorError> {
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
