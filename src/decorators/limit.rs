use tracing::trace;

use crate::cursor::{Cursor, CursorError};
use crate::value::Value;

/// Window over an inner cursor: skip `offset` elements, then yield at most
/// `limit` (unbounded when constructed with `-1`).
#[derive(Debug, Clone)]
pub struct LimitCursor<C> {
    inner: C,
    offset: usize,
    limit: Option<usize>,
    position: usize,
}

impl<C: Cursor> LimitCursor<C> {
    /// Create a window. `offset` must be non-negative and `limit` either
    /// `-1` (unbounded) or non-negative.
    pub fn new(inner: C, offset: i64, limit: i64) -> Result<Self, CursorError> {
        let offset = usize::try_from(offset).map_err(|_| {
            CursorError::construction("LimitCursor", "offset must be >= 0")
        })?;
        let limit = match limit {
            -1 => None,
            n => Some(usize::try_from(n).map_err(|_| {
                CursorError::construction("LimitCursor", "limit must be -1 or >= 0")
            })?),
        };
        Ok(Self {
            inner,
            offset,
            limit,
            position: 0,
        })
    }

    /// Number of skipped leading elements.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Maximum number of yielded elements, `None` when unbounded.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Absolute position in the inner cursor (offset included).
    pub fn get_position(&self) -> usize {
        self.offset + self.position
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

    /// Move to the absolute position `position`.
    ///
    /// Positions outside `[offset, offset + limit)` fail without moving. If
    /// the inner cursor runs out on the way, the error is returned and the
    /// cursor stays where the advance stopped.
    pub fn seek(&mut self, position: i64) -> Result<(), CursorError> {
        let target = usize::try_from(position)
            .ok()
            .filter(|target| *target >= self.offset)
            .ok_or_else(|| {
                CursorError::bounds(position, format!("below the offset {}", self.offset))
            })?;
        if let Some(limit) = self.limit {
            if target >= self.offset + limit {
                return Err(CursorError::bounds(
                    position,
                    format!("behind offset {} plus limit {}", self.offset, limit),
                ));
            }
        }

        self.rewind()?;
        while self.get_position() < target {
            if !self.inner.valid() {
                break;
            }
            self.next()?;
        }
        if !self.inner.valid() {
            return Err(CursorError::bounds(position, "past the end of the inner cursor"));
        }
        Ok(())
    }

    fn in_window(&self) -> bool {
        self.limit.map_or(true, |limit| self.position < limit)
    }
}

impl<C: Cursor> Cursor for LimitCursor<C> {
    fn rewind(&mut self) -> Result<(), CursorError> {
        self.inner.rewind()?;
        self.position = 0;
        let mut skipped = 0;
        while skipped < self.offset && self.inner.valid() {
            self.inner.next()?;
            skipped += 1;
        }
        trace!(skipped, offset = self.offset, "limit window rewound");
        Ok(())
    }

    fn valid(&self) -> bool {
        self.in_window() && self.inner.valid()
    }

    fn current(&self) -> Result<Value, CursorError> {
        if !self.valid() {
            return Ok(Value::Null);
        }
        self.inner.current()
    }

    fn key(&self) -> Result<Value, CursorError> {
        if !self.valid() {
            return Ok(Value::Null);
        }
        self.inner.key()
    }

    fn next(&mut self) -> Result<(), CursorError> {
        self.inner.next()?;
        self.position += 1;
        Ok(())
    }
}
