use tracing::debug;

use crate::cursor::{Cursor, CursorError};
use crate::dispatch::CursorHandle;
use crate::value::Value;

/// Concatenation of several cursors, visited in append order.
///
/// Empty members are skipped. Appending to an exhausted cursor moves it
/// straight onto the new member.
#[derive(Debug, Clone, Default)]
pub struct AppendCursor {
    cursors: Vec<CursorHandle>,
    index: usize,
}

impl AppendCursor {
    /// Create an empty concatenation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cursor.
    pub fn append(&mut self, cursor: CursorHandle) -> Result<(), CursorError> {
        let appended_at = self.cursors.len();
        self.cursors.push(cursor);
        debug!(members = self.cursors.len(), "cursor appended");
        if !self.valid() {
            self.index = appended_at;
            self.cursors[appended_at].rewind()?;
            self.settle()?;
        }
        Ok(())
    }

    /// Index of the member currently being visited.
    pub fn get_iterator_index(&self) -> Option<usize> {
        (self.index < self.cursors.len()).then_some(self.index)
    }

    /// Member currently being visited.
    pub fn get_inner_iterator(&self) -> Option<&CursorHandle> {
        self.cursors.get(self.index)
    }

    /// All members in append order.
    pub fn iterators(&self) -> &[CursorHandle] {
        &self.cursors
    }

    fn settle(&mut self) -> Result<(), CursorError> {
        while self.index < self.cursors.len() {
            if self.cursors[self.index].valid() {
                return Ok(());
            }
            self.index += 1;
            if let Some(cursor) = self.cursors.get_mut(self.index) {
                cursor.rewind()?;
            }
        }
        Ok(())
    }
}

impl Cursor for AppendCursor {
    fn rewind(&mut self) -> Result<(), CursorError> {
        self.index = 0;
        if let Some(first) = self.cursors.first_mut() {
            first.rewind()?;
        }
        self.settle()
    }

    fn valid(&self) -> bool {
        self.cursors
            .get(self.index)
            .is_some_and(|cursor| cursor.valid())
    }

    fn current(&self) -> Result<Value, CursorError> {
        match self.cursors.get(self.index) {
            Some(cursor) if cursor.valid() => cursor.current(),
            _ => Ok(Value::Null),
        }
    }

    fn key(&self) -> Result<Value, CursorError> {
        match self.cursors.get(self.index) {
            Some(cursor) if cursor.valid() => cursor.key(),
            _ => Ok(Value::Null),
        }
    }

    fn next(&mut self) -> Result<(), CursorError> {
        if let Some(cursor) = self.cursors.get_mut(self.index) {
            cursor.next()?;
        }
        self.settle()
    }
}
