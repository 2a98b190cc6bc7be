//! Cursor protocol
//!
//! Every cursor implements the same five operations:
//! `rewind`, `valid`, `current`, `key` and `next`. Decorators wrap another
//! cursor and forward or transform these calls, so any composition behaves
//! the same whether the leaf is a plain sequence or a nested tree.
//!
//! Contract:
//! - `rewind` moves to the first logical position (some decorators make it a
//!   no-op).
//! - `valid` reports whether `current`/`key` refer to a real position and
//!   never advances.
//! - `current`/`key` on an invalid cursor return [`Value::Null`].
//! - `next` moves exactly one logical position.
//!
//! Optional capabilities (recursion, lookahead) are discovered through the
//! `as_*` probes rather than by name.

mod error;

pub use error::CursorError;

use std::fmt;

use crate::value::Value;

/// The five-operation iteration protocol.
pub trait Cursor {
    /// Reset to the first logical position.
    fn rewind(&mut self) -> Result<(), CursorError>;

    /// Whether the cursor is positioned on an element.
    fn valid(&self) -> bool;

    /// Value at the current position, `Null` when invalid.
    fn current(&self) -> Result<Value, CursorError>;

    /// Key at the current position, `Null` when invalid.
    fn key(&self) -> Result<Value, CursorError>;

    /// Advance one position.
    fn next(&mut self) -> Result<(), CursorError>;

    /// Concrete type name, used in diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Recursive capability, if this cursor has one.
    fn as_recursive(&self) -> Option<&dyn RecursiveCursor> {
        None
    }

    /// Mutable recursive capability, if this cursor has one.
    fn as_recursive_mut(&mut self) -> Option<&mut dyn RecursiveCursor> {
        None
    }

    /// Lookahead capability, if this cursor has one.
    fn as_lookahead(&self) -> Option<&dyn Lookahead> {
        None
    }
}

/// Cursor whose positions may themselves contain a sub-sequence.
///
/// Implementors must also override [`Cursor::as_recursive`] and
/// [`Cursor::as_recursive_mut`] to return `Some(self)`.
pub trait RecursiveCursor: Cursor {
    /// Whether the current position has children.
    fn has_children(&self) -> bool;

    /// Cursor over the children of the current position.
    fn get_children(&mut self) -> Result<Box<dyn RecursiveCursor>, CursorError>;
}

/// Cursor that knows whether another element follows the current one.
pub trait Lookahead {
    /// Whether a further valid position exists beyond the current one.
    fn has_next(&self) -> bool;
}

impl<C: Cursor + ?Sized> Cursor for Box<C> {
    fn rewind(&mut self) -> Result<(), CursorError> {
        (**self).rewind()
    }

    fn valid(&self) -> bool {
        (**self).valid()
    }

    fn current(&self) -> Result<Value, CursorError> {
        (**self).current()
    }

    fn key(&self) -> Result<Value, CursorError> {
        (**self).key()
    }

    fn next(&mut self) -> Result<(), CursorError> {
        (**self).next()
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }

    fn as_recursive(&self) -> Option<&dyn RecursiveCursor> {
        (**self).as_recursive()
    }

    fn as_recursive_mut(&mut self) -> Option<&mut dyn RecursiveCursor> {
        (**self).as_recursive_mut()
    }

    fn as_lookahead(&self) -> Option<&dyn Lookahead> {
        (**self).as_lookahead()
    }
}

impl<R: RecursiveCursor + ?Sized> RecursiveCursor for Box<R> {
    fn has_children(&self) -> bool {
        (**self).has_children()
    }

    fn get_children(&mut self) -> Result<Box<dyn RecursiveCursor>, CursorError> {
        (**self).get_children()
    }
}

impl fmt::Debug for dyn Cursor + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.type_name()).finish()
    }
}

impl fmt::Debug for dyn RecursiveCursor + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecursiveCursor").field(&self.type_name()).finish()
    }
}

/// Forward iterator over `(key, value)` pairs of a cursor.
///
/// Wraps the cursor and drives it with `next` on every step; iteration stops
/// at the first invalid position or after yielding an error.
#[derive(Debug)]
pub struct Entries<'a, C: ?Sized> {
    cursor: &'a mut C,
    phase: Phase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Rewind, then read.
    Rewind,
    /// Read the current position without moving.
    Read,
    /// Advance, then read.
    Advance,
    Done,
}

impl<'a, C: Cursor + ?Sized> Entries<'a, C> {
    fn read(&mut self) -> Option<Result<(Value, Value), CursorError>> {
        if !self.cursor.valid() {
            self.phase = Phase::Done;
            return None;
        }
        let entry = self
            .cursor
            .key()
            .and_then(|key| self.cursor.current().map(|value| (key, value)));
        self.phase = if entry.is_ok() { Phase::Advance } else { Phase::Done };
        Some(entry)
    }
}

impl<C: Cursor + ?Sized> Iterator for Entries<'_, C> {
    type Item = Result<(Value, Value), CursorError>;

    fn next(&mut self) -> Option<Self::Item> {
        let step = match self.phase {
            Phase::Done => return None,
            Phase::Read => Ok(()),
            Phase::Rewind => self.cursor.rewind(),
            Phase::Advance => Cursor::next(&mut *self.cursor),
        };
        if let Err(e) = step {
            self.phase = Phase::Done;
            return Some(Err(e));
        }
        self.read()
    }
}

/// Convenience helpers available on every cursor.
pub trait CursorExt: Cursor {
    /// Rewind, then iterate every `(key, value)` pair.
    fn entries(&mut self) -> Entries<'_, Self> {
        Entries {
            cursor: self,
            phase: Phase::Rewind,
        }
    }

    /// Iterate from the current position without rewinding.
    ///
    /// The first item is the current element, if valid.
    fn remaining(&mut self) -> Entries<'_, Self> {
        Entries {
            cursor: self,
            phase: Phase::Read,
        }
    }

    /// Rewind and collect all values.
    fn values(&mut self) -> Result<Vec<Value>, CursorError> {
        self.entries().map(|entry| entry.map(|(_, value)| value)).collect()
    }

    /// Rewind and collect all keys.
    fn keys(&mut self) -> Result<Vec<Value>, CursorError> {
        self.entries().map(|entry| entry.map(|(key, _)| key)).collect()
    }

    /// Rewind and count the elements.
    fn count_entries(&mut self) -> Result<usize, CursorError> {
        self.entries().try_fold(0, |count, entry| entry.map(|_| count + 1))
    }
}

impl<C: Cursor + ?Sized> CursorExt for C {}
