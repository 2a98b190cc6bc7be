//! Recursion-aware decorators
//!
//! A linear decorator over a recursive cursor becomes recursive by
//! re-wrapping on descent: `get_children()` asks the wrapped cursor for its
//! children and wraps them in a fresh decorator of the same kind, carrying
//! the predicate, pattern or caching mode forward. The decoration therefore
//! applies at every depth of the tree.
//!
//! [`Rewrap`] describes the three things a decorator needs to provide;
//! [`Recursive`] turns any such decorator into a [`RecursiveCursor`].

use crate::cursor::{Cursor, CursorError, Lookahead, RecursiveCursor};
use crate::decorators::{
    CachingCursor, CachingMode, CallbackPredicate, FilterCursor, ParentPredicate, Predicate,
    RegexFlags, RegexMode, RegexPredicate,
};
use crate::value::Value;

/// Boxed recursive cursor, the inner type of every recursive decorator.
pub type BoxedRecursive = Box<dyn RecursiveCursor>;

/// Decorator that can be rebuilt around a child cursor.
pub trait Rewrap: Cursor + Sized + 'static {
    /// Whether the current position has children.
    fn has_children(&self) -> bool;

    /// Children of the current position, still unwrapped.
    fn wrapped_children(&mut self) -> Result<BoxedRecursive, CursorError>;

    /// New decorator of the same kind and configuration around `children`.
    fn rewrap(&self, children: BoxedRecursive) -> Self;
}

/// Recursive form of a linear decorator.
#[derive(Debug, Clone)]
pub struct Recursive<D>(D);

/// Recursive filter with an arbitrary predicate.
pub type RecursiveFilterCursor<P> = Recursive<FilterCursor<BoxedRecursive, P>>;

/// Recursive callback filter.
pub type RecursiveCallbackFilterCursor = RecursiveFilterCursor<CallbackPredicate>;

/// Recursive regex filter.
pub type RecursiveRegexCursor = RecursiveFilterCursor<RegexPredicate>;

/// Filter keeping only positions with children, at every depth.
pub type ParentCursor = RecursiveFilterCursor<ParentPredicate>;

/// Recursive caching decorator.
pub type RecursiveCachingCursor = Recursive<CachingCursor<BoxedRecursive>>;

impl<D: Rewrap> Recursive<D> {
    /// Wrapped decorator.
    pub fn decorator(&self) -> &D {
        &self.0
    }

    /// Mutable access to the wrapped decorator.
    pub fn decorator_mut(&mut self) -> &mut D {
        &mut self.0
    }

    /// Consume and return the wrapped decorator.
    pub fn into_decorator(self) -> D {
        self.0
    }
}

impl<P: Predicate + Clone + 'static> RecursiveFilterCursor<P> {
    /// Filter every level of `inner` with `predicate`.
    pub fn filter(inner: impl RecursiveCursor + 'static, predicate: P) -> Self {
        Recursive(FilterCursor::new(Box::new(inner), predicate))
    }
}

impl RecursiveCallbackFilterCursor {
    /// Filter every level of `inner` through a closure applied to each value.
    pub fn callback<F>(inner: impl RecursiveCursor + 'static, callback: F) -> Self
    where
        F: Fn(&Value) -> Result<bool, CursorError> + 'static,
    {
        Self::filter(inner, CallbackPredicate::new(callback))
    }
}

impl RecursiveRegexCursor {
    /// Filter every level of `inner` through `pattern`. Non-empty containers
    /// are accepted so the tree can still be descended.
    pub fn regex(
        inner: impl RecursiveCursor + 'static,
        pattern: &str,
        mode: RegexMode,
        flags: RegexFlags,
    ) -> Result<Self, CursorError> {
        let predicate = RegexPredicate::new(pattern, mode)?
            .with_flags(flags)
            .with_accept_containers(true);
        Ok(Self::filter(inner, predicate))
    }
}

impl ParentCursor {
    /// Keep only positions with children, at every level of `inner`.
    pub fn parents(inner: impl RecursiveCursor + 'static) -> Self {
        Self::filter(inner, ParentPredicate)
    }
}

impl RecursiveCachingCursor {
    /// Cache every level of `inner`, children included.
    pub fn caching(inner: impl RecursiveCursor + 'static, mode: CachingMode) -> Self {
        Recursive(CachingCursor::capturing_children(Box::new(inner), mode))
    }
}

impl<P: Predicate + Clone + 'static> Rewrap for FilterCursor<BoxedRecursive, P> {
    fn has_children(&self) -> bool {
        self.inner().has_children()
    }

    fn wrapped_children(&mut self) -> Result<BoxedRecursive, CursorError> {
        self.inner_mut().get_children()
    }

    fn rewrap(&self, children: BoxedRecursive) -> Self {
        FilterCursor::new(children, self.predicate().clone())
    }
}

impl Rewrap for CachingCursor<BoxedRecursive> {
    fn has_children(&self) -> bool {
        self.entry().is_some_and(|entry| entry.has_children)
    }

    /// The children captured for the current element. They are handed out
    /// once; a second request at the same position fails.
    fn wrapped_children(&mut self) -> Result<BoxedRecursive, CursorError> {
        let type_name = self.type_name();
        self.entry_mut()
            .and_then(|entry| entry.children.take())
            .ok_or_else(|| {
                CursorError::dispatch(type_name, "getChildren", "no cached children at this position")
            })
    }

    fn rewrap(&self, children: BoxedRecursive) -> Self {
        CachingCursor::capturing_children(children, self.mode())
    }
}

impl<D: Rewrap> Cursor for Recursive<D> {
    fn rewind(&mut self) -> Result<(), CursorError> {
        self.0.rewind()
    }

    fn valid(&self) -> bool {
        self.0.valid()
    }

    fn current(&self) -> Result<Value, CursorError> {
        self.0.current()
    }

    fn key(&self) -> Result<Value, CursorError> {
        self.0.key()
    }

    fn next(&mut self) -> Result<(), CursorError> {
        self.0.next()
    }

    fn as_recursive(&self) -> Option<&dyn RecursiveCursor> {
        Some(self)
    }

    fn as_recursive_mut(&mut self) -> Option<&mut dyn RecursiveCursor> {
        Some(self)
    }

    fn as_lookahead(&self) -> Option<&dyn Lookahead> {
        self.0.as_lookahead()
    }
}

impl<D: Rewrap> RecursiveCursor for Recursive<D> {
    fn has_children(&self) -> bool {
        self.0.has_children()
    }

    fn get_children(&mut self) -> Result<BoxedRecursive, CursorError> {
        let children = self.0.wrapped_children()?;
        Ok(Box::new(Recursive(self.0.rewrap(children))))
    }
}
