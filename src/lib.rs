//! # Composable cursors
//!
//! A small iteration protocol (`rewind`, `valid`, `current`, `key`, `next`)
//! and a family of cursors built on it:
//!
//! 1. **Sequence cursors** over ordered key→value containers, iterating a
//!    sorted key snapshot
//! 2. **Linear decorators** that window, filter, cache, concatenate, zip,
//!    repeat or pin another cursor
//! 3. **Recursive variants** that re-apply a decorator at every level of a
//!    nested structure
//! 4. **Tree flattening** of a recursive cursor in leaves-only, self-first or
//!    child-first order, with depth limits and ASCII tree drawing
//!
//! Cursors known only as `dyn Cursor` are driven through the
//! [`dispatch`] gateway, which also resolves the optional recursive and
//! lookahead capabilities.
//!
//! ## Usage Example
//!
//! ```
//! use cursorwork::{CursorExt, FilterCursor, SequenceCursor, Value};
//!
//! let numbers = SequenceCursor::new((1..=6).map(Value::Int).collect());
//! let mut evens = FilterCursor::callback(numbers, |v| {
//!     Ok(v.as_int().is_some_and(|n| n % 2 == 0))
//! });
//! assert_eq!(
//!     evens.values()?,
//!     vec![Value::Int(2), Value::Int(4), Value::Int(6)]
//! );
//! # Ok::<(), cursorwork::CursorError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod cursor;      // Protocol traits and errors
pub mod decorators;  // Linear decorators
pub mod dispatch;    // Capability resolution, shared handles, callbacks
pub mod recursive;   // Recursion-aware decorators
pub mod sequence;    // Leaf cursors over containers
pub mod tree;        // Tree flattener and drawing
pub mod value;       // Dynamic values and containers

// Re-exports for convenience
pub use cursor::{Cursor, CursorError, CursorExt, Lookahead, RecursiveCursor};
pub use decorators::{
    AppendCursor, CachingCursor, CachingMode, FilterCursor, InfiniteCursor, LimitCursor,
    MultipleCursor, MultipleFlags, NoRewindCursor, PassthroughCursor, RegexFlags, RegexMode,
};
pub use dispatch::{CallbackRegistry, CursorHandle, Operation};
pub use recursive::{
    ParentCursor, RecursiveCachingCursor, RecursiveCallbackFilterCursor, RecursiveRegexCursor,
};
pub use sequence::{RecursiveSequenceCursor, SequenceCursor};
pub use tree::{TraversalMode, TraversalOptions, TreeCursor, TreeDrawing};
pub use value::{Array, Key, Object, Value};
