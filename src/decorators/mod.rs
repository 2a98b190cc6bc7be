//! Linear decorators
//!
//! Each decorator wraps one inner cursor (or, for the joins, a list of shared
//! [`CursorHandle`](crate::dispatch::CursorHandle)s) and forwards or
//! transforms the five protocol operations.
//!
//! | Decorator | Behaviour |
//! |---|---|
//! | [`LimitCursor`] | window of `limit` elements after skipping `offset` |
//! | [`FilterCursor`] | only positions accepted by a [`Predicate`] |
//! | [`CachingCursor`] | one-ahead cache with optional full history |
//! | [`AppendCursor`] | concatenation of several cursors |
//! | [`MultipleCursor`] | lock-step zip of several cursors |
//! | [`InfiniteCursor`] | restarts the inner cursor when it runs out |
//! | [`NoRewindCursor`] | honours only the first rewind |
//! | [`PassthroughCursor`] | plain delegation, unwraps aggregates |

mod append;
mod caching;
mod filter;
mod infinite;
mod limit;
mod multiple;
mod no_rewind;
mod passthrough;
mod pattern;

pub use append::AppendCursor;
pub use caching::{CachingCursor, CachingMode, StringSource};
pub use filter::{
    CallbackFilterCursor, CallbackPredicate, FilterCursor, ParentPredicate, Predicate,
    Unimplemented,
};
pub use infinite::InfiniteCursor;
pub use limit::LimitCursor;
pub use multiple::{MultipleCursor, MultipleFlags, Need, RowKeys};
pub use no_rewind::NoRewindCursor;
pub use passthrough::{Aggregate, PassthroughCursor};
pub use pattern::{RegexFilterCursor, RegexFlags, RegexMode, RegexPredicate};
