//! Tree flattener
//!
//! Depth-first traversal of a recursive cursor as a flat cursor. The
//! traversal keeps an explicit stack with one frame per open level instead of
//! recursing, so `next()` can stop at any element and resume later.
//!
//! Modes decide which elements are reported:
//! - `LeavesOnly`: elements without children.
//! - `SelfFirst`: every element, a branch before its children.
//! - `ChildFirst`: every element, a branch after its children.
//!
//! With a maximum depth, elements at that depth are never descended into and
//! are reported as leaves in every mode.

mod drawing;
mod hooks;
mod node;
mod traversal;

pub use drawing::{DrawFlags, PrefixPart, TreeDrawing};
pub use hooks::{NoHooks, TraversalHooks};
pub use traversal::TreeCursor;

/// Which elements the flattener reports, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalMode {
    /// Only elements without children.
    #[default]
    LeavesOnly,
    /// Branches before their children.
    SelfFirst,
    /// Branches after their children.
    ChildFirst,
}

/// What happens when fetching children fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildErrors {
    /// Log the failure and continue as if the element had no children.
    #[default]
    Suppress,
    /// Return the failure to the caller.
    Propagate,
}

/// Traversal configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraversalOptions {
    /// Reporting mode.
    pub mode: TraversalMode,
    /// Deepest level descended into; `None` for unlimited.
    pub max_depth: Option<usize>,
    /// Handling of `get_children` failures.
    pub child_errors: ChildErrors,
}

impl TraversalOptions {
    /// Options with the given mode and defaults otherwise.
    pub fn new(mode: TraversalMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Set the reporting mode.
    pub fn with_mode(mut self, mode: TraversalMode) -> Self {
        self.mode = mode;
        self
    }

    /// Limit the descent depth.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Choose how child retrieval failures are handled.
    pub fn with_child_errors(mut self, child_errors: ChildErrors) -> Self {
        self.child_errors = child_errors;
        self
    }

    /// Whether an element at `depth` may be descended into.
    pub fn descends_at(&self, depth: usize) -> bool {
        self.max_depth.map_or(true, |max| max > depth)
    }
}
