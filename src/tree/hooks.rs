use crate::cursor::{CursorError, RecursiveCursor};

/// Callbacks invoked by [`TreeCursor`](super::TreeCursor) at structural events.
///
/// Every method has a default, so implementors override only what they
/// observe. `call_has_children` and `call_get_children` sit on the
/// traversal's own path and may replace the decision or the child cursor.
pub trait TraversalHooks {
    /// A rewind started a new iteration.
    fn begin_iteration(&mut self) {}

    /// The traversal ran out of elements.
    fn end_iteration(&mut self) {}

    /// A child level at `depth` was opened.
    fn begin_children(&mut self, _depth: usize) {}

    /// The child level at `depth` is about to be closed.
    fn end_children(&mut self, _depth: usize) {}

    /// An element at `depth` is about to be reported.
    fn next_element(&mut self, _depth: usize) {}

    /// Whether the element under `cursor` should be descended into.
    fn call_has_children(&mut self, cursor: &dyn RecursiveCursor) -> bool {
        cursor.has_children()
    }

    /// Children of the element under `cursor`.
    fn call_get_children(
        &mut self,
        cursor: &mut dyn RecursiveCursor,
    ) -> Result<Box<dyn RecursiveCursor>, CursorError> {
        cursor.get_children()
    }
}

/// Hooks that observe nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl TraversalHooks for NoHooks {}
