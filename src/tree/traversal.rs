//! Stack-driven depth-first traversal
//!
//! Each frame remembers the step it resumes at; `advance` runs the state
//! machine until it reaches a reportable element or the root level runs out.

use tracing::{debug, trace};

use super::hooks::{NoHooks, TraversalHooks};
use super::node::{Frame, Step};
use super::{ChildErrors, TraversalMode, TraversalOptions};
use crate::cursor::{Cursor, CursorError, RecursiveCursor};
use crate::sequence::RecursiveSequenceCursor;
use crate::value::Value;

/// Flat cursor over every level of a recursive cursor.
#[derive(Debug)]
pub struct TreeCursor<H = NoHooks> {
    root: Frame,
    levels: Vec<Frame>,
    options: TraversalOptions,
    hooks: H,
    in_iteration: bool,
}

impl TreeCursor<NoHooks> {
    /// Flatten `root` in `mode`.
    pub fn new(root: impl RecursiveCursor + 'static, mode: TraversalMode) -> Self {
        Self::with_options(root, TraversalOptions::new(mode))
    }

    /// Flatten `root` with explicit options.
    pub fn with_options(root: impl RecursiveCursor + 'static, options: TraversalOptions) -> Self {
        Self::with_hooks(root, options, NoHooks)
    }

    /// Flatten a nested array or object value.
    pub fn from_value(value: Value, options: TraversalOptions) -> Result<Self, CursorError> {
        Ok(Self::with_options(
            RecursiveSequenceCursor::from_value(value)?,
            options,
        ))
    }
}

impl<H: TraversalHooks> TreeCursor<H> {
    /// Flatten `root`, reporting structural events to `hooks`.
    pub fn with_hooks(root: impl RecursiveCursor + 'static, options: TraversalOptions, hooks: H) -> Self {
        Self {
            root: Frame::new(Box::new(root)),
            levels: Vec::new(),
            options,
            hooks,
            in_iteration: false,
        }
    }

    /// Current options.
    pub fn options(&self) -> TraversalOptions {
        self.options
    }

    /// Installed hooks.
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Mutable access to the installed hooks.
    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Depth of the current element; root-level elements are at depth 0.
    pub fn get_depth(&self) -> usize {
        self.levels.len()
    }

    /// Cursor of an open level, 0 being the root.
    pub fn get_sub_iterator(&self, level: usize) -> Option<&dyn RecursiveCursor> {
        let frame = match level {
            0 => &self.root,
            n => self.levels.get(n - 1)?,
        };
        Some(&*frame.cursor)
    }

    /// Cursor of the deepest open level.
    pub fn get_inner_iterator(&self) -> &dyn RecursiveCursor {
        &*self.top().cursor
    }

    /// Ask the hooks whether the current element has children.
    pub fn call_has_children(&mut self) -> bool {
        let frame = match self.levels.last() {
            Some(frame) => frame,
            None => &self.root,
        };
        self.hooks.call_has_children(&*frame.cursor)
    }

    /// Ask the hooks for the children of the current element.
    pub fn call_get_children(&mut self) -> Result<Box<dyn RecursiveCursor>, CursorError> {
        let frame = match self.levels.last_mut() {
            Some(frame) => frame,
            None => &mut self.root,
        };
        self.hooks.call_get_children(&mut *frame.cursor)
    }

    /// Limit the descent depth; `-1` removes the limit.
    pub fn set_max_depth(&mut self, max_depth: i64) -> Result<(), CursorError> {
        self.options.max_depth = match max_depth {
            -1 => None,
            n => Some(
                usize::try_from(n)
                    .map_err(|_| CursorError::bounds(n, "max depth must be -1 or >= 0"))?,
            ),
        };
        Ok(())
    }

    /// Current depth limit, `None` when unlimited.
    pub fn get_max_depth(&self) -> Option<usize> {
        self.options.max_depth
    }

    fn top(&self) -> &Frame {
        self.levels.last().unwrap_or(&self.root)
    }

    fn advance(&mut self) -> Result<(), CursorError> {
        loop {
            let depth = self.levels.len();
            let frame = match self.levels.last_mut() {
                Some(frame) => frame,
                None => &mut self.root,
            };

            match frame.step {
                Step::Start | Step::Next => {
                    if frame.step == Step::Next {
                        frame.cursor.next()?;
                    }
                    if frame.cursor.valid() {
                        frame.step = Step::Test;
                        continue;
                    }
                }
                Step::Test => {
                    if self.options.descends_at(depth)
                        && self.hooks.call_has_children(&*frame.cursor)
                    {
                        frame.step = match self.options.mode {
                            TraversalMode::SelfFirst => Step::SelfReport,
                            TraversalMode::LeavesOnly | TraversalMode::ChildFirst => Step::Child,
                        };
                        continue;
                    }
                    self.hooks.next_element(depth);
                    frame.step = Step::Next;
                    return Ok(());
                }
                Step::SelfReport => {
                    self.hooks.next_element(depth);
                    frame.step = match self.options.mode {
                        TraversalMode::SelfFirst => Step::Child,
                        TraversalMode::LeavesOnly | TraversalMode::ChildFirst => Step::Next,
                    };
                    return Ok(());
                }
                Step::Child => {
                    let children = match self.hooks.call_get_children(&mut *frame.cursor) {
                        Ok(children) => children,
                        Err(e)
                            if self.options.child_errors == ChildErrors::Suppress
                                && !e.is_abstract() =>
                        {
                            debug!(depth, error = %e, "skipped children that could not be fetched");
                            frame.step = Step::Next;
                            continue;
                        }
                        Err(e) => return Err(e),
                    };
                    frame.step = match self.options.mode {
                        TraversalMode::ChildFirst => Step::SelfReport,
                        TraversalMode::LeavesOnly | TraversalMode::SelfFirst => Step::Next,
                    };
                    let mut child = Frame::new(children);
                    child.cursor.rewind()?;
                    self.levels.push(child);
                    trace!(depth = depth + 1, "descended");
                    self.hooks.begin_children(depth + 1);
                    continue;
                }
            }

            // The topmost level is exhausted.
            if self.levels.is_empty() {
                if self.in_iteration {
                    self.in_iteration = false;
                    self.hooks.end_iteration();
                }
                return Ok(());
            }
            self.hooks.end_children(depth);
            self.levels.pop();
            trace!(depth, "ascended");
        }
    }
}

impl<H: TraversalHooks> Cursor for TreeCursor<H> {
    fn rewind(&mut self) -> Result<(), CursorError> {
        while !self.levels.is_empty() {
            self.hooks.end_children(self.levels.len());
            self.levels.pop();
        }
        self.root.cursor.rewind()?;
        self.root.step = Step::Start;
        if !self.in_iteration {
            self.hooks.begin_iteration();
        }
        self.in_iteration = true;
        self.advance()
    }

    fn valid(&self) -> bool {
        self.top().cursor.valid()
    }

    fn current(&self) -> Result<Value, CursorError> {
        if !self.valid() {
            return Ok(Value::Null);
        }
        self.top().cursor.current()
    }

    fn key(&self) -> Result<Value, CursorError> {
        if !self.valid() {
            return Ok(Value::Null);
        }
        self.top().cursor.key()
    }

    fn next(&mut self) -> Result<(), CursorError> {
        self.advance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::CursorExt;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    fn nested() -> Value {
        Value::from(json!([1, [2, [3]], 4]))
    }

    fn flatten(mode: TraversalMode) -> Vec<String> {
        let mut cursor =
            TreeCursor::from_value(nested(), TraversalOptions::new(mode)).expect("container");
        cursor
            .values()
            .expect("values")
            .iter()
            .map(Value::to_string)
            .collect()
    }

    #[test]
    fn test_modes() {
        assert_eq!(flatten(TraversalMode::LeavesOnly), ["1", "2", "3", "4"]);
        assert_eq!(
            flatten(TraversalMode::SelfFirst),
            ["1", "Array", "2", "Array", "3", "4"]
        );
        assert_eq!(
            flatten(TraversalMode::ChildFirst),
            ["1", "2", "3", "Array", "Array", "4"]
        );
    }

    #[test]
    fn test_depth_tracks_levels() {
        let mut cursor =
            TreeCursor::from_value(nested(), TraversalOptions::default()).expect("container");
        cursor.rewind().expect("rewind");
        let mut depths = Vec::new();
        while cursor.valid() {
            depths.push(cursor.get_depth());
            cursor.next().expect("next");
        }
        assert_eq!(depths, vec![0, 1, 2, 0]);
        assert_eq!(cursor.get_depth(), 0);
    }

    #[test]
    fn test_sub_iterators() {
        let mut cursor =
            TreeCursor::from_value(nested(), TraversalOptions::default()).expect("container");
        cursor.rewind().expect("rewind");
        cursor.next().expect("next");
        assert_eq!(cursor.current().expect("current"), Value::Int(2));
        let root = cursor.get_sub_iterator(0).expect("root level");
        assert_eq!(root.key().expect("key"), Value::Int(1));
        assert!(cursor.get_sub_iterator(2).is_none());
        assert_eq!(cursor.get_inner_iterator().key().expect("key"), Value::Int(0));
        assert!(!cursor.call_has_children());
    }

    #[test]
    fn test_max_depth_reports_branches_as_leaves() {
        let mut cursor =
            TreeCursor::from_value(nested(), TraversalOptions::default()).expect("container");
        cursor.set_max_depth(1).expect("depth");
        let values: Vec<String> = cursor
            .values()
            .expect("values")
            .iter()
            .map(Value::to_string)
            .collect();
        assert_eq!(values, ["1", "2", "Array", "4"]);
        assert_eq!(cursor.get_max_depth(), Some(1));

        cursor.set_max_depth(-1).expect("unlimited");
        assert_eq!(cursor.get_max_depth(), None);
        assert!(matches!(cursor.set_max_depth(-2), Err(CursorError::Bounds { .. })));
    }

    #[test]
    fn test_empty_root() {
        let mut cursor =
            TreeCursor::from_value(Value::from(json!([])), TraversalOptions::default())
                .expect("container");
        cursor.rewind().expect("rewind");
        assert!(!cursor.valid());
        assert_eq!(cursor.key().expect("key"), Value::Null);
    }

    #[test]
    fn test_empty_branches_vanish_in_leaves_only() {
        let mut cursor =
            TreeCursor::from_value(Value::from(json!([[], [[]], 5])), TraversalOptions::default())
                .expect("container");
        assert_eq!(cursor.values().expect("values"), vec![Value::Int(5)]);
    }

    /// Two root elements; rewinding fails once `broken` is set.
    #[derive(Debug)]
    struct Brittle {
        inner: RecursiveSequenceCursor,
        broken: Rc<Cell<bool>>,
    }

    impl Cursor for Brittle {
        fn rewind(&mut self) -> Result<(), CursorError> {
            if self.broken.get() {
                return Err(CursorError::callback_failure("cannot restart"));
            }
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

    impl RecursiveCursor for Brittle {
        fn has_children(&self) -> bool {
            self.inner.has_children()
        }

        fn get_children(&mut self) -> Result<Box<dyn RecursiveCursor>, CursorError> {
            self.inner.get_children()
        }
    }

    #[test]
    fn test_failed_rewind_keeps_root_position() {
        let inner = RecursiveSequenceCursor::from_value(Value::from(json!([1, 2]))).expect("array");
        let broken = Rc::new(Cell::new(false));
        let mut cursor = TreeCursor::new(
            Brittle {
                inner,
                broken: Rc::clone(&broken),
            },
            TraversalMode::LeavesOnly,
        );
        cursor.rewind().expect("rewind");
        assert_eq!(cursor.current().expect("current"), Value::Int(1));

        broken.set(true);
        assert!(matches!(cursor.rewind(), Err(CursorError::Callback(_))));
        assert_eq!(cursor.root.step, Step::Next);
        cursor.next().expect("resumes after the failed rewind");
        assert_eq!(cursor.current().expect("current"), Value::Int(2));
    }
}
