//! Stack frames of the tree flattener
//!
//! One frame per open level: the cursor over that level plus the step the
//! state machine resumes at when the level becomes topmost again.

use crate::cursor::RecursiveCursor;

/// Resume point of one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Freshly rewound; test validity without advancing.
    Start,
    /// Advance before testing validity.
    Next,
    /// Positioned on a valid element whose children are not yet probed.
    Test,
    /// Report the branch element itself.
    SelfReport,
    /// Descend into the children of the current element.
    Child,
}

/// One level of the traversal stack.
#[derive(Debug)]
pub(crate) struct Frame {
    pub(crate) cursor: Box<dyn RecursiveCursor>,
    pub(crate) step: Step,
}

impl Frame {
    pub(crate) fn new(cursor: Box<dyn RecursiveCursor>) -> Self {
        Self {
            cursor,
            step: Step::Start,
        }
    }
}
