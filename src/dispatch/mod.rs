//! Dispatch gateway
//!
//! Resolves "perform operation X on cursor O" when O is only known as a
//! `dyn Cursor`. The five protocol operations always resolve; extension
//! operations resolve through the capability probes on [`Cursor`] and fail
//! with a dispatch error when the cursor lacks the capability.
//!
//! Decorators that hold late-bound cursors ([`CursorHandle`]) talk to them
//! exclusively through [`invoke`].

mod handle;
mod registry;

pub use handle::CursorHandle;
pub use registry::{Callback, CallbackInfo, CallbackRegistry};

use std::fmt;
use std::str::FromStr;

use crate::cursor::{Cursor, CursorError, RecursiveCursor};
use crate::value::Value;

/// Operation that can be requested through the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `current()`
    Current,
    /// `key()`
    Key,
    /// `valid()`
    Valid,
    /// `next()`
    Next,
    /// `rewind()`
    Rewind,
    /// `hasChildren()` (recursive capability)
    HasChildren,
    /// `getChildren()` (recursive capability)
    GetChildren,
    /// `hasNext()` (lookahead capability)
    HasNext,
}

impl Operation {
    /// Canonical operation name.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Current => "current",
            Operation::Key => "key",
            Operation::Valid => "valid",
            Operation::Next => "next",
            Operation::Rewind => "rewind",
            Operation::HasChildren => "hasChildren",
            Operation::GetChildren => "getChildren",
            Operation::HasNext => "hasNext",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = CursorError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "current" => Ok(Operation::Current),
            "key" => Ok(Operation::Key),
            "valid" => Ok(Operation::Valid),
            "next" => Ok(Operation::Next),
            "rewind" => Ok(Operation::Rewind),
            "hasChildren" | "has_children" => Ok(Operation::HasChildren),
            "getChildren" | "get_children" => Ok(Operation::GetChildren),
            "hasNext" | "has_next" => Ok(Operation::HasNext),
            _ => Err(CursorError::dispatch(
                "cursor",
                name,
                "no such operation",
            )),
        }
    }
}

/// Result of a dispatched operation.
pub enum Reply {
    /// Operation completed without a value (`next`, `rewind`).
    Unit,
    /// Boolean answer (`valid`, `hasChildren`, `hasNext`).
    Flag(bool),
    /// Value answer (`current`, `key`).
    Value(Value),
    /// Child cursor (`getChildren`).
    Children(Box<dyn RecursiveCursor>),
}

impl Reply {
    /// Boolean payload.
    pub fn flag(&self) -> Option<bool> {
        match self {
            Reply::Flag(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Value payload.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Reply::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Child cursor payload.
    pub fn into_children(self) -> Option<Box<dyn RecursiveCursor>> {
        match self {
            Reply::Children(children) => Some(children),
            _ => None,
        }
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Unit => f.write_str("Unit"),
            Reply::Flag(flag) => f.debug_tuple("Flag").field(flag).finish(),
            Reply::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Reply::Children(children) => f
                .debug_tuple("Children")
                .field(&children.type_name())
                .finish(),
        }
    }
}

fn missing_capability(type_name: &str, operation: Operation, capability: &str) -> CursorError {
    CursorError::dispatch(
        type_name,
        operation.name(),
        format!("cursor has no {capability} capability"),
    )
}

/// Invoke `operation` on `cursor`.
pub fn invoke(cursor: &mut dyn Cursor, operation: Operation) -> Result<Reply, CursorError> {
    let type_name = cursor.type_name();
    match operation {
        Operation::Current => cursor.current().map(Reply::Value),
        Operation::Key => cursor.key().map(Reply::Value),
        Operation::Valid => Ok(Reply::Flag(cursor.valid())),
        Operation::Next => cursor.next().map(|()| Reply::Unit),
        Operation::Rewind => cursor.rewind().map(|()| Reply::Unit),
        Operation::HasChildren => match cursor.as_recursive() {
            Some(recursive) => Ok(Reply::Flag(recursive.has_children())),
            None => Err(missing_capability(type_name, operation, "recursive")),
        },
        Operation::GetChildren => match cursor.as_recursive_mut() {
            Some(recursive) => recursive.get_children().map(Reply::Children),
            None => Err(missing_capability(type_name, operation, "recursive")),
        },
        Operation::HasNext => has_next(&*cursor).map(Reply::Flag),
    }
}

/// Invoke an operation given by name.
pub fn invoke_named(cursor: &mut dyn Cursor, name: &str) -> Result<Reply, CursorError> {
    let operation = name.parse::<Operation>().map_err(|_| {
        CursorError::dispatch(cursor.type_name(), name, "no such operation")
    })?;
    invoke(cursor, operation)
}

/// Lookahead query on a cursor that may or may not support it.
pub fn has_next<C: Cursor + ?Sized>(cursor: &C) -> Result<bool, CursorError> {
    cursor
        .as_lookahead()
        .map(|lookahead| lookahead.has_next())
        .ok_or_else(|| missing_capability(cursor.type_name(), Operation::HasNext, "lookahead"))
}
