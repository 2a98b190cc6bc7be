use thiserror::Error;

/// Errors raised by cursors and decorators.
///
/// Whether an error escapes depends on where it happens: failures behind a
/// [`CursorHandle`](crate::dispatch::CursorHandle) are swallowed while
/// advancing and surface on value access; predicate and bounds failures
/// always surface.
#[derive(Debug, Clone, Error)]
pub enum CursorError {
    /// Invalid constructor arguments; no partially built cursor is returned.
    #[error("invalid construction of {type_name}: {reason}")]
    Construction {
        /// Cursor type being constructed.
        type_name: &'static str,
        /// What was wrong with the arguments.
        reason: String,
    },

    /// An operation could not be resolved on the target cursor.
    #[error("cannot dispatch {operation} on {type_name}: {reason}")]
    Dispatch {
        /// Concrete type the operation was requested on.
        type_name: String,
        /// Requested operation name.
        operation: String,
        /// Why resolution failed.
        reason: String,
    },

    /// The abstract `accept` of a filter was called.
    #[error("{type_name} does not implement {method}")]
    AbstractMethod {
        /// Type missing the implementation.
        type_name: &'static str,
        /// Name of the required method.
        method: &'static str,
    },

    /// A seek went outside the allowed range.
    #[error("seek position {position} is out of bounds: {reason}")]
    Bounds {
        /// Requested position.
        position: i64,
        /// Which bound was violated.
        reason: String,
    },

    /// A user callback reported a failure.
    #[error("callback failed: {0}")]
    Callback(String),

    /// Regex pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl CursorError {
    /// Helper for constructing construction failures.
    pub fn construction(type_name: &'static str, reason: impl Into<String>) -> Self {
        CursorError::Construction {
            type_name,
            reason: reason.into(),
        }
    }

    /// Helper for constructing dispatch failures.
    pub fn dispatch(
        type_name: impl Into<String>,
        operation: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CursorError::Dispatch {
            type_name: type_name.into(),
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Helper for constructing bounds failures.
    pub fn bounds(position: i64, reason: impl Into<String>) -> Self {
        CursorError::Bounds {
            position,
            reason: reason.into(),
        }
    }

    /// Helper for callback-originated failures.
    pub fn callback_failure(msg: impl Into<String>) -> Self {
        CursorError::Callback(msg.into())
    }

    /// Whether this is a construction-time failure (including bad patterns).
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            CursorError::Construction { .. } | CursorError::Pattern(_)
        )
    }

    /// Whether this is a dispatch failure.
    pub fn is_dispatch(&self) -> bool {
        matches!(self, CursorError::Dispatch { .. })
    }

    /// Whether a required operation was left unimplemented. These are never suppressed.
    pub fn is_abstract(&self) -> bool {
        matches!(self, CursorError::AbstractMethod { .. })
    }
}
