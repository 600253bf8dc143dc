//! Parse-time errors.
//!
//! A [`ParseError`] is data held in the parse context, not a Rust error
//! propagated with `?`: it is raised by node logic (or by the caller after an
//! external action) and consumed by the recovery subsystem before the next
//! dispatch step.

use std::fmt;

use crate::NodeId;

/// Why a node failed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// Bytes at the cursor do not match the field.
    Mismatch,
    /// The stream closed before the field was complete.
    Exhausted,
    /// An external action rejected the field value.
    Rejected,
    /// The external action layer itself failed.
    ActionFailed,
    /// The parse was cancelled by its owner.
    Aborted,
    /// The runtime reached an inconsistent state.
    Internal,
}

impl ErrorKind {
    /// Whether an enclosing choice or repetition may recover from this error.
    #[inline]
    pub const fn is_catchable(self) -> bool {
        matches!(
            self,
            ErrorKind::Mismatch | ErrorKind::Exhausted | ErrorKind::Rejected
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Mismatch => "mismatch",
            ErrorKind::Exhausted => "exhausted",
            ErrorKind::Rejected => "rejected",
            ErrorKind::ActionFailed => "action failed",
            ErrorKind::Aborted => "aborted",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pending or final parse failure.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseError {
    /// Byte offset where matching diverged.
    pub position: usize,
    /// Node whose logic raised the error.
    pub node: NodeId,
    pub kind: ErrorKind,
    pub description: String,
}

impl ParseError {
    pub fn new(
        kind: ErrorKind,
        position: usize,
        node: NodeId,
        description: impl Into<String>,
    ) -> Self {
        ParseError {
            position,
            node,
            kind,
            description: description.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at byte {} (node {}): {}",
            self.kind, self.position, self.node, self.description
        )
    }
}
