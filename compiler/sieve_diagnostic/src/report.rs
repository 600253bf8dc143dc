//! Byte-accurate parse error reports.
//!
//! A report is two lines:
//!
//! ```text
//! parse error at byte 2 for field FieldB in pair: expected 2 bytes, stream ended after 0
//! parse error context: ...
//! ```
//!
//! Reports for errors that a choice or repetition recovered from carry a
//! `caught: ` prefix.

use std::fmt;

use sieve_ir::{ByteStream, NodeDebugInfo, NodeId, ParseError};

use crate::escape::dump_at;

/// Look up the debug record of `node`.
///
/// Reserved ids and ids outside the table resolve to `None`.
#[inline]
pub fn debug_info(table: &[NodeDebugInfo], node: NodeId) -> Option<&NodeDebugInfo> {
    node.slot().and_then(|slot| table.get(slot))
}

/// A rendered parse error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ErrorReport {
    pub caught: bool,
    pub position: usize,
    pub field: String,
    pub rule: String,
    pub description: String,
    /// Escaped bytes starting at `position`.
    pub context: String,
}

impl ErrorReport {
    /// Build the report of `error` against the parser's debug table.
    pub fn new(
        error: &ParseError,
        table: &[NodeDebugInfo],
        stream: &ByteStream,
        caught: bool,
    ) -> Self {
        let (field, rule) = match debug_info(table, error.node) {
            Some(info) => (info.field.clone(), info.rule.clone()),
            None => (
                NodeDebugInfo::UNKNOWN.to_string(),
                NodeDebugInfo::UNKNOWN.to_string(),
            ),
        };
        ErrorReport {
            caught,
            position: error.position,
            field,
            rule,
            description: error.description.clone(),
            context: dump_at(stream, error.position),
        }
    }

    pub fn headline(&self) -> String {
        format!(
            "{}parse error at byte {} for field {} in {}: {}",
            if self.caught { "caught: " } else { "" },
            self.position,
            self.field,
            self.rule,
            self.description
        )
    }

    pub fn context_line(&self) -> String {
        format!("parse error context: {}...", self.context)
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.headline(), self.context_line())
    }
}

/// Render an unrecovered parse error.
pub fn format_parse_error(
    error: &ParseError,
    table: &[NodeDebugInfo],
    stream: &ByteStream,
) -> String {
    ErrorReport::new(error, table, stream, false).to_string()
}
