//! Diagnostics for the Sieve inspection engine.
//!
//! - [`escape`]: bounded, printable rendering of raw bytes
//! - [`report`]: two-line parse error reports keyed by the compiled debug table
//! - [`log`]: the leveled logging sink (fatal/error/warning/info/debug by
//!   section) over `tracing`
//!
//! Diagnostic cost is independent of message size: at most
//! [`escape::DUMP_WINDOW`] bytes are read per report.

pub mod escape;
pub mod log;
pub mod report;

pub use escape::{dump_at, escape_bytes, render_escaped, DUMP_WINDOW, ESCAPED_LIMIT};
pub use log::{
    emit, init_logging, init_tracing, parse_directives, set_level, LevelDirective, LogLevel,
    GRAMMAR_SECTION,
};
pub use report::{debug_info, format_parse_error, ErrorReport};
