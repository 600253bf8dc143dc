//! Error recovery.
//!
//! Recovery unwinds the context's frame stack looking for the innermost
//! construct able to catch the pending error:
//!
//! - a choice whose running alternative has a fallback continues at the next
//!   alternative,
//! - a repetition that has completed at least `min` iterations continues at
//!   its exit.
//!
//! Catching rewinds the cursor and the recorded fields to where the failed
//! attempt started. Frames that cannot catch are discarded on the way out.
//! Only mismatch, exhaustion and rejection are ever caught.

use sieve_diagnostic::{emit, log, ErrorReport, LogLevel, GRAMMAR_SECTION};
use sieve_ir::{ByteStream, NodeId, ParseError};

use crate::context::{FrameState, ParseContext};
use crate::parser::{CatchPlan, CompiledParser};

/// Outcome of [`recover`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Recovery {
    /// The error was caught; `ctx.next` is the fallback node.
    Recovered,
    /// Nothing caught the error. The parse is stopped and the error is kept
    /// in the context.
    Unrecovered,
}

/// Consume the pending error of `ctx`.
///
/// Without a pending error this is a no-op returning `Recovered`.
pub fn recover(parser: &CompiledParser, ctx: &mut ParseContext, stream: &ByteStream) -> Recovery {
    let Some(error) = ctx.error.take() else {
        return Recovery::Recovered;
    };

    if error.kind.is_catchable() {
        while let Some(mut frame) = ctx.frames.pop() {
            let fallback = match (parser.catch_plan(frame.owner), frame.state) {
                (Some(CatchPlan::Alternatives { fallbacks }), FrameState::Alternative(index)) => {
                    let Some(&target) = fallbacks.get(index as usize) else {
                        continue;
                    };
                    // The last alternative runs without a frame.
                    if (index as usize) + 1 < fallbacks.len() {
                        frame.state = FrameState::Alternative(index + 1);
                        ctx.frames.push(frame);
                    }
                    target
                }
                (Some(CatchPlan::Iterations { min, exit }), FrameState::Iteration(count))
                    if count >= *min =>
                {
                    *exit
                }
                _ => continue,
            };

            report(parser, &error, stream, true);
            ctx.cursor = frame.position;
            ctx.records.truncate(frame.records);
            ctx.next = fallback;
            ctx.recoveries += 1;
            tracing::debug!(
                owner = %frame.owner,
                fallback = %fallback,
                cursor = frame.position,
                "recovered"
            );
            return Recovery::Recovered;
        }
    }

    report(parser, &error, stream, false);
    ctx.frames.clear();
    ctx.running = false;
    ctx.next = NodeId::EXIT;
    ctx.error = Some(error);
    Recovery::Unrecovered
}

/// Log `error`: caught errors at debug level, unrecovered ones as errors.
fn report(parser: &CompiledParser, error: &ParseError, stream: &ByteStream, caught: bool) {
    let level = if caught {
        LogLevel::Debug
    } else {
        LogLevel::Error
    };
    if !log::enabled(level, GRAMMAR_SECTION) {
        return;
    }
    let report = ErrorReport::new(error, parser.debug_table(), stream, caught);
    emit(level, GRAMMAR_SECTION, &report.headline());
    emit(level, GRAMMAR_SECTION, &report.context_line());
}
