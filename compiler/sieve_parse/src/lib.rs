//! Grammar compiler and resumable parse runtime for the Sieve inspection
//! engine.
//!
//! # Architecture
//!
//! - [`compile`]: grammar graph to [`CompiledParser`] (dense identifiers,
//!   dispatch table, catch plans, debug table)
//! - [`compile_unit`]: every parser a grammar exports, as a [`CompiledGrammar`]
//! - [`step`]: the dispatch loop over a [`ParseContext`]
//! - [`recover`]: unwinding to the innermost choice or repetition that can
//!   catch a pending error
//! - [`drive`]: `step` with synchronous [`ActionHandler`] resolution
//!
//! # Resumability
//!
//! `step` returns control whenever the parse cannot progress on its own:
//! [`StepOutcome::Continue`] when an open stream runs short and
//! [`StepOutcome::Suspended`] when a field hands its value to an external
//! action. The context holds everything needed to resume.
//!
//! ```text
//! let parser = compile(&grammar)?;
//! let mut ctx = ParseContext::new(&parser);
//! match drive(&parser, &mut ctx, &stream, &AcceptAll) {
//!     StepOutcome::Finished => { /* ctx.records() */ }
//!     StepOutcome::Failed => { /* ctx.error() */ }
//!     StepOutcome::Continue => { /* push more bytes */ }
//!     StepOutcome::Suspended(_) => unreachable!(),
//! }
//! ```

mod action;
mod compile;
mod context;
mod parser;
mod recovery;
mod runtime;
mod unit;

pub use action::{drive, resolve, AcceptAll, ActionHandler, ActionResult};
pub use compile::{compile, CompileError};
pub use context::{FieldRecord, ParseContext};
pub use parser::{CatchPlan, CompiledNode, CompiledParser, FieldRead, NodeIds, NodeOp};
pub use recovery::{recover, Recovery};
pub use runtime::{step, ActionRequest, StepOutcome};
pub use unit::{compile_unit, CompiledGrammar};

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod test_helpers;
