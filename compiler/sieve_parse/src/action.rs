//! External actions.
//!
//! Fields may name an action that the embedding application resolves outside
//! the parser (a script callback, a policy lookup, a network verdict). The
//! runtime suspends at such a field with an [`ActionRequest`]; the caller
//! resolves it and resumes. [`drive`] is that loop for handlers that answer
//! synchronously.

use sieve_ir::ByteStream;

use crate::context::ParseContext;
use crate::parser::CompiledParser;
use crate::runtime::{step, ActionRequest, StepOutcome};

/// A handler's answer to one request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ActionResult {
    Accept,
    /// The value is unacceptable here. Recoverable by an enclosing choice.
    Reject(String),
    /// The handler itself broke. Always fatal.
    Fail(String),
}

/// Resolves action requests synchronously.
pub trait ActionHandler {
    fn invoke(
        &self,
        parser: &CompiledParser,
        request: &ActionRequest,
        ctx: &ParseContext,
    ) -> ActionResult;
}

impl<F> ActionHandler for F
where
    F: Fn(&CompiledParser, &ActionRequest, &ParseContext) -> ActionResult,
{
    fn invoke(
        &self,
        parser: &CompiledParser,
        request: &ActionRequest,
        ctx: &ParseContext,
    ) -> ActionResult {
        self(parser, request, ctx)
    }
}

/// Handler that accepts every request.
#[derive(Copy, Clone, Debug, Default)]
pub struct AcceptAll;

impl ActionHandler for AcceptAll {
    fn invoke(&self, _: &CompiledParser, _: &ActionRequest, _: &ParseContext) -> ActionResult {
        ActionResult::Accept
    }
}

/// Apply `result` to a suspended context.
pub fn resolve(ctx: &mut ParseContext, result: ActionResult) {
    match result {
        ActionResult::Accept => {}
        ActionResult::Reject(reason) => ctx.reject(reason),
        ActionResult::Fail(reason) => ctx.fail(reason),
    }
}

/// Step `ctx`, answering every suspension with `handler`, until the parse
/// finishes, fails or needs more input.
pub fn drive<H>(
    parser: &CompiledParser,
    ctx: &mut ParseContext,
    stream: &ByteStream,
    handler: &H,
) -> StepOutcome
where
    H: ActionHandler + ?Sized,
{
    loop {
        match step(parser, ctx, stream) {
            StepOutcome::Suspended(request) => {
                let result = handler.invoke(parser, &request, ctx);
                tracing::trace!(
                    action = parser.action_name(request.action).unwrap_or("?"),
                    node = %request.node,
                    ?result,
                    "action resolved"
                );
                resolve(ctx, result);
            }
            outcome => return outcome,
        }
    }
}
