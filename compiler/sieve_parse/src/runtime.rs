//! The dispatch loop.
//!
//! [`step`] runs compiled nodes one after another until the parse finishes,
//! fails, needs more input, or reaches a field with an external action. In
//! the last two cases every piece of progress lives in the [`ParseContext`],
//! so calling `step` again resumes exactly where the previous call stopped.
//!
//! A pending error is always handed to [`crate::recovery::recover`] before the
//! next node is dispatched.

use sieve_ir::{decode_uint, ActionId, ByteStream, ErrorKind, FieldValue, NodeId};

use crate::context::{FieldRecord, Frame, FrameState, ParseContext};
use crate::parser::{CompiledParser, FieldRead, NodeOp};
use crate::recovery::{recover, Recovery};

/// A field value handed to an external action.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ActionRequest {
    pub action: ActionId,
    /// Field node that produced the value.
    pub node: NodeId,
    /// Offset of the field's first byte.
    pub position: usize,
    pub value: FieldValue,
}

/// Why [`step`] returned.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StepOutcome {
    /// The stream is open and the next field needs bytes that have not
    /// arrived yet. Push more data (or close the stream) and step again.
    Continue,
    /// A field with an external action was parsed. Resolve the request, then
    /// step again; the field is not executed a second time.
    Suspended(ActionRequest),
    Finished,
    /// The parse failed. The final error stays in the context.
    Failed,
}

/// What a single node asks the loop to do next.
enum Flow {
    Next,
    NeedData,
    Suspend(ActionRequest),
}

/// Run `ctx` forward over `stream`.
pub fn step(parser: &CompiledParser, ctx: &mut ParseContext, stream: &ByteStream) -> StepOutcome {
    loop {
        if !ctx.running {
            return match ctx.error {
                Some(_) => StepOutcome::Failed,
                None => StepOutcome::Finished,
            };
        }

        if ctx.error.is_some() {
            if let Recovery::Unrecovered = recover(parser, ctx, stream) {
                return StepOutcome::Failed;
            }
        }

        let id = ctx.next;
        if id.is_terminal() {
            ctx.running = false;
            tracing::trace!(cursor = ctx.cursor, open_frames = ctx.frames.len(), "parse finished");
            return StepOutcome::Finished;
        }

        let Some(node) = parser.node(id) else {
            ctx.raise(
                ErrorKind::Internal,
                ctx.cursor,
                format!("no node {id} in dispatch table"),
            );
            continue;
        };

        ctx.current = id;
        tracing::trace!(node = %id, kind = node.label(), cursor = ctx.cursor, "dispatch");

        let flow = execute(id, &node.op, ctx, stream);
        // A field waiting for data is dispatched again on resume.
        if !matches!(flow, Flow::NeedData) {
            if let Some(trace) = &mut ctx.trace {
                trace.push(id);
            }
        }
        match flow {
            Flow::Next => {}
            Flow::NeedData => return StepOutcome::Continue,
            Flow::Suspend(request) => return StepOutcome::Suspended(request),
        }
    }
}

fn execute(id: NodeId, op: &NodeOp, ctx: &mut ParseContext, stream: &ByteStream) -> Flow {
    match op {
        NodeOp::Field { read, action, next } => {
            return execute_field(id, read, *action, *next, ctx, stream);
        }
        NodeOp::Sequence { next } => ctx.next = *next,
        NodeOp::Terminal => ctx.next = NodeId::FINISH,
        NodeOp::Choice { branches } => match branches.first() {
            Some(&first) => {
                if branches.len() > 1 {
                    open_frame(ctx, id, FrameState::Alternative(0));
                }
                ctx.next = first;
            }
            None => ctx.raise(ErrorKind::Internal, ctx.cursor, "choice without alternatives"),
        },
        NodeOp::Repeat { max, body, exit } => {
            if *max == Some(0) {
                ctx.next = *exit;
            } else {
                open_frame(ctx, id, FrameState::Iteration(0));
                ctx.next = *body;
            }
        }
        NodeOp::Commit { owner, next } => {
            if ctx.frames.last().is_some_and(|frame| frame.owner == *owner) {
                ctx.frames.pop();
            }
            ctx.next = *next;
        }
        NodeOp::Again {
            owner,
            max,
            body,
            exit,
        } => again(ctx, *owner, *max, *body, *exit),
    }
    Flow::Next
}

fn open_frame(ctx: &mut ParseContext, owner: NodeId, state: FrameState) {
    ctx.frames.push(Frame {
        owner,
        position: ctx.cursor,
        records: ctx.records.len(),
        state,
    });
}

/// Close one loop iteration: loop again, or leave when the bound is reached
/// or the iteration consumed nothing.
fn again(
    ctx: &mut ParseContext,
    owner: NodeId,
    max: Option<u32>,
    body: NodeId,
    exit: NodeId,
) {
    let cursor = ctx.cursor;
    let records = ctx.records.len();
    let Some(frame) = ctx.frames.last_mut().filter(|frame| frame.owner == owner) else {
        ctx.raise(
            ErrorKind::Internal,
            cursor,
            format!("loop end without an open repetition {owner}"),
        );
        return;
    };
    let FrameState::Iteration(count) = frame.state else {
        ctx.raise(
            ErrorKind::Internal,
            cursor,
            format!("loop end inside alternative of {owner}"),
        );
        return;
    };

    let count = count.saturating_add(1);
    let progressed = cursor > frame.position;
    if !progressed || max.is_some_and(|max| count >= max) {
        ctx.frames.pop();
        ctx.next = exit;
    } else {
        frame.state = FrameState::Iteration(count);
        frame.position = cursor;
        frame.records = records;
        ctx.next = body;
    }
}

fn execute_field(
    id: NodeId,
    read: &FieldRead,
    action: Option<ActionId>,
    next: NodeId,
    ctx: &mut ParseContext,
    stream: &ByteStream,
) -> Flow {
    let start = ctx.cursor;
    let len = match read {
        FieldRead::Uint { width, .. } => usize::from(*width),
        FieldRead::Bytes(len) => *len,
        FieldRead::Tag(bytes) => bytes.len(),
        FieldRead::SizedBy(sources) => {
            let Some(length) = ctx.latest_from(sources).map(|record| record.value.clone()) else {
                ctx.raise(ErrorKind::Mismatch, start, "length field has not been parsed");
                return Flow::Next;
            };
            match length.as_uint().and_then(|v| usize::try_from(v).ok()) {
                Some(len) => len,
                None => {
                    ctx.raise(
                        ErrorKind::Mismatch,
                        start,
                        format!("length {length} out of range"),
                    );
                    return Flow::Next;
                }
            }
        }
    };

    // Bytes that already arrived can rule a tag out before the rest does.
    if let FieldRead::Tag(expected) = read {
        let arrived = stream.view(start, len).as_bytes();
        if let Some(offset) = arrived.iter().zip(expected).position(|(got, want)| got != want) {
            ctx.raise(
                ErrorKind::Mismatch,
                start + offset,
                format!(
                    "expected tag {}, found {}",
                    FieldValue::Bytes(expected.clone()),
                    FieldValue::Bytes(arrived.to_vec())
                ),
            );
            return Flow::Next;
        }
    }

    let Some(bytes) = stream.slice(start, len) else {
        if !stream.is_closed() {
            return Flow::NeedData;
        }
        let available = stream.available(start);
        ctx.raise(
            ErrorKind::Exhausted,
            start + available,
            format!("expected {len} bytes, stream ended after {available}"),
        );
        return Flow::Next;
    };

    let value = match read {
        FieldRead::Uint { endian, .. } => FieldValue::Uint(decode_uint(bytes, *endian)),
        FieldRead::Tag(_) | FieldRead::Bytes(_) | FieldRead::SizedBy(_) => {
            FieldValue::Bytes(bytes.to_vec())
        }
    };

    ctx.cursor = start + len;
    ctx.next = next;
    match action {
        Some(action) => {
            ctx.records.push(FieldRecord {
                node: id,
                position: start,
                value: value.clone(),
            });
            Flow::Suspend(ActionRequest {
                action,
                node: id,
                position: start,
                value,
            })
        }
        None => {
            ctx.records.push(FieldRecord {
                node: id,
                position: start,
                value,
            });
            Flow::Next
        }
    }
}
