//! Per-parse mutable state.
//!
//! A [`ParseContext`] is everything that changes while a message is parsed:
//! the dispatch position, the cursor, the pending error, the recovery frames
//! and the recorded field values. The compiled parser itself never changes,
//! so one parser can drive any number of contexts concurrently.

use sieve_ir::{ErrorKind, FieldValue, NodeId, ParseError};

use crate::parser::CompiledParser;

/// A field value recorded during the parse.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldRecord {
    pub node: NodeId,
    /// Offset of the field's first byte.
    pub position: usize,
    pub value: FieldValue,
}

/// Which construct a recovery frame belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum FrameState {
    /// Alternative `index` of a choice is running.
    Alternative(u32),
    /// `count` iterations of a repetition have completed.
    Iteration(u32),
}

/// Rewind point opened by a choice or repetition.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Frame {
    pub owner: NodeId,
    pub position: usize,
    /// Length of the record list when the frame was opened.
    pub records: usize,
    pub state: FrameState,
}

/// Mutable state of one in-flight parse.
#[derive(Clone, Debug)]
pub struct ParseContext {
    pub(crate) current: NodeId,
    pub(crate) next: NodeId,
    pub(crate) running: bool,
    pub(crate) cursor: usize,
    origin: usize,
    pub(crate) error: Option<ParseError>,
    pub(crate) frames: Vec<Frame>,
    pub(crate) records: Vec<FieldRecord>,
    pub(crate) recoveries: u32,
    pub(crate) trace: Option<Vec<NodeId>>,
}

impl ParseContext {
    /// Fresh context positioned at `parser`'s entry node, cursor at 0.
    pub fn new(parser: &CompiledParser) -> Self {
        Self::starting_at(parser, 0)
    }

    /// Fresh context whose cursor starts at `cursor`.
    ///
    /// Used when the grammar covers only a suffix of the stream, e.g. a
    /// packet payload after its headers.
    pub fn starting_at(parser: &CompiledParser, cursor: usize) -> Self {
        ParseContext {
            current: NodeId::EXIT,
            next: parser.entry(),
            running: true,
            cursor,
            origin: cursor,
            error: None,
            frames: Vec::new(),
            records: Vec::new(),
            recoveries: 0,
            trace: None,
        }
    }

    /// Record every dispatched node identifier.
    #[must_use]
    pub fn with_trace(mut self) -> Self {
        self.trace = Some(Vec::new());
        self
    }

    /// Return to the entry node and starting cursor, keeping allocations.
    pub fn reset(&mut self, parser: &CompiledParser) {
        self.current = NodeId::EXIT;
        self.next = parser.entry();
        self.running = true;
        self.cursor = self.origin;
        self.error = None;
        self.frames.clear();
        self.records.clear();
        self.recoveries = 0;
        if let Some(trace) = &mut self.trace {
            trace.clear();
        }
    }

    /// Node most recently dispatched (`EXIT` before the first step).
    #[inline]
    pub fn current(&self) -> NodeId {
        self.current
    }

    /// Node the next step dispatches to.
    #[inline]
    pub fn next(&self) -> NodeId {
        self.next
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The pending error, or after a failed parse, the final one.
    #[inline]
    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    #[inline]
    pub fn records(&self) -> &[FieldRecord] {
        &self.records
    }

    /// Errors recovered by choices and repetitions so far.
    #[inline]
    pub fn recoveries(&self) -> u32 {
        self.recoveries
    }

    /// Dispatched identifiers, when tracing was requested.
    #[inline]
    pub fn trace(&self) -> Option<&[NodeId]> {
        self.trace.as_deref()
    }

    /// Open recovery frames.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Most recent value recorded for the field called `name`.
    pub fn field<'a>(&'a self, parser: &CompiledParser, name: &str) -> Option<&'a FieldValue> {
        self.records
            .iter()
            .rev()
            .find(|record| parser.debug_info(record.node).is_some_and(|i| i.field == name))
            .map(|record| &record.value)
    }

    /// Latest record made by any of `nodes`.
    pub(crate) fn latest_from(&self, nodes: &[NodeId]) -> Option<&FieldRecord> {
        self.records
            .iter()
            .rev()
            .find(|record| nodes.contains(&record.node))
    }

    /// Set the pending error. The next step hands it to recovery.
    pub(crate) fn raise(
        &mut self,
        kind: ErrorKind,
        position: usize,
        description: impl Into<String>,
    ) {
        self.error = Some(ParseError::new(kind, position, self.current, description));
    }

    /// Position reported for errors raised on behalf of the current node.
    fn current_position(&self) -> usize {
        match self.records.last() {
            Some(record) if record.node == self.current => record.position,
            _ => self.cursor,
        }
    }

    /// Reject the value of the field just handed to an external action.
    ///
    /// Recoverable: an enclosing choice may try its next alternative.
    pub fn reject(&mut self, reason: impl Into<String>) {
        let position = self.current_position();
        self.raise(ErrorKind::Rejected, position, reason);
    }

    /// Report that an external action could not run. Always fatal.
    pub fn fail(&mut self, reason: impl Into<String>) {
        let position = self.current_position();
        self.raise(ErrorKind::ActionFailed, position, reason);
    }

    /// Cancel the parse. The next step reports `Failed` without running any
    /// node or recovery.
    pub fn abort(&mut self) {
        let position = self.current_position();
        self.raise(ErrorKind::Aborted, position, "parse aborted");
        self.running = false;
    }
}
