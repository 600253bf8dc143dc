//! Grammar graph nodes.
//!
//! A grammar reaches the compiler as a flat graph: control constructs are
//! explicit nodes wired together by successor edges, repetitions close a
//! cycle back to their body. See [`crate::GrammarBuilder`] for how structured
//! grammars are lowered into this shape.

use std::fmt;

use smallvec::SmallVec;

use crate::{ActionId, FieldSpec, Gid};

/// Successor list. Most nodes have one or two successors.
pub type Successors = SmallVec<[Gid; 2]>;

/// What a grammar node does when executed.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum NodeKind {
    /// Consume bytes per `spec`, then optionally hand the value to `action`.
    /// At most one successor.
    Field {
        spec: FieldSpec,
        action: Option<ActionId>,
    },
    /// Named rule entry. Pass-through to its single successor.
    Sequence,
    /// Ordered alternatives; successors are the alternative entries.
    Choice,
    /// Loop head; successors are `[body, exit]`.
    Repeat { min: u32, max: Option<u32> },
    /// Closes the scope opened by `owner` (a `Choice` or `Repeat`).
    Commit { owner: Gid },
    /// Explicit end of grammar.
    Terminal,
}

impl NodeKind {
    /// Label used in debug tables and diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Field { .. } => "field",
            NodeKind::Sequence => "sequence",
            NodeKind::Choice => "choice",
            NodeKind::Repeat { .. } => "repeat",
            NodeKind::Commit { .. } => "commit",
            NodeKind::Terminal => "terminal",
        }
    }
}

/// One node of the grammar graph.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct GrammarNode {
    pub gid: Gid,
    /// Field name, if this node is a named field.
    pub name: Option<String>,
    /// Name of the rule that owns this node.
    pub rule: Option<String>,
    pub kind: NodeKind,
    pub successors: Successors,
}

impl GrammarNode {
    pub fn new(gid: Gid, kind: NodeKind) -> Self {
        GrammarNode {
            gid,
            name: None,
            rule: None,
            kind,
            successors: SmallVec::new(),
        }
    }
}

/// Human-facing description of a compiled node.
///
/// Only read by diagnostics; control flow never depends on it.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct NodeDebugInfo {
    pub field: String,
    pub rule: String,
}

impl NodeDebugInfo {
    pub const UNKNOWN: &'static str = "<unknown>";

    /// Build the debug record of a grammar node.
    ///
    /// Unnamed control nodes are labelled by their kind, e.g. `<choice>`.
    pub fn of(node: &GrammarNode) -> Self {
        let field = match &node.name {
            Some(name) => name.clone(),
            None => format!("<{}>", node.kind.label()),
        };
        NodeDebugInfo {
            field,
            rule: node
                .rule
                .clone()
                .unwrap_or_else(|| Self::UNKNOWN.to_string()),
        }
    }

    /// Record used when a node id has no table entry.
    pub fn unknown() -> Self {
        NodeDebugInfo {
            field: Self::UNKNOWN.to_string(),
            rule: Self::UNKNOWN.to_string(),
        }
    }
}

impl fmt::Display for NodeDebugInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.field, self.rule)
    }
}
