//! The compiled parser: dispatch table, catch plans and debug table.
//!
//! All three tables are indexed by [`NodeId::slot`] and built once by
//! [`crate::compile`]. A `CompiledParser` is immutable afterwards and shared
//! read-only by every in-flight parse of its grammar.

use std::fmt::Write as _;

use sieve_ir::{ActionId, Endian, Gid, NodeDebugInfo, NodeId};
use smallvec::SmallVec;

/// Node identifier list sized for typical branch counts.
pub type NodeIds = SmallVec<[NodeId; 4]>;

/// How a field node reads its bytes, with length references resolved.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldRead {
    Uint { width: u8, endian: Endian },
    Bytes(usize),
    /// Length is the latest value recorded by any of these nodes.
    SizedBy(NodeIds),
    Tag(Vec<u8>),
}

/// Dispatch entry of one compiled node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NodeOp {
    Field {
        read: FieldRead,
        action: Option<ActionId>,
        next: NodeId,
    },
    /// Rule entry; pass-through.
    Sequence { next: NodeId },
    /// Opens a recovery frame when more than one alternative exists.
    Choice { branches: NodeIds },
    /// Loop head; opens the iteration frame.
    Repeat {
        max: Option<u32>,
        body: NodeId,
        exit: NodeId,
    },
    /// End of a non-final choice alternative.
    Commit { owner: NodeId, next: NodeId },
    /// End of one loop iteration.
    Again {
        owner: NodeId,
        max: Option<u32>,
        body: NodeId,
        exit: NodeId,
    },
    Terminal,
}

/// Recovery metadata the compiler attaches to catching constructs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CatchPlan {
    /// Errors in alternative `i` continue at `fallbacks[i]`. The final
    /// alternative has no fallback.
    Alternatives { fallbacks: NodeIds },
    /// Errors in iteration `k >= min` continue at `exit`.
    Iterations { min: u32, exit: NodeId },
}

/// One dispatch table entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompiledNode {
    pub gid: Gid,
    pub op: NodeOp,
    pub catch: Option<CatchPlan>,
}

impl CompiledNode {
    pub fn label(&self) -> &'static str {
        match self.op {
            NodeOp::Field { .. } => "field",
            NodeOp::Sequence { .. } => "sequence",
            NodeOp::Choice { .. } => "choice",
            NodeOp::Repeat { .. } => "repeat",
            NodeOp::Commit { .. } | NodeOp::Again { .. } => "commit",
            NodeOp::Terminal => "terminal",
        }
    }
}

/// A grammar compiled into a resumable state machine.
#[derive(Clone, Debug)]
pub struct CompiledParser {
    pub(crate) name: String,
    pub(crate) nodes: Vec<CompiledNode>,
    pub(crate) debug: Vec<NodeDebugInfo>,
    pub(crate) actions: Vec<String>,
}

impl CompiledParser {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of compiled nodes; identifiers are `1..=len()`.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Identifier execution starts at.
    #[inline]
    pub fn entry(&self) -> NodeId {
        if self.nodes.is_empty() {
            NodeId::EXIT
        } else {
            NodeId::FIRST
        }
    }

    /// Dispatch entry for `id`; `None` for reserved or unknown identifiers.
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&CompiledNode> {
        id.slot().and_then(|slot| self.nodes.get(slot))
    }

    #[inline]
    pub fn catch_plan(&self, id: NodeId) -> Option<&CatchPlan> {
        self.node(id).and_then(|node| node.catch.as_ref())
    }

    #[inline]
    pub fn debug_table(&self) -> &[NodeDebugInfo] {
        &self.debug
    }

    #[inline]
    pub fn debug_info(&self, id: NodeId) -> Option<&NodeDebugInfo> {
        id.slot().and_then(|slot| self.debug.get(slot))
    }

    #[inline]
    pub fn action_name(&self, id: ActionId) -> Option<&str> {
        self.actions.get(id.index()).map(String::as_str)
    }

    /// Identifier assigned to `gid`, if it was reachable.
    pub fn id_of(&self, gid: Gid) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.gid == gid)
            .map(|slot| NodeId::new(slot as u32 + 1))
    }

    /// Identifiers of field nodes named `field`, in identifier order.
    pub fn fields_named<'a>(&'a self, field: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        self.nodes
            .iter()
            .zip(&self.debug)
            .enumerate()
            .filter(move |(_, (node, info))| {
                matches!(node.op, NodeOp::Field { .. }) && info.field == field
            })
            .map(|(slot, _)| NodeId::new(slot as u32 + 1))
    }

    /// Render the debug table, one line per identifier.
    ///
    /// ```text
    /// id    gid   kind      field            rule
    /// 1     0     sequence  <sequence>       pair
    /// 2     1     field     FieldA           pair
    /// ```
    pub fn dump_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<5} {:<5} {:<9} {:<16} rule",
            "id", "gid", "kind", "field"
        );
        for (slot, (node, info)) in self.nodes.iter().zip(&self.debug).enumerate() {
            let _ = writeln!(
                out,
                "{:<5} {:<5} {:<9} {:<16} {}",
                slot + 1,
                node.gid,
                node.label(),
                info.field,
                info.rule
            );
        }
        out
    }
}
