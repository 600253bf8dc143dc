//! Grammar compilation.
//!
//! Compilation runs in two phases over the grammar graph:
//!
//! 1. **Identifier assignment.** A breadth-first walk from the root hands out
//!    identifiers `1, 2, 3, ...` in first-visit order. A node is expanded at
//!    most once, so cycles closed by repetitions terminate and every reachable
//!    node receives exactly one identifier.
//! 2. **Emission.** Each assigned node becomes a [`CompiledNode`] whose
//!    successors are already resolved to identifiers, plus its
//!    [`NodeDebugInfo`] row. Choices and repetitions carry a [`CatchPlan`].
//!
//! Compiling the same grammar twice yields identical tables.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};
use sieve_ir::{
    FieldSpec, Gid, Grammar, GrammarError, GrammarNode, Length, NodeDebugInfo, NodeId, NodeKind,
};

use crate::parser::{CatchPlan, CompiledNode, CompiledParser, FieldRead, NodeIds, NodeOp};

/// Configuration errors detected while compiling a grammar.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error("unknown node to jump to: gid {to} (from gid {from})")]
    UnknownJumpTarget { from: Gid, to: Gid },
    #[error("commit gid {gid} closes gid {owner}, which is never entered")]
    UnreachableOwner { gid: Gid, owner: Gid },
    #[error("field '{field}' is sized by '{length}', which is not an integer field of this grammar")]
    UnknownLengthField { field: String, length: String },
    #[error("grammar has more nodes than identifiers")]
    TooManyNodes,
    #[error("grammar '{0}' exports no parser")]
    NoParsers(String),
    #[error("grammar '{unit}' exports parser '{parser}' more than once")]
    DuplicateParser { unit: String, parser: String },
}

/// Compile `grammar` into a dispatch table.
#[tracing::instrument(level = "debug", skip_all, fields(grammar = grammar.name()))]
pub fn compile(grammar: &Grammar) -> Result<CompiledParser, CompileError> {
    grammar.validate()?;
    let order = assign_ids(grammar)?;
    let ids: FxHashMap<Gid, NodeId> = order
        .iter()
        .enumerate()
        .map(|(slot, node)| (node.gid, NodeId::new(slot as u32 + 1)))
        .collect();

    let debug: Vec<NodeDebugInfo> = order.iter().map(|node| NodeDebugInfo::of(node)).collect();
    let mut nodes = Vec::with_capacity(order.len());
    for node in &order {
        nodes.push(emit(grammar, node, &ids, &order)?);
    }

    tracing::debug!(
        nodes = nodes.len(),
        registered = grammar.len(),
        "compiled grammar"
    );
    Ok(CompiledParser {
        name: grammar.name().to_string(),
        nodes,
        debug,
        actions: grammar.actions().to_vec(),
    })
}

/// Phase 1: breadth-first walk from the root, in first-visit order.
fn assign_ids(grammar: &Grammar) -> Result<Vec<&GrammarNode>, CompileError> {
    let root = grammar
        .root()
        .ok_or_else(|| GrammarError::MissingRoot(grammar.name().to_string()))?;

    let mut seen: FxHashSet<Gid> = FxHashSet::default();
    let mut order = Vec::new();
    let mut frontier = VecDeque::from([root]);

    while let Some(node) = frontier.pop_front() {
        if !seen.insert(node.gid) {
            continue;
        }
        // NodeId::FINISH is reserved; the last usable identifier is MAX - 1.
        if order.len() >= (u32::MAX - 1) as usize {
            return Err(CompileError::TooManyNodes);
        }
        order.push(node);
        for &succ in &node.successors {
            let next = grammar
                .node(succ)
                .ok_or(CompileError::UnknownJumpTarget {
                    from: node.gid,
                    to: succ,
                })?;
            frontier.push_back(next);
        }
    }
    Ok(order)
}

/// Phase 2: one dispatch entry per assigned node.
fn emit(
    grammar: &Grammar,
    node: &GrammarNode,
    ids: &FxHashMap<Gid, NodeId>,
    order: &[&GrammarNode],
) -> Result<CompiledNode, CompileError> {
    let resolve = |to: Gid| {
        ids.get(&to).copied().ok_or(CompileError::UnknownJumpTarget {
            from: node.gid,
            to,
        })
    };
    let successor = |index: usize| match node.successors.get(index) {
        Some(&gid) => resolve(gid),
        None => Ok(NodeId::FINISH),
    };

    let (op, catch) = match &node.kind {
        NodeKind::Field { spec, action } => {
            let read = field_read(node, spec, ids, order)?;
            (
                NodeOp::Field {
                    read,
                    action: *action,
                    next: successor(0)?,
                },
                None,
            )
        }
        NodeKind::Sequence => (NodeOp::Sequence { next: successor(0)? }, None),
        NodeKind::Terminal => (NodeOp::Terminal, None),
        NodeKind::Choice => {
            let branches = node
                .successors
                .iter()
                .map(|&gid| resolve(gid))
                .collect::<Result<NodeIds, _>>()?;
            let catch = (branches.len() > 1).then(|| CatchPlan::Alternatives {
                fallbacks: branches[1..].iter().copied().collect(),
            });
            (NodeOp::Choice { branches }, catch)
        }
        NodeKind::Repeat { min, max } => {
            let exit = successor(1)?;
            (
                NodeOp::Repeat {
                    max: *max,
                    body: successor(0)?,
                    exit,
                },
                Some(CatchPlan::Iterations { min: *min, exit }),
            )
        }
        NodeKind::Commit { owner } => {
            let owner_id = ids
                .get(owner)
                .copied()
                .ok_or(CompileError::UnreachableOwner {
                    gid: node.gid,
                    owner: *owner,
                })?;
            let op = match grammar.node(*owner).map(|o| &o.kind) {
                Some(NodeKind::Repeat { max, .. }) => NodeOp::Again {
                    owner: owner_id,
                    max: *max,
                    body: successor(0)?,
                    exit: successor(1)?,
                },
                _ => NodeOp::Commit {
                    owner: owner_id,
                    next: successor(0)?,
                },
            };
            (op, None)
        }
    };

    Ok(CompiledNode {
        gid: node.gid,
        op,
        catch,
    })
}

fn field_read(
    node: &GrammarNode,
    spec: &FieldSpec,
    ids: &FxHashMap<Gid, NodeId>,
    order: &[&GrammarNode],
) -> Result<FieldRead, CompileError> {
    Ok(match spec {
        FieldSpec::Uint { width, endian } => FieldRead::Uint {
            width: *width,
            endian: *endian,
        },
        FieldSpec::Bytes {
            len: Length::Fixed(len),
        } => FieldRead::Bytes(*len),
        FieldSpec::Tag { bytes } => FieldRead::Tag(bytes.clone()),
        FieldSpec::Bytes {
            len: Length::Field(length),
        } => {
            let sources: NodeIds = order
                .iter()
                .filter(|candidate| {
                    candidate.name.as_deref() == Some(length.as_str())
                        && matches!(
                            candidate.kind,
                            NodeKind::Field {
                                spec: FieldSpec::Uint { .. },
                                ..
                            }
                        )
                })
                .filter_map(|candidate| ids.get(&candidate.gid).copied())
                .collect();
            if sources.is_empty() {
                return Err(CompileError::UnknownLengthField {
                    field: node.name.clone().unwrap_or_default(),
                    length: length.clone(),
                });
            }
            FieldRead::SizedBy(sources)
        }
    })
}
