//! The grammar graph handed to the compiler.
//!
//! A [`Grammar`] owns its nodes keyed by [`Gid`], the root, and the table of
//! interned action names. It is produced by [`GrammarBuilder`] (or assembled
//! by hand in tests) and checked by [`Grammar::validate`] before compilation.

mod builder;

pub use builder::GrammarBuilder;

use rustc_hash::FxHashMap;

use crate::{ActionId, FieldSpec, Gid, GrammarNode, NodeKind};

/// Structural problems in a grammar graph.
///
/// All of these are configuration errors: they are detected at load time and
/// no parser is produced.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum GrammarError {
    #[error("grammar '{0}' has no root node")]
    MissingRoot(String),
    #[error("duplicate node gid {0}")]
    DuplicateGid(Gid),
    #[error("unknown node to jump to: gid {to} (from gid {from})")]
    UnknownNode { from: Gid, to: Gid },
    #[error("{kind} node gid {gid} expects {expected} successor(s), found {found}")]
    Arity {
        gid: Gid,
        kind: &'static str,
        expected: &'static str,
        found: usize,
    },
    #[error("commit node gid {gid} is owned by gid {owner}, which is not a choice or repeat")]
    BadOwner { gid: Gid, owner: Gid },
    #[error("field '{name}' has unsupported integer width {width} (expected 1..=8)")]
    InvalidWidth { name: String, width: u8 },
    #[error("choice in rule '{rule}' has no alternatives")]
    EmptyChoice { rule: String },
    #[error("repeat in rule '{rule}' has min {min} greater than max {max}")]
    InvalidBounds { rule: String, min: u32, max: u32 },
}

/// A grammar graph.
#[derive(Clone, Debug, Default)]
pub struct Grammar {
    name: String,
    nodes: FxHashMap<Gid, GrammarNode>,
    root: Option<Gid>,
    actions: Vec<String>,
}

impl Grammar {
    pub fn new(name: impl Into<String>) -> Self {
        Grammar {
            name: name.into(),
            ..Grammar::default()
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a node. Gids must be unique within a grammar.
    pub fn insert(&mut self, node: GrammarNode) -> Result<(), GrammarError> {
        if self.nodes.contains_key(&node.gid) {
            return Err(GrammarError::DuplicateGid(node.gid));
        }
        self.nodes.insert(node.gid, node);
        Ok(())
    }

    pub fn set_root(&mut self, gid: Gid) {
        self.root = Some(gid);
    }

    #[inline]
    pub fn root(&self) -> Option<&GrammarNode> {
        self.root.and_then(|gid| self.nodes.get(&gid))
    }

    #[inline]
    pub fn node(&self, gid: Gid) -> Option<&GrammarNode> {
        self.nodes.get(&gid)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, gid: Gid) -> Option<&mut GrammarNode> {
        self.nodes.get_mut(&gid)
    }

    /// Number of registered nodes, reachable or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Intern an action name, returning the existing id if already known.
    pub fn intern_action(&mut self, name: &str) -> ActionId {
        if let Some(idx) = self.actions.iter().position(|a| a == name) {
            return ActionId::new(idx as u32);
        }
        self.actions.push(name.to_string());
        ActionId::new((self.actions.len() - 1) as u32)
    }

    #[inline]
    pub fn action_name(&self, id: ActionId) -> Option<&str> {
        self.actions.get(id.index()).map(String::as_str)
    }

    #[inline]
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    /// Check the graph's local structure.
    ///
    /// Verifies that the root exists, every successor and commit owner
    /// resolves to a registered node, and every node has the successor arity
    /// its kind requires.
    pub fn validate(&self) -> Result<(), GrammarError> {
        if self.root().is_none() {
            return Err(GrammarError::MissingRoot(self.name.clone()));
        }

        for node in self.nodes.values() {
            for &succ in &node.successors {
                if !self.nodes.contains_key(&succ) {
                    return Err(GrammarError::UnknownNode {
                        from: node.gid,
                        to: succ,
                    });
                }
            }
            self.validate_node(node)?;
        }
        Ok(())
    }

    fn validate_node(&self, node: &GrammarNode) -> Result<(), GrammarError> {
        let found = node.successors.len();
        let arity = |expected: &'static str| GrammarError::Arity {
            gid: node.gid,
            kind: node.kind.label(),
            expected,
            found,
        };

        match &node.kind {
            NodeKind::Field { spec, .. } => {
                if let FieldSpec::Uint { width, .. } = spec {
                    if !(1..=8).contains(width) {
                        return Err(GrammarError::InvalidWidth {
                            name: node.name.clone().unwrap_or_default(),
                            width: *width,
                        });
                    }
                }
                if found > 1 {
                    return Err(arity("at most 1"));
                }
            }
            NodeKind::Sequence | NodeKind::Terminal => {
                if found > 1 {
                    return Err(arity("at most 1"));
                }
            }
            NodeKind::Choice => {
                if found == 0 {
                    return Err(arity("at least 1"));
                }
            }
            NodeKind::Repeat { .. } => {
                if found != 2 {
                    return Err(arity("exactly 2"));
                }
            }
            NodeKind::Commit { owner } => {
                let owner_node = self.nodes.get(owner).ok_or(GrammarError::UnknownNode {
                    from: node.gid,
                    to: *owner,
                })?;
                match owner_node.kind {
                    NodeKind::Choice if found > 1 => return Err(arity("at most 1")),
                    NodeKind::Repeat { .. } if found != 2 => return Err(arity("exactly 2")),
                    NodeKind::Choice | NodeKind::Repeat { .. } => {}
                    _ => {
                        return Err(GrammarError::BadOwner {
                            gid: node.gid,
                            owner: *owner,
                        })
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
