//! Lowering of structured [`Entity`] trees into the flat grammar graph.
//!
//! Lowering is continuation-passing: each entity is lowered knowing the gid
//! execution proceeds to once it completes (`None` = end of grammar), and
//! returns the gid of its own entry node. Every syntactic position gets a
//! fresh gid; alternatives converge on a shared continuation and repetitions
//! close a cycle from their commit node back to the body entry.
//!
//! | Entity | Nodes emitted |
//! |--------|---------------|
//! | field | `Field` → cont |
//! | sequence | `Sequence` → item₀ → … → itemₙ → cont |
//! | choice | `Choice` → alt₀ → `Commit` → cont, …, altₙ → cont |
//! | repeat | `Repeat` → [body → `Commit` → [body, exit], exit] |
//!
//! The final alternative of a choice has no commit: no recovery frame is open
//! while it runs.

use smallvec::{smallvec, SmallVec};

use crate::{Entity, Gid, Grammar, GrammarError, GrammarNode, NodeKind};

/// Builds a [`Grammar`] from an [`Entity`] tree.
pub struct GrammarBuilder {
    grammar: Grammar,
    next_gid: u32,
}

impl GrammarBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        GrammarBuilder {
            grammar: Grammar::new(name),
            next_gid: 0,
        }
    }

    /// Lower `root` and validate the resulting graph.
    pub fn build(mut self, root: &Entity) -> Result<Grammar, GrammarError> {
        let entry = self.lower(root, None, None)?;
        self.grammar.set_root(entry);
        self.grammar.validate()?;
        Ok(self.grammar)
    }

    fn alloc(&mut self, kind: NodeKind, rule: Option<&str>) -> Result<Gid, GrammarError> {
        let gid = Gid::new(self.next_gid);
        self.next_gid += 1;
        let mut node = GrammarNode::new(gid, kind);
        node.rule = rule.map(str::to_string);
        self.grammar.insert(node)?;
        Ok(gid)
    }

    fn set_successors(&mut self, gid: Gid, successors: SmallVec<[Gid; 2]>) {
        if let Some(node) = self.grammar.node_mut(gid) {
            node.successors = successors;
        }
    }

    /// Exit target for constructs that need a concrete node to jump to.
    fn exit_or_terminal(&mut self, cont: Option<Gid>, rule: Option<&str>) -> Result<Gid, GrammarError> {
        match cont {
            Some(gid) => Ok(gid),
            None => self.alloc(NodeKind::Terminal, rule),
        }
    }

    fn lower(
        &mut self,
        entity: &Entity,
        rule: Option<&str>,
        cont: Option<Gid>,
    ) -> Result<Gid, GrammarError> {
        match entity {
            Entity::Field { name, spec, action } => {
                let action = action.as_deref().map(|a| self.grammar.intern_action(a));
                let gid = self.alloc(
                    NodeKind::Field {
                        spec: spec.clone(),
                        action,
                    },
                    rule,
                )?;
                if let Some(node) = self.grammar.node_mut(gid) {
                    node.name = Some(name.clone());
                }
                self.set_successors(gid, cont.into_iter().collect());
                Ok(gid)
            }

            Entity::Sequence { rule: own, items } => {
                let rule = own.as_deref().or(rule);
                let gid = self.alloc(NodeKind::Sequence, rule)?;
                let mut next = cont;
                for item in items.iter().rev() {
                    next = Some(self.lower(item, rule, next)?);
                }
                self.set_successors(gid, next.into_iter().collect());
                Ok(gid)
            }

            Entity::Choice {
                rule: own,
                alternatives,
            } => {
                let rule = own.as_deref().or(rule);
                let Some((last, rest)) = alternatives.split_last() else {
                    return Err(GrammarError::EmptyChoice {
                        rule: rule.unwrap_or("<unknown>").to_string(),
                    });
                };
                let gid = self.alloc(NodeKind::Choice, rule)?;
                let mut entries: SmallVec<[Gid; 2]> = SmallVec::with_capacity(alternatives.len());
                for alt in rest {
                    let commit = self.alloc(NodeKind::Commit { owner: gid }, rule)?;
                    self.set_successors(commit, cont.into_iter().collect());
                    entries.push(self.lower(alt, rule, Some(commit))?);
                }
                entries.push(self.lower(last, rule, cont)?);
                self.set_successors(gid, entries);
                Ok(gid)
            }

            Entity::Repeat {
                rule: own,
                min,
                max,
                body,
            } => {
                let rule = own.as_deref().or(rule);
                self.lower_repeat(rule, *min, *max, body, cont)
            }

            Entity::Optional { body } => self.lower_repeat(rule, 0, Some(1), body, cont),
        }
    }

    fn lower_repeat(
        &mut self,
        rule: Option<&str>,
        min: u32,
        max: Option<u32>,
        body: &Entity,
        cont: Option<Gid>,
    ) -> Result<Gid, GrammarError> {
        if let Some(max) = max {
            if min > max {
                return Err(GrammarError::InvalidBounds {
                    rule: rule.unwrap_or("<unknown>").to_string(),
                    min,
                    max,
                });
            }
        }
        let gid = self.alloc(NodeKind::Repeat { min, max }, rule)?;
        let commit = self.alloc(NodeKind::Commit { owner: gid }, rule)?;
        let exit = self.exit_or_terminal(cont, rule)?;
        let body_entry = self.lower(body, rule, Some(commit))?;
        self.set_successors(gid, smallvec![body_entry, exit]);
        self.set_successors(commit, smallvec![body_entry, exit]);
        Ok(gid)
    }
}
