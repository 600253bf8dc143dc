//! Identifier newtypes.
//!
//! Three id spaces coexist and must never be mixed:
//! - [`Gid`]: graph identity of a grammar node, assigned by the front end,
//!   stable per syntactic position and independent of traversal order.
//! - [`NodeId`]: dense dispatch key assigned by the compiler, `1..=N`.
//!   `0` is the exit/default slot and [`NodeId::FINISH`] the terminal slot.
//! - [`ActionId`]: index into a grammar's interned action names.

use std::fmt;

/// Graph identity of a grammar node.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Gid(u32);

impl Gid {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Gid(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Gid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gid({})", self.0)
    }
}

impl fmt::Display for Gid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compiled node identifier, the dispatch key at parse time.
///
/// # Reserved values
/// - `NodeId::EXIT` (0): never assigned to a node. Reaching it ends the run.
/// - `NodeId::FINISH` (`u32::MAX`): the distinguished terminal target of every
///   node without successors.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Exit/default slot. A fresh context points here until it is reset.
    pub const EXIT: NodeId = NodeId(0);

    /// Terminal slot reached when the grammar is exhausted.
    pub const FINISH: NodeId = NodeId(u32::MAX);

    /// First identifier handed out by the compiler.
    pub const FIRST: NodeId = NodeId(1);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        NodeId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Slot in the compiled tables, `None` for the reserved identifiers.
    #[inline]
    pub const fn slot(self) -> Option<usize> {
        if self.0 == 0 || self.0 == u32::MAX {
            None
        } else {
            Some(self.0 as usize - 1)
        }
    }

    /// Whether reaching this identifier ends the run normally.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        self.0 == 0 || self.0 == u32::MAX
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            NodeId::EXIT => write!(f, "NodeId::EXIT"),
            NodeId::FINISH => write!(f, "NodeId::FINISH"),
            NodeId(raw) => write!(f, "NodeId({raw})"),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            NodeId::FINISH => write!(f, "FINISH"),
            NodeId(raw) => write!(f, "{raw}"),
        }
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::EXIT
    }
}

/// Interned external action name.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct ActionId(u32);

impl ActionId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        ActionId(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests;
