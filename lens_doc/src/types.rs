// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node handles and tree-editing errors.

/// Identifier for a node in a [`crate::Document`].
///
/// A slot index plus a generation counter. On free, the slot's generation is
/// bumped, so handles to the old node become stale and never alias the next
/// node placed in that slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Raw slot index, useful as a stable key in host-side tables.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Raw generation.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.1
    }
}

/// Tree-editing failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DocError {
    /// The handle does not refer to a live node.
    #[error("node {0:?} is not alive")]
    Stale(NodeId),
    /// The edit would make a node its own ancestor.
    #[error("inserting {child:?} under {parent:?} would create a cycle")]
    WouldCycle {
        /// Intended parent.
        parent: NodeId,
        /// Node being inserted.
        child: NodeId,
    },
    /// The node is not a child of the given parent.
    #[error("{child:?} is not a child of {parent:?}")]
    NotAChild {
        /// Expected parent.
        parent: NodeId,
        /// Node that was expected under it.
        child: NodeId,
    },
    /// The document root cannot be moved or destroyed.
    #[error("the document root cannot be detached")]
    Root,
}
