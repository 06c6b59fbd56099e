// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mutation records and observer bookkeeping.

use alloc::string::String;
use alloc::vec::Vec;

use smallvec::SmallVec;

use crate::NodeId;

/// Handle to a registered observer.
///
/// Generational like [`NodeId`]: disconnecting bumps the slot generation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ObserverId(pub(crate) u32, pub(crate) u32);

/// What an observer wants to hear about.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ObserveOptions {
    /// Observe every descendant of the target, not only the target itself.
    pub subtree: bool,
    /// Also record attribute changes.
    pub attributes: bool,
}

impl ObserveOptions {
    /// Child-list changes on the target only.
    #[must_use]
    pub const fn children() -> Self {
        Self {
            subtree: false,
            attributes: false,
        }
    }

    /// Child-list changes anywhere under the target.
    #[must_use]
    pub const fn subtree() -> Self {
        Self {
            subtree: true,
            attributes: false,
        }
    }
}

/// Kind of change described by a [`MutationRecord`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationKind {
    /// Children were added to and/or removed from the target.
    ChildList,
    /// An attribute (or class list, reported as `class`) of the target changed.
    Attribute(String),
    /// The target's text payload changed.
    Text,
}

/// One recorded change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationRecord {
    /// What changed.
    pub kind: MutationKind,
    /// Node whose children, attributes, or text changed.
    pub target: NodeId,
    /// Nodes inserted under `target`, in insertion order.
    pub added: SmallVec<[NodeId; 2]>,
    /// Nodes removed from `target`.
    pub removed: SmallVec<[NodeId; 2]>,
}

impl MutationRecord {
    pub(crate) fn child_list(target: NodeId, added: &[NodeId], removed: &[NodeId]) -> Self {
        Self {
            kind: MutationKind::ChildList,
            target,
            added: SmallVec::from_slice(added),
            removed: SmallVec::from_slice(removed),
        }
    }

    pub(crate) fn attribute(target: NodeId, name: &str) -> Self {
        Self {
            kind: MutationKind::Attribute(name.into()),
            target,
            added: SmallVec::new(),
            removed: SmallVec::new(),
        }
    }

    pub(crate) fn text(target: NodeId) -> Self {
        Self {
            kind: MutationKind::Text,
            target,
            added: SmallVec::new(),
            removed: SmallVec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ObserverSlot {
    pub(crate) generation: u32,
    pub(crate) state: Option<ObserverState>,
}

#[derive(Clone, Debug)]
pub(crate) struct ObserverState {
    pub(crate) target: NodeId,
    pub(crate) options: ObserveOptions,
    pub(crate) queue: Vec<MutationRecord>,
}

impl ObserverState {
    pub(crate) fn wants(&self, record: &MutationRecord) -> bool {
        !matches!(record.kind, MutationKind::Attribute(_)) || self.options.attributes
    }
}
