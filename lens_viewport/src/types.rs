// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identifier types.

use core::fmt;

use lens_doc::{Document, NodeId};

/// Host-chosen identity of a view (a pane, tab, or document window).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view-{}", self.0)
    }
}

/// Engine-assigned identity of a unit. Never reused within an engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub(crate) u32);

impl UnitId {
    /// Returns the raw number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of rendered element a unit wraps.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnitKind {
    /// Vector markup (`svg`).
    Vector,
    /// Anything else, treated as a raster image.
    Raster,
}

impl UnitKind {
    /// Classifies `element` by tag.
    #[must_use]
    pub fn of(doc: &Document, element: NodeId) -> Self {
        match doc.tag(element) {
            Some(tag) if tag.eq_ignore_ascii_case("svg") => Self::Vector,
            _ => Self::Raster,
        }
    }

    /// File extension used for exports.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Vector => "svg",
            Self::Raster => "png",
        }
    }
}
