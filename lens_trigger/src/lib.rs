// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lens Trigger: decides which control-panel sub-panels are visible.
//!
//! Several independent input sources want a say in whether a viewport's
//! control panel shows: pointer hover, keyboard focus, the fold state, the
//! service panel's own "hide panels" button, and an explicit force override.
//! This crate turns a stream of `(source, show | hide)` signals into a
//! deterministic visibility answer.
//!
//! - [`Trigger`] names a single source; [`Triggers`] is a bitmask over them.
//! - [`SubPanel`] owns a static *supported* mask and the set of sources
//!   currently asserting "hide". It is visible iff that set is empty.
//! - [`ControlPanel`] is the aggregate: signals are broadcast to every
//!   sub-panel and [`ControlPanel::has_visible_panels`] reports whether any
//!   sub-panel is showing.
//!
//! ## Combination rule
//!
//! A signal takes effect on a sub-panel only if its source is in the
//! sub-panel's supported mask, or the source is [`Trigger::Force`]:
//!
//! - `hide(t)` adds `t` to the hiding set.
//! - `show(t)` removes `t` from the hiding set.
//! - `show(Force)` clears the hiding set entirely.
//!
//! Overlapping sources are therefore tracked as a true set: a panel hidden by
//! both focus and hover comes back only once both have said "show".
//!
//! ```rust
//! use lens_trigger::{PanelKind, SubPanel, Trigger, Triggers};
//!
//! let mut panel = SubPanel::new(PanelKind::Move, Triggers::MOUSE | Triggers::FOCUS);
//! panel.hide(Trigger::Fold);
//! assert!(panel.is_visible());
//!
//! panel.hide(Trigger::Force);
//! assert!(!panel.is_visible());
//! panel.show(Trigger::Force);
//! assert!(panel.is_visible());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod panel;

pub use panel::{ControlPanel, PanelKind, SubPanel};

bitflags::bitflags! {
    /// A set of trigger sources.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Triggers: u8 {
        /// Pointer hover over the viewport.
        const MOUSE          = 0b0000_0001;
        /// Keyboard focus inside the viewport.
        const FOCUS          = 0b0000_0010;
        /// The viewport's fold state.
        const FOLD           = 0b0000_0100;
        /// The service panel's "hide panels" toggle.
        const SERVICE_HIDING = 0b0000_1000;
        /// Explicit override, honored by every sub-panel.
        const FORCE          = 0b0001_0000;
    }
}

impl Triggers {
    /// Mask honored by a sub-panel with no exclusions.
    pub const DEFAULT_SUPPORTED: Self = Self::MOUSE
        .union(Self::FOCUS)
        .union(Self::FOLD)
        .union(Self::SERVICE_HIDING);
}

impl Default for Triggers {
    fn default() -> Self {
        Self::DEFAULT_SUPPORTED
    }
}

/// A single trigger source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Pointer hover.
    Mouse,
    /// Keyboard focus.
    Focus,
    /// Fold / unfold.
    Fold,
    /// Service panel "hide panels" toggle.
    ServiceHiding,
    /// Explicit override.
    Force,
}

impl Trigger {
    /// Returns the mask bit for this source.
    #[must_use]
    pub const fn flag(self) -> Triggers {
        match self {
            Self::Mouse => Triggers::MOUSE,
            Self::Focus => Triggers::FOCUS,
            Self::Fold => Triggers::FOLD,
            Self::ServiceHiding => Triggers::SERVICE_HIDING,
            Self::Force => Triggers::FORCE,
        }
    }
}
