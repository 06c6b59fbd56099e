// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sub-panels and the aggregate control panel.

use alloc::vec::Vec;

use crate::{Trigger, Triggers};

/// The sub-panels a viewport control panel can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PanelKind {
    /// Directional pan buttons.
    Move,
    /// Zoom in / out / reset buttons.
    Zoom,
    /// Fold / unfold button.
    Fold,
    /// Fullscreen, "hide panels", and touch passthrough buttons.
    Service,
}

impl PanelKind {
    /// Returns the trigger sources this kind of sub-panel honors.
    ///
    /// - `Fold` honors nothing but [`Trigger::Force`]; it must stay reachable
    ///   so a folded viewport can always be unfolded.
    /// - `Service` never hides itself through [`Triggers::SERVICE_HIDING`],
    ///   since it is the source of that trigger. With `ignore_external` it also
    ///   ignores hover and focus.
    /// - `Move` and `Zoom` honor the full default mask.
    #[must_use]
    pub fn supported_triggers(self, ignore_external: bool) -> Triggers {
        match self {
            Self::Move | Self::Zoom => Triggers::DEFAULT_SUPPORTED,
            Self::Fold => Triggers::DEFAULT_SUPPORTED
                - Triggers::FOLD
                - Triggers::SERVICE_HIDING
                - Triggers::FOCUS
                - Triggers::MOUSE,
            Self::Service => {
                let mut mask = Triggers::DEFAULT_SUPPORTED - Triggers::SERVICE_HIDING;
                if ignore_external {
                    mask -= Triggers::MOUSE | Triggers::FOCUS;
                }
                mask
            }
        }
    }
}

/// One sub-panel's visibility state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubPanel {
    kind: PanelKind,
    supported: Triggers,
    hiding: Triggers,
}

impl SubPanel {
    /// Creates a visible sub-panel honoring `supported`.
    ///
    /// [`Triggers::FORCE`] in `supported` is redundant; force is always honored.
    #[must_use]
    pub fn new(kind: PanelKind, supported: Triggers) -> Self {
        Self {
            kind,
            supported,
            hiding: Triggers::empty(),
        }
    }

    /// Creates a sub-panel with the mask from [`PanelKind::supported_triggers`].
    #[must_use]
    pub fn with_default_mask(kind: PanelKind, ignore_external: bool) -> Self {
        Self::new(kind, kind.supported_triggers(ignore_external))
    }

    /// Returns the sub-panel kind.
    #[must_use]
    pub fn kind(&self) -> PanelKind {
        self.kind
    }

    /// Returns the supported mask.
    #[must_use]
    pub fn supported(&self) -> Triggers {
        self.supported
    }

    /// Returns the sources currently asserting "hide".
    #[must_use]
    pub fn hiding(&self) -> Triggers {
        self.hiding
    }

    /// Returns `true` if a signal from `trigger` takes effect on this sub-panel.
    #[must_use]
    pub fn honors(&self, trigger: Trigger) -> bool {
        trigger == Trigger::Force || self.supported.contains(trigger.flag())
    }

    /// Returns `true` when no source is asserting "hide".
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.hiding.is_empty()
    }

    /// Asserts "hide" from `trigger`. Returns `true` if visibility changed.
    pub fn hide(&mut self, trigger: Trigger) -> bool {
        if !self.honors(trigger) {
            return false;
        }
        let was_visible = self.is_visible();
        self.hiding |= trigger.flag();
        was_visible != self.is_visible()
    }

    /// Withdraws "hide" from `trigger`. Returns `true` if visibility changed.
    ///
    /// `show(Force)` clears every hiding source.
    pub fn show(&mut self, trigger: Trigger) -> bool {
        if !self.honors(trigger) {
            return false;
        }
        let was_visible = self.is_visible();
        if trigger == Trigger::Force {
            self.hiding = Triggers::empty();
        } else {
            self.hiding -= trigger.flag();
        }
        was_visible != self.is_visible()
    }
}

/// The aggregate control panel of one viewport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ControlPanel {
    panels: Vec<SubPanel>,
}

impl ControlPanel {
    /// Creates an empty control panel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a sub-panel.
    pub fn insert(&mut self, panel: SubPanel) {
        if let Some(existing) = self.panels.iter_mut().find(|p| p.kind == panel.kind) {
            *existing = panel;
        } else {
            self.panels.push(panel);
        }
    }

    /// Returns the sub-panel of the given kind.
    #[must_use]
    pub fn get(&self, kind: PanelKind) -> Option<&SubPanel> {
        self.panels.iter().find(|p| p.kind == kind)
    }

    /// Returns the sub-panel of the given kind, mutably.
    pub fn get_mut(&mut self, kind: PanelKind) -> Option<&mut SubPanel> {
        self.panels.iter_mut().find(|p| p.kind == kind)
    }

    /// Iterates the sub-panels in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SubPanel> {
        self.panels.iter()
    }

    /// Broadcasts `hide(trigger)`. Returns `true` if any sub-panel changed.
    pub fn hide(&mut self, trigger: Trigger) -> bool {
        self.panels
            .iter_mut()
            .fold(false, |changed, p| p.hide(trigger) | changed)
    }

    /// Broadcasts `show(trigger)`. Returns `true` if any sub-panel changed.
    pub fn show(&mut self, trigger: Trigger) -> bool {
        self.panels
            .iter_mut()
            .fold(false, |changed, p| p.show(trigger) | changed)
    }

    /// Returns `true` if any sub-panel is visible.
    #[must_use]
    pub fn has_visible_panels(&self) -> bool {
        self.panels.iter().any(SubPanel::is_visible)
    }

    /// Returns `true` if the given sub-panel exists and is visible.
    #[must_use]
    pub fn is_visible(&self, kind: PanelKind) -> bool {
        self.get(kind).is_some_and(SubPanel::is_visible)
    }
}
