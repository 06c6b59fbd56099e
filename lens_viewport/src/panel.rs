// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Control panel construction and its mirror in the document.

use lens_doc::{DocError, Document, NodeId};
use lens_trigger::{ControlPanel, PanelKind, SubPanel, Trigger};

use crate::settings::{PanelSettings, PanelToggles, Triggering};

/// Attribute naming a sub-panel node's kind.
pub const PANEL_ATTRIBUTE: &str = "data-lens-panel";

/// Buttons a control panel offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelAction {
    /// Pan one step.
    Move(Direction),
    /// Zoom in one step around the container center.
    ZoomIn,
    /// Zoom out one step around the container center.
    ZoomOut,
    /// Fit content to the container.
    Reset,
    /// Fold if expanded, unfold if folded.
    ToggleFold,
    /// Enter or leave fullscreen.
    ToggleFullscreen,
    /// Hide or show the other sub-panels.
    ToggleServiceHiding,
    /// Hand touches to the host or take them back.
    ToggleNativeTouch,
}

impl PanelAction {
    /// The sub-panel carrying this button.
    #[must_use]
    pub fn panel(self) -> PanelKind {
        match self {
            Self::Move(_) => PanelKind::Move,
            Self::ZoomIn | Self::ZoomOut | Self::Reset => PanelKind::Zoom,
            Self::ToggleFold => PanelKind::Fold,
            Self::ToggleFullscreen | Self::ToggleServiceHiding | Self::ToggleNativeTouch => {
                PanelKind::Service
            }
        }
    }
}

/// Pan direction of a move button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Toward negative y.
    Up,
    /// Toward positive y.
    Down,
    /// Toward negative x.
    Left,
    /// Toward positive x.
    Right,
}

impl Triggering {
    /// Returns `true` if hover or focus signals for `trigger` reach the panel.
    #[must_use]
    pub fn forwards(self, trigger: Trigger) -> bool {
        match trigger {
            Trigger::Mouse => self == Self::Hover,
            Trigger::Focus => self == Self::Focus,
            Trigger::Fold | Trigger::ServiceHiding | Trigger::Force => true,
        }
    }

    fn trigger(self) -> Option<Trigger> {
        match self {
            Self::Always => None,
            Self::Hover => Some(Trigger::Mouse),
            Self::Focus => Some(Trigger::Focus),
        }
    }
}

/// Builds a unit's control panel.
///
/// Under a hover or focus policy the panel starts hidden by that trigger,
/// so only the policy's own "show" brings the move and zoom buttons up.
#[must_use]
pub fn build(toggles: PanelToggles, settings: &PanelSettings, folded: bool) -> ControlPanel {
    let mut panel = ControlPanel::new();
    let ignore = settings.service_ignores_external_triggers;
    for (kind, on) in [
        (PanelKind::Move, toggles.movement),
        (PanelKind::Zoom, toggles.zoom),
        (PanelKind::Fold, toggles.fold),
        (PanelKind::Service, toggles.service),
    ] {
        if on {
            panel.insert(SubPanel::with_default_mask(kind, ignore));
        }
    }
    if let Some(trigger) = settings.triggering.trigger() {
        panel.hide(trigger);
    }
    if folded {
        panel.hide(Trigger::Fold);
    }
    panel
}

/// Nodes mirroring a [`ControlPanel`] inside a unit's container.
#[derive(Clone, Debug)]
pub struct PanelView {
    root: NodeId,
    panels: Vec<(PanelKind, NodeId)>,
}

impl PanelView {
    /// Creates the panel nodes under `container`.
    pub fn attach(
        doc: &mut Document,
        container: NodeId,
        panel: &ControlPanel,
    ) -> Result<Self, DocError> {
        let root = doc.create_element("div");
        doc.add_class(root, "lens-panel")?;
        let mut panels = Vec::new();
        for sub in panel.iter() {
            let node = doc.create_element("div");
            doc.add_class(node, "lens-subpanel")?;
            doc.set_attribute(node, PANEL_ATTRIBUTE, kind_name(sub.kind()))?;
            doc.append_child(root, node)?;
            panels.push((sub.kind(), node));
        }
        doc.append_child(container, root)?;
        let view = Self { root, panels };
        view.sync(doc, panel);
        Ok(view)
    }

    /// Root node of the panel.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node of one sub-panel.
    #[must_use]
    pub fn node(&self, kind: PanelKind) -> Option<NodeId> {
        self.panels
            .iter()
            .find_map(|&(k, node)| (k == kind).then_some(node))
    }

    /// Writes current visibility as `hidden` attributes.
    pub fn sync(&self, doc: &mut Document, panel: &ControlPanel) {
        for &(kind, node) in &self.panels {
            set_hidden(doc, node, !panel.is_visible(kind));
        }
        set_hidden(doc, self.root, !panel.has_visible_panels());
    }

    /// Removes the panel nodes.
    pub fn detach(self, doc: &mut Document) {
        // Already gone with a destroyed container.
        let _ = doc.destroy(self.root);
    }
}

fn set_hidden(doc: &mut Document, node: NodeId, hidden: bool) {
    let res = if hidden {
        doc.set_attribute(node, "hidden", "")
    } else {
        doc.remove_attribute(node, "hidden").map(drop)
    };
    if let Err(err) = res {
        tracing::debug!(?node, %err, "panel node vanished");
    }
}

fn kind_name(kind: PanelKind) -> &'static str {
    match kind {
        PanelKind::Move => "move",
        PanelKind::Zoom => "zoom",
        PanelKind::Fold => "fold",
        PanelKind::Service => "service",
    }
}
