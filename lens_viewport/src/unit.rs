// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One managed viewport and its lifecycle.
//!
//! Activation wraps the element in place:
//!
//! ```text
//! before:  parent > element
//! after:   parent > container > content > element
//!                             > panel
//! ```
//!
//! The container takes the element's index under the parent, and
//! deactivation puts the element back at that index. The transform is
//! written onto `content` with a top-left origin.

use core::task::Poll;

use kurbo::{Size, Vec2};
use lens_doc::{DocError, Document, NodeId};
use lens_input::{InputConfig, InputEvent, InputHandlers, ViewCommand};
use lens_match::Rule;
use lens_timing::{CancelToken, FrameWait, WaitOutcome};
use lens_transform::{ViewTransform, Viewport};
use lens_trigger::{ControlPanel, PanelKind, Trigger};

use crate::layout::{self, px};
use crate::panel::{self, Direction, PanelAction, PanelView};
use crate::settings::{PanelToggles, Settings};
use crate::{UnitId, UnitKind, ViewId};

/// Element attribute carrying `interactive` or `non-interactive`.
pub const MODE_ATTRIBUTE: &str = "data-lens-mode";
/// Fold state, on the container while active and on the element otherwise.
pub const FOLD_ATTRIBUTE: &str = "data-lens-folded";
/// Present on the container while fullscreen.
pub const FULLSCREEN_ATTRIBUTE: &str = "data-lens-fullscreen";
/// Present on the container while touches pass through to the host.
pub const NATIVE_TOUCH_ATTRIBUTE: &str = "data-lens-native-touch";
/// Prefix shared by every attribute the engine writes.
pub(crate) const ATTRIBUTE_PREFIX: &str = "data-lens-";
/// Class of the node wrapping a unit.
pub const CONTAINER_CLASS: &str = "lens-container";
/// Class of the node carrying the transform.
pub const CONTENT_CLASS: &str = "lens-content";

const TRANSITION: &str = "transform 0.25s ease-out";

/// Where a claimed element sits in the document.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Placement {
    /// The claimed element.
    pub element: NodeId,
    /// Its parent at claim time.
    pub parent: NodeId,
    /// Incremental-render block holding the element, if any.
    pub live_wrapper: Option<NodeId>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Inactive,
    Activating,
    Active,
}

/// A managed interactive viewport wrapping one discovered element.
#[derive(Debug)]
pub struct Unit {
    id: UnitId,
    view: ViewId,
    rule: String,
    toggles: PanelToggles,
    kind: UnitKind,
    element: NodeId,
    original_parent: NodeId,
    live_wrapper: Option<NodeId>,
    container: Option<NodeId>,
    content: Option<NodeId>,
    state: State,
    faded: bool,
    transferred: Vec<String>,
    token: CancelToken,
    wait: Option<FrameWait>,
    natural: Option<Size>,
    viewport: Viewport,
    transition_armed: bool,
    folded: bool,
    fullscreen: bool,
    service_hiding: bool,
    available_width: f64,
    input: InputHandlers,
    panel: ControlPanel,
    panel_view: Option<PanelView>,
}

impl Unit {
    pub(crate) fn new(
        id: UnitId,
        view: ViewId,
        rule: &Rule<PanelToggles>,
        kind: UnitKind,
        placement: Placement,
        input: InputConfig,
    ) -> Self {
        Self {
            id,
            view,
            rule: rule.name.clone(),
            toggles: rule.payload,
            kind,
            element: placement.element,
            original_parent: placement.parent,
            live_wrapper: placement.live_wrapper,
            container: None,
            content: None,
            state: State::Inactive,
            faded: false,
            transferred: Vec::new(),
            token: CancelToken::new(),
            wait: None,
            natural: None,
            viewport: Viewport::new(Size::ZERO, Size::ZERO),
            transition_armed: false,
            folded: false,
            fullscreen: false,
            service_hiding: false,
            available_width: 0.0,
            input: InputHandlers::new(input),
            panel: ControlPanel::new(),
            panel_view: None,
        }
    }

    /// Unit identity.
    #[must_use]
    pub fn id(&self) -> UnitId {
        self.id
    }

    /// View the unit belongs to.
    #[must_use]
    pub fn view(&self) -> ViewId {
        self.view
    }

    /// Name of the rule that claimed the element.
    #[must_use]
    pub fn rule_name(&self) -> &str {
        &self.rule
    }

    /// Vector or raster.
    #[must_use]
    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    /// The wrapped element.
    #[must_use]
    pub fn element(&self) -> NodeId {
        self.element
    }

    /// The element's parent at claim time.
    #[must_use]
    pub fn original_parent(&self) -> NodeId {
        self.original_parent
    }

    /// Wrapper node, while active.
    #[must_use]
    pub fn container(&self) -> Option<NodeId> {
        self.container
    }

    /// Transformed node, while active.
    #[must_use]
    pub fn content(&self) -> Option<NodeId> {
        self.content
    }

    /// Returns `true` from `activate` until `deactivate`, including while
    /// waiting for the first layout.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state != State::Inactive
    }

    /// Returns `true` once measured, with input and panel attached.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == State::Active
    }

    /// Fold state.
    #[must_use]
    pub fn is_folded(&self) -> bool {
        self.folded
    }

    /// Fullscreen state.
    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Returns `true` while touches are left to the host.
    #[must_use]
    pub fn native_touch(&self) -> bool {
        self.input.touch.passthrough()
    }

    /// Returns `true` while a transform transition is running.
    #[must_use]
    pub fn transition_armed(&self) -> bool {
        self.transition_armed
    }

    /// Element size recorded at first measurement.
    #[must_use]
    pub fn natural_size(&self) -> Option<Size> {
        self.natural
    }

    /// Current pan/zoom.
    #[must_use]
    pub fn transform(&self) -> ViewTransform {
        self.viewport.transform()
    }

    /// Geometry and transform.
    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Control panel state.
    #[must_use]
    pub fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    /// Starts activation. Returns `true` if the element was wrapped.
    ///
    /// A second call before `deactivate` does nothing. When the original
    /// parent no longer holds the element, the wrap is skipped with a warning
    /// and the unit stays half-initialized until its session is torn down.
    pub(crate) fn activate(
        &mut self,
        doc: &mut Document,
        settings: &Settings,
        skip_animation: bool,
    ) -> bool {
        if self.state != State::Inactive {
            return false;
        }
        self.state = State::Activating;
        set_attr(doc, self.element, MODE_ATTRIBUTE, "interactive");
        self.folded = match doc.attribute(self.element, FOLD_ATTRIBUTE) {
            Some(v) => v == "true",
            None => settings.fold.folded_by_default,
        };
        if doc.parent(self.element) != Some(self.original_parent) {
            tracing::warn!(
                unit = %self.id,
                view = %self.view,
                "original parent no longer holds the element, leaving it unwrapped"
            );
            return false;
        }
        if !skip_animation {
            set_style(doc, self.original_parent, "opacity", "0");
            self.faded = true;
        }
        if let Err(err) = self.wrap(doc) {
            tracing::warn!(unit = %self.id, view = %self.view, %err, "wrapping failed");
            return false;
        }
        clear_attr(doc, self.element, FOLD_ATTRIBUTE);
        self.token = CancelToken::new();
        self.wait = Some(FrameWait::new(self.token.clone()));
        true
    }

    fn wrap(&mut self, doc: &mut Document) -> Result<(), DocError> {
        let parent = self.original_parent;
        let container = doc.create_element("div");
        self.container = Some(container);
        doc.add_class(container, CONTAINER_CLASS)?;
        doc.set_attribute(container, "tabindex", "0")?;
        doc.set_attribute(container, FOLD_ATTRIBUTE, bool_str(self.folded))?;
        let content = doc.create_element("div");
        self.content = Some(content);
        doc.add_class(content, CONTENT_CLASS)?;
        doc.set_style(content, "transform-origin", "0 0")?;
        if self.kind == UnitKind::Vector {
            self.transferred = doc.take_classes(parent)?;
            for class in &self.transferred {
                doc.add_class(content, class)?;
            }
        }
        doc.replace_child(parent, container, self.element)?;
        doc.append_child(container, content)?;
        doc.append_child(content, self.element)
    }

    /// Polls the layout wait once. Returns `true` when the unit became ready.
    pub(crate) fn poll_ready(&mut self, doc: &mut Document, settings: &Settings) -> bool {
        let Some(wait) = self.wait.as_mut() else {
            return false;
        };
        let nodes = [Some(self.element), self.content, self.container];
        let measured = || {
            nodes
                .iter()
                .all(|n| n.is_some_and(|n| doc.has_geometry(n)))
        };
        match wait.poll(measured) {
            Poll::Pending => false,
            Poll::Ready(WaitOutcome::Ready) => {
                self.wait = None;
                self.finish_activation(doc, settings);
                true
            }
            Poll::Ready(outcome) => {
                tracing::debug!(unit = %self.id, ?outcome, "layout wait ended early");
                self.wait = None;
                false
            }
        }
    }

    /// Returns `true` while waiting for the first layout.
    #[must_use]
    pub(crate) fn is_measuring(&self) -> bool {
        self.wait.is_some()
    }

    fn finish_activation(&mut self, doc: &mut Document, settings: &Settings) {
        if self.natural.is_none() {
            self.natural = Some(doc.rect(self.element).size());
        }
        if self.faded {
            clear_style(doc, self.original_parent, "opacity");
            self.faded = false;
        }
        self.input = InputHandlers::new(settings.input_config());
        self.service_hiding = false;
        self.panel = panel::build(self.toggles, &settings.panels, self.folded);
        if let Some(container) = self.container {
            match PanelView::attach(doc, container, &self.panel) {
                Ok(view) => self.panel_view = Some(view),
                Err(err) => tracing::warn!(unit = %self.id, %err, "control panel not attached"),
            }
        }
        self.state = State::Active;
        self.relayout(doc, settings);
        tracing::debug!(unit = %self.id, view = %self.view, rule = %self.rule, "unit ready");
    }

    /// Undoes activation. Returns `false` if the unit was not active.
    ///
    /// Container and content are destroyed even when the original parent has
    /// been detached or replaced meanwhile; the element survives either way.
    pub(crate) fn deactivate(&mut self, doc: &mut Document) -> bool {
        if self.state == State::Inactive {
            return false;
        }
        self.token.cancel();
        self.wait = None;
        set_attr(doc, self.element, MODE_ATTRIBUTE, "non-interactive");
        self.input.cancel();
        if let Some(view) = self.panel_view.take() {
            view.detach(doc);
        }
        if let Some(container) = self.container.take() {
            let content = self.content.take();
            self.unwrap(doc, container, content);
        }
        set_attr(doc, self.element, FOLD_ATTRIBUTE, bool_str(self.folded));
        if doc.is_alive(self.original_parent) {
            clear_style(doc, self.original_parent, "opacity");
        }
        self.faded = false;
        self.state = State::Inactive;
        self.transition_armed = false;
        self.fullscreen = false;
        self.panel = ControlPanel::new();
        true
    }

    fn unwrap(&mut self, doc: &mut Document, container: NodeId, content: Option<NodeId>) {
        let parent = self.original_parent;
        if doc.parent(container) == Some(parent) {
            if let Err(err) = doc.replace_child(parent, self.element, container) {
                tracing::warn!(unit = %self.id, %err, "could not restore element");
            }
        } else {
            tracing::warn!(
                unit = %self.id,
                view = %self.view,
                "original parent no longer holds the container, dropping it"
            );
            if doc.contains(container, self.element) {
                let _ = doc.detach(self.element);
            }
        }
        for class in core::mem::take(&mut self.transferred) {
            if let Some(content) = content {
                let _ = doc.remove_class(content, &class);
            }
            if let Err(err) = doc.add_class(parent, &class) {
                tracing::debug!(unit = %self.id, %err, class = %class, "class not restored");
            }
        }
        if let Err(err) = doc.destroy(container) {
            tracing::debug!(unit = %self.id, %err, "container already gone");
        }
    }

    /// Re-runs the size resolver and refits.
    pub(crate) fn relayout(&mut self, doc: &mut Document, settings: &Settings) {
        if self.state != State::Active {
            return;
        }
        let Some(container) = self.container else {
            return;
        };
        self.available_width = doc.rect(self.original_parent).width();
        if self.fullscreen {
            return;
        }
        let natural = self.natural.unwrap_or(Size::ZERO);
        let dims = if self.folded {
            settings.dimensions.folded
        } else {
            settings.dimensions.expanded
        };
        let size = layout::resolve(dims, natural, self.available_width);
        set_style(doc, container, "width", &px(size.width));
        set_style(doc, container, "height", &px(size.height));
        if let Some(wrapper) = self.live_wrapper {
            set_style(doc, wrapper, "min-height", &px(size.height));
        }
        self.viewport.set_container_size(size);
        self.viewport.set_content_size(natural);
        self.viewport.fit();
        self.write_transform(doc, false);
    }

    /// Relayouts if the available width changed. Returns whether it did.
    pub(crate) fn check_resize(&mut self, doc: &mut Document, settings: &Settings) -> bool {
        if self.state != State::Active {
            return false;
        }
        let available = doc.rect(self.original_parent).width();
        if available == self.available_width {
            return false;
        }
        tracing::debug!(unit = %self.id, from = self.available_width, to = available, "resized");
        self.relayout(doc, settings);
        true
    }

    fn write_transform(&mut self, doc: &mut Document, animated: bool) {
        let Some(content) = self.content else {
            return;
        };
        if animated {
            if !self.transition_armed {
                set_style(doc, content, "transition", TRANSITION);
                self.transition_armed = true;
            }
        } else if self.transition_armed {
            clear_style(doc, content, "transition");
            self.transition_armed = false;
        }
        set_style(doc, content, "transform", &self.viewport.transform().to_css());
    }

    /// The host reported the end of the running transition.
    pub(crate) fn transition_end(&mut self, doc: &mut Document) {
        if let Some(content) = self.content
            && self.transition_armed
        {
            clear_style(doc, content, "transition");
        }
        self.transition_armed = false;
    }

    /// Feeds a raw event through the input handlers. Returns `true` if it
    /// produced any command.
    pub(crate) fn handle_input(
        &mut self,
        doc: &mut Document,
        settings: &Settings,
        event: &InputEvent,
        now: u64,
    ) -> bool {
        if self.state != State::Active {
            return false;
        }
        let commands = self.input.handle(event, now);
        for &command in &commands {
            self.apply(doc, settings, command);
        }
        !commands.is_empty()
    }

    /// Applies one command.
    pub(crate) fn apply(&mut self, doc: &mut Document, settings: &Settings, command: ViewCommand) {
        match command {
            ViewCommand::Move { delta, animated } => {
                self.viewport.move_by(delta);
                self.write_transform(doc, animated);
            }
            ViewCommand::Zoom { factor, animated } => {
                self.viewport.zoom(factor);
                self.write_transform(doc, animated);
            }
            ViewCommand::ZoomAt {
                anchor,
                factor,
                animated,
            } => {
                self.viewport.zoom_at(anchor, factor);
                self.write_transform(doc, animated);
            }
            ViewCommand::Reset { animated } => {
                self.viewport.fit();
                self.write_transform(doc, animated);
            }
            ViewCommand::Show(trigger) => {
                if settings.panels.triggering.forwards(trigger) {
                    self.signal(doc, trigger, true);
                }
            }
            ViewCommand::Hide(trigger) => {
                if settings.panels.triggering.forwards(trigger) {
                    self.signal(doc, trigger, false);
                }
            }
            ViewCommand::Fold => {
                self.set_folded(doc, settings, true);
            }
            ViewCommand::Unfold => {
                self.set_folded(doc, settings, false);
            }
            ViewCommand::Capture => {}
        }
    }

    /// Translates a transform button into its command.
    pub(crate) fn panel_command(
        &self,
        action: PanelAction,
        settings: &Settings,
    ) -> Option<ViewCommand> {
        let step = settings.input.pan_step;
        let zoom = settings.input.zoom_step;
        Some(match action {
            PanelAction::Move(dir) => {
                let delta = match dir {
                    Direction::Up => Vec2::new(0.0, -step),
                    Direction::Down => Vec2::new(0.0, step),
                    Direction::Left => Vec2::new(-step, 0.0),
                    Direction::Right => Vec2::new(step, 0.0),
                };
                ViewCommand::Move {
                    delta,
                    animated: true,
                }
            }
            PanelAction::ZoomIn => ViewCommand::Zoom {
                factor: zoom,
                animated: true,
            },
            PanelAction::ZoomOut => ViewCommand::Zoom {
                factor: 1.0 / zoom,
                animated: true,
            },
            PanelAction::Reset => ViewCommand::Reset { animated: true },
            PanelAction::ToggleFold if self.folded => ViewCommand::Unfold,
            PanelAction::ToggleFold => ViewCommand::Fold,
            PanelAction::ToggleFullscreen
            | PanelAction::ToggleServiceHiding
            | PanelAction::ToggleNativeTouch => return None,
        })
    }

    /// Returns `true` if the panel carries the sub-panel for `action`.
    #[must_use]
    pub(crate) fn offers(&self, action: PanelAction) -> bool {
        self.state == State::Active && self.panel.get(action.panel()).is_some()
    }

    /// Sends one visibility signal to the control panel.
    pub(crate) fn signal(&mut self, doc: &mut Document, trigger: Trigger, show: bool) -> bool {
        let changed = if show {
            self.panel.show(trigger)
        } else {
            self.panel.hide(trigger)
        };
        if changed && let Some(view) = &self.panel_view {
            view.sync(doc, &self.panel);
        }
        changed
    }

    /// Force-hides or force-shows every sub-panel. Returns `true` if any
    /// sub-panel's visibility changed.
    ///
    /// A force show clears every hiding source, so fold and service hiding
    /// are asserted again while the unit still holds them.
    pub(crate) fn force_panels(&mut self, doc: &mut Document, show: bool) -> bool {
        let before = self.panel.clone();
        if show {
            self.panel.show(Trigger::Force);
            if self.folded {
                self.panel.hide(Trigger::Fold);
            }
            if self.service_hiding {
                self.panel.hide(Trigger::ServiceHiding);
            }
        } else {
            self.panel.hide(Trigger::Force);
        }
        let changed = before
            .iter()
            .any(|p| p.is_visible() != self.panel.is_visible(p.kind()));
        if changed && let Some(view) = &self.panel_view {
            view.sync(doc, &self.panel);
        }
        changed
    }

    /// Folds or unfolds. Returns `true` if the state changed.
    ///
    /// Folding hides every sub-panel except the fold button.
    pub(crate) fn set_folded(
        &mut self,
        doc: &mut Document,
        settings: &Settings,
        folded: bool,
    ) -> bool {
        if self.folded == folded {
            return false;
        }
        self.folded = folded;
        if let Some(container) = self.container {
            set_attr(doc, container, FOLD_ATTRIBUTE, bool_str(folded));
        }
        if self.state == State::Active {
            self.signal(doc, Trigger::Fold, !folded);
            self.relayout(doc, settings);
        }
        true
    }

    /// Flips the service "hide panels" toggle.
    pub(crate) fn toggle_service_hiding(&mut self, doc: &mut Document) {
        self.service_hiding = !self.service_hiding;
        self.signal(doc, Trigger::ServiceHiding, !self.service_hiding);
    }

    /// Returns `true` while the service toggle hides the other sub-panels.
    #[must_use]
    pub fn service_hiding(&self) -> bool {
        self.service_hiding
    }

    /// Hands touches to the host, or takes them back.
    pub(crate) fn set_native_touch(&mut self, doc: &mut Document, on: bool) {
        self.input.touch.set_passthrough(on);
        if let Some(container) = self.container {
            if on {
                set_attr(doc, container, NATIVE_TOUCH_ATTRIBUTE, "");
            } else {
                clear_attr(doc, container, NATIVE_TOUCH_ATTRIBUTE);
            }
        }
    }

    /// The host presented the container fullscreen at `screen` size.
    pub(crate) fn enter_fullscreen(&mut self, doc: &mut Document, screen: Size) {
        self.fullscreen = true;
        if let Some(container) = self.container {
            set_attr(doc, container, FULLSCREEN_ATTRIBUTE, "");
        }
        self.viewport.set_container_size(screen);
        self.viewport.fit();
        self.write_transform(doc, false);
    }

    /// The host left fullscreen.
    pub(crate) fn leave_fullscreen(&mut self, doc: &mut Document, settings: &Settings) {
        self.fullscreen = false;
        if let Some(container) = self.container {
            clear_attr(doc, container, FULLSCREEN_ATTRIBUTE);
        }
        self.relayout(doc, settings);
    }

    /// Returns `true` if the given sub-panel is showing.
    #[must_use]
    pub fn panel_visible(&self, kind: PanelKind) -> bool {
        self.panel.is_visible(kind)
    }
}

fn bool_str(v: bool) -> &'static str {
    if v { "true" } else { "false" }
}

fn set_attr(doc: &mut Document, node: NodeId, name: &str, value: &str) {
    if let Err(err) = doc.set_attribute(node, name, value) {
        tracing::debug!(?node, name, %err, "attribute not written");
    }
}

fn clear_attr(doc: &mut Document, node: NodeId, name: &str) {
    if let Err(err) = doc.remove_attribute(node, name) {
        tracing::debug!(?node, name, %err, "attribute not removed");
    }
}

fn set_style(doc: &mut Document, node: NodeId, property: &str, value: &str) {
    if let Err(err) = doc.set_style(node, property, value) {
        tracing::debug!(?node, property, %err, "style not written");
    }
}

fn clear_style(doc: &mut Document, node: NodeId, property: &str) {
    if let Err(err) = doc.remove_style(node, property) {
        tracing::debug!(?node, property, %err, "style not removed");
    }
}
