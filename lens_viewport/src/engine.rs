// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine: the single context object holding sessions, units, and queues.

use hashbrown::HashMap;
use lens_doc::{Document, NodeId};
use lens_input::InputEvent;
use lens_match::{Claim, RuleSet, is_claimed, release};
use lens_timing::{Microtasks, TimerQueue};

use crate::actions::{self, ActionOutcome, ContextAction};
use crate::discovery::{Lifetimes, RenderMode, Session, TimerTask};
use crate::host::{EngineHooks, HostBoundary};
use crate::panel::PanelAction;
use crate::settings::{PanelToggles, Settings};
use crate::unit::{Placement, Unit};
use crate::{ConfigError, UnitId, UnitKind, ViewId};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Task {
    Activate(UnitId),
}

/// Turns discovered elements of a host document into interactive viewports.
///
/// The host mirrors its rendered tree into [`Engine::document_mut`], reports
/// view lifecycle through [`Engine::open_view`] and friends, forwards input
/// with [`Engine::dispatch`], and calls [`Engine::tick`] once per animation
/// frame with the current time in milliseconds.
pub struct Engine {
    settings: Settings,
    rules: RuleSet<PanelToggles>,
    doc: Document,
    hooks: Option<Box<dyn EngineHooks>>,
    sessions: HashMap<ViewId, Session>,
    units: HashMap<UnitId, Unit>,
    next_unit: u32,
    timers: TimerQueue<TimerTask>,
    microtasks: Microtasks<Task>,
    active_view: Option<ViewId>,
    now: u64,
}

impl core::fmt::Debug for Engine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Engine")
            .field("sessions", &self.sessions.len())
            .field("units", &self.units.len())
            .field("timers", &self.timers.len())
            .field("microtasks", &self.microtasks.len())
            .field("active_view", &self.active_view)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Creates an engine with an empty document.
    pub fn new(settings: Settings) -> Result<Self, ConfigError> {
        Self::with_document(settings, Document::new())
    }

    /// Creates an engine over an existing document mirror.
    pub fn with_document(settings: Settings, doc: Document) -> Result<Self, ConfigError> {
        settings.validate()?;
        let rules = settings.rule_set()?;
        Ok(Self {
            settings,
            rules,
            doc,
            hooks: None,
            sessions: HashMap::new(),
            units: HashMap::new(),
            next_unit: 1,
            timers: TimerQueue::new(),
            microtasks: Microtasks::new(),
            active_view: None,
            now: 0,
        })
    }

    /// The settings in effect.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The document mirror.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// The document mirror, for the host to update.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Installs bookkeeping hooks.
    pub fn set_hooks(&mut self, hooks: Box<dyn EngineHooks>) {
        self.hooks = Some(hooks);
    }

    /// Time of the last [`Engine::tick`].
    #[must_use]
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Earliest pending observer expiry, for hosts that sleep between frames.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    fn lifetimes(&self) -> Lifetimes {
        Lifetimes {
            static_ms: self.settings.discovery.static_timeout_ms,
            block_ms: self.settings.discovery.block_timeout_ms,
        }
    }

    /// Starts discovery for `view` under `root`. Reopening a view tears the
    /// previous session down first.
    pub fn open_view(&mut self, view: ViewId, root: NodeId, mode: RenderMode) {
        if self.sessions.contains_key(&view) {
            self.close_view(view);
        }
        let lifetimes = self.lifetimes();
        let (session, scan) = Session::open(
            view,
            root,
            mode,
            &mut self.doc,
            &mut self.timers,
            lifetimes,
            self.now,
        );
        tracing::debug!(%view, ?mode, "view opened");
        self.sessions.insert(view, session);
        for subtree in scan {
            self.scan(view, subtree);
        }
    }

    /// Tears down every unit of `view`, restoring the document, and stops
    /// its observers. Returns `false` for unknown views.
    pub fn close_view(&mut self, view: ViewId) -> bool {
        let Some(mut session) = self.sessions.remove(&view) else {
            return false;
        };
        session.stop(&mut self.doc);
        self.timers.cancel_where(|t| t.view() == view);
        let units = core::mem::take(&mut session.units);
        self.microtasks
            .discard_where(|Task::Activate(id)| units.contains(id));
        for id in &units {
            if let Some(mut unit) = self.units.remove(id) {
                unit.deactivate(&mut self.doc);
                release(&mut self.doc, unit.element());
            }
        }
        if self.active_view == Some(view) {
            self.active_view = None;
        }
        tracing::debug!(%view, units = units.len(), "view closed");
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.on_units_cleared_for_view(view);
        }
        true
    }

    /// The view's source content changed: tear its units down and rediscover.
    pub fn source_changed(&mut self, view: ViewId) {
        let Some((root, mode)) = self.sessions.get(&view).map(|s| (s.root, s.mode)) else {
            return;
        };
        let was_active = self.active_view == Some(view);
        self.close_view(view);
        self.open_view(view, root, mode);
        if was_active {
            self.active_view = Some(view);
        }
    }

    /// Marks the view whose units [`Engine::toggle_all_panels`] acts on.
    pub fn set_active_view(&mut self, view: Option<ViewId>) {
        self.active_view = view;
    }

    /// The active view.
    #[must_use]
    pub fn active_view(&self) -> Option<ViewId> {
        self.active_view
    }

    /// Makes `node` interactive right away, without observation.
    ///
    /// Views without a session get a [`RenderMode::Direct`] one rooted at the
    /// document root. Returns the existing unit if `node` already has one.
    pub fn pick(&mut self, view: ViewId, node: NodeId) -> Option<UnitId> {
        if let Some(existing) = self.unit_for_element(node) {
            return Some(existing);
        }
        if !self.sessions.contains_key(&view) {
            let root = self.doc.root();
            self.open_view(view, root, RenderMode::Direct);
        }
        let id = self.process_candidate(view, node)?;
        if let Some(unit) = self.units.get_mut(&id) {
            unit.activate(&mut self.doc, &self.settings, true);
        }
        Some(id)
    }

    fn unit_for_element(&self, node: NodeId) -> Option<UnitId> {
        self.units
            .values()
            .find_map(|u| (u.element() == node).then_some(u.id()))
    }

    /// Advances the engine to `now` (milliseconds): expires observers,
    /// processes mutation batches, runs deferred activations, polls layout
    /// waits, and checks for resizes.
    pub fn tick(&mut self, now: u64) {
        self.now = self.now.max(now);
        for task in self.timers.pop_due(self.now) {
            let TimerTask::Expire { view, observer } = task;
            if let Some(session) = self.sessions.get_mut(&view) {
                session.expire(&mut self.doc, observer);
                tracing::debug!(%view, "observer expired");
            }
        }

        let lifetimes = self.lifetimes();
        for view in self.view_ids() {
            let Some(session) = self.sessions.get_mut(&view) else {
                continue;
            };
            let batch = session.collect(&mut self.doc, &mut self.timers, lifetimes, self.now);
            if !batch.had_records {
                continue;
            }
            for subtree in batch.roots {
                self.scan(view, subtree);
            }
            self.retry_deferred(view);
        }

        while let Some(Task::Activate(id)) = self.microtasks.next_task() {
            if let Some(unit) = self.units.get_mut(&id) {
                unit.activate(&mut self.doc, &self.settings, false);
            }
        }

        for id in self.unit_ids() {
            if let Some(unit) = self.units.get_mut(&id)
                && unit.is_measuring()
            {
                unit.poll_ready(&mut self.doc, &self.settings);
            }
        }

        for id in self.unit_ids() {
            if let Some(unit) = self.units.get_mut(&id) {
                unit.check_resize(&mut self.doc, &self.settings);
            }
        }
    }

    fn view_ids(&self) -> Vec<ViewId> {
        let mut ids: Vec<_> = self.sessions.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn unit_ids(&self) -> Vec<UnitId> {
        let mut ids: Vec<_> = self.units.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn scan(&mut self, view: ViewId, subtree: NodeId) {
        for node in self.rules.candidates(&self.doc, subtree) {
            if let Some(id) = self.process_candidate(view, node) {
                self.microtasks.defer(Task::Activate(id));
            }
        }
    }

    fn retry_deferred(&mut self, view: ViewId) {
        let Some(session) = self.sessions.get_mut(&view) else {
            return;
        };
        let root = session.root;
        let pending = core::mem::take(&mut session.deferred);
        for node in pending {
            if !self.doc.contains(root, node) {
                continue;
            }
            if let Some(id) = self.process_candidate(view, node) {
                self.microtasks.defer(Task::Activate(id));
            }
        }
    }

    /// Claims `node` for `view` and creates its unit. Activation is up to
    /// the caller.
    fn process_candidate(&mut self, view: ViewId, node: NodeId) -> Option<UnitId> {
        let session = self.sessions.get_mut(&view)?;
        if !self.doc.contains(session.root, node) {
            tracing::debug!(%view, ?node, "candidate outside the view");
            return None;
        }
        let rule = match self.rules.claim(&mut self.doc, node) {
            Claim::Claimed(rule) => rule,
            Claim::NoGeometry => {
                tracing::debug!(%view, ?node, "candidate not laid out yet, deferring");
                if !session.deferred.contains(&node) {
                    session.deferred.push(node);
                }
                return None;
            }
            other => {
                tracing::debug!(%view, ?node, outcome = ?other, "candidate skipped");
                return None;
            }
        };
        let parent = self.doc.parent(node)?;
        let id = UnitId(self.next_unit);
        self.next_unit += 1;
        let placement = Placement {
            element: node,
            parent,
            live_wrapper: session.live_wrapper(&self.doc, node),
        };
        let kind = UnitKind::of(&self.doc, node);
        let unit = Unit::new(id, view, rule, kind, placement, self.settings.input_config());
        tracing::debug!(%view, unit = %id, rule = %rule.name, "unit created");
        session.units.push(id);
        self.units.insert(id, unit);
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.on_unit_created(view, id);
        }
        Some(id)
    }

    /// Feeds an input event to a unit. Returns `true` if it was handled and
    /// the host should suppress its default behavior.
    pub fn dispatch(&mut self, unit: UnitId, event: &InputEvent, now: u64) -> bool {
        let Some(u) = self.units.get_mut(&unit) else {
            return false;
        };
        u.handle_input(&mut self.doc, &self.settings, event, now)
    }

    /// Runs a control-panel button.
    pub fn panel_action(
        &mut self,
        unit: UnitId,
        action: PanelAction,
        host: &mut dyn HostBoundary,
    ) -> ActionOutcome {
        let Some(u) = self.units.get_mut(&unit) else {
            return ActionOutcome::Ignored;
        };
        if !u.offers(action) {
            return ActionOutcome::Ignored;
        }
        if let Some(command) = u.panel_command(action, &self.settings) {
            u.apply(&mut self.doc, &self.settings, command);
            return ActionOutcome::Done;
        }
        match action {
            PanelAction::ToggleServiceHiding => {
                if !self.settings.panels.hiding_button {
                    return ActionOutcome::Ignored;
                }
                u.toggle_service_hiding(&mut self.doc);
                ActionOutcome::Done
            }
            PanelAction::ToggleNativeTouch => {
                let on = !u.native_touch();
                u.set_native_touch(&mut self.doc, on);
                ActionOutcome::Done
            }
            PanelAction::ToggleFullscreen => {
                let result = if u.is_fullscreen() {
                    host.exit_fullscreen().map(|()| {
                        u.leave_fullscreen(&mut self.doc, &self.settings);
                    })
                } else {
                    match u.container() {
                        Some(container) => host
                            .request_fullscreen(container)
                            .map(|screen| u.enter_fullscreen(&mut self.doc, screen)),
                        None => return ActionOutcome::Ignored,
                    }
                };
                match result {
                    Ok(()) => ActionOutcome::Done,
                    Err(err) => {
                        tracing::error!(unit = %unit, error = %err, "fullscreen toggle failed");
                        host.notice(&format!("Could not toggle fullscreen: {err}"));
                        ActionOutcome::Failed(err)
                    }
                }
            }
            _ => ActionOutcome::Ignored,
        }
    }

    /// The host saw the content's transition end.
    pub fn transition_end(&mut self, unit: UnitId) {
        if let Some(u) = self.units.get_mut(&unit) {
            u.transition_end(&mut self.doc);
        }
    }

    /// Flips every control panel of the active view with a forced signal:
    /// panels with anything visible are hidden, fully hidden ones are shown.
    /// Folded units keep only their fold button after a forced show.
    /// Returns how many units changed.
    pub fn toggle_all_panels(&mut self) -> usize {
        let Some(session) = self.active_view.and_then(|v| self.sessions.get(&v)) else {
            return 0;
        };
        let mut changed = 0;
        for id in &session.units {
            let Some(u) = self.units.get_mut(id) else {
                continue;
            };
            if !u.is_ready() {
                continue;
            }
            let show = !u.panel().has_visible_panels();
            if u.force_panels(&mut self.doc, show) {
                changed += 1;
            }
        }
        changed
    }

    /// Runs a context-menu action. Failures are reported to the user through
    /// the host and logged, never returned as errors.
    pub fn context_action(
        &mut self,
        unit: UnitId,
        action: ContextAction,
        host: &mut dyn HostBoundary,
    ) -> ActionOutcome {
        match self.units.get(&unit) {
            Some(u) => actions::run(action, u, &self.doc, host),
            None => ActionOutcome::Ignored,
        }
    }

    /// Looks up a unit.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Units of a view, in creation order.
    #[must_use]
    pub fn units_for_view(&self, view: ViewId) -> &[UnitId] {
        match self.sessions.get(&view) {
            Some(session) => &session.units,
            None => &[],
        }
    }

    /// Returns `true` if `node` carries the claim marker.
    #[must_use]
    pub fn claimed(&self, node: NodeId) -> bool {
        is_claimed(&self.doc, node)
    }

    /// Returns `true` while `view` still has a connected observer.
    #[must_use]
    pub fn is_observing(&self, view: ViewId) -> bool {
        self.sessions
            .get(&view)
            .is_some_and(|s| s.is_observing(&self.doc))
    }
}
