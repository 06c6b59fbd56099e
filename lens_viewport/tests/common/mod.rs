// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixtures for engine integration tests.

#![allow(
    missing_docs,
    dead_code,
    unreachable_pub,
    reason = "Integration-test helper module; each test binary uses a subset."
)]

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Rect, Size};
use lens_doc::NodeId;
use lens_viewport::{
    BoundaryError, ClipboardPayload, Engine, EngineHooks, HostBoundary, ImageData, RenderMode,
    Settings, UnitId, ViewId,
};

pub const VIEW: ViewId = ViewId(7);

/// A view holding one figure with a 400x300 diagram between two siblings:
///
/// ```text
/// view_root > figure.diagram.wide > caption, svg, note
/// ```
pub struct Page {
    pub engine: Engine,
    pub view_root: NodeId,
    pub figure: NodeId,
    pub caption: NodeId,
    pub svg: NodeId,
    pub note: NodeId,
}

pub fn page(settings: Settings) -> Page {
    let mut engine = Engine::new(settings).unwrap();
    let doc = engine.document_mut();
    let view_root = doc.create_element("div");
    doc.append_child(doc.root(), view_root).unwrap();
    doc.set_rect(view_root, Rect::new(0.0, 0.0, 800.0, 2000.0)).unwrap();

    let figure = doc.create_element("p");
    doc.add_class(figure, "diagram").unwrap();
    doc.add_class(figure, "wide").unwrap();
    doc.append_child(view_root, figure).unwrap();
    doc.set_rect(figure, Rect::new(0.0, 0.0, 800.0, 300.0)).unwrap();

    let caption = doc.create_element("span");
    let svg = doc.create_element("svg");
    let note = doc.create_element("em");
    for node in [caption, svg, note] {
        doc.append_child(figure, node).unwrap();
    }
    doc.set_rect(svg, Rect::new(0.0, 0.0, 400.0, 300.0)).unwrap();

    Page {
        engine,
        view_root,
        figure,
        caption,
        svg,
        note,
    }
}

/// Reports layout for a unit's wrapper nodes, as the host would after the
/// next paint.
pub fn lay_out(engine: &mut Engine, unit: UnitId) {
    let u = engine.unit(unit).unwrap();
    let container = u.container().unwrap();
    let content = u.content().unwrap();
    let doc = engine.document_mut();
    doc.set_rect(container, Rect::new(0.0, 0.0, 400.0, 300.0)).unwrap();
    doc.set_rect(content, Rect::new(0.0, 0.0, 400.0, 300.0)).unwrap();
}

/// Opens [`VIEW`] statically and drives the single unit to ready.
pub fn ready_page(settings: Settings) -> (Page, UnitId) {
    let mut page = page(settings);
    page.engine.open_view(VIEW, page.view_root, RenderMode::Static);
    page.engine.tick(16);
    let [unit] = page.engine.units_for_view(VIEW) else {
        panic!("expected exactly one unit");
    };
    let unit = *unit;
    lay_out(&mut page.engine, unit);
    page.engine.tick(32);
    assert!(page.engine.unit(unit).unwrap().is_ready());
    (page, unit)
}

/// Records what the engine asked of the host.
#[derive(Debug, Default)]
pub struct MockHost {
    pub clipboard: Vec<ClipboardPayload>,
    pub downloads: Vec<(String, ImageData)>,
    pub notices: Vec<String>,
    pub fullscreen: Option<NodeId>,
    pub screen: Size,
    pub source: Option<String>,
    pub fail: bool,
}

impl MockHost {
    fn check(&self, action: &'static str) -> Result<(), BoundaryError> {
        if self.fail {
            Err(BoundaryError::Rejected {
                action,
                reason: "permission denied".into(),
            })
        } else {
            Ok(())
        }
    }
}

impl HostBoundary for MockHost {
    fn write_clipboard(&mut self, payload: ClipboardPayload) -> Result<(), BoundaryError> {
        self.check("clipboard write")?;
        self.clipboard.push(payload);
        Ok(())
    }

    fn download(&mut self, file_name: &str, data: ImageData) -> Result<(), BoundaryError> {
        self.check("download")?;
        self.downloads.push((file_name.to_owned(), data));
        Ok(())
    }

    fn notice(&mut self, message: &str) {
        self.notices.push(message.to_owned());
    }

    fn request_fullscreen(&mut self, container: NodeId) -> Result<Size, BoundaryError> {
        self.check("fullscreen")?;
        self.fullscreen = Some(container);
        Ok(self.screen)
    }

    fn exit_fullscreen(&mut self) -> Result<(), BoundaryError> {
        self.check("fullscreen exit")?;
        self.fullscreen = None;
        Ok(())
    }

    fn source_text(&self, _view: ViewId, _unit: UnitId) -> Option<String> {
        self.source.clone()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HookCall {
    Created(ViewId, UnitId),
    Cleared(ViewId),
}

/// Hooks that log every call into a shared list.
#[derive(Clone, Debug, Default)]
pub struct Recorder(pub Rc<RefCell<Vec<HookCall>>>);

impl Recorder {
    pub fn calls(&self) -> Vec<HookCall> {
        self.0.borrow().clone()
    }
}

impl EngineHooks for Recorder {
    fn on_unit_created(&mut self, view: ViewId, unit: UnitId) {
        self.0.borrow_mut().push(HookCall::Created(view, unit));
    }

    fn on_units_cleared_for_view(&mut self, view: ViewId) {
        self.0.borrow_mut().push(HookCall::Cleared(view));
    }
}
