// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lens Viewport: interactive viewports for rendered diagrams and images.
//!
//! An external renderer paints diagrams (vector markup) and images into a
//! host document, often asynchronously and block by block. This crate finds
//! those elements as they appear and wraps each one in a *unit*: a container
//! that can be panned, zoomed, folded, and driven from a floating control
//! panel, without ever activating the same element twice.
//!
//! The pieces:
//!
//! - [`Engine`]: the one context object. It owns a [`lens_doc::Document`]
//!   mirror of the host tree, one discovery session per open view, every
//!   [`Unit`], and the timer and microtask queues. The host drives it by
//!   calling [`Engine::tick`] each animation frame.
//! - Discovery ([`RenderMode`]): static views are scanned at once and watched
//!   for a bounded time; incremental views are watched forever with a
//!   bounded per-block observer; direct views only take explicit
//!   [`Engine::pick`]s. Candidates that are not laid out yet are retried on
//!   the next mutation batch.
//! - Matching: [`Settings::rules`] compile to a [`lens_match::RuleSet`];
//!   specific rules beat generic ones and the claim attribute makes
//!   activation at-most-once.
//! - Lifecycle ([`Unit`]): wraps the element in place, waits for layout,
//!   records the natural size, attaches input handling and the control
//!   panel, and sizes the container. Deactivation restores the original
//!   children exactly.
//! - Boundary actions ([`ContextAction`], fullscreen): go through
//!   [`HostBoundary`]. Failures become a user notice and an error log line,
//!   never an error return.
//!
//! ```rust
//! use kurbo::Rect;
//! use lens_viewport::{Engine, RenderMode, Settings, ViewId};
//!
//! let mut engine = Engine::new(Settings::default()).unwrap();
//! let doc = engine.document_mut();
//! let view_root = doc.create_element("div");
//! doc.append_child(doc.root(), view_root).unwrap();
//! doc.set_rect(view_root, Rect::new(0.0, 0.0, 800.0, 600.0)).unwrap();
//! let svg = doc.create_element("svg");
//! doc.append_child(view_root, svg).unwrap();
//! doc.set_rect(svg, Rect::new(0.0, 0.0, 400.0, 300.0)).unwrap();
//!
//! let view = ViewId(1);
//! engine.open_view(view, view_root, RenderMode::Static);
//! engine.tick(16);
//!
//! let [unit] = engine.units_for_view(view) else { panic!("one unit expected") };
//! let unit = engine.unit(*unit).unwrap();
//! assert!(unit.is_active());
//! assert_eq!(engine.document().parent(svg), unit.content());
//! ```
//!
//! Logging goes through `tracing`; install a subscriber to see it.

mod actions;
mod discovery;
mod engine;
mod error;
mod host;
mod layout;
mod panel;
mod settings;
mod types;
mod unit;

pub use actions::{ActionOutcome, ContextAction, export_file_name};
pub use discovery::RenderMode;
pub use engine::Engine;
pub use error::{BoundaryError, ConfigError};
pub use host::{ClipboardPayload, EngineHooks, HostBoundary, ImageData};
pub use layout::resolve as resolve_dimensions;
pub use panel::{Direction, PANEL_ATTRIBUTE, PanelAction};
pub use settings::{
    Dimension, DimensionSettings, Dimensions, DiscoverySettings, FoldSettings, InputSettings,
    PanelSettings, PanelToggles, RuleSettings, Settings, Triggering, default_rules,
};
pub use types::{UnitId, UnitKind, ViewId};
pub use unit::{
    CONTAINER_CLASS, CONTENT_CLASS, FOLD_ATTRIBUTE, FULLSCREEN_ATTRIBUTE, MODE_ATTRIBUTE,
    NATIVE_TOUCH_ATTRIBUTE, Unit,
};

pub use lens_input::{InputEvent, Key, Modifiers, PointerButton};
pub use lens_trigger::{PanelKind, Trigger};
