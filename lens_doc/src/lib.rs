// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lens Doc: a host-mirrored document tree.
//!
//! The viewport engine never talks to a real rendering host directly. Instead
//! the host mirrors the parts of its tree the engine cares about into a
//! [`Document`]: elements with a tag, classes, attributes, inline style, an
//! optional text payload, and the bounding rectangle the host's layout last
//! reported. The engine then reads and mutates that mirror, and the host
//! replays the engine's mutations onto its own tree.
//!
//! - [`NodeId`]: generational handle. Freed slots are reused with a bumped
//!   generation, so stale handles never alias a new node.
//! - [`Document`]: the arena plus tree-editing operations.
//! - [`ObserverId`] / [`MutationRecord`]: scoped mutation observation. An
//!   observer watches one target (optionally its whole subtree) and queues
//!   child-list, attribute, and text records until drained.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Rect;
//! use lens_doc::{Document, ObserveOptions};
//!
//! let mut doc = Document::new();
//! let view = doc.create_element("div");
//! doc.append_child(doc.root(), view).unwrap();
//!
//! let observer = doc.observe(view, ObserveOptions::subtree());
//! let svg = doc.create_element("svg");
//! doc.append_child(view, svg).unwrap();
//! doc.set_rect(svg, Rect::new(0.0, 0.0, 120.0, 80.0)).unwrap();
//!
//! let records = doc.take_records(observer);
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].added.as_slice(), &[svg]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod document;
mod markup;
mod observer;
mod types;

pub use document::{Descendants, Document};
pub use markup::MarkupOptions;
pub use observer::{MutationKind, MutationRecord, ObserveOptions, ObserverId};
pub use types::{DocError, NodeId};
