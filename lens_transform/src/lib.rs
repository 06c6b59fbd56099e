// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lens Transform: the coordinate math behind an interactive diagram viewport.
//!
//! A viewport is a fixed-size *container* showing a *content* box (the rendered
//! diagram or image at its natural size) through a uniform pan + zoom transform
//! `{dx, dy, scale}`. The transform is applied with a top-left origin, so a
//! content-local point `p` lands at `(dx, dy) + p * scale` in container space.
//!
//! This crate provides:
//! - [`ViewTransform`]: the transform value and its CSS rendering.
//! - [`Viewport`]: move, anchored zoom, and fit/reset over a container/content pair.
//!
//! It does **not** apply transitions or touch any document. Callers write the
//! resulting [`ViewTransform::to_css`] string wherever their content lives and
//! decide whether the change is animated.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use lens_transform::{MIN_SCALE, Viewport};
//!
//! let mut vp = Viewport::new(Size::new(400.0, 300.0), Size::new(800.0, 800.0));
//! vp.fit();
//! assert_eq!(vp.scale(), 0.375);
//!
//! // Wheel zoom keeps the point under the cursor in place.
//! let cursor = Point::new(100.0, 50.0);
//! let before = vp.container_to_content(cursor);
//! vp.zoom_at(cursor, 1.1);
//! let after = vp.container_to_content(cursor);
//! assert!((before - after).hypot() < 1e-9);
//!
//! // Zooming out never goes below the minimum scale.
//! for _ in 0..100 {
//!     vp.zoom(0.5);
//! }
//! assert_eq!(vp.scale(), MIN_SCALE);
//! ```
//!
//! ## Anchors
//!
//! Two zoom entry points exist on purpose:
//! - [`Viewport::zoom`] anchors on the container center (keyboard and panel buttons).
//! - [`Viewport::zoom_at`] anchors on an arbitrary container point (wheel and pinch).
//!
//! Both clamp through the same [`MIN_SCALE`] floor.
//!
//! This crate is `no_std`.

#![no_std]

extern crate alloc;

mod viewport;

pub use viewport::{MIN_SCALE, ViewTransform, Viewport, ViewportDebugInfo};
