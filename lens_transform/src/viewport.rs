// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::format;
use alloc::string::String;

use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Smallest scale reachable through zooming.
pub const MIN_SCALE: f64 = 0.125;

/// Uniform pan + zoom applied to a content box, with a top-left origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    /// Horizontal offset of the content origin, in container pixels.
    pub dx: f64,
    /// Vertical offset of the content origin, in container pixels.
    pub dy: f64,
    /// Uniform scale factor.
    pub scale: f64,
}

impl ViewTransform {
    /// No offset, natural size.
    pub const IDENTITY: Self = Self {
        dx: 0.0,
        dy: 0.0,
        scale: 1.0,
    };

    /// Returns the offset as a vector.
    #[must_use]
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.dx, self.dy)
    }

    /// Content → container affine.
    #[must_use]
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.offset()) * Affine::scale(self.scale)
    }

    /// Renders the transform as a CSS `transform` value.
    ///
    /// The host is expected to set `transform-origin: 0 0` on the content box.
    #[must_use]
    pub fn to_css(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.dx, self.dy, self.scale
        )
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A container showing a content box through a [`ViewTransform`].
///
/// `Viewport` only holds numbers: the container size (the realized footprint
/// of the viewport), the content's natural size, and the current transform.
/// None of its operations fail. Degenerate geometry produces degenerate
/// transforms that a later resize + [`Viewport::fit`] repairs.
#[derive(Clone, Debug)]
pub struct Viewport {
    container: Size,
    content: Size,
    transform: ViewTransform,
    min_scale: f64,
}

impl Viewport {
    /// Creates a viewport with an identity transform.
    #[must_use]
    pub fn new(container: Size, content: Size) -> Self {
        Self {
            container,
            content,
            transform: ViewTransform::IDENTITY,
            min_scale: MIN_SCALE,
        }
    }

    /// Returns the container size.
    #[must_use]
    pub fn container_size(&self) -> Size {
        self.container
    }

    /// Sets the container size. The transform is left untouched.
    pub fn set_container_size(&mut self, size: Size) {
        self.container = size;
    }

    /// Returns the natural content size.
    #[must_use]
    pub fn content_size(&self) -> Size {
        self.content
    }

    /// Sets the natural content size. The transform is left untouched.
    pub fn set_content_size(&mut self, size: Size) {
        self.content = size;
    }

    /// Returns the current transform.
    #[must_use]
    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    /// Replaces the current transform, clamping a positive scale to the floor.
    pub fn set_transform(&mut self, transform: ViewTransform) {
        self.transform = transform;
        if self.transform.scale > 0.0 {
            self.transform.scale = self.transform.scale.max(self.min_scale);
        }
    }

    /// Returns the current scale.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.transform.scale
    }

    /// Returns the minimum scale reachable through zooming.
    #[must_use]
    pub fn min_scale(&self) -> f64 {
        self.min_scale
    }

    /// Accumulates a pan delta in container pixels.
    pub fn move_by(&mut self, delta: Vec2) {
        if !delta.is_finite() {
            return;
        }
        self.transform.dx += delta.x;
        self.transform.dy += delta.y;
    }

    /// Zooms by `factor` keeping the container center visually stationary.
    pub fn zoom(&mut self, factor: f64) {
        let anchor = self.container.to_rect().center();
        self.zoom_at(anchor, factor);
    }

    /// Zooms by `factor` keeping `anchor` (in container coordinates) stationary.
    ///
    /// The resulting scale never drops below [`Viewport::min_scale`]; when the
    /// clamp kicks in the anchor correction uses the clamped factor, so the
    /// anchor still holds.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let old_scale = self.transform.scale;
        let new_scale = (old_scale * factor).max(self.min_scale);
        if old_scale <= 0.0 {
            // Degenerate fit; there is no content point under the anchor yet.
            self.transform.scale = new_scale;
            return;
        }
        if (new_scale - old_scale).abs() < f64::EPSILON {
            return;
        }

        // Content-local point currently under the anchor.
        let local = (anchor.to_vec2() - self.transform.offset()) / old_scale;
        let offset = anchor.to_vec2() - local * new_scale;
        self.transform = ViewTransform {
            dx: offset.x,
            dy: offset.y,
            scale: new_scale,
        };
    }

    /// Scales the content to fit the container without upscaling, and centers it.
    ///
    /// `scale = min(cw / dw, ch / dh, 1)`. A zero-size container yields a zero
    /// scale. Content without a natural size leaves the transform unchanged.
    pub fn fit(&mut self) {
        let Size {
            width: cw,
            height: ch,
        } = self.container;
        let Size {
            width: dw,
            height: dh,
        } = self.content;
        if dw <= 0.0 || dh <= 0.0 {
            return;
        }
        let scale = (cw / dw).min(ch / dh).min(1.0).max(0.0);
        self.transform = ViewTransform {
            dx: (cw - dw * scale) / 2.0,
            dy: (ch - dh * scale) / 2.0,
            scale,
        };
    }

    /// Resets zoom and pan. Same as [`Viewport::fit`].
    pub fn reset(&mut self) {
        self.fit();
    }

    /// Returns the content box in container coordinates.
    #[must_use]
    pub fn content_rect(&self) -> Rect {
        self.transform.to_affine().transform_rect_bbox(self.content.to_rect())
    }

    /// Converts a content-local point into container coordinates.
    #[must_use]
    pub fn content_to_container(&self, pt: Point) -> Point {
        self.transform.to_affine() * pt
    }

    /// Converts a container point into content-local coordinates.
    ///
    /// With a zero scale every point maps to the content origin.
    #[must_use]
    pub fn container_to_content(&self, pt: Point) -> Point {
        if self.transform.scale <= 0.0 {
            return Point::ORIGIN;
        }
        ((pt.to_vec2() - self.transform.offset()) / self.transform.scale).to_point()
    }

    /// Snapshot of the current state for debugging and inspection.
    #[must_use]
    pub fn debug_info(&self) -> ViewportDebugInfo {
        ViewportDebugInfo {
            container: self.container,
            content: self.content,
            content_rect: self.content_rect(),
            transform: self.transform,
            min_scale: self.min_scale,
        }
    }
}

/// Debug snapshot of a [`Viewport`].
#[derive(Clone, Copy, Debug)]
pub struct ViewportDebugInfo {
    /// Container size.
    pub container: Size,
    /// Natural content size.
    pub content: Size,
    /// Content box in container coordinates.
    pub content_rect: Rect,
    /// Current transform.
    pub transform: ViewTransform,
    /// Zoom floor.
    pub min_scale: f64,
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Size, Vec2};

    use super::{MIN_SCALE, ViewTransform, Viewport};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn fit_never_upscales() {
        let mut vp = Viewport::new(Size::new(1000.0, 1000.0), Size::new(200.0, 100.0));
        vp.fit();
        assert_eq!(vp.scale(), 1.0);
        let t = vp.transform();
        assert!(close(t.dx, 400.0));
        assert!(close(t.dy, 450.0));
    }

    #[test]
    fn fit_takes_the_tighter_axis() {
        let mut vp = Viewport::new(Size::new(400.0, 300.0), Size::new(800.0, 800.0));
        vp.fit();
        assert!(close(vp.scale(), 0.375));
        // Horizontal slack is split evenly, vertical axis is flush.
        let t = vp.transform();
        assert!(close(t.dx, (400.0 - 300.0) / 2.0));
        assert!(close(t.dy, 0.0));

        vp.set_content_size(Size::new(800.0, 300.0));
        vp.fit();
        assert!(close(vp.scale(), 0.5));
    }

    #[test]
    fn fit_with_zero_container_is_degenerate_not_fatal() {
        let mut vp = Viewport::new(Size::ZERO, Size::new(100.0, 100.0));
        vp.fit();
        assert_eq!(vp.scale(), 0.0);
        assert_eq!(vp.container_to_content(Point::new(5.0, 5.0)), Point::ORIGIN);

        // Zooming out of the degenerate state lands on the floor.
        vp.zoom(1.1);
        assert_eq!(vp.scale(), MIN_SCALE);
    }

    #[test]
    fn fit_without_content_size_is_a_no_op() {
        let mut vp = Viewport::new(Size::new(100.0, 100.0), Size::ZERO);
        vp.move_by(Vec2::new(3.0, 4.0));
        vp.fit();
        assert_eq!(vp.transform().offset(), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn zoom_keeps_container_center_fixed() {
        let mut vp = Viewport::new(Size::new(400.0, 200.0), Size::new(400.0, 200.0));
        vp.move_by(Vec2::new(-30.0, 12.0));
        let center = Point::new(200.0, 100.0);
        let before = vp.container_to_content(center);
        vp.zoom(2.0);
        let after = vp.container_to_content(center);
        assert!(close(before.x, after.x));
        assert!(close(before.y, after.y));
        assert!(close(vp.scale(), 2.0));
    }

    #[test]
    fn zoom_never_goes_below_floor() {
        let mut vp = Viewport::new(Size::new(400.0, 200.0), Size::new(400.0, 200.0));
        for factor in [0.5, 0.9, 0.01, 0.3, 0.99] {
            for _ in 0..50 {
                vp.zoom(factor);
                assert!(vp.scale() >= MIN_SCALE);
            }
        }
        assert_eq!(vp.scale(), MIN_SCALE);
        // Clamping again changes nothing.
        let t = vp.transform();
        vp.zoom(0.5);
        assert_eq!(vp.transform(), t);
    }

    #[test]
    fn clamped_zoom_still_holds_anchor() {
        let mut vp = Viewport::new(Size::new(400.0, 200.0), Size::new(400.0, 200.0));
        let cursor = Point::new(50.0, 150.0);
        let before = vp.container_to_content(cursor);
        vp.zoom_at(cursor, 0.01);
        assert_eq!(vp.scale(), MIN_SCALE);
        let after = vp.container_to_content(cursor);
        assert!(close(before.x, after.x));
        assert!(close(before.y, after.y));
    }

    #[test]
    fn wheel_round_trip_restores_scale_and_offset() {
        let mut vp = Viewport::new(Size::new(640.0, 480.0), Size::new(1000.0, 700.0));
        vp.fit();
        let start = vp.transform();
        let cursor = Point::new(123.0, 321.0);
        vp.zoom_at(cursor, 1.1);
        vp.zoom_at(cursor, 1.0 / 1.1);
        let end = vp.transform();
        assert!(close(start.scale, end.scale));
        assert!(close(start.dx, end.dx));
        assert!(close(start.dy, end.dy));
    }

    #[test]
    fn invalid_factors_are_ignored() {
        let mut vp = Viewport::new(Size::new(10.0, 10.0), Size::new(10.0, 10.0));
        vp.zoom(0.0);
        vp.zoom(-2.0);
        vp.zoom(f64::NAN);
        vp.move_by(Vec2::new(f64::INFINITY, 0.0));
        assert_eq!(vp.transform(), ViewTransform::IDENTITY);
    }

    #[test]
    fn css_uses_translate_then_scale() {
        let t = ViewTransform {
            dx: 10.0,
            dy: -4.5,
            scale: 0.5,
        };
        assert_eq!(t.to_css(), "translate(10px, -4.5px) scale(0.5)");
    }

    #[test]
    fn content_rect_tracks_transform() {
        let mut vp = Viewport::new(Size::new(100.0, 100.0), Size::new(50.0, 20.0));
        vp.move_by(Vec2::new(10.0, 5.0));
        vp.zoom_at(Point::new(10.0, 5.0), 2.0);
        let r = vp.content_rect();
        assert!(close(r.x0, 10.0));
        assert!(close(r.y0, 5.0));
        assert!(close(r.width(), 100.0));
        assert!(close(r.height(), 40.0));
        let info = vp.debug_info();
        assert_eq!(info.min_scale, MIN_SCALE);
    }
}
