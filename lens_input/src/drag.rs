// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag tracking: turns successive positions into incremental pan deltas.

use kurbo::{Point, Vec2};

/// Tracks one drag gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DragState {
    origin: Option<Point>,
    last: Option<Point>,
}

impl DragState {
    /// Starts a drag at `pos`, discarding any previous one.
    pub fn start(&mut self, pos: Point) {
        self.origin = Some(pos);
        self.last = Some(pos);
    }

    /// Returns the movement since the previous update, or `None` when idle.
    pub fn update(&mut self, pos: Point) -> Option<Vec2> {
        self.origin?;
        let last = self.last.replace(pos)?;
        Some(pos - last)
    }

    /// Ends the drag.
    pub fn end(&mut self) {
        *self = Self::default();
    }

    /// Returns `true` while dragging.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.origin.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_drag_reports_nothing() {
        let mut drag = DragState::default();
        assert_eq!(drag.update(Point::new(3.0, 4.0)), None);
        assert!(!drag.is_dragging());
        // An idle update must not start a drag.
        assert_eq!(drag.update(Point::new(5.0, 4.0)), None);
    }

    #[test]
    fn deltas_are_incremental() {
        let mut drag = DragState::default();
        drag.start(Point::new(10.0, 20.0));
        assert_eq!(drag.update(Point::new(15.0, 25.0)), Some(Vec2::new(5.0, 5.0)));
        assert_eq!(drag.update(Point::new(12.0, 25.0)), Some(Vec2::new(-3.0, 0.0)));
        drag.end();
        assert!(!drag.is_dragging());
        assert_eq!(drag.update(Point::new(20.0, 25.0)), None);
    }
}
