// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Touch gestures.

use kurbo::Point;
use smallvec::smallvec;

use crate::{Commands, DragState, ViewCommand};

/// One-finger drag, two-finger pinch, and double-tap reset.
///
/// A touch that starts a drag or pinch yields [`ViewCommand::Capture`].
///
/// Pinch factors are relative to the previous move, not to the gesture start:
/// each move emits `current / previous` distance and re-bases. Applying every
/// emitted factor in turn therefore yields `current / initial` overall.
#[derive(Clone, Debug)]
pub struct TouchHandler {
    double_tap_ms: u64,
    passthrough: bool,
    drag: DragState,
    pinch_distance: Option<f64>,
    last_tap: Option<u64>,
}

impl TouchHandler {
    /// Creates a handler treating taps closer than `double_tap_ms` as a double tap.
    #[must_use]
    pub fn new(double_tap_ms: u64) -> Self {
        Self {
            double_tap_ms,
            passthrough: false,
            drag: DragState::default(),
            pinch_distance: None,
            last_tap: None,
        }
    }

    /// Returns `true` if touches are left to the host.
    #[must_use]
    pub fn passthrough(&self) -> bool {
        self.passthrough
    }

    /// Leaves every touch to the host while `on`. Drops any in-progress gesture.
    pub fn set_passthrough(&mut self, on: bool) {
        self.passthrough = on;
        self.cancel();
    }

    /// Returns `true` while pinching.
    #[must_use]
    pub fn is_pinching(&self) -> bool {
        self.pinch_distance.is_some()
    }

    /// A touch began. `now` is in milliseconds.
    pub fn start(&mut self, touches: &[Point], now: u64) -> Commands {
        if self.passthrough {
            return Commands::new();
        }
        match touches {
            [single] => {
                self.pinch_distance = None;
                self.drag.start(*single);
                if let Some(prev) = self.last_tap
                    && now.saturating_sub(prev) <= self.double_tap_ms
                {
                    self.last_tap = None;
                    self.drag.end();
                    return smallvec![ViewCommand::Reset { animated: true }];
                }
                self.last_tap = Some(now);
            }
            [a, b, ..] => {
                self.drag.end();
                self.last_tap = None;
                self.pinch_distance = Some(a.distance(*b));
            }
            [] => {
                self.cancel();
                return Commands::new();
            }
        }
        smallvec![ViewCommand::Capture]
    }

    /// Touches moved.
    pub fn moved(&mut self, touches: &[Point]) -> Commands {
        if self.passthrough {
            return Commands::new();
        }
        match touches {
            [single] => match self.drag.update(*single) {
                Some(delta) => {
                    self.last_tap = None;
                    smallvec![ViewCommand::Move {
                        delta,
                        animated: false,
                    }]
                }
                None => Commands::new(),
            },
            [a, b, ..] => {
                let current = a.distance(*b);
                let Some(previous) = self.pinch_distance.replace(current) else {
                    return Commands::new();
                };
                if previous <= 0.0 || current == previous {
                    return Commands::new();
                }
                smallvec![ViewCommand::ZoomAt {
                    anchor: a.midpoint(*b),
                    factor: current / previous,
                    animated: false,
                }]
            }
            [] => Commands::new(),
        }
    }

    /// A touch ended; `remaining` lists the points still down.
    pub fn end(&mut self, remaining: &[Point]) -> Commands {
        if self.passthrough {
            return Commands::new();
        }
        self.pinch_distance = None;
        match remaining {
            // Lifting one finger of a pinch continues as a drag.
            [single] => self.drag.start(*single),
            _ => self.drag.end(),
        }
        Commands::new()
    }

    /// Drops any in-progress gesture.
    pub fn cancel(&mut self) {
        self.drag.end();
        self.pinch_distance = None;
        self.last_tap = None;
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Vec2;

    use super::*;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn pinch_from_100_to_150_is_exactly_one_and_a_half() {
        let mut t = TouchHandler::new(300);
        assert_eq!(
            t.start(&[pt(0.0, 0.0), pt(100.0, 0.0)], 0).as_slice(),
            [ViewCommand::Capture]
        );
        let cmds = t.moved(&[pt(0.0, 0.0), pt(150.0, 0.0)]);
        assert_eq!(
            cmds.as_slice(),
            [ViewCommand::ZoomAt {
                anchor: pt(75.0, 0.0),
                factor: 1.5,
                animated: false
            }]
        );
    }

    #[test]
    fn pinch_rebases_each_move() {
        let mut t = TouchHandler::new(300);
        t.start(&[pt(0.0, 0.0), pt(100.0, 0.0)], 0);
        t.moved(&[pt(0.0, 0.0), pt(200.0, 0.0)]);
        let cmds = t.moved(&[pt(0.0, 0.0), pt(100.0, 0.0)]);
        let [ViewCommand::ZoomAt { factor, .. }] = cmds.as_slice() else {
            panic!("expected zoom, got {cmds:?}");
        };
        assert_eq!(*factor, 0.5);
        assert!(t.moved(&[pt(0.0, 0.0), pt(100.0, 0.0)]).is_empty());
    }

    #[test]
    fn single_touch_drags() {
        let mut t = TouchHandler::new(300);
        t.start(&[pt(10.0, 10.0)], 0);
        assert_eq!(
            t.moved(&[pt(15.0, 12.0)]).as_slice(),
            [ViewCommand::Move {
                delta: Vec2::new(5.0, 2.0),
                animated: false
            }]
        );
        t.end(&[]);
        assert!(t.moved(&[pt(40.0, 40.0)]).is_empty());
    }

    #[test]
    fn double_tap_resets_inside_window_only() {
        let mut t = TouchHandler::new(300);
        assert_eq!(
            t.start(&[pt(1.0, 1.0)], 1_000).as_slice(),
            [ViewCommand::Capture]
        );
        t.end(&[]);
        assert_eq!(
            t.start(&[pt(1.0, 1.0)], 1_250).as_slice(),
            [ViewCommand::Reset { animated: true }]
        );
        t.end(&[]);

        assert_eq!(
            t.start(&[pt(1.0, 1.0)], 2_000).as_slice(),
            [ViewCommand::Capture]
        );
        t.end(&[]);
        assert_eq!(
            t.start(&[pt(1.0, 1.0)], 2_301).as_slice(),
            [ViewCommand::Capture]
        );
        assert!(t.start(&[], 2_400).is_empty());
    }

    #[test]
    fn lifting_one_pinch_finger_continues_as_drag() {
        let mut t = TouchHandler::new(300);
        t.start(&[pt(0.0, 0.0), pt(100.0, 0.0)], 0);
        t.end(&[pt(100.0, 0.0)]);
        assert!(!t.is_pinching());
        assert_eq!(
            t.moved(&[pt(110.0, 0.0)]).as_slice(),
            [ViewCommand::Move {
                delta: Vec2::new(10.0, 0.0),
                animated: false
            }]
        );
    }

    #[test]
    fn passthrough_bypasses_everything() {
        let mut t = TouchHandler::new(300);
        t.set_passthrough(true);
        assert!(t.start(&[pt(0.0, 0.0)], 0).is_empty());
        assert!(t.start(&[pt(0.0, 0.0)], 10).is_empty());
        assert!(t.moved(&[pt(5.0, 0.0)]).is_empty());
        t.set_passthrough(false);
        assert!(!t.passthrough());
        assert!(t.moved(&[pt(9.0, 0.0)]).is_empty());
    }
}
