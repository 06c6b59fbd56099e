// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mouse and wheel input.

use kurbo::{Point, Vec2};
use lens_trigger::Trigger;
use smallvec::smallvec;

use crate::{Commands, DragState, Modifiers, PointerButton, ViewCommand};

/// Mouse and wheel gestures.
///
/// - `ctrl`/`cmd` + wheel zooms around the cursor.
/// - `shift` + wheel pans horizontally, `shift` + `alt` + wheel vertically.
///   A horizontal scroll delta, as trackpads send, is used when present.
/// - Unmodified wheel events are left to the host so the page still scrolls.
/// - Primary-button drag pans without a transition. The press that starts
///   it yields [`ViewCommand::Capture`].
/// - Double click resets with a transition.
#[derive(Clone, Debug)]
pub struct PointerHandler {
    zoom_step: f64,
    drag: DragState,
}

impl PointerHandler {
    /// Creates a handler zooming by `zoom_step` per wheel notch.
    #[must_use]
    pub fn new(zoom_step: f64) -> Self {
        Self {
            zoom_step,
            drag: DragState::default(),
        }
    }

    /// Returns `true` while a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Wheel event at `position`.
    pub fn wheel(&mut self, position: Point, delta: Vec2, modifiers: Modifiers) -> Commands {
        if delta == Vec2::ZERO {
            return Commands::new();
        }
        if modifiers.command() {
            if delta.y == 0.0 {
                return Commands::new();
            }
            let factor = if delta.y < 0.0 {
                self.zoom_step
            } else {
                1.0 / self.zoom_step
            };
            return smallvec![ViewCommand::ZoomAt {
                anchor: position,
                factor,
                animated: false,
            }];
        }
        if modifiers.contains(Modifiers::SHIFT) {
            let amount = if delta.x != 0.0 { delta.x } else { delta.y };
            let delta = if modifiers.contains(Modifiers::ALT) {
                Vec2::new(0.0, -amount)
            } else {
                Vec2::new(-amount, 0.0)
            };
            return smallvec![ViewCommand::Move {
                delta,
                animated: false,
            }];
        }
        Commands::new()
    }

    /// Button press.
    pub fn down(&mut self, position: Point, button: PointerButton) -> Commands {
        if button != PointerButton::Primary {
            return Commands::new();
        }
        self.drag.start(position);
        smallvec![ViewCommand::Capture]
    }

    /// Pointer motion.
    pub fn moved(&mut self, position: Point) -> Commands {
        match self.drag.update(position) {
            Some(delta) if delta != Vec2::ZERO => smallvec![ViewCommand::Move {
                delta,
                animated: false,
            }],
            _ => Commands::new(),
        }
    }

    /// Button release.
    pub fn up(&mut self) -> Commands {
        self.drag.end();
        Commands::new()
    }

    /// Double click.
    pub fn double_click(&mut self) -> Commands {
        self.drag.end();
        smallvec![ViewCommand::Reset { animated: true }]
    }

    /// Pointer entered the container.
    pub fn enter(&mut self) -> Commands {
        smallvec![ViewCommand::Show(Trigger::Mouse)]
    }

    /// Pointer left the container. Any drag ends here.
    pub fn leave(&mut self) -> Commands {
        self.drag.end();
        smallvec![ViewCommand::Hide(Trigger::Mouse)]
    }

    /// Drops any in-progress drag.
    pub fn cancel(&mut self) {
        self.drag.end();
    }
}
