// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lens Input: gesture recognition for interactive viewports.
//!
//! The handlers in this crate own only gesture state (drag origin, pinch
//! baseline, last tap time). They never touch a transform or a document.
//! Each raw [`InputEvent`] is turned into zero or more [`ViewCommand`]s that
//! the caller applies to its viewport:
//!
//! - [`PointerHandler`]: modifier + wheel zoom or pan, primary-button drag,
//!   double-click reset, hover enter/leave.
//! - [`TouchHandler`]: one-finger drag, two-finger pinch, double-tap reset.
//!   Bypassed entirely while native touch passthrough is on.
//! - [`KeyboardHandler`]: arrow-key pan and `ctrl`/`cmd` `+` `-` `0` zoom.
//! - [`FocusHandler`]: focus trigger plus optional auto fold / unfold.
//!
//! [`InputHandlers`] bundles all four and routes events to the right one.
//!
//! ```rust
//! use kurbo::Point;
//! use lens_input::{InputConfig, InputEvent, InputHandlers, ViewCommand};
//!
//! let mut input = InputHandlers::new(InputConfig::default());
//! input.handle(&InputEvent::TouchStart { touches: [Point::new(0.0, 0.0), Point::new(100.0, 0.0)].into() }, 0);
//! let cmds = input.handle(&InputEvent::TouchMove { touches: [Point::new(0.0, 0.0), Point::new(150.0, 0.0)].into() }, 16);
//! assert_eq!(
//!     cmds.as_slice(),
//!     [ViewCommand::ZoomAt { anchor: Point::new(75.0, 0.0), factor: 1.5, animated: false }]
//! );
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

mod drag;
mod focus;
mod keyboard;
mod pointer;
mod touch;

pub use drag::DragState;
pub use focus::FocusHandler;
pub use keyboard::KeyboardHandler;
pub use pointer::PointerHandler;
pub use touch::TouchHandler;

use kurbo::{Point, Vec2};
use lens_trigger::Trigger;
use smallvec::SmallVec;

/// Commands produced by one event. Most events produce at most two.
pub type Commands = SmallVec<[ViewCommand; 2]>;

/// Touch points currently on the surface, in container coordinates.
pub type Touches = SmallVec<[Point; 2]>;

bitflags::bitflags! {
    /// Keyboard modifiers held during an event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift.
        const SHIFT = 0b0001;
        /// Control.
        const CTRL  = 0b0010;
        /// Alt / Option.
        const ALT   = 0b0100;
        /// Meta / Command.
        const META  = 0b1000;
    }
}

impl Modifiers {
    /// Returns `true` if the platform command modifier (`ctrl` or `cmd`) is held.
    #[must_use]
    pub fn command(self) -> bool {
        self.intersects(Self::CTRL | Self::META)
    }
}

/// Pointer buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    /// Main button, usually left.
    Primary,
    /// Usually right.
    Secondary,
    /// Usually the wheel button.
    Auxiliary,
}

/// Keys the viewport reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// Left arrow.
    ArrowLeft,
    /// Right arrow.
    ArrowRight,
    /// Up arrow.
    ArrowUp,
    /// Down arrow.
    ArrowDown,
    /// A printable character.
    Character(char),
}

/// A raw event delivered to a unit. Positions are container-local.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    /// Wheel or trackpad scroll.
    Wheel {
        /// Cursor position.
        position: Point,
        /// Scroll delta; negative `y` scrolls up.
        delta: Vec2,
        /// Held modifiers.
        modifiers: Modifiers,
    },
    /// Button pressed.
    PointerDown {
        /// Cursor position.
        position: Point,
        /// Pressed button.
        button: PointerButton,
    },
    /// Pointer moved.
    PointerMove {
        /// Cursor position.
        position: Point,
    },
    /// Button released.
    PointerUp {
        /// Cursor position.
        position: Point,
    },
    /// Double click.
    DoubleClick {
        /// Cursor position.
        position: Point,
    },
    /// Pointer entered the container.
    PointerEnter,
    /// Pointer left the container.
    PointerLeave,
    /// A touch began; `touches` lists every point now down.
    TouchStart {
        /// Active touches.
        touches: Touches,
    },
    /// Touches moved.
    TouchMove {
        /// Active touches.
        touches: Touches,
    },
    /// A touch ended; `touches` lists the points still down.
    TouchEnd {
        /// Remaining touches.
        touches: Touches,
    },
    /// A key was pressed while the container had focus.
    KeyDown {
        /// The key.
        key: Key,
        /// Held modifiers.
        modifiers: Modifiers,
    },
    /// Focus entered the container.
    FocusIn,
    /// Focus left the container.
    FocusOut,
}

/// What the viewport should do in response to input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewCommand {
    /// Pan by `delta`.
    Move {
        /// Offset to add.
        delta: Vec2,
        /// Whether to transition.
        animated: bool,
    },
    /// Zoom keeping the container center stationary.
    Zoom {
        /// Scale multiplier.
        factor: f64,
        /// Whether to transition.
        animated: bool,
    },
    /// Zoom keeping `anchor` stationary.
    ZoomAt {
        /// Container-local anchor.
        anchor: Point,
        /// Scale multiplier.
        factor: f64,
        /// Whether to transition.
        animated: bool,
    },
    /// Fit content to the container.
    Reset {
        /// Whether to transition.
        animated: bool,
    },
    /// Signal the control panel that `trigger` wants it shown.
    Show(Trigger),
    /// Signal the control panel that `trigger` wants it hidden.
    Hide(Trigger),
    /// Collapse the unit.
    Fold,
    /// Expand the unit.
    Unfold,
    /// A gesture began here: no change yet, but the host should suppress its
    /// default handling of the event.
    Capture,
}

/// Tunables shared by the handlers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputConfig {
    /// Zoom-in multiplier per wheel notch or key press; zoom-out uses its inverse.
    pub zoom_step: f64,
    /// Keyboard pan distance in pixels.
    pub pan_step: f64,
    /// Two taps closer together than this (milliseconds) reset the view.
    pub double_tap_ms: u64,
    /// Unfold when focus enters.
    pub unfold_on_focus_in: bool,
    /// Fold when focus leaves.
    pub fold_on_focus_out: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            zoom_step: 1.1,
            pan_step: 50.0,
            double_tap_ms: 300,
            unfold_on_focus_in: false,
            fold_on_focus_out: false,
        }
    }
}

/// All four handlers for one unit.
#[derive(Clone, Debug)]
pub struct InputHandlers {
    /// Mouse and wheel.
    pub pointer: PointerHandler,
    /// Touch gestures.
    pub touch: TouchHandler,
    /// Keyboard shortcuts.
    pub keyboard: KeyboardHandler,
    /// Focus tracking.
    pub focus: FocusHandler,
}

impl InputHandlers {
    /// Creates handlers sharing `config`.
    #[must_use]
    pub fn new(config: InputConfig) -> Self {
        Self {
            pointer: PointerHandler::new(config.zoom_step),
            touch: TouchHandler::new(config.double_tap_ms),
            keyboard: KeyboardHandler::new(config.zoom_step, config.pan_step),
            focus: FocusHandler::new(config.unfold_on_focus_in, config.fold_on_focus_out),
        }
    }

    /// Routes `event` to its handler. `now` is in milliseconds.
    pub fn handle(&mut self, event: &InputEvent, now: u64) -> Commands {
        match event {
            InputEvent::Wheel {
                position,
                delta,
                modifiers,
            } => self.pointer.wheel(*position, *delta, *modifiers),
            InputEvent::PointerDown { position, button } => self.pointer.down(*position, *button),
            InputEvent::PointerMove { position } => self.pointer.moved(*position),
            InputEvent::PointerUp { .. } => self.pointer.up(),
            InputEvent::DoubleClick { .. } => self.pointer.double_click(),
            InputEvent::PointerEnter => self.pointer.enter(),
            InputEvent::PointerLeave => self.pointer.leave(),
            InputEvent::TouchStart { touches } => self.touch.start(touches, now),
            InputEvent::TouchMove { touches } => self.touch.moved(touches),
            InputEvent::TouchEnd { touches } => self.touch.end(touches),
            InputEvent::KeyDown { key, modifiers } => self.keyboard.key_down(*key, *modifiers),
            InputEvent::FocusIn => self.focus.focus_in(),
            InputEvent::FocusOut => self.focus.focus_out(),
        }
    }

    /// Drops any in-progress gesture.
    pub fn cancel(&mut self) {
        self.pointer.cancel();
        self.touch.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_by_event_kind() {
        let mut input = InputHandlers::new(InputConfig::default());
        assert_eq!(
            input.handle(&InputEvent::PointerEnter, 0).as_slice(),
            [ViewCommand::Show(Trigger::Mouse)]
        );
        assert_eq!(
            input.handle(&InputEvent::FocusOut, 0).as_slice(),
            [ViewCommand::Hide(Trigger::Focus)]
        );
        let keys = input.handle(
            &InputEvent::KeyDown {
                key: Key::Character('0'),
                modifiers: Modifiers::META,
            },
            0,
        );
        assert_eq!(keys.as_slice(), [ViewCommand::Reset { animated: true }]);
    }

    #[test]
    fn cancel_drops_drag() {
        let mut input = InputHandlers::new(InputConfig::default());
        input.handle(
            &InputEvent::PointerDown {
                position: Point::ZERO,
                button: PointerButton::Primary,
            },
            0,
        );
        input.cancel();
        let cmds = input.handle(
            &InputEvent::PointerMove {
                position: Point::new(5.0, 5.0),
            },
            0,
        );
        assert!(cmds.is_empty());
    }

    #[test]
    fn command_modifier() {
        assert!(Modifiers::CTRL.command());
        assert!((Modifiers::META | Modifiers::SHIFT).command());
        assert!(!(Modifiers::SHIFT | Modifiers::ALT).command());
    }
}
