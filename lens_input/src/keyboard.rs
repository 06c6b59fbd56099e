// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyboard shortcuts.

use kurbo::Vec2;
use smallvec::smallvec;

use crate::{Commands, Key, Modifiers, ViewCommand};

/// Arrow keys pan by a fixed step; `ctrl`/`cmd` with `+`, `-`, or `0`
/// zooms in, zooms out, or resets. Every keyboard command is animated.
///
/// An empty result means the key was not handled and should reach the host.
#[derive(Clone, Debug)]
pub struct KeyboardHandler {
    zoom_step: f64,
    pan_step: f64,
}

impl KeyboardHandler {
    /// Creates a handler with the given zoom multiplier and pan distance.
    #[must_use]
    pub fn new(zoom_step: f64, pan_step: f64) -> Self {
        Self {
            zoom_step,
            pan_step,
        }
    }

    /// Key press.
    pub fn key_down(&mut self, key: Key, modifiers: Modifiers) -> Commands {
        let step = self.pan_step;
        let delta = match key {
            Key::ArrowLeft => Vec2::new(-step, 0.0),
            Key::ArrowRight => Vec2::new(step, 0.0),
            Key::ArrowUp => Vec2::new(0.0, -step),
            Key::ArrowDown => Vec2::new(0.0, step),
            Key::Character(c) if modifiers.command() => {
                let cmd = match c {
                    '+' | '=' => ViewCommand::Zoom {
                        factor: self.zoom_step,
                        animated: true,
                    },
                    '-' => ViewCommand::Zoom {
                        factor: 1.0 / self.zoom_step,
                        animated: true,
                    },
                    '0' => ViewCommand::Reset { animated: true },
                    _ => return Commands::new(),
                };
                return smallvec![cmd];
            }
            Key::Character(_) => return Commands::new(),
        };
        smallvec![ViewCommand::Move {
            delta,
            animated: true,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_pan_by_step() {
        let mut k = KeyboardHandler::new(1.1, 50.0);
        let expect = [
            (Key::ArrowLeft, Vec2::new(-50.0, 0.0)),
            (Key::ArrowRight, Vec2::new(50.0, 0.0)),
            (Key::ArrowUp, Vec2::new(0.0, -50.0)),
            (Key::ArrowDown, Vec2::new(0.0, 50.0)),
        ];
        for (key, delta) in expect {
            assert_eq!(
                k.key_down(key, Modifiers::empty()).as_slice(),
                [ViewCommand::Move {
                    delta,
                    animated: true
                }]
            );
        }
    }

    #[test]
    fn command_keys_zoom() {
        let mut k = KeyboardHandler::new(1.25, 50.0);
        assert_eq!(
            k.key_down(Key::Character('+'), Modifiers::CTRL).as_slice(),
            [ViewCommand::Zoom {
                factor: 1.25,
                animated: true
            }]
        );
        assert_eq!(
            k.key_down(Key::Character('-'), Modifiers::META).as_slice(),
            [ViewCommand::Zoom {
                factor: 0.8,
                animated: true
            }]
        );
        assert_eq!(
            k.key_down(Key::Character('0'), Modifiers::CTRL).as_slice(),
            [ViewCommand::Reset { animated: true }]
        );
    }

    #[test]
    fn unmodified_characters_pass_through() {
        let mut k = KeyboardHandler::new(1.1, 50.0);
        assert!(k.key_down(Key::Character('+'), Modifiers::empty()).is_empty());
        assert!(k.key_down(Key::Character('x'), Modifiers::CTRL).is_empty());
    }
}
