// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus tracking.

use lens_trigger::Trigger;
use smallvec::smallvec;

use crate::{Commands, ViewCommand};

/// Signals the focus trigger and optionally folds on blur / unfolds on focus.
#[derive(Clone, Debug)]
pub struct FocusHandler {
    unfold_on_focus_in: bool,
    fold_on_focus_out: bool,
    focused: bool,
}

impl FocusHandler {
    /// Creates a handler.
    #[must_use]
    pub fn new(unfold_on_focus_in: bool, fold_on_focus_out: bool) -> Self {
        Self {
            unfold_on_focus_in,
            fold_on_focus_out,
            focused: false,
        }
    }

    /// Returns `true` while focus is inside the container.
    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Focus entered.
    pub fn focus_in(&mut self) -> Commands {
        self.focused = true;
        let mut cmds: Commands = smallvec![ViewCommand::Show(Trigger::Focus)];
        if self.unfold_on_focus_in {
            cmds.push(ViewCommand::Unfold);
        }
        cmds
    }

    /// Focus left.
    pub fn focus_out(&mut self) -> Commands {
        self.focused = false;
        let mut cmds: Commands = smallvec![ViewCommand::Hide(Trigger::Focus)];
        if self.fold_on_focus_out {
            cmds.push(ViewCommand::Fold);
        }
        cmds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_focus_only_signals_trigger() {
        let mut f = FocusHandler::new(false, false);
        assert_eq!(f.focus_in().as_slice(), [ViewCommand::Show(Trigger::Focus)]);
        assert!(f.is_focused());
        assert_eq!(f.focus_out().as_slice(), [ViewCommand::Hide(Trigger::Focus)]);
        assert!(!f.is_focused());
    }

    #[test]
    fn auto_fold_and_unfold() {
        let mut f = FocusHandler::new(true, true);
        assert_eq!(
            f.focus_in().as_slice(),
            [ViewCommand::Show(Trigger::Focus), ViewCommand::Unfold]
        );
        assert_eq!(
            f.focus_out().as_slice(),
            [ViewCommand::Hide(Trigger::Focus), ViewCommand::Fold]
        );
    }
}
