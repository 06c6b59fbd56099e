// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-polled waits with cancellation.

use alloc::rc::Rc;
use core::cell::Cell;
use core::task::Poll;

/// Shared cancellation flag.
///
/// Clones observe the same flag. Single-threaded by construction.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    /// Creates an uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels every wait sharing this token.
    pub fn cancel(&self) {
        self.0.set(true);
    }

    /// Returns `true` once cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// How a [`FrameWait`] resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The predicate held.
    Ready,
    /// The token was cancelled first.
    Cancelled,
    /// The frame limit ran out first.
    TimedOut,
}

/// Polls a predicate once per frame until it holds, is cancelled, or runs
/// out of frames.
#[derive(Clone, Debug)]
pub struct FrameWait {
    token: CancelToken,
    frames: u32,
    limit: Option<u32>,
    done: Option<WaitOutcome>,
}

impl FrameWait {
    /// Creates an unbounded wait.
    #[must_use]
    pub fn new(token: CancelToken) -> Self {
        Self {
            token,
            frames: 0,
            limit: None,
            done: None,
        }
    }

    /// Gives up after `frames` unsuccessful polls.
    #[must_use]
    pub fn with_frame_limit(mut self, frames: u32) -> Self {
        self.limit = Some(frames);
        self
    }

    /// Number of frames polled so far.
    #[must_use]
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Returns the token this wait observes.
    #[must_use]
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Polls once. Cancellation is checked before the predicate runs.
    ///
    /// Once resolved, further polls return the same outcome without running
    /// the predicate.
    pub fn poll(&mut self, ready: impl FnOnce() -> bool) -> Poll<WaitOutcome> {
        if let Some(done) = self.done {
            return Poll::Ready(done);
        }
        let outcome = if self.token.is_cancelled() {
            Some(WaitOutcome::Cancelled)
        } else {
            self.frames = self.frames.saturating_add(1);
            if ready() {
                Some(WaitOutcome::Ready)
            } else if self.limit.is_some_and(|limit| self.frames >= limit) {
                Some(WaitOutcome::TimedOut)
            } else {
                None
            }
        };
        self.done = outcome;
        outcome.map_or(Poll::Pending, Poll::Ready)
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;
    use core::task::Poll;

    use super::*;

    #[test]
    fn resolves_when_predicate_holds() {
        let mut wait = FrameWait::new(CancelToken::new());
        let calls = Cell::new(0);
        let mut poll = || {
            wait.poll(|| {
                calls.set(calls.get() + 1);
                calls.get() == 3
            })
        };
        assert_eq!(poll(), Poll::Pending);
        assert_eq!(poll(), Poll::Pending);
        assert_eq!(poll(), Poll::Ready(WaitOutcome::Ready));
        assert_eq!(poll(), Poll::Ready(WaitOutcome::Ready));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn cancellation_skips_predicate() {
        let token = CancelToken::new();
        let mut wait = FrameWait::new(token.clone());
        token.cancel();
        let mut ran = false;
        assert_eq!(
            wait.poll(|| {
                ran = true;
                true
            }),
            Poll::Ready(WaitOutcome::Cancelled)
        );
        assert!(!ran);
        assert_eq!(wait.frames(), 0);
    }

    #[test]
    fn frame_limit_times_out() {
        let mut wait = FrameWait::new(CancelToken::new()).with_frame_limit(2);
        assert_eq!(wait.poll(|| false), Poll::Pending);
        assert_eq!(wait.poll(|| false), Poll::Ready(WaitOutcome::TimedOut));
    }

    #[test]
    fn clones_share_the_flag() {
        let a = CancelToken::new();
        let b = a.clone();
        b.cancel();
        assert!(a.is_cancelled());
    }
}
