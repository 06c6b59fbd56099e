// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lens Timing: host-agnostic suspension primitives.
//!
//! The viewport engine runs on a single cooperative event loop that it does
//! not own. Instead of callbacks registered with the host, it keeps explicit
//! queues and lets the host drive them:
//!
//! - [`TimerQueue`]: deadline-ordered items with cancellable [`TimerId`]s.
//!   The host passes the current time in milliseconds to [`TimerQueue::pop_due`].
//! - [`Microtasks`]: FIFO work deferred until the current batch settles.
//! - [`FrameWait`]: "poll a predicate once per animation frame until it holds",
//!   with a [`CancelToken`] that resolves the wait early.
//!
//! ```rust
//! use core::task::Poll;
//! use lens_timing::{CancelToken, FrameWait, WaitOutcome};
//!
//! let token = CancelToken::new();
//! let mut wait = FrameWait::new(token.clone());
//! assert_eq!(wait.poll(|| false), Poll::Pending);
//! token.cancel();
//! assert_eq!(wait.poll(|| true), Poll::Ready(WaitOutcome::Cancelled));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod queue;
mod wait;

pub use queue::{Microtasks, TimerId, TimerQueue};
pub use wait::{CancelToken, FrameWait, WaitOutcome};
