// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timer and microtask queues.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

/// Handle to a scheduled timer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Clone, Debug)]
struct Entry<T> {
    deadline: u64,
    id: TimerId,
    item: T,
}

/// Items ordered by deadline (milliseconds), ties broken by scheduling order.
#[derive(Clone, Debug)]
pub struct TimerQueue<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `item` to become due at `deadline`.
    pub fn schedule(&mut self, deadline: u64, item: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        // Equal deadlines keep scheduling order: insert after the last `<=`.
        let at = self.entries.partition_point(|e| e.deadline <= deadline);
        self.entries.insert(at, Entry { deadline, id, item });
        id
    }

    /// Cancels a timer, returning its item if it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let at = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(at).item)
    }

    /// Removes every pending timer whose item matches `pred`.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !pred(&e.item));
        before - self.entries.len()
    }

    /// Removes and returns every item due at or before `now`, earliest first.
    pub fn pop_due(&mut self, now: u64) -> Vec<T> {
        let due = self.entries.partition_point(|e| e.deadline <= now);
        self.entries.drain(..due).map(|e| e.item).collect()
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.first().map(|e| e.deadline)
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// FIFO of work deferred until the current batch has settled.
#[derive(Clone, Debug)]
pub struct Microtasks<T> {
    queue: VecDeque<T>,
}

impl<T> Default for Microtasks<T> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }
}

impl<T> Microtasks<T> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defers `task`.
    pub fn defer(&mut self, task: T) {
        self.queue.push_back(task);
    }

    /// Takes the next task.
    pub fn next_task(&mut self) -> Option<T> {
        self.queue.pop_front()
    }

    /// Drops every queued task matching `pred`.
    pub fn discard_where(&mut self, mut pred: impl FnMut(&T) -> bool) {
        self.queue.retain(|t| !pred(t));
    }

    /// Number of queued tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
