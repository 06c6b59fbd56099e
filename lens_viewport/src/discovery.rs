// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-view discovery adapters.
//!
//! Each view picks one adapter when it opens, based on how its content
//! arrives. All adapters feed the same claim and activate pipeline; they only
//! differ in which subtrees they hand it and when:
//!
//! - [`RenderMode::Static`]: scan once, then watch the whole view for a
//!   bounded time to catch renderers that paint late.
//! - [`RenderMode::Incremental`]: watch the view's direct children forever.
//!   Every new block gets its own bounded subtree observer, which catches
//!   placeholders that are filled in after insertion.
//! - [`RenderMode::Direct`]: no observation; the host picks elements itself.

use hashbrown::HashMap;
use lens_doc::{Document, NodeId, ObserveOptions, ObserverId};
use lens_timing::TimerQueue;

use crate::unit::CONTAINER_CLASS;
use crate::{UnitId, ViewId};

/// How a view's content is put into the document.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Already rendered when the view opens.
    Static,
    /// Inserted block by block while the view is open.
    Incremental,
    /// Only explicit picks.
    Direct,
}

/// Scheduled engine work.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum TimerTask {
    /// Disconnect a bounded observer.
    Expire {
        view: ViewId,
        observer: ObserverId,
    },
}

impl TimerTask {
    pub(crate) fn view(&self) -> ViewId {
        match self {
            Self::Expire { view, .. } => *view,
        }
    }
}

/// Observer lifetimes, in milliseconds.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Lifetimes {
    pub static_ms: u64,
    pub block_ms: u64,
}

/// Subtrees to scan after draining an adapter's observers.
#[derive(Debug, Default)]
pub(crate) struct Batch {
    /// Any records at all were delivered.
    pub had_records: bool,
    /// Newly added nodes, in record order.
    pub roots: Vec<NodeId>,
}

#[derive(Debug)]
pub(crate) enum Adapter {
    Static {
        observer: Option<ObserverId>,
    },
    Incremental {
        observer: ObserverId,
        blocks: HashMap<NodeId, ObserverId>,
    },
    Direct,
}

/// State for one open view.
#[derive(Debug)]
pub(crate) struct Session {
    pub view: ViewId,
    pub root: NodeId,
    pub mode: RenderMode,
    pub adapter: Adapter,
    pub units: Vec<UnitId>,
    /// Candidates that matched before the host laid them out.
    pub deferred: Vec<NodeId>,
}

impl Session {
    /// Opens a session and installs its observers. Returns the session and
    /// the subtrees to scan right away.
    pub(crate) fn open(
        view: ViewId,
        root: NodeId,
        mode: RenderMode,
        doc: &mut Document,
        timers: &mut TimerQueue<TimerTask>,
        lifetimes: Lifetimes,
        now: u64,
    ) -> (Self, Vec<NodeId>) {
        let (adapter, scan) = match mode {
            RenderMode::Static => {
                let observer = doc.observe(root, ObserveOptions::subtree());
                timers.schedule(
                    now.saturating_add(lifetimes.static_ms),
                    TimerTask::Expire { view, observer },
                );
                (
                    Adapter::Static {
                        observer: Some(observer),
                    },
                    vec![root],
                )
            }
            RenderMode::Incremental => {
                let observer = doc.observe(root, ObserveOptions::children());
                let mut blocks = HashMap::new();
                for block in doc.children(root).to_vec() {
                    watch_block(view, block, doc, timers, &mut blocks, lifetimes, now);
                }
                (Adapter::Incremental { observer, blocks }, vec![root])
            }
            RenderMode::Direct => (Adapter::Direct, Vec::new()),
        };
        let session = Self {
            view,
            root,
            mode,
            adapter,
            units: Vec::new(),
            deferred: Vec::new(),
        };
        (session, scan)
    }

    /// Drains every observer of this session.
    pub(crate) fn collect(
        &mut self,
        doc: &mut Document,
        timers: &mut TimerQueue<TimerTask>,
        lifetimes: Lifetimes,
        now: u64,
    ) -> Batch {
        let mut batch = Batch::default();
        match &mut self.adapter {
            Adapter::Static { observer } => {
                if let Some(observer) = *observer {
                    for record in doc.take_records(observer) {
                        batch.had_records = true;
                        batch.roots.extend(record.added);
                    }
                }
            }
            Adapter::Incremental { observer, blocks } => {
                for record in doc.take_records(*observer) {
                    batch.had_records = true;
                    for block in record.added {
                        if watch_block(self.view, block, doc, timers, blocks, lifetimes, now) {
                            batch.roots.push(block);
                        }
                    }
                }
                let mut watched: Vec<(NodeId, ObserverId)> =
                    blocks.iter().map(|(&b, &o)| (b, o)).collect();
                watched.sort_by_key(|&(b, _)| (b.index(), b.generation()));
                for (_, observer) in watched {
                    for record in doc.take_records(observer) {
                        batch.had_records = true;
                        batch.roots.extend(record.added);
                    }
                }
            }
            Adapter::Direct => {}
        }
        batch.roots.retain(|&n| doc.is_alive(n) && !is_own(doc, n));
        batch
    }

    /// Disconnects a bounded observer whose time ran out.
    pub(crate) fn expire(&mut self, doc: &mut Document, expired: ObserverId) {
        doc.disconnect(expired);
        match &mut self.adapter {
            Adapter::Static { observer } => {
                if *observer == Some(expired) {
                    *observer = None;
                }
            }
            Adapter::Incremental { blocks, .. } => blocks.retain(|_, o| *o != expired),
            Adapter::Direct => {}
        }
    }

    /// Returns `true` while any observer of this session is connected.
    pub(crate) fn is_observing(&self, doc: &Document) -> bool {
        match &self.adapter {
            Adapter::Static { observer } => observer.is_some_and(|o| doc.is_observing(o)),
            Adapter::Incremental { observer, .. } => doc.is_observing(*observer),
            Adapter::Direct => false,
        }
    }

    /// Disconnects every observer.
    pub(crate) fn stop(&mut self, doc: &mut Document) {
        match &mut self.adapter {
            Adapter::Static { observer } => {
                if let Some(o) = observer.take() {
                    doc.disconnect(o);
                }
            }
            Adapter::Incremental { observer, blocks } => {
                doc.disconnect(*observer);
                for (_, o) in blocks.drain() {
                    doc.disconnect(o);
                }
            }
            Adapter::Direct => {}
        }
    }

    /// The incremental block holding `node`, if it is not `node` itself.
    pub(crate) fn live_wrapper(&self, doc: &Document, node: NodeId) -> Option<NodeId> {
        if self.mode != RenderMode::Incremental {
            return None;
        }
        doc.ancestors(node)
            .find(|&a| doc.parent(a) == Some(self.root))
    }
}

/// Installs a bounded subtree observer on `block`, replacing any earlier one.
/// Returns `false` for nodes the engine created itself.
fn watch_block(
    view: ViewId,
    block: NodeId,
    doc: &mut Document,
    timers: &mut TimerQueue<TimerTask>,
    blocks: &mut HashMap<NodeId, ObserverId>,
    lifetimes: Lifetimes,
    now: u64,
) -> bool {
    if !doc.is_alive(block) || is_own(doc, block) {
        return false;
    }
    if let Some(old) = blocks.remove(&block) {
        doc.disconnect(old);
    }
    let observer = doc.observe(block, ObserveOptions::subtree());
    timers.schedule(
        now.saturating_add(lifetimes.block_ms),
        TimerTask::Expire { view, observer },
    );
    blocks.insert(block, observer);
    true
}

/// Returns `true` for viewport containers and anything inside them.
fn is_own(doc: &Document, node: NodeId) -> bool {
    core::iter::once(node)
        .chain(doc.ancestors(node))
        .any(|n| doc.has_class(n, CONTAINER_CLASS))
}
