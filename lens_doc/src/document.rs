// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The document arena and its editing operations.

use alloc::string::String;
use alloc::vec::Vec;
use core::iter;

use kurbo::Rect;
use smallvec::SmallVec;

use crate::observer::{ObserverSlot, ObserverState};
use crate::{DocError, MutationRecord, NodeId, ObserveOptions, ObserverId};

#[derive(Clone, Debug, Default)]
pub(crate) struct NodeData {
    pub(crate) tag: String,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) style: Vec<(String, String)>,
    pub(crate) text: Option<String>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) rect: Rect,
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    node: Option<NodeData>,
}

/// A tree of elements mirrored from the rendering host.
///
/// Every edit that changes a node's children, attributes, classes, or text
/// is reported to the observers watching that node. Bounding rectangles are
/// host-reported layout results and are not observable.
#[derive(Clone, Debug)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    observers: Vec<ObserverSlot>,
    free_observers: Vec<u32>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document holding only its root element.
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId::new(0, 1),
            observers: Vec::new(),
            free_observers: Vec::new(),
        };
        doc.root = doc.alloc("html");
        doc
    }

    /// Returns the root element.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(tag)
    }

    /// Returns `true` if `id` refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.data(id).is_some()
    }

    /// Number of live nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Always `false`; the root is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the element's tag name.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.data(id).map(|d| d.tag.as_str())
    }

    /// Returns the parent of `id`, if attached.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).and_then(|d| d.parent)
    }

    /// Returns the children of `id` in order. Empty for stale handles.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.data(id) {
            Some(d) => &d.children,
            None => &[],
        }
    }

    /// Returns the position of `child` under `parent`.
    #[must_use]
    pub fn index_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    /// Iterates the strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Iterates the strict descendants of `id` in document (pre-)order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    /// Returns `true` if `node` is `ancestor` or lies beneath it.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if !self.is_alive(ancestor) || !self.is_alive(node) {
            return false;
        }
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Returns `true` if `id` is attached beneath the document root.
    #[must_use]
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.root, id)
    }

    /// Appends `child` as the last child of `parent`, moving it if attached elsewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DocError> {
        self.insert_before(parent, child, None)
    }

    /// Inserts `child` under `parent` before `reference` (or last when `None`).
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DocError> {
        self.check_insertable(parent, child)?;
        if let Some(r) = reference {
            if r == child {
                return Ok(());
            }
            if self.parent(r) != Some(parent) {
                return Err(DocError::NotAChild { parent, child: r });
            }
        }
        self.detach(child)?;
        let at = match reference {
            Some(r) => self.index_of(parent, r).ok_or(DocError::NotAChild { parent, child: r })?,
            None => self.children(parent).len(),
        };
        self.data_mut(parent)
            .ok_or(DocError::Stale(parent))?
            .children
            .insert(at, child);
        if let Some(d) = self.data_mut(child) {
            d.parent = Some(parent);
        }
        self.record(MutationRecord::child_list(parent, &[child], &[]));
        Ok(())
    }

    /// Removes `child` from `parent`, leaving it alive but detached.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DocError> {
        let at = self
            .index_of(parent, child)
            .ok_or(DocError::NotAChild { parent, child })?;
        self.data_mut(parent)
            .ok_or(DocError::Stale(parent))?
            .children
            .remove(at);
        if let Some(d) = self.data_mut(child) {
            d.parent = None;
        }
        self.record(MutationRecord::child_list(parent, &[], &[child]));
        Ok(())
    }

    /// Puts `new` where `old` sits under `parent`; `old` ends up detached.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new: NodeId,
        old: NodeId,
    ) -> Result<(), DocError> {
        if new == old {
            return Ok(());
        }
        if self.parent(old) != Some(parent) {
            return Err(DocError::NotAChild { parent, child: old });
        }
        self.check_insertable(parent, new)?;
        self.detach(new)?;
        let at = self
            .index_of(parent, old)
            .ok_or(DocError::NotAChild { parent, child: old })?;
        self.data_mut(parent)
            .ok_or(DocError::Stale(parent))?
            .children[at] = new;
        if let Some(d) = self.data_mut(old) {
            d.parent = None;
        }
        if let Some(d) = self.data_mut(new) {
            d.parent = Some(parent);
        }
        self.record(MutationRecord::child_list(parent, &[new], &[old]));
        Ok(())
    }

    /// Detaches `id` from its parent, if any.
    pub fn detach(&mut self, id: NodeId) -> Result<(), DocError> {
        if id == self.root {
            return Err(DocError::Root);
        }
        match self.data(id) {
            None => Err(DocError::Stale(id)),
            Some(d) => match d.parent {
                Some(parent) => self.remove_child(parent, id),
                None => Ok(()),
            },
        }
    }

    /// Detaches `id` and frees it together with its whole subtree.
    pub fn destroy(&mut self, id: NodeId) -> Result<(), DocError> {
        self.detach(id)?;
        let doomed: Vec<NodeId> = iter::once(id).chain(self.descendants(id)).collect();
        for node in doomed {
            let slot = &mut self.slots[node.idx()];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(node.0);
        }
        Ok(())
    }

    /// Returns an attribute value.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.data(id)?
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if the attribute is present.
    #[must_use]
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Iterates attributes in insertion order.
    pub fn attributes(&self, id: NodeId) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.data(id)
            .into_iter()
            .flat_map(|d| d.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DocError> {
        let data = self.data_mut(id).ok_or(DocError::Stale(id))?;
        match data.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) if *v == value => return Ok(()),
            Some((_, v)) => *v = value.into(),
            None => data.attrs.push((name.into(), value.into())),
        }
        self.record(MutationRecord::attribute(id, name));
        Ok(())
    }

    /// Removes an attribute. Returns whether it was present.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<bool, DocError> {
        let data = self.data_mut(id).ok_or(DocError::Stale(id))?;
        let before = data.attrs.len();
        data.attrs.retain(|(k, _)| k != name);
        let removed = data.attrs.len() != before;
        if removed {
            self.record(MutationRecord::attribute(id, name));
        }
        Ok(removed)
    }

    /// Returns the class list in order. Empty for stale handles.
    #[must_use]
    pub fn classes(&self, id: NodeId) -> &[String] {
        match self.data(id) {
            Some(d) => &d.classes,
            None => &[],
        }
    }

    /// Returns `true` if the element carries `class`.
    #[must_use]
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).iter().any(|c| c == class)
    }

    /// Adds a class if not already present.
    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<(), DocError> {
        let data = self.data_mut(id).ok_or(DocError::Stale(id))?;
        if data.classes.iter().any(|c| c == class) {
            return Ok(());
        }
        data.classes.push(class.into());
        self.record(MutationRecord::attribute(id, "class"));
        Ok(())
    }

    /// Removes a class. Returns whether it was present.
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> Result<bool, DocError> {
        let data = self.data_mut(id).ok_or(DocError::Stale(id))?;
        let before = data.classes.len();
        data.classes.retain(|c| c != class);
        let removed = data.classes.len() != before;
        if removed {
            self.record(MutationRecord::attribute(id, "class"));
        }
        Ok(removed)
    }

    /// Removes and returns the whole class list.
    pub fn take_classes(&mut self, id: NodeId) -> Result<Vec<String>, DocError> {
        let data = self.data_mut(id).ok_or(DocError::Stale(id))?;
        let classes = core::mem::take(&mut data.classes);
        if !classes.is_empty() {
            self.record(MutationRecord::attribute(id, "class"));
        }
        Ok(classes)
    }

    /// Returns an inline style property.
    #[must_use]
    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.data(id)?
            .style
            .iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v.as_str())
    }

    /// Sets an inline style property.
    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) -> Result<(), DocError> {
        let data = self.data_mut(id).ok_or(DocError::Stale(id))?;
        match data.style.iter_mut().find(|(k, _)| k == property) {
            Some((_, v)) if *v == value => return Ok(()),
            Some((_, v)) => *v = value.into(),
            None => data.style.push((property.into(), value.into())),
        }
        self.record(MutationRecord::attribute(id, "style"));
        Ok(())
    }

    /// Removes an inline style property. Returns whether it was present.
    pub fn remove_style(&mut self, id: NodeId, property: &str) -> Result<bool, DocError> {
        let data = self.data_mut(id).ok_or(DocError::Stale(id))?;
        let before = data.style.len();
        data.style.retain(|(k, _)| k != property);
        let removed = data.style.len() != before;
        if removed {
            self.record(MutationRecord::attribute(id, "style"));
        }
        Ok(removed)
    }

    /// Returns the text payload of the element.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.data(id)?.text.as_deref()
    }

    /// Replaces the text payload of the element.
    pub fn set_text(&mut self, id: NodeId, text: Option<&str>) -> Result<(), DocError> {
        let data = self.data_mut(id).ok_or(DocError::Stale(id))?;
        data.text = text.map(String::from);
        self.record(MutationRecord::text(id));
        Ok(())
    }

    /// Returns the last bounding rect reported by the host. Zero for stale handles.
    #[must_use]
    pub fn rect(&self, id: NodeId) -> Rect {
        self.data(id).map_or(Rect::ZERO, |d| d.rect)
    }

    /// Returns `true` if the host reported a non-empty bounding rect.
    #[must_use]
    pub fn has_geometry(&self, id: NodeId) -> bool {
        let r = self.rect(id);
        r.width() > 0.0 && r.height() > 0.0
    }

    /// Stores a host-reported bounding rect.
    pub fn set_rect(&mut self, id: NodeId, rect: Rect) -> Result<(), DocError> {
        self.data_mut(id).ok_or(DocError::Stale(id))?.rect = rect;
        Ok(())
    }

    /// Starts observing `target`.
    pub fn observe(&mut self, target: NodeId, options: ObserveOptions) -> ObserverId {
        let state = ObserverState {
            target,
            options,
            queue: Vec::new(),
        };
        if let Some(idx) = self.free_observers.pop() {
            let slot = &mut self.observers[idx as usize];
            slot.state = Some(state);
            ObserverId(idx, slot.generation)
        } else {
            let idx = slot_index(self.observers.len());
            self.observers.push(ObserverSlot {
                generation: 1,
                state: Some(state),
            });
            ObserverId(idx, 1)
        }
    }

    /// Returns `true` while the observer is connected.
    #[must_use]
    pub fn is_observing(&self, observer: ObserverId) -> bool {
        self.observer(observer).is_some()
    }

    /// Drains the records queued for `observer`. Empty once disconnected.
    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .get_mut(observer.0 as usize)
            .filter(|s| s.generation == observer.1)
            .and_then(|s| s.state.as_mut())
            .map(|s| core::mem::take(&mut s.queue))
            .unwrap_or_default()
    }

    /// Disconnects `observer`, dropping queued records. Returns whether it was connected.
    pub fn disconnect(&mut self, observer: ObserverId) -> bool {
        match self.observers.get_mut(observer.0 as usize) {
            Some(slot) if slot.generation == observer.1 && slot.state.is_some() => {
                slot.state = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free_observers.push(observer.0);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn data(&self, id: NodeId) -> Option<&NodeData> {
        let slot = self.slots.get(id.idx())?;
        if slot.generation != id.1 {
            return None;
        }
        slot.node.as_ref()
    }

    fn data_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.1 {
            return None;
        }
        slot.node.as_mut()
    }

    fn observer(&self, observer: ObserverId) -> Option<&ObserverState> {
        self.observers
            .get(observer.0 as usize)
            .filter(|s| s.generation == observer.1)
            .and_then(|s| s.state.as_ref())
    }

    fn alloc(&mut self, tag: &str) -> NodeId {
        let node = NodeData {
            tag: tag.into(),
            ..NodeData::default()
        };
        if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.node = Some(node);
            NodeId::new(idx, slot.generation)
        } else {
            let idx = slot_index(self.slots.len());
            self.slots.push(Slot {
                generation: 1,
                node: Some(node),
            });
            NodeId::new(idx, 1)
        }
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<(), DocError> {
        if !self.is_alive(parent) {
            return Err(DocError::Stale(parent));
        }
        if !self.is_alive(child) {
            return Err(DocError::Stale(child));
        }
        if child == self.root {
            return Err(DocError::Root);
        }
        if self.contains(child, parent) {
            return Err(DocError::WouldCycle { parent, child });
        }
        Ok(())
    }

    fn record(&mut self, record: MutationRecord) {
        let interested: SmallVec<[usize; 4]> = self
            .observers
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                let state = slot.state.as_ref()?;
                let in_scope = state.target == record.target
                    || (state.options.subtree && self.contains(state.target, record.target));
                (in_scope && state.wants(&record)).then_some(i)
            })
            .collect();
        for i in interested {
            if let Some(state) = self.observers[i].state.as_mut() {
                state.queue.push(record.clone());
            }
        }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "documents never approach u32::MAX slots"
)]
fn slot_index(len: usize) -> u32 {
    len as u32
}

/// Pre-order iterator over strict descendants; see [`Document::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let next = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(next).iter().rev().copied());
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use kurbo::Rect;

    use crate::{DocError, Document, MutationKind, ObserveOptions};

    #[test]
    fn stale_handles_never_alias() {
        let mut doc = Document::new();
        let a = doc.create_element("div");
        doc.destroy(a).unwrap();
        let b = doc.create_element("span");
        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);
        assert!(!doc.is_alive(a));
        assert_eq!(doc.tag(b), Some("span"));
    }

    #[test]
    fn replace_child_keeps_position() {
        let mut doc = Document::new();
        let parent = doc.create_element("p");
        let [a, b, c] = ["a", "b", "c"].map(|t| doc.create_element(t));
        for n in [a, b, c] {
            doc.append_child(parent, n).unwrap();
        }
        let wrapper = doc.create_element("div");
        doc.replace_child(parent, wrapper, b).unwrap();
        assert_eq!(doc.children(parent), &[a, wrapper, c]);
        assert_eq!(doc.parent(b), None);

        doc.replace_child(parent, b, wrapper).unwrap();
        assert_eq!(doc.children(parent), &[a, b, c]);
    }

    #[test]
    fn replace_with_sibling_moves_it() {
        let mut doc = Document::new();
        let parent = doc.create_element("p");
        let [a, b, c] = ["a", "b", "c"].map(|t| doc.create_element(t));
        for n in [a, b, c] {
            doc.append_child(parent, n).unwrap();
        }
        doc.replace_child(parent, a, c).unwrap();
        assert_eq!(doc.children(parent), &[b, a]);
    }

    #[test]
    fn cycles_are_rejected() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(outer, inner).unwrap();
        assert_eq!(
            doc.append_child(inner, outer),
            Err(DocError::WouldCycle {
                parent: inner,
                child: outer
            })
        );
        assert_eq!(doc.destroy(doc.root()), Err(DocError::Root));
    }

    #[test]
    fn destroy_frees_the_subtree() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("svg");
        doc.append_child(doc.root(), outer).unwrap();
        doc.append_child(outer, inner).unwrap();
        let before = doc.len();
        doc.destroy(outer).unwrap();
        assert_eq!(doc.len(), before - 2);
        assert!(!doc.is_alive(inner));
        assert!(doc.children(doc.root()).is_empty());
    }

    #[test]
    fn descendants_are_preorder() {
        let mut doc = Document::new();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        let c = doc.create_element("c");
        let d = doc.create_element("d");
        doc.append_child(a, b).unwrap();
        doc.append_child(b, c).unwrap();
        doc.append_child(a, d).unwrap();
        let order: Vec<_> = doc.descendants(a).collect();
        assert_eq!(order, vec![b, c, d]);
        assert!(doc.contains(a, c));
        assert!(!doc.contains(d, c));
        assert!(!doc.is_connected(c));
    }

    #[test]
    fn children_observer_ignores_grandchildren() {
        let mut doc = Document::new();
        let view = doc.create_element("div");
        let block = doc.create_element("div");
        doc.append_child(doc.root(), view).unwrap();
        let obs = doc.observe(view, ObserveOptions::children());
        doc.append_child(view, block).unwrap();
        let svg = doc.create_element("svg");
        doc.append_child(block, svg).unwrap();
        let records = doc.take_records(obs);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].target, view);
        assert!(doc.take_records(obs).is_empty());
    }

    #[test]
    fn attribute_records_are_opt_in() {
        let mut doc = Document::new();
        let el = doc.create_element("svg");
        let quiet = doc.observe(el, ObserveOptions::subtree());
        let loud = doc.observe(
            el,
            ObserveOptions {
                subtree: true,
                attributes: true,
            },
        );
        doc.set_attribute(el, "data-x", "1").unwrap();
        doc.set_attribute(el, "data-x", "1").unwrap();
        doc.add_class(el, "mermaid").unwrap();
        assert!(doc.take_records(quiet).is_empty());
        let records = doc.take_records(loud);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, MutationKind::Attribute("data-x".into()));
        assert_eq!(records[1].kind, MutationKind::Attribute("class".into()));
    }

    #[test]
    fn disconnected_observer_stops_collecting() {
        let mut doc = Document::new();
        let view = doc.create_element("div");
        let obs = doc.observe(view, ObserveOptions::subtree());
        assert!(doc.disconnect(obs));
        assert!(!doc.disconnect(obs));
        let child = doc.create_element("img");
        doc.append_child(view, child).unwrap();
        assert!(doc.take_records(obs).is_empty());
        assert!(!doc.is_observing(obs));

        // A reused slot does not revive the old handle.
        let fresh = doc.observe(view, ObserveOptions::subtree());
        assert_ne!(fresh, obs);
        assert!(!doc.is_observing(obs));
    }

    #[test]
    fn classes_and_style_round_trip() {
        let mut doc = Document::new();
        let el = doc.create_element("div");
        doc.add_class(el, "a").unwrap();
        doc.add_class(el, "b").unwrap();
        doc.add_class(el, "a").unwrap();
        assert_eq!(doc.classes(el), &["a", "b"]);
        let taken = doc.take_classes(el).unwrap();
        assert_eq!(taken, vec!["a", "b"]);
        assert!(doc.classes(el).is_empty());

        doc.set_style(el, "opacity", "0").unwrap();
        assert_eq!(doc.style(el, "opacity"), Some("0"));
        assert!(doc.remove_style(el, "opacity").unwrap());
        assert!(!doc.remove_style(el, "opacity").unwrap());

        doc.set_rect(el, Rect::new(0.0, 0.0, 0.0, 10.0)).unwrap();
        assert!(!doc.has_geometry(el));
    }
}
