// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered match rules and the claim guard.

use alloc::string::String;
use alloc::vec::Vec;

use lens_doc::{Document, NodeId};

use crate::Selector;

/// Attribute written onto a node once it has been claimed by a viewport.
pub const CLAIM_ATTRIBUTE: &str = "data-lens-claimed";

/// Returns `true` if the node carries the claim attribute.
#[must_use]
pub fn is_claimed(doc: &Document, node: NodeId) -> bool {
    doc.has_attribute(node, CLAIM_ATTRIBUTE)
}

/// Removes the claim attribute so the node can be discovered again.
///
/// Returns whether the node was claimed.
pub fn release(doc: &mut Document, node: NodeId) -> bool {
    doc.remove_attribute(node, CLAIM_ATTRIBUTE).unwrap_or(false)
}

/// A named selector rule carrying a caller-defined payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule<T> {
    /// Display name, also written as the claim attribute value.
    pub name: String,
    /// Nodes this rule applies to.
    pub selector: Selector,
    /// Catch-all rules are evaluated after every specific rule.
    pub generic: bool,
    /// Disabled rules never match.
    pub enabled: bool,
    /// Caller payload (per-rule configuration).
    pub payload: T,
}

impl<T> Rule<T> {
    /// Creates an enabled, specific rule.
    pub fn new(name: impl Into<String>, selector: Selector, payload: T) -> Self {
        Self {
            name: name.into(),
            selector,
            generic: false,
            enabled: true,
            payload,
        }
    }

    /// Creates an enabled catch-all rule.
    pub fn generic(name: impl Into<String>, selector: Selector, payload: T) -> Self {
        Self {
            generic: true,
            ..Self::new(name, selector, payload)
        }
    }
}

/// Result of [`RuleSet::claim`].
#[derive(Debug)]
pub enum Claim<'a, T> {
    /// The node matched this rule and now carries [`CLAIM_ATTRIBUTE`].
    Claimed(&'a Rule<T>),
    /// The node was claimed earlier.
    AlreadyClaimed,
    /// No enabled rule matches.
    NoMatch,
    /// The node is stale or has no parent to be wrapped in.
    NotParented,
    /// The node matches but the host has not laid it out yet.
    NoGeometry,
}

/// Rules in precedence order: specific rules, then generic rules, each in
/// insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleSet<T> {
    rules: Vec<Rule<T>>,
}

impl<T> Default for RuleSet<T> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<T> RuleSet<T> {
    /// Creates an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a rule at the end of its precedence group.
    pub fn push(&mut self, rule: Rule<T>) {
        if rule.generic {
            self.rules.push(rule);
        } else {
            let at = self
                .rules
                .iter()
                .position(|r| r.generic)
                .unwrap_or(self.rules.len());
            self.rules.insert(at, rule);
        }
    }

    /// Iterates rules in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule<T>> {
        self.rules.iter()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the first enabled rule matching `node`, without claiming it.
    #[must_use]
    pub fn find(&self, doc: &Document, node: NodeId) -> Option<&Rule<T>> {
        self.rules
            .iter()
            .find(|r| r.enabled && r.selector.matches(doc, node))
    }

    /// Returns `true` if any enabled rule matches `node`.
    #[must_use]
    pub fn any_match(&self, doc: &Document, node: NodeId) -> bool {
        self.find(doc, node).is_some()
    }

    /// Collects `root` (if it matches) and every matching descendant, in
    /// document order. Claimed nodes are skipped.
    #[must_use]
    pub fn candidates(&self, doc: &Document, root: NodeId) -> Vec<NodeId> {
        core::iter::once(root)
            .chain(doc.descendants(root))
            .filter(|&n| !is_claimed(doc, n) && self.any_match(doc, n))
            .collect()
    }

    /// Matches `node` and, on success, claims it before returning.
    ///
    /// Nodes that are already claimed, detached, or not yet laid out are
    /// reported without being claimed. Zero-size nodes can be retried later.
    pub fn claim(&self, doc: &mut Document, node: NodeId) -> Claim<'_, T> {
        if is_claimed(doc, node) {
            return Claim::AlreadyClaimed;
        }
        if doc.parent(node).is_none() {
            return Claim::NotParented;
        }
        let Some(rule) = self.find(doc, node) else {
            return Claim::NoMatch;
        };
        if !doc.has_geometry(node) {
            return Claim::NoGeometry;
        }
        if doc.set_attribute(node, CLAIM_ATTRIBUTE, &rule.name).is_err() {
            return Claim::NotParented;
        }
        Claim::Claimed(rule)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use kurbo::Rect;
    use lens_doc::Document;

    use super::*;

    fn sel(s: &str) -> Selector {
        Selector::parse(s).unwrap()
    }

    #[test]
    fn specific_rules_precede_generic_ones() {
        let mut rules = RuleSet::new();
        rules.push(Rule::generic("any vector", sel("svg"), 0));
        rules.push(Rule::new("first", sel(".a svg"), 1));
        rules.push(Rule::generic("any raster", sel("img"), 2));
        rules.push(Rule::new("second", sel(".b svg"), 3));
        let names: Vec<_> = rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["first", "second", "any vector", "any raster"]);
    }

    #[test]
    fn catch_all_never_shadows_specific_rule() {
        let mut doc = Document::new();
        let wrap = doc.create_element("div");
        doc.add_class(wrap, "a").unwrap();
        doc.append_child(doc.root(), wrap).unwrap();
        let svg = doc.create_element("svg");
        doc.append_child(wrap, svg).unwrap();
        doc.set_rect(svg, Rect::new(0.0, 0.0, 5.0, 5.0)).unwrap();

        let mut rules = RuleSet::new();
        rules.push(Rule::generic("any vector", sel("svg"), ()));
        rules.push(Rule::new("specific", sel(".a svg"), ()));
        let Claim::Claimed(rule) = rules.claim(&mut doc, svg) else {
            panic!("expected a claim");
        };
        assert_eq!(rule.name, "specific");
        assert_eq!(doc.attribute(svg, CLAIM_ATTRIBUTE), Some("specific"));
    }

    #[test]
    fn claim_guards() {
        let mut doc = Document::new();
        let rules = {
            let mut r = RuleSet::new();
            r.push(Rule::generic("any vector", sel("svg"), ()));
            r
        };
        let svg = doc.create_element("svg");
        assert!(matches!(rules.claim(&mut doc, svg), Claim::NotParented));

        doc.append_child(doc.root(), svg).unwrap();
        assert!(matches!(rules.claim(&mut doc, svg), Claim::NoGeometry));
        assert!(!is_claimed(&doc, svg));

        doc.set_rect(svg, Rect::new(0.0, 0.0, 5.0, 5.0)).unwrap();
        assert!(matches!(rules.claim(&mut doc, svg), Claim::Claimed(_)));
        assert!(matches!(rules.claim(&mut doc, svg), Claim::AlreadyClaimed));

        assert!(release(&mut doc, svg));
        assert!(matches!(rules.claim(&mut doc, svg), Claim::Claimed(_)));

        let img = doc.create_element("img");
        doc.append_child(doc.root(), img).unwrap();
        doc.set_rect(img, Rect::new(0.0, 0.0, 5.0, 5.0)).unwrap();
        assert!(matches!(rules.claim(&mut doc, img), Claim::NoMatch));
    }

    #[test]
    fn disabled_rules_are_skipped() {
        let mut doc = Document::new();
        let svg = doc.create_element("svg");
        doc.append_child(doc.root(), svg).unwrap();
        let mut rules = RuleSet::new();
        let mut rule = Rule::new("off", sel("svg"), ());
        rule.enabled = false;
        rules.push(rule);
        assert!(rules.find(&doc, svg).is_none());
        assert!(rules.candidates(&doc, doc.root()).is_empty());
    }

    #[test]
    fn candidates_in_document_order() {
        let mut doc = Document::new();
        let a = doc.create_element("svg");
        let wrap = doc.create_element("div");
        let b = doc.create_element("img");
        doc.append_child(doc.root(), a).unwrap();
        doc.append_child(doc.root(), wrap).unwrap();
        doc.append_child(wrap, b).unwrap();
        let mut rules = RuleSet::new();
        rules.push(Rule::generic("v", sel("svg"), ()));
        rules.push(Rule::generic("r", sel("img"), ()));
        assert_eq!(rules.candidates(&doc, doc.root()), [a, b]);
        doc.set_attribute(a, CLAIM_ATTRIBUTE, "v").unwrap();
        assert_eq!(rules.candidates(&doc, doc.root()), [b]);
    }
}
