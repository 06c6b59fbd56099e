// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lens Match: decide whether a rendered node should become a viewport.
//!
//! - [`Selector`]: a small CSS-like selector language (type, `*`, `.class`,
//!   `#id`, `[attr]`, `[attr=value]`, `[attr~=word]`, `[attr^=prefix]`,
//!   `[attr*=needle]`, descendant and `>` child combinators, and `,` lists),
//!   matched against a [`lens_doc::Document`].
//! - [`RuleSet`]: named rules kept in precedence order. Specific rules always
//!   come before generic catch-all rules, so a user rule is never shadowed by
//!   a default "any vector / any image" rule matching the same node.
//! - [`RuleSet::claim`]: the matcher entry point. It writes the
//!   [`CLAIM_ATTRIBUTE`] onto the node synchronously on a match, and nodes
//!   that already carry it short-circuit, so a node is claimed at most once.
//!
//! ```rust
//! use kurbo::Rect;
//! use lens_doc::Document;
//! use lens_match::{Claim, Rule, RuleSet, Selector};
//!
//! let mut rules = RuleSet::new();
//! rules.push(Rule::generic("any vector", Selector::parse("svg").unwrap(), ()));
//! rules.push(Rule::new("flowcharts", Selector::parse(".mermaid > svg").unwrap(), ()));
//!
//! let mut doc = Document::new();
//! let block = doc.create_element("div");
//! doc.add_class(block, "mermaid").unwrap();
//! doc.append_child(doc.root(), block).unwrap();
//! let svg = doc.create_element("svg");
//! doc.append_child(block, svg).unwrap();
//! doc.set_rect(svg, Rect::new(0.0, 0.0, 100.0, 50.0)).unwrap();
//!
//! match rules.claim(&mut doc, svg) {
//!     Claim::Claimed(rule) => assert_eq!(rule.name, "flowcharts"),
//!     other => panic!("unexpected {other:?}"),
//! }
//! assert!(matches!(rules.claim(&mut doc, svg), Claim::AlreadyClaimed));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod rules;
mod selector;

pub use rules::{CLAIM_ATTRIBUTE, Claim, Rule, RuleSet, is_claimed, release};
pub use selector::{AttrOp, AttrSelector, Combinator, Compound, Selector, SelectorError};
