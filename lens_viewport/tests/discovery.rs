// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Discovery of candidates across render modes, and view lifecycle.

mod common;

use common::{HookCall, Recorder, VIEW, page, ready_page};
use kurbo::Rect;
use lens_doc::NodeId;
use lens_viewport::{
    CONTAINER_CLASS, ConfigError, Engine, RenderMode, Settings, ViewId, export_file_name,
};

fn svg_under(engine: &mut Engine, parent: NodeId) -> NodeId {
    let doc = engine.document_mut();
    let svg = doc.create_element("svg");
    doc.set_rect(svg, Rect::new(0.0, 0.0, 120.0, 80.0)).unwrap();
    doc.append_child(parent, svg).unwrap();
    svg
}

fn empty_view(settings: Settings) -> (Engine, NodeId) {
    let mut engine = Engine::new(settings).unwrap();
    let doc = engine.document_mut();
    let view_root = doc.create_element("div");
    doc.append_child(doc.root(), view_root).unwrap();
    (engine, view_root)
}

fn container_count(engine: &Engine) -> usize {
    let doc = engine.document();
    doc.descendants(doc.root())
        .filter(|&n| doc.has_class(n, CONTAINER_CLASS))
        .count()
}

#[test]
fn static_observer_expires() {
    let mut page = page(Settings::default());
    page.engine.open_view(VIEW, page.view_root, RenderMode::Static);
    assert_eq!(page.engine.next_deadline(), Some(5000));

    page.engine.tick(4000);
    assert!(page.engine.is_observing(VIEW));
    page.engine.tick(5000);
    assert!(!page.engine.is_observing(VIEW));
    assert_eq!(page.engine.next_deadline(), None);
}

#[test]
fn static_view_catches_late_renders_until_expiry() {
    let mut page = page(Settings::default());
    page.engine.open_view(VIEW, page.view_root, RenderMode::Static);
    page.engine.tick(16);
    assert_eq!(page.engine.units_for_view(VIEW).len(), 1);

    let late = svg_under(&mut page.engine, page.view_root);
    page.engine.tick(1000);
    assert_eq!(page.engine.units_for_view(VIEW).len(), 2);
    assert!(page.engine.claimed(late));

    page.engine.tick(6000);
    let too_late = svg_under(&mut page.engine, page.view_root);
    page.engine.tick(6016);
    assert_eq!(page.engine.units_for_view(VIEW).len(), 2);
    assert!(!page.engine.claimed(too_late));
}

#[test]
fn incremental_placeholder_filled_later_activates_once() {
    let (mut engine, view_root) = empty_view(Settings::default());
    let recorder = Recorder::default();
    engine.set_hooks(Box::new(recorder.clone()));
    engine.open_view(VIEW, view_root, RenderMode::Incremental);

    let block = engine.document_mut().create_element("div");
    engine.document_mut().append_child(view_root, block).unwrap();
    engine.tick(16);
    assert!(engine.units_for_view(VIEW).is_empty());

    let svg = svg_under(&mut engine, block);
    engine.tick(200);
    let [unit] = engine.units_for_view(VIEW) else {
        panic!("expected one unit");
    };
    let unit = *unit;
    // Claimed and wrapped within the same tick.
    assert!(engine.unit(unit).unwrap().is_active());
    assert_eq!(engine.unit(unit).unwrap().element(), svg);

    engine.tick(216);
    engine.tick(232);
    assert_eq!(engine.units_for_view(VIEW), &[unit]);
    assert_eq!(container_count(&engine), 1);
    assert_eq!(recorder.calls(), [HookCall::Created(VIEW, unit)]);
}

#[test]
fn incremental_view_keeps_watching_for_new_blocks() {
    let (mut engine, view_root) = empty_view(Settings::default());
    engine.open_view(VIEW, view_root, RenderMode::Incremental);

    let block = engine.document_mut().create_element("div");
    engine.document_mut().append_child(view_root, block).unwrap();
    engine.tick(16);

    // The block's own observer is gone after its timeout...
    engine.tick(6000);
    let stale = svg_under(&mut engine, block);
    engine.tick(6016);
    assert!(!engine.claimed(stale));

    // ...but blocks arriving later are still picked up.
    let fresh = engine.document_mut().create_element("div");
    engine.document_mut().append_child(view_root, fresh).unwrap();
    let svg = svg_under(&mut engine, fresh);
    engine.tick(60_000);
    assert!(engine.is_observing(VIEW));
    assert!(engine.claimed(svg));
    assert_eq!(engine.units_for_view(VIEW).len(), 1);
}

#[test]
fn unlaid_candidate_is_retried_on_the_next_batch() {
    let mut page = page(Settings::default());
    page.engine.document_mut().set_rect(page.svg, Rect::ZERO).unwrap();
    page.engine.open_view(VIEW, page.view_root, RenderMode::Static);
    page.engine.tick(16);
    assert!(page.engine.units_for_view(VIEW).is_empty());
    assert!(!page.engine.claimed(page.svg));

    page.engine.document_mut().set_rect(page.svg, Rect::new(0.0, 0.0, 400.0, 300.0)).unwrap();
    // Geometry alone produces no mutation record.
    page.engine.tick(32);
    assert!(page.engine.units_for_view(VIEW).is_empty());

    let doc = page.engine.document_mut();
    let sibling = doc.create_element("span");
    doc.append_child(page.view_root, sibling).unwrap();
    page.engine.tick(48);
    let [unit] = page.engine.units_for_view(VIEW) else {
        panic!("expected the deferred candidate to activate");
    };
    assert!(page.engine.unit(*unit).unwrap().is_active());
}

#[test]
fn direct_views_only_take_picks() {
    let mut page = page(Settings::default());
    page.engine.open_view(VIEW, page.view_root, RenderMode::Direct);
    page.engine.tick(16);
    assert!(page.engine.units_for_view(VIEW).is_empty());
    assert!(!page.engine.is_observing(VIEW));

    let unit = page.engine.pick(VIEW, page.svg).unwrap();
    assert_eq!(page.engine.units_for_view(VIEW), &[unit]);

    // Outside the view's root.
    let root = page.engine.document().root();
    let stray = svg_under(&mut page.engine, root);
    assert_eq!(page.engine.pick(VIEW, stray), None);
    assert!(!page.engine.claimed(stray));
}

#[test]
fn closing_a_view_releases_claims_and_notifies() {
    let recorder = Recorder::default();
    let mut page = page(Settings::default());
    page.engine.set_hooks(Box::new(recorder.clone()));
    page.engine.open_view(VIEW, page.view_root, RenderMode::Static);
    page.engine.tick(16);
    let unit = page.engine.units_for_view(VIEW)[0];

    assert!(page.engine.close_view(VIEW));
    assert!(!page.engine.close_view(VIEW));
    assert!(!page.engine.claimed(page.svg));
    assert!(!page.engine.is_observing(VIEW));
    assert_eq!(page.engine.next_deadline(), None);
    assert_eq!(
        recorder.calls(),
        [HookCall::Created(VIEW, unit), HookCall::Cleared(VIEW)]
    );
    assert_eq!(container_count(&page.engine), 0);
}

#[test]
fn queued_activation_is_dropped_with_its_view() {
    let mut page = page(Settings::default());
    page.engine.open_view(VIEW, page.view_root, RenderMode::Static);
    page.engine.close_view(VIEW);
    page.engine.tick(16);
    assert_eq!(container_count(&page.engine), 0);
    assert_eq!(page.engine.document().parent(page.svg), Some(page.figure));
}

#[test]
fn reopening_a_view_starts_over() {
    let (mut page, first) = ready_page(Settings::default());
    page.engine.set_active_view(Some(VIEW));
    page.engine.source_changed(VIEW);
    assert_eq!(page.engine.active_view(), Some(VIEW));
    assert!(page.engine.unit(first).is_none());

    page.engine.tick(48);
    let [second] = page.engine.units_for_view(VIEW) else {
        panic!("expected one unit after rediscovery");
    };
    assert_ne!(*second, first);
    assert_eq!(container_count(&page.engine), 1);

    page.engine.open_view(VIEW, page.view_root, RenderMode::Direct);
    assert!(page.engine.units_for_view(VIEW).is_empty());
    assert_eq!(container_count(&page.engine), 0);
}

#[test]
fn views_are_independent() {
    let mut page = page(Settings::default());
    let other_root = page.engine.document_mut().create_element("div");
    let root = page.engine.document().root();
    page.engine.document_mut().append_child(root, other_root).unwrap();
    let other_svg = svg_under(&mut page.engine, other_root);

    let other = ViewId(8);
    page.engine.open_view(VIEW, page.view_root, RenderMode::Static);
    page.engine.open_view(other, other_root, RenderMode::Static);
    page.engine.tick(16);
    assert_eq!(page.engine.units_for_view(VIEW).len(), 1);
    assert_eq!(page.engine.units_for_view(other).len(), 1);

    page.engine.close_view(VIEW);
    assert!(page.engine.claimed(other_svg));
    assert_eq!(page.engine.units_for_view(other).len(), 1);
}

#[test]
fn specific_rules_win_over_generic_ones() {
    let settings = Settings::from_json(
        r#"{
            "rules": [
                { "name": "any vector", "selector": "svg", "generic": true },
                { "name": "Flow Chart", "selector": ".diagram > svg" }
            ]
        }"#,
    )
    .unwrap();
    let (page, unit) = ready_page(settings);
    let u = page.engine.unit(unit).unwrap();
    assert_eq!(u.rule_name(), "Flow Chart");
    assert_eq!(export_file_name(u), "flow-chart-1.svg");
}

#[test]
fn disabled_rules_match_nothing() {
    let settings = Settings::from_json(
        r#"{ "rules": [{ "name": "any vector", "selector": "svg", "enabled": false }] }"#,
    )
    .unwrap();
    let mut page = page(settings);
    page.engine.open_view(VIEW, page.view_root, RenderMode::Static);
    page.engine.tick(16);
    assert!(page.engine.units_for_view(VIEW).is_empty());
}

#[test]
fn invalid_settings_are_rejected_up_front() {
    let settings = Settings::from_json(r#"{ "rules": [{ "name": "bad", "selector": "svg[" }] }"#)
        .unwrap();
    let err = Engine::new(settings).unwrap_err();
    assert!(matches!(err, ConfigError::Selector { ref rule, .. } if rule == "bad"));
}
