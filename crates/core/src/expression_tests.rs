// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::tree;
use serde_json::json;

fn data() -> ExpressionData {
    let fei = Fei::root("wf-1");
    let tree = tree!("sequence", { "on_error" => "redo", "timeout" => "1s" }, [tree!("echo")]);
    let wi = Workitem::new(fei.clone());
    ExpressionData::new(fei, None, tree, wi, Some(Default::default()), None, 1_000)
}

#[test]
fn handlers_are_captured_at_construction() {
    let d = data();
    assert_eq!(d.on_error, Some(json!("redo")));
    assert_eq!(d.on_cancel, None);
    assert_eq!(d.on_timeout, None);
    assert_eq!(d.handler(HandlerKind::OnError), Some(&json!("redo")));
}

#[test]
fn new_expression_is_active_and_childless() {
    let d = data();
    assert_eq!(d.state, ExprState::Active);
    assert!(d.children.is_empty());
    assert!(d.updated_tree.is_none());
    assert_eq!(d.created_at_ms, 1_000);
    assert_eq!(d.modified_at_ms, 1_000);
}

#[test]
fn tree_prefers_the_updated_copy() {
    let mut d = data();
    assert_eq!(d.tree().name, "sequence");

    d.update_tree().name = "concurrence".into();
    assert_eq!(d.tree().name, "concurrence");
    assert_eq!(d.original_tree.name, "sequence");
}

#[test]
fn update_tree_is_a_deep_copy() {
    let mut d = data();
    d.update_tree().children[0].name = "participant".into();

    assert_eq!(d.original_tree.children[0].name, "echo");
    assert_eq!(d.tree().children[0].name, "participant");
}

#[test]
fn child_registration_is_idempotent() {
    let mut d = data();
    let child = d.fei.child_fei(0);

    assert!(d.register_child(child.clone()));
    assert!(!d.register_child(child.clone()));
    assert_eq!(d.children.len(), 1);

    assert!(d.unregister_child(&child));
    assert!(!d.unregister_child(&child));
    assert!(d.children.is_empty());
}

#[test]
fn scope_ownership_follows_variables() {
    let mut d = data();
    assert!(d.owns_scope());

    d.variables = None;
    assert!(!d.owns_scope());
}

#[test]
fn expression_serde_round_trip() {
    let mut d = data();
    d.register_child(d.fei.child_fei(0));
    d.tagname = Some("main".into());
    d.timeout_job_id = Some("tj-abc".to_string());
    d.triggered_by = Some(HandlerKind::OnError);

    let json = serde_json::to_string(&d).unwrap();
    let parsed: ExpressionData = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, d);
}
