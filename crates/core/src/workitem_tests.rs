// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn new_workitem_has_no_fields() {
    let wi = Workitem::new(Fei::root("wf-1"));
    assert!(wi.fields.is_empty());
    assert!(!wi.timed_out());
}

#[test]
fn with_fei_readdresses_the_workitem() {
    let root = Fei::root("wf-1");
    let child = root.child_fei(0);
    let wi = Workitem::new(root).with_fei(child.clone());
    assert_eq!(wi.fei, child);
}

#[test]
fn field_accessors() {
    let mut wi = Workitem::new(Fei::root("wf-1"));
    wi.set_field("customer", json!("acme"));

    assert_eq!(wi.field("customer"), Some(&json!("acme")));
    assert_eq!(wi.field("missing"), None);
}

#[test]
fn timed_out_after_stamp() {
    let mut wi = Workitem::new(Fei::root("wf-1"));
    wi.set_field(TIMED_OUT_FIELD, json!(["wf-1|0", 1_000]));
    assert!(wi.timed_out());
}

#[test]
fn clone_is_deep() {
    let mut wi = Workitem::new(Fei::root("wf-1"));
    wi.set_field("n", json!(1));

    let mut copy = wi.clone();
    copy.set_field("n", json!(2));

    assert_eq!(wi.field("n"), Some(&json!(1)));
}

#[test]
fn workitem_serde_round_trip() {
    let mut wi = Workitem::new(Fei::root("wf-1").child_fei(1));
    wi.set_field("customer", json!("acme"));

    let json = serde_json::to_string(&wi).unwrap();
    let parsed: Workitem = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, wi);
}
