// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn root_fei() {
    let fei = Fei::root("wf-1");
    assert_eq!(fei.wfid, "wf-1");
    assert_eq!(fei.expid, "0");
    assert_eq!(fei.child_id, 0);
    assert!(fei.is_root_expid());
    assert_eq!(fei.depth(), 1);
}

#[test]
fn child_fei_extends_the_dotted_path() {
    let fei = Fei::root("wf-1").child_fei(2).child_fei(0);
    assert_eq!(fei.expid, "0.2.0");
    assert_eq!(fei.child_id, 0);
    assert!(!fei.is_root_expid());
    assert_eq!(fei.depth(), 3);
}

#[test]
fn display_renders_wfid_and_expid() {
    let fei = Fei::root("wf-1").child_fei(1);
    assert_eq!(fei.to_string(), "wf-1|0.1");
}

#[test]
fn fei_serde_round_trip() {
    let fei = Fei::root("wf-1").child_fei(3);
    let json = serde_json::to_string(&fei).unwrap();
    assert_eq!(json, r#"{"wfid":"wf-1","expid":"0.3","child":3}"#);

    let parsed: Fei = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, fei);
}

#[test]
fn fei_as_value_matches_serde_shape() {
    let fei = Fei::root("wf-1").child_fei(3);
    let value = serde_json::Value::from(&fei);
    assert_eq!(value, serde_json::to_value(&fei).unwrap());
}

#[test]
fn siblings_are_distinct() {
    let parent = Fei::root("wf-1");
    assert_ne!(parent.child_fei(0), parent.child_fei(1));
}
