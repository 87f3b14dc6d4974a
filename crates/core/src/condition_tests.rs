// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::fei::Fei;
use crate::tree;
use serde_json::json;

fn workitem() -> Workitem {
    let mut wi = Workitem::new(Fei::root("wf-1"));
    wi.set_field("customer", json!("acme"));
    wi.set_field("count", json!(3));
    wi.set_field("note", Value::Null);
    wi
}

#[test]
fn substitute_replaces_known_fields() {
    let wi = workitem();
    assert_eq!(Condition::substitute("hello ${customer}", &wi), "hello acme");
    assert_eq!(Condition::substitute("${count} items", &wi), "3 items");
}

#[test]
fn substitute_leaves_unknown_fields() {
    let wi = workitem();
    assert_eq!(Condition::substitute("${missing}", &wi), "${missing}");
}

#[test]
fn substitute_renders_null_as_empty() {
    let wi = workitem();
    assert_eq!(Condition::substitute("[${note}]", &wi), "[]");
}

#[yare::parameterized(
    empty      = { "",        false },
    blank      = { "   ",     false },
    false_word = { "false",   false },
    nil_word   = { "nil",     false },
    true_word  = { "true",    true },
    any_word   = { "acme",    true },
    zero       = { "0",       true },
)]
fn truthiness(input: &str, expected: bool) {
    assert_eq!(Condition::truthy(input), expected);
}

#[yare::parameterized(
    eq_true     = { "${customer} == acme", true },
    eq_false    = { "${customer} == umbrella", false },
    ne_true     = { "${customer} != umbrella", true },
    ne_false    = { "${customer} != acme", false },
    plain_true  = { "${customer}", true },
    plain_false = { "false", false },
)]
fn eval_comparisons(expr: &str, expected: bool) {
    assert_eq!(Condition::eval(expr, &workitem()), expected);
}

#[test]
fn skip_when_if_is_falsy() {
    let t = tree!("participant", { "if" => "false" });
    assert!(Condition::skip(&t.attributes, &workitem()));

    let t = tree!("participant", { "if" => "${customer} == acme" });
    assert!(!Condition::skip(&t.attributes, &workitem()));
}

#[test]
fn skip_when_unless_is_truthy() {
    let t = tree!("participant", { "unless" => "${customer} == acme" });
    assert!(Condition::skip(&t.attributes, &workitem()));

    let t = tree!("participant", { "unless" => "false" });
    assert!(!Condition::skip(&t.attributes, &workitem()));
}

#[test]
fn skip_accepts_boolean_attributes() {
    let t = tree!("participant", { "if" => false });
    assert!(Condition::skip(&t.attributes, &workitem()));

    let t = tree!("participant", { "if" => true });
    assert!(!Condition::skip(&t.attributes, &workitem()));
}

#[test]
fn unguarded_attributes_never_skip() {
    let t = tree!("participant", { "ref" => "alice" });
    assert!(!Condition::skip(&t.attributes, &workitem()));
}
