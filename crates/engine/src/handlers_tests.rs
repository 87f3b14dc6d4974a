// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_helpers::*;
use serde_json::json;
use std::time::Duration;
use weft_core::{tree, Channel, TIMED_OUT_FIELD};

#[test]
fn on_error_undo_treats_the_cancel_as_resolution() {
    let (engine, _clock) = test_engine();
    let tree = tree!("sequence", { "on_error" => "undo" }, [tree!("participant")]);
    let (wfid, root) = launch_and_drain(&engine, tree);

    engine.fail_expression(&root).unwrap();
    engine.run_until_idle();

    // The child was cancelled and the failing node replied normally.
    assert!(engine.expression(&root).is_none());
    assert!(engine.expression(&root.child_fei(0)).is_none());
    assert!(terminated_workitem(&engine, &wfid).is_some());
}

#[test]
fn on_error_redo_reapplies_the_current_tree() {
    let (engine, _clock) = test_engine();
    let tree = tree!("sequence", { "on_error" => "redo" }, [tree!("participant")]);
    let mut fields = indexmap::IndexMap::new();
    fields.insert("customer".to_string(), json!("acme"));
    let wfid = engine.launch(tree, fields);
    engine.run_until_idle();
    let root = Fei::root(wfid);

    engine.fail_expression(&root).unwrap();
    engine.run_until_idle();

    // Reapplied in place: same fei, fresh active state, trigger recorded.
    let data = engine.expression(&root).unwrap();
    assert_eq!(data.state, ExprState::Active);
    assert_eq!(data.triggered_by, Some(HandlerKind::OnError));
    assert_eq!(data.tree().name, "sequence");
    // The applied workitem was reused.
    assert_eq!(data.applied_workitem.field("customer"), Some(&json!("acme")));
    // And the first child is live again.
    assert_eq!(data.children, vec![root.child_fei(0)]);
    assert!(engine.expression(&root.child_fei(0)).is_some());
}

#[test]
fn on_error_name_invokes_the_named_handler() {
    let (engine, _clock) = test_engine();
    let tree = tree!("sequence", { "on_error" => "cleanup" }, [tree!("participant")]);
    let (_wfid, root) = launch_and_drain(&engine, tree);

    engine.fail_expression(&root).unwrap();
    engine.run_until_idle();

    let data = engine.expression(&root).unwrap();
    assert_eq!(data.tree().name, "cleanup");
    assert!(data.tree().attributes.is_empty());
    assert_eq!(data.triggered_by, Some(HandlerKind::OnError));
}

#[test]
fn failing_without_a_handler_parks_the_expression() {
    let (engine, _clock) = test_engine();
    let tree = tree!("sequence", [tree!("participant")]);
    let (_wfid, root) = launch_and_drain(&engine, tree);

    engine.fail_expression(&root).unwrap();
    engine.run_until_idle();

    assert_eq!(engine.expression(&root).unwrap().state, ExprState::Failed);
    let errors = engine.journal().of_channel(Channel::Errors);
    assert_eq!(errors.len(), 1);
}

#[test]
fn a_failing_handler_is_parked_not_recursed() {
    let (engine, _clock) = test_engine();
    let tree = tree!("participant", { "on_error" => "redo" });
    let (_wfid, root) = launch_and_drain(&engine, tree);

    engine.fail_expression(&root).unwrap();
    engine.run_until_idle();
    assert_eq!(engine.expression(&root).unwrap().triggered_by, Some(HandlerKind::OnError));

    let err = engine.fail_expression(&root).unwrap_err();
    assert!(matches!(err, EngineError::HandlerRecursion { .. }));
}

#[test]
fn on_cancel_runs_the_handler() {
    let (engine, _clock) = test_engine();
    let tree = tree!("participant", { "on_cancel" => "cleanup" });
    let (wfid, root) = launch_and_drain(&engine, tree);

    engine.cancel(root.clone());
    engine.run_until_idle();

    let data = engine.expression(&root).unwrap();
    assert_eq!(data.tree().name, "cleanup");
    assert_eq!(data.triggered_by, Some(HandlerKind::OnCancel));
    assert!(terminated_workitem(&engine, &wfid).is_none());
}

#[test]
fn on_cancel_accepts_an_embedded_tree() {
    let (engine, _clock) = test_engine();
    let handler = serde_json::to_value(tree!("sequence", [tree!("echo")])).unwrap();
    let tree = tree!("participant", { "on_cancel" => handler });
    let (wfid, root) = launch_and_drain(&engine, tree);

    engine.cancel(root.clone());
    engine.run_until_idle();

    // The handler sequence ran to completion and ended the flow.
    assert!(engine.expression(&root).is_none());
    assert!(terminated_workitem(&engine, &wfid).is_some());
}

#[test]
fn kill_skips_on_cancel() {
    let (engine, _clock) = test_engine();
    let tree = tree!("participant", { "on_cancel" => "cleanup" });
    let (wfid, root) = launch_and_drain(&engine, tree);

    engine.kill(root.clone());
    engine.run_until_idle();

    assert!(engine.expression(&root).is_none());
    assert!(terminated_workitem(&engine, &wfid).is_some());
}

#[test]
fn on_timeout_error_raises_a_synthetic_flow_error() {
    let (engine, clock) = test_engine();
    let tree = tree!("participant", { "timeout" => "1s", "on_timeout" => "error" });
    let (wfid, root) = launch_and_drain(&engine, tree);

    clock.advance(Duration::from_millis(1_100));
    engine.tick();

    let errors = engine.journal().of_channel(Channel::Errors);
    assert_eq!(errors.len(), 1);
    let Event::ErrorRaised { wfid: w, error, msg } = &errors[0] else {
        panic!("expected an ErrorRaised event");
    };
    assert_eq!(w.as_str(), wfid.as_str());
    assert_eq!(error.class, weft_core::TIMEOUT_ERROR_CLASS);
    assert_eq!(error.message, "1s");
    assert_eq!(error.trace, vec![weft_core::FLOW_LEVEL_TRACE.to_string()]);

    // The message reconstructs the apply needed to resume.
    let FlowMessage::Apply(resume) = msg.as_ref() else {
        panic!("expected an apply message");
    };
    assert_eq!(resume.fei, root);
    assert_eq!(resume.tree.name, "participant");
    assert!(resume.workitem.timed_out());

    // The expression is parked, stamped, and still in storage.
    let data = engine.expression(&root).unwrap();
    assert_eq!(data.state, ExprState::Failed);
    let stamp = data.applied_workitem.field(TIMED_OUT_FIELD).unwrap();
    assert_eq!(stamp[0], Value::from(&root));
}

#[test]
fn on_timeout_redo_reapplies_and_rearms() {
    let (engine, clock) = test_engine();
    let tree = tree!("participant", { "timeout" => "1s", "on_timeout" => "redo" });
    let (_wfid, root) = launch_and_drain(&engine, tree);
    let first_job = engine.expression(&root).unwrap().timeout_job_id.clone().unwrap();

    clock.advance(Duration::from_millis(1_100));
    engine.tick();

    let data = engine.expression(&root).unwrap();
    assert_eq!(data.state, ExprState::Active);
    assert_eq!(data.triggered_by, Some(HandlerKind::OnTimeout));
    // The reapplied tree carries the timeout attribute, so it is re-armed.
    let second_job = data.timeout_job_id.clone().unwrap();
    assert_ne!(first_job, second_job);
    assert!(engine.context().scheduler.lock().has_entries());
}

#[test]
fn on_timeout_name_invokes_the_named_handler() {
    let (engine, clock) = test_engine();
    let tree = tree!("participant", { "timeout" => "1s", "on_timeout" => "handle_late" });
    let (_wfid, root) = launch_and_drain(&engine, tree);

    clock.advance(Duration::from_secs(2));
    engine.tick();

    let data = engine.expression(&root).unwrap();
    assert_eq!(data.tree().name, "handle_late");
    assert_eq!(data.triggered_by, Some(HandlerKind::OnTimeout));
}

#[test]
fn updated_tree_propagates_into_the_parent_on_reply() {
    let (engine, _clock) = test_engine();
    let tree = tree!("sequence", [tree!("participant"), tree!("participant")]);
    let (_wfid, root) = launch_and_drain(&engine, tree);
    let child = root.child_fei(0);

    let mut c = engine.load(&child).unwrap();
    c.data.update_tree().set_attribute("mark", json!("here"));
    c.persist();

    engine.deliver_reply(child.clone(), Workitem::new(child.clone()));
    engine.run_until_idle();

    let data = engine.expression(&root).unwrap();
    let updated = data.updated_tree.as_ref().unwrap();
    assert_eq!(updated.children[0].attribute("mark"), Some(&json!("here")));
    // The canonical definition is untouched.
    assert!(data.original_tree.children[0].attribute("mark").is_none());
}
