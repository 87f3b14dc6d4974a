// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed set of expression kinds and their hooks.
//!
//! Concrete kinds implement `apply` / `reply` / `cancel`; the lifecycle
//! wrappers live on [`FlowExpression`]. Unknown names fall back to a leaf
//! that persists and waits for an external reply, a cancel or a timeout —
//! the shape a participant stub has.

use crate::error::EngineError;
use crate::expression::FlowExpression;
use weft_core::{CancelFlavour, Condition, Workitem};

/// Kind-specific hooks, with the default reply and cancel every
/// expression inherits.
pub(crate) trait Behaviour: Sync {
    fn apply(&self, exp: &mut FlowExpression) -> Result<(), EngineError>;

    fn reply(&self, exp: &mut FlowExpression, workitem: Workitem) -> Result<(), EngineError> {
        exp.reply_to_parent(workitem)
    }

    fn cancel(&self, exp: &mut FlowExpression, flavour: CancelFlavour) -> Result<(), EngineError> {
        exp.cancel_children(flavour)
    }
}

/// Resolve a tree name to its behaviour.
pub(crate) fn behaviour_for(name: &str) -> &'static dyn Behaviour {
    match name {
        "sequence" => &Sequence,
        "define" | "process_definition" => &Define,
        "concurrence" => &Concurrence,
        "echo" | "noop" => &Echo,
        _ => &Leaf,
    }
}

/// Applies children one at a time, replying after the last.
struct Sequence;

impl Behaviour for Sequence {
    fn apply(&self, exp: &mut FlowExpression) -> Result<(), EngineError> {
        let workitem = exp.data.applied_workitem.clone();
        if exp.data.tree().children.is_empty() {
            return exp.reply_to_parent(workitem);
        }
        exp.apply_child(0, workitem, false)
    }

    fn reply(&self, exp: &mut FlowExpression, workitem: Workitem) -> Result<(), EngineError> {
        let next = workitem.fei.child_id as usize + 1;
        if next < exp.data.tree().children.len() {
            exp.apply_child(next, workitem, false)
        } else {
            exp.reply_to_parent(workitem)
        }
    }
}

/// Sequence semantics plus its own variable scope.
struct Define;

impl Behaviour for Define {
    fn apply(&self, exp: &mut FlowExpression) -> Result<(), EngineError> {
        if exp.data.variables.is_none() {
            exp.data.variables = Some(Default::default());
        }
        Sequence.apply(exp)
    }

    fn reply(&self, exp: &mut FlowExpression, workitem: Workitem) -> Result<(), EngineError> {
        Sequence.reply(exp, workitem)
    }
}

/// Applies all children at once, replying when the last one has replied.
struct Concurrence;

impl Behaviour for Concurrence {
    fn apply(&self, exp: &mut FlowExpression) -> Result<(), EngineError> {
        let workitem = exp.data.applied_workitem.clone();
        let count = exp.data.tree().children.len();
        if count == 0 {
            return exp.reply_to_parent(workitem);
        }
        for index in 0..count {
            exp.apply_child(index, workitem.clone(), false)?;
        }
        Ok(())
    }

    fn reply(&self, exp: &mut FlowExpression, workitem: Workitem) -> Result<(), EngineError> {
        if exp.data.children.is_empty() {
            exp.reply_to_parent(workitem)
        } else {
            exp.persist();
            Ok(())
        }
    }
}

/// Logs its text argument and replies immediately.
struct Echo;

impl Behaviour for Echo {
    fn apply(&self, exp: &mut FlowExpression) -> Result<(), EngineError> {
        let text = exp.data.tree().text().map(str::to_string);
        if let Some(text) = text {
            let rendered = Condition::substitute(&text, &exp.data.applied_workitem);
            tracing::info!(fei = %exp.fei(), "{rendered}");
        }
        let workitem = exp.data.applied_workitem.clone();
        exp.reply_to_parent(workitem)
    }
}

/// Unknown kinds: persist and wait. Completion comes from outside — a
/// delivered reply, a cancel, or a timeout.
struct Leaf;

impl Behaviour for Leaf {
    fn apply(&self, exp: &mut FlowExpression) -> Result<(), EngineError> {
        tracing::debug!(fei = %exp.fei(), name = %exp.name(), "waiting for an external reply");
        exp.persist();
        Ok(())
    }
}

#[cfg(test)]
#[path = "behaviour_tests.rs"]
mod tests;
