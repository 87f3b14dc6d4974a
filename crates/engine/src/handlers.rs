// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal behavior of `reply_to_parent` and handler dispatch.
//!
//! When an expression yields to its parent, the state decides what
//! actually happens: a plain reply, the `on_error` handler (failing), the
//! `on_cancel` handler (cancelling, never dying), or the `on_timeout`
//! handler (timing out, with `"error"` promoted to a synthetic flow
//! error). Handler reapplies reuse this expression's fei, parent, scope
//! and applied workitem.

use crate::error::EngineError;
use crate::expression::FlowExpression;
use serde_json::Value;
use weft_core::{
    ApplyRequest, Event, ExprState, Fei, FlowErrorDetail, FlowMessage, HandlerKind, Tree, Workitem,
};

impl FlowExpression {
    /// Yield to the parent (or run the handler the current state calls for).
    pub fn reply_to_parent(&mut self, workitem: Workitem) -> Result<(), EngineError> {
        if let Some(job_id) = self.data.timeout_job_id.take() {
            self.ctx.scheduler.lock().unschedule(&job_id);
        }
        if let Some(tag) = self.data.tagname.take() {
            self.unset_variable(&tag);
            self.ctx.bus.emit(Event::TagLeft { tag, fei: self.fei().clone() });
        }

        match self.data.state {
            ExprState::Failing => self.trigger_on_error(workitem),
            ExprState::Cancelling if self.data.on_cancel.is_some() => self.trigger_on_cancel(),
            ExprState::TimingOut if self.data.on_timeout.is_some() => self.trigger_on_timeout(),
            _ => self.reply_plain(workitem),
        }
    }

    /// Ordinary reply: splice local tree edits into the parent, vacate
    /// storage, and hand the workitem up (or end the branch at a root).
    fn reply_plain(&mut self, workitem: Workitem) -> Result<(), EngineError> {
        self.propagate_updated_tree();
        self.unpersist();

        let workitem = workitem.with_fei(self.fei().clone());
        match self.data.parent_id.clone() {
            Some(parent_fei) => {
                self.ctx.send(FlowMessage::Reply { fei: parent_fei, workitem });
            }
            None if self.fei().is_root_expid() => {
                tracing::info!(wfid = %self.fei().wfid, "flow terminated");
                self.ctx.bus.emit(Event::FlowTerminated {
                    wfid: self.fei().wfid.clone(),
                    workitem,
                });
            }
            None => {
                // A forgotten branch's reply vanishes into the void.
                tracing::debug!(fei = %self.fei(), "forgotten branch finished");
            }
        }
        Ok(())
    }

    /// Splice `updated_tree` back into the parent's tree so constructs
    /// like cursors re-enter rewritten subtrees without ever touching the
    /// canonical process definition.
    fn propagate_updated_tree(&mut self) {
        let Some(updated) = self.data.updated_tree.clone() else { return };
        let Some(parent_fei) = self.data.parent_id.clone() else { return };
        let Some(mut parent) = FlowExpression::load(&self.ctx, &parent_fei) else {
            tracing::warn!(fei = %self.fei(), parent = %parent_fei, "cannot propagate tree, parent not in storage");
            return;
        };

        let index = self.data.fei.child_id as usize;
        match parent.data.update_tree().children.get_mut(index) {
            Some(slot) => {
                *slot = updated;
                parent.persist();
            }
            None => {
                tracing::warn!(fei = %self.fei(), parent = %parent_fei, index, "parent tree has no such child slot");
            }
        }
    }

    // ── handler dispatch ────────────────────────────────────────────────

    fn trigger_on_error(&mut self, workitem: Workitem) -> Result<(), EngineError> {
        if self.data.triggered_by == Some(HandlerKind::OnError) {
            // The handler itself failed; park instead of recursing.
            return Err(EngineError::HandlerRecursion { fei: self.fei().clone() });
        }
        let Some(handler) = self.data.on_error.clone() else {
            return Err(EngineError::UnhandledFailure { fei: self.fei().clone() });
        };

        match &handler {
            // The cancel already performed is the whole resolution.
            Value::String(s) if s == "undo" => self.reply_plain(workitem),
            Value::String(s) if s == "redo" => {
                let tree = self.data.tree().clone();
                self.reapply(tree, HandlerKind::OnError);
                Ok(())
            }
            _ => {
                let tree = handler_tree(self.fei(), HandlerKind::OnError, &handler)?;
                self.reapply(tree, HandlerKind::OnError);
                Ok(())
            }
        }
    }

    fn trigger_on_cancel(&mut self) -> Result<(), EngineError> {
        let Some(handler) = self.data.on_cancel.clone() else { return Ok(()) };
        let tree = handler_tree(self.fei(), HandlerKind::OnCancel, &handler)?;
        self.reapply(tree, HandlerKind::OnCancel);
        Ok(())
    }

    fn trigger_on_timeout(&mut self) -> Result<(), EngineError> {
        let Some(handler) = self.data.on_timeout.clone() else { return Ok(()) };
        match &handler {
            Value::String(s) if s == "error" => {
                self.raise_timeout_error();
                Ok(())
            }
            Value::String(s) if s == "redo" => {
                let tree = self.data.tree().clone();
                self.reapply(tree, HandlerKind::OnTimeout);
                Ok(())
            }
            _ => {
                let tree = handler_tree(self.fei(), HandlerKind::OnTimeout, &handler)?;
                self.reapply(tree, HandlerKind::OnTimeout);
                Ok(())
            }
        }
    }

    /// Reapply a handler tree in place of this expression, reusing fei,
    /// parent, scope and applied workitem. The trigger flag lets the pool
    /// spot a handler failing in turn.
    fn reapply(&mut self, tree: Tree, kind: HandlerKind) {
        tracing::info!(fei = %self.fei(), handler = %kind, "reapplying through handler");
        self.ctx.send(FlowMessage::Apply(ApplyRequest {
            tree,
            fei: self.fei().clone(),
            parent_id: self.data.parent_id.clone(),
            workitem: self.data.applied_workitem.clone(),
            variables: self.data.variables.clone(),
            trigger: Some(kind),
        }));
    }

    /// Promote a timeout into a flow-level error event carrying the full
    /// apply needed to resume this expression.
    fn raise_timeout_error(&mut self) {
        let timeout_attr =
            self.data.tree().attribute_text("timeout").unwrap_or_default().to_string();
        let resume = ApplyRequest {
            tree: self.data.tree().clone(),
            fei: self.fei().clone(),
            parent_id: self.data.parent_id.clone(),
            workitem: self.data.applied_workitem.clone(),
            variables: self.data.variables.clone(),
            trigger: None,
        };
        self.ctx.bus.emit(Event::ErrorRaised {
            wfid: self.fei().wfid.clone(),
            error: FlowErrorDetail::timeout(timeout_attr),
            msg: Box::new(FlowMessage::Apply(resume)),
        });
    }
}

/// Interpret a captured handler value: a bare name becomes `[name, {}, []]`,
/// anything else must deserialize as a tree triple.
fn handler_tree(fei: &Fei, kind: HandlerKind, handler: &Value) -> Result<Tree, EngineError> {
    match handler {
        Value::String(name) => Ok(Tree::bare(name.as_str())),
        other => serde_json::from_value::<Tree>(other.clone()).map_err(|e| {
            EngineError::InvalidHandler {
                fei: fei.clone(),
                kind: kind.attribute(),
                detail: e.to_string(),
            }
        }),
    }
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
