// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The flow-expression base.
//!
//! Every expression kind shares the lifecycle wrappers here: `do_apply`,
//! `do_reply` and `do_cancel` manage guards, forgetting, tags, timeouts,
//! state transitions and persistence, then hand over to the kind-specific
//! behaviour hook. An expression never blocks; every wait is "persist and
//! return", and the pool revives it on the next message.

use crate::behaviour::behaviour_for;
use crate::context::Context;
use crate::error::EngineError;
use serde_json::Value;
use smol_str::SmolStr;
use std::sync::Arc;
use weft_core::{
    duration, ApplyRequest, CancelFlavour, Condition, Event, ExprState, ExpressionData, Fei,
    FlowMessage, Workitem, TIMED_OUT_FIELD,
};

/// A live expression: persisted state plus the rebound engine context.
pub struct FlowExpression {
    pub(crate) data: ExpressionData,
    pub(crate) ctx: Arc<Context>,
}

impl FlowExpression {
    /// Construct a freshly-applied expression from an apply request.
    pub fn from_request(req: ApplyRequest, ctx: Arc<Context>) -> Self {
        let now_ms = ctx.now_ms();
        let ApplyRequest { tree, fei, parent_id, workitem, variables, trigger } = req;
        let data = ExpressionData::new(fei, parent_id, tree, workitem, variables, trigger, now_ms);
        Self { data, ctx }
    }

    /// Rebind a context onto state loaded from storage.
    pub fn from_data(data: ExpressionData, ctx: Arc<Context>) -> Self {
        Self { data, ctx }
    }

    pub fn fei(&self) -> &Fei {
        &self.data.fei
    }

    pub fn name(&self) -> SmolStr {
        self.data.name()
    }

    pub fn data(&self) -> &ExpressionData {
        &self.data
    }

    /// Load an expression from storage, rebinding the context onto it.
    pub fn load(ctx: &Arc<Context>, fei: &Fei) -> Option<FlowExpression> {
        ctx.store.get(fei).map(|data| FlowExpression::from_data(data, Arc::clone(ctx)))
    }

    /// Parent lookup. A missing parent (chain partially lost) is `None`.
    pub fn parent(&self) -> Option<FlowExpression> {
        let parent_id = self.data.parent_id.as_ref()?;
        FlowExpression::load(&self.ctx, parent_id)
    }

    // ── persistence ─────────────────────────────────────────────────────

    /// Commit the current state to storage, synchronously.
    pub fn persist(&mut self) {
        self.data.modified_at_ms = self.ctx.now_ms();
        self.ctx
            .bus
            .emit_sync(Event::ExpressionUpdated { expression: Box::new(self.data.clone()) });
    }

    /// Remove this expression from storage, synchronously.
    ///
    /// Skipped when the expression was never persisted (guard veto).
    pub fn unpersist(&self) {
        if self.ctx.store.contains(self.fei()) {
            self.ctx.bus.emit_sync(Event::ExpressionDeleted { fei: self.fei().clone() });
        }
    }

    // ── lifecycle wrappers ──────────────────────────────────────────────

    /// Apply this expression: guards, forgetting, tag, timeout, then the
    /// kind-specific apply hook.
    pub fn do_apply(&mut self) -> Result<(), EngineError> {
        if Condition::skip(&self.data.tree().attributes, &self.data.applied_workitem) {
            tracing::debug!(fei = %self.fei(), name = %self.name(), "guard vetoed");
            let workitem = self.data.applied_workitem.clone();
            return self.reply_to_parent(workitem);
        }

        if self.attribute_is_truthy("forget") {
            let parent = self.data.parent_id.clone();
            self.forget();
            if let Some(parent_fei) = parent {
                // The original branch continues at once with its own copy.
                let workitem =
                    self.data.applied_workitem.clone().with_fei(self.fei().clone());
                self.ctx.send(FlowMessage::Reply { fei: parent_fei, workitem });
            }
        }

        self.consider_tag();
        self.consider_timeout()?;

        behaviour_for(&self.name()).apply(self)
    }

    /// Deliver a child's reply.
    ///
    /// In tear-down states the expression only waits for its remaining
    /// children; the kind-specific reply hook runs while active.
    pub fn do_reply(&mut self, workitem: Workitem) -> Result<(), EngineError> {
        self.data.unregister_child(&workitem.fei);

        if !self.data.state.is_active() {
            if self.data.children.is_empty() {
                self.reply_to_parent(workitem)
            } else {
                self.persist();
                Ok(())
            }
        } else {
            behaviour_for(&self.name()).reply(self, workitem)
        }
    }

    /// Tear this expression down.
    pub fn do_cancel(&mut self, flavour: CancelFlavour) -> Result<(), EngineError> {
        if self.data.state == ExprState::Failed && flavour == CancelFlavour::Timeout {
            tracing::debug!(fei = %self.fei(), "not timing out an already failed expression");
            return Ok(());
        }

        self.data.state = flavour.target_state();
        if flavour == CancelFlavour::Timeout {
            let stamp = serde_json::json!([Value::from(self.fei()), self.ctx.now_ms()]);
            self.data.applied_workitem.set_field(TIMED_OUT_FIELD, stamp);
        }
        self.persist();

        behaviour_for(&self.name()).cancel(self, flavour)
    }

    /// Force entry into the failing state. Children are plain-cancelled;
    /// once the last one replies, `reply_to_parent` routes into `on_error`.
    pub fn fail(&mut self) -> Result<(), EngineError> {
        tracing::info!(fei = %self.fei(), name = %self.name(), "failing");
        self.data.state = ExprState::Failing;
        self.persist();
        self.cancel_children(CancelFlavour::Cancel)
    }

    /// Default cancel hook: propagate the cancel to every registered
    /// child, or reply at once when childless.
    pub(crate) fn cancel_children(&mut self, flavour: CancelFlavour) -> Result<(), EngineError> {
        if self.data.children.is_empty() {
            let workitem = self.data.applied_workitem.clone();
            return self.reply_to_parent(workitem);
        }
        for child in self.data.children.clone() {
            self.ctx.send(FlowMessage::Cancel { fei: child, flavour });
        }
        Ok(())
    }

    // ── children ────────────────────────────────────────────────────────

    /// Spawn the `index`-th child of the current tree.
    ///
    /// A forgotten child starts detached: no parent, and a flat snapshot
    /// of every variable visible here as its own scope.
    pub fn apply_child(
        &mut self,
        index: usize,
        workitem: Workitem,
        forget: bool,
    ) -> Result<(), EngineError> {
        let tree = self
            .data
            .tree()
            .children
            .get(index)
            .cloned()
            .ok_or_else(|| EngineError::NoSuchChild { fei: self.fei().clone(), index })?;

        let child_fei = self.fei().child_fei(index as u32);
        let workitem = workitem.with_fei(child_fei.clone());
        let (parent_id, variables) = if forget {
            (None, Some(self.compile_variables()))
        } else {
            (Some(self.fei().clone()), None)
        };

        if !forget {
            self.data.register_child(child_fei.clone());
            self.persist();
        }

        self.ctx.send(FlowMessage::Apply(ApplyRequest {
            tree,
            fei: child_fei,
            parent_id,
            workitem,
            variables,
            trigger: None,
        }));
        Ok(())
    }

    // ── forgetting ──────────────────────────────────────────────────────

    /// Detach this expression into an independent branch.
    ///
    /// The full visible variable environment is flattened into the local
    /// scope first, so lookups keep working without the parent chain.
    pub fn forget(&mut self) {
        self.ctx.bus.emit(Event::ExpressionForgotten {
            fei: self.fei().clone(),
            parent: self.data.parent_id.clone(),
        });
        let snapshot = self.compile_variables();
        self.data.variables = Some(snapshot);
        self.data.parent_id = None;
        self.persist();
        tracing::info!(fei = %self.fei(), "forgotten, now a detached root");
    }

    // ── tag and timeout bookkeeping ─────────────────────────────────────

    /// Bind the `tag` attribute (when present) to this fei in the nearest
    /// enclosing scope.
    fn consider_tag(&mut self) {
        let Some(tag) = self.data.tree().attribute_text("tag").map(SmolStr::new) else {
            return;
        };
        let fei_value = Value::from(self.fei());
        self.set_variable(&tag, fei_value);
        self.data.tagname = Some(tag.clone());
        self.ctx.bus.emit(Event::TagEntered { tag, fei: self.fei().clone() });
    }

    /// Schedule a timeout cancel when the `timeout` attribute is present.
    fn consider_timeout(&mut self) -> Result<(), EngineError> {
        let Some(value) = self.data.tree().attribute_text("timeout").map(str::to_string) else {
            return Ok(());
        };
        let duration = duration::parse(&value)
            .map_err(|source| EngineError::InvalidTimeout { value, source })?;
        let job_id = self.ctx.scheduler.lock().schedule(
            duration,
            self.fei().clone(),
            CancelFlavour::Timeout,
            self.ctx.now_ms(),
        );
        self.data.timeout_job_id = Some(job_id);
        Ok(())
    }

    // ── attribute helpers ───────────────────────────────────────────────

    pub(crate) fn attribute_is_truthy(&self, key: &str) -> bool {
        match self.data.tree().attribute(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => Condition::truthy(s),
            Some(Value::Null) | None => false,
            Some(_) => true,
        }
    }
}

#[cfg(test)]
#[path = "expression_tests.rs"]
mod tests;
