// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The expression pool: the dispatch loop.
//!
//! Messages are processed one at a time, each running an expression method
//! to completion — there is no interleaving within a workflow. Dispatch
//! errors never unwind: they become `error:raised` events, and the error
//! watcher parks the offending expression in the `failed` state.

use crate::bus::{Subscriber, WorkQueue};
use crate::context::Context;
use crate::error::EngineError;
use crate::expression::FlowExpression;
use crate::store::ExpressionStore;
use indexmap::IndexMap;
use serde_json::Value;
use smol_str::SmolStr;
use std::sync::{Arc, Weak};
use weft_core::{
    ApplyRequest, CancelFlavour, Channel, Clock, Event, ExprState, Fei, FlowErrorDetail,
    FlowMessage, Tree, Workitem,
};

pub struct ExpressionPool {
    ctx: Arc<Context>,
    step_limit: usize,
}

impl ExpressionPool {
    pub fn new(ctx: Arc<Context>, step_limit: usize) -> Self {
        Self { ctx, step_limit }
    }

    /// Process one message to completion. Returns false when idle.
    pub fn step(&self) -> bool {
        let Some(msg) = self.ctx.next_message() else { return false };
        tracing::debug!(msg = msg.name(), fei = %msg.fei(), "dispatching");
        if let Err(e) = self.dispatch(&msg) {
            self.raise(&msg, &e);
        }
        true
    }

    /// Drain messages and pending bus events until nothing moves.
    /// Returns the number of messages processed.
    pub fn run_until_idle(&self) -> usize {
        let mut steps = 0;
        loop {
            let mut progressed = false;
            if steps < self.step_limit && self.step() {
                steps += 1;
                progressed = true;
            }
            if self.ctx.bus.dispatch_pending() > 0 {
                progressed = true;
            }
            if !progressed {
                break;
            }
        }
        if steps >= self.step_limit && self.ctx.message_count() > 0 {
            tracing::warn!(steps, "step limit reached, leaving remaining messages queued");
        }
        steps
    }

    /// Inject every scheduler entry that has come due.
    pub fn tick(&self) {
        let now_ms = self.ctx.now_ms();
        for msg in self.ctx.scheduler.lock().fired(now_ms) {
            self.ctx.send(msg);
        }
    }

    // ── operations ──────────────────────────────────────────────────────

    /// Launch a new workflow instance rooted at `tree`.
    pub fn launch(&self, wfid: impl Into<SmolStr>, tree: Tree, fields: IndexMap<String, Value>) {
        let wfid = wfid.into();
        let fei = Fei::root(wfid.clone());
        tracing::info!(%wfid, name = %tree.name, "launching");
        self.ctx.bus.emit(Event::FlowLaunched { wfid });
        self.ctx.send(FlowMessage::Apply(ApplyRequest {
            tree,
            fei: fei.clone(),
            parent_id: None,
            workitem: Workitem::with_fields(fei, fields),
            variables: Some(IndexMap::new()),
            trigger: None,
        }));
    }

    /// Generic apply, used by handler reapplies and error replays.
    pub fn apply(&self, req: ApplyRequest) {
        self.ctx.send(FlowMessage::Apply(req));
    }

    /// Deliver a reply to an arbitrary fei (participant completion,
    /// or the detached-parent reply after a forget).
    pub fn reply(&self, workitem: Workitem, fei: Fei) {
        self.ctx.send(FlowMessage::Reply { fei, workitem });
    }

    /// Route a cancel to an expression.
    pub fn cancel_expression(&self, fei: Fei, flavour: CancelFlavour) {
        self.ctx.send(FlowMessage::Cancel { fei, flavour });
    }

    // ── dispatch ────────────────────────────────────────────────────────

    fn dispatch(&self, msg: &FlowMessage) -> Result<(), EngineError> {
        match msg.clone() {
            FlowMessage::Apply(req) => {
                FlowExpression::from_request(req, Arc::clone(&self.ctx)).do_apply()
            }
            FlowMessage::Reply { fei, workitem } => match FlowExpression::load(&self.ctx, &fei) {
                Some(mut exp) => exp.do_reply(workitem),
                None => {
                    tracing::warn!(%fei, "dropping reply for unknown expression");
                    Ok(())
                }
            },
            FlowMessage::Cancel { fei, flavour } => match FlowExpression::load(&self.ctx, &fei) {
                Some(mut exp) => exp.do_cancel(flavour),
                None => {
                    tracing::debug!(%fei, %flavour, "dropping cancel for unknown expression");
                    Ok(())
                }
            },
        }
    }

    fn raise(&self, msg: &FlowMessage, err: &EngineError) {
        tracing::error!(msg = msg.name(), fei = %msg.fei(), error = %err, "dispatch error");
        self.ctx.bus.emit(Event::ErrorRaised {
            wfid: msg.fei().wfid.clone(),
            error: FlowErrorDetail::dispatch(err.to_string()),
            msg: Box::new(msg.clone()),
        });
    }
}

/// Errors-channel subscriber: a raised error parks its target expression
/// in the `failed` state (where a timeout cancel no longer reaches it).
pub(crate) struct ErrorWatch {
    store: Arc<dyn ExpressionStore>,
    clock: Arc<dyn Clock>,
    bus: Weak<WorkQueue>,
}

impl ErrorWatch {
    pub(crate) fn new(
        store: Arc<dyn ExpressionStore>,
        clock: Arc<dyn Clock>,
        bus: Weak<WorkQueue>,
    ) -> Self {
        Self { store, clock, bus }
    }
}

impl Subscriber for ErrorWatch {
    fn on_event(&self, _channel: Channel, event: &Event) {
        let Event::ErrorRaised { error, msg, .. } = event else { return };
        let fei = msg.fei();
        let Some(mut data) = self.store.get(fei) else {
            tracing::warn!(%fei, "error raised for an expression not in storage");
            return;
        };
        if data.state == ExprState::Failed {
            return;
        }
        data.state = ExprState::Failed;
        data.modified_at_ms = self.clock.epoch_ms();
        tracing::error!(%fei, class = %error.class, message = %error.message, "expression failed");
        if let Some(bus) = self.bus.upgrade() {
            bus.emit_sync(Event::ExpressionUpdated { expression: Box::new(data) });
        }
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
