// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine façade: wiring plus the drive loop.
//!
//! `Engine::new` assembles the store, bus, scheduler, error watcher and
//! pool. Tests (and embedders that want deterministic stepping) drive it
//! with [`Engine::run_until_idle`] and [`Engine::tick`]; long-running
//! embedders use the async [`Engine::run`] loop, which sleeps until the
//! next scheduler deadline or an incoming message.

use crate::bus::{Journal, WorkQueue};
use crate::context::Context;
use crate::error::EngineError;
use crate::expression::FlowExpression;
use crate::pool::{ErrorWatch, ExpressionPool};
use crate::store::MemoryStore;
use indexmap::IndexMap;
use serde_json::Value;
use smol_str::SmolStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use weft_core::{
    CancelFlavour, Channel, Clock, ExpressionData, Fei, SystemClock, Tree, Workitem,
};

/// Engine tunables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on messages processed in one drain, a runaway guard.
    pub step_limit: usize,
    /// Length of minted workflow ids.
    pub wfid_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { step_limit: 10_000, wfid_length: 12 }
    }
}

pub struct Engine {
    ctx: Arc<Context>,
    pool: ExpressionPool,
    journal: Arc<Journal>,
    config: EngineConfig,
    shutting_down: AtomicBool,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build an engine on an explicit clock (tests pass a fake one).
    pub fn with_clock(config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let bus = Arc::new(WorkQueue::new());
        let journal = Arc::new(Journal::new());

        bus.subscribe(Some(Channel::Expressions), store.clone());
        bus.subscribe(None, journal.clone());
        bus.subscribe(
            Some(Channel::Errors),
            Arc::new(ErrorWatch::new(store.clone(), clock.clone(), Arc::downgrade(&bus))),
        );

        let ctx = Context::new(store, bus, clock);
        let pool = ExpressionPool::new(Arc::clone(&ctx), config.step_limit);
        Self { ctx, pool, journal, config, shutting_down: AtomicBool::new(false) }
    }

    // ── flow operations ─────────────────────────────────────────────────

    /// Launch a workflow instance; returns its minted wfid.
    /// Nothing runs until the engine is driven.
    pub fn launch(&self, tree: Tree, fields: IndexMap<String, Value>) -> SmolStr {
        let len = self.config.wfid_length;
        let wfid: SmolStr = nanoid::nanoid!(len).into();
        self.pool.launch(wfid.clone(), tree, fields);
        wfid
    }

    /// Deliver an external reply (participant completion) to a waiting leaf.
    pub fn deliver_reply(&self, fei: Fei, workitem: Workitem) {
        self.pool.reply(workitem, fei);
    }

    pub fn cancel(&self, fei: Fei) {
        self.pool.cancel_expression(fei, CancelFlavour::Cancel);
    }

    pub fn kill(&self, fei: Fei) {
        self.pool.cancel_expression(fei, CancelFlavour::Kill);
    }

    /// Force an expression into its failing path (children cancelled,
    /// `on_error` dispatched once they are gone).
    pub fn fail_expression(&self, fei: &Fei) -> Result<(), EngineError> {
        match FlowExpression::load(&self.ctx, fei) {
            Some(mut exp) => exp.fail(),
            None => Err(EngineError::NotFound(fei.clone())),
        }
    }

    // ── driving ─────────────────────────────────────────────────────────

    /// Process one message, if any.
    pub fn step(&self) -> bool {
        self.pool.step()
    }

    /// Drain messages and bus events until nothing moves.
    pub fn run_until_idle(&self) -> usize {
        self.pool.run_until_idle()
    }

    /// Fire due timeouts, then drain.
    pub fn tick(&self) -> usize {
        self.pool.tick();
        self.pool.run_until_idle()
    }

    /// Async drive loop: drain, then sleep until the next scheduler
    /// deadline or an incoming message. Stops after [`Engine::shutdown`].
    pub async fn run(&self) {
        while !self.shutting_down.load(Ordering::Acquire) {
            self.tick();
            let deadline = self.ctx.scheduler.lock().next_deadline_ms();
            match deadline {
                Some(at_ms) => {
                    let wait = at_ms.saturating_sub(self.ctx.now_ms()).max(1);
                    tokio::select! {
                        _ = self.ctx.notified() => {}
                        _ = tokio::time::sleep(Duration::from_millis(wait)) => {}
                    }
                }
                None => self.ctx.notified().await,
            }
        }
        tracing::info!("engine loop stopped");
    }

    pub fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::Release);
        self.ctx.wake();
    }

    // ── inspection ──────────────────────────────────────────────────────

    /// Snapshot of one stored expression.
    pub fn expression(&self, fei: &Fei) -> Option<ExpressionData> {
        self.ctx.store.get(fei)
    }

    /// Load a live handle for one stored expression.
    pub fn load(&self, fei: &Fei) -> Option<FlowExpression> {
        FlowExpression::load(&self.ctx, fei)
    }

    pub fn journal(&self) -> &Arc<Journal> {
        &self.journal
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.ctx
    }

    /// Read an engine-global variable.
    pub fn variable(&self, name: &str) -> Option<Value> {
        self.ctx.engine_variable(name)
    }

    /// Write an engine-global variable.
    pub fn set_variable(&self, name: &str, value: Value) {
        self.ctx.set_engine_variable(name, value);
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
