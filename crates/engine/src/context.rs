// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared collaborator handle for live expressions.
//!
//! A [`Context`] bundles the storage, the bus, the scheduler, the clock and
//! the engine-global variable scope. It is rebound onto every expression
//! loaded from storage and is deliberately excluded from persistence.

use crate::bus::WorkQueue;
use crate::scheduler::Scheduler;
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;
use weft_core::{Clock, FlowMessage};

pub struct Context {
    pub store: Arc<dyn crate::store::ExpressionStore>,
    pub bus: Arc<WorkQueue>,
    pub scheduler: Mutex<Scheduler>,
    pub clock: Arc<dyn Clock>,
    engine_variables: Mutex<IndexMap<String, Value>>,
    messages: Mutex<VecDeque<FlowMessage>>,
    notify: Notify,
}

impl Context {
    pub fn new(
        store: Arc<dyn crate::store::ExpressionStore>,
        bus: Arc<WorkQueue>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            bus,
            scheduler: Mutex::new(Scheduler::new()),
            clock,
            engine_variables: Mutex::new(IndexMap::new()),
            messages: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
        })
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }

    // ── dispatch mailbox ────────────────────────────────────────────────

    /// Enqueue a message for the pool's dispatch loop.
    pub fn send(&self, msg: FlowMessage) {
        tracing::trace!(msg = msg.name(), fei = %msg.fei(), "queued");
        self.messages.lock().push_back(msg);
        self.notify.notify_one();
    }

    /// Pop the next message, queue order.
    pub fn next_message(&self) -> Option<FlowMessage> {
        self.messages.lock().pop_front()
    }

    pub fn message_count(&self) -> usize {
        self.messages.lock().len()
    }

    /// Wake the async engine loop without queueing anything.
    pub fn wake(&self) {
        self.notify.notify_one();
    }

    pub(crate) async fn notified(&self) {
        self.notify.notified().await;
    }

    // ── engine-global variables ─────────────────────────────────────────

    pub fn engine_variable(&self, name: &str) -> Option<Value> {
        self.engine_variables.lock().get(name).cloned()
    }

    pub fn set_engine_variable(&self, name: &str, value: Value) {
        self.engine_variables.lock().insert(name.to_string(), value);
    }

    pub fn unset_engine_variable(&self, name: &str) {
        self.engine_variables.lock().shift_remove(name);
    }

    pub fn engine_variables(&self) -> IndexMap<String, Value> {
        self.engine_variables.lock().clone()
    }
}
