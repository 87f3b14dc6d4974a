// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work-queue event bus.
//!
//! Every externally-observable mutation flows through here as an [`Event`].
//! `emit` queues for the next dispatch turn; `emit_sync` delivers before
//! returning and is reserved for persist/unpersist, so storage side effects
//! are committed before the emitting method continues.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use weft_core::{Channel, Event};

/// A work-queue consumer. Registered per channel (or for all channels).
pub trait Subscriber: Send + Sync {
    fn on_event(&self, channel: Channel, event: &Event);
}

/// Publish/subscribe event bus with a pending queue.
#[derive(Default)]
pub struct WorkQueue {
    subscribers: Mutex<Vec<(Option<Channel>, Arc<dyn Subscriber>)>>,
    pending: Mutex<VecDeque<Event>>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. `None` subscribes to every channel.
    pub fn subscribe(&self, channel: Option<Channel>, subscriber: Arc<dyn Subscriber>) {
        self.subscribers.lock().push((channel, subscriber));
    }

    /// Best-effort publish: queued until [`WorkQueue::dispatch_pending`].
    pub fn emit(&self, event: Event) {
        self.pending.lock().push_back(event);
    }

    /// Synchronous publish: all subscribers run before this returns.
    pub fn emit_sync(&self, event: Event) {
        self.deliver(&event);
    }

    /// Deliver queued events. Returns how many were dispatched.
    ///
    /// Events emitted by subscribers during dispatch are drained too.
    pub fn dispatch_pending(&self) -> usize {
        let mut dispatched = 0;
        loop {
            let Some(event) = self.pending.lock().pop_front() else { break };
            self.deliver(&event);
            dispatched += 1;
        }
        dispatched
    }

    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    fn deliver(&self, event: &Event) {
        let channel = event.channel();
        // Snapshot matching subscribers so handlers can re-enter the bus.
        let targets: Vec<Arc<dyn Subscriber>> = self
            .subscribers
            .lock()
            .iter()
            .filter(|(c, _)| c.is_none() || *c == Some(channel))
            .map(|(_, s)| Arc::clone(s))
            .collect();
        tracing::trace!(channel = %channel, "{}", event.log_summary());
        for target in targets {
            target.on_event(channel, event);
        }
    }
}

/// Subscriber that records every event it sees, for tests and diagnostics.
#[derive(Default)]
pub struct Journal {
    entries: Mutex<Vec<Event>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events, in delivery order.
    pub fn events(&self) -> Vec<Event> {
        self.entries.lock().clone()
    }

    /// Snapshot of the events delivered on one channel.
    pub fn of_channel(&self, channel: Channel) -> Vec<Event> {
        self.entries.lock().iter().filter(|e| e.channel() == channel).cloned().collect()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Subscriber for Journal {
    fn on_event(&self, _channel: Channel, event: &Event) {
        self.entries.lock().push(event.clone());
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
