// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Expression storage.
//!
//! The storage owns the canonical copy of every live expression, keyed by
//! fei. In-memory [`FlowExpression`](crate::FlowExpression) instances are
//! caches rebuilt from here; there is no object-graph parent pointer, a
//! parent lookup is a storage lookup.
//!
//! [`MemoryStore`] is also a bus [`Subscriber`]: it is the single writer
//! for expression state and applies `expression:updated` /
//! `expression:deleted` events as they are delivered.

use crate::bus::Subscriber;
use parking_lot::Mutex;
use std::collections::HashMap;
use weft_core::{Channel, Event, ExpressionData, Fei};

/// Content-addressable persistence keyed by expression id.
pub trait ExpressionStore: Send + Sync {
    fn get(&self, fei: &Fei) -> Option<ExpressionData>;
    fn put(&self, data: ExpressionData);
    fn remove(&self, fei: &Fei);
    fn contains(&self, fei: &Fei) -> bool;
    /// Feis of every stored expression, in no particular order.
    fn feis(&self) -> Vec<Fei>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory expression store.
#[derive(Default)]
pub struct MemoryStore {
    expressions: Mutex<HashMap<Fei, ExpressionData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExpressionStore for MemoryStore {
    fn get(&self, fei: &Fei) -> Option<ExpressionData> {
        self.expressions.lock().get(fei).cloned()
    }

    fn put(&self, data: ExpressionData) {
        self.expressions.lock().insert(data.fei.clone(), data);
    }

    fn remove(&self, fei: &Fei) {
        self.expressions.lock().remove(fei);
    }

    fn contains(&self, fei: &Fei) -> bool {
        self.expressions.lock().contains_key(fei)
    }

    fn feis(&self) -> Vec<Fei> {
        self.expressions.lock().keys().cloned().collect()
    }

    fn len(&self) -> usize {
        self.expressions.lock().len()
    }
}

impl Subscriber for MemoryStore {
    fn on_event(&self, _channel: Channel, event: &Event) {
        match event {
            Event::ExpressionUpdated { expression } => self.put((**expression).clone()),
            Event::ExpressionDeleted { fei } => self.remove(fei),
            _ => {}
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
