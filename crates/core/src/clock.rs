// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time source for expression timestamps and timeout deadlines.
//!
//! The engine only ever needs "now" as milliseconds since the Unix epoch,
//! read through the object-safe [`Clock`] trait so a context can hold it
//! as `Arc<dyn Clock>`. Tests swap in [`FakeClock`], a hand-cranked
//! counter, and fire timeouts deterministically.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of the current time, in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn epoch_ms(&self) -> u64;
}

/// Clock backed by [`SystemTime`].
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_ms(&self) -> u64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since_epoch) => since_epoch.as_millis() as u64,
            // Clock set before 1970; treat as the epoch itself.
            Err(_) => 0,
        }
    }
}

/// Hand-cranked clock for tests. Time moves only when told to.
///
/// Clones share one counter, so a test keeps a handle while the engine
/// holds another and both always agree.
#[derive(Clone)]
pub struct FakeClock {
    ms: Arc<AtomicU64>,
}

impl FakeClock {
    /// Starts from a fixed, plausible timestamp (not zero), so duration
    /// arithmetic around the starting point never underflows.
    pub fn new() -> Self {
        Self { ms: Arc::new(AtomicU64::new(1_700_000_000_000)) }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        self.ms.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    /// Jump the clock to an absolute timestamp.
    pub fn set_epoch_ms(&self, ms: u64) {
        self.ms.store(ms, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn epoch_ms(&self) -> u64 {
        self.ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
