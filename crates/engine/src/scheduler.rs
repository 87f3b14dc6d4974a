// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timed wake-ups for expression timeouts.
//!
//! The scheduler holds pending cancels; when an entry comes due it turns
//! into a [`FlowMessage::Cancel`] for the pool. The returned job token lets
//! an early normal reply unschedule the cancel.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use weft_core::{CancelFlavour, Fei, FlowMessage};

/// One scheduled cancel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledCancel {
    pub job_id: String,
    pub at_ms: u64,
    pub fei: Fei,
    pub flavour: CancelFlavour,
}

/// Holds scheduled cancels until their deadline passes.
#[derive(Default)]
pub struct Scheduler {
    entries: Vec<ScheduledCancel>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a cancel `duration` from `now_ms`. Returns the job token.
    pub fn schedule(
        &mut self,
        duration: Duration,
        fei: Fei,
        flavour: CancelFlavour,
        now_ms: u64,
    ) -> String {
        let job_id = format!("tj-{}", nanoid::nanoid!(10));
        let at_ms = now_ms.saturating_add(duration.as_millis() as u64);
        tracing::debug!(%fei, job_id, at_ms, %flavour, "scheduled cancel");
        self.entries.push(ScheduledCancel { job_id: job_id.clone(), at_ms, fei, flavour });
        job_id
    }

    /// Drop a scheduled cancel by token. Unknown tokens are a no-op.
    pub fn unschedule(&mut self, job_id: &str) {
        self.entries.retain(|e| e.job_id != job_id);
    }

    /// Pop every entry due at `now_ms` as a cancel message, oldest first.
    pub fn fired(&mut self, now_ms: u64) -> Vec<FlowMessage> {
        let (due, keep): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.entries).into_iter().partition(|e| e.at_ms <= now_ms);
        self.entries = keep;
        due.into_iter()
            .map(|e| FlowMessage::Cancel { fei: e.fei, flavour: e.flavour })
            .collect()
    }

    /// The earliest pending deadline, if any.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.at_ms).min()
    }

    pub fn has_entries(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
