// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Expression lifecycle state, cancel flavours, and handler kinds.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a live expression.
///
/// `Active` is the only state an expression is born in and the only one it
/// can leave; every other state is part of tear-down and is never exited
/// back to `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprState {
    /// Applied and running normally.
    Active,
    /// `fail()` was called; children are being cancelled, `on_error` runs next.
    Failing,
    /// An ordinary cancel is in flight.
    Cancelling,
    /// A scheduler-driven timeout cancel is in flight.
    TimingOut,
    /// A kill is in flight; `on_cancel` is skipped.
    Dying,
    /// An error was raised on this expression; it sits still until replayed.
    Failed,
}

impl ExprState {
    pub fn is_active(&self) -> bool {
        matches!(self, ExprState::Active)
    }
}

crate::simple_display! {
    ExprState {
        Active => "active",
        Failing => "failing",
        Cancelling => "cancelling",
        TimingOut => "timing_out",
        Dying => "dying",
        Failed => "failed",
    }
}

/// Why a cancel was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelFlavour {
    /// Ordinary cancel (may run `on_cancel`).
    Cancel,
    /// Scheduler-driven timeout (may run `on_timeout`).
    Timeout,
    /// Hard tear-down (handlers are skipped).
    Kill,
}

impl CancelFlavour {
    /// The tear-down state a cancel of this flavour puts an expression in.
    pub fn target_state(self) -> ExprState {
        match self {
            CancelFlavour::Cancel => ExprState::Cancelling,
            CancelFlavour::Timeout => ExprState::TimingOut,
            CancelFlavour::Kill => ExprState::Dying,
        }
    }
}

crate::simple_display! {
    CancelFlavour {
        Cancel => "cancel",
        Timeout => "timeout",
        Kill => "kill",
    }
}

/// The three handler attributes an expression can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    OnError,
    OnCancel,
    OnTimeout,
}

impl HandlerKind {
    /// The tree attribute this handler is captured from.
    pub fn attribute(self) -> &'static str {
        match self {
            HandlerKind::OnError => "on_error",
            HandlerKind::OnCancel => "on_cancel",
            HandlerKind::OnTimeout => "on_timeout",
        }
    }
}

crate::simple_display! {
    HandlerKind {
        OnError => "on_error",
        OnCancel => "on_cancel",
        OnTimeout => "on_timeout",
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
