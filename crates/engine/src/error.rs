// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced by expression dispatch.
//!
//! Dispatch errors never unwind through the pool loop; the pool publishes
//! them as `error:raised` events and the failing expression is parked in
//! the `failed` state.

use thiserror::Error;
use weft_core::{DurationError, Fei};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("expression not found: {0}")]
    NotFound(Fei),

    #[error("{fei} has no child at index {index}")]
    NoSuchChild { fei: Fei, index: usize },

    #[error("invalid timeout {value:?}: {source}")]
    InvalidTimeout {
        value: String,
        #[source]
        source: DurationError,
    },

    #[error("invalid {kind} handler on {fei}: {detail}")]
    InvalidHandler { fei: Fei, kind: &'static str, detail: String },

    #[error("{fei} is failing without an on_error handler")]
    UnhandledFailure { fei: Fei },

    #[error("the on_error handler of {fei} failed in turn")]
    HandlerRecursion { fei: Fei },
}
