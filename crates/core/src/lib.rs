// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! weft-core: data model for the Weft flow-expression engine

pub mod macros;

pub mod clock;
pub mod condition;
pub mod duration;
pub mod event;
pub mod expression;
pub mod fei;
pub mod message;
pub mod state;
pub mod tree;
pub mod workitem;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

// Used by the `tree!` macro expansion.
#[doc(hidden)]
pub use serde_json;

pub use clock::{Clock, FakeClock, SystemClock};
pub use condition::Condition;
pub use duration::DurationError;
pub use event::{Channel, Event, FlowErrorDetail, FLOW_LEVEL_TRACE, TIMEOUT_ERROR_CLASS};
pub use expression::ExpressionData;
pub use fei::Fei;
pub use message::{ApplyRequest, FlowMessage};
pub use state::{CancelFlavour, ExprState, HandlerKind};
pub use tree::Tree;
pub use workitem::{Workitem, TIMED_OUT_FIELD};
