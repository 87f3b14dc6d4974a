// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events published on the work queue.
//!
//! Serializes with `{"type": "group:name", ...fields}` format. Every event
//! belongs to exactly one [`Channel`]; subscribers register per channel.

use crate::expression::ExpressionData;
use crate::fei::Fei;
use crate::message::FlowMessage;
use crate::workitem::Workitem;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Error class used for scheduler-promoted timeout errors.
pub const TIMEOUT_ERROR_CLASS: &str = "TimeoutError";

/// Trace marker of a flow-level error (a timeout is not a crash).
pub const FLOW_LEVEL_TRACE: &str = "---";

/// Work-queue channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Expressions,
    Variables,
    Errors,
}

crate::simple_display! {
    Channel {
        Expressions => "expressions",
        Variables => "variables",
        Errors => "errors",
    }
}

/// Details of a raised flow error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowErrorDetail {
    pub class: SmolStr,
    pub message: String,
    /// Empty for dispatch errors; `["---"]` for flow-level timeouts.
    #[serde(default)]
    pub trace: Vec<String>,
}

impl FlowErrorDetail {
    /// A flow-level timeout promoted to an error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            class: SmolStr::new_static(TIMEOUT_ERROR_CLASS),
            message: message.into(),
            trace: vec![FLOW_LEVEL_TRACE.to_string()],
        }
    }

    /// A dispatch error (no stack trace to offer).
    pub fn dispatch(message: impl Into<String>) -> Self {
        Self { class: SmolStr::new_static("EngineError"), message: message.into(), trace: vec![] }
    }
}

/// Events that record externally-observable mutations of the flow tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    // -- expressions --
    /// Persist: the full expression state, re-serialized by the storage.
    #[serde(rename = "expression:updated")]
    ExpressionUpdated { expression: Box<ExpressionData> },

    /// Unpersist after a successful reply.
    #[serde(rename = "expression:deleted")]
    ExpressionDeleted { fei: Fei },

    /// A node detached itself into an independent branch.
    #[serde(rename = "expression:forgotten")]
    ExpressionForgotten { fei: Fei, parent: Option<Fei> },

    #[serde(rename = "tag:entered")]
    TagEntered { tag: SmolStr, fei: Fei },

    #[serde(rename = "tag:left")]
    TagLeft { tag: SmolStr, fei: Fei },

    // -- flow lifecycle --
    #[serde(rename = "flow:launched")]
    FlowLaunched { wfid: SmolStr },

    /// The root expression replied; the workflow instance is over.
    #[serde(rename = "flow:terminated")]
    FlowTerminated { wfid: SmolStr, workitem: Workitem },

    // -- variables --
    #[serde(rename = "variable:set")]
    VariableSet { var: String, fei: Fei },

    #[serde(rename = "variable:unset")]
    VariableUnset { var: String, fei: Fei },

    // -- errors --
    /// A flow error; `msg` carries the message needed to resume.
    #[serde(rename = "error:raised")]
    ErrorRaised { wfid: SmolStr, error: FlowErrorDetail, msg: Box<FlowMessage> },
}

impl Event {
    /// The channel this event is published on.
    pub fn channel(&self) -> Channel {
        match self {
            Event::ExpressionUpdated { .. }
            | Event::ExpressionDeleted { .. }
            | Event::ExpressionForgotten { .. }
            | Event::TagEntered { .. }
            | Event::TagLeft { .. }
            | Event::FlowLaunched { .. }
            | Event::FlowTerminated { .. } => Channel::Expressions,
            Event::VariableSet { .. } | Event::VariableUnset { .. } => Channel::Variables,
            Event::ErrorRaised { .. } => Channel::Errors,
        }
    }

    /// One-line summary for log output.
    pub fn log_summary(&self) -> String {
        match self {
            Event::ExpressionUpdated { expression } => {
                format!("updated {} state={}", expression.fei, expression.state)
            }
            Event::ExpressionDeleted { fei } => format!("deleted {fei}"),
            Event::ExpressionForgotten { fei, .. } => format!("forgotten {fei}"),
            Event::TagEntered { tag, fei } => format!("tag {tag} entered at {fei}"),
            Event::TagLeft { tag, fei } => format!("tag {tag} left at {fei}"),
            Event::FlowLaunched { wfid } => format!("launched {wfid}"),
            Event::FlowTerminated { wfid, .. } => format!("terminated {wfid}"),
            Event::VariableSet { var, fei } => format!("var {var} set from {fei}"),
            Event::VariableUnset { var, fei } => format!("var {var} unset from {fei}"),
            Event::ErrorRaised { wfid, error, .. } => {
                format!("error {} in {wfid}: {}", error.class, error.message)
            }
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
