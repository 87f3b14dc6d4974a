// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Messages consumed by the expression-pool dispatch loop.
//!
//! A message is the unit of cooperative scheduling: each one runs a single
//! expression method to completion. Messages are serializable so that a
//! raised error can carry the exact apply needed to resume the flow.

use crate::fei::Fei;
use crate::state::{CancelFlavour, HandlerKind};
use crate::tree::Tree;
use crate::workitem::Workitem;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Everything needed to apply (or reapply) one expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyRequest {
    pub tree: Tree,
    pub fei: Fei,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Fei>,
    pub workitem: Workitem,
    /// `Some` when the new expression introduces a variable scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<IndexMap<String, Value>>,
    /// Set on handler reapplies, naming the handler that fired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<HandlerKind>,
}

/// One unit of work for the dispatch loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum FlowMessage {
    #[serde(rename = "apply")]
    Apply(ApplyRequest),

    /// Deliver a child's (or an external participant's) reply.
    /// `workitem.fei` names the replying expression.
    #[serde(rename = "reply")]
    Reply { fei: Fei, workitem: Workitem },

    #[serde(rename = "cancel")]
    Cancel { fei: Fei, flavour: CancelFlavour },
}

impl FlowMessage {
    /// The expression this message is addressed to.
    pub fn fei(&self) -> &Fei {
        match self {
            FlowMessage::Apply(req) => &req.fei,
            FlowMessage::Reply { fei, .. } => fei,
            FlowMessage::Cancel { fei, .. } => fei,
        }
    }

    /// Message name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            FlowMessage::Apply(_) => "apply",
            FlowMessage::Reply { .. } => "reply",
            FlowMessage::Cancel { .. } => "cancel",
        }
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
