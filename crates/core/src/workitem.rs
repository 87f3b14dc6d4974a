// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workitem: the flow-level payload travelling between expressions.

use crate::fei::Fei;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field set by a timeout cancel: `[fei, epoch_ms]`.
pub const TIMED_OUT_FIELD: &str = "__timed_out__";

/// The payload carried through a workflow instance.
///
/// `fei` names the expression currently holding the workitem; it is
/// rewritten every time the workitem is handed to a child or back to a
/// parent. `Clone` is the deep copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workitem {
    pub fei: Fei,
    #[serde(default)]
    pub fields: IndexMap<String, Value>,
}

impl Workitem {
    pub fn new(fei: Fei) -> Self {
        Self { fei, fields: IndexMap::new() }
    }

    pub fn with_fields(fei: Fei, fields: IndexMap<String, Value>) -> Self {
        Self { fei, fields }
    }

    /// Deep copy re-addressed to another expression.
    pub fn with_fei(mut self, fei: Fei) -> Self {
        self.fei = fei;
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// True once a timeout cancel has stamped this workitem.
    pub fn timed_out(&self) -> bool {
        self.fields.contains_key(TIMED_OUT_FIELD)
    }
}

#[cfg(test)]
#[path = "workitem_tests.rs"]
mod tests;
