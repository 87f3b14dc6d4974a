// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flow expression identifier.
//!
//! A [`Fei`] addresses one live expression inside one workflow instance.
//! The `expid` encodes the dotted path from the root ("0", "0.1", "0.1.2"),
//! and `child_id` is the expression's index among its siblings.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use smol_str::{format_smolstr, SmolStr};

/// Composite identifier for a live flow expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fei {
    /// Workflow instance id.
    pub wfid: SmolStr,
    /// Dotted path from the root expression.
    pub expid: SmolStr,
    /// Index among the siblings of the parent expression.
    #[serde(rename = "child")]
    pub child_id: u32,
}

impl Fei {
    /// Identifier of a workflow's root expression.
    pub fn root(wfid: impl Into<SmolStr>) -> Self {
        Self { wfid: wfid.into(), expid: SmolStr::new_static("0"), child_id: 0 }
    }

    /// Identifier of this expression's `index`-th child.
    pub fn child_fei(&self, index: u32) -> Self {
        Self {
            wfid: self.wfid.clone(),
            expid: format_smolstr!("{}.{}", self.expid, index),
            child_id: index,
        }
    }

    /// True for the root expression of a workflow (expid "0").
    ///
    /// Forgotten expressions become roots of their own branch but keep
    /// their original expid, so this stays false for them.
    pub fn is_root_expid(&self) -> bool {
        self.expid == "0"
    }

    /// Nesting depth (the root is depth 1).
    pub fn depth(&self) -> usize {
        self.expid.split('.').count()
    }
}

impl std::fmt::Display for Fei {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}", self.wfid, self.expid)
    }
}

impl From<&Fei> for Value {
    fn from(fei: &Fei) -> Value {
        json!({
            "wfid": fei.wfid.as_str(),
            "expid": fei.expid.as_str(),
            "child": fei.child_id,
        })
    }
}

#[cfg(test)]
#[path = "fei_tests.rs"]
mod tests;
