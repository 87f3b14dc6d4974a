// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted state of one flow expression.
//!
//! [`ExpressionData`] is the full serializable node: it is what the storage
//! keeps, what `expression:updated` events carry, and what crash recovery
//! reloads. The engine-context handle is deliberately not part of it; the
//! engine rebinds a fresh context when an expression is loaded.

use crate::fei::Fei;
use crate::state::{ExprState, HandlerKind};
use crate::tree::Tree;
use crate::workitem::Workitem;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smol_str::SmolStr;

/// Everything the storage knows about one live expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionData {
    pub fei: Fei,
    /// None for roots: the original workflow root and forgotten branches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Fei>,
    /// The tree as applied.
    pub original_tree: Tree,
    /// Deep copy with local edits; takes precedence over `original_tree`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_tree: Option<Tree>,
    /// Feis of currently-active children, in spawn order.
    #[serde(default)]
    pub children: Vec<Fei>,
    /// Present only on scope-owning nodes (roots, forgotten nodes,
    /// definition-introducing constructs).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<IndexMap<String, Value>>,
    /// Deep copy of the workitem passed in at apply time.
    pub applied_workitem: Workitem,
    pub state: ExprState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_cancel: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_error: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_timeout: Option<Value>,
    /// Tag name bound to this fei between apply and reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagname: Option<SmolStr>,
    /// Token of the scheduled timeout cancel, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_job_id: Option<String>,
    /// Which handler reapplied this node, when it is a handler reapply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered_by: Option<HandlerKind>,
    pub created_at_ms: u64,
    pub modified_at_ms: u64,
}

impl ExpressionData {
    /// Build the state of a freshly-applied expression.
    ///
    /// The `on_cancel` / `on_error` / `on_timeout` handlers are resolved
    /// here, once, from the tree's attributes.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        fei: Fei,
        parent_id: Option<Fei>,
        tree: Tree,
        workitem: Workitem,
        variables: Option<IndexMap<String, Value>>,
        triggered_by: Option<HandlerKind>,
        now_ms: u64,
    ) -> Self {
        let on_cancel = tree.attribute("on_cancel").cloned();
        let on_error = tree.attribute("on_error").cloned();
        let on_timeout = tree.attribute("on_timeout").cloned();
        Self {
            fei,
            parent_id,
            original_tree: tree,
            updated_tree: None,
            children: Vec::new(),
            variables,
            applied_workitem: workitem,
            state: ExprState::Active,
            on_cancel,
            on_error,
            on_timeout,
            tagname: None,
            timeout_job_id: None,
            triggered_by,
            created_at_ms: now_ms,
            modified_at_ms: now_ms,
        }
    }

    /// The current tree: the updated copy when present, else the original.
    pub fn tree(&self) -> &Tree {
        self.updated_tree.as_ref().unwrap_or(&self.original_tree)
    }

    /// Materialize and return the editable tree copy.
    pub fn update_tree(&mut self) -> &mut Tree {
        self.updated_tree.get_or_insert_with(|| self.original_tree.clone())
    }

    /// Expression name (the tree's head symbol).
    pub fn name(&self) -> SmolStr {
        self.tree().name.clone()
    }

    /// Track a newly-spawned child. Returns false if already registered.
    pub fn register_child(&mut self, fei: Fei) -> bool {
        if self.children.contains(&fei) {
            return false;
        }
        self.children.push(fei);
        true
    }

    /// Drop a replied child. Returns false if it was not registered.
    pub fn unregister_child(&mut self, fei: &Fei) -> bool {
        let before = self.children.len();
        self.children.retain(|c| c != fei);
        self.children.len() != before
    }

    /// The captured handler of the given kind, if any.
    pub fn handler(&self, kind: HandlerKind) -> Option<&Value> {
        match kind {
            HandlerKind::OnError => self.on_error.as_ref(),
            HandlerKind::OnCancel => self.on_cancel.as_ref(),
            HandlerKind::OnTimeout => self.on_timeout.as_ref(),
        }
    }

    /// True for nodes that introduce a variable scope.
    pub fn owns_scope(&self) -> bool {
        self.variables.is_some()
    }
}

#[cfg(test)]
#[path = "expression_tests.rs"]
mod tests;
