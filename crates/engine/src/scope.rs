// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lexical variable scoping along the parent chain.
//!
//! Variables live in the `variables` table of scope-owning expressions.
//! A name may carry a slash prefix: no slash resolves in the nearest
//! enclosing scope (falling back to the engine-global scope), one slash
//! skips the local scope and resolves from the parent, two or more go
//! straight to the engine-global scope.

use crate::expression::FlowExpression;
use indexmap::IndexMap;
use serde_json::Value;
use weft_core::{Event, Fei, HandlerKind};

/// Bound on alias chains chased by `iterative_var_lookup`.
const MAX_ALIAS_HOPS: usize = 64;

/// Split a variable name into its slash prefix (at most two slashes) and
/// the bare name. The whole leading run of slashes is consumed.
pub(crate) fn split_prefix(name: &str) -> (&str, &str) {
    let bare = name.trim_start_matches('/');
    let run = name.len() - bare.len();
    (&name[..run.min(2)], bare)
}

impl FlowExpression {
    /// Resolve a variable, honoring slash prefixes.
    pub fn lookup_variable(&self, name: &str) -> Option<Value> {
        let (prefix, bare) = split_prefix(name);
        self.lookup_prefixed(bare, prefix)
    }

    fn lookup_prefixed(&self, name: &str, prefix: &str) -> Option<Value> {
        if prefix.len() >= 2 {
            return self.ctx.engine_variable(name);
        }
        if !prefix.is_empty() {
            if let Some(parent) = self.parent() {
                return parent.lookup_prefixed(name, &prefix[1..]);
            }
        }
        if let Some(vars) = &self.data.variables {
            // A present-but-null binding falls through to the parent chain.
            if let Some(value) = vars.get(name) {
                if !value.is_null() {
                    return Some(value.clone());
                }
            }
        }
        if let Some(parent) = self.parent() {
            return parent.lookup_prefixed(name, "");
        }
        self.ctx.engine_variable(name)
    }

    /// Bind a variable in the nearest enclosing scope (or further up,
    /// per the slash prefix). Writes persist the owning expression and
    /// emit a `variable:set` event from it.
    pub fn set_variable(&mut self, name: &str, value: Value) {
        let (prefix, bare) = split_prefix(name);
        self.set_prefixed(bare, prefix, value);
    }

    fn set_prefixed(&mut self, name: &str, prefix: &str, value: Value) {
        if prefix.len() >= 2 {
            self.ctx.set_engine_variable(name, value);
            self.emit_variable_event(name, true);
            return;
        }
        if !prefix.is_empty() {
            match self.parent() {
                Some(mut parent) => parent.set_prefixed(name, &prefix[1..], value),
                None => {
                    tracing::warn!(fei = %self.fei(), var = name, "prefixed write with no parent, dropping")
                }
            }
            return;
        }
        if let Some(vars) = self.data.variables.as_mut() {
            vars.insert(name.to_string(), value);
            self.persist();
            self.emit_variable_event(name, true);
            return;
        }
        match self.parent() {
            Some(mut parent) => parent.set_prefixed(name, "", value),
            None => {
                tracing::warn!(fei = %self.fei(), var = name, "no scope to write to, dropping")
            }
        }
    }

    /// Remove a variable binding, honoring slash prefixes.
    pub fn unset_variable(&mut self, name: &str) {
        let (prefix, bare) = split_prefix(name);
        self.unset_prefixed(bare, prefix);
    }

    fn unset_prefixed(&mut self, name: &str, prefix: &str) {
        if prefix.len() >= 2 {
            self.ctx.unset_engine_variable(name);
            self.emit_variable_event(name, false);
            return;
        }
        if !prefix.is_empty() {
            match self.parent() {
                Some(mut parent) => parent.unset_prefixed(name, &prefix[1..]),
                None => {
                    tracing::warn!(fei = %self.fei(), var = name, "prefixed unset with no parent, dropping")
                }
            }
            return;
        }
        if let Some(vars) = self.data.variables.as_mut() {
            if vars.shift_remove(name).is_some() {
                self.persist();
                self.emit_variable_event(name, false);
            }
            return;
        }
        match self.parent() {
            Some(mut parent) => parent.unset_prefixed(name, ""),
            None => {
                tracing::warn!(fei = %self.fei(), var = name, "no scope to unset in, dropping")
            }
        }
    }

    /// Chase string aliases: while the looked-up value is itself a string,
    /// look that up in turn. Returns the final name and its value.
    pub fn iterative_var_lookup(&self, name: &str) -> (String, Option<Value>) {
        let mut name = name.to_string();
        for _ in 0..MAX_ALIAS_HOPS {
            match self.lookup_variable(&name) {
                Some(Value::String(next)) => name = next,
                other => return (name, other),
            }
        }
        tracing::warn!(fei = %self.fei(), var = %name, "alias chain too deep, giving up");
        (name, None)
    }

    /// Flatten every variable visible from here into one mapping,
    /// local bindings overriding inherited ones.
    pub fn compile_variables(&self) -> IndexMap<String, Value> {
        let mut compiled = self.parent().map(|p| p.compile_variables()).unwrap_or_default();
        if let Some(vars) = &self.data.variables {
            for (name, value) in vars {
                compiled.insert(name.clone(), value.clone());
            }
        }
        compiled
    }

    /// Nearest expression (self included) carrying a handler of `kind`.
    pub fn lookup_on(&self, kind: HandlerKind) -> Option<Fei> {
        if self.data.handler(kind).is_some() {
            return Some(self.fei().clone());
        }
        self.parent()?.lookup_on(kind)
    }

    fn emit_variable_event(&self, name: &str, set: bool) {
        let event = if set {
            Event::VariableSet { var: name.to_string(), fei: self.fei().clone() }
        } else {
            Event::VariableUnset { var: name.to_string(), fei: self.fei().clone() }
        };
        self.ctx.bus.emit(event);
    }
}

#[cfg(test)]
#[path = "scope_tests.rs"]
mod tests;
