// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Guard condition evaluation for the `if` / `unless` attributes.

use crate::workitem::Workitem;
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Regex pattern for ${field_name} placeholders
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static FIELD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_.-]*)\}").expect("constant regex pattern is valid")
});

/// Shared predicate deciding whether a guarded expression runs at all.
pub struct Condition;

impl Condition {
    /// Substitute `${name}` placeholders with workitem field values.
    ///
    /// Unknown fields are left as-is; null fields render as the empty string.
    pub fn substitute(template: &str, workitem: &Workitem) -> String {
        FIELD_PATTERN
            .replace_all(template, |caps: &regex::Captures| {
                match workitem.field(&caps[1]) {
                    Some(value) => render(value),
                    None => caps[0].to_string(),
                }
            })
            .to_string()
    }

    /// Truthiness of a substituted condition string.
    ///
    /// Empty, "false" and "nil" are false; everything else is true.
    pub fn truthy(s: &str) -> bool {
        !matches!(s.trim(), "" | "false" | "nil")
    }

    /// Evaluate a condition expression against a workitem.
    ///
    /// Supports `!=` and `==` comparisons after substitution; anything else
    /// falls back to plain truthiness.
    pub fn eval(expr: &str, workitem: &Workitem) -> bool {
        let s = Self::substitute(expr, workitem);
        if let Some((left, right)) = s.split_once("!=") {
            return left.trim() != right.trim();
        }
        if let Some((left, right)) = s.split_once("==") {
            return left.trim() == right.trim();
        }
        Self::truthy(&s)
    }

    /// The guard veto: true when `if` is falsy or `unless` is truthy.
    pub fn skip(attributes: &IndexMap<String, Value>, workitem: &Workitem) -> bool {
        if let Some(value) = attributes.get("if") {
            if !Self::attribute_holds(value, workitem) {
                return true;
            }
        }
        if let Some(value) = attributes.get("unless") {
            if Self::attribute_holds(value, workitem) {
                return true;
            }
        }
        false
    }

    fn attribute_holds(value: &Value, workitem: &Workitem) -> bool {
        match value {
            Value::Bool(b) => *b,
            Value::String(s) => Self::eval(s, workitem),
            Value::Null => false,
            other => Self::truthy(&render(other)),
        }
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "condition_tests.rs"]
mod tests;
