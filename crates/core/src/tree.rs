// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Expression tree: the `(name, attributes, children)` triple.
//!
//! Trees serialize as the 3-element array `[name, attributes, children]`.
//! Attribute values are arbitrary JSON scalars; keys mapped to `null` form
//! the "text" argument of the expression. `Clone` is the deep copy — a
//! cloned tree never aliases the original's attributes or children.

use indexmap::IndexMap;
use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use smol_str::SmolStr;

/// One node of a process-definition tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    pub name: SmolStr,
    pub attributes: IndexMap<String, Value>,
    pub children: Vec<Tree>,
}

impl Tree {
    /// An attribute-less, childless tree.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self { name: name.into(), attributes: IndexMap::new(), children: Vec::new() }
    }

    /// Alias for [`Tree::new`] used when synthesizing `[name, {}, []]`
    /// handler invocations from a bare handler name.
    pub fn bare(name: impl Into<SmolStr>) -> Self {
        Self::new(name)
    }

    /// Look up an attribute value.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Look up a string attribute value.
    pub fn attribute_text(&self, key: &str) -> Option<&str> {
        match self.attributes.get(key) {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: Value) {
        self.attributes.insert(key.into(), value);
    }

    /// The "text" argument: the first attribute key mapped to `null`.
    pub fn text(&self) -> Option<&str> {
        self.attributes.iter().find(|(_, v)| v.is_null()).map(|(k, _)| k.as_str())
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut t = serializer.serialize_tuple(3)?;
        t.serialize_element(self.name.as_str())?;
        t.serialize_element(&self.attributes)?;
        t.serialize_element(&self.children)?;
        t.end()
    }
}

impl<'de> Deserialize<'de> for Tree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TreeVisitor;

        impl<'de> Visitor<'de> for TreeVisitor {
            type Value = Tree;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a [name, attributes, children] triple")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Tree, A::Error> {
                let name: SmolStr = seq
                    .next_element()?
                    .ok_or_else(|| serde::de::Error::invalid_length(0, &self))?;
                let attributes: IndexMap<String, Value> = seq
                    .next_element()?
                    .ok_or_else(|| serde::de::Error::invalid_length(1, &self))?;
                let children: Vec<Tree> = seq
                    .next_element()?
                    .ok_or_else(|| serde::de::Error::invalid_length(2, &self))?;
                Ok(Tree { name, attributes, children })
            }
        }

        deserializer.deserialize_seq(TreeVisitor)
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
