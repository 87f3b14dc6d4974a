// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::fei::Fei;
use crate::workitem::Workitem;

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core flow types.
pub mod strategies {
    use crate::fei::Fei;
    use crate::state::{CancelFlavour, ExprState};
    use crate::tree::Tree;
    use indexmap::IndexMap;
    use proptest::prelude::*;
    use serde_json::Value;

    pub fn arb_expr_state() -> impl Strategy<Value = ExprState> {
        prop_oneof![
            Just(ExprState::Active),
            Just(ExprState::Failing),
            Just(ExprState::Cancelling),
            Just(ExprState::TimingOut),
            Just(ExprState::Dying),
            Just(ExprState::Failed),
        ]
    }

    pub fn arb_flavour() -> impl Strategy<Value = CancelFlavour> {
        prop_oneof![
            Just(CancelFlavour::Cancel),
            Just(CancelFlavour::Timeout),
            Just(CancelFlavour::Kill),
        ]
    }

    pub fn arb_fei() -> impl Strategy<Value = Fei> {
        ("[a-z]{6}", proptest::collection::vec(0u32..4, 0..4)).prop_map(|(wfid, path)| {
            path.iter().fold(Fei::root(wfid.as_str()), |fei, i| fei.child_fei(*i))
        })
    }

    fn arb_attr_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            "[a-z0-9 ]{0,12}".prop_map(Value::from),
            any::<i32>().prop_map(Value::from),
        ]
    }

    /// Trees up to three levels deep with small attribute maps.
    pub fn arb_tree() -> impl Strategy<Value = Tree> {
        let leaf = ("[a-z_]{1,10}", proptest::collection::vec(("[a-z_]{1,8}", arb_attr_value()), 0..3))
            .prop_map(|(name, attrs)| Tree {
                name: name.into(),
                attributes: attrs.into_iter().collect::<IndexMap<_, _>>(),
                children: vec![],
            });
        leaf.prop_recursive(3, 12, 3, |inner| {
            ("[a-z_]{1,10}", proptest::collection::vec(inner, 0..3)).prop_map(|(name, children)| {
                Tree { name: name.into(), attributes: IndexMap::new(), children }
            })
        })
    }
}

// ── Fixture helpers ─────────────────────────────────────────────────────

/// A workitem addressed at the root of a throwaway workflow.
pub fn test_workitem(wfid: &str) -> Workitem {
    Workitem::new(Fei::root(wfid))
}

/// A workitem with one string field set.
pub fn test_workitem_with(wfid: &str, field: &str, value: &str) -> Workitem {
    let mut wi = test_workitem(wfid);
    wi.set_field(field, serde_json::Value::from(value));
    wi
}
