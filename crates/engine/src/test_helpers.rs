// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for engine unit tests.

use crate::engine::{Engine, EngineConfig};
use indexmap::IndexMap;
use smol_str::SmolStr;
use std::sync::Arc;
use weft_core::{Event, FakeClock, Fei, Tree, Workitem};

/// An engine on a fake clock, plus a handle to that clock.
pub(crate) fn test_engine() -> (Engine, FakeClock) {
    let clock = FakeClock::new();
    let engine = Engine::with_clock(EngineConfig::default(), Arc::new(clock.clone()));
    (engine, clock)
}

/// Launch a tree with no fields and drain. Returns (wfid, root fei).
pub(crate) fn launch_and_drain(engine: &Engine, tree: Tree) -> (SmolStr, Fei) {
    let wfid = engine.launch(tree, IndexMap::new());
    engine.run_until_idle();
    let fei = Fei::root(wfid.clone());
    (wfid, fei)
}

/// Count of persist events recorded for one expression.
pub(crate) fn update_events_for(engine: &Engine, fei: &Fei) -> usize {
    engine
        .journal()
        .events()
        .iter()
        .filter(
            |e| matches!(e, Event::ExpressionUpdated { expression } if expression.fei == *fei),
        )
        .count()
}

/// The workitem a terminated flow ended with, if it terminated.
pub(crate) fn terminated_workitem(engine: &Engine, wfid: &str) -> Option<Workitem> {
    engine.journal().events().into_iter().find_map(|e| match e {
        Event::FlowTerminated { wfid: w, workitem } if w == wfid => Some(workitem),
        _ => None,
    })
}
