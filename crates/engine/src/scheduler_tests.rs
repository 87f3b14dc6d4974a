// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use weft_core::test_support::strategies::arb_fei;

#[test]
fn scheduler_entry_lifecycle() {
    let mut scheduler = Scheduler::new();
    let fei = Fei::root("wf-1");

    let job =
        scheduler.schedule(Duration::from_secs(10), fei.clone(), CancelFlavour::Timeout, 1_000);
    assert!(scheduler.has_entries());
    assert_eq!(scheduler.next_deadline_ms(), Some(11_000));

    // Not due yet
    assert!(scheduler.fired(6_000).is_empty());
    assert!(scheduler.has_entries());

    // Due
    let msgs = scheduler.fired(11_000);
    assert_eq!(msgs.len(), 1);
    assert!(matches!(
        &msgs[0],
        FlowMessage::Cancel { fei: f, flavour: CancelFlavour::Timeout } if *f == fei
    ));
    assert!(!scheduler.has_entries());

    // The token is gone with the entry
    scheduler.unschedule(&job);
    assert!(scheduler.is_empty());
}

#[test]
fn unschedule_cancels_the_entry() {
    let mut scheduler = Scheduler::new();
    let job = scheduler.schedule(
        Duration::from_secs(10),
        Fei::root("wf-1"),
        CancelFlavour::Timeout,
        1_000,
    );

    scheduler.unschedule(&job);
    assert!(scheduler.fired(60_000).is_empty());
    assert!(scheduler.is_empty());
}

#[test]
fn unschedule_unknown_token_is_a_no_op() {
    let mut scheduler = Scheduler::new();
    scheduler.schedule(Duration::from_secs(1), Fei::root("wf-1"), CancelFlavour::Timeout, 0);
    scheduler.unschedule("tj-unknown");
    assert_eq!(scheduler.len(), 1);
}

#[test]
fn job_tokens_are_unique() {
    let mut scheduler = Scheduler::new();
    let a = scheduler.schedule(Duration::from_secs(1), Fei::root("wf-1"), CancelFlavour::Timeout, 0);
    let b = scheduler.schedule(Duration::from_secs(1), Fei::root("wf-1"), CancelFlavour::Timeout, 0);
    assert_ne!(a, b);
}

#[test]
fn next_deadline_is_the_earliest() {
    let mut scheduler = Scheduler::new();
    scheduler.schedule(Duration::from_secs(30), Fei::root("wf-1"), CancelFlavour::Timeout, 0);
    scheduler.schedule(Duration::from_secs(5), Fei::root("wf-2"), CancelFlavour::Timeout, 0);

    assert_eq!(scheduler.next_deadline_ms(), Some(5_000));
}

#[test]
fn fired_pops_only_due_entries() {
    let mut scheduler = Scheduler::new();
    scheduler.schedule(Duration::from_secs(5), Fei::root("wf-1"), CancelFlavour::Timeout, 0);
    scheduler.schedule(Duration::from_secs(30), Fei::root("wf-2"), CancelFlavour::Kill, 0);

    let msgs = scheduler.fired(10_000);
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].fei(), &Fei::root("wf-1"));
    assert_eq!(scheduler.len(), 1);
}

proptest! {
    #[test]
    fn schedule_then_unschedule_leaves_nothing(fei in arb_fei(), secs in 1u64..3_600) {
        let mut scheduler = Scheduler::new();
        let job = scheduler.schedule(
            Duration::from_secs(secs),
            fei,
            CancelFlavour::Timeout,
            1_000,
        );
        scheduler.unschedule(&job);
        prop_assert!(scheduler.is_empty());
        prop_assert!(scheduler.fired(u64::MAX).is_empty());
    }
}
