//! Event Timeline Tests.
//!
//! The bare [`Timeline`] is exercised directly for ordering and clock
//! arithmetic; firing through [`Simulator::tick`] checks that handlers run
//! exactly once, never early, in the interrupt context.

use std::sync::{Arc, Mutex};

use mipsim_core::Simulator;
use mipsim_core::core::arch::level::IntStatus;
use mipsim_core::core::arch::mode::MachineStatus;
use mipsim_core::sim::{InterruptKind, Timeline};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::common::harness::{Log, quiet_config};

fn noop() -> Box<dyn FnOnce(&Simulator) + Send> {
    Box::new(|_: &Simulator| {})
}

#[test]
fn schedule_returns_absolute_fire_time() {
    let mut timeline = Timeline::new();
    timeline.advance(1, 10);
    assert_eq!(timeline.schedule(InterruptKind::Disk, 5, noop()), 15);
    assert_eq!(timeline.pending(), vec![(InterruptKind::Disk, 15)]);
}

#[test]
#[should_panic(expected = "zero delay")]
fn zero_delay_is_rejected() {
    let _ = Timeline::new().schedule(InterruptKind::Timer, 0, noop());
}

#[test]
fn events_are_not_taken_before_they_are_due() {
    let mut timeline = Timeline::new();
    let _ = timeline.schedule(InterruptKind::ConsoleWrite, 5, noop());
    assert!(timeline.take_due(false).is_none());

    timeline.advance(1, 10);
    let event = timeline.take_due(false).unwrap();
    assert_eq!((event.kind, event.when), (InterruptKind::ConsoleWrite, 5));
    assert_eq!(timeline.pending_len(), 0);
}

#[test]
fn advancing_take_skips_the_gap_as_idle_time() {
    let mut timeline = Timeline::new();
    timeline.advance(1, 10);
    let _ = timeline.schedule(InterruptKind::Disk, 90, noop());

    let event = timeline.take_due(true).unwrap();
    assert_eq!(event.when, 100);
    let clock = timeline.clock();
    assert_eq!((clock.total, clock.idle, clock.system), (100, 90, 10));
}

#[test]
fn new_timeline_starts_masked_in_system_mode() {
    let timeline = Timeline::new();
    assert_eq!(timeline.level(), IntStatus::Off);
    assert_eq!(timeline.status(), MachineStatus::System);
    assert!(!timeline.in_handler());
}

proptest! {
    #[test]
    fn fire_order_is_time_then_submission(delays in prop::collection::vec(1u64..6, 1..24)) {
        let sim = Simulator::new(quiet_config());
        let fired = Arc::new(Mutex::new(Vec::new()));
        let mut timeline = Timeline::new();
        for (id, &delay) in delays.iter().enumerate() {
            let fired = Arc::clone(&fired);
            let _ = timeline.schedule(
                InterruptKind::Disk,
                delay,
                Box::new(move |_: &Simulator| fired.lock().unwrap().push(id)),
            );
        }

        let mut times = Vec::new();
        while let Some(event) = timeline.take_due(true) {
            times.push(event.when);
            (event.handler)(&sim);
        }

        let mut expected: Vec<usize> = (0..delays.len()).collect();
        expected.sort_by_key(|&id| delays[id]);
        prop_assert_eq!(fired.lock().unwrap().clone(), expected);
        prop_assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }
}

#[test]
fn tick_fires_a_handler_once_and_not_early() {
    let sim = Simulator::new(quiet_config());
    let fired = Log::new();
    let log = fired.clone();
    let when = sim.schedule(InterruptKind::Disk, 25, move |s| {
        log.push(s.stats().ticks.total);
    });
    assert_eq!(when, 25);

    sim.tick();
    sim.tick();
    assert!(fired.snapshot().is_empty(), "due at 25, clock is 20");

    for _ in 0..5 {
        sim.tick();
    }
    assert_eq!(fired.snapshot(), vec![30]);
    assert!(sim.pending_interrupts().is_empty());
}

#[test]
fn handlers_run_masked_in_system_mode() {
    let sim = Simulator::new(quiet_config());
    let seen = Log::new();
    let log = seen.clone();
    let _ = sim.schedule(InterruptKind::Timer, 1, move |s| {
        log.push((s.level(), s.status(), s.interrupted_status()));
    });
    sim.set_status(MachineStatus::User);
    sim.tick();

    assert_eq!(
        seen.snapshot(),
        vec![(IntStatus::Off, MachineStatus::System, MachineStatus::User)]
    );
    assert_eq!(sim.status(), MachineStatus::User, "status restored");
    assert_eq!(sim.level(), IntStatus::On);
}

#[test]
fn handlers_may_schedule_further_events() {
    let sim = Simulator::new(quiet_config());
    let _ = sim.schedule(InterruptKind::ConsoleRead, 10, |s| {
        let _ = s.schedule(InterruptKind::ConsoleRead, 40, |_| {});
    });
    sim.tick();
    assert_eq!(
        sim.pending_interrupts(),
        vec![(InterruptKind::ConsoleRead, 50)]
    );
}

#[test]
fn reenabling_interrupts_costs_a_tick() {
    let sim = Simulator::new(quiet_config());
    let _ = sim.set_level(IntStatus::On);
    assert_eq!(sim.stats().ticks.total, 10);

    let old = sim.set_level(IntStatus::Off);
    assert_eq!(old, IntStatus::On);
    let _ = sim.set_level(IntStatus::Off);
    assert_eq!(sim.stats().ticks.total, 10, "masking is free");
}

#[test]
#[should_panic(expected = "must not enable interrupts")]
fn handlers_cannot_enable_interrupts() {
    let sim = Simulator::new(quiet_config());
    let _ = sim.schedule(InterruptKind::Disk, 1, |s| {
        let _ = s.set_level(IntStatus::On);
    });
    sim.tick();
}

#[test]
#[should_panic(expected = "outside an interrupt handler")]
fn yield_on_return_needs_a_handler() {
    Simulator::new(quiet_config()).yield_on_return();
}
