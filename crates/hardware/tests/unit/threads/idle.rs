//! Idle and Halt Tests.

use mipsim_core::core::arch::level::IntStatus;
use mipsim_core::sim::InterruptKind;
use pretty_assertions::assert_eq;

use crate::common::harness::{Log, boot, quiet_config};

#[test]
fn idle_jumps_exactly_to_the_next_event() {
    let log = Log::new();
    let trace = log.clone();
    let stats = boot(quiet_config(), move |sim| {
        let me = sim.current_thread();
        let when = sim.schedule(InterruptKind::Disk, 100, move |sim| sim.ready_to_run(me));
        trace.push(when);

        let _ = sim.set_level(IntStatus::Off);
        sim.sleep();
        trace.push(sim.stats().ticks.total);
    })
    .unwrap();

    assert_eq!(log.snapshot(), vec![110, 110]);
    assert_eq!(stats.ticks.total, 110);
    assert_eq!(stats.ticks.idle, 100);
    assert_eq!(stats.ticks.system, 10);
}

#[test]
fn lone_timer_does_not_keep_the_machine_alive() {
    let mut config = quiet_config();
    config.timer.enabled = true;
    let stats = boot(config, |_| {}).unwrap();
    // The clock runs up to the timer's expiry, which then never fires.
    assert_eq!(stats.ticks.total, 100);
    assert_eq!(stats.ticks.idle, 90);
    assert_eq!(stats.ticks.system, 10);
}

#[test]
fn timer_fires_while_idle_until_real_work_is_done() {
    let mut config = quiet_config();
    config.timer.enabled = true;
    config.timer.ticks = 100;

    let log = Log::new();
    let trace = log.clone();
    let stats = boot(config, move |sim| {
        let me = sim.current_thread();
        let _ = sim.schedule(InterruptKind::Disk, 500, move |sim| sim.ready_to_run(me));
        let _ = sim.set_level(IntStatus::Off);
        sim.sleep();
        trace.push(sim.stats().ticks.total);
    })
    .unwrap();

    assert_eq!(log.snapshot(), vec![510]);
    // Halting idles up to the next expiry at 600.
    assert_eq!(stats.ticks.total, 600);
    assert_eq!(stats.context_switches, 0, "idle timer expiries never preempt");
}
