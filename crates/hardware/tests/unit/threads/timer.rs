//! Timer Device Tests.

use mipsim_core::{Config, Simulator};
use mipsim_core::config::TimerConfig;
use mipsim_core::core::arch::level::IntStatus;
use mipsim_core::core::arch::mode::MachineStatus;
use mipsim_core::devices::Timer;
use mipsim_core::sim::InterruptKind;
use pretty_assertions::assert_eq;

use crate::common::harness::{Log, boot, quiet_config};

fn seeded(seed: u64) -> TimerConfig {
    TimerConfig {
        enabled: true,
        ticks: 100,
        random_seed: Some(seed),
    }
}

#[test]
fn periodic_timer_arms_one_period_ahead() {
    let sim = Simulator::new(quiet_config());
    let timer = Timer::start(&sim, TimerConfig::default());
    assert_eq!(sim.pending_interrupts(), vec![(InterruptKind::Timer, 100)]);
    assert_eq!(timer.next_interval(), 100);
}

#[test]
fn seeded_intervals_are_bounded_and_reproducible() {
    let sim = Simulator::new(quiet_config());
    let a = Timer::start(&sim, seeded(7));
    let b = Timer::start(&sim, seeded(7));
    let xs: Vec<u64> = (0..64).map(|_| a.next_interval()).collect();
    let ys: Vec<u64> = (0..64).map(|_| b.next_interval()).collect();
    assert_eq!(xs, ys);
    assert!(xs.iter().all(|&x| (1..=200).contains(&x)), "{xs:?}");
    assert!(xs.windows(2).any(|w| w[0] != w[1]));
}

#[test]
fn zero_seed_still_randomizes() {
    let sim = Simulator::new(quiet_config());
    let timer = Timer::start(&sim, seeded(0));
    let xs: Vec<u64> = (0..8).map(|_| timer.next_interval()).collect();
    assert!(xs.windows(2).any(|w| w[0] != w[1]), "{xs:?}");
}

#[test]
fn expiry_rearms_itself() {
    let sim = Simulator::new(quiet_config());
    let _timer = Timer::start(&sim, TimerConfig::default());
    // Something else pending, or an idle machine would never fire a lone timer.
    let _ = sim.schedule(InterruptKind::Disk, 1000, |_: &Simulator| {});
    // No thread is running, so expiries must not ask for a yield.
    sim.set_status(MachineStatus::Idle);
    for _ in 0..10 {
        sim.tick();
    }
    assert_eq!(
        sim.pending_interrupts(),
        vec![(InterruptKind::Timer, 200), (InterruptKind::Disk, 1000)]
    );
}

fn spin_pair(config: Config) -> Vec<&'static str> {
    let log = Log::new();
    let trace = log.clone();
    let _ = boot(config, move |sim| {
        for name in ["A", "B"] {
            let trace = trace.clone();
            let _ = sim
                .fork(name, move |sim| {
                    for _ in 0..30 {
                        let _ = sim.set_level(IntStatus::Off);
                        trace.push(name);
                        let _ = sim.set_level(IntStatus::On);
                    }
                })
                .unwrap();
        }
    })
    .unwrap();
    log.snapshot()
}

fn runs(names: &[&str]) -> usize {
    1 + names.windows(2).filter(|w| w[0] != w[1]).count()
}

#[test]
fn without_a_timer_threads_run_to_completion() {
    let names = spin_pair(quiet_config());
    assert_eq!(names.len(), 60);
    assert_eq!(runs(&names), 2);
}

#[test]
fn timer_preempts_busy_threads() {
    let mut config = quiet_config();
    config.timer.enabled = true;
    let names = spin_pair(config);
    assert_eq!(names.len(), 60);
    assert_eq!(names[0], "A");
    assert!(runs(&names) >= 4, "{names:?}");
}
