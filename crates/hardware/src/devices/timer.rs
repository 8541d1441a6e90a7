//! Hardware Timer.
//!
//! The timer interrupts the CPU at a fixed period, or at pseudo-random
//! intervals when seeded. Each expiry first schedules the next one, then runs
//! the kernel's timer handler, which asks the running thread to yield once the
//! handler returns. That yield is the only source of preemption.

use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::common::lock;
use crate::config::TimerConfig;
use crate::core::arch::mode::MachineStatus;
use crate::sim::interrupt::InterruptKind;
use crate::sim::simulator::Simulator;

/// Tracing target for timer events.
const TARGET: &str = "mipsim::interrupt";

/// Timer device state.
#[derive(Debug)]
pub struct Timer {
    /// Base period in ticks.
    ticks: u64,
    /// Xorshift state for randomized intervals; `None` means periodic.
    rng: Mutex<Option<u64>>,
}

impl Timer {
    /// Creates a timer and schedules its first interrupt.
    ///
    /// # Arguments
    ///
    /// * `sim`    - Simulator whose timeline the timer drives.
    /// * `config` - Period and optional random seed.
    pub fn start(sim: &Simulator, config: TimerConfig) -> Arc<Self> {
        let timer = Arc::new(Self {
            ticks: config.ticks.max(1),
            // Xorshift never leaves the all-zero state.
            rng: Mutex::new(config.random_seed.map(|seed| seed.max(1))),
        });
        Self::arm(&timer, sim);
        timer
    }

    /// Delay until the next interrupt: the period, or `1..=2 * period` when randomized.
    pub fn next_interval(&self) -> u64 {
        let mut rng = lock(&self.rng);
        match rng.as_mut() {
            Some(state) => {
                let mut x = *state;
                x ^= x << 13;
                x ^= x >> 7;
                x ^= x << 17;
                *state = x;
                1 + x % (self.ticks * 2)
            }
            None => self.ticks,
        }
    }

    fn arm(timer: &Arc<Self>, sim: &Simulator) {
        let delay = timer.next_interval();
        let this = Arc::clone(timer);
        let _ = sim.schedule(InterruptKind::Timer, delay, move |sim| {
            Self::expired(&this, sim);
        });
    }

    fn expired(timer: &Arc<Self>, sim: &Simulator) {
        Self::arm(timer, sim);
        trace!(target: TARGET, "timer expired");
        if sim.interrupted_status() != MachineStatus::Idle {
            sim.yield_on_return();
        }
    }
}
