//! Counting semaphore.
//!
//! The only synchronization primitive of the kernel. Atomicity comes from
//! masking interrupts: only one simulated thread runs at a time, so nothing
//! else can intervene between testing the count and acting on it.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::common::lock;
use crate::core::arch::level::IntStatus;
use crate::sim::simulator::Simulator;

use super::thread::Thread;

/// Tracing target for synchronization events.
const TARGET: &str = "mipsim::sync";

#[derive(Debug)]
struct SemaphoreState {
    value: u32,
    queue: VecDeque<Arc<Thread>>,
}

/// A counting semaphore with a FIFO wait queue.
#[derive(Debug)]
pub struct Semaphore {
    name: String,
    sim: Simulator,
    state: Mutex<SemaphoreState>,
}

impl Semaphore {
    /// Creates a semaphore with an initial count.
    ///
    /// # Arguments
    ///
    /// * `sim`     - Simulator whose threads will use it.
    /// * `name`    - Debugging name.
    /// * `initial` - Initial count.
    pub fn new(sim: &Simulator, name: &str, initial: u32) -> Self {
        Self {
            name: name.to_owned(),
            sim: sim.clone(),
            state: Mutex::new(SemaphoreState {
                value: initial,
                queue: VecDeque::new(),
            }),
        }
    }

    /// Debugging name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current count.
    pub fn value(&self) -> u32 {
        lock(&self.state).value
    }

    /// Number of blocked waiters.
    pub fn waiters(&self) -> usize {
        lock(&self.state).queue.len()
    }

    /// Waits until the count is positive, then decrements it.
    pub fn p(&self) {
        let old = self.sim.set_level(IntStatus::Off);
        loop {
            let mut state = lock(&self.state);
            if state.value > 0 {
                state.value -= 1;
                break;
            }
            let current = self.sim.current_thread();
            trace!(target: TARGET, "{}: {} waits", self.name, current.name());
            state.queue.push_back(current);
            drop(state);
            self.sim.sleep();
        }
        let _ = self.sim.set_level(old);
    }

    /// Increments the count, waking the longest waiter if there is one.
    pub fn v(&self) {
        let old = self.sim.set_level(IntStatus::Off);
        let waiter = {
            let mut state = lock(&self.state);
            state.value += 1;
            state.queue.pop_front()
        };
        if let Some(thread) = waiter {
            trace!(target: TARGET, "{}: waking {}", self.name, thread.name());
            self.sim.ready_to_run(thread);
        }
        let _ = self.sim.set_level(old);
    }
}
