//! Single-permit baton gating the host threads that back simulated threads.
//!
//! Every simulated thread runs on its own host thread, but only the one
//! holding the baton may execute. Passing the baton wakes exactly one waiter;
//! everyone else keeps waiting on the condition variable. The baton also
//! carries the end of the run back to the host thread that started it.

use std::collections::HashSet;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::stats::SimStats;

use super::thread::Pid;

/// Tracing target for baton hand-offs.
const TARGET: &str = "mipsim::threads";

/// How a run ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The machine halted with these final counters.
    Halted(SimStats),
    /// The named simulated thread panicked.
    Panicked(String),
}

/// Why a waiting thread woke up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resumption {
    /// The scheduler handed this thread the CPU.
    Scheduled,
    /// This thread finished and has been reclaimed; its host thread should exit.
    Reaped,
}

#[derive(Debug, Default)]
struct BatonState {
    running: Option<Pid>,
    reaped: HashSet<Pid>,
    outcome: Option<Outcome>,
}

/// The permit itself.
#[derive(Debug, Default)]
pub struct Baton {
    state: Mutex<BatonState>,
    turn: Condvar,
}

impl Baton {
    /// Creates a baton nobody holds.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, BatonState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, BatonState>) -> MutexGuard<'a, BatonState> {
        self.turn.wait(guard).unwrap_or_else(PoisonError::into_inner)
    }

    /// Gives the baton to the first thread of a run.
    ///
    /// # Panics
    ///
    /// Panics if the run has already started.
    pub fn start(&self, pid: Pid) {
        let mut state = self.state();
        assert!(
            state.running.is_none() && state.outcome.is_none(),
            "simulator already started"
        );
        state.running = Some(pid);
        self.turn.notify_all();
    }

    /// Blocks until `pid` holds the baton or has been reaped.
    pub fn wait_turn(&self, pid: Pid) -> Resumption {
        let mut state = self.state();
        loop {
            if state.reaped.remove(&pid) {
                return Resumption::Reaped;
            }
            if state.running == Some(pid) {
                return Resumption::Scheduled;
            }
            state = self.wait(state);
        }
    }

    /// Hands the baton from `from` to `to` and waits for it to come back.
    pub fn pass(&self, from: Pid, to: Pid) -> Resumption {
        {
            let mut state = self.state();
            debug_assert_eq!(state.running, Some(from), "passing a baton not held");
            state.running = Some(to);
            trace!(target: TARGET, "baton {from} -> {to}");
            self.turn.notify_all();
        }
        self.wait_turn(from)
    }

    /// Releases the host thread of a finished simulated thread.
    pub fn reap(&self, pid: Pid) {
        let mut state = self.state();
        let _ = state.reaped.insert(pid);
        self.turn.notify_all();
    }

    /// Ends the run with `stats` and blocks the caller forever.
    pub fn halt(&self, stats: SimStats) -> ! {
        let mut state = self.state();
        state.running = None;
        state.outcome = Some(Outcome::Halted(stats));
        self.turn.notify_all();
        loop {
            state = self.wait(state);
        }
    }

    /// Ends the run because the named thread panicked.
    ///
    /// A halt that already happened takes precedence.
    pub fn poison(&self, name: &str) {
        let mut state = self.state();
        state.running = None;
        if state.outcome.is_none() {
            state.outcome = Some(Outcome::Panicked(name.to_owned()));
        }
        self.turn.notify_all();
    }

    /// Blocks until the run ends.
    pub fn wait_outcome(&self) -> Outcome {
        let mut state = self.state();
        loop {
            if let Some(outcome) = state.outcome.clone() {
                return outcome;
            }
            state = self.wait(state);
        }
    }
}
