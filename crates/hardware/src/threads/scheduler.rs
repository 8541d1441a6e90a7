//! Thread scheduler and context switching.
//!
//! This module implements cooperative round-robin scheduling. It provides:
//! 1. **Ready Queue:** Strict FIFO of runnable threads, touched only with interrupts masked.
//! 2. **Thread Lifecycle:** Fork, yield, sleep and finish, following
//!    Created → Ready → Running → {Ready, Blocked, Terminated}.
//! 3. **Context Switch:** Saving and restoring user state around a hand-off of the
//!    baton between host threads.
//! 4. **Deferred Destruction:** A finishing thread cannot reclaim itself; the next
//!    thread to resume does it.
//!
//! Preemption is not decided here: the timer device requests a yield through
//! the interrupt path and the timeline carries it out.

use std::cell::Cell;
use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::common::{SimError, lock};
use crate::core::arch::level::IntStatus;
use crate::sim::simulator::Simulator;

use super::baton::Resumption;
use super::thread::{Pid, Thread, ThreadStatus};

/// Tracing target for scheduling events.
const TARGET: &str = "mipsim::threads";

/// Host stack size for simulated threads.
const HOST_STACK_SIZE: usize = 256 * 1024;

thread_local! {
    /// Pid of the simulated thread hosted by this host thread.
    static CONTEXT: Cell<Option<Pid>> = const { Cell::new(None) };
}

/// Scheduler bookkeeping.
#[derive(Debug, Default)]
pub struct Scheduler {
    ready: VecDeque<Arc<Thread>>,
    current: Option<Arc<Thread>>,
    to_be_destroyed: Option<Arc<Thread>>,
    next_pid: Pid,
}

impl Scheduler {
    /// Creates a scheduler with no threads.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn pop_ready(&mut self) -> Option<Arc<Thread>> {
        self.ready.pop_front()
    }

    pub(crate) fn set_current(&mut self, thread: Arc<Thread>) {
        self.current = Some(thread);
    }

    fn allocate_pid(&mut self) -> Pid {
        let pid = self.next_pid;
        self.next_pid += 1;
        pid
    }

    /// Names of the ready threads, front first.
    pub fn ready_names(&self) -> Vec<String> {
        self.ready.iter().map(|t| t.name().to_owned()).collect()
    }

    /// Prints the ready queue.
    pub fn print_ready(&self) {
        println!("Ready list contents:");
        for thread in &self.ready {
            println!("\t{thread}");
        }
    }
}

/// Poisons the run if the hosted thread unwinds.
struct PanicGuard<'a> {
    sim: &'a Simulator,
    name: &'a str,
}

impl Drop for PanicGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.sim.shared().baton.poison(self.name);
        }
    }
}

fn thread_root<F>(sim: &Simulator, thread: &Thread, entry: F)
where
    F: FnOnce(&Simulator),
{
    let _guard = PanicGuard {
        sim,
        name: thread.name(),
    };
    CONTEXT.with(|c| c.set(Some(thread.pid())));

    if sim.shared().baton.wait_turn(thread.pid()) == Resumption::Reaped {
        return;
    }
    sim.resume_current();
    let _ = sim.set_level(IntStatus::On);
    entry(sim);
    let _ = sim.finish_current();
}

impl Simulator {
    /// Creates a thread running `entry` and puts it on the ready queue.
    ///
    /// The thread starts with interrupts enabled the first time it is
    /// scheduled, and finishes when `entry` returns.
    ///
    /// # Errors
    ///
    /// [`SimError::Spawn`] if the host cannot create a thread to back it.
    pub fn fork<F>(&self, name: &str, entry: F) -> Result<Arc<Thread>, SimError>
    where
        F: FnOnce(&Self) + Send + 'static,
    {
        let ppid = CONTEXT.with(Cell::get);
        let pid = lock(&self.shared().scheduler).allocate_pid();
        let thread = Arc::new(Thread::new(name, pid, ppid));

        let sim = self.clone();
        let hosted = Arc::clone(&thread);
        let _detached = std::thread::Builder::new()
            .name(format!("{name}-{pid}"))
            .stack_size(HOST_STACK_SIZE)
            .spawn(move || thread_root(&sim, &hosted, entry))
            .map_err(|source| SimError::Spawn {
                name: name.to_owned(),
                source,
            })?;
        debug!(target: TARGET, "forking thread {name} (pid {pid})");

        let old = self.set_level(IntStatus::Off);
        self.ready_to_run(Arc::clone(&thread));
        let _ = self.set_level(old);
        Ok(thread)
    }

    /// The thread holding the CPU.
    ///
    /// # Panics
    ///
    /// Panics before the machine has booted.
    pub fn current_thread(&self) -> Arc<Thread> {
        let scheduler = lock(&self.shared().scheduler);
        let Some(current) = scheduler.current.clone() else {
            panic!("no thread is running");
        };
        current
    }

    /// Names of the ready threads, front first.
    pub fn ready_threads(&self) -> Vec<String> {
        lock(&self.shared().scheduler).ready_names()
    }

    /// Marks `thread` ready and appends it to the ready queue.
    ///
    /// # Panics
    ///
    /// Panics if interrupts are enabled.
    pub fn ready_to_run(&self, thread: Arc<Thread>) {
        assert_eq!(
            self.level(),
            IntStatus::Off,
            "ready queue touched with interrupts enabled"
        );
        trace!(target: TARGET, "putting thread {} on ready list", thread.name());
        thread.set_status(ThreadStatus::Ready);
        lock(&self.shared().scheduler).ready.push_back(thread);
    }

    /// Gives up the CPU if another thread is ready.
    ///
    /// The caller goes to the back of the ready queue. Returns immediately
    /// if the queue is empty.
    pub fn yield_cpu(&self) {
        let old = self.set_level(IntStatus::Off);
        let current = self.current_thread();
        debug!(target: TARGET, "yielding thread {}", current.name());

        let next = lock(&self.shared().scheduler).pop_ready();
        if let Some(next) = next {
            self.ready_to_run(current);
            let _ = self.switch_to(next);
        } else {
            drop(current);
        }
        let _ = self.set_level(old);
    }

    /// Blocks the current thread until something puts it back on the ready
    /// queue.
    ///
    /// Idles the machine while no thread is ready.
    ///
    /// # Panics
    ///
    /// Panics if interrupts are enabled.
    pub fn sleep(&self) {
        let current = self.current_thread();
        debug!(target: TARGET, "sleeping thread {}", current.name());
        current.set_status(ThreadStatus::Blocked);
        drop(current);
        let _ = self.dispatch_next();
    }

    /// Ends the current thread. Never returns.
    ///
    /// The thread is reclaimed by whichever thread runs next.
    pub fn finish(&self) -> ! {
        if self.finish_current() == Resumption::Reaped {
            debug!(target: TARGET, "finished thread parked after reclaim");
        }
        loop {
            std::thread::park();
        }
    }

    pub(crate) fn finish_current(&self) -> Resumption {
        let _ = self.set_level(IntStatus::Off);
        let current = self.current_thread();
        debug!(target: TARGET, "finishing thread {}", current.name());
        current.set_status(ThreadStatus::Terminated);
        {
            let mut scheduler = lock(&self.shared().scheduler);
            assert!(
                scheduler.to_be_destroyed.is_none(),
                "a finished thread is still waiting to be reclaimed"
            );
            scheduler.to_be_destroyed = Some(current);
        }
        self.dispatch_next()
    }

    /// Switches to the next ready thread, idling until there is one.
    fn dispatch_next(&self) -> Resumption {
        assert_eq!(
            self.level(),
            IntStatus::Off,
            "sleeping with interrupts enabled"
        );
        loop {
            let next = lock(&self.shared().scheduler).pop_ready();
            match next {
                Some(next) => return self.switch_to(next),
                None => self.idle(),
            }
        }
    }

    /// Hands the CPU to `next`.
    ///
    /// Saves the outgoing thread's user state, passes the baton and, once the
    /// caller is scheduled again, reclaims any finished thread and restores
    /// the caller's user state.
    ///
    /// # Panics
    ///
    /// Panics if the calling host thread is not the current thread.
    fn switch_to(&self, next: Arc<Thread>) -> Resumption {
        let old = self.current_thread();
        let me = CONTEXT.with(Cell::get);
        assert_eq!(
            me,
            Some(old.pid()),
            "context switch from a thread that is not current"
        );

        old.save_user_state(&mut lock(&self.shared().cpu));
        debug!(
            target: TARGET,
            "switching from thread {} to thread {}",
            old.name(),
            next.name()
        );
        next.set_status(ThreadStatus::Running);
        lock(&self.shared().scheduler).set_current(Arc::clone(&next));

        if Arc::ptr_eq(&old, &next) {
            self.resume_current();
            return Resumption::Scheduled;
        }

        lock(&self.shared().stats).context_switches += 1;
        let (from, to) = (old.pid(), next.pid());
        drop(old);
        drop(next);
        let resumption = self.shared().baton.pass(from, to);
        if resumption == Resumption::Scheduled {
            trace!(target: TARGET, "now in thread {}", self.current_thread().name());
            self.resume_current();
        }
        resumption
    }

    /// Reclaims the finished thread, if any, and reinstalls the current
    /// thread's user state.
    pub(crate) fn resume_current(&self) {
        let (doomed, current) = {
            let mut scheduler = lock(&self.shared().scheduler);
            (scheduler.to_be_destroyed.take(), scheduler.current.clone())
        };
        if let Some(doomed) = doomed {
            debug!(target: TARGET, "deleting thread {}", doomed.name());
            self.shared().baton.reap(doomed.pid());
        }
        if let Some(current) = current {
            current.restore_user_state(&mut lock(&self.shared().cpu));
        }
    }
}
