//! Event Timeline and Interrupt Dispatch.
//!
//! This module owns simulated time. It implements the following:
//! 1. **Pending Events:** A queue of future interrupt-handler invocations ordered by
//!    fire time, with ties broken by submission order.
//! 2. **Ticking:** Advancing the clock once per user instruction or interrupt
//!    re-enable, then firing every handler that has come due.
//! 3. **Idling:** Skipping straight to the next pending event when nothing is
//!    runnable, or halting the machine when there is none.
//! 4. **Interrupt Level:** The enable flag kernel code masks around critical
//!    sections; re-enabling interrupts costs one tick.
//! 5. **Deferred Yield:** Handlers cannot switch contexts themselves, so they ask for
//!    a yield that is carried out once the handler has returned.

use std::collections::BTreeMap;
use std::fmt;
use std::mem;

use tracing::{debug, trace};

use crate::common::lock;
use crate::core::arch::level::IntStatus;
use crate::core::arch::mode::MachineStatus;
use crate::stats::SimulatedClock;

use super::simulator::Simulator;

/// Tracing target for interrupt and tick events.
const TARGET: &str = "mipsim::interrupt";

/// The device category that raised an interrupt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InterruptKind {
    /// Periodic hardware timer.
    Timer,
    /// Disk request completion.
    Disk,
    /// Console finished writing a character.
    ConsoleWrite,
    /// Console has a character available.
    ConsoleRead,
    /// Network finished sending a packet.
    NetworkSend,
    /// Network received a packet.
    NetworkRecv,
}

impl InterruptKind {
    /// Returns the name used in traces and state dumps.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Timer => "timer",
            Self::Disk => "disk",
            Self::ConsoleWrite => "console write",
            Self::ConsoleRead => "console read",
            Self::NetworkSend => "network send",
            Self::NetworkRecv => "network recv",
        }
    }
}

impl fmt::Display for InterruptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An interrupt handler with its argument already captured.
pub type Handler = Box<dyn FnOnce(&Simulator) + Send>;

/// A scheduled future interrupt.
pub struct PendingEvent {
    /// Device that raised it.
    pub kind: InterruptKind,
    /// Absolute tick at which it fires.
    pub when: u64,
    /// Work to do when it fires.
    pub handler: Handler,
}

impl fmt::Debug for PendingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingEvent")
            .field("kind", &self.kind)
            .field("when", &self.when)
            .finish_non_exhaustive()
    }
}

/// Simulated clock, pending events and interrupt state.
///
/// Events are keyed by `(when, seq)`, where `seq` increases with every
/// submission, so iteration order is fire time first and FIFO among equals.
#[derive(Debug, Default)]
pub struct Timeline {
    clock: SimulatedClock,
    pending: BTreeMap<(u64, u64), PendingEvent>,
    next_seq: u64,
    level: IntStatus,
    status: MachineStatus,
    /// Status the running handler interrupted.
    interrupted: MachineStatus,
    in_handler: bool,
    yield_on_return: bool,
}

impl Timeline {
    /// Creates a timeline at tick 0 with interrupts masked and the machine in
    /// system mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time.
    pub const fn clock(&self) -> SimulatedClock {
        self.clock
    }

    /// Current interrupt level.
    pub const fn level(&self) -> IntStatus {
        self.level
    }

    /// Current machine status.
    pub const fn status(&self) -> MachineStatus {
        self.status
    }

    /// Whether an interrupt handler is executing.
    pub const fn in_handler(&self) -> bool {
        self.in_handler
    }

    /// Number of events waiting to fire.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// `(kind, when)` of every pending event in firing order.
    pub fn pending(&self) -> Vec<(InterruptKind, u64)> {
        self.pending.values().map(|e| (e.kind, e.when)).collect()
    }

    /// Queues `handler` to fire `delay` ticks from now.
    ///
    /// # Returns
    ///
    /// The absolute fire time.
    ///
    /// # Panics
    ///
    /// Panics if `delay` is zero; an event must lie strictly in the future.
    pub fn schedule(&mut self, kind: InterruptKind, delay: u64, handler: Handler) -> u64 {
        assert!(delay > 0, "{kind} interrupt scheduled with zero delay");
        let when = self.clock.total + delay;
        let seq = self.next_seq;
        self.next_seq += 1;
        let _ = self
            .pending
            .insert((when, seq), PendingEvent { kind, when, handler });
        trace!(target: TARGET, "scheduling {kind} interrupt at time = {when}");
        when
    }

    /// Charges one step of simulated time to the current machine status.
    ///
    /// # Arguments
    ///
    /// * `user_tick`   - Increment while in user mode.
    /// * `system_tick` - Increment otherwise.
    pub const fn advance(&mut self, user_tick: u64, system_tick: u64) {
        let ticks = match self.status {
            MachineStatus::User => user_tick,
            MachineStatus::System | MachineStatus::Idle => system_tick,
        };
        self.clock.advance(self.status, ticks);
    }

    /// Removes the next event if it may fire now.
    ///
    /// With `advance` set the clock jumps forward to the event's fire time,
    /// counting the gap as idle; otherwise only events whose time has come are
    /// returned. While idling, a timer interrupt that is the only thing left
    /// does not fire, though the clock has still moved up to it: it would keep
    /// rescheduling itself and the machine would never halt.
    ///
    /// # Returns
    ///
    /// The event to fire, or `None` if nothing is due.
    pub fn take_due(&mut self, advance: bool) -> Option<PendingEvent> {
        let (&(when, _), next) = self.pending.first_key_value()?;
        if advance {
            self.clock.skip_to(when);
        } else if when > self.clock.total {
            return None;
        }
        if self.status == MachineStatus::Idle
            && next.kind == InterruptKind::Timer
            && self.pending.len() == 1
        {
            return None;
        }
        self.pending.pop_first().map(|(_, event)| event)
    }

    /// Prints the clock, interrupt level and pending events.
    pub fn dump(&self) {
        println!("Time: {}, interrupts {}", self.clock.total, self.level);
        println!("Pending interrupts:");
        for event in self.pending.values() {
            println!("Interrupt handler {}, scheduled at {}", event.kind, event.when);
        }
        println!("End of pending interrupts");
    }
}

impl Simulator {
    /// Arranges for `handler` to run `delay` ticks from now.
    ///
    /// Called by device models; the handler runs with interrupts masked and
    /// the machine in system mode, borrowing whichever context is running.
    ///
    /// # Panics
    ///
    /// Panics if `delay` is zero.
    pub fn schedule<F>(&self, kind: InterruptKind, delay: u64, handler: F) -> u64
    where
        F: FnOnce(&Self) + Send + 'static,
    {
        lock(&self.shared().timeline).schedule(kind, delay, Box::new(handler))
    }

    /// Advances simulated time by one step and fires every event now due.
    ///
    /// If a handler asked for a yield, the running thread yields after
    /// interrupts are re-enabled, with the machine in system mode for the
    /// duration of the switch.
    pub fn tick(&self) {
        let timing = self.config().timing;
        {
            let mut timeline = lock(&self.shared().timeline);
            timeline.advance(timing.user_tick, timing.system_tick);
            trace!(target: TARGET, "== Tick {} ==", timeline.clock.total);
            timeline.level = IntStatus::Off;
        }

        while self.fire_next_due(false) {}

        let resume_status = {
            let mut timeline = lock(&self.shared().timeline);
            timeline.level = IntStatus::On;
            if mem::take(&mut timeline.yield_on_return) {
                Some(mem::replace(&mut timeline.status, MachineStatus::System))
            } else {
                None
            }
        };
        if let Some(old) = resume_status {
            self.yield_cpu();
            self.set_status(old);
        }
    }

    /// Fires the next pending event if it is due.
    ///
    /// # Returns
    ///
    /// `true` if a handler ran.
    fn fire_next_due(&self, advance: bool) -> bool {
        let (event, old_status) = {
            let mut timeline = lock(&self.shared().timeline);
            assert_eq!(
                timeline.level,
                IntStatus::Off,
                "interrupts must be masked while handlers fire"
            );
            let Some(event) = timeline.take_due(advance) else {
                return false;
            };
            timeline.in_handler = true;
            let old = mem::replace(&mut timeline.status, MachineStatus::System);
            timeline.interrupted = old;
            (event, old)
        };

        lock(&self.shared().cpu).delayed_load(0, 0);
        trace!(
            target: TARGET,
            "invoking {} interrupt handler scheduled at {}",
            event.kind,
            event.when
        );
        (event.handler)(self);

        let mut timeline = lock(&self.shared().timeline);
        timeline.status = old_status;
        timeline.in_handler = false;
        true
    }

    /// Waits for the next interrupt when no thread is ready.
    ///
    /// Jumps the clock to the next pending event and fires everything due. If
    /// nothing is pending the machine halts and this never returns.
    pub fn idle(&self) {
        debug!(target: TARGET, "machine idling; checking for interrupts");
        self.set_status(MachineStatus::Idle);
        if self.fire_next_due(true) {
            while self.fire_next_due(false) {}
            let mut timeline = lock(&self.shared().timeline);
            timeline.yield_on_return = false;
            timeline.status = MachineStatus::System;
            return;
        }

        debug!(target: TARGET, "machine idle, no interrupts to do");
        println!("No threads ready or runnable, and no pending interrupts.");
        println!("Assuming the program completed.");
        self.halt()
    }

    /// Changes the interrupt level, returning the previous one.
    ///
    /// Enabling interrupts that were masked advances time by one tick.
    ///
    /// # Panics
    ///
    /// Panics if an interrupt handler tries to enable interrupts.
    pub fn set_level(&self, level: IntStatus) -> IntStatus {
        let old = {
            let mut timeline = lock(&self.shared().timeline);
            assert!(
                level == IntStatus::Off || !timeline.in_handler,
                "interrupt handlers must not enable interrupts"
            );
            mem::replace(&mut timeline.level, level)
        };
        trace!(target: TARGET, "interrupts: {old} -> {level}");
        if level == IntStatus::On && old == IntStatus::Off {
            self.tick();
        }
        old
    }

    /// Current interrupt level.
    pub fn level(&self) -> IntStatus {
        lock(&self.shared().timeline).level
    }

    /// Current machine status.
    pub fn status(&self) -> MachineStatus {
        lock(&self.shared().timeline).status
    }

    /// Sets the machine status.
    pub fn set_status(&self, status: MachineStatus) {
        lock(&self.shared().timeline).status = status;
    }

    /// The status the machine was in when the running handler fired.
    ///
    /// Handlers themselves always run in system mode; this is how one tells
    /// an interrupted idle loop from interrupted thread or user code.
    pub fn interrupted_status(&self) -> MachineStatus {
        lock(&self.shared().timeline).interrupted
    }

    /// Requests a context switch once the running handler returns.
    ///
    /// # Panics
    ///
    /// Panics outside an interrupt handler.
    pub fn yield_on_return(&self) {
        let mut timeline = lock(&self.shared().timeline);
        assert!(timeline.in_handler, "yield_on_return outside an interrupt handler");
        timeline.yield_on_return = true;
    }

    /// `(kind, when)` of every pending event in firing order.
    pub fn pending_interrupts(&self) -> Vec<(InterruptKind, u64)> {
        lock(&self.shared().timeline).pending()
    }
}
