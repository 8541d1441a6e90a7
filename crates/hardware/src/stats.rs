//! Simulation statistics collection and reporting.
//!
//! This module tracks the counters a run accumulates. It provides:
//! 1. **Clock:** Total simulated ticks and their idle/system/user breakdown.
//! 2. **Devices:** Disk, console and network traffic recorded by device models.
//! 3. **Machine:** Retired instructions, raised exceptions and page faults.
//! 4. **Scheduler:** Context switches.
//!
//! The clock is owned and advanced exclusively by the event timeline; everything
//! else is bumped by the component that observes the event.

use serde::Serialize;

use crate::core::arch::mode::MachineStatus;

/// Simulated time, split by what the machine was doing while it elapsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SimulatedClock {
    /// Total ticks since boot.
    pub total: u64,
    /// Ticks skipped while idling until the next pending event.
    pub idle: u64,
    /// Ticks charged while running kernel code.
    pub system: u64,
    /// Ticks charged while running user code.
    pub user: u64,
}

impl SimulatedClock {
    /// Charges `ticks` to the category for `status`.
    ///
    /// Idle status is charged as system time; idle ticks only accrue through
    /// [`SimulatedClock::skip_to`].
    #[inline]
    pub const fn advance(&mut self, status: MachineStatus, ticks: u64) {
        self.total += ticks;
        match status {
            MachineStatus::User => self.user += ticks,
            MachineStatus::System | MachineStatus::Idle => self.system += ticks,
        }
    }

    /// Jumps forward to `when`, counting the gap as idle time.
    ///
    /// Does nothing if `when` is not in the future.
    #[inline]
    pub const fn skip_to(&mut self, when: u64) {
        if when > self.total {
            self.idle += when - self.total;
            self.total = when;
        }
    }
}

/// Simulation statistics tracking every counter of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SimStats {
    /// Simulated time.
    pub ticks: SimulatedClock,
    /// Instructions retired by the CPU.
    pub instructions_retired: u64,
    /// Exceptions raised into the trap handler.
    pub exceptions_raised: u64,
    /// Page faults observed by the translator.
    pub page_faults: u64,
    /// Context switches performed by the scheduler.
    pub context_switches: u64,
    /// Sectors read from disk.
    pub disk_reads: u64,
    /// Sectors written to disk.
    pub disk_writes: u64,
    /// Characters read from the console.
    pub console_chars_read: u64,
    /// Characters written to the console.
    pub console_chars_written: u64,
    /// Packets sent over the network.
    pub packets_sent: u64,
    /// Packets received from the network.
    pub packets_received: u64,
}

impl SimStats {
    /// Formats the classic end-of-run report.
    pub fn report(&self) -> String {
        format!(
            "Ticks: total {}, idle {}, system {}, user {}\n\
             Disk I/O: reads {}, writes {}\n\
             Console I/O: reads {}, writes {}\n\
             Paging: faults {}\n\
             Network I/O: packets received {}, sent {}\n",
            self.ticks.total,
            self.ticks.idle,
            self.ticks.system,
            self.ticks.user,
            self.disk_reads,
            self.disk_writes,
            self.console_chars_read,
            self.console_chars_written,
            self.page_faults,
            self.packets_received,
            self.packets_sent,
        )
    }

    /// Prints the classic report followed by the machine/scheduler breakdown.
    pub fn print(&self) {
        print!("{}", self.report());
        println!("----------------------------------------------------------");
        println!("sim_insts                {}", self.instructions_retired);
        println!("sim_exceptions           {}", self.exceptions_raised);
        println!("sched_switches           {}", self.context_switches);
    }
}
