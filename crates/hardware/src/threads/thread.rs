//! Execution contexts.
//!
//! A [`Thread`] is the kernel's record of one simulated thread: its identity,
//! lifecycle state, and, for user processes, the saved user registers and the
//! address space it runs in. The host thread that actually executes it is
//! owned by the scheduler.

use std::fmt;
use std::sync::Mutex;

use crate::common::constants::NUM_TOTAL_REGS;
use crate::common::lock;
use crate::common::reg::RegisterSnapshot;
use crate::core::Cpu;
use crate::sim::addrspace::AddressSpace;

/// Simulated process identifier.
pub type Pid = u32;

/// Lifecycle state of a thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThreadStatus {
    /// Allocated but not yet runnable.
    Created,
    /// On the ready queue.
    Ready,
    /// Holding the CPU.
    Running,
    /// Waiting for an external wake-up.
    Blocked,
    /// Finished; waiting to be reclaimed by another thread.
    Terminated,
}

impl fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "JUST_CREATED",
            Self::Ready => "READY",
            Self::Running => "RUNNING",
            Self::Blocked => "BLOCKED",
            Self::Terminated => "TERMINATED",
        })
    }
}

#[derive(Debug)]
struct ThreadState {
    status: ThreadStatus,
    user_registers: RegisterSnapshot,
    space: Option<Box<dyn AddressSpace>>,
}

/// A simulated thread.
#[derive(Debug)]
pub struct Thread {
    name: String,
    pid: Pid,
    ppid: Option<Pid>,
    state: Mutex<ThreadState>,
}

impl Thread {
    pub(crate) fn new(name: &str, pid: Pid, ppid: Option<Pid>) -> Self {
        Self {
            name: name.to_owned(),
            pid,
            ppid,
            state: Mutex::new(ThreadState {
                status: ThreadStatus::Created,
                user_registers: [0; NUM_TOTAL_REGS],
                space: None,
            }),
        }
    }

    /// Debugging name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Process identifier; the main thread is 0.
    pub const fn pid(&self) -> Pid {
        self.pid
    }

    /// Identifier of the thread that forked this one, if any.
    pub const fn ppid(&self) -> Option<Pid> {
        self.ppid
    }

    /// Current lifecycle state.
    pub fn status(&self) -> ThreadStatus {
        lock(&self.state).status
    }

    pub(crate) fn set_status(&self, status: ThreadStatus) {
        lock(&self.state).status = status;
    }

    /// Whether this thread runs a user program.
    pub fn has_space(&self) -> bool {
        lock(&self.state).space.is_some()
    }

    /// User registers saved at the last switch-out.
    pub fn user_registers(&self) -> RegisterSnapshot {
        lock(&self.state).user_registers
    }

    /// Attaches `space` and makes it the active address space.
    pub(crate) fn install_space(&self, mut space: Box<dyn AddressSpace>, cpu: &mut Cpu) {
        space.restore_on_switch(cpu);
        lock(&self.state).space = Some(space);
    }

    /// Saves the user registers and lets the address space persist its state.
    ///
    /// Does nothing for kernel-only threads.
    pub(crate) fn save_user_state(&self, cpu: &mut Cpu) {
        let mut guard = lock(&self.state);
        let state = &mut *guard;
        if let Some(space) = state.space.as_mut() {
            state.user_registers = cpu.regs.snapshot();
            space.save_on_switch(cpu);
        }
    }

    /// Restores the user registers and reinstalls the address space.
    ///
    /// Does nothing for kernel-only threads.
    pub(crate) fn restore_user_state(&self, cpu: &mut Cpu) {
        let mut guard = lock(&self.state);
        let state = &mut *guard;
        if let Some(space) = state.space.as_mut() {
            cpu.regs.restore(&state.user_registers);
            space.restore_on_switch(cpu);
        }
    }
}

impl fmt::Display for Thread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (pid {}, {})", self.name, self.pid, self.status())
    }
}
