//! Machine execution status.
//!
//! This module defines what the simulated machine is currently doing. It implements the following:
//! 1. **Status Classification:** Idle (waiting for an interrupt), System (kernel code) and User (user program).
//! 2. **Time Accounting:** The status selects which tick category a step is charged to.
//! 3. **Observability:** Human-readable naming and display formatting for machine states.

/// What the machine is currently executing.
///
/// Interrupt handlers and the trap path force `System` for their duration and
/// restore the previous status on return.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MachineStatus {
    /// Nothing is runnable; the machine is waiting for the next pending event.
    Idle,

    /// Kernel code (threads, interrupt handlers, the trap handler).
    #[default]
    System,

    /// A user program is executing instructions.
    User,
}

impl MachineStatus {
    /// Returns the human-readable name of the status.
    ///
    /// # Returns
    ///
    /// A static string slice containing the status name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::System => "System",
            Self::User => "User",
        }
    }
}

impl std::fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
