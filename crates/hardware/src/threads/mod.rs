//! Kernel threads and synchronization.
//!
//! This module provides the cooperative thread system that runs on top of the
//! simulated machine. It includes:
//! 1. **Threads:** Execution contexts with identity, lifecycle status and saved user state.
//! 2. **Scheduler:** FIFO ready queue, fork/yield/sleep/finish and the context switch.
//! 3. **Baton:** The single permit that lets exactly one host thread execute.
//! 4. **Semaphores:** Blocking and waking built on interrupt masking.

/// Single-permit hand-off between host threads.
pub mod baton;

/// Ready queue and context switching.
pub mod scheduler;

/// Counting semaphores.
pub mod synch;

/// Thread records.
pub mod thread;

pub use self::synch::Semaphore;
pub use self::thread::{Pid, Thread, ThreadStatus};
