//! Whole-machine simulation.
//!
//! This module ties the CPU to the rest of the machine. It provides:
//! 1. **Simulator:** The per-run aggregate that owns the CPU, timeline, scheduler and
//!    statistics, and drives user execution one instruction at a time.
//! 2. **Interrupts:** The event timeline, simulated clock and interrupt level.
//! 3. **Address Spaces:** Per-process page tables installed on context switch.
//! 4. **Loader:** Parsing of NOFF executables.

/// Per-process address spaces.
pub mod addrspace;

/// Event timeline and interrupt dispatch.
pub mod interrupt;

/// NOFF executable loading.
pub mod loader;

/// The simulator aggregate.
pub mod simulator;

pub use self::addrspace::{AddressSpace, ProcessAddressSpace};
pub use self::interrupt::{InterruptKind, Timeline};
pub use self::simulator::{Simulator, TrapHandler};
