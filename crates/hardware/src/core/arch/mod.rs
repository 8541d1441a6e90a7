//! Machine architectural state that is not part of the register file.
//!
//! This module contains the small pieces of machine state shared between the CPU,
//! the event timeline and the scheduler. It includes the following modules:
//! 1. **Modes:** What the machine is doing (idle, kernel code, user code).
//! 2. **Interrupt Level:** Whether interrupts are currently enabled.

/// Interrupt enable level.
pub mod level;

/// Machine execution status.
pub mod mode;
