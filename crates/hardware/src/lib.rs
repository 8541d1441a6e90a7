//! MIPS whole-machine simulator library.
//!
//! This crate simulates a small MIPS machine together with the kernel-level
//! plumbing needed to run code on it:
//! 1. **Core:** Register file, ALU and the one-instruction-at-a-time execution engine
//!    with branch delay slots and delayed loads.
//! 2. **Memory:** Flat page-table address translation with use/dirty tracking.
//! 3. **ISA:** Decoding and disassembly of the R3000-style instruction set.
//! 4. **Simulation:** The event timeline, interrupt level, trap path, address spaces
//!    and NOFF loading, all owned by one [`Simulator`] per run.
//! 5. **Threads:** Cooperative round-robin scheduling and semaphores.
//! 6. **Devices:** The timer that drives preemption.

/// Common types and constants (addresses, registers, exceptions, access types).
pub mod common;
/// Simulator configuration (defaults and sectioned config structures).
pub mod config;
/// CPU core (arch state, execution, memory, units).
pub mod core;
/// Peripheral device models.
pub mod devices;
/// Instruction set (decode, instruction fields, ABI names, disassembly).
pub mod isa;
/// Simulator aggregate, event timeline, address spaces and loader.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;
/// Kernel threads, scheduler and semaphores.
pub mod threads;

/// Root configuration type; use `Config::default()` or parse one from JSON.
pub use crate::config::Config;
/// Main CPU type; holds registers, the MMU and main memory.
pub use crate::core::Cpu;
/// Per-run simulator handle; construct with `Simulator::new`.
pub use crate::sim::Simulator;
