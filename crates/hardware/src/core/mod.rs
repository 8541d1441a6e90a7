//! Software CPU.
//!
//! This module contains the MIPS interpreter: the CPU state and its fetch/decode/execute
//! step, the architectural status shared with the kernel, and the functional units
//! (integer ALU and the page-table translator) the step is built from.

/// Machine status and interrupt level.
pub mod arch;

/// CPU state, instruction execution and memory access.
pub mod cpu;

/// Functional units (ALU, address translator).
pub mod units;

pub use self::cpu::Cpu;
