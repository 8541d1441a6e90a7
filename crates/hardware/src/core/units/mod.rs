//! Functional units used by the CPU.
//!
//! 1. **ALU:** Integer arithmetic with the two's-complement overflow rule, logic and shifts.
//! 2. **MMU:** Flat page table, address translation and the physical frame allocator.

/// Arithmetic Logic Unit.
pub mod alu;

/// Address translation.
pub mod mmu;
