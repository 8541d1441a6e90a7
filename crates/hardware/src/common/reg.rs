//! Machine Register File.
//!
//! This module provides the `RegisterFile` struct holding all 40 architectural slots
//! of the machine. It provides:
//! 1. **Unified Storage:** The 32 general-purpose registers followed by HI, LO, PC,
//!    NextPC, PrevPC, the delayed-load pair and the bad-vaddr register.
//! 2. **Zero Register:** Writes to register 0 are discarded, so it always reads as 0.
//! 3. **Context Switching:** Whole-file snapshots for saving and restoring user state.
//! 4. **Observability:** Formatting utilities for dumping register state.

use std::fmt;

use super::constants::{
    BAD_VADDR_REG, HI_REG, LO_REG, LOAD_REG, LOAD_VALUE_REG, NEXT_PC_REG, NUM_GP_REGS,
    NUM_TOTAL_REGS, PC_REG, PREV_PC_REG,
};

/// Snapshot of every register slot, as saved in a thread's user state.
pub type RegisterSnapshot = [u32; NUM_TOTAL_REGS];

/// The machine's register file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterFile {
    regs: RegisterSnapshot,
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile {
    /// Creates a new register file with all slots set to zero.
    pub const fn new() -> Self {
        Self {
            regs: [0; NUM_TOTAL_REGS],
        }
    }

    /// Reads a register slot.
    ///
    /// # Arguments
    ///
    /// * `idx` - Slot index (0-39). Register 0 always returns 0.
    ///
    /// # Returns
    ///
    /// The 32-bit value stored in the slot.
    #[inline(always)]
    pub const fn read(&self, idx: usize) -> u32 {
        self.regs[idx]
    }

    /// Writes a register slot.
    ///
    /// # Arguments
    ///
    /// * `idx` - Slot index (0-39). Writes to register 0 are ignored.
    /// * `val` - The 32-bit value to write.
    #[inline(always)]
    pub const fn write(&mut self, idx: usize, val: u32) {
        if idx != 0 {
            self.regs[idx] = val;
        }
    }

    /// Re-pins register 0 to zero.
    #[inline(always)]
    pub const fn pin_zero(&mut self) {
        self.regs[0] = 0;
    }

    /// Current program counter.
    #[inline(always)]
    pub const fn pc(&self) -> u32 {
        self.regs[PC_REG]
    }

    /// Next program counter.
    #[inline(always)]
    pub const fn next_pc(&self) -> u32 {
        self.regs[NEXT_PC_REG]
    }

    /// Copies out every slot.
    pub const fn snapshot(&self) -> RegisterSnapshot {
        self.regs
    }

    /// Overwrites every slot from a snapshot, keeping register 0 pinned.
    pub const fn restore(&mut self, snapshot: &RegisterSnapshot) {
        self.regs = *snapshot;
        self.pin_zero();
    }

    /// Dumps the contents of every register to stdout.
    pub fn dump(&self) {
        print!("{self}");
    }
}

impl fmt::Display for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Machine registers:")?;
        for row in (0..NUM_GP_REGS).step_by(4) {
            for i in row..row + 4 {
                write!(f, "\t{:>2}:\t{:#010x}", i, self.regs[i])?;
            }
            writeln!(f)?;
        }
        writeln!(
            f,
            "\tHi:\t{:#010x}\tLo:\t{:#010x}",
            self.regs[HI_REG], self.regs[LO_REG]
        )?;
        writeln!(
            f,
            "\tPC:\t{:#010x}\tNextPC:\t{:#010x}\tPrevPC:\t{:#010x}",
            self.regs[PC_REG], self.regs[NEXT_PC_REG], self.regs[PREV_PC_REG]
        )?;
        writeln!(
            f,
            "\tLoad:\t{:#010x}\tLoadV:\t{:#010x}\tBadVA:\t{:#010x}",
            self.regs[LOAD_REG], self.regs[LOAD_VALUE_REG], self.regs[BAD_VADDR_REG]
        )
    }
}
