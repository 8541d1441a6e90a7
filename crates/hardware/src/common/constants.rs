//! Global Machine Constants.
//!
//! This module defines machine-wide constants used across the simulator. It includes:
//! 1. **Memory Geometry:** Default page size and physical frame count.
//! 2. **Register Layout:** Indices of the special slots in the 40-entry register file.
//! 3. **Timing:** Default tick increments for user and system execution and the timer period.
//! 4. **Image Format:** NOFF magic and the default user stack reservation.

/// Default page size in bytes. Chosen equal to a disk sector.
pub const PAGE_SIZE: u32 = 128;

/// Default number of physical page frames in main memory.
pub const NUM_PHYS_PAGES: u32 = 1024;

/// Number of general-purpose registers.
pub const NUM_GP_REGS: usize = 32;

/// User stack pointer (`$sp`).
pub const STACK_REG: usize = 29;

/// Return address register written by `JAL`, `BLTZAL` and `BGEZAL` (`$ra`).
pub const RET_ADDR_REG: usize = 31;

/// High word of a multiply result / division remainder.
pub const HI_REG: usize = 32;

/// Low word of a multiply result / division quotient.
pub const LO_REG: usize = 33;

/// Current program counter.
pub const PC_REG: usize = 34;

/// Next program counter; differs from `PC + 4` inside a branch delay slot.
pub const NEXT_PC_REG: usize = 35;

/// Program counter of the previously retired instruction.
pub const PREV_PC_REG: usize = 36;

/// Destination register of the pending delayed load.
pub const LOAD_REG: usize = 37;

/// Value of the pending delayed load.
pub const LOAD_VALUE_REG: usize = 38;

/// Faulting virtual address recorded by the last exception.
pub const BAD_VADDR_REG: usize = 39;

/// Total number of slots in the register file.
pub const NUM_TOTAL_REGS: usize = 40;

/// Register holding the syscall number on a `SYSCALL` trap (`$v0`).
pub const SYSCALL_NUM_REG: usize = 2;

/// First argument register (`$a0`).
pub const ARG0_REG: usize = 4;

/// Ticks charged per instruction executed in user mode.
pub const USER_TICK: u64 = 1;

/// Ticks charged per interrupt-enable while running kernel code.
pub const SYSTEM_TICK: u64 = 10;

/// Default interval between timer interrupts, in ticks.
pub const TIMER_TICKS: u64 = 100;

/// Bytes reserved above the loaded segments for the user stack.
pub const USER_STACK_SIZE: u32 = 1024;

/// Magic number at the start of every NOFF executable image.
pub const NOFF_MAGIC: u32 = 0x00ba_dfad;

/// Parent id recorded for threads that were not forked by another thread.
pub const NO_PARENT: i32 = -66;
