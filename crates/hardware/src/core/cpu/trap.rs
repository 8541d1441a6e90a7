//! Exception entry.
//!
//! The CPU half of raising an exception: the simulator calls
//! [`Cpu::enter_exception`] before it hands control to the kernel trap handler.
//! The handler, not the CPU, decides whether and how to move the PC on.

use super::Cpu;
use crate::common::Fault;
use crate::common::constants::{BAD_VADDR_REG, NEXT_PC_REG, PC_REG, PREV_PC_REG};

impl Cpu {
    /// Prepares the register file for the trap handler.
    ///
    /// Commits any outstanding delayed load (staging nothing in its place) and
    /// records the faulting address in the bad-vaddr register.
    pub fn enter_exception(&mut self, fault: Fault) {
        self.delayed_load(0, 0);
        self.regs.write(BAD_VADDR_REG, fault.bad_vaddr.val());
    }

    /// Moves past the instruction that trapped.
    ///
    /// Used by syscall handlers before returning to the user program:
    /// PrevPC takes PC, PC takes NextPC, and NextPC advances by one word.
    pub const fn advance_pc(&mut self) {
        let pc = self.regs.pc();
        let next_pc = self.regs.next_pc();
        self.regs.write(PREV_PC_REG, pc);
        self.regs.write(PC_REG, next_pc);
        self.regs.write(NEXT_PC_REG, next_pc.wrapping_add(4));
    }
}
