//! Instruction Execution.
//!
//! This module implements the interpreter step. It performs the following:
//! 1. **Fetch:** Reads the word at PC through the translator; a failed fetch aborts the step.
//! 2. **Decode:** Table-driven decode into an [`Instruction`].
//! 3. **Execute:** Computes register writes, a pending load and the PC after the delay slot.
//!    Reads see the register file as it was before the step, so an outstanding delayed
//!    load is not yet visible.
//! 4. **Retire:** Commits the previously staged load, applies this instruction's own
//!    writes on top, stages this instruction's load, re-pins register 0 and advances
//!    PrevPC/PC/NextPC by one slot.
//!
//! A step that faults retires nothing: registers, PC and memory are left as they were.

use tracing::trace;

use super::Cpu;
use crate::common::constants::{
    HI_REG, LO_REG, LOAD_REG, LOAD_VALUE_REG, NEXT_PC_REG, NUM_GP_REGS, PC_REG, PREV_PC_REG,
    RET_ADDR_REG,
};
use crate::common::{Exception, Fault, VirtAddr};
use crate::core::units::alu::{Alu, AluOp, arithmetic};
use crate::isa::{Instruction, Opcode};

/// Tracing target for per-instruction traces.
const TARGET: &str = "mipsim::machine";

/// Upper PC bits kept by `J`/`JAL`.
const JUMP_REGION_MASK: u32 = 0xf000_0000;

/// Mask applied to logical immediates (zero-extension).
const ZERO_EXT_MASK: u32 = 0xffff;

/// Everything an executed instruction wants to change, applied at retirement.
#[derive(Debug)]
struct Retirement {
    writes: [Option<(usize, u32)>; 2],
    load: (usize, u32),
    pc_after: u32,
}

impl Retirement {
    const fn new(pc_after: u32) -> Self {
        Self {
            writes: [None, None],
            load: (0, 0),
            pc_after,
        }
    }

    const fn write(&mut self, reg: usize, value: u32) {
        if self.writes[0].is_none() {
            self.writes[0] = Some((reg, value));
        } else {
            self.writes[1] = Some((reg, value));
        }
    }
}

/// Converts a branch offset or jump index to a byte displacement.
#[inline(always)]
const fn index_to_addr(x: u32) -> u32 {
    x << 2
}

impl Cpu {
    /// Executes a single instruction.
    ///
    /// # Returns
    ///
    /// `Ok(())` once the instruction has retired, or the fault that stopped
    /// it. Nothing is retired when a fault is returned; raising it is the
    /// caller's job.
    pub fn one_instruction(&mut self) -> Result<(), Fault> {
        let pc = self.regs.pc();
        let raw = self.fetch(VirtAddr::new(pc))?;
        let instr = Instruction::decode(raw);
        trace!(target: TARGET, "At PC = {pc:#010x}: {instr}");

        let retirement = self.execute(&instr)?;
        self.retire(&retirement);
        Ok(())
    }

    /// Commits the staged delayed load and stages a new one.
    ///
    /// The staged destination is written with the staged value (a stage of
    /// register 0 is a no-op), then `(next_reg, next_value)` becomes the new
    /// stage and register 0 is re-pinned.
    pub fn delayed_load(&mut self, next_reg: usize, next_value: u32) {
        self.commit_pending_load();
        self.stage_load(next_reg, next_value);
        self.regs.pin_zero();
    }

    fn commit_pending_load(&mut self) {
        let target = self.regs.read(LOAD_REG) as usize;
        if target < NUM_GP_REGS {
            let value = self.regs.read(LOAD_VALUE_REG);
            self.regs.write(target, value);
        }
    }

    fn stage_load(&mut self, reg: usize, value: u32) {
        self.regs.write(LOAD_REG, reg as u32);
        self.regs.write(LOAD_VALUE_REG, value);
    }

    fn retire(&mut self, r: &Retirement) {
        self.commit_pending_load();
        for &(reg, value) in r.writes.iter().flatten() {
            self.regs.write(reg, value);
        }
        self.stage_load(r.load.0, r.load.1);
        self.regs.pin_zero();

        let pc = self.regs.pc();
        let next_pc = self.regs.next_pc();
        self.regs.write(PREV_PC_REG, pc);
        self.regs.write(PC_REG, next_pc);
        self.regs.write(NEXT_PC_REG, r.pc_after);
        self.instructions_retired += 1;
    }

    /// Value the delayed-load slot would give `reg` once committed.
    fn pending_or_current(&self, reg: usize) -> u32 {
        if self.regs.read(LOAD_REG) as usize == reg {
            self.regs.read(LOAD_VALUE_REG)
        } else {
            self.regs.read(reg)
        }
    }

    fn execute(&mut self, i: &Instruction) -> Result<Retirement, Fault> {
        let next_pc = self.regs.next_pc();
        let rs = self.regs.read(i.rs);
        let rt = self.regs.read(i.rt);
        let mut r = Retirement::new(next_pc.wrapping_add(4));
        let branch_target = next_pc.wrapping_add(index_to_addr(i.extra));
        let alu = |op, a, b| Alu::execute(op, a, b).map_err(Fault::new);

        match i.opcode {
            Opcode::Add => r.write(i.rd, alu(AluOp::Add, rs, rt)?),
            Opcode::Addu => r.write(i.rd, alu(AluOp::Addu, rs, rt)?),
            Opcode::Sub => r.write(i.rd, alu(AluOp::Sub, rs, rt)?),
            Opcode::Subu => r.write(i.rd, alu(AluOp::Subu, rs, rt)?),
            Opcode::And => r.write(i.rd, alu(AluOp::And, rs, rt)?),
            Opcode::Or => r.write(i.rd, alu(AluOp::Or, rs, rt)?),
            Opcode::Xor => r.write(i.rd, alu(AluOp::Xor, rs, rt)?),
            Opcode::Nor => r.write(i.rd, alu(AluOp::Nor, rs, rt)?),
            Opcode::Slt => r.write(i.rd, alu(AluOp::Slt, rs, rt)?),
            Opcode::Sltu => r.write(i.rd, alu(AluOp::Sltu, rs, rt)?),

            Opcode::Sll => r.write(i.rd, alu(AluOp::Sll, rt, i.extra)?),
            Opcode::Srl => r.write(i.rd, alu(AluOp::Srl, rt, i.extra)?),
            Opcode::Sra => r.write(i.rd, alu(AluOp::Sra, rt, i.extra)?),
            Opcode::Sllv => r.write(i.rd, alu(AluOp::Sll, rt, rs)?),
            Opcode::Srlv => r.write(i.rd, alu(AluOp::Srl, rt, rs)?),
            Opcode::Srav => r.write(i.rd, alu(AluOp::Sra, rt, rs)?),

            Opcode::Addi => r.write(i.rt, alu(AluOp::Add, rs, i.extra)?),
            Opcode::Addiu => r.write(i.rt, alu(AluOp::Addu, rs, i.extra)?),
            Opcode::Slti => r.write(i.rt, alu(AluOp::Slt, rs, i.extra)?),
            Opcode::Sltiu => r.write(i.rt, alu(AluOp::Sltu, rs, i.extra)?),
            Opcode::Andi => r.write(i.rt, rs & (i.extra & ZERO_EXT_MASK)),
            Opcode::Ori => r.write(i.rt, rs | (i.extra & ZERO_EXT_MASK)),
            Opcode::Xori => r.write(i.rt, rs ^ (i.extra & ZERO_EXT_MASK)),
            Opcode::Lui => r.write(i.rt, i.extra << 16),

            Opcode::Mfhi => r.write(i.rd, self.regs.read(HI_REG)),
            Opcode::Mflo => r.write(i.rd, self.regs.read(LO_REG)),
            Opcode::Mthi => r.write(HI_REG, rs),
            Opcode::Mtlo => r.write(LO_REG, rs),
            Opcode::Mult | Opcode::Multu | Opcode::Div | Opcode::Divu => {
                let (hi, lo) = match i.opcode {
                    Opcode::Mult => arithmetic::mult(rs, rt),
                    Opcode::Multu => arithmetic::multu(rs, rt),
                    Opcode::Div => arithmetic::div(rs, rt),
                    _ => arithmetic::divu(rs, rt),
                };
                r.write(HI_REG, hi);
                r.write(LO_REG, lo);
            }

            Opcode::Beq => {
                if rs == rt {
                    r.pc_after = branch_target;
                }
            }
            Opcode::Bne => {
                if rs != rt {
                    r.pc_after = branch_target;
                }
            }
            Opcode::Blez => {
                if (rs as i32) <= 0 {
                    r.pc_after = branch_target;
                }
            }
            Opcode::Bgtz => {
                if (rs as i32) > 0 {
                    r.pc_after = branch_target;
                }
            }
            Opcode::Bltz | Opcode::Bltzal => {
                if i.opcode == Opcode::Bltzal {
                    r.write(RET_ADDR_REG, next_pc.wrapping_add(4));
                }
                if (rs as i32) < 0 {
                    r.pc_after = branch_target;
                }
            }
            Opcode::Bgez | Opcode::Bgezal => {
                if i.opcode == Opcode::Bgezal {
                    r.write(RET_ADDR_REG, next_pc.wrapping_add(4));
                }
                if (rs as i32) >= 0 {
                    r.pc_after = branch_target;
                }
            }

            Opcode::J => r.pc_after = (r.pc_after & JUMP_REGION_MASK) | index_to_addr(i.extra),
            Opcode::Jal => {
                r.write(RET_ADDR_REG, next_pc.wrapping_add(4));
                r.pc_after = (r.pc_after & JUMP_REGION_MASK) | index_to_addr(i.extra);
            }
            Opcode::Jr => r.pc_after = rs,
            Opcode::Jalr => {
                r.write(i.rd, next_pc.wrapping_add(4));
                r.pc_after = rs;
            }

            Opcode::Lb | Opcode::Lbu | Opcode::Lh | Opcode::Lhu | Opcode::Lw => {
                let addr = VirtAddr::new(rs.wrapping_add(i.extra));
                let size = match i.opcode {
                    Opcode::Lb | Opcode::Lbu => 1,
                    Opcode::Lh | Opcode::Lhu => 2,
                    _ => 4,
                };
                if !addr.is_aligned(size) {
                    return Err(Fault::at(Exception::AddressError, addr));
                }
                let raw = self.read_mem(addr, size)?;
                let value = match i.opcode {
                    Opcode::Lb => raw as u8 as i8 as u32,
                    Opcode::Lh => raw as u16 as i16 as u32,
                    _ => raw,
                };
                r.load = (i.rt, value);
            }
            Opcode::Lwl | Opcode::Lwr => {
                let addr = rs.wrapping_add(i.extra);
                let word = self.read_mem(VirtAddr::new(addr & !3), 4)?;
                let current = self.pending_or_current(i.rt);
                let value = if i.opcode == Opcode::Lwl {
                    match addr & 3 {
                        0 => word,
                        1 => (current & 0xff) | (word << 8),
                        2 => (current & 0xffff) | (word << 16),
                        _ => (current & 0x00ff_ffff) | (word << 24),
                    }
                } else {
                    match addr & 3 {
                        0 => (current & 0xffff_ff00) | (word >> 24),
                        1 => (current & 0xffff_0000) | (word >> 16),
                        2 => (current & 0xff00_0000) | (word >> 8),
                        _ => word,
                    }
                };
                r.load = (i.rt, value);
            }

            Opcode::Sb => self.write_mem(VirtAddr::new(rs.wrapping_add(i.extra)), 1, rt)?,
            Opcode::Sh => self.write_mem(VirtAddr::new(rs.wrapping_add(i.extra)), 2, rt)?,
            Opcode::Sw => self.write_mem(VirtAddr::new(rs.wrapping_add(i.extra)), 4, rt)?,
            Opcode::Swl | Opcode::Swr => {
                let addr = rs.wrapping_add(i.extra);
                let aligned = VirtAddr::new(addr & !3);
                let word = self.read_mem(aligned, 4)?;
                let value = if i.opcode == Opcode::Swl {
                    match addr & 3 {
                        0 => rt,
                        1 => (word & 0xff00_0000) | (rt >> 8),
                        2 => (word & 0xffff_0000) | (rt >> 16),
                        _ => (word & 0xffff_ff00) | (rt >> 24),
                    }
                } else {
                    match addr & 3 {
                        0 => (word & 0x00ff_ffff) | (rt << 24),
                        1 => (word & 0x0000_ffff) | (rt << 16),
                        2 => (word & 0x0000_00ff) | (rt << 8),
                        _ => rt,
                    }
                };
                self.write_mem(aligned, 4, value)?;
            }

            Opcode::Syscall => return Err(Fault::new(Exception::Syscall)),
            Opcode::Res | Opcode::Unimp | Opcode::Special | Opcode::Bcond => {
                return Err(Fault::new(Exception::IllegalInstruction));
            }
        }

        Ok(r)
    }
}
