//! Instruction encoding and decoding utilities.
//!
//! Provides bit extraction functions for the MIPS instruction fields and the
//! decoded [`Instruction`] the execute step works from. Decoding is cheap and
//! redone on every fetch; nothing is cached across instructions.

use std::fmt;

use super::opcodes::Opcode;

/// Bit shift for the primary opcode field (bits 26-31).
pub const OP_SHIFT: u32 = 26;
/// Bit mask for the primary opcode field (6 bits).
pub const OP_MASK: u32 = 0x3f;
/// Bit shift for the `rs` field (bits 21-25).
pub const RS_SHIFT: u32 = 21;
/// Bit shift for the `rt` field (bits 16-20).
pub const RT_SHIFT: u32 = 16;
/// Bit shift for the `rd` field (bits 11-15).
pub const RD_SHIFT: u32 = 11;
/// Bit shift for the shift-amount field (bits 6-10).
pub const SHAMT_SHIFT: u32 = 6;
/// Bit mask for 5-bit register and shift-amount fields.
pub const REG_MASK: u32 = 0x1f;
/// Bit mask for the function field of register-format instructions (bits 0-5).
pub const FUNCT_MASK: u32 = 0x3f;
/// Bit mask for the 16-bit immediate.
pub const IMM_MASK: u32 = 0xffff;
/// Sign bit of the 16-bit immediate.
pub const IMM_SIGN: u32 = 0x8000;
/// Bit mask for the 26-bit jump target index.
pub const TARGET_MASK: u32 = 0x03ff_ffff;
/// Bits of the `rt` field that select the branch-conditional variant.
pub const BCOND_MASK: u32 = 0x001f_0000;

/// Trait for extracting instruction fields from encoded instructions.
pub trait InstructionBits {
    /// Primary opcode (bits 26-31).
    fn op(&self) -> u32;
    /// First source register (bits 21-25).
    fn rs(&self) -> usize;
    /// Second source / immediate-format destination register (bits 16-20).
    fn rt(&self) -> usize;
    /// Register-format destination register (bits 11-15).
    fn rd(&self) -> usize;
    /// Shift amount (bits 6-10).
    fn shamt(&self) -> u32;
    /// Function code of register-format instructions (bits 0-5).
    fn funct(&self) -> u32;
    /// 16-bit immediate, sign-extended to 32 bits.
    fn imm_sext(&self) -> u32;
    /// 26-bit jump target index.
    fn target(&self) -> u32;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn op(&self) -> u32 {
        (self >> OP_SHIFT) & OP_MASK
    }

    #[inline(always)]
    fn rs(&self) -> usize {
        ((self >> RS_SHIFT) & REG_MASK) as usize
    }

    #[inline(always)]
    fn rt(&self) -> usize {
        ((self >> RT_SHIFT) & REG_MASK) as usize
    }

    #[inline(always)]
    fn rd(&self) -> usize {
        ((self >> RD_SHIFT) & REG_MASK) as usize
    }

    #[inline(always)]
    fn shamt(&self) -> u32 {
        (self >> SHAMT_SHIFT) & REG_MASK
    }

    #[inline(always)]
    fn funct(&self) -> u32 {
        self & FUNCT_MASK
    }

    #[inline(always)]
    fn imm_sext(&self) -> u32 {
        let imm = self & IMM_MASK;
        if imm & IMM_SIGN != 0 {
            imm | !IMM_MASK
        } else {
            imm
        }
    }

    #[inline(always)]
    fn target(&self) -> u32 {
        self & TARGET_MASK
    }
}

/// A decoded instruction.
///
/// `extra` holds the sign-extended immediate, the shift amount or the jump
/// target index, depending on the opcode's format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// The raw 32-bit word.
    pub value: u32,
    /// Resolved operation (never `Special` or `Bcond` for a decoded word).
    pub opcode: Opcode,
    /// First source register.
    pub rs: usize,
    /// Second source register, or destination for immediate formats.
    pub rt: usize,
    /// Destination register for register formats.
    pub rd: usize,
    /// Format-dependent operand.
    pub extra: u32,
}

impl Instruction {
    /// Decodes a raw instruction word.
    #[inline]
    pub fn decode(value: u32) -> Self {
        super::decode::decode(value)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&super::disasm::disassemble(self))
    }
}
