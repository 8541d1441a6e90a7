//! MIPS Instruction Decoder.
//!
//! This module turns a raw 32-bit word into an [`Instruction`]. Decoding is
//! table driven:
//! 1. **Primary table:** The top six bits select an opcode and its format, which in
//!    turn selects how `extra` is extracted.
//! 2. **Special table:** Opcode 0 dispatches on the low six bits (function code).
//! 3. **Branch-conditional group:** Opcode 1 dispatches on bits 16-20.

use super::instruction::{BCOND_MASK, Instruction, InstructionBits};
use super::opcodes::{Format, Opcode};

use Format::{I, J, R};
use Opcode::{
    Add, Addi, Addiu, Addu, And, Andi, Bcond, Beq, Bgtz, Blez, Bne, Div, Divu, Jal, Jalr, Jr,
    Lb, Lbu, Lh, Lhu, Lui, Lw, Lwl, Lwr, Mfhi, Mflo, Mthi, Mtlo, Mult, Multu, Nor, Or, Ori, Res,
    Sb, Sh, Sll, Sllv, Slt, Slti, Sltiu, Sltu, Special, Sra, Srav, Srl, Srlv, Sub, Subu, Sw,
    Swl, Swr, Syscall, Unimp, Xor, Xori,
};

/// Primary dispatch table, indexed by bits 26-31.
#[rustfmt::skip]
pub const OP_TABLE: [(Opcode, Format); 64] = [
    (Special, R), (Bcond, I), (Opcode::J, J), (Jal, J), (Beq, I), (Bne, I), (Blez, I), (Bgtz, I),
    (Addi, I), (Addiu, I), (Slti, I), (Sltiu, I), (Andi, I), (Ori, I), (Xori, I), (Lui, I),
    (Unimp, I), (Unimp, I), (Unimp, I), (Unimp, I), (Res, I), (Res, I), (Res, I), (Res, I),
    (Res, I), (Res, I), (Res, I), (Res, I), (Res, I), (Res, I), (Res, I), (Res, I),
    (Lb, I), (Lh, I), (Lwl, I), (Lw, I), (Lbu, I), (Lhu, I), (Lwr, I), (Res, I),
    (Sb, I), (Sh, I), (Swl, I), (Sw, I), (Res, I), (Res, I), (Swr, I), (Res, I),
    (Unimp, I), (Unimp, I), (Unimp, I), (Unimp, I), (Res, I), (Res, I), (Res, I), (Res, I),
    (Unimp, I), (Unimp, I), (Unimp, I), (Unimp, I), (Res, I), (Res, I), (Res, I), (Res, I),
];

/// Secondary table for opcode 0, indexed by the function code (bits 0-5).
#[rustfmt::skip]
pub const SPECIAL_TABLE: [Opcode; 64] = [
    Sll, Res, Srl, Sra, Sllv, Res, Srlv, Srav,
    Jr, Jalr, Res, Res, Syscall, Unimp, Res, Res,
    Mfhi, Mthi, Mflo, Mtlo, Res, Res, Res, Res,
    Mult, Multu, Div, Divu, Res, Res, Res, Res,
    Add, Addu, Sub, Subu, And, Or, Xor, Nor,
    Res, Res, Slt, Sltu, Res, Res, Res, Res,
    Res, Res, Res, Res, Res, Res, Res, Res,
    Res, Res, Res, Res, Res, Res, Res, Res,
];

/// `rt` selector for `BLTZ`.
const BCOND_BLTZ: u32 = 0x0000_0000;
/// `rt` selector for `BGEZ`.
const BCOND_BGEZ: u32 = 0x0001_0000;
/// `rt` selector for `BLTZAL`.
const BCOND_BLTZAL: u32 = 0x0010_0000;
/// `rt` selector for `BGEZAL`.
const BCOND_BGEZAL: u32 = 0x0011_0000;

/// Decodes a raw 32-bit instruction word.
///
/// # Arguments
///
/// * `value` - The raw instruction word as fetched from memory.
///
/// # Returns
///
/// The decoded instruction. Encodings with no meaning decode to
/// [`Opcode::Res`] or [`Opcode::Unimp`]; the execute step turns those into
/// illegal-instruction exceptions.
pub fn decode(value: u32) -> Instruction {
    let (primary, format) = OP_TABLE[value.op() as usize];

    let extra = match format {
        Format::I => value.imm_sext(),
        Format::R => value.shamt(),
        Format::J => value.target(),
    };

    let opcode = match primary {
        Special => SPECIAL_TABLE[value.funct() as usize],
        Bcond => match value & BCOND_MASK {
            BCOND_BLTZ => Opcode::Bltz,
            BCOND_BGEZ => Opcode::Bgez,
            BCOND_BLTZAL => Opcode::Bltzal,
            BCOND_BGEZAL => Opcode::Bgezal,
            _ => Unimp,
        },
        op => op,
    };

    Instruction {
        value,
        opcode,
        rs: value.rs(),
        rt: value.rt(),
        rd: value.rd(),
        extra,
    }
}
