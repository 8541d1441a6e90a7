//! Instruction Disassembler.
//!
//! Converts a decoded [`Instruction`] into a human-readable mnemonic string
//! for debug tracing, logging, and test diagnostics. Register operands use
//! their ABI names; immediates are printed signed, logical immediates in hex.
//!
//! # Usage
//!
//! ```
//! use mipsim_core::isa::Instruction;
//! use mipsim_core::isa::disasm::disassemble;
//!
//! // addiu $sp, $sp, -16
//! let text = disassemble(&Instruction::decode(0x27bd_fff0));
//! assert_eq!(text, "addiu sp, sp, -16");
//! ```

use super::abi::reg_name;
use super::instruction::Instruction;
use super::opcodes::Opcode;

/// Renders an instruction as assembler text.
pub fn disassemble(instr: &Instruction) -> String {
    let m = instr.opcode.mnemonic();
    let rs = reg_name(instr.rs);
    let rt = reg_name(instr.rt);
    let rd = reg_name(instr.rd);
    let simm = instr.extra as i32;

    match instr.opcode {
        Opcode::Add
        | Opcode::Addu
        | Opcode::Sub
        | Opcode::Subu
        | Opcode::And
        | Opcode::Or
        | Opcode::Xor
        | Opcode::Nor
        | Opcode::Slt
        | Opcode::Sltu => format!("{m} {rd}, {rs}, {rt}"),

        Opcode::Sllv | Opcode::Srlv | Opcode::Srav => format!("{m} {rd}, {rt}, {rs}"),
        Opcode::Sll | Opcode::Srl | Opcode::Sra => {
            if instr.value == 0 {
                "nop".to_string()
            } else {
                format!("{m} {rd}, {rt}, {}", instr.extra)
            }
        }

        Opcode::Addi | Opcode::Addiu | Opcode::Slti | Opcode::Sltiu => {
            format!("{m} {rt}, {rs}, {simm}")
        }
        Opcode::Andi | Opcode::Ori | Opcode::Xori => {
            format!("{m} {rt}, {rs}, {:#x}", instr.extra & 0xffff)
        }
        Opcode::Lui => format!("{m} {rt}, {:#x}", instr.extra & 0xffff),

        Opcode::Lb
        | Opcode::Lbu
        | Opcode::Lh
        | Opcode::Lhu
        | Opcode::Lw
        | Opcode::Lwl
        | Opcode::Lwr
        | Opcode::Sb
        | Opcode::Sh
        | Opcode::Sw
        | Opcode::Swl
        | Opcode::Swr => format!("{m} {rt}, {simm}({rs})"),

        Opcode::Beq | Opcode::Bne => format!("{m} {rs}, {rt}, {}", simm << 2),
        Opcode::Bgez
        | Opcode::Bgezal
        | Opcode::Bgtz
        | Opcode::Blez
        | Opcode::Bltz
        | Opcode::Bltzal => format!("{m} {rs}, {}", simm << 2),

        Opcode::J | Opcode::Jal => format!("{m} {:#x}", instr.extra << 2),
        Opcode::Jr => format!("{m} {rs}"),
        Opcode::Jalr => format!("{m} {rd}, {rs}"),

        Opcode::Mfhi | Opcode::Mflo => format!("{m} {rd}"),
        Opcode::Mthi | Opcode::Mtlo => format!("{m} {rs}"),
        Opcode::Mult | Opcode::Multu | Opcode::Div | Opcode::Divu => format!("{m} {rs}, {rt}"),

        Opcode::Syscall => m.to_string(),
        Opcode::Special | Opcode::Bcond | Opcode::Res | Opcode::Unimp => {
            format!("{m} ({:#010x})", instr.value)
        }
    }
}
