//! Disassembler Tests.

use mipsim_core::isa::Instruction;
use mipsim_core::isa::abi::reg_name;
use mipsim_core::isa::disasm::disassemble;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::asm::*;

#[rstest]
#[case(nop(), "nop")]
#[case(add(2, 4, 5), "add v0, a0, a1")]
#[case(lw(8, -4, 29), "lw t0, -4(sp)")]
#[case(ori(1, 0, 0xff), "ori at, zero, 0xff")]
#[case(beq(1, 2, -1), "beq at, v0, -4")]
#[case(jal(0x100), "jal 0x100")]
#[case(jr(31), "jr ra")]
#[case(syscall(), "syscall")]
#[case(sra(3, 3, 2), "sra v1, v1, 2")]
fn renders_assembler_text(#[case] word: u32, #[case] want: &str) {
    assert_eq!(disassemble(&Instruction::decode(word)), want);
}

#[test]
fn display_matches_disassembly() {
    let i = Instruction::decode(addiu(4, 0, 42));
    assert_eq!(i.to_string(), "addiu a0, zero, 42");
}

#[test]
fn reserved_words_show_their_encoding() {
    let text = disassemble(&Instruction::decode(0xfc00_0000));
    assert!(text.ends_with("(0xfc000000)"), "{text}");
}

#[test]
fn out_of_range_register_names_are_marked() {
    assert_eq!(reg_name(29), "sp");
    assert_eq!(reg_name(40), "$??");
}
