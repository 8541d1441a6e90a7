//! Instruction Execution Tests.
//!
//! Covers the behaviors that make the interpreter more than a switch over
//! opcodes: the branch delay slot, the one-instruction load delay, and the
//! all-or-nothing retirement of a faulting step.

use mipsim_core::common::{Exception, PhysAddr};
use mipsim_core::common::constants::{
    HI_REG, LO_REG, LOAD_REG, NEXT_PC_REG, PC_REG, PREV_PC_REG, RET_ADDR_REG,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::asm::*;
use crate::common::harness::CpuHarness;

#[test]
fn register_zero_cannot_be_written() {
    let mut h = CpuHarness::new().load_program(&[addiu(0, 0, 5), addu(0, 0, 0)]);
    h.run(2);
    assert_eq!(h.get_reg(0), 0);
}

#[test]
fn pc_triple_advances_one_slot_per_step() {
    let mut h = CpuHarness::new().load_program(&[nop(), nop()]);
    h.run(1);
    assert_eq!(h.get_reg(PREV_PC_REG), 0);
    assert_eq!(h.get_reg(PC_REG), 4);
    assert_eq!(h.get_reg(NEXT_PC_REG), 8);
    assert_eq!(h.cpu.instructions_retired, 1);
}

#[test]
fn add_overflow_traps_and_leaves_destination_alone() {
    let mut h = CpuHarness::new().load_program(&[add(3, 1, 2)]);
    h.set_reg(1, 0x7fff_ffff);
    h.set_reg(2, 1);
    h.set_reg(3, 77);

    let fault = h.cpu.one_instruction().unwrap_err();
    assert_eq!(fault.kind, Exception::Overflow);
    assert_eq!(h.get_reg(3), 77);
    assert_eq!(h.get_reg(PC_REG), 0, "a faulting step does not advance");
    assert_eq!(h.cpu.instructions_retired, 0);
}

#[test]
fn addu_wraps_silently() {
    let mut h = CpuHarness::new().load_program(&[addu(3, 1, 2)]);
    h.set_reg(1, 0x7fff_ffff);
    h.set_reg(2, 1);
    h.run(1);
    assert_eq!(h.get_reg(3), 0x8000_0000);
}

#[test]
fn addi_overflow_traps() {
    let mut h = CpuHarness::new().load_program(&[addi(3, 1, 1)]);
    h.set_reg(1, 0x7fff_ffff);
    assert_eq!(h.cpu.one_instruction().unwrap_err().kind, Exception::Overflow);
}

#[test]
fn taken_branch_executes_its_delay_slot() {
    let mut h = CpuHarness::new().load_program(&[
        beq(0, 0, 2),
        addiu(5, 0, 1),
        addiu(6, 0, 1),
        addiu(7, 0, 1),
    ]);
    h.run(1);
    assert_eq!(h.get_reg(PC_REG), 4);
    assert_eq!(h.get_reg(NEXT_PC_REG), 12);

    h.run(2);
    assert_eq!(h.get_reg(5), 1, "delay slot ran");
    assert_eq!(h.get_reg(6), 0, "skipped by the branch");
    assert_eq!(h.get_reg(7), 1, "branch target ran");
}

#[test]
fn untaken_branch_falls_through() {
    let mut h = CpuHarness::new().load_program(&[bne(0, 0, 2), nop(), addiu(6, 0, 1)]);
    h.run(3);
    assert_eq!(h.get_reg(6), 1);
}

#[test]
fn loaded_value_is_invisible_to_the_next_instruction() {
    let mut h = CpuHarness::new().load_program(&[lw(1, 0x100, 0), addi(3, 1, 0), nop()]);
    h.cpu.write_phys(PhysAddr::new(0x100), 4, 99);
    h.set_reg(1, 5);

    h.run(1);
    assert_eq!(h.get_reg(1), 5, "load is still in flight");
    assert_eq!(h.get_reg(LOAD_REG), 1);

    h.run(1);
    assert_eq!(h.get_reg(3), 5, "consumer saw the old value");
    assert_eq!(h.get_reg(1), 99, "load committed at the end of the next step");
}

#[test]
fn back_to_back_loads_commit_in_order() {
    let mut h = CpuHarness::new().load_program(&[lw(1, 0x100, 0), lw(1, 0x104, 0), nop()]);
    h.cpu.write_phys(PhysAddr::new(0x100), 4, 11);
    h.cpu.write_phys(PhysAddr::new(0x104), 4, 22);

    h.run(2);
    assert_eq!(h.get_reg(1), 11);
    h.run(1);
    assert_eq!(h.get_reg(1), 22);
}

#[test]
fn write_in_the_load_delay_slot_wins_over_the_load() {
    let mut h = CpuHarness::new().load_program(&[lw(1, 0x100, 0), addiu(1, 0, 7), nop()]);
    h.cpu.write_phys(PhysAddr::new(0x100), 4, 99);

    h.run(2);
    assert_eq!(h.get_reg(1), 7, "load committed first, then overwritten");
    assert_eq!(h.get_reg(LOAD_REG), 0, "nothing left in flight");

    h.run(1);
    assert_eq!(h.get_reg(1), 7);
}

#[rstest]
#[case(lb(1, 0x100, 0), 0xffff_ff80)]
#[case(lbu(1, 0x100, 0), 0x80)]
#[case(lh(1, 0x100, 0), 0xffff_ff80)]
fn narrow_loads_extend_correctly(#[case] instr: u32, #[case] want: u32) {
    let mut h = CpuHarness::new().load_program(&[instr, nop()]);
    h.cpu.write_phys(PhysAddr::new(0x100), 4, 0xff80);
    h.run(2);
    assert_eq!(h.get_reg(1), want);
}

#[test]
fn store_then_load_round_trips_through_memory() {
    let mut h = CpuHarness::new().load_program(&[sw(2, 0x200, 0), lw(3, 0x200, 0), nop()]);
    h.set_reg(2, 0xcafe_f00d);
    h.run(3);
    assert_eq!(h.get_reg(3), 0xcafe_f00d);
}

#[test]
fn unaligned_word_load_is_an_address_error() {
    let mut h = CpuHarness::new().load_program(&[lw(1, 0x102, 0)]);
    let fault = h.cpu.one_instruction().unwrap_err();
    assert_eq!(fault.kind, Exception::AddressError);
    assert_eq!(fault.bad_vaddr.val(), 0x102);
}

#[test]
fn unmapped_load_reports_the_faulting_address() {
    let addr = CpuHarness::PAGES * 128;
    let mut h = CpuHarness::new().load_program(&[lw(1, 0, 2)]);
    h.set_reg(2, addr);
    let fault = h.cpu.one_instruction().unwrap_err();
    assert_eq!(fault.kind, Exception::AddressError);
    assert_eq!(fault.bad_vaddr.val(), addr);
}

#[test]
fn lwr_merges_into_the_low_bytes() {
    // LWR at byte 1 replaces the low half with the aligned word's upper half.
    let mut h = CpuHarness::new().load_program(&[lwr(1, 0x101, 0), nop(), nop()]);
    h.cpu.write_phys(PhysAddr::new(0x100), 4, 0x3322_1100);
    h.set_reg(1, 0xaabb_ccdd);
    h.run(2);
    assert_eq!(h.get_reg(1), 0xaabb_3322);
}

#[test]
fn syscall_and_reserved_opcodes_trap() {
    let mut h = CpuHarness::new().load_program(&[syscall()]);
    assert_eq!(h.cpu.one_instruction().unwrap_err().kind, Exception::Syscall);

    let mut h = CpuHarness::new().load_program(&[0xfc00_0000]);
    assert_eq!(
        h.cpu.one_instruction().unwrap_err().kind,
        Exception::IllegalInstruction
    );
}

#[test]
fn jal_links_past_the_delay_slot_and_jr_returns() {
    let mut h = CpuHarness::new().load_program(&[
        jal(0x20),
        nop(),
        addiu(4, 0, 9),
        nop(),
        nop(),
        nop(),
        nop(),
        nop(),
        jr(RET_ADDR_REG as u32),
        addiu(5, 0, 1),
    ]);
    h.run(2);
    assert_eq!(h.get_reg(RET_ADDR_REG), 8);
    assert_eq!(h.get_reg(PC_REG), 0x20);

    h.run(3);
    assert_eq!(h.get_reg(5), 1);
    assert_eq!(h.get_reg(4), 9, "returned to the link address");
}

#[test]
fn bltzal_links_even_when_not_taken() {
    let mut h = CpuHarness::new().load_program(&[bltzal(0, 4), nop()]);
    h.run(1);
    assert_eq!(h.get_reg(RET_ADDR_REG), 8);
    assert_eq!(h.get_reg(NEXT_PC_REG), 8);
}

#[test]
fn multiply_and_move_from_lo() {
    let mut h = CpuHarness::new().load_program(&[mult(1, 2), mflo(3), mfhi(4)]);
    h.set_reg(1, 6);
    h.set_reg(2, (-7i32) as u32);
    h.run(3);
    assert_eq!(h.get_reg(LO_REG), (-42i32) as u32);
    assert_eq!(h.get_reg(HI_REG), u32::MAX);
    assert_eq!(h.get_reg(3), (-42i32) as u32);
    assert_eq!(h.get_reg(4), u32::MAX);
}

#[test]
fn divide_by_zero_does_not_trap() {
    let mut h = CpuHarness::new().load_program(&[div(1, 0), mflo(3)]);
    h.set_reg(1, 17);
    h.set_reg(3, 5);
    h.run(2);
    assert_eq!(h.get_reg(3), 0);
}

#[test]
fn shifts_follow_operand_signedness() {
    let mut h = CpuHarness::new().load_program(&[sra(2, 1, 4), sll(3, 1, 4), sllv(4, 5, 6)]);
    h.set_reg(1, 0x8000_0000);
    h.set_reg(5, 1);
    h.set_reg(6, 33);
    h.run(3);
    assert_eq!(h.get_reg(2), 0xf800_0000);
    assert_eq!(h.get_reg(3), 0);
    assert_eq!(h.get_reg(4), 2, "variable shift uses the low five bits");
}

#[test]
fn lui_and_ori_build_a_constant() {
    let mut h = CpuHarness::new().load_program(&[lui(1, 0x1234), ori(1, 1, 0x5678), andi(2, 1, 0xff)]);
    h.run(3);
    assert_eq!(h.get_reg(1), 0x1234_5678);
    assert_eq!(h.get_reg(2), 0x78);
}

#[test]
fn j_keeps_the_upper_pc_region() {
    let mut h = CpuHarness::new().load_program(&[j(0x10), nop(), nop(), nop(), or(2, 0, 0)]);
    h.run(2);
    assert_eq!(h.get_reg(PC_REG), 0x10);
}
