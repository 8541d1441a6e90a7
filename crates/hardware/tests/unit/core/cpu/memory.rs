//! Translated Memory and Exception Entry Tests.

use mipsim_core::common::constants::{
    BAD_VADDR_REG, LOAD_REG, LOAD_VALUE_REG, NEXT_PC_REG, PC_REG, PREV_PC_REG,
};
use mipsim_core::common::{Exception, Fault, VirtAddr};
use mipsim_core::core::units::mmu::page_table::PageTable;
use pretty_assertions::assert_eq;

use crate::common::harness::CpuHarness;

#[test]
fn memory_is_little_endian() {
    let mut h = CpuHarness::new();
    h.cpu.write_mem(VirtAddr::new(0x40), 4, 0x1122_3344).unwrap();
    assert_eq!(h.cpu.read_mem(VirtAddr::new(0x40), 1), Ok(0x44));
    assert_eq!(h.cpu.read_mem(VirtAddr::new(0x42), 2), Ok(0x1122));
    assert_eq!(&h.cpu.main_memory()[0x40..0x44], &[0x44, 0x33, 0x22, 0x11]);
}

#[test]
fn reads_go_through_the_page_table() {
    let mut h = CpuHarness::new();
    let _ = h.cpu.mmu.set_page_table(PageTable::contiguous(3, 1));
    h.cpu.write_mem(VirtAddr::new(4), 4, 0xabcd).unwrap();
    assert_eq!(h.cpu.main_memory()[3 * 128 + 4], 0xcd);
}

#[test]
fn failed_write_leaves_memory_untouched() {
    let mut h = CpuHarness::new();
    let before = h.cpu.main_memory().to_vec();
    let fault = h.cpu.write_mem(VirtAddr::new(0x81), 2, 0xffff).unwrap_err();
    assert_eq!(fault, Fault::at(Exception::AddressError, VirtAddr::new(0x81)));
    assert_eq!(h.cpu.main_memory(), before.as_slice());
}

#[test]
fn enter_exception_commits_the_pending_load() {
    let mut h = CpuHarness::new();
    h.set_reg(LOAD_REG, 9);
    h.set_reg(LOAD_VALUE_REG, 1234);

    h.cpu
        .enter_exception(Fault::at(Exception::PageFault, VirtAddr::new(0x3000)));

    assert_eq!(h.get_reg(9), 1234);
    assert_eq!(h.get_reg(LOAD_REG), 0, "nothing staged afterwards");
    assert_eq!(h.get_reg(BAD_VADDR_REG), 0x3000);
}

#[test]
fn delayed_load_stage_of_register_zero_is_harmless() {
    let mut h = CpuHarness::new();
    h.cpu.delayed_load(0, 55);
    h.cpu.delayed_load(0, 0);
    assert_eq!(h.get_reg(0), 0);
}

#[test]
fn advance_pc_moves_one_slot() {
    let mut h = CpuHarness::new();
    h.set_reg(PC_REG, 0x10);
    h.set_reg(NEXT_PC_REG, 0x14);
    h.cpu.advance_pc();
    assert_eq!(
        (h.get_reg(PREV_PC_REG), h.get_reg(PC_REG), h.get_reg(NEXT_PC_REG)),
        (0x10, 0x14, 0x18)
    );
}
