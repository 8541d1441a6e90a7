//! Address Translation Tests.
//!
//! Check ordering, use/dirty tracking and the guarantee that a failed
//! translation leaves the table untouched.

use mipsim_core::common::{AccessType, Exception, PhysAddr, VirtAddr};
use mipsim_core::core::units::mmu::Mmu;
use mipsim_core::core::units::mmu::frames::FrameAllocator;
use mipsim_core::core::units::mmu::page_table::{PageTable, TranslationEntry};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn mmu_with(entries: Vec<TranslationEntry>) -> Mmu {
    let mut mmu = Mmu::new(128, 16);
    let _ = mmu.set_page_table(PageTable::new(entries));
    mmu
}

fn translate(mmu: &mut Mmu, addr: u32, size: u32, access: AccessType) -> Result<u32, Exception> {
    mmu.translate(VirtAddr::new(addr), size, access)
        .map(PhysAddr::val)
}

#[test]
fn vpn_past_the_table_is_an_address_error() {
    let mut mmu = mmu_with(vec![TranslationEntry::mapped(0, 7)]);
    assert_eq!(
        translate(&mut mmu, 130, 1, AccessType::Read),
        Err(Exception::AddressError)
    );
}

#[test]
fn second_page_maps_to_its_frame() {
    let mut mmu = mmu_with(vec![
        TranslationEntry::mapped(0, 7),
        TranslationEntry::mapped(1, 1),
    ]);
    assert_eq!(translate(&mut mmu, 130, 1, AccessType::Read), Ok(130));
    assert_eq!(translate(&mut mmu, 4, 4, AccessType::Fetch), Ok(7 * 128 + 4));
}

#[rstest]
#[case(0x101, 4)]
#[case(0x102, 4)]
#[case(0x103, 2)]
fn misaligned_accesses_fail_before_lookup(#[case] addr: u32, #[case] size: u32) {
    // No entry covers 0x100, so only the alignment check can fire.
    let mut mmu = mmu_with(vec![TranslationEntry::mapped(0, 0)]);
    assert_eq!(
        translate(&mut mmu, addr, size, AccessType::Read),
        Err(Exception::AddressError)
    );
}

#[test]
fn invalid_entry_page_faults_and_is_counted() {
    let mut entry = TranslationEntry::mapped(0, 3);
    entry.valid = false;
    let mut mmu = mmu_with(vec![entry]);
    assert_eq!(
        translate(&mut mmu, 8, 4, AccessType::Read),
        Err(Exception::PageFault)
    );
    assert_eq!(mmu.page_faults, 1);
}

#[test]
fn write_to_read_only_page_fails_without_side_effects() {
    let mut entry = TranslationEntry::mapped(0, 3);
    entry.read_only = true;
    let mut mmu = mmu_with(vec![entry]);

    assert_eq!(
        translate(&mut mmu, 8, 4, AccessType::Write),
        Err(Exception::ReadOnly)
    );
    let e = mmu.page_table().unwrap().entry(0).unwrap();
    assert!(!e.used && !e.dirty);

    assert_eq!(translate(&mut mmu, 8, 4, AccessType::Read), Ok(3 * 128 + 8));
}

#[test]
fn frame_beyond_memory_is_a_bus_error() {
    let mut mmu = mmu_with(vec![TranslationEntry::mapped(0, 16)]);
    assert_eq!(
        translate(&mut mmu, 0, 1, AccessType::Read),
        Err(Exception::BusError)
    );
}

#[test]
fn successful_accesses_set_use_and_dirty() {
    let mut mmu = mmu_with(vec![
        TranslationEntry::mapped(0, 0),
        TranslationEntry::mapped(1, 1),
    ]);
    let _ = translate(&mut mmu, 0, 4, AccessType::Read).unwrap();
    let _ = translate(&mut mmu, 128, 4, AccessType::Write).unwrap();

    let table = mmu.page_table().unwrap();
    let bits: Vec<_> = table.iter().map(|e| (e.used, e.dirty)).collect();
    assert_eq!(bits, vec![(true, false), (true, true)]);
}

#[test]
#[should_panic(expected = "no page table")]
fn translating_without_a_table_is_fatal() {
    let mut mmu = Mmu::new(128, 16);
    let _ = mmu.translate(VirtAddr::new(0), 4, AccessType::Fetch);
}

#[test]
fn page_table_moves_in_and_out() {
    let mut mmu = Mmu::new(128, 16);
    assert!(mmu.set_page_table(PageTable::contiguous(4, 2)).is_none());
    let table = mmu.take_page_table().unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.entry(1).unwrap().physical_page, 5);
    assert!(mmu.page_table().is_none());
}

#[test]
fn frames_are_handed_out_contiguously() {
    let mut frames = FrameAllocator::new(10);
    assert_eq!(frames.allocate(4), Some(0));
    assert_eq!(frames.allocate(4), Some(4));
    assert_eq!(frames.allocate(3), None);
    assert_eq!(frames.available(), 2);
}
