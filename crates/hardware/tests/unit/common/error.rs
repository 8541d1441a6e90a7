//! Exception and Error Tests.

use std::collections::HashSet;

use mipsim_core::common::{Exception, Fault, SimError, VirtAddr};

#[test]
fn exception_names_are_distinct() {
    let names: HashSet<_> = Exception::ALL.iter().map(|e| e.name()).collect();
    assert_eq!(names.len(), Exception::ALL.len());
}

#[test]
fn fault_display_names_kind_and_address() {
    let fault = Fault::at(Exception::PageFault, VirtAddr::new(0x200));
    assert_eq!(fault.to_string(), "page fault at 0x00000200");
}

#[test]
fn unaddressed_faults_record_zero() {
    assert_eq!(Fault::new(Exception::Syscall).bad_vaddr, VirtAddr::new(0));
}

#[test]
fn sim_errors_describe_the_problem() {
    let err = SimError::BadMagic { found: 0x1234 };
    assert_eq!(err.to_string(), "not a NOFF image (magic 0x00001234)");

    let err = SimError::OutOfMemory {
        requested: 20,
        available: 3,
    };
    assert!(err.to_string().contains("20 pages"));
}
