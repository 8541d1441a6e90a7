//! Memory Management Unit (MMU).
//!
//! This module implements the address translator, responsible for
//! virtual-to-physical address translation through a single flat page table
//! (one entry per virtual page, indexed by virtual page number). There is no
//! TLB: every access consults the table installed by the running address space.

/// Bump allocator for contiguous physical frames.
pub mod frames;

/// Page table entries and the per-address-space table.
pub mod page_table;

use tracing::trace;

use crate::common::{AccessType, Exception, PhysAddr, VirtAddr};

use self::page_table::PageTable;

/// Tracing target for translation events.
const TARGET: &str = "mipsim::addrspace";

/// Memory Management Unit for virtual-to-physical address translation.
///
/// Holds the machine's page geometry and the currently active page table.
/// Address spaces install their table on switch-in and take it back on
/// switch-out, so the use/dirty bits set here travel with the table.
#[derive(Debug)]
pub struct Mmu {
    page_size: u32,
    num_frames: u32,
    page_table: Option<PageTable>,
    /// Page faults observed since boot.
    pub page_faults: u64,
}

impl Mmu {
    /// Creates a translator with no active page table.
    ///
    /// # Arguments
    ///
    /// * `page_size`  - Bytes per page (non-zero).
    /// * `num_frames` - Number of physical page frames in main memory.
    pub const fn new(page_size: u32, num_frames: u32) -> Self {
        Self {
            page_size,
            num_frames,
            page_table: None,
            page_faults: 0,
        }
    }

    /// Bytes per page.
    #[inline(always)]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of physical page frames.
    #[inline(always)]
    pub const fn num_frames(&self) -> u32 {
        self.num_frames
    }

    /// Installs `table` as the active page table, returning the previous one.
    pub fn set_page_table(&mut self, table: PageTable) -> Option<PageTable> {
        self.page_table.replace(table)
    }

    /// Removes and returns the active page table.
    pub const fn take_page_table(&mut self) -> Option<PageTable> {
        self.page_table.take()
    }

    /// Returns the active page table, if any.
    pub const fn page_table(&self) -> Option<&PageTable> {
        self.page_table.as_ref()
    }

    /// Translates a virtual address to a physical address.
    ///
    /// Checks, in order: alignment of `size`-byte accesses, that the page
    /// number is inside the table, that the entry is valid, that writes do not
    /// target a read-only page, and that the frame exists. On success the
    /// entry's use bit (and dirty bit for writes) is set. On failure nothing
    /// is modified.
    ///
    /// # Arguments
    ///
    /// * `vaddr`  - Virtual address to translate
    /// * `size`   - Access width in bytes (1, 2 or 4)
    /// * `access` - Type of access (Fetch, Read, Write)
    ///
    /// # Returns
    ///
    /// The physical address, or the exception the access raises.
    ///
    /// # Panics
    ///
    /// Panics if no page table is installed; executing without an address
    /// space is a kernel bug.
    pub fn translate(
        &mut self,
        vaddr: VirtAddr,
        size: u32,
        access: AccessType,
    ) -> Result<PhysAddr, Exception> {
        let result = self.lookup(vaddr, size, access);
        match result {
            Ok(paddr) => trace!(target: TARGET, "translate {vaddr} ({access:?}) -> {paddr}"),
            Err(Exception::PageFault) => {
                self.page_faults += 1;
                trace!(target: TARGET, "page fault at {vaddr}");
            }
            Err(e) => trace!(target: TARGET, "{e} translating {vaddr}"),
        }
        result
    }

    fn lookup(
        &mut self,
        vaddr: VirtAddr,
        size: u32,
        access: AccessType,
    ) -> Result<PhysAddr, Exception> {
        if matches!(size, 2 | 4) && !vaddr.is_aligned(size) {
            return Err(Exception::AddressError);
        }

        let page_size = self.page_size;
        let num_frames = self.num_frames;
        let Some(table) = self.page_table.as_mut() else {
            panic!("translating {vaddr} with no page table installed");
        };

        let vpn = vaddr.vpn(page_size);
        let offset = vaddr.page_offset(page_size);
        let entry = table.entry_mut(vpn).ok_or(Exception::AddressError)?;
        if !entry.valid {
            return Err(Exception::PageFault);
        }
        if access.is_write() && entry.read_only {
            return Err(Exception::ReadOnly);
        }
        if entry.physical_page >= num_frames {
            return Err(Exception::BusError);
        }

        entry.used = true;
        if access.is_write() {
            entry.dirty = true;
        }
        Ok(PhysAddr::new(entry.physical_page * page_size + offset))
    }
}
