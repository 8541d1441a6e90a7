//! Memory Access Helpers.
//!
//! This module provides the interface between the CPU and main memory.
//! It performs the following:
//! 1. **Address Translation:** Every access goes through the MMU first.
//! 2. **Width Handling:** Byte, halfword and word accesses in little-endian order.
//! 3. **Fault Reporting:** Failed translations come back as a [`Fault`] carrying the
//!    virtual address, ready to be raised.

use super::Cpu;
use crate::common::{AccessType, Fault, PhysAddr, VirtAddr};

impl Cpu {
    /// Translates a virtual address to a physical address using the MMU.
    ///
    /// # Arguments
    ///
    /// * `vaddr`  - The virtual address to translate.
    /// * `size`   - Access width in bytes.
    /// * `access` - The type of memory access (Fetch/Read/Write).
    ///
    /// # Returns
    ///
    /// The physical address, or a fault tied to `vaddr`.
    #[inline]
    pub fn translate(
        &mut self,
        vaddr: VirtAddr,
        size: u32,
        access: AccessType,
    ) -> Result<PhysAddr, Fault> {
        self.mmu
            .translate(vaddr, size, access)
            .map_err(|kind| Fault::at(kind, vaddr))
    }

    /// Reads `size` bytes (1, 2 or 4) at a virtual address.
    ///
    /// # Returns
    ///
    /// The zero-extended little-endian value, or the translation fault.
    pub fn read_mem(&mut self, vaddr: VirtAddr, size: u32) -> Result<u32, Fault> {
        self.read_as(vaddr, size, AccessType::Read)
    }

    /// Writes the low `size` bytes (1, 2 or 4) of `value` at a virtual address.
    ///
    /// Memory is untouched if translation fails.
    pub fn write_mem(&mut self, vaddr: VirtAddr, size: u32, value: u32) -> Result<(), Fault> {
        let paddr = self.translate(vaddr, size, AccessType::Write)?;
        self.write_phys(paddr, size, value);
        Ok(())
    }

    /// Fetches the instruction word at a virtual address.
    #[inline]
    pub(crate) fn fetch(&mut self, vaddr: VirtAddr) -> Result<u32, Fault> {
        self.read_as(vaddr, 4, AccessType::Fetch)
    }

    fn read_as(&mut self, vaddr: VirtAddr, size: u32, access: AccessType) -> Result<u32, Fault> {
        let paddr = self.translate(vaddr, size, access)?;
        Ok(self.read_phys(paddr, size))
    }

    /// Reads `size` bytes of physical memory, little-endian.
    ///
    /// # Panics
    ///
    /// Panics if the access runs past the end of main memory; the translator
    /// only produces addresses inside it.
    pub fn read_phys(&self, paddr: PhysAddr, size: u32) -> u32 {
        let base = paddr.index();
        let bytes = &self.memory[base..base + size as usize];
        bytes
            .iter()
            .rev()
            .fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
    }

    /// Writes the low `size` bytes of `value` to physical memory, little-endian.
    pub fn write_phys(&mut self, paddr: PhysAddr, size: u32, value: u32) {
        let base = paddr.index();
        let le = value.to_le_bytes();
        self.memory[base..base + size as usize].copy_from_slice(&le[..size as usize]);
    }
}
