//! Physical and Virtual Address types.
//!
//! This module defines strong types for physical and virtual addresses to prevent
//! accidental mixing of address spaces. It provides the following:
//! 1. **Type Safety:** Distinguishes between virtual and physical address spaces at compile time.
//! 2. **Address Manipulation:** Page number and offset extraction for a given page size.
//! 3. **Translator Integration:** Acts as the primary interface for address translation.

/// A virtual address in a user program's address space.
///
/// Virtual addresses are used by the running program and must be translated to
/// physical addresses through the page table before touching main memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtAddr(pub u32);

/// A byte offset into simulated main memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysAddr(pub u32);

impl VirtAddr {
    /// Creates a new virtual address from a raw 32-bit value.
    #[inline(always)]
    pub const fn new(addr: u32) -> Self {
        Self(addr)
    }

    /// Returns the raw 32-bit address value.
    #[inline(always)]
    pub const fn val(self) -> u32 {
        self.0
    }

    /// Returns the virtual page number for the given page size.
    ///
    /// # Arguments
    ///
    /// * `page_size` - Bytes per page (need not be a power of two).
    #[inline(always)]
    pub const fn vpn(self, page_size: u32) -> u32 {
        self.0 / page_size
    }

    /// Returns the byte offset within the page for the given page size.
    #[inline(always)]
    pub const fn page_offset(self, page_size: u32) -> u32 {
        self.0 % page_size
    }

    /// Returns `true` if the address is a multiple of `size`.
    #[inline(always)]
    pub const fn is_aligned(self, size: u32) -> bool {
        self.0 % size == 0
    }
}

impl PhysAddr {
    /// Creates a new physical address from a raw 32-bit value.
    #[inline(always)]
    pub const fn new(addr: u32) -> Self {
        Self(addr)
    }

    /// Returns the raw 32-bit address value.
    #[inline(always)]
    pub const fn val(self) -> u32 {
        self.0
    }

    /// Returns the address as an index into the main memory byte array.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for VirtAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl std::fmt::Display for PhysAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}
