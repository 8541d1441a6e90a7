//! Memory Access Types.
//!
//! This module defines the classification of memory accesses used throughout the simulator.
//! These types are used for the following:
//! 1. **Permission Validation:** Only writes are checked against read-only pages.
//! 2. **Usage Bits:** Writes set the page's dirty bit in addition to its use bit.
//! 3. **Tracing:** Distinguishing fetch traffic from data traffic in debug output.

/// Type of memory access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessType {
    /// Instruction fetch access.
    Fetch,

    /// Data read access (loads, and kernel reads of user memory).
    Read,

    /// Data write access (stores, and kernel writes to user memory).
    ///
    /// Faults with `ReadOnly` on pages marked read-only and marks pages dirty.
    Write,
}

impl AccessType {
    /// Returns `true` for store traffic.
    #[inline(always)]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Write)
    }
}
