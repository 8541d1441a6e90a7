//! Page table entries.
//!
//! An address space owns one [`PageTable`]; the translator borrows it while the
//! address space is running and updates the use/dirty bits in place.

/// One virtual-to-physical page mapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TranslationEntry {
    /// Virtual page number this entry maps.
    pub virtual_page: u32,
    /// Physical frame backing the page.
    pub physical_page: u32,
    /// The mapping may be used; otherwise accesses page-fault.
    pub valid: bool,
    /// Writes raise `ReadOnly`.
    pub read_only: bool,
    /// Set by the translator on every successful access.
    pub used: bool,
    /// Set by the translator on every successful write.
    pub dirty: bool,
}

impl TranslationEntry {
    /// Creates a valid, writable mapping with clear use/dirty bits.
    pub const fn mapped(virtual_page: u32, physical_page: u32) -> Self {
        Self {
            virtual_page,
            physical_page,
            valid: true,
            read_only: false,
            used: false,
            dirty: false,
        }
    }
}

/// A flat page table indexed by virtual page number.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageTable {
    entries: Vec<TranslationEntry>,
}

impl PageTable {
    /// Wraps a list of entries; entry `i` maps virtual page `i`.
    pub const fn new(entries: Vec<TranslationEntry>) -> Self {
        Self { entries }
    }

    /// Builds a table mapping `num_pages` virtual pages onto consecutive
    /// frames starting at `first_frame`.
    pub fn contiguous(first_frame: u32, num_pages: u32) -> Self {
        Self::new(
            (0..num_pages)
                .map(|vpn| TranslationEntry::mapped(vpn, first_frame + vpn))
                .collect(),
        )
    }

    /// Number of entries (virtual pages).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table maps no pages.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry for `vpn`, if it is inside the table.
    pub fn entry(&self, vpn: u32) -> Option<&TranslationEntry> {
        self.entries.get(vpn as usize)
    }

    /// Returns the entry for `vpn` mutably, if it is inside the table.
    pub fn entry_mut(&mut self, vpn: u32) -> Option<&mut TranslationEntry> {
        self.entries.get_mut(vpn as usize)
    }

    /// Iterates over every entry in page order.
    pub fn iter(&self) -> impl Iterator<Item = &TranslationEntry> {
        self.entries.iter()
    }
}
