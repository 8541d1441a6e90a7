
/// Address translation and frame allocation.
pub mod mmu;
